//! Per-type memo of decoding strategies: each target type is resolved once
//! and every later decode shares the result.
//!
//! A [`Strategy`] is one of five closed variants (primitive, fixed array,
//! ordered collection, string-keyed map, record). Resolution calls
//! [`Decode::strategy`], which for records runs the field introspection;
//! later lookups are a read lock and a hash probe.
//!
//! Concurrent first resolutions of the same type may both run `strategy()`,
//! but only the first one inserted is ever returned: single writer wins.

use std::{
    any::{Any, TypeId},
    collections::hash_map::Entry,
    sync::{Arc, LazyLock, PoisonError, RwLock},
};

use rustc_hash::FxHashMap;
use tracing::debug;

use crate::{
    decode::Decode,
    error::DecodeError,
    parser::Parser,
    record::RecordStrategy,
    scanner::Scanner,
};

/// Identity of a decode target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TypeDescriptor {
    id: TypeId,
    name: &'static str,
}

impl TypeDescriptor {
    #[must_use]
    pub fn of<T: ?Sized + 'static>() -> Self {
        Self {
            id: TypeId::of::<T>(),
            name: core::any::type_name::<T>(),
        }
    }

    #[must_use]
    pub fn id(&self) -> TypeId {
        self.id
    }

    #[must_use]
    pub fn name(&self) -> &'static str {
        self.name
    }
}

/// The closed set of primitive targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrimitiveKind {
    Bool,
    I32,
    I64,
    F32,
    F64,
    String,
}

/// Reads a primitive at the cursor; whitespace has already been skipped.
pub type PrimitiveReader<T> = for<'a, 'src> fn(&'a mut Scanner<'src>) -> Result<Option<T>, DecodeError>;

/// Reads a whole value through the parser.
pub type ValueReader<T> = for<'a, 'src> fn(&'a mut Parser<'src>) -> Result<Option<T>, DecodeError>;

/// Decodes into an existing container; `Ok(false)` when no opener is found.
pub type Filler<T> =
    for<'a, 'src, 't> fn(&'a mut Parser<'src>, &'t mut T) -> Result<bool, DecodeError>;

/// How values of one type are decoded.
pub enum Strategy<T> {
    Primitive {
        kind: PrimitiveKind,
        read: PrimitiveReader<T>,
    },
    /// Decoded as an ordered collection, then converted.
    Array {
        element: TypeDescriptor,
        read: ValueReader<T>,
    },
    Sequence {
        element: TypeDescriptor,
        new: fn() -> T,
        fill: Filler<T>,
    },
    Map {
        value: TypeDescriptor,
        new: fn() -> T,
        fill: Filler<T>,
    },
    Record(RecordStrategy<T>),
}

/// Variant tag of a [`Strategy`], for inspection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StrategyKind {
    Primitive(PrimitiveKind),
    Array,
    Sequence,
    Map,
    Record,
}

impl<T> Strategy<T> {
    #[must_use]
    pub fn kind(&self) -> StrategyKind {
        match self {
            Self::Primitive { kind, .. } => StrategyKind::Primitive(*kind),
            Self::Array { .. } => StrategyKind::Array,
            Self::Sequence { .. } => StrategyKind::Sequence,
            Self::Map { .. } => StrategyKind::Map,
            Self::Record(_) => StrategyKind::Record,
        }
    }

    /// Element type of arrays and sequences, value type of maps.
    #[must_use]
    pub fn item_type(&self) -> Option<TypeDescriptor> {
        match self {
            Self::Array { element, .. } | Self::Sequence { element, .. } => Some(*element),
            Self::Map { value, .. } => Some(*value),
            Self::Primitive { .. } | Self::Record(_) => None,
        }
    }
}

impl<T> core::fmt::Debug for Strategy<T> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Record(record) => f.debug_tuple("Record").field(record).finish(),
            other => f
                .debug_struct("Strategy")
                .field("kind", &other.kind())
                .field("item_type", &other.item_type())
                .finish(),
        }
    }
}

type ErasedStrategy = Arc<dyn Any + Send + Sync>;

/// Memo table from target type to its resolved [`Strategy`].
#[derive(Default)]
pub struct DispatchCache {
    strategies: RwLock<FxHashMap<TypeId, ErasedStrategy>>,
}

static GLOBAL: LazyLock<DispatchCache> = LazyLock::new(DispatchCache::new);

impl DispatchCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The process-wide cache used by parsers unless told otherwise.
    #[must_use]
    pub fn global() -> &'static DispatchCache {
        &GLOBAL
    }

    /// Returns the strategy for `T`, resolving it on first use.
    pub fn resolve<T: Decode>(&self) -> Arc<Strategy<T>> {
        let id = TypeId::of::<T>();
        if let Some(hit) = self.read_lock().get(&id) {
            return downcast(Arc::clone(hit));
        }

        let (winner, inserted) = self.publish(id, Arc::new(T::strategy()));
        let strategy = downcast::<T>(winner);
        if !inserted {
            return strategy;
        }
        match &*strategy {
            Strategy::Record(record) => debug!(
                target_type = core::any::type_name::<T>(),
                kind = ?strategy.kind(),
                accepted_names = record.fields().len(),
                "resolved decoding strategy"
            ),
            other => debug!(
                target_type = core::any::type_name::<T>(),
                kind = ?other.kind(),
                "resolved decoding strategy"
            ),
        }
        strategy
    }

    /// Stores `resolved` unless another resolution got there first. Returns
    /// the stored strategy and whether it is `resolved`.
    fn publish(&self, id: TypeId, resolved: ErasedStrategy) -> (ErasedStrategy, bool) {
        let mut strategies = self
            .strategies
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        match strategies.entry(id) {
            Entry::Occupied(entry) => (Arc::clone(entry.get()), false),
            Entry::Vacant(entry) => (Arc::clone(entry.insert(resolved)), true),
        }
    }

    #[must_use]
    pub fn contains(&self, descriptor: &TypeDescriptor) -> bool {
        self.read_lock().contains_key(&descriptor.id)
    }

    /// Drops the cached strategy for one type. Returns whether one existed.
    pub fn invalidate(&self, descriptor: &TypeDescriptor) -> bool {
        self.strategies
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&descriptor.id)
            .is_some()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.read_lock().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn read_lock(&self) -> std::sync::RwLockReadGuard<'_, FxHashMap<TypeId, ErasedStrategy>> {
        self.strategies.read().unwrap_or_else(PoisonError::into_inner)
    }
}

impl core::fmt::Debug for DispatchCache {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("DispatchCache")
            .field("len", &self.len())
            .finish()
    }
}

fn downcast<T: Decode>(erased: ErasedStrategy) -> Arc<Strategy<T>> {
    match erased.downcast::<Strategy<T>>() {
        Ok(strategy) => strategy,
        Err(_) => unreachable!("strategy cached under a foreign TypeId"),
    }
}
