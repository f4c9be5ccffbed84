//! The [`Decode`] trait and its implementations for the built-in targets.
//!
//! Dispatch precedence is encoded by which impl a type picks up: the six
//! primitives read straight off the scanner, fixed arrays decode as a
//! sequence and convert, growable collections fill element by element,
//! string-keyed maps fill pair by pair, and everything else is a record
//! declared through [`record!`](crate::record).

use std::{
    collections::{BTreeMap, BTreeSet, HashMap, HashSet, LinkedList, VecDeque},
    hash::{BuildHasher, Hash},
};

use indexmap::IndexMap;

use crate::{
    dispatch::{PrimitiveKind, Strategy, TypeDescriptor},
    parser::{fill_map, fill_sequence, read_boxed_slice, read_fixed_array},
};

/// A type the decoder can materialize.
///
/// `strategy` is the resolution step. It runs at most once per type and
/// cache; the result is shared by every later decode of `Self`.
pub trait Decode: Sized + 'static {
    fn strategy() -> Strategy<Self>;
}

impl Decode for bool {
    fn strategy() -> Strategy<Self> {
        Strategy::Primitive {
            kind: PrimitiveKind::Bool,
            read: |scanner| scanner.read_bool(),
        }
    }
}

impl Decode for i32 {
    fn strategy() -> Strategy<Self> {
        Strategy::Primitive {
            kind: PrimitiveKind::I32,
            read: |scanner| scanner.read_i32(),
        }
    }
}

impl Decode for i64 {
    fn strategy() -> Strategy<Self> {
        Strategy::Primitive {
            kind: PrimitiveKind::I64,
            read: |scanner| scanner.read_i64(),
        }
    }
}

impl Decode for f32 {
    fn strategy() -> Strategy<Self> {
        Strategy::Primitive {
            kind: PrimitiveKind::F32,
            read: |scanner| scanner.read_f32(),
        }
    }
}

impl Decode for f64 {
    fn strategy() -> Strategy<Self> {
        Strategy::Primitive {
            kind: PrimitiveKind::F64,
            read: |scanner| scanner.read_f64(),
        }
    }
}

impl Decode for String {
    fn strategy() -> Strategy<Self> {
        Strategy::Primitive {
            kind: PrimitiveKind::String,
            read: |scanner| Ok(scanner.read_string()?.map(str::to_owned)),
        }
    }
}

// --- Fixed-size arrays ------------------------------------------------------

impl<E: Decode, const N: usize> Decode for [E; N] {
    fn strategy() -> Strategy<Self> {
        Strategy::Array {
            element: TypeDescriptor::of::<E>(),
            read: read_fixed_array::<E, N>,
        }
    }
}

impl<E: Decode> Decode for Box<[E]> {
    fn strategy() -> Strategy<Self> {
        Strategy::Array {
            element: TypeDescriptor::of::<E>(),
            read: read_boxed_slice::<E>,
        }
    }
}

// --- Ordered collections ----------------------------------------------------

macro_rules! impl_sequence {
    ($($ty:ident<E $(: $($bound:path),+)?>),* $(,)?) => {
        $(
            impl<E: Decode $($(+ $bound)+)?> Decode for $ty<E> {
                fn strategy() -> Strategy<Self> {
                    Strategy::Sequence {
                        element: TypeDescriptor::of::<E>(),
                        new: $ty::new,
                        fill: fill_sequence::<Self, E>,
                    }
                }
            }
        )*
    };
}

impl_sequence!(Vec<E>, VecDeque<E>, LinkedList<E>, BTreeSet<E: Ord>);

impl<E, S> Decode for HashSet<E, S>
where
    E: Decode + Eq + Hash,
    S: BuildHasher + Default + 'static,
{
    fn strategy() -> Strategy<Self> {
        Strategy::Sequence {
            element: TypeDescriptor::of::<E>(),
            new: HashSet::default,
            fill: fill_sequence::<Self, E>,
        }
    }
}

// --- String-keyed maps ------------------------------------------------------

impl<V: Decode> Decode for BTreeMap<String, V> {
    fn strategy() -> Strategy<Self> {
        Strategy::Map {
            value: TypeDescriptor::of::<V>(),
            new: BTreeMap::new,
            fill: fill_map::<Self, V>,
        }
    }
}

impl<V, S> Decode for HashMap<String, V, S>
where
    V: Decode,
    S: BuildHasher + Default + 'static,
{
    fn strategy() -> Strategy<Self> {
        Strategy::Map {
            value: TypeDescriptor::of::<V>(),
            new: HashMap::default,
            fill: fill_map::<Self, V>,
        }
    }
}

impl<V, S> Decode for IndexMap<String, V, S>
where
    V: Decode,
    S: BuildHasher + Default + 'static,
{
    fn strategy() -> Strategy<Self> {
        Strategy::Map {
            value: TypeDescriptor::of::<V>(),
            new: IndexMap::default,
            fill: fill_map::<Self, V>,
        }
    }
}
