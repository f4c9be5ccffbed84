//! Key-to-field tables for decoding JSON objects into structs.
//!
//! A [`FieldMap`] maps every accepted JSON key, aliases included, to the slot
//! that decodes into one field of the record. It is built once by the
//! record's [`Decode::strategy`] and cached with the strategy, so lookups
//! during a decode are plain hash probes on the borrowed key.

use std::sync::{Arc, OnceLock};

use rustc_hash::FxHashMap;

use crate::{decode::Decode, dispatch::Strategy, error::DecodeError, parser::Parser};

/// One settable field location.
pub(crate) trait FieldSlot<T>: Send + Sync {
    /// Canonical field name.
    fn name(&self) -> &'static str;

    fn type_name(&self) -> &'static str;

    /// Decodes a value of the field's type and stores it. `Ok(false)` if no
    /// value of that type starts at the cursor.
    fn decode_into(&self, parser: &mut Parser<'_>, record: &mut T) -> Result<bool, DecodeError>;
}

struct Field<T, F> {
    name: &'static str,
    access: fn(&mut T) -> &mut F,
    /// Resolved on the first value decoded into this field.
    strategy: OnceLock<Arc<Strategy<F>>>,
}

impl<T: 'static, F: Decode> FieldSlot<T> for Field<T, F> {
    fn name(&self) -> &'static str {
        self.name
    }

    fn type_name(&self) -> &'static str {
        core::any::type_name::<F>()
    }

    fn decode_into(&self, parser: &mut Parser<'_>, record: &mut T) -> Result<bool, DecodeError> {
        let strategy = self.strategy.get_or_init(|| parser.cache().resolve::<F>());
        match parser.read_with(strategy)? {
            Some(value) => {
                *(self.access)(record) = value;
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

/// Accepted key name → field slot.
///
/// ```rust
/// use jsonpull::FieldMap;
///
/// #[derive(Default)]
/// struct Point {
///     x: i32,
///     y: i32,
/// }
///
/// let fields = FieldMap::<Point>::new()
///     .field("x", |p| &mut p.x)
///     .aliased_field("y", &["Y", "ordinate"], |p| &mut p.y);
/// assert_eq!(fields.len(), 4);
/// assert_eq!(fields.field_name("ordinate"), Some("y"));
/// ```
pub struct FieldMap<T> {
    slots: FxHashMap<&'static str, Arc<dyn FieldSlot<T>>>,
}

impl<T> Default for FieldMap<T> {
    fn default() -> Self {
        Self {
            slots: FxHashMap::default(),
        }
    }
}

impl<T: 'static> FieldMap<T> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a field accepted under its own name only.
    #[must_use]
    pub fn field<F: Decode>(self, name: &'static str, access: fn(&mut T) -> &mut F) -> Self {
        self.aliased_field(name, &[], access)
    }

    /// Adds a field accepted under `name` and every name in `aliases`. All
    /// names share one slot. A name added later replaces an earlier mapping.
    #[must_use]
    pub fn aliased_field<F: Decode>(
        mut self,
        name: &'static str,
        aliases: &[&'static str],
        access: fn(&mut T) -> &mut F,
    ) -> Self {
        let slot: Arc<dyn FieldSlot<T>> = Arc::new(Field {
            name,
            access,
            strategy: OnceLock::new(),
        });
        for accepted in core::iter::once(name).chain(aliases.iter().copied()) {
            self.slots.insert(accepted, Arc::clone(&slot));
        }
        self
    }
}

impl<T> FieldMap<T> {
    /// Number of accepted names, aliases included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    #[must_use]
    pub fn contains(&self, accepted: &str) -> bool {
        self.slots.contains_key(accepted)
    }

    /// Canonical field name for an accepted key.
    #[must_use]
    pub fn field_name(&self, accepted: &str) -> Option<&'static str> {
        self.slots.get(accepted).map(|slot| slot.name())
    }

    /// All accepted names, in no particular order.
    pub fn accepted_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.slots.keys().copied()
    }

    pub(crate) fn get(&self, accepted: &str) -> Option<&dyn FieldSlot<T>> {
        self.slots.get(accepted).map(AsRef::as_ref)
    }
}

impl<T> core::fmt::Debug for FieldMap<T> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let mut names: Vec<_> = self
            .slots
            .iter()
            .map(|(accepted, slot)| (*accepted, slot.name()))
            .collect();
        names.sort_unstable();
        f.debug_map().entries(names).finish()
    }
}

/// How to decode a record: an instance constructor plus the [`FieldMap`]
/// of its accepted keys.
pub struct RecordStrategy<T> {
    name: &'static str,
    new: fn() -> T,
    fields: FieldMap<T>,
}

impl<T: 'static> RecordStrategy<T> {
    /// `new` must return an instance ready for field population, typically
    /// `T::default`.
    #[must_use]
    pub fn new(new: fn() -> T, fields: FieldMap<T>) -> Self {
        Self {
            name: core::any::type_name::<T>(),
            new,
            fields,
        }
    }
}

impl<T> RecordStrategy<T> {
    #[must_use]
    pub fn name(&self) -> &'static str {
        self.name
    }

    #[must_use]
    pub fn fields(&self) -> &FieldMap<T> {
        &self.fields
    }

    pub(crate) fn instantiate(&self) -> T {
        (self.new)()
    }
}

impl<T> core::fmt::Debug for RecordStrategy<T> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("RecordStrategy")
            .field("name", &self.name)
            .field("fields", &self.fields)
            .finish_non_exhaustive()
    }
}

/// Implements [`Decode`](crate::Decode) for a `Default` struct as a record.
///
/// Each entry names a struct field, the JSON key it is read from, and
/// optionally legacy alias keys separated by `|`.
///
/// ```rust
/// #[derive(Debug, Default, PartialEq)]
/// struct SomeType {
///     one: i32,
///     two: i32,
///     others: Vec<i32>,
/// }
///
/// jsonpull::record!(SomeType {
///     one => "One",
///     two => "Two",
///     others => "Others" | "Values",
/// });
///
/// let value: SomeType = jsonpull::from_str(r#"{"Values": [1, 52, -500]}"#)
///     .unwrap()
///     .unwrap();
/// assert_eq!(value.others, [1, 52, -500]);
/// ```
#[macro_export]
macro_rules! record {
    ($ty:ty { $( $field:ident => $name:literal $( | $alias:literal )* ),* $(,)? }) => {
        impl $crate::Decode for $ty {
            fn strategy() -> $crate::Strategy<Self> {
                $crate::Strategy::Record($crate::RecordStrategy::new(
                    <Self as ::core::default::Default>::default,
                    $crate::FieldMap::<Self>::new()
                        $( .aliased_field($name, &[$($alias),*], |record| &mut record.$field) )*,
                ))
            }
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Legacy {
        current: Vec<i32>,
        other: String,
    }

    fn fields() -> FieldMap<Legacy> {
        FieldMap::<Legacy>::new()
            .aliased_field("Current", &["Old", "Older"], |r| &mut r.current)
            .field("Other", |r| &mut r.other)
    }

    #[test]
    fn aliases_share_one_slot() {
        let map = fields();
        assert_eq!(map.len(), 4);
        for name in ["Current", "Old", "Older"] {
            assert_eq!(map.field_name(name), Some("Current"));
        }
        assert_eq!(map.field_name("Other"), Some("Other"));
        assert_eq!(map.field_name("current"), None);

        let current = map.slots.get("Current").unwrap();
        let old = map.slots.get("Old").unwrap();
        assert!(Arc::ptr_eq(current, old));
    }

    #[test]
    fn accepted_names_are_stable_across_builds() {
        let mut first: Vec<_> = fields().accepted_names().collect();
        let mut second: Vec<_> = fields().accepted_names().collect();
        first.sort_unstable();
        second.sort_unstable();
        assert_eq!(first, ["Current", "Old", "Older", "Other"]);
        assert_eq!(first, second);
    }

    #[test]
    fn slots_report_their_types() {
        let map = fields();
        assert_eq!(map.get("Older").unwrap().type_name(), "alloc::vec::Vec<i32>");
        assert_eq!(map.get("Other").unwrap().type_name(), "alloc::string::String");
    }
}
