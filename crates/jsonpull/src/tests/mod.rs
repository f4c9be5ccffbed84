mod parse_bad;

use std::collections::BTreeMap;

/// Record with one aliased field, as an older producer would have written it.
#[derive(Debug, Default, PartialEq)]
pub(crate) struct SomeType {
    pub one: i32,
    pub two: i32,
    pub others: Vec<i32>,
}

crate::record!(SomeType {
    one => "One",
    two => "Two",
    others => "Others" | "Values",
});

#[derive(Debug, Default, PartialEq)]
pub(crate) struct Outer {
    pub name: String,
    pub inner: SomeType,
    pub tags: BTreeMap<String, bool>,
    pub ratio: f64,
}

crate::record!(Outer {
    name => "name",
    inner => "inner",
    tags => "tags",
    ratio => "ratio",
});
