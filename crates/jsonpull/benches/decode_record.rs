#![allow(missing_docs)]
//! Record decoding: jsonpull's type-directed pull decoder against `serde_json`
//! deserializing the same shape, over a payload of `entries` records.

use std::{collections::BTreeMap, fmt::Write, hint::black_box, time::Duration};

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use serde::Deserialize;

#[derive(Debug, Default, Deserialize)]
struct TestStruct {
    #[serde(rename = "Key")]
    key: String,
    #[serde(rename = "Values", alias = "Others", default)]
    values: Vec<i32>,
    #[serde(rename = "KeyValuePairs", default)]
    key_value_pairs: BTreeMap<String, f64>,
}

jsonpull::record!(TestStruct {
    key => "Key",
    values => "Values" | "Others",
    key_value_pairs => "KeyValuePairs",
});

fn payload(entries: usize) -> String {
    let mut out = String::from("[");
    for i in 0..entries {
        if i > 0 {
            out.push(',');
        }
        write!(
            out,
            r#"{{"Key": "entry-{i}", "Values": [{i}, 52, -500, {sq}], "Ignored": {{"a": [true, null]}}, "KeyValuePairs": {{"x": {i}.5, "yé": -0.64e2}}}}"#,
            sq = i * i
        )
        .unwrap();
    }
    out.push(']');
    out
}

fn criterion() -> Criterion {
    Criterion::default()
        .warm_up_time(Duration::from_millis(500))
        .measurement_time(Duration::from_secs(3))
}

fn bench_decode_record(c: &mut Criterion) {
    let mut group = c.benchmark_group("decode_record");
    for entries in [1, 100, 1_000] {
        let text = payload(entries);
        group.bench_with_input(BenchmarkId::new("jsonpull", entries), &text, |b, text| {
            b.iter(|| {
                let decoded: Vec<TestStruct> = jsonpull::from_str(black_box(text)).unwrap().unwrap();
                black_box(decoded)
            });
        });
        group.bench_with_input(BenchmarkId::new("jsonpull_reader", entries), &text, |b, text| {
            b.iter(|| {
                let decoded: Vec<TestStruct> =
                    jsonpull::from_reader(black_box(text.as_bytes())).unwrap().unwrap();
                black_box(decoded)
            });
        });
        group.bench_with_input(BenchmarkId::new("serde_json", entries), &text, |b, text| {
            b.iter(|| {
                let decoded: Vec<TestStruct> = serde_json::from_str(black_box(text)).unwrap();
                black_box(decoded)
            });
        });
    }
    group.finish();
}

criterion_group! { name = benches; config = criterion(); targets = bench_decode_record }
criterion_main!(benches);
