#![no_main]
use std::{cell::RefCell, collections::BTreeMap, io::Read};

use arbitrary::Arbitrary;
use jsonpull::{CharSource, Decode, DecoderOptions, Parser};
use libfuzzer_sys::{fuzz_mutator, fuzz_target, fuzzer_mutate};
use rand::rngs::SmallRng;
use rand::{Rng, RngCore, SeedableRng};
use serde_json::{Map, Value};

const HEADER: usize = 5; // 1 flag byte + 4-byte chunk seed

thread_local! {
    static RNG: RefCell<SmallRng> = RefCell::new(SmallRng::from_os_rng());
}

static WS_TABLE: &[&[u8]] = &[
    b" ",
    b"\t",
    b"\n",
    b"\r",
    "\u{00A0}".as_bytes(),
    "\u{1680}".as_bytes(),
    "\u{2003}".as_bytes(),
    "\u{2028}".as_bytes(),
    "\u{3000}".as_bytes(),
];

#[derive(Debug, Default)]
struct Entry {
    key: String,
    values: Vec<i32>,
    pairs: BTreeMap<String, f64>,
    nested: Vec<Entry>,
    flags: [bool; 2],
}

jsonpull::record!(Entry {
    key => "Key",
    values => "Values" | "Others",
    pairs => "KeyValuePairs",
    nested => "nested",
    flags => "flags",
});

fn with_rng<F, R>(f: F) -> R
where
    F: FnOnce(&mut SmallRng) -> R,
{
    RNG.with(|cell| f(&mut cell.borrow_mut()))
}

fn mutator(data: &mut [u8], size: usize, max_size: usize, seed: u32) -> usize {
    if size < HEADER || seed.is_multiple_of(10) {
        data[0] = with_rng(|rng| rng.next_u32() as u8 & 0x0F);
        data[1..5].copy_from_slice(&with_rng(|rng| rng.next_u32().to_le_bytes()));

        let mut prefix = HEADER;
        let limit = max_size - prefix;
        prefix += append_whitespace(&mut data[prefix..], limit);
        let limit = max_size - prefix;
        prefix += append_value(&mut data[prefix..], size, limit);
        prefix
    } else {
        fuzzer_mutate(data, size, max_size)
    }
}

fn append_whitespace(buf: &mut [u8], limit: usize) -> usize {
    with_rng(|rng| {
        if limit == 0 {
            return 0;
        }
        let mut written = 0;
        for _ in 0..rng.random_range(1..=limit.min(4)) {
            let w = WS_TABLE[rng.random_range(0..WS_TABLE.len())];
            if written + w.len() > limit {
                break;
            }
            buf[written..written + w.len()].copy_from_slice(w);
            written += w.len();
        }
        written
    })
}

fn append_value(data: &mut [u8], size: usize, limit: usize) -> usize {
    let value = loop {
        let s = with_rng(|rng| rng.random_range(size / 2..size * 2 + 1).min(limit));
        let bytes: Vec<u8> = with_rng(|rng| (0..s).map(|_| rng.random::<u8>()).collect());
        if let Ok(value) = ArbitraryValue::arbitrary(&mut arbitrary::Unstructured::new(&bytes)) {
            break value;
        }
    };
    let serialized = serde_json::to_vec(&value.0).expect("serializing a generated value");
    let len = serialized.len().min(limit);
    data[..len].copy_from_slice(&serialized[..len]);
    len
}

fuzz_mutator!(|data: &mut [u8], size: usize, max_size: usize, seed: u32| {
    mutator(data, size, max_size, seed)
});

/// JSON values biased toward the shapes `Entry` understands.
#[derive(Debug)]
struct ArbitraryValue(Value);

impl<'a> Arbitrary<'a> for ArbitraryValue {
    fn arbitrary(u: &mut arbitrary::Unstructured<'_>) -> arbitrary::Result<Self> {
        let value = match u.choose_index(20)? {
            0 => Value::Null,
            1..=3 => Value::Bool(u.arbitrary()?),
            4..=5 => {
                let n: f64 = u.arbitrary()?;
                Value::Number(serde_json::Number::from_f64(n).ok_or(arbitrary::Error::IncorrectFormat)?)
            }
            6 => Value::Number(u.arbitrary::<i32>()?.into()),
            7..=9 => Value::String(u.arbitrary()?),
            10..=14 => {
                let elems: Vec<ArbitraryValue> = u.arbitrary()?;
                Value::Array(elems.into_iter().map(|v| v.0).collect())
            }
            _ => {
                const KEYS: [&str; 7] = ["Key", "Values", "Others", "KeyValuePairs", "nested", "flags", "other"];
                let members: Vec<(u8, ArbitraryValue)> = u.arbitrary()?;
                let map: Map<String, Value> = members
                    .into_iter()
                    .map(|(k, v)| (KEYS[usize::from(k) % KEYS.len()].to_owned(), v.0))
                    .collect();
                Value::Object(map)
            }
        };
        Ok(ArbitraryValue(value))
    }
}

/// Feeds the input a few bytes per read call.
struct Chunked<'a> {
    data: &'a [u8],
    chunk: usize,
}

impl Read for Chunked<'_> {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        let n = self.chunk.min(buf.len()).min(self.data.len());
        buf[..n].copy_from_slice(&self.data[..n]);
        self.data = &self.data[n..];
        Ok(n)
    }
}

fn decode_all<T: Decode>(text: &str, options: DecoderOptions) {
    let mut parser = Parser::from_source(CharSource::from_text(text), options);
    while let Ok(Some(_)) = parser.decode::<T>() {}
}

/// Whenever `serde_json` accepts the whole text as `T`, the decoder must
/// produce the same value from text and from a chunked reader.
fn agrees_with_serde<T>(text: &str, chunk: usize)
where
    T: Decode + serde::de::DeserializeOwned + PartialEq + std::fmt::Debug,
{
    let Ok(expected) = serde_json::from_str::<T>(text) else {
        return;
    };
    let from_text = jsonpull::from_str::<T>(text);
    assert_eq!(from_text.as_ref().ok().and_then(Option::as_ref), Some(&expected), "{text:?}");
    let reader = Chunked {
        data: text.as_bytes(),
        chunk,
    };
    let from_reader = jsonpull::from_reader::<T, _>(reader);
    assert_eq!(from_reader.ok().flatten(), Some(expected), "{text:?}");
}

fn decode(data: &[u8]) {
    if data.len() <= HEADER {
        return;
    }
    let flags = data[0];
    let chunk = u32::from_le_bytes([data[1], data[2], data[3], data[4]]) as usize % 16 + 1;
    let text = String::from_utf8_lossy(&data[HEADER..]).into_owned();

    let options = DecoderOptions {
        allow_unicode_whitespace: flags & 1 != 0,
        max_depth: if flags & 2 != 0 { 8 } else { DecoderOptions::DEFAULT_MAX_DEPTH },
    };
    decode_all::<Entry>(&text, options);
    decode_all::<Vec<Entry>>(&text, options);
    decode_all::<BTreeMap<String, Vec<bool>>>(&text, options);
    decode_all::<[f32; 3]>(&text, options);
    decode_all::<String>(&text, options);

    agrees_with_serde::<Vec<bool>>(&text, chunk);
    agrees_with_serde::<Vec<String>>(&text, chunk);
    agrees_with_serde::<BTreeMap<String, i64>>(&text, chunk);
}

fuzz_target!(|data: &[u8]| decode(data));
