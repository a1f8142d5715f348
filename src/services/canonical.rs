//! Deterministic byte forms for hashing and signing.
//!
//! `canonicalize_structured` is compact JSON with keys sorted at every level.
//! It writes objects itself instead of relying on `serde_json::Map` ordering,
//! so a `preserve_order` feature turned on elsewhere in the graph cannot change
//! signed bytes.

use regex::Regex;
use serde_json::Value;
use sha2::{Digest, Sha256};
use std::ops::Range;
use std::sync::OnceLock;
use unicode_normalization::UnicodeNormalization;

pub fn canonicalize_structured(value: &Value) -> Vec<u8> {
    let mut out = String::new();
    write_value(value, &mut out);
    out.into_bytes()
}

fn write_value(value: &Value, out: &mut String) {
    match value {
        Value::Object(map) => {
            let mut keys: Vec<&String> = map.keys().collect();
            keys.sort();
            out.push('{');
            for (i, key) in keys.into_iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write_string(key, out);
                out.push(':');
                write_value(&map[key.as_str()], out);
            }
            out.push('}');
        }
        Value::Array(items) => {
            out.push('[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write_value(item, out);
            }
            out.push(']');
        }
        Value::String(s) => write_string(s, out),
        scalar => out.push_str(&scalar.to_string()),
    }
}

/// ASCII-only string form: everything outside printable ASCII becomes
/// `\uXXXX` (UTF-16 surrogate pairs above the BMP), lowercase hex.
fn write_string(s: &str, out: &mut String) {
    out.push('"');
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '\u{08}' => out.push_str("\\b"),
            '\u{0c}' => out.push_str("\\f"),
            ' '..='~' => out.push(c),
            _ => {
                let mut units = [0u16; 2];
                for unit in c.encode_utf16(&mut units) {
                    out.push_str(&format!("\\u{unit:04x}"));
                }
            }
        }
    }
    out.push('"');
}

fn front_matter_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?s)\A---\s*\n(.*?)\n---\s*\n(.*)\z").unwrap_or_else(|e| {
            unreachable!("front matter pattern is a constant: {e}")
        })
    })
}

/// Splits a document into `(front_matter, body)`. Front matter is `None` when
/// the document does not open with a `---` delimited block.
pub fn split_front_matter(text: &str) -> (Option<&str>, &str) {
    match front_matter_re().captures(text) {
        Some(caps) => {
            let front = caps.get(1).map(|m| m.as_str());
            let body = caps.get(2).map(|m| m.as_str()).unwrap_or_default();
            (front, body)
        }
        None => (None, text),
    }
}

/// Byte range of the front-matter block (between the delimiters), if any.
pub fn front_matter_range(text: &str) -> Option<Range<usize>> {
    front_matter_re()
        .captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| m.range())
}

pub fn canonicalize_spec(text: &str) -> Vec<u8> {
    let (_, body) = split_front_matter(text);
    let body: String = body.nfkc().collect();
    let body = body.replace("\r\n", "\n").replace('\r', "\n");
    let joined = body
        .split('\n')
        .map(str::trim_end)
        .collect::<Vec<_>>()
        .join("\n");
    let mut out = joined.trim().to_string();
    out.push('\n');
    out.into_bytes()
}

pub fn sha256_hex(bytes: &[u8]) -> String {
    hex::encode(Sha256::digest(bytes))
}

pub fn spec_hash(text: &str) -> String {
    sha256_hex(&canonicalize_spec(text))
}
