//! Small string and formatting helpers shared by the web UI.

use std::cmp::Ordering;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use serde_json::{Map, Value};

/// Characters left untouched in query values.
const QUERY_VALUE: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~')
    .remove(b'/');

const SIZE_UNITS: [&str; 5] = ["bytes", "KB", "MB", "GB", "TB"];

/// Normalizes a URL path fragment to `/fragment/`.
///
/// Surrounding whitespace and every leading or trailing slash is removed
/// before exactly one of each is added back. Empty input yields `/`.
#[must_use]
pub fn fix_basepath(s: &str) -> String {
    let inner = s.trim().trim_matches('/');
    if inner.is_empty() {
        "/".to_string()
    } else {
        format!("/{inner}/")
    }
}

/// Strips surrounding spaces and one leading `https://` or `http://`.
#[must_use]
pub fn strip_http(s: &str) -> String {
    let s = s.trim_matches(' ');
    s.strip_prefix("https://")
        .or_else(|| s.strip_prefix("http://"))
        .unwrap_or(s)
        .to_string()
}

/// Builds `?a=1&b=2` with keys sorted case-insensitively and values
/// percent-encoded. Returns an empty string when there are no pairs.
pub fn join_args<I, K, V>(args: I) -> String
where
    I: IntoIterator<Item = (K, V)>,
    K: AsRef<str>,
    V: ToString,
{
    let mut pairs: Vec<(String, String)> = args
        .into_iter()
        .map(|(k, v)| (k.as_ref().to_string(), v.to_string()))
        .collect();
    if pairs.is_empty() {
        return String::new();
    }

    pairs.sort_by_cached_key(|(k, _)| k.to_lowercase());

    let joined = pairs
        .iter()
        .map(|(k, v)| format!("{k}={}", utf8_percent_encode(v, QUERY_VALUE)))
        .collect::<Vec<_>>()
        .join("&");
    format!("?{joined}")
}

/// Keeps one item per distinct key.
///
/// Items are stably sorted by key and the first of each run survives, so
/// among duplicates the one that came first in the input wins.
pub fn dedupe_by<T, K, F>(mut items: Vec<T>, mut key: F) -> Vec<T>
where
    K: Ord,
    F: FnMut(&T) -> K,
{
    items.sort_by_key(|item| key(item));
    let mut result: Vec<T> = Vec::with_capacity(items.len());
    for item in items {
        if result.last().is_none_or(|last| key(last) != key(&item)) {
            result.push(item);
        }
    }
    result
}

/// Removes records sharing the same value for field `key`.
///
/// Values are ordered missing < null < bool < number < string < other.
#[must_use]
pub fn remove_dict_dupe_from_list(
    records: Vec<Map<String, Value>>,
    key: &str,
) -> Vec<Map<String, Value>> {
    dedupe_by(records, |record| JsonKey(record.get(key).cloned()))
}

/// Formats a byte count as a human-readable size, e.g. `2.00 KB`.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn sizeof(bytes: u64) -> String {
    let mut num = bytes as f64;
    for unit in &SIZE_UNITS[..SIZE_UNITS.len() - 1] {
        if num < 1024.0 {
            return format!("{num:.2} {unit}");
        }
        num /= 1024.0;
    }
    format!("{num:.2} {}", SIZE_UNITS[SIZE_UNITS.len() - 1])
}

/// Encodes `user:password` for a Basic `Authorization` header.
#[must_use]
pub fn basic_auth(user: &str, password: &str) -> String {
    STANDARD.encode(format!("{user}:{password}"))
}

/// Total order over optional JSON values used for de-duplication.
#[derive(Debug, Clone)]
struct JsonKey(Option<Value>);

impl JsonKey {
    fn rank(&self) -> u8 {
        match &self.0 {
            None => 0,
            Some(Value::Null) => 1,
            Some(Value::Bool(_)) => 2,
            Some(Value::Number(_)) => 3,
            Some(Value::String(_)) => 4,
            Some(_) => 5,
        }
    }
}

impl Ord for JsonKey {
    fn cmp(&self, other: &Self) -> Ordering {
        self.rank().cmp(&other.rank()).then_with(|| match (&self.0, &other.0) {
            (Some(Value::Bool(a)), Some(Value::Bool(b))) => a.cmp(b),
            (Some(Value::Number(a)), Some(Value::Number(b))) => {
                let (a, b) = (a.as_f64().unwrap_or(0.0), b.as_f64().unwrap_or(0.0));
                a.total_cmp(&b)
            }
            (Some(Value::String(a)), Some(Value::String(b))) => a.cmp(b),
            (Some(a), Some(b)) => a.to_string().cmp(&b.to_string()),
            _ => Ordering::Equal,
        })
    }
}

impl PartialOrd for JsonKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for JsonKey {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for JsonKey {}
