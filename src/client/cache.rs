use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard};

use serde_json::{Map, Value, json};

/// Identity of a cached result: the document, the operation picked from it
/// and the variables it ran with.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CacheKey {
    pub query: String,
    pub operation_name: Option<String>,
    /// Variables rendered as JSON with object keys sorted.
    pub variables: String,
}

impl CacheKey {
    pub fn new(query: &str, operation_name: Option<&str>, variables: &Value) -> Self {
        Self {
            query: query.to_string(),
            operation_name: operation_name.map(str::to_string),
            variables: canonicalize(variables).to_string(),
        }
    }
}

fn canonicalize(value: &Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut entries: Vec<_> = map.iter().collect();
            entries.sort_by(|a, b| a.0.cmp(b.0));
            Value::Object(
                entries
                    .into_iter()
                    .map(|(k, v)| (k.clone(), canonicalize(v)))
                    .collect::<Map<_, _>>(),
            )
        }
        Value::Array(items) => Value::Array(items.iter().map(canonicalize).collect()),
        other => other.clone(),
    }
}

/// Whole-result query cache.
///
/// Results are stored per [`CacheKey`] exactly as the server returned them;
/// nothing is normalized, so two queries selecting the same object do not
/// share an entry.
#[derive(Debug, Default)]
pub struct InMemoryCache {
    entries: Mutex<BTreeMap<CacheKey, Value>>,
}

impl InMemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn read(&self, key: &CacheKey) -> Option<Value> {
        let hit = self.lock().get(key).cloned();
        tracing::trace!(query = %key.query, hit = hit.is_some(), "cache read");
        hit
    }

    pub fn write(&self, key: CacheKey, data: Value) {
        tracing::trace!(query = %key.query, "cache write");
        self.lock().insert(key, data);
    }

    pub fn evict(&self, key: &CacheKey) -> Option<Value> {
        self.lock().remove(key)
    }

    pub fn reset(&self) {
        self.lock().clear();
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// JSON snapshot of every entry.
    pub fn extract(&self) -> Value {
        Value::Array(
            self.lock()
                .iter()
                .map(|(key, data)| {
                    json!({
                        "query": key.query,
                        "operationName": key.operation_name,
                        "variables": serde_json::from_str::<Value>(&key.variables).unwrap_or(Value::Null),
                        "data": data,
                    })
                })
                .collect(),
        )
    }

    fn lock(&self) -> MutexGuard<'_, BTreeMap<CacheKey, Value>> {
        self.entries.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_variable_order_does_not_matter() {
        let a = CacheKey::new("{ a }", None, &json!({ "x": 1, "y": { "b": 2, "a": 1 } }));
        let b = CacheKey::new("{ a }", None, &json!({ "y": { "a": 1, "b": 2 }, "x": 1 }));
        assert_eq!(a, b);
    }

    #[test]
    fn test_operation_name_is_part_of_key() {
        let a = CacheKey::new("query A { a } query B { a }", Some("A"), &json!({}));
        let b = CacheKey::new("query A { a } query B { a }", Some("B"), &json!({}));
        assert_ne!(a, b);
    }

    #[test]
    fn test_read_write_evict() {
        let cache = InMemoryCache::new();
        let key = CacheKey::new("{ a }", None, &json!({}));

        assert!(cache.is_empty());
        assert_eq!(cache.read(&key), None);

        cache.write(key.clone(), json!({ "a": 1 }));
        assert_eq!(cache.read(&key), Some(json!({ "a": 1 })));
        assert_eq!(cache.len(), 1);

        cache.write(key.clone(), json!({ "a": 2 }));
        assert_eq!(cache.read(&key), Some(json!({ "a": 2 })));
        assert_eq!(cache.len(), 1);

        assert_eq!(cache.evict(&key), Some(json!({ "a": 2 })));
        assert!(cache.is_empty());
    }

    #[test]
    fn test_reset() {
        let cache = InMemoryCache::new();
        cache.write(CacheKey::new("{ a }", None, &json!({})), json!({}));
        cache.write(CacheKey::new("{ b }", None, &json!({})), json!({}));

        cache.reset();
        assert_eq!(cache.len(), 0);
    }

    #[test]
    fn test_extract_snapshot() {
        let cache = InMemoryCache::new();
        cache.write(
            CacheKey::new("query P { p }", Some("P"), &json!({ "id": "1" })),
            json!({ "p": true }),
        );

        assert_eq!(
            cache.extract(),
            json!([{
                "query": "query P { p }",
                "operationName": "P",
                "variables": { "id": "1" },
                "data": { "p": true },
            }])
        );
    }
}
