//! Structural fingerprinting for structured store keys.
//!
//! The fingerprint partitions structured keys into buckets; it is a hint,
//! never an identity test. Two structurally different keys may share a
//! fingerprint (truncation is deliberate) and the store resolves that by a
//! linear scan with the active equality, so correctness never depends on the
//! fingerprint alone.

use blake3::Hasher;

use crate::config::StoreConfig;
use crate::value::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Hash256(pub [u8; 32]);

impl Hash256 {
    pub fn to_hex(&self) -> String {
        let mut s = String::with_capacity(64);
        for b in &self.0 {
            use std::fmt::Write as _;
            let _ = write!(&mut s, "{:02x}", b);
        }
        s
    }
}

impl std::fmt::Display for Hash256 {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

/// Fingerprint of a key: the variant tag, a bounded textual rendering, and,
/// when the rendering is the opaque kind, a bounded scan of the key's own
/// fields. Each part is length-capped and the part count is capped by the
/// store configuration.
pub fn fingerprint(key: &Value, config: &StoreConfig) -> Hash256 {
    let mut hasher = Hasher::new();
    hasher.update(&[key.type_rank()]);

    let rendering = render_part(key, config.max_part_len);
    let opaque = rendering.starts_with('<');
    update_part(&mut hasher, &rendering);

    if opaque {
        if let Value::Record(fields) = key {
            let mut parts = 2usize;
            for (name, value) in fields.iter() {
                if parts >= config.max_fingerprint_parts {
                    break;
                }
                update_part(&mut hasher, &truncate_chars(name, config.max_part_len));
                update_part(&mut hasher, &render_part(value, config.max_part_len));
                parts += 2;
            }
        }
    }

    Hash256(hasher.finalize().into())
}

fn update_part(hasher: &mut Hasher, part: &str) {
    hasher.update(&(part.len() as u64).to_le_bytes());
    hasher.update(part.as_bytes());
}

/// Bounded textual rendering of one value. Scalars and arrays render to an
/// informative literal; records, sequences, and groupings render to an
/// opaque tag (the generic rendering that triggers the field scan).
fn render_part(value: &Value, max_len: usize) -> String {
    let text = match value {
        Value::Null => "null".to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Int(i) => i.to_string(),
        Value::Float(f) => f.to_string(),
        Value::Str(s) => s.clone(),
        Value::Array(_) => serde_json::to_string(&bounded_json(value, 2))
            .unwrap_or_else(|_| "<array>".to_string()),
        Value::Record(_) => "<record>".to_string(),
        Value::Seq(_) => "<sequence>".to_string(),
        Value::Grouping(_) => "<grouping>".to_string(),
    };
    truncate_chars(&text, max_len)
}

/// JSON view used only for fingerprint text; depth-bounded, lossy by design.
fn bounded_json(value: &Value, depth: usize) -> serde_json::Value {
    use serde_json::Value as Json;
    match value {
        Value::Null => Json::Null,
        Value::Bool(b) => Json::Bool(*b),
        Value::Int(i) => Json::from(*i),
        Value::Float(f) => serde_json::Number::from_f64(*f)
            .map(Json::Number)
            .unwrap_or(Json::Null),
        Value::Str(s) => Json::String(s.clone()),
        Value::Array(items) if depth > 0 => {
            Json::Array(items.iter().map(|v| bounded_json(v, depth - 1)).collect())
        }
        Value::Array(_) => Json::String("<array>".to_string()),
        Value::Record(_) => Json::String("<record>".to_string()),
        Value::Seq(_) => Json::String("<sequence>".to_string()),
        Value::Grouping(_) => Json::String("<grouping>".to_string()),
    }
}

fn truncate_chars(s: &str, max: usize) -> String {
    match s.char_indices().nth(max) {
        Some((idx, _)) => s[..idx].to_string(),
        None => s.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_structure_same_fingerprint() {
        let cfg = StoreConfig::default();
        let a = Value::record(vec![("a".into(), Value::Int(1))]);
        let b = Value::record(vec![("a".into(), Value::Int(1))]);
        assert_eq!(fingerprint(&a, &cfg), fingerprint(&b, &cfg));
    }

    #[test]
    fn differing_fields_change_the_fingerprint() {
        let cfg = StoreConfig::default();
        let a = Value::record(vec![("a".into(), Value::Int(1))]);
        let b = Value::record(vec![("a".into(), Value::Int(2))]);
        assert_ne!(fingerprint(&a, &cfg), fingerprint(&b, &cfg));
    }

    #[test]
    fn fields_beyond_the_part_cap_may_collide() {
        let cfg = StoreConfig {
            max_fingerprint_parts: 4,
            ..StoreConfig::default()
        };
        // First field fits in the budget, the second is past the cap.
        let a = Value::record(vec![
            ("a".into(), Value::Int(1)),
            ("b".into(), Value::Int(2)),
        ]);
        let b = Value::record(vec![
            ("a".into(), Value::Int(1)),
            ("b".into(), Value::Int(3)),
        ]);
        assert_eq!(fingerprint(&a, &cfg), fingerprint(&b, &cfg));
    }

    #[test]
    fn long_string_renderings_truncate() {
        let cfg = StoreConfig::default();
        let long = "x".repeat(200);
        let a = Value::Str(format!("{}-one", long));
        let b = Value::Str(format!("{}-two", long));
        // Identical after truncation; the store's linear fallback tells them apart.
        assert_eq!(fingerprint(&a, &cfg), fingerprint(&b, &cfg));
    }

    #[test]
    fn sequences_render_opaquely() {
        let cfg = StoreConfig::default();
        let a = Value::Seq(crate::seq::Sequence::empty());
        let b = Value::Seq(crate::seq::Sequence::singleton(Value::Int(1)));
        assert_eq!(fingerprint(&a, &cfg), fingerprint(&b, &cfg));
    }
}
