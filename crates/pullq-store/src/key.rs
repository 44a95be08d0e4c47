//! Hashable view of scalar keys for the store's fast path.

use pullq_core::value::Value;

/// Canonical hash key for the scalar domain. `Int` and `Float` unify when the
/// float is integral so `1` and `1.0` denote the same entry, mirroring the
/// loose equality the default policy uses.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ScalarKey {
    Null,
    Bool(bool),
    Int(i64),
    FloatBits(u64),
    Str(String),
}

impl ScalarKey {
    /// `None` when the value is not in the scalar domain.
    pub fn of(value: &Value) -> Option<ScalarKey> {
        match value {
            Value::Null => Some(ScalarKey::Null),
            Value::Bool(b) => Some(ScalarKey::Bool(*b)),
            Value::Int(i) => Some(ScalarKey::Int(*i)),
            Value::Float(f) => {
                if f.fract() == 0.0 && *f >= i64::MIN as f64 && *f <= i64::MAX as f64 {
                    Some(ScalarKey::Int(*f as i64))
                } else {
                    Some(ScalarKey::FloatBits(f.to_bits()))
                }
            }
            Value::Str(s) => Some(ScalarKey::Str(s.clone())),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn integral_float_unifies_with_int() {
        assert_eq!(ScalarKey::of(&Value::Int(3)), ScalarKey::of(&Value::Float(3.0)));
        assert_ne!(ScalarKey::of(&Value::Int(3)), ScalarKey::of(&Value::Float(3.5)));
    }

    #[test]
    fn structured_values_have_no_scalar_key() {
        assert_eq!(ScalarKey::of(&Value::array(vec![])), None);
    }
}
