//! Pure request validators shared by every resource handler.

use serde_json::{Map, Value};

/// Length (in hex characters) of a rendered object id.
pub const OBJECT_ID_HEX_LENGTH: usize = 24;

/// Returns `true` only for 24-character hexadecimal strings.
pub fn is_valid_id(candidate: &str) -> bool {
    candidate.len() == OBJECT_ID_HEX_LENGTH && candidate.bytes().all(|b| b.is_ascii_hexdigit())
}

/// Returns `true` when the payload is non-empty and every key is a known field.
///
/// Value types are not inspected here; the store enforces the schema on write.
pub fn is_valid_update(payload: &Map<String, Value>, known_fields: &[&str]) -> bool {
    !payload.is_empty()
        && payload
            .keys()
            .all(|field| known_fields.contains(&field.as_str()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const FIELDS: &[&str] = &["username", "password", "weight"];

    fn object(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            other => panic!("expected object, got {other}"),
        }
    }

    #[test]
    fn id_validation_accepts_hex_tokens() {
        assert!(is_valid_id("679b70c0ebe324047c9ca19d"));
        assert!(is_valid_id("679B70C0EBE324047C9CA19D"));
    }

    #[test]
    fn id_validation_rejects_invalid_inputs() {
        assert!(!is_valid_id(""));
        assert!(!is_valid_id("679b70c0ebe324047c9ca19"));
        assert!(!is_valid_id("679b70c0ebe324047c9ca19d0"));
        assert!(!is_valid_id("679b70c0ebe324047c9ca19g"));
        assert!(!is_valid_id("not-an-id"));
        // 24 bytes, but not 24 ASCII characters
        assert!(!is_valid_id("éééééééééééé"));
    }

    #[test]
    fn update_with_known_fields_is_valid() {
        assert!(is_valid_update(&object(json!({"weight": 85})), FIELDS));
        assert!(is_valid_update(
            &object(json!({"username": "a", "password": "b", "weight": 1})),
            FIELDS
        ));
    }

    #[test]
    fn update_with_unknown_field_is_invalid() {
        assert!(!is_valid_update(
            &object(json!({"weight": 85, "height": 180})),
            FIELDS
        ));
        assert!(!is_valid_update(&object(json!({"_id": "x"})), FIELDS));
    }

    #[test]
    fn empty_update_is_invalid() {
        assert!(!is_valid_update(&Map::new(), FIELDS));
    }
}
