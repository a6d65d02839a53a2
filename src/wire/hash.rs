//! Structural schema identity.

use crate::canonical::canonical_string;
use serde_json::Value;
use sha2::{Digest, Sha256};

/// Structural hash of a schema.
///
/// Two schemas hash equal exactly when their descriptors are structurally equal in
/// the same order: names, array element types, enum and flags dictionaries and any
/// nested type detail all take part. Key order inside a descriptor does not.
pub fn format_hash(schema: &[Value]) -> String {
    let mut hasher = Sha256::new();
    for descriptor in schema {
        hasher.update(canonical_string(descriptor).as_bytes());
        hasher.update(b"\n");
    }
    format!("{:x}", hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn same_names_different_array_kind() {
        let ints = vec![json!({"n": "arr", "t": {"n": "Массив", "t": "Число целое"}})];
        let strs = vec![json!({"n": "arr", "t": {"n": "Массив", "t": "Строка"}})];
        assert_ne!(format_hash(&ints), format_hash(&strs));
    }

    #[test]
    fn same_names_different_flags_dictionary() {
        let a = vec![json!({"n": "fl", "t": {"n": "Флаги", "s": {"0": "one"}}})];
        let b = vec![json!({"n": "fl", "t": {"n": "Флаги", "s": {"0": "two"}}})];
        assert_ne!(format_hash(&a), format_hash(&b));
    }

    #[test]
    fn descriptor_key_order_ignored() {
        let a = vec![json!({"n": "id", "t": "Число целое"})];
        let b = vec![json!({"t": "Число целое", "n": "id"})];
        assert_eq!(format_hash(&a), format_hash(&b));
    }
}
