//! Content-addressed page fingerprinting.

use serde_json::Value;
use sha2::{Digest, Sha256};

/// Compute the content fingerprint of a page document.
///
/// The document is rendered through `serde_json`, whose default map keeps
/// object keys sorted, so two documents with the same content always hash
/// to the same fingerprint regardless of field order on the wire.
pub fn page_fingerprint(doc: &Value) -> String {
    let canonical = doc.to_string();
    let mut hasher = Sha256::new();
    hasher.update(canonical.as_bytes());
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_fingerprint_stability() {
        let doc = json!({"page": 1, "hasMore": true, "pageCount": 2, "pictures": []});
        assert_eq!(page_fingerprint(&doc), page_fingerprint(&doc));
    }

    #[test]
    fn test_fingerprint_field_order_independent() {
        let a: Value = serde_json::from_str(r#"{"page": 1, "hasMore": true}"#).unwrap();
        let b: Value = serde_json::from_str(r#"{"hasMore": true, "page": 1}"#).unwrap();
        assert_eq!(page_fingerprint(&a), page_fingerprint(&b));
    }

    #[test]
    fn test_fingerprint_different_content() {
        let a = json!({"page": 1});
        let b = json!({"page": 2});
        assert_ne!(page_fingerprint(&a), page_fingerprint(&b));
    }

    #[test]
    fn test_fingerprint_format() {
        let hash = page_fingerprint(&json!({"page": 1}));
        assert_eq!(hash.len(), 64);
        assert!(hash.chars().all(|c| c.is_ascii_hexdigit()));
    }
}
