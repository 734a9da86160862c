use sha2::{Digest, Sha256};

/// Generate a stable document ID from file path.
///
/// Identity is path-based, not content-based: renaming a file makes it look
/// new and it gets reprocessed; editing it in place without renaming does
/// not. Reprocessing is safe because upserts are idempotent.
pub fn document_id(path: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(path.as_bytes());
    let result = hasher.finalize();
    hex::encode(&result[..16])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_id_is_stable() {
        assert_eq!(document_id("reports/apt29.md"), document_id("reports/apt29.md"));
    }

    #[test]
    fn test_rename_changes_identity() {
        assert_ne!(
            document_id("reports/apt29.md"),
            document_id("reports/apt29-renamed.md")
        );
    }

    #[test]
    fn test_id_shape() {
        let id = document_id("a.txt");
        assert_eq!(id.len(), 32);
        assert!(id.chars().all(|c| c.is_ascii_hexdigit()));
    }
}
