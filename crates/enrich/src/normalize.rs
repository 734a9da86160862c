use regex::Regex;
use std::sync::OnceLock;

fn edge_punctuation() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[.,!?;:'\x22()\[\]]+|[.,!?;:'\x22()\[\]]+$").unwrap())
}

fn whitespace() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\s+").unwrap())
}

/// Normalize an entity name before it becomes part of a node identity key:
/// trim, strip punctuation stuck to the edges, collapse internal whitespace.
///
/// Deliberately deterministic. No fuzzy alias resolution happens here;
/// identity keys must be stable across runs for upserts to stay idempotent.
pub fn normalize_name(name: &str) -> String {
    let trimmed = name.trim();
    let stripped = edge_punctuation().replace_all(trimmed, "");
    whitespace().replace_all(stripped.trim(), " ").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalization() {
        assert_eq!(normalize_name("APT29,"), "APT29");
        assert_eq!(normalize_name("  Cobalt   Strike  "), "Cobalt Strike");
        assert_eq!(normalize_name("\"Emotet\""), "Emotet");
    }

    #[test]
    fn test_interior_punctuation_is_kept() {
        assert_eq!(normalize_name("CVE-2024-3094"), "CVE-2024-3094");
        assert_eq!(normalize_name("198.51.100.7"), "198.51.100.7");
    }

    #[test]
    fn test_deterministic() {
        let once = normalize_name(" Lazarus  Group. ");
        let twice = normalize_name(&once);
        assert_eq!(once, twice);
    }
}
