use crate::entity::SuperLabel;
use std::collections::HashMap;

/// Declared classification for one NER label. When a label has a taxonomy
/// row, these values win over the fallback rules.
#[derive(Debug, Clone)]
pub struct TaxonomyEntry {
    pub super_label: SuperLabel,
    pub tier: u8,
    pub fine_grained_type: String,
}

/// Static, read-only mapping of NER labels to their declared classification.
/// Loaded once; lookups are case-insensitive on the label.
pub struct Taxonomy {
    entries: HashMap<String, TaxonomyEntry>,
}

impl Taxonomy {
    /// The built-in label table. Tier follows the canonical rule: 2 when the
    /// fine-grained type differs from the NER label, 1 otherwise.
    pub fn builtin() -> Self {
        let rows: &[(&str, SuperLabel, &str)] = &[
            ("IP", SuperLabel::Indicator, "IP_ADDRESS"),
            ("IPV4", SuperLabel::Indicator, "IP_ADDRESS"),
            ("DOMAIN", SuperLabel::Indicator, "DOMAIN_NAME"),
            ("URL", SuperLabel::Indicator, "URL"),
            ("MD5", SuperLabel::Indicator, "FILE_HASH"),
            ("SHA1", SuperLabel::Indicator, "FILE_HASH"),
            ("SHA256", SuperLabel::Indicator, "FILE_HASH"),
            ("EMAIL", SuperLabel::Indicator, "EMAIL_ADDRESS"),
            ("CVE", SuperLabel::Vulnerability, "CVE"),
            ("VULNERABILITY", SuperLabel::Vulnerability, "VULNERABILITY"),
            ("ATTACK_PATTERN", SuperLabel::AttackPattern, "ATTACK_PATTERN"),
            ("TTP", SuperLabel::AttackPattern, "ATTACK_TECHNIQUE"),
            ("TOOL", SuperLabel::Tool, "TOOL"),
            ("CAMPAIGN", SuperLabel::Campaign, "CAMPAIGN"),
            ("INCIDENT", SuperLabel::Incident, "INCIDENT"),
            ("ORG", SuperLabel::Organization, "ORGANIZATION"),
            ("ORGANIZATION", SuperLabel::Organization, "ORGANIZATION"),
            ("COMPANY", SuperLabel::Organization, "COMPANY"),
            ("SECTOR", SuperLabel::Sector, "SECTOR"),
            ("INDUSTRY", SuperLabel::Sector, "SECTOR"),
            ("GPE", SuperLabel::Location, "GEOPOLITICAL_ENTITY"),
            ("COUNTRY", SuperLabel::Location, "COUNTRY"),
            ("CITY", SuperLabel::Location, "CITY"),
            ("LOCATION", SuperLabel::Location, "LOCATION"),
            ("PRODUCT", SuperLabel::System, "PRODUCT"),
            ("SOFTWARE", SuperLabel::System, "SOFTWARE"),
            ("OS", SuperLabel::System, "OPERATING_SYSTEM"),
            ("MITIGATION", SuperLabel::Mitigation, "MITIGATION"),
            ("COUNTERMEASURE", SuperLabel::Mitigation, "MITIGATION"),
        ];

        let entries = rows
            .iter()
            .map(|(label, super_label, fine)| {
                let tier = if fine != label { 2 } else { 1 };
                (
                    (*label).to_string(),
                    TaxonomyEntry {
                        super_label: *super_label,
                        tier,
                        fine_grained_type: (*fine).to_string(),
                    },
                )
            })
            .collect();

        Self { entries }
    }

    pub fn lookup(&self, label: &str) -> Option<&TaxonomyEntry> {
        self.entries.get(&label.to_uppercase())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_is_case_insensitive() {
        let taxonomy = Taxonomy::builtin();

        let entry = taxonomy.lookup("cve").unwrap();
        assert_eq!(entry.super_label, SuperLabel::Vulnerability);
    }

    #[test]
    fn test_unknown_label_has_no_entry() {
        let taxonomy = Taxonomy::builtin();
        assert!(taxonomy.lookup("DINOSAUR").is_none());
    }

    #[test]
    fn test_declared_tiers_agree_with_classification_change_rule() {
        let taxonomy = Taxonomy::builtin();

        for (label, entry) in &taxonomy.entries {
            let derived = if entry.fine_grained_type != *label { 2 } else { 1 };
            assert_eq!(
                entry.tier, derived,
                "taxonomy row {} declares tier {} but the canonical rule derives {}",
                label, entry.tier, derived
            );
        }
    }

    #[test]
    fn test_refined_labels_are_tier_two() {
        let taxonomy = Taxonomy::builtin();

        assert_eq!(taxonomy.lookup("SHA256").unwrap().tier, 2);
        assert_eq!(taxonomy.lookup("TOOL").unwrap().tier, 1);
    }
}
