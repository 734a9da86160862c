use crate::entity::SuperLabel;

/// One fallback refinement: if the mention text contains `keyword`, the
/// entity's fine-grained type becomes `fine_grained_type`.
#[derive(Debug, Clone)]
pub struct FallbackRule {
    pub keyword: &'static str,
    pub fine_grained_type: &'static str,
}

/// Fallback classification for one NER label family, used when the taxonomy
/// has no row for the label. Rules are ordered and evaluated top-down against
/// the lowercased mention text; the first hit wins, no hit leaves the
/// fine-grained type at the raw label.
#[derive(Debug, Clone)]
pub struct FallbackFamily {
    pub label: &'static str,
    pub super_label: SuperLabel,
    pub rules: &'static [FallbackRule],
}

const MALWARE_RULES: &[FallbackRule] = &[
    FallbackRule { keyword: "ransomware", fine_grained_type: "RANSOMWARE" },
    FallbackRule { keyword: "trojan", fine_grained_type: "TROJAN" },
    FallbackRule { keyword: "worm", fine_grained_type: "WORM" },
    FallbackRule { keyword: "botnet", fine_grained_type: "BOTNET" },
    FallbackRule { keyword: "wiper", fine_grained_type: "WIPER" },
    FallbackRule { keyword: "stealer", fine_grained_type: "INFOSTEALER" },
    FallbackRule { keyword: "loader", fine_grained_type: "LOADER" },
];

const THREAT_ACTOR_RULES: &[FallbackRule] = &[
    FallbackRule { keyword: "insider", fine_grained_type: "INSIDER_THREAT" },
    FallbackRule { keyword: "hacktivist", fine_grained_type: "HACKTIVIST_GROUP" },
];

const EXPLOIT_RULES: &[FallbackRule] = &[
    FallbackRule { keyword: "kit", fine_grained_type: "EXPLOIT_KIT" },
    FallbackRule { keyword: "zero-day", fine_grained_type: "ZERO_DAY_EXPLOIT" },
    FallbackRule { keyword: "0-day", fine_grained_type: "ZERO_DAY_EXPLOIT" },
];

const INFRASTRUCTURE_RULES: &[FallbackRule] = &[
    FallbackRule { keyword: "c2", fine_grained_type: "COMMAND_AND_CONTROL" },
    FallbackRule { keyword: "command and control", fine_grained_type: "COMMAND_AND_CONTROL" },
    FallbackRule { keyword: "proxy", fine_grained_type: "PROXY_INFRASTRUCTURE" },
];

/// Label families covered by fallback classification. Labels outside both
/// this table and the taxonomy are unmappable and get dropped upstream.
pub const FALLBACK_FAMILIES: &[FallbackFamily] = &[
    FallbackFamily {
        label: "MALWARE",
        super_label: SuperLabel::Malware,
        rules: MALWARE_RULES,
    },
    FallbackFamily {
        label: "THREAT_ACTOR",
        super_label: SuperLabel::ThreatActor,
        rules: THREAT_ACTOR_RULES,
    },
    FallbackFamily {
        label: "EXPLOIT",
        super_label: SuperLabel::AttackPattern,
        rules: EXPLOIT_RULES,
    },
    FallbackFamily {
        label: "INFRASTRUCTURE",
        super_label: SuperLabel::System,
        rules: INFRASTRUCTURE_RULES,
    },
];

pub fn family_for(label: &str) -> Option<&'static FallbackFamily> {
    let label = label.to_uppercase();
    FALLBACK_FAMILIES.iter().find(|f| f.label == label)
}

impl FallbackFamily {
    /// First matching rule's type, or the raw label when nothing matches.
    pub fn classify(&self, text: &str) -> String {
        let lowered = text.to_lowercase();
        self.rules
            .iter()
            .find(|rule| lowered.contains(rule.keyword))
            .map(|rule| rule.fine_grained_type.to_string())
            .unwrap_or_else(|| self.label.to_string())
    }
}
