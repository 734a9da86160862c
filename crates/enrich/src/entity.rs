use serde::{Deserialize, Serialize};

/// Coarse-grained category assigned to a graph node as its primary type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SuperLabel {
    ThreatActor,
    Malware,
    Vulnerability,
    Indicator,
    AttackPattern,
    Tool,
    Campaign,
    Incident,
    Organization,
    Sector,
    Location,
    System,
    Mitigation,
}

impl SuperLabel {
    pub fn as_str(&self) -> &'static str {
        match self {
            SuperLabel::ThreatActor => "ThreatActor",
            SuperLabel::Malware => "Malware",
            SuperLabel::Vulnerability => "Vulnerability",
            SuperLabel::Indicator => "Indicator",
            SuperLabel::AttackPattern => "AttackPattern",
            SuperLabel::Tool => "Tool",
            SuperLabel::Campaign => "Campaign",
            SuperLabel::Incident => "Incident",
            SuperLabel::Organization => "Organization",
            SuperLabel::Sector => "Sector",
            SuperLabel::Location => "Location",
            SuperLabel::System => "System",
            SuperLabel::Mitigation => "Mitigation",
        }
    }
}

impl std::fmt::Display for SuperLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A classified mention, ready for graph upsert. `start` is kept from the
/// raw span so the relationship extractor can apply its proximity rule.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnrichedEntity {
    pub name: String,
    pub ner_label: String,
    pub super_label: SuperLabel,
    pub fine_grained_type: String,
    /// 1 = direct category, 2 = refined subtype.
    pub tier: u8,
    pub hierarchy_path: String,
    pub start: usize,
}
