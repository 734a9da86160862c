use crate::entity::{EnrichedEntity, SuperLabel};

/// Two mentions must occur within this many characters of each other to be
/// considered potentially related.
pub const PROXIMITY_WINDOW: usize = 500;

/// One row of the semantic pattern table: a relation type plus the super
/// label sets valid on each side.
#[derive(Debug)]
pub struct RelationPattern {
    pub relation_type: &'static str,
    pub sources: &'static [SuperLabel],
    pub targets: &'static [SuperLabel],
    pub confidence: f64,
}

pub const PATTERNS: &[RelationPattern] = &[
    RelationPattern {
        relation_type: "EXPLOITS",
        sources: &[SuperLabel::ThreatActor, SuperLabel::Malware],
        targets: &[SuperLabel::Vulnerability],
        confidence: 0.7,
    },
    RelationPattern {
        relation_type: "USES",
        sources: &[SuperLabel::ThreatActor],
        targets: &[SuperLabel::Malware, SuperLabel::Tool, SuperLabel::AttackPattern],
        confidence: 0.6,
    },
    RelationPattern {
        relation_type: "TARGETS",
        sources: &[SuperLabel::ThreatActor, SuperLabel::Malware, SuperLabel::Campaign],
        targets: &[SuperLabel::Organization, SuperLabel::Sector, SuperLabel::Location],
        confidence: 0.6,
    },
    RelationPattern {
        relation_type: "AFFECTS",
        sources: &[SuperLabel::Malware, SuperLabel::Vulnerability],
        targets: &[SuperLabel::System, SuperLabel::Organization],
        confidence: 0.6,
    },
    RelationPattern {
        relation_type: "ATTRIBUTED_TO",
        sources: &[SuperLabel::Campaign, SuperLabel::Incident],
        targets: &[SuperLabel::ThreatActor],
        confidence: 0.5,
    },
    RelationPattern {
        relation_type: "MITIGATES",
        sources: &[SuperLabel::Mitigation, SuperLabel::Tool],
        targets: &[SuperLabel::Vulnerability, SuperLabel::Malware, SuperLabel::AttackPattern],
        confidence: 0.7,
    },
    RelationPattern {
        relation_type: "INDICATES",
        sources: &[SuperLabel::Indicator],
        targets: &[SuperLabel::Malware, SuperLabel::ThreatActor, SuperLabel::Campaign],
        confidence: 0.8,
    },
];

/// A candidate edge between two mentions of one document. Candidates may
/// repeat; deduplication happens at the upsert boundary, never here.
#[derive(Debug, Clone)]
pub struct CandidateEdge<'a> {
    pub source: &'a EnrichedEntity,
    pub relation_type: &'static str,
    pub target: &'a EnrichedEntity,
    pub confidence: f64,
}

/// Infer candidate edges between the enriched entities of one document.
///
/// Every ordered pair of distinct mentions whose super labels match a
/// pattern row and whose start offsets lie within [`PROXIMITY_WINDOW`]
/// emits a candidate. O(n²) in mentions per document, which holds up only
/// while documents stay small; a sorted-position sliding window is the
/// upgrade path if per-document entity counts grow.
pub fn extract_candidates<'a>(entities: &'a [EnrichedEntity]) -> Vec<CandidateEdge<'a>> {
    let mut candidates = Vec::new();

    for (i, source) in entities.iter().enumerate() {
        for (j, target) in entities.iter().enumerate() {
            if i == j {
                continue;
            }

            let distance = source.start.abs_diff(target.start);
            if distance >= PROXIMITY_WINDOW {
                continue;
            }

            let matched = PATTERNS.iter().find(|p| {
                p.sources.contains(&source.super_label) && p.targets.contains(&target.super_label)
            });

            if let Some(pattern) = matched {
                candidates.push(CandidateEdge {
                    source,
                    relation_type: pattern.relation_type,
                    target,
                    confidence: pattern.confidence,
                });
            }
        }
    }

    candidates
}
