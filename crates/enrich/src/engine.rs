use crate::entity::EnrichedEntity;
use crate::normalize::normalize_name;
use crate::rules;
use crate::taxonomy::Taxonomy;
use extract::RawSpan;

/// Maps a raw extracted span into a typed, tiered graph entity.
///
/// Classification order: taxonomy row (declared values win), then the
/// label-family fallback rules. A label unknown to both is unmappable and
/// yields `None` — the caller drops the span from graph creation but still
/// counts it as extracted.
pub struct EnrichmentEngine {
    taxonomy: Taxonomy,
}

impl EnrichmentEngine {
    pub fn new(taxonomy: Taxonomy) -> Self {
        Self { taxonomy }
    }

    pub fn with_builtin_taxonomy() -> Self {
        Self::new(Taxonomy::builtin())
    }

    pub fn enrich(&self, span: &RawSpan) -> Option<EnrichedEntity> {
        let name = normalize_name(&span.text);
        if name.is_empty() {
            return None;
        }

        let ner_label = span.label.to_uppercase();

        let (super_label, fine_grained_type, tier) =
            if let Some(entry) = self.taxonomy.lookup(&ner_label) {
                (
                    entry.super_label,
                    entry.fine_grained_type.clone(),
                    entry.tier,
                )
            } else if let Some(family) = rules::family_for(&ner_label) {
                let fine = family.classify(&span.text);
                let tier = if fine != ner_label { 2 } else { 1 };
                (family.super_label, fine, tier)
            } else {
                return None;
            };

        let hierarchy_path = format!("{}/{}/{}", super_label.as_str(), ner_label, name);

        Some(EnrichedEntity {
            name,
            ner_label,
            super_label,
            fine_grained_type,
            tier,
            hierarchy_path,
            start: span.start,
        })
    }
}
