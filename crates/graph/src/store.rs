use anyhow::Result;
use async_trait::async_trait;
use enrich::{EnrichedEntity, SuperLabel};
use serde::{Deserialize, Serialize};

/// Graph identity of a node. One `(super_label, name)` pair maps to exactly
/// one node, no matter how many documents mention it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NodeKey {
    pub super_label: SuperLabel,
    pub name: String,
}

impl NodeKey {
    pub fn new(super_label: SuperLabel, name: impl Into<String>) -> Self {
        Self {
            super_label,
            name: name.into(),
        }
    }
}

impl From<&EnrichedEntity> for NodeKey {
    fn from(entity: &EnrichedEntity) -> Self {
        Self {
            super_label: entity.super_label,
            name: entity.name.clone(),
        }
    }
}

/// Mutable node fields. These get refreshed on every upsert; `created_at`
/// never does.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeAttrs {
    pub ner_label: String,
    pub fine_grained_type: String,
    pub hierarchy_path: String,
    pub tier: u8,
}

impl From<&EnrichedEntity> for NodeAttrs {
    fn from(entity: &EnrichedEntity) -> Self {
        Self {
            ner_label: entity.ner_label.clone(),
            fine_grained_type: entity.fine_grained_type.clone(),
            hierarchy_path: entity.hierarchy_path.clone(),
            tier: entity.tier,
        }
    }
}

/// Edge attributes, written once when the edge is first created.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EdgeAttrs {
    pub confidence: f64,
}

/// Outcome of a node upsert: the key it landed on and whether this call
/// created it.
#[derive(Debug, Clone)]
pub struct NodeRef {
    pub key: NodeKey,
    pub created: bool,
}

/// Node count filters backing the validation snapshot.
#[derive(Debug, Clone)]
pub enum NodeFilter {
    All,
    Tier(u8),
    SuperLabel(SuperLabel),
}

/// Storage contract of the pipeline. These three operations are the sole
/// mechanism by which idempotence and preservation of pre-existing graph
/// content are guaranteed; upstream components are free to over-generate
/// and re-send because this boundary absorbs it.
#[async_trait]
pub trait GraphStore: Send + Sync {
    /// Create-or-update a node. First call for a key creates it with an
    /// immutable `created_at`; later calls refresh only mutable fields and
    /// never erase properties written by unrelated processes.
    async fn upsert_node(&self, key: &NodeKey, attrs: &NodeAttrs) -> Result<NodeRef>;

    /// Create-or-skip an edge. Returns `Ok(false)` when either endpoint is
    /// missing; repeated calls with an identical key triple never create
    /// parallel edges.
    async fn upsert_relationship(
        &self,
        source: &NodeKey,
        relation_type: &str,
        target: &NodeKey,
        attrs: &EdgeAttrs,
    ) -> Result<bool>;

    async fn count_nodes(&self, filter: &NodeFilter) -> Result<u64>;
}
