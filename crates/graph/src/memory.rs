use crate::store::{EdgeAttrs, GraphStore, NodeAttrs, NodeFilter, NodeKey, NodeRef};
use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use std::collections::HashMap;
use tracing::debug;

#[derive(Debug, Clone)]
pub struct StoredNode {
    pub attrs: NodeAttrs,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Properties owned by other processes; upserts must leave these alone.
    pub external: HashMap<String, String>,
}

#[derive(Debug, Clone)]
pub struct StoredEdge {
    pub attrs: EdgeAttrs,
    pub created_at: DateTime<Utc>,
}

type EdgeKey = (NodeKey, String, NodeKey);

/// In-memory [`GraphStore`] with the same observable semantics as the Neo4j
/// implementation. Used by the test suite and for dry runs against an empty
/// graph.
#[derive(Default)]
pub struct MemoryStore {
    nodes: DashMap<NodeKey, StoredNode>,
    edges: DashMap<EdgeKey, StoredEdge>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn node(&self, key: &NodeKey) -> Option<StoredNode> {
        self.nodes.get(key).map(|n| n.clone())
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Attach a property owned by some other process, the way audit or
    /// compliance jobs decorate nodes in the real graph.
    pub fn annotate(&self, key: &NodeKey, prop: impl Into<String>, value: impl Into<String>) {
        if let Some(mut node) = self.nodes.get_mut(key) {
            node.external.insert(prop.into(), value.into());
        }
    }
}

#[async_trait]
impl GraphStore for MemoryStore {
    async fn upsert_node(&self, key: &NodeKey, attrs: &NodeAttrs) -> Result<NodeRef> {
        let now = Utc::now();
        let mut created = false;

        self.nodes
            .entry(key.clone())
            .and_modify(|node| {
                node.attrs = attrs.clone();
                node.updated_at = now;
            })
            .or_insert_with(|| {
                created = true;
                StoredNode {
                    attrs: attrs.clone(),
                    created_at: now,
                    updated_at: now,
                    external: HashMap::new(),
                }
            });

        Ok(NodeRef {
            key: key.clone(),
            created,
        })
    }

    async fn upsert_relationship(
        &self,
        source: &NodeKey,
        relation_type: &str,
        target: &NodeKey,
        attrs: &EdgeAttrs,
    ) -> Result<bool> {
        if !self.nodes.contains_key(source) || !self.nodes.contains_key(target) {
            debug!(
                source = %source.name,
                relation = relation_type,
                target = %target.name,
                "Edge endpoint missing, skipping"
            );
            return Ok(false);
        }

        let edge_key = (source.clone(), relation_type.to_string(), target.clone());
        self.edges.entry(edge_key).or_insert_with(|| StoredEdge {
            attrs: attrs.clone(),
            created_at: Utc::now(),
        });

        Ok(true)
    }

    async fn count_nodes(&self, filter: &NodeFilter) -> Result<u64> {
        let count = match filter {
            NodeFilter::All => self.nodes.len(),
            NodeFilter::Tier(tier) => self
                .nodes
                .iter()
                .filter(|n| n.value().attrs.tier == *tier)
                .count(),
            NodeFilter::SuperLabel(label) => self
                .nodes
                .iter()
                .filter(|n| n.key().super_label == *label)
                .count(),
        };

        Ok(count as u64)
    }
}
