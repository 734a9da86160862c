use crate::store::{EdgeAttrs, GraphStore, NodeAttrs, NodeFilter, NodeKey, NodeRef};
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use neo4rs::{Graph, Query};
use tracing::debug;

/// Neo4j-backed [`GraphStore`]. Nodes carry the generic `:Entity` label with
/// `(super_label, name)` as the merge key; relationships use a single
/// `:RELATION` type discriminated by a `type` property so the relation kind
/// can stay data-driven.
pub struct Neo4jStore {
    graph: Graph,
}

impl Neo4jStore {
    pub fn new(graph: Graph) -> Self {
        Self { graph }
    }

    pub async fn connect(uri: &str, user: &str, password: &str) -> Result<Self> {
        let graph = Graph::new(uri, user, password)
            .await
            .context("Failed to connect to Neo4j")?;
        Ok(Self::new(graph))
    }

    /// Initialize schema: create indexes
    pub async fn init_schema(&self) -> Result<()> {
        let query = Query::new(
            "CREATE INDEX entity_key_index IF NOT EXISTS FOR (e:Entity) ON (e.super_label, e.name)"
                .to_string(),
        );
        self.graph
            .run(query)
            .await
            .context("Failed to create index on Entity key")?;

        let query = Query::new(
            "CREATE INDEX entity_tier_index IF NOT EXISTS FOR (e:Entity) ON (e.tier)".to_string(),
        );
        self.graph
            .run(query)
            .await
            .context("Failed to create index on Entity.tier")?;

        Ok(())
    }
}

#[async_trait]
impl GraphStore for Neo4jStore {
    async fn upsert_node(&self, key: &NodeKey, attrs: &NodeAttrs) -> Result<NodeRef> {
        let now = Utc::now().to_rfc3339();

        // MERGE on the identity key only. created_at is set exclusively in
        // the ON CREATE branch; the unconditional SET touches nothing but
        // the mutable fields, so properties written by other processes
        // survive re-merges.
        let query = Query::new(
            r#"
            MERGE (e:Entity {super_label: $super_label, name: $name})
            ON CREATE SET e.created_at = $now
            SET e.updated_at = $now,
                e.ner_label = $ner_label,
                e.fine_grained_type = $fine_grained_type,
                e.hierarchy_path = $hierarchy_path,
                e.tier = $tier
            RETURN e.created_at = $now AS created
            "#
            .to_string(),
        )
        .param("super_label", key.super_label.to_string())
        .param("name", key.name.clone())
        .param("now", now)
        .param("ner_label", attrs.ner_label.clone())
        .param("fine_grained_type", attrs.fine_grained_type.clone())
        .param("hierarchy_path", attrs.hierarchy_path.clone())
        .param("tier", attrs.tier as i64);

        let mut result = self
            .graph
            .execute(query)
            .await
            .context("Failed to upsert entity node")?;

        let created = if let Some(row) = result.next().await? {
            row.get::<bool>("created").unwrap_or(false)
        } else {
            false
        };

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
        let now = Utc::now().to_rfc3339();

        // MATCH both endpoints instead of MERGE: a candidate edge whose
        // endpoint never made it into the graph is reported, not satisfied
        // with a placeholder node.
        let query = Query::new(
            r#"
            MATCH (s:Entity {super_label: $source_super_label, name: $source_name})
            MATCH (t:Entity {super_label: $target_super_label, name: $target_name})
            MERGE (s)-[r:RELATION {type: $relation_type}]->(t)
            ON CREATE SET r.confidence = $confidence, r.created_at = $now
            RETURN r
            "#
            .to_string(),
        )
        .param("source_super_label", source.super_label.to_string())
        .param("source_name", source.name.clone())
        .param("target_super_label", target.super_label.to_string())
        .param("target_name", target.name.clone())
        .param("relation_type", relation_type.to_string())
        .param("confidence", attrs.confidence)
        .param("now", now);

        let mut result = self
            .graph
            .execute(query)
            .await
            .context("Failed to upsert relationship")?;

        let written = result.next().await?.is_some();
        if !written {
            debug!(
                source = %source.name,
                relation = relation_type,
                target = %target.name,
                "Edge endpoint missing, skipping"
            );
        }

        Ok(written)
    }

    async fn count_nodes(&self, filter: &NodeFilter) -> Result<u64> {
        let query = match filter {
            NodeFilter::All => {
                Query::new("MATCH (e:Entity) RETURN count(e) as count".to_string())
            }
            NodeFilter::Tier(tier) => Query::new(
                "MATCH (e:Entity) WHERE e.tier = $tier RETURN count(e) as count".to_string(),
            )
            .param("tier", *tier as i64),
            NodeFilter::SuperLabel(label) => Query::new(
                "MATCH (e:Entity) WHERE e.super_label = $super_label RETURN count(e) as count"
                    .to_string(),
            )
            .param("super_label", label.to_string()),
        };

        let mut result = self
            .graph
            .execute(query)
            .await
            .context("Failed to count entity nodes")?;

        let count = if let Some(row) = result.next().await? {
            row.get::<i64>("count").unwrap_or(0) as u64
        } else {
            0
        };

        Ok(count)
    }
}
