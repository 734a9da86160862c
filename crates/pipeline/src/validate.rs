use anyhow::Result;
use chrono::{DateTime, Utc};
use graph::{GraphStore, NodeFilter};
use serde::{Deserialize, Serialize};

/// Graph size counters captured once before and once after a run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationSnapshot {
    pub total_node_count: u64,
    pub tier1_count: u64,
    pub tier2_count: u64,
    pub captured_at: DateTime<Utc>,
}

impl ValidationSnapshot {
    pub async fn capture(store: &dyn GraphStore) -> Result<Self> {
        Ok(Self {
            total_node_count: store.count_nodes(&NodeFilter::All).await?,
            tier1_count: store.count_nodes(&NodeFilter::Tier(1)).await?,
            tier2_count: store.count_nodes(&NodeFilter::Tier(2)).await?,
            captured_at: Utc::now(),
        })
    }
}

/// Outcome of the run-level safety checks.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationReport {
    /// Hard invariant: the graph never shrinks across a run. A violation is
    /// fatal, never merely logged.
    pub node_preservation: bool,
    /// Soft expectation: refined subtypes outnumber direct categories.
    pub tier_hierarchy: bool,
}

impl ValidationReport {
    pub fn check(pre: &ValidationSnapshot, post: &ValidationSnapshot) -> Self {
        Self {
            node_preservation: post.total_node_count >= pre.total_node_count,
            tier_hierarchy: post.tier2_count > post.tier1_count,
        }
    }

    pub fn is_critical(&self) -> bool {
        !self.node_preservation
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot(total: u64, tier1: u64, tier2: u64) -> ValidationSnapshot {
        ValidationSnapshot {
            total_node_count: total,
            tier1_count: tier1,
            tier2_count: tier2,
            captured_at: Utc::now(),
        }
    }

    #[test]
    fn test_baseline_growth_passes() {
        let pre = snapshot(1_104_066, 500_000, 600_000);
        let post = snapshot(1_119_066, 500_200, 619_800);

        let report = ValidationReport::check(&pre, &post);
        assert!(report.node_preservation);
        assert!(report.tier_hierarchy);
        assert!(!report.is_critical());
    }

    #[test]
    fn test_node_regression_is_critical() {
        let pre = snapshot(1_104_066, 500_000, 600_000);
        let post = snapshot(1_104_065, 500_000, 599_999);

        let report = ValidationReport::check(&pre, &post);
        assert!(!report.node_preservation);
        assert!(report.is_critical());
    }

    #[test]
    fn test_tier_inversion_is_a_warning_not_critical() {
        let pre = snapshot(100, 80, 20);
        let post = snapshot(120, 90, 30);

        let report = ValidationReport::check(&pre, &post);
        assert!(report.node_preservation);
        assert!(!report.tier_hierarchy);
        assert!(!report.is_critical());
    }

    #[test]
    fn test_unchanged_graph_passes_preservation() {
        let pre = snapshot(10, 4, 6);
        let post = snapshot(10, 4, 6);

        assert!(ValidationReport::check(&pre, &post).node_preservation);
    }
}
