//! Async propagation engine

use crate::analysis;
use crate::config::PropagationConfig;
use crate::error::PropagationError;
use crate::types::{CoordinationReport, PostRecord};
use factline_domain::traits::{GraphStore, ServiceError};
use factline_domain::{
    now_secs, Amplifier, PatientZero, PropagationReport, SpreadStats, TreeNode,
};
use factline_store::call_blocking;
use std::sync::Arc;
use tracing::{info, warn};

/// Traces how claims spread through the social graph
///
/// Every graph section runs on the blocking pool under the configured
/// deadline. Reports degrade per section: a failed section is left empty and
/// a diagnostic explains why.
pub struct PropagationEngine {
    graph: Arc<dyn GraphStore>,
    config: PropagationConfig,
}

impl PropagationEngine {
    /// Create an engine over a graph store
    pub fn new(graph: Arc<dyn GraphStore>, config: PropagationConfig) -> Result<Self, PropagationError> {
        config.validate().map_err(PropagationError::Config)?;
        Ok(Self { graph, config })
    }

    /// Active configuration
    pub fn config(&self) -> &PropagationConfig {
        &self.config
    }

    async fn section<T, F>(&self, f: F) -> Result<T, ServiceError>
    where
        F: FnOnce(&dyn GraphStore) -> Result<T, ServiceError> + Send + 'static,
        T: Send + 'static,
    {
        let graph = Arc::clone(&self.graph);
        call_blocking(self.config.graph_timeout(), move || f(graph.as_ref())).await
    }

    /// Record a post, its author and its reshare edge
    pub async fn ingest(&self, record: PostRecord) -> Result<(), PropagationError> {
        let post_id = record.post.post_id.clone();
        self.section(move |graph| {
            graph.upsert_user(&record.user)?;
            graph.upsert_post(&record.post)?;
            graph.link_posted(&record.user.user_id, &record.post.post_id, record.post.created_at)?;
            if let Some(original) = &record.shared_from {
                graph.link_shared_from(&record.post.post_id, original)?;
            }
            Ok(())
        })
        .await?;
        info!("ingested post {}", post_id);
        Ok(())
    }

    /// Earliest post carrying the claim, with its author
    pub async fn patient_zero(&self, claim_text: &str) -> Result<Option<PatientZero>, PropagationError> {
        let needle = claim_text.trim().to_string();
        if needle.is_empty() {
            return Err(PropagationError::EmptyQuery);
        }
        let found = self
            .section(move |graph| analysis::find_patient_zero(graph, &needle))
            .await?;
        match &found {
            Some(pz) => info!("patient zero for claim: post {} by {}", pz.post.post_id, pz.user.user_id),
            None => info!("no post carries the claim"),
        }
        Ok(found)
    }

    async fn traverse(&self, origin: &str, depth_limit: Option<usize>) -> Result<Vec<TreeNode>, ServiceError> {
        let origin = origin.to_string();
        self.section(move |graph| analysis::traverse(graph, &origin, depth_limit))
            .await
    }

    /// Reshares of `origin` up to `max_depth` hops
    pub async fn tree(&self, origin: &str, max_depth: usize) -> Result<Vec<TreeNode>, PropagationError> {
        Ok(self.traverse(origin, Some(max_depth)).await?)
    }

    /// High-follower users who reshared `origin` near the root
    pub async fn amplifiers(&self, origin: &str) -> Result<Vec<Amplifier>, PropagationError> {
        let tree = self.traverse(origin, Some(self.config.amplifier_max_depth)).await?;
        Ok(self.amplifiers_in(&tree))
    }

    /// Spread of `origin` over every reachable reshare
    pub async fn spread_stats(&self, origin: &str) -> Result<SpreadStats, PropagationError> {
        let tree = self.traverse(origin, None).await?;
        Ok(analysis::spread_stats(&tree))
    }

    fn amplifiers_in(&self, tree: &[TreeNode]) -> Vec<Amplifier> {
        analysis::amplifiers(
            tree,
            self.config.amplifier_max_depth,
            self.config.amplifier_min_followers,
            self.config.amplifier_limit,
        )
    }

    /// Full report on an origin post
    ///
    /// One traversal over every reachable reshare feeds the tree (cut at
    /// `max_depth`), the amplifiers and the spread statistics. Never fails.
    pub async fn report(&self, origin_post_id: &str, max_depth: usize) -> PropagationReport {
        let mut diagnostics = Vec::new();

        let origin = origin_post_id.to_string();
        let patient_zero = match self
            .section(move |graph| {
                let Some(post) = graph.post(&origin)? else {
                    return Ok(None);
                };
                Ok(graph.author_of(&origin)?.map(|user| PatientZero { post, user }))
            })
            .await
        {
            Ok(found) => found,
            Err(e) => {
                warn!("origin lookup for {} failed: {}", origin_post_id, e);
                diagnostics.push(format!("origin lookup failed: {}", e));
                None
            }
        };

        let reachable = match self.traverse(origin_post_id, None).await {
            Ok(nodes) => nodes,
            Err(e) => {
                warn!("traversal of {} failed: {}", origin_post_id, e);
                diagnostics.push(format!("propagation traversal failed: {}", e));
                Vec::new()
            }
        };

        let amplifiers = self.amplifiers_in(&reachable);
        let spread_stats = analysis::spread_stats(&reachable);
        let tree: Vec<TreeNode> = reachable.into_iter().filter(|n| n.depth <= max_depth).collect();

        info!(
            "report for {}: {} reshares in tree, {} amplifiers, reach {}",
            origin_post_id,
            tree.len(),
            amplifiers.len(),
            spread_stats.total_reach
        );

        PropagationReport {
            origin_post_id: origin_post_id.to_string(),
            patient_zero,
            tree,
            amplifiers,
            spread_stats,
            diagnostics,
            generated_at: now_secs(),
        }
    }

    /// Patient-zero search followed by a full report on the origin found
    pub async fn trace_claim(
        &self,
        claim_text: &str,
        max_depth: usize,
    ) -> Result<Option<PropagationReport>, PropagationError> {
        let Some(origin) = self.patient_zero(claim_text).await? else {
            return Ok(None);
        };
        let mut report = self.report(&origin.post.post_id, max_depth).await;
        if report.patient_zero.is_none() {
            report.patient_zero = Some(origin);
        }
        Ok(Some(report))
    }

    /// Burst posters and identical-text clusters as of `now`
    ///
    /// Bursts look back over the configured lookback; clusters consider
    /// every posting up to `now`. Never fails.
    pub async fn coordinated_behaviour(&self, now: u64) -> CoordinationReport {
        let mut report = CoordinationReport {
            generated_at: now,
            ..CoordinationReport::default()
        };

        let from = now.saturating_sub(self.config.burst_lookback_secs);
        let (threshold, window, limit) = (
            self.config.burst_threshold,
            self.config.burst_window_secs,
            self.config.burst_limit,
        );
        match self
            .section(move |graph| {
                let postings = graph.postings_between(from, now)?;
                Ok(analysis::burst_posters(&postings, threshold, window, limit))
            })
            .await
        {
            Ok(found) => report.burst_posters = found,
            Err(e) => {
                warn!("burst detection failed: {}", e);
                report.diagnostics.push(format!("burst detection failed: {}", e));
            }
        }

        let (min_users, limit) = (self.config.cluster_min_users, self.config.cluster_limit);
        match self
            .section(move |graph| {
                let postings = graph.postings_between(0, now)?;
                Ok(analysis::identical_text_clusters(&postings, min_users, limit))
            })
            .await
        {
            Ok(found) => report.clusters = found,
            Err(e) => {
                warn!("cluster detection failed: {}", e);
                report.diagnostics.push(format!("cluster detection failed: {}", e));
            }
        }

        if !report.burst_posters.is_empty() || !report.clusters.is_empty() {
            warn!(
                "coordinated behaviour: {} burst posters, {} identical-text clusters",
                report.burst_posters.len(),
                report.clusters.len()
            );
        }
        report
    }
}
