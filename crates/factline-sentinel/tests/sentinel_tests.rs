//! Escalation and queue draining against in-process stores

use factline_domain::traits::{CacheStore, Counter, ServiceError};
use factline_domain::{Claim, ClaimCategory, Post, User, VerificationResult, VerificationStatus};
use factline_guardrails::{Guardrails, GuardrailsConfig};
use factline_llm::MockProvider;
use factline_propagation::{PostRecord, PropagationConfig, PropagationEngine};
use factline_sentinel::{
    Alert, EscalationReason, Mention, Sentinel, SentinelConfig, VerificationRequest,
    VerificationWorker,
};
use factline_store::{CorpusIndex, MemoryCache, MockEmbeddingModel, SqliteGraphStore};
use factline_verifier::{Verifier, VerifierConfig};
use std::sync::Arc;
use std::time::Duration;
use tokio_test::assert_ok;

fn guardrails() -> Arc<Guardrails> {
    Arc::new(Guardrails::new(GuardrailsConfig::default()).unwrap())
}

fn config(threshold: u64) -> SentinelConfig {
    SentinelConfig {
        trending_threshold: threshold,
        ..SentinelConfig::default()
    }
}

fn mention(text: &str) -> Mention {
    Mention {
        claim: Claim::new(text, ClaimCategory::Other),
        post: None,
    }
}

#[tokio::test]
async fn test_imminent_harm_escalates_on_first_sighting() {
    let cache = Arc::new(MemoryCache::new());
    let mut alerts = cache.subscribe("alerts").unwrap();
    let mut sentinel = Sentinel::new(cache.clone(), guardrails(), config(500)).unwrap();

    let first = sentinel.observe(mention("Evacuation ordered for the east bank")).await;
    assert_eq!(first.escalation, Some(EscalationReason::ImminentHarm));
    assert!(first.queued);
    assert!(first.diagnostics.is_empty());
    assert_eq!(cache.queue_len("verification").unwrap(), 1);

    let alert: Alert = serde_json::from_str(&alerts.try_recv().unwrap()).unwrap();
    assert_eq!(alert.reason, EscalationReason::ImminentHarm);
    assert_eq!(alert.velocity, Some(1));

    // repeats inside the window stay quiet
    let second = sentinel.observe(mention("Evacuation ordered for the east bank")).await;
    assert_eq!(second.escalation, None);
    assert_eq!(cache.queue_len("verification").unwrap(), 1);
    assert_eq!(sentinel.metrics().mentions, 2);
    assert_eq!(sentinel.metrics().total_escalations(), 1);
}

#[tokio::test]
async fn test_emergency_language_escalates() {
    let cache = Arc::new(MemoryCache::new());
    let mut sentinel = Sentinel::new(cache, guardrails(), config(500)).unwrap();

    let observation = sentinel.observe(mention("State of emergency declared downtown")).await;
    assert_eq!(observation.escalation, Some(EscalationReason::Emergency));
}

#[tokio::test]
async fn test_ordinary_claim_below_threshold_is_not_escalated() {
    let cache = Arc::new(MemoryCache::new());
    let mut sentinel = Sentinel::new(cache.clone(), guardrails(), config(500)).unwrap();

    for _ in 0..10 {
        let observation = sentinel.observe(mention("The bridge toll doubles next week")).await;
        assert_eq!(observation.escalation, None);
    }
    assert_eq!(cache.queue_len("verification").unwrap(), 0);
}

fn user(id: &str, followers: u64) -> User {
    User {
        user_id: id.to_string(),
        username: format!("@{}", id),
        followers_count: followers,
        platform: "twitter".to_string(),
        account_created: None,
    }
}

fn post(id: &str, text: &str, created_at: u64) -> Post {
    Post {
        post_id: id.to_string(),
        text: text.to_string(),
        claim_text: text.to_string(),
        platform: "twitter".to_string(),
        created_at,
        engagement_count: 0,
        reach: 0,
    }
}

#[tokio::test]
async fn test_trending_escalates_once_and_traces() {
    const TEXT: &str = "The bridge toll doubles next week";
    let cache = Arc::new(MemoryCache::new());
    let mut alerts = cache.subscribe("alerts").unwrap();
    let graph = Arc::new(SqliteGraphStore::new(":memory:").unwrap());
    let engine = Arc::new(PropagationEngine::new(graph, PropagationConfig::default()).unwrap());
    let mut sentinel = Sentinel::new(cache.clone(), guardrails(), config(3))
        .unwrap()
        .with_propagation(engine);

    let mut escalations = Vec::new();
    for i in 0..6u64 {
        let shared_from = (i > 0).then(|| "p0".to_string());
        let record = PostRecord {
            user: user(&format!("u{}", i), 20_000),
            post: post(&format!("p{}", i), TEXT, 100 + i),
            shared_from,
        };
        let observation = sentinel
            .observe(Mention {
                claim: Claim::new(TEXT, ClaimCategory::Economic),
                post: Some(record),
            })
            .await;
        assert!(observation.diagnostics.is_empty(), "{:?}", observation.diagnostics);
        if let Some(reason) = observation.escalation {
            escalations.push((observation.velocity.count, reason, observation.propagation));
        }
    }

    assert_eq!(escalations.len(), 1);
    let (count, reason, report) = escalations.remove(0);
    assert_eq!(count, Some(4));
    assert_eq!(reason, EscalationReason::Trending);
    let report = report.unwrap();
    assert_eq!(report.origin_post_id, "p0");
    assert_eq!(report.tree.len(), 3);

    let alert: Alert = serde_json::from_str(&alerts.try_recv().unwrap()).unwrap();
    assert_eq!(alert.patient_zero_post_id.as_deref(), Some("p0"));
    assert_eq!(cache.queue_len("verification").unwrap(), 1);
}

#[tokio::test]
async fn test_priority_escalation_traces_origin() {
    const TEXT: &str = "Evacuation ordered for the east bank";
    let cache = Arc::new(MemoryCache::new());
    let mut alerts = cache.subscribe("alerts").unwrap();
    let graph = Arc::new(SqliteGraphStore::new(":memory:").unwrap());
    let engine = Arc::new(PropagationEngine::new(graph, PropagationConfig::default()).unwrap());
    let mut sentinel = Sentinel::new(cache, guardrails(), config(500))
        .unwrap()
        .with_propagation(engine);

    let observation = sentinel
        .observe(Mention {
            claim: Claim::new(TEXT, ClaimCategory::SafetySecurity),
            post: Some(PostRecord {
                user: user("u_first", 150),
                post: post("e1", TEXT, 1_000),
                shared_from: None,
            }),
        })
        .await;

    assert_eq!(observation.escalation, Some(EscalationReason::ImminentHarm));
    assert!(observation.diagnostics.is_empty(), "{:?}", observation.diagnostics);
    let report = observation.propagation.unwrap();
    assert_eq!(report.origin_post_id, "e1");
    assert_eq!(report.patient_zero.unwrap().user.user_id, "u_first");
    assert!(report.tree.is_empty());

    let alert: Alert = serde_json::from_str(&alerts.try_recv().unwrap()).unwrap();
    assert_eq!(alert.patient_zero_post_id.as_deref(), Some("e1"));
}

struct DownCache;

fn down<T>() -> Result<T, ServiceError> {
    Err(ServiceError::Unavailable("cache offline".to_string()))
}

impl CacheStore for DownCache {
    fn get(&self, _: &str) -> Result<Option<String>, ServiceError> {
        down()
    }
    fn set(&self, _: &str, _: &str, _: Option<Duration>) -> Result<(), ServiceError> {
        down()
    }
    fn delete(&self, _: &str) -> Result<bool, ServiceError> {
        down()
    }
    fn incr_with_expiry(&self, _: &str, _: Duration) -> Result<Counter, ServiceError> {
        down()
    }
    fn counter(&self, _: &str) -> Result<Option<Counter>, ServiceError> {
        down()
    }
    fn keys_with_prefix(&self, _: &str) -> Result<Vec<String>, ServiceError> {
        down()
    }
    fn push(&self, _: &str, _: &str) -> Result<usize, ServiceError> {
        down()
    }
    fn pop(&self, _: &str) -> Result<Option<String>, ServiceError> {
        down()
    }
    fn publish(&self, _: &str, _: &str) -> Result<usize, ServiceError> {
        down()
    }
}

#[tokio::test]
async fn test_cache_outage_degrades_without_failing() {
    let mut sentinel = Sentinel::new(Arc::new(DownCache), guardrails(), config(500)).unwrap();

    let observation = sentinel.observe(mention("Evacuation ordered for the east bank")).await;
    assert_eq!(observation.velocity.count, None);
    assert!(!observation.velocity.trending);
    // unknown velocity counts as a first sighting
    assert_eq!(observation.escalation, Some(EscalationReason::ImminentHarm));
    assert!(!observation.queued);
    assert_eq!(observation.diagnostics.len(), 3);

    let metrics = sentinel.metrics();
    assert_eq!(metrics.unknown_velocity, 1);
    assert_eq!(metrics.queue_failures, 1);
}

fn verifier() -> Arc<Verifier> {
    Arc::new(
        Verifier::new(
            Arc::new(MockEmbeddingModel::new(32)),
            Arc::new(CorpusIndex::in_memory(32).unwrap()),
            Arc::new(MockProvider::new("CONTRADICTS")),
            guardrails(),
            VerifierConfig::default(),
        )
        .unwrap(),
    )
}

#[tokio::test]
async fn test_worker_drains_queue_and_publishes_verdicts() {
    let cache = Arc::new(MemoryCache::new());
    let mut verdicts = cache.subscribe("verdicts").unwrap();
    let mut sentinel = Sentinel::new(cache.clone(), guardrails(), config(500)).unwrap();
    sentinel.observe(mention("Evacuation ordered for the east bank")).await;
    sentinel.observe(mention("The dam upstream has been poisoned")).await;
    cache.push("verification", "{ not a request").unwrap();

    let mut worker = VerificationWorker::new(verifier(), cache.clone(), &SentinelConfig::default());
    let results = assert_ok!(worker.drain().await);

    // empty corpus: both verdicts are unverified
    assert_eq!(results.len(), 2);
    assert!(results.iter().all(|r| r.status == VerificationStatus::Unverified));
    assert_eq!(cache.queue_len("verification").unwrap(), 0);

    let published: VerificationResult = serde_json::from_str(&verdicts.try_recv().unwrap()).unwrap();
    assert_eq!(published.claim_text, "Evacuation ordered for the east bank");

    let metrics = worker.metrics();
    assert_eq!(metrics.total_verified(), 2);
    assert_eq!(metrics.failed, 1);
}

#[tokio::test]
async fn test_failed_verification_is_dead_lettered() {
    let cache = Arc::new(MemoryCache::new());
    let blank = VerificationRequest {
        claim: Claim::new("   ", ClaimCategory::Other),
        reason: EscalationReason::Trending,
        velocity: Some(501),
        requested_at: 1_700_000_000,
    };
    cache.push("verification", &serde_json::to_string(&blank).unwrap()).unwrap();

    let mut worker = VerificationWorker::new(verifier(), cache.clone(), &SentinelConfig::default());
    let results = assert_ok!(worker.drain().await);

    assert!(results.is_empty());
    assert_eq!(cache.queue_len("verification").unwrap(), 0);
    assert_eq!(cache.queue_len("verification:dead").unwrap(), 1);
    assert_eq!(worker.metrics().failed, 1);
    assert_eq!(worker.metrics().dead_lettered, 1);

    let parked: VerificationRequest =
        serde_json::from_str(&cache.pop("verification:dead").unwrap().unwrap()).unwrap();
    assert_eq!(parked, blank);
}

#[tokio::test]
async fn test_worker_run_cycles() {
    let cache = Arc::new(MemoryCache::new());
    let mut sentinel = Sentinel::new(cache.clone(), guardrails(), config(500)).unwrap();
    sentinel.observe(mention("Evacuation ordered for the east bank")).await;

    let mut worker = VerificationWorker::new(verifier(), cache.clone(), &SentinelConfig::default());
    assert_ok!(worker.run_cycles(1).await);
    assert_eq!(worker.metrics().cycles, 1);
    assert_eq!(worker.metrics().total_verified(), 1);

    worker.reset_metrics();
    assert_eq!(worker.metrics().cycles, 0);
}
