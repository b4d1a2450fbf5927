//! Stance classifier

use crate::prompt::stance_prompt;
use crate::types::{Stance, StanceOutcome};
use factline_domain::traits::{GenerationParams, TextGenerator};
use factline_llm::clean_response;
use factline_store::call_blocking;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// Parse a model answer
///
/// Only an unambiguous SUPPORTS counts as support. Both tokens together,
/// negations and anything unrecognised read as `Contradicts`.
///
/// # Examples
///
/// ```
/// use factline_verifier::{parse_stance, Stance};
///
/// assert_eq!(parse_stance("supports"), Stance::Supports);
/// assert_eq!(parse_stance("SUPPORTS or CONTRADICTS"), Stance::Contradicts);
/// assert_eq!(parse_stance("I am not sure"), Stance::Contradicts);
/// ```
pub fn parse_stance(raw: &str) -> Stance {
    let answer = clean_response(raw).to_uppercase();
    let supports = answer.contains("SUPPORTS")
        && !answer.contains("CONTRADICT")
        && !answer.contains("NOT SUPPORT")
        && !answer.contains("UNSUPPORT");
    if supports {
        Stance::Supports
    } else {
        Stance::Contradicts
    }
}

/// Labels evidence excerpts as supporting or contradicting a claim
pub struct StanceClassifier {
    generator: Arc<dyn TextGenerator>,
    params: GenerationParams,
    timeout: Duration,
}

impl StanceClassifier {
    /// Create a classifier
    pub fn new(generator: Arc<dyn TextGenerator>, params: GenerationParams, timeout: Duration) -> Self {
        Self { generator, params, timeout }
    }

    /// Classify one excerpt
    ///
    /// A failed or timed-out call yields `Contradicts` with the failure
    /// attached, so one bad call never aborts a verification.
    pub async fn classify(&self, claim: &str, excerpt: &str) -> StanceOutcome {
        let generator = Arc::clone(&self.generator);
        let prompt = stance_prompt(claim, excerpt);
        let params = self.params;

        match call_blocking(self.timeout, move || generator.generate(&prompt, &params)).await {
            Ok(raw) => {
                let stance = parse_stance(&raw);
                debug!("stance {:?} from {:?}", stance, raw);
                StanceOutcome { stance, failure: None }
            }
            Err(e) => {
                warn!("stance classification failed: {}", e);
                StanceOutcome {
                    stance: Stance::Contradicts,
                    failure: Some(e),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use factline_domain::traits::ServiceError;
    use factline_llm::MockProvider;

    fn classifier(provider: MockProvider, timeout: Duration) -> StanceClassifier {
        StanceClassifier::new(
            Arc::new(provider),
            GenerationParams { temperature: 0.1, max_tokens: 10 },
            timeout,
        )
    }

    #[test]
    fn test_parse_variants() {
        assert_eq!(parse_stance("SUPPORTS"), Stance::Supports);
        assert_eq!(parse_stance("  Supports.\n"), Stance::Supports);
        assert_eq!(parse_stance("<think>it contradicts?</think>SUPPORTS"), Stance::Supports);
        assert_eq!(parse_stance("CONTRADICTS"), Stance::Contradicts);
        assert_eq!(parse_stance("The source does not support the claim"), Stance::Contradicts);
        assert_eq!(parse_stance("UNSUPPORTS"), Stance::Contradicts);
        assert_eq!(parse_stance(""), Stance::Contradicts);
        assert_eq!(parse_stance("maybe"), Stance::Contradicts);
    }

    #[tokio::test]
    async fn test_classify_supports() {
        let c = classifier(MockProvider::new("SUPPORTS"), Duration::from_secs(5));
        let outcome = c.classify("claim", "excerpt").await;
        assert_eq!(outcome, StanceOutcome { stance: Stance::Supports, failure: None });
    }

    #[tokio::test]
    async fn test_failure_is_contradicts_with_diagnostic() {
        let c = classifier(MockProvider::failing("down"), Duration::from_secs(5));
        let outcome = c.classify("claim", "excerpt").await;
        assert_eq!(outcome.stance, Stance::Contradicts);
        assert!(matches!(outcome.failure, Some(ServiceError::Unavailable(_))));
    }

    #[tokio::test]
    async fn test_timeout_is_contradicts() {
        let slow = MockProvider::new("SUPPORTS").with_delay(Duration::from_millis(500));
        let c = classifier(slow, Duration::from_millis(20));
        let outcome = c.classify("claim", "excerpt").await;
        assert_eq!(outcome.stance, Stance::Contradicts);
        assert!(matches!(outcome.failure, Some(ServiceError::Timeout(_))));
    }
}
