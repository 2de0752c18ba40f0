//! Fallback chain over multiple classifiers.

use async_trait::async_trait;
use router_classify::Classifier;
use router_core::{DecisionContext, RouterError, RouterResult, RoutingDecision};
use std::sync::Arc;
use tracing::warn;

/// Classifiers tried in order; each failure moves to the next and the last
/// failure propagates.
pub struct ClassifierChain {
    classifiers: Vec<Arc<dyn Classifier>>,
}

impl ClassifierChain {
    /// Create a chain.
    ///
    /// # Errors
    /// Returns `Configuration` for an empty chain.
    pub fn new(classifiers: Vec<Arc<dyn Classifier>>) -> RouterResult<Self> {
        if classifiers.is_empty() {
            return Err(RouterError::configuration(
                "classifier chain must not be empty",
            ));
        }
        Ok(Self { classifiers })
    }
}

#[async_trait]
impl Classifier for ClassifierChain {
    async fn decide(&self, context: &DecisionContext) -> RouterResult<RoutingDecision> {
        let mut last_error = None;
        for classifier in &self.classifiers {
            match classifier.decide(context).await {
                Ok(decision) => return Ok(decision),
                Err(error) => {
                    warn!(
                        classifier = classifier.name(),
                        error = %error,
                        "classifier failed, trying next in chain"
                    );
                    last_error = Some(error);
                }
            }
        }
        // The chain is non-empty, so at least one error was recorded.
        Err(last_error
            .unwrap_or_else(|| RouterError::internal("empty classifier chain")))
    }

    fn name(&self) -> &str {
        "classifier-chain"
    }

    fn is_available(&self) -> bool {
        self.classifiers.iter().any(|c| c.is_available())
    }
}

impl std::fmt::Debug for ClassifierChain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClassifierChain")
            .field("classifiers", &self.classifiers.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedClassifier {
        name: &'static str,
        result: RouterResult<&'static str>,
    }

    #[async_trait]
    impl Classifier for FixedClassifier {
        async fn decide(&self, _context: &DecisionContext) -> RouterResult<RoutingDecision> {
            match &self.result {
                Ok(service) => RoutingDecision::new(*service, 0.9, "fixed"),
                Err(_) => Err(RouterError::llm_provider("down", Some(503), false)),
            }
        }
        fn name(&self) -> &str {
            self.name
        }
    }

    fn ok(name: &'static str, service: &'static str) -> Arc<dyn Classifier> {
        Arc::new(FixedClassifier {
            name,
            result: Ok(service),
        })
    }

    fn failing(name: &'static str) -> Arc<dyn Classifier> {
        Arc::new(FixedClassifier {
            name,
            result: Err(RouterError::NoTarget),
        })
    }

    #[tokio::test]
    async fn test_first_success_wins() {
        let chain = ClassifierChain::new(vec![ok("a", "a-svc"), ok("b", "b-svc")]).unwrap();
        let ctx = DecisionContext::new("anything").unwrap();
        assert_eq!(chain.decide(&ctx).await.unwrap().service(), "a-svc");
    }

    #[tokio::test]
    async fn test_failure_moves_to_next() {
        let chain = ClassifierChain::new(vec![failing("a"), ok("b", "b-svc")]).unwrap();
        let ctx = DecisionContext::new("anything").unwrap();
        assert_eq!(chain.decide(&ctx).await.unwrap().service(), "b-svc");
    }

    #[tokio::test]
    async fn test_last_failure_propagates() {
        let chain = ClassifierChain::new(vec![failing("a"), failing("b")]).unwrap();
        let ctx = DecisionContext::new("anything").unwrap();
        assert!(chain.decide(&ctx).await.is_err());
    }

    #[test]
    fn test_empty_chain_rejected() {
        assert!(ClassifierChain::new(vec![]).is_err());
    }
}
