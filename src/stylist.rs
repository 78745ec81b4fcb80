//! AI styling boundary
//!
//! Contract only. The core hands a free-text prompt across an opaque async
//! boundary and surfaces failures verbatim to the UI layer; it never retries.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Recommendation {
    pub item_name: String,
    pub category: String,
    pub reasoning: String,
}

#[derive(Error, Debug)]
pub enum StylistError {
    #[error("Recommendation failed: {0}")]
    RecommendationFailed(String),
    #[error("Generation failed: {0}")]
    GenerationFailed(String),
}

#[async_trait]
pub trait StylistService: Send + Sync {
    async fn recommend(&self, prompt: &str) -> Result<Vec<Recommendation>, StylistError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Flaky;

    #[async_trait]
    impl StylistService for Flaky {
        async fn recommend(&self, prompt: &str) -> Result<Vec<Recommendation>, StylistError> {
            if prompt.is_empty() {
                return Err(StylistError::RecommendationFailed("empty prompt".into()));
            }
            Ok(vec![Recommendation {
                item_name: "Urban Explorer Jacket".into(),
                category: "Jackets".into(),
                reasoning: "Layers well over the rest of the outfit.".into(),
            }])
        }
    }

    #[tokio::test]
    async fn test_failures_surface_verbatim() {
        let service: Box<dyn StylistService> = Box::new(Flaky);
        let err = service.recommend("").await.unwrap_err();
        assert!(matches!(err, StylistError::RecommendationFailed(_)));
        let recs = service.recommend("weekend look").await.unwrap();
        assert_eq!(recs[0].category, "Jackets");
    }
}
