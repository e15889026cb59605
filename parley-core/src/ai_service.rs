//! # AI Service
//!
//! Entry point the app uses for message categorization. Wires the rate
//! limiter, the result cache, the endpoint client and the performance tracker
//! around a single call:
//!
//! ```text
//! validate ─► check_limit ─► cache lookup ──hit──► result (metric: cache hit)
//!                                  │
//!                                 miss
//!                                  ▼
//!                   tracker.start ─► categorizer ─┬─ ok ──► increment, cache write, metric
//!                                                 └─ err ─► metric (failed), error returned
//! ```
//!
//! Only the categorizer result or its error reaches the caller; every side
//! write is best effort. A call dropped mid-flight leaves no start time behind.

use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

use crate::cache::{generate_key, AiCache};
use crate::categorize::{validate_request, CategorizerClient};
use crate::clock::ClockRef;
use crate::config::ParleyConfig;
use crate::error::{ParleyError, Result};
use crate::rate_limit::RateLimiter;
use crate::scoring::{self, MessageSignals, ScoreResult, ScoringWeights};
use crate::tasks::BackgroundQueue;
use crate::telemetry::{MetricInput, PerformanceTracker};
use crate::traits::{DocumentStoreRef, HttpTransportRef, NotifierRef};
use crate::types::{operations, CategorizationRequest, CategorizationResult, RelationshipContext};

pub struct AiService {
    categorizer: CategorizerClient,
    cache: AiCache,
    limiter: RateLimiter,
    tracker: PerformanceTracker,
    weights: ScoringWeights,
    clock: ClockRef,
}

impl AiService {
    pub fn new(
        categorizer: CategorizerClient,
        cache: AiCache,
        limiter: RateLimiter,
        tracker: PerformanceTracker,
        clock: ClockRef,
    ) -> Self {
        Self {
            categorizer,
            cache,
            limiter,
            tracker,
            weights: ScoringWeights::default(),
            clock,
        }
    }

    /// Build every collaborator from config over shared backends.
    pub fn from_config(
        config: &ParleyConfig,
        store: DocumentStoreRef,
        clock: ClockRef,
        notifier: NotifierRef,
        transport: HttpTransportRef,
        queue: BackgroundQueue,
    ) -> Result<Self> {
        config.validate()?;
        let categorizer = CategorizerClient::new(transport, &config.categorizer);
        let cache = AiCache::new(Arc::clone(&store), Arc::clone(&clock), queue.clone());
        let limiter = RateLimiter::new(Arc::clone(&store), Arc::clone(&clock), notifier);
        let tracker = PerformanceTracker::new(store, Arc::clone(&clock), queue)
            .with_enabled(config.telemetry.enabled);
        Ok(Self::new(categorizer, cache, limiter, tracker, clock).with_weights(config.scoring_weights()?))
    }

    pub fn with_weights(mut self, weights: ScoringWeights) -> Self {
        self.weights = weights;
        self
    }

    pub fn weights(&self) -> &ScoringWeights {
        &self.weights
    }

    pub fn cache(&self) -> &AiCache {
        &self.cache
    }

    pub fn limiter(&self) -> &RateLimiter {
        &self.limiter
    }

    pub fn tracker(&self) -> &PerformanceTracker {
        &self.tracker
    }

    /// Categorize a message for `uid`.
    ///
    /// # Errors
    /// * `Validation` - bad request, nothing was called
    /// * `RateLimit` - the user's hourly or daily window is full
    /// * any categorizer error after its retries
    pub async fn categorize_message(
        &self,
        uid: &str,
        request: &CategorizationRequest,
    ) -> Result<CategorizationResult> {
        let operation = operations::CATEGORIZATION;
        validate_request(request)?;

        let status = self.limiter.check_limit(uid, operation).await;
        if !status.allowed {
            let message = status
                .message
                .unwrap_or_else(|| format!("{} limit reached", operation));
            return Err(ParleyError::RateLimit(message));
        }

        let key = generate_key(&request.message_text, operation);
        if let Some(cached) = self.cache.get_cached_result(uid, &key).await {
            match serde_json::from_value::<CategorizationResult>(cached) {
                Ok(result) => {
                    debug!("categorization cache hit for {}", request.message_id);
                    self.tracker
                        .record(MetricInput::new(uid, operation).cache_hit(), Duration::ZERO);
                    return Ok(result);
                }
                Err(e) => warn!("ignoring unreadable cache entry {}: {}", key, e),
            }
        }

        let timer = self.tracker.begin();
        match self.categorizer.categorize(request).await {
            Ok(result) => {
                self.limiter.increment(uid, operation).await;
                match serde_json::to_value(&result) {
                    Ok(value) => {
                        self.cache.set_cached_result(uid, &key, operation, value, None);
                    }
                    Err(e) => warn!("not caching categorization for {}: {}", request.message_id, e),
                }
                let mut input = MetricInput::new(uid, operation);
                if let (Some(model), Some(tokens)) = (&result.model_used, result.tokens_used) {
                    input = input.with_model(model.clone(), tokens);
                }
                timer.finish(input);
                Ok(result)
            }
            Err(e) => {
                timer.finish(MetricInput::new(uid, operation).failed());
                Err(e)
            }
        }
    }

    /// Score a categorized message with the configured weights.
    pub fn score_message(
        &self,
        result: &CategorizationResult,
        context: &RelationshipContext,
    ) -> ScoreResult {
        scoring::score(
            &MessageSignals::from(result),
            context,
            &self.weights,
            self.clock.now(),
        )
    }
}
