//! Finals publication gate.

use log::{error, info, warn};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::db::MatchResultStore;
use crate::errors::StandingsResult;
use crate::outcome::{MatchId, MatchOutcome, ResultLedgerReader};

/// Finals flipped by one publish call
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublishSummary {
    pub published_count: usize,
    pub published_match_ids: Vec<MatchId>,
}

/// Result of a publish request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PublishOutcome {
    /// Candidates existed; some or none of them were still unpublished
    Published(PublishSummary),
    /// No completed finals matched the request
    NothingToPublish,
}

impl PublishOutcome {
    /// Number of finals flipped by this call
    pub fn published_count(&self) -> usize {
        match self {
            PublishOutcome::Published(summary) => summary.published_count,
            PublishOutcome::NothingToPublish => 0,
        }
    }
}

/// Whether a consumer-facing query may surface this outcome.
///
/// Non-final outcomes are always visible; finals only once published.
pub fn is_query_visible(outcome: &MatchOutcome) -> bool {
    match outcome.publication {
        Some(publication) => publication.state.is_published(),
        None => true,
    }
}

/// Owns the single legal write of the engine: `unpublished -> published`.
///
/// Each candidate goes through
/// [`PublicationState::publish`](crate::outcome::PublicationState::publish) before the store
/// is asked to persist the flip.
#[derive(Clone)]
pub struct PublicationGate {
    reader: ResultLedgerReader,
    store: Arc<dyn MatchResultStore>,
}

impl PublicationGate {
    /// Create a new publication gate
    pub fn new(store: Arc<dyn MatchResultStore>) -> Self {
        Self {
            reader: ResultLedgerReader::new(store.clone()),
            store,
        }
    }

    /// Publish every completed, unpublished final with the given rehearsal flag.
    ///
    /// The batch is not transactional. If a write fails partway, the finals
    /// already flipped stay published and a later call completes the rest.
    ///
    /// # Returns
    ///
    /// * `PublishOutcome::NothingToPublish` - no completed finals match `is_test`
    /// * `PublishOutcome::Published` - count may be zero when all were already published
    pub async fn publish_pending_finals(&self, is_test: bool) -> StandingsResult<PublishOutcome> {
        let candidates = self.reader.load_finals(is_test).await?;

        if candidates.is_empty() {
            info!("No completed finals to publish (is_test: {})", is_test);
            return Ok(PublishOutcome::NothingToPublish);
        }

        let mut summary = PublishSummary::default();

        for outcome in &candidates {
            let Some(mut publication) = outcome.publication else {
                continue;
            };

            // Already published finals have no transition left to apply.
            if !publication.state.publish() {
                continue;
            }

            match self.store.mark_published(&outcome.match_id).await {
                Ok(true) => {
                    summary.published_match_ids.push(outcome.match_id.clone());
                }
                Ok(false) => {
                    warn!(
                        "Final {} was published concurrently, skipping",
                        outcome.match_id
                    );
                }
                Err(e) => {
                    error!(
                        "Publishing stopped at final {} after {} published: {}",
                        outcome.match_id,
                        summary.published_match_ids.len(),
                        e
                    );
                    return Err(e);
                }
            }
        }

        summary.published_count = summary.published_match_ids.len();

        info!(
            "Published {} of {} finals (is_test: {})",
            summary.published_count,
            candidates.len(),
            is_test
        );

        Ok(PublishOutcome::Published(summary))
    }
}
