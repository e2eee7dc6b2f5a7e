use std::sync::Arc;

use crate::config::Config;
use crate::planning::gap_scorer::{PlanScorer, WeightedGapScorer};
use crate::reference::models::ReferenceTable;
use crate::taxonomy::BehaviorTaxonomy;

/// Shared application state injected into all route handlers via Axum extractors.
/// Everything here is read-only after startup.
#[derive(Clone)]
pub struct AppState {
    pub reference: Arc<ReferenceTable>,
    pub taxonomy: Arc<BehaviorTaxonomy>,
    /// Pluggable plan scorer. Default: WeightedGapScorer.
    pub scorer: Arc<dyn PlanScorer>,
    pub config: Config,
}

impl AppState {
    pub fn new(reference: ReferenceTable, taxonomy: BehaviorTaxonomy, config: Config) -> Self {
        Self {
            reference: Arc::new(reference),
            taxonomy: Arc::new(taxonomy),
            scorer: Arc::new(WeightedGapScorer),
            config,
        }
    }
}
