//! Gap Scoring — ranks candidate next roles by their distance to a self-assessment.
//!
//! Default: `WeightedGapScorer`, a thin wrapper over the pure [`score`] function.
//! `AppState` holds an `Arc<dyn PlanScorer>`.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::planning::assessment::{BehaviorRatings, CompetencyWeights};
use crate::reference::models::{ReferenceRow, ReferenceTable};
use crate::taxonomy::BehaviorTaxonomy;

pub const COMPETENCY_GAP_WEIGHT: f64 = 0.7;
pub const BEHAVIOR_GAP_WEIGHT: f64 = 0.3;
/// Every behavior is measured against this rating.
pub const IDEAL_RATING: u8 = 5;
pub const DEFAULT_RATING: u8 = 3;

// ────────────────────────────────────────────────────────────────────────────
// Output data model
// ────────────────────────────────────────────────────────────────────────────

/// One candidate role in a career plan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanEntry {
    pub job_title: String,
    pub area: String,
    pub level: f64,
    /// Lower is a closer match. Rounded to 2 decimals.
    pub gap_score: f64,
}

/// Candidates sorted ascending by gap, one per job title.
pub type RankedResult = Vec<PlanEntry>;

// ────────────────────────────────────────────────────────────────────────────
// Trait definition
// ────────────────────────────────────────────────────────────────────────────

/// Implement this to swap ranking strategies without touching the handlers.
pub trait PlanScorer: Send + Sync {
    fn score(
        &self,
        table: &ReferenceTable,
        taxonomy: &BehaviorTaxonomy,
        current_job: &str,
        weights: &CompetencyWeights,
        ratings: &BehaviorRatings,
    ) -> Result<RankedResult, AppError>;

    /// Short label reported alongside results.
    fn backend(&self) -> &'static str;
}

/// 0.7 × self-weighted competency distance + 0.3 × mean behavior shortfall.
pub struct WeightedGapScorer;

impl PlanScorer for WeightedGapScorer {
    fn score(
        &self,
        table: &ReferenceTable,
        taxonomy: &BehaviorTaxonomy,
        current_job: &str,
        weights: &CompetencyWeights,
        ratings: &BehaviorRatings,
    ) -> Result<RankedResult, AppError> {
        score(table, taxonomy, current_job, weights, ratings)
    }

    fn backend(&self) -> &'static str {
        "weighted_gap"
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Core algorithm
// ────────────────────────────────────────────────────────────────────────────

/// Ranks every job at or above the current job's level.
///
/// 1. `current_level` = Level of `current_job`; `NotFound` if absent or undefined.
/// 2. Candidates: rows with a defined Level ≥ `current_level` (the current job included).
/// 3. gap = round2(0.7 × competency_gap + 0.3 × behavior_gap)
/// 4. First row per title wins; stable ascending sort by gap.
pub fn score(
    table: &ReferenceTable,
    taxonomy: &BehaviorTaxonomy,
    current_job: &str,
    weights: &CompetencyWeights,
    ratings: &BehaviorRatings,
) -> Result<RankedResult, AppError> {
    let current_level = table
        .find(current_job)
        .and_then(|row| row.level)
        .ok_or_else(|| {
            AppError::NotFound(format!("Job '{current_job}' has no rankable level"))
        })?;

    // Same for every candidate: it covers all behaviors, not the candidate's own.
    let behavior = behavior_gap(table, taxonomy, ratings);

    let mut seen = HashSet::new();
    let mut ranked = Vec::new();

    for row in table.rows() {
        let Some(level) = row.level else { continue };
        if level < current_level || !seen.insert(row.job_title.as_str()) {
            continue;
        }

        let competency = competency_gap(table, row, weights)?;
        ranked.push(PlanEntry {
            job_title: row.job_title.clone(),
            area: row.area.clone(),
            level,
            gap_score: round2(COMPETENCY_GAP_WEIGHT * competency + BEHAVIOR_GAP_WEIGHT * behavior),
        });
    }

    ranked.sort_by(|a, b| a.gap_score.total_cmp(&b.gap_score));
    Ok(ranked)
}

/// Σ |w − t| × w/100 over the competencies, with `w` the user's points and `t` the
/// candidate's raw target on the same 0–100 scale. Not symmetric: competencies the
/// user weighted heavily dominate.
pub fn competency_gap(
    table: &ReferenceTable,
    candidate: &ReferenceRow,
    weights: &CompetencyWeights,
) -> Result<f64, AppError> {
    table
        .competencies()
        .iter()
        .enumerate()
        .map(|(i, competency)| -> Result<f64, AppError> {
            let target = candidate.targets.get(i).copied().ok_or_else(|| {
                AppError::MissingField(format!(
                    "Job '{}' has no value for competency '{}'",
                    candidate.job_title, competency.label
                ))
            })?;
            let points = f64::from(weights.get(&competency.name).copied().unwrap_or(0));
            Ok((points - target).abs() * (points / 100.0))
        })
        .sum()
}

/// Mean of |rating − 5| over every behavior of every competency; unrated count as 3.
/// Zero when the taxonomy has no behaviors for these competencies.
pub fn behavior_gap(
    table: &ReferenceTable,
    taxonomy: &BehaviorTaxonomy,
    ratings: &BehaviorRatings,
) -> f64 {
    let (total, count) = table
        .competencies()
        .iter()
        .flat_map(|c| taxonomy.behaviors_for(&c.label))
        .map(|behavior| {
            let rating = ratings.get(behavior).copied().unwrap_or(DEFAULT_RATING);
            f64::from(IDEAL_RATING.abs_diff(rating))
        })
        .fold((0.0, 0usize), |(sum, n), gap| (sum + gap, n + 1));

    if count == 0 {
        0.0
    } else {
        total / count as f64
    }
}

/// Two decimals, ties to even (`0.525` → `0.52`).
fn round2(value: f64) -> f64 {
    (value * 100.0).round_ties_even() / 100.0
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
