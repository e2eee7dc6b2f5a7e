use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::reference::models::ReferenceTable;
use crate::taxonomy::competency_name;

/// Sentinel the form uses for "nothing picked yet" in the area and job selectors.
pub const NONE_SELECTED: &str = "-- Selecciona --";

/// Points the user must distribute across the competencies.
pub const COMPETENCY_POINTS: u32 = 100;

pub const MIN_RATING: u8 = 1;
pub const MAX_RATING: u8 = 5;

/// Canonical competency name → points (0–100).
pub type CompetencyWeights = HashMap<String, u32>;

/// Behavior descriptor → rating (1–5). Unrated behaviors count as 3.
pub type BehaviorRatings = HashMap<String, u8>;

/// One self-assessment submission. Lives for a single request.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserAssessment {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub area: String,
    #[serde(default)]
    pub current_job: String,
    /// Keys may be canonical names or sheet labels with an ordinal prefix.
    #[serde(default)]
    pub competency_weights: HashMap<String, u32>,
    #[serde(default)]
    pub behavior_ratings: BehaviorRatings,
}

impl UserAssessment {
    /// Competency weights keyed by canonical name, values for repeated names summed.
    pub fn normalized_weights(&self) -> CompetencyWeights {
        let mut weights = CompetencyWeights::new();
        for (label, points) in &self.competency_weights {
            let entry = weights.entry(competency_name(label)).or_insert(0);
            *entry = entry.saturating_add(*points);
        }
        weights
    }

    pub fn total_points(&self) -> u32 {
        self.competency_weights
            .values()
            .fold(0, |acc, p| acc.saturating_add(*p))
    }

    /// Completeness checks run before scoring. Order: selection, point total, name,
    /// then the constraints the form widgets enforce (known competencies, rating
    /// range, job belongs to the area).
    pub fn validate(&self, table: &ReferenceTable) -> Result<(), AppError> {
        if !is_selected(&self.area) || !is_selected(&self.current_job) {
            return Err(AppError::Validation(
                "Select your area and current job".to_string(),
            ));
        }

        let total = self.total_points();
        if total != COMPETENCY_POINTS {
            return Err(AppError::Validation(format!(
                "Distribute exactly {COMPETENCY_POINTS} points across the competencies (got {total})"
            )));
        }

        if self.name.trim().is_empty() {
            return Err(AppError::Validation("Please enter your name".to_string()));
        }

        // Each weight is within 0..=100 once the total is exactly 100.
        let weights = self.normalized_weights();
        if let Some(unknown) = weights
            .keys()
            .find(|k| !table.competencies().iter().any(|c| &c.name == *k))
        {
            return Err(AppError::Validation(format!(
                "Unknown competency '{unknown}'"
            )));
        }

        if let Some((behavior, rating)) = self
            .behavior_ratings
            .iter()
            .find(|(_, r)| !(MIN_RATING..=MAX_RATING).contains(*r))
        {
            return Err(AppError::Validation(format!(
                "Behavior '{behavior}' rated {rating}; ratings go from {MIN_RATING} to {MAX_RATING}"
            )));
        }

        let job_in_area = table
            .find(&self.current_job)
            .is_some_and(|row| row.area == self.area);
        if !job_in_area {
            return Err(AppError::Validation(format!(
                "Job '{}' is not part of area '{}'",
                self.current_job, self.area
            )));
        }

        Ok(())
    }
}

fn is_selected(value: &str) -> bool {
    let value = value.trim();
    !value.is_empty() && value != NONE_SELECTED
}
