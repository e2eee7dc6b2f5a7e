//! Reference Data Normalizer — joins competency requirements with derived Levels.
//!
//! Pure function over its inputs. Both tables are deduplicated by Job Title with
//! first-occurrence-wins, so the output holds exactly one row per title and
//! normalizing the same input twice yields the same table.

use std::collections::hash_map::Entry;
use std::collections::{HashMap, HashSet};

use tracing::{debug, info, warn};

use crate::errors::AppError;
use crate::reference::level::parse_level;
use crate::reference::models::{
    CompetencyColumn, LevelRow, ReferenceRow, ReferenceTable, RequirementsTable,
};
use crate::taxonomy::BehaviorTaxonomy;

pub fn normalize(
    requirements: &RequirementsTable,
    levels: &[LevelRow],
    taxonomy: &BehaviorTaxonomy,
) -> Result<ReferenceTable, AppError> {
    let competencies = resolve_competencies(requirements, taxonomy)?;
    let level_by_title = dedup_levels(levels);

    let mut seen = HashSet::new();
    let mut rows = Vec::with_capacity(requirements.rows.len());
    let mut dropped = 0;

    for req in &requirements.rows {
        if !seen.insert(req.job_title.as_str()) {
            debug!("Dropping duplicate requirements row for '{}'", req.job_title);
            dropped += 1;
            continue;
        }

        let targets = competencies
            .iter()
            .map(|c| {
                req.targets.get(&c.name).copied().ok_or_else(|| {
                    AppError::MissingField(format!(
                        "Job '{}' has no value for competency '{}'",
                        req.job_title, c.label
                    ))
                })
            })
            .collect::<Result<Vec<f64>, AppError>>()?;

        let level = level_by_title
            .get(req.job_title.as_str())
            .copied()
            .flatten();
        if level.is_none() {
            warn!("Job '{}' has no derivable level; it will not be ranked", req.job_title);
        }

        rows.push(ReferenceRow {
            job_title: req.job_title.clone(),
            area: req.area.clone(),
            targets,
            level,
        });
    }

    if dropped > 0 {
        info!("Dropped {dropped} duplicate requirements rows");
    }

    Ok(ReferenceTable { competencies, rows })
}

/// Orders the table's competency columns by the taxonomy and fails if any is missing.
fn resolve_competencies(
    requirements: &RequirementsTable,
    taxonomy: &BehaviorTaxonomy,
) -> Result<Vec<CompetencyColumn>, AppError> {
    taxonomy
        .competencies()
        .map(|name| {
            requirements
                .competencies
                .iter()
                .find(|c| c.name == name)
                .cloned()
                .ok_or_else(|| {
                    AppError::DataLoad(format!("Competency column '{name}' not found"))
                })
        })
        .collect()
}

/// First occurrence of each Job Title wins. The level sheet repeats a job once per
/// behavior, so only a dropped row that disagrees with the kept Level is a warning.
fn dedup_levels(levels: &[LevelRow]) -> HashMap<&str, Option<f64>> {
    let mut by_title = HashMap::with_capacity(levels.len());
    let mut dropped = 0;
    for row in levels {
        let level = parse_level(row.level.as_ref());
        match by_title.entry(row.job_title.as_str()) {
            Entry::Vacant(slot) => {
                slot.insert(level);
            }
            Entry::Occupied(kept) => {
                dropped += 1;
                if *kept.get() != level {
                    warn!(
                        "Conflicting level for '{}': keeping {:?}, dropping {:?}",
                        row.job_title,
                        kept.get(),
                        level
                    );
                } else {
                    debug!("Dropping duplicate level row for '{}'", row.job_title);
                }
            }
        }
    }
    if dropped > 0 {
        info!("Dropped {dropped} duplicate level rows");
    }
    by_title
}
