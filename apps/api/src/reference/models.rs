use std::collections::{BTreeSet, HashMap};

use serde::{Deserialize, Serialize};

/// A competency column: the header text as found in the sheet and its canonical name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompetencyColumn {
    /// Header as written in the workbook, e.g. `"3. Generar resultados"`.
    pub label: String,
    /// Label with the ordinal prefix stripped, e.g. `"Generar resultados"`.
    pub name: String,
}

/// Raw Level cell from the behavior sheet: a number or free text such as `"12-14"`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawLevel {
    Number(f64),
    Text(String),
}

/// One row of the competency sheet, before joining.
#[derive(Debug, Clone, PartialEq)]
pub struct RequirementRow {
    pub job_title: String,
    pub area: String,
    /// Target value per canonical competency name. Absent key = empty cell.
    pub targets: HashMap<String, f64>,
}

/// The competency sheet as read by the loader.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RequirementsTable {
    pub competencies: Vec<CompetencyColumn>,
    pub rows: Vec<RequirementRow>,
}

/// One row of the behavior/level sheet.
#[derive(Debug, Clone, PartialEq)]
pub struct LevelRow {
    pub job_title: String,
    pub level: Option<RawLevel>,
}

/// A job in the joined reference table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReferenceRow {
    pub job_title: String,
    pub area: String,
    /// Target values aligned with `ReferenceTable::competencies`.
    pub targets: Vec<f64>,
    /// Derived seniority. `None` rows are never ranked.
    pub level: Option<f64>,
}

/// Competency requirements left-joined with derived Level, one row per Job Title.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ReferenceTable {
    pub(crate) competencies: Vec<CompetencyColumn>,
    pub(crate) rows: Vec<ReferenceRow>,
}

impl ReferenceTable {
    pub fn competencies(&self) -> &[CompetencyColumn] {
        &self.competencies
    }

    pub fn rows(&self) -> &[ReferenceRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn find(&self, job_title: &str) -> Option<&ReferenceRow> {
        self.rows.iter().find(|r| r.job_title == job_title)
    }

    /// Distinct non-empty areas, sorted.
    pub fn areas(&self) -> Vec<String> {
        self.rows
            .iter()
            .filter(|r| !r.area.trim().is_empty())
            .map(|r| r.area.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Job titles of an area that can be ranked (defined Level), sorted.
    pub fn jobs_in_area(&self, area: &str) -> Vec<String> {
        self.rows
            .iter()
            .filter(|r| r.area == area && r.level.is_some())
            .map(|r| r.job_title.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }
}
