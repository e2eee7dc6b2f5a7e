//! Workbook loader — reads the competency and level sheets and hands them to the normalizer.
//!
//! Columns are located by header name, never by position. Competency headers are
//! matched against the taxonomy after stripping their ordinal prefix.

use std::io::{Cursor, Read, Seek};
use std::path::Path;

use calamine::{open_workbook_auto, open_workbook_from_rs, Data, Range, Reader, Xlsx};
use tracing::{debug, info, warn};

use crate::errors::AppError;
use crate::reference::models::{
    CompetencyColumn, LevelRow, RawLevel, ReferenceTable, RequirementRow, RequirementsTable,
};
use crate::reference::normalizer::normalize;
use crate::taxonomy::{competency_name, BehaviorTaxonomy};

pub const JOB_TITLE_HEADER: &str = "Job Title";
pub const AREA_HEADER: &str = "Area";

/// Sheet and column names of the reference workbook.
#[derive(Debug, Clone, PartialEq)]
pub struct SheetLayout {
    pub competency_sheet: String,
    pub level_sheet: String,
    pub level_column: String,
}

impl Default for SheetLayout {
    fn default() -> Self {
        Self {
            competency_sheet: "Competencias".to_string(),
            level_sheet: "Comportamientos".to_string(),
            level_column: "IPE".to_string(),
        }
    }
}

/// Loads and normalizes the reference workbook at `path`.
pub fn load_reference(
    path: impl AsRef<Path>,
    layout: &SheetLayout,
    taxonomy: &BehaviorTaxonomy,
) -> Result<ReferenceTable, AppError> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(AppError::DataLoad(format!(
            "Reference workbook '{}' not found",
            path.display()
        )));
    }

    info!("Loading reference workbook from {}", path.display());
    let mut workbook = open_workbook_auto(path)?;
    read_reference(&mut workbook, layout, taxonomy)
}

/// Loads and normalizes a reference workbook held in memory (xlsx).
pub fn load_reference_from_bytes(
    bytes: &[u8],
    layout: &SheetLayout,
    taxonomy: &BehaviorTaxonomy,
) -> Result<ReferenceTable, AppError> {
    let mut workbook: Xlsx<_> = open_workbook_from_rs(Cursor::new(bytes))?;
    read_reference(&mut workbook, layout, taxonomy)
}

fn read_reference<RS, R>(
    workbook: &mut R,
    layout: &SheetLayout,
    taxonomy: &BehaviorTaxonomy,
) -> Result<ReferenceTable, AppError>
where
    RS: Read + Seek,
    R: Reader<RS>,
    AppError: From<R::Error>,
{
    let competency_range = workbook.worksheet_range(&layout.competency_sheet)?;
    let requirements = read_requirements(&competency_range, taxonomy)?;

    let level_range = workbook.worksheet_range(&layout.level_sheet)?;
    let levels = read_levels(&level_range, &layout.level_column)?;

    let table = normalize(&requirements, &levels, taxonomy)?;
    let unranked = table.rows().iter().filter(|r| r.level.is_none()).count();
    info!(
        "Reference table ready: {} jobs, {} without level, {} competencies",
        table.len(),
        unranked,
        table.competencies().len()
    );
    Ok(table)
}

/// Reads the competency sheet. Only headers that name a taxonomy competency become columns.
pub fn read_requirements(
    range: &Range<Data>,
    taxonomy: &BehaviorTaxonomy,
) -> Result<RequirementsTable, AppError> {
    let mut rows = range.rows();
    let header = rows
        .next()
        .ok_or_else(|| AppError::DataLoad("Competency sheet is empty".to_string()))?;

    let title_idx = header_index(header, JOB_TITLE_HEADER)?;
    let area_idx = header_index(header, AREA_HEADER)?;

    let mut columns: Vec<(usize, CompetencyColumn)> = Vec::new();
    for (idx, cell) in header.iter().enumerate() {
        let label = cell_text(cell);
        let name = competency_name(&label);
        if taxonomy.competencies().any(|c| c == name) {
            columns.push((idx, CompetencyColumn { label, name }));
        } else if idx != title_idx && idx != area_idx && !label.is_empty() {
            debug!("Ignoring non-competency column '{label}'");
        }
    }

    let mut requirements = Vec::new();
    for (line, row) in rows.enumerate() {
        let job_title = row.get(title_idx).map(cell_text).unwrap_or_default();
        if job_title.is_empty() {
            warn!("Skipping competency row {} without a job title", line + 2);
            continue;
        }
        let area = row.get(area_idx).map(cell_text).unwrap_or_default();
        let targets = columns
            .iter()
            .filter_map(|(idx, col)| {
                row.get(*idx)
                    .and_then(cell_number)
                    .map(|v| (col.name.clone(), v))
            })
            .collect();

        requirements.push(RequirementRow {
            job_title,
            area,
            targets,
        });
    }

    Ok(RequirementsTable {
        competencies: columns.into_iter().map(|(_, col)| col).collect(),
        rows: requirements,
    })
}

/// Reads the behavior sheet: one (Job Title, raw Level) pair per row, duplicates kept.
pub fn read_levels(range: &Range<Data>, level_column: &str) -> Result<Vec<LevelRow>, AppError> {
    let mut rows = range.rows();
    let header = rows
        .next()
        .ok_or_else(|| AppError::DataLoad("Level sheet is empty".to_string()))?;

    let title_idx = header_index(header, JOB_TITLE_HEADER)?;
    let level_idx = header_index(header, level_column)?;

    Ok(rows
        .enumerate()
        .filter_map(|(line, row)| {
            let job_title = row.get(title_idx).map(cell_text).unwrap_or_default();
            if job_title.is_empty() {
                warn!("Skipping level row {} without a job title", line + 2);
                return None;
            }
            Some(LevelRow {
                job_title,
                level: row.get(level_idx).and_then(raw_level),
            })
        })
        .collect())
}

fn header_index(header: &[Data], name: &str) -> Result<usize, AppError> {
    header
        .iter()
        .position(|cell| cell_text(cell) == name)
        .ok_or_else(|| AppError::DataLoad(format!("Column '{name}' not found")))
}

pub(crate) fn cell_text(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.trim().to_string(),
        other => other.to_string().trim().to_string(),
    }
}

pub(crate) fn cell_number(cell: &Data) -> Option<f64> {
    match cell {
        Data::Float(f) => Some(*f),
        Data::Int(i) => Some(*i as f64),
        Data::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
}

fn raw_level(cell: &Data) -> Option<RawLevel> {
    match cell {
        Data::Empty | Data::Error(_) => None,
        Data::Float(f) => Some(RawLevel::Number(*f)),
        Data::Int(i) => Some(RawLevel::Number(*i as f64)),
        Data::String(s) => Some(RawLevel::Text(s.clone())),
        other => Some(RawLevel::Text(other.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_xlsxwriter::Workbook;

    const COMPETENCY_HEADERS: [&str; 8] = [
        "1. Conocimientos técnicos",
        "2. Desarrollar nuestro negocio",
        "3. Desarrollarse y contribuir al desarrollo de otr@s",
        "4. Navegar en lo desconocido",
        "5. Generar resultados",
        "6. Comunicar con impacto",
        "7. Colaborar y co-crear",
        "8. Liderar con el ejemplo",
    ];

    /// Builds a reference workbook shaped like the production one:
    /// Job Title, Area, Familia, then the 8 competency columns.
    fn workbook_bytes(headers: &[&str]) -> Vec<u8> {
        let mut workbook = Workbook::new();
        {
            let sheet = workbook.add_worksheet();
            sheet.set_name("Competencias").unwrap();
            sheet.write_string(0, 0, "Job Title").unwrap();
            sheet.write_string(0, 1, "Area").unwrap();
            sheet.write_string(0, 2, "Familia").unwrap();
            for (i, h) in headers.iter().enumerate() {
                sheet.write_string(0, 3 + i as u16, *h).unwrap();
            }
            let jobs: [(&str, &str, [f64; 8]); 3] = [
                ("Cashier", "Tienda", [20.0, 20.0, 20.0, 10.0, 10.0, 10.0, 5.0, 5.0]),
                ("Store Manager", "Tienda", [10.0, 10.0, 10.0, 20.0, 20.0, 20.0, 5.0, 5.0]),
                ("Buyer", "Compras", [30.0, 10.0, 10.0, 10.0, 10.0, 10.0, 10.0, 10.0]),
            ];
            for (r, (title, area, values)) in jobs.iter().enumerate() {
                let r = r as u32 + 1;
                sheet.write_string(r, 0, *title).unwrap();
                sheet.write_string(r, 1, *area).unwrap();
                sheet.write_string(r, 2, "Retail").unwrap();
                for (c, v) in values.iter().enumerate() {
                    sheet.write_number(r, 3 + c as u16, *v).unwrap();
                }
            }
            // Trailing row with an area and targets but no title
            sheet.write_string(4, 1, "Tienda").unwrap();
            for c in 0..8u16 {
                sheet.write_number(4, 3 + c, 12.5).unwrap();
            }
        }
        {
            let sheet = workbook.add_worksheet();
            sheet.set_name("Comportamientos").unwrap();
            sheet.write_string(0, 0, "Job Title").unwrap();
            sheet.write_string(0, 1, "Comportamiento").unwrap();
            sheet.write_string(0, 2, "IPE").unwrap();
            sheet.write_string(1, 0, "Cashier").unwrap();
            sheet.write_string(1, 1, "Tomar decisiones").unwrap();
            sheet.write_string(1, 2, "3-5").unwrap();
            sheet.write_string(2, 0, "Cashier").unwrap();
            sheet.write_string(2, 1, "Hacer crecer el negocio").unwrap();
            sheet.write_string(2, 2, "3-5").unwrap();
            sheet.write_string(3, 0, "Store Manager").unwrap();
            sheet.write_number(3, 2, 9.0).unwrap();
            sheet.write_string(4, 0, "Buyer").unwrap();
            sheet.write_string(4, 2, "n/a").unwrap();
            sheet.write_string(5, 0, "   ").unwrap();
            sheet.write_string(5, 2, "7").unwrap();
        }
        workbook.save_to_buffer().unwrap()
    }

    #[test]
    fn test_load_from_bytes_joins_levels() {
        let taxonomy = BehaviorTaxonomy::standard();
        let bytes = workbook_bytes(&COMPETENCY_HEADERS);
        let table = load_reference_from_bytes(&bytes, &SheetLayout::default(), &taxonomy).unwrap();

        assert_eq!(table.len(), 3);
        assert_eq!(table.competencies().len(), 8);
        assert_eq!(table.competencies()[4].label, "5. Generar resultados");
        assert_eq!(table.competencies()[4].name, "Generar resultados");

        let cashier = table.find("Cashier").unwrap();
        assert_eq!(cashier.area, "Tienda");
        assert_eq!(cashier.level, Some(4.0));
        assert_eq!(cashier.targets[0], 20.0);

        assert_eq!(table.find("Store Manager").unwrap().level, Some(9.0));
        assert_eq!(table.find("Buyer").unwrap().level, None);
    }

    fn sheet(bytes: &[u8], name: &str) -> Range<Data> {
        let mut workbook: Xlsx<_> = open_workbook_from_rs(Cursor::new(bytes)).unwrap();
        workbook.worksheet_range(name).unwrap()
    }

    #[test]
    fn test_rows_without_job_title_are_skipped() {
        let taxonomy = BehaviorTaxonomy::standard();
        let bytes = workbook_bytes(&COMPETENCY_HEADERS);

        let requirements = read_requirements(&sheet(&bytes, "Competencias"), &taxonomy).unwrap();
        let titles: Vec<_> = requirements.rows.iter().map(|r| r.job_title.as_str()).collect();
        assert_eq!(titles, vec!["Cashier", "Store Manager", "Buyer"]);

        // duplicates are kept here; only the whitespace-only title is dropped
        let levels = read_levels(&sheet(&bytes, "Comportamientos"), "IPE").unwrap();
        assert_eq!(levels.len(), 4);
        assert!(levels.iter().all(|l| !l.job_title.is_empty()));
    }

    #[test]
    fn test_column_order_does_not_matter() {
        let taxonomy = BehaviorTaxonomy::standard();
        let mut headers = COMPETENCY_HEADERS;
        headers.swap(0, 7);
        let bytes = workbook_bytes(&headers);
        let table = load_reference_from_bytes(&bytes, &SheetLayout::default(), &taxonomy).unwrap();

        // Cashier's first sheet column (20) now feeds "Liderar con el ejemplo"
        let cashier = table.find("Cashier").unwrap();
        assert_eq!(table.competencies()[7].name, "Liderar con el ejemplo");
        assert_eq!(cashier.targets[7], 20.0);
        assert_eq!(cashier.targets[0], 5.0);
    }

    #[test]
    fn test_missing_competency_header_is_data_error() {
        let taxonomy = BehaviorTaxonomy::standard();
        let mut headers = COMPETENCY_HEADERS;
        headers[2] = "3. Algo distinto";
        let bytes = workbook_bytes(&headers);
        let err = load_reference_from_bytes(&bytes, &SheetLayout::default(), &taxonomy)
            .unwrap_err();
        assert!(matches!(err, AppError::DataLoad(_)), "got {err:?}");
    }

    #[test]
    fn test_missing_sheet_is_data_error() {
        let taxonomy = BehaviorTaxonomy::standard();
        let bytes = workbook_bytes(&COMPETENCY_HEADERS);
        let layout = SheetLayout {
            level_sheet: "Niveles".to_string(),
            ..SheetLayout::default()
        };
        let err = load_reference_from_bytes(&bytes, &layout, &taxonomy).unwrap_err();
        assert!(matches!(err, AppError::DataLoad(_)), "got {err:?}");
    }

    #[test]
    fn test_load_from_path() {
        let taxonomy = BehaviorTaxonomy::standard();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("Valoracion_Jobs.xlsx");
        std::fs::write(&path, workbook_bytes(&COMPETENCY_HEADERS)).unwrap();

        let table = load_reference(&path, &SheetLayout::default(), &taxonomy).unwrap();
        assert_eq!(table.len(), 3);
    }

    #[test]
    fn test_missing_file_is_data_error() {
        let taxonomy = BehaviorTaxonomy::standard();
        let err = load_reference("/nonexistent/Valoracion_Jobs.xlsx", &SheetLayout::default(), &taxonomy)
            .unwrap_err();
        match err {
            AppError::DataLoad(msg) => assert!(msg.contains("not found")),
            other => panic!("expected DataLoad, got {other:?}"),
        }
    }

    #[test]
    fn test_raw_level_cells() {
        assert_eq!(raw_level(&Data::Empty), None);
        assert_eq!(raw_level(&Data::Int(7)), Some(RawLevel::Number(7.0)));
        assert_eq!(
            raw_level(&Data::String("12-14".into())),
            Some(RawLevel::Text("12-14".into()))
        );
    }
}
