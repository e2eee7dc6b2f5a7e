//! Report Exporter — serializes a ranked plan to a single-sheet xlsx workbook.

use std::io::Cursor;

use calamine::{open_workbook_from_rs, Reader, Xlsx};
use rust_xlsxwriter::{Format, Workbook};

use crate::errors::AppError;
use crate::planning::gap_scorer::{PlanEntry, RankedResult};
use crate::reference::loader::{cell_number, cell_text};

pub const HEADERS: [&str; 4] = ["Job Title", "Area", "Level", "Gap Score"];

pub const XLSX_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

/// Writes `entries` to an in-memory workbook with one sheet named `sheet_name`.
pub fn export(entries: &[PlanEntry], sheet_name: &str) -> Result<Vec<u8>, AppError> {
    let mut workbook = Workbook::new();
    let header_format = Format::new().set_bold();
    let gap_format = Format::new().set_num_format("0.00");

    let sheet = workbook.add_worksheet();
    sheet.set_name(sheet_name)?;

    for (col, header) in HEADERS.iter().enumerate() {
        sheet.write_string_with_format(0, col as u16, *header, &header_format)?;
    }

    for (i, entry) in entries.iter().enumerate() {
        let row = i as u32 + 1;
        sheet.write_string(row, 0, entry.job_title.as_str())?;
        sheet.write_string(row, 1, entry.area.as_str())?;
        sheet.write_number(row, 2, entry.level)?;
        sheet.write_number_with_format(row, 3, entry.gap_score, &gap_format)?;
    }

    sheet.set_column_width(0, 40)?;
    sheet.set_column_width(1, 24)?;

    Ok(workbook.save_to_buffer()?)
}

/// Reads an exported plan back. Used to verify downloads.
pub fn read_back(bytes: &[u8], sheet_name: &str) -> Result<RankedResult, AppError> {
    let mut workbook: Xlsx<_> = open_workbook_from_rs(Cursor::new(bytes))?;
    let range = workbook.worksheet_range(sheet_name)?;

    let mut rows = range.rows();
    let header: Vec<String> = rows
        .next()
        .map(|cells| cells.iter().map(cell_text).collect())
        .unwrap_or_default();
    if header != HEADERS {
        return Err(AppError::DataLoad(format!(
            "Unexpected plan header: {header:?}"
        )));
    }

    rows.map(|cells| -> Result<PlanEntry, AppError> {
        let text = |i: usize| cells.get(i).map(cell_text).unwrap_or_default();
        let number = |i: usize| {
            cells.get(i).and_then(cell_number).ok_or_else(|| {
                AppError::MissingField(format!("Plan row '{}' lacks column {}", text(0), HEADERS[i]))
            })
        };
        Ok(PlanEntry {
            job_title: text(0),
            area: text(1),
            level: number(2)?,
            gap_score: number(3)?,
        })
    })
    .collect()
}

/// Download name: `<plan name>_<person>.xlsx`, lowercased plan name, spaces as `_`,
/// Spanish accents folded and anything outside `[A-Za-z0-9_-]` dropped.
pub fn plan_file_name(plan_name: &str, person: &str) -> String {
    let plan = sanitize(&plan_name.to_lowercase());
    let person = sanitize(person);
    match (plan.is_empty(), person.is_empty()) {
        (false, false) => format!("{plan}_{person}.xlsx"),
        (false, true) => format!("{plan}.xlsx"),
        (true, false) => format!("{person}.xlsx"),
        (true, true) => "plan.xlsx".to_string(),
    }
}

fn sanitize(s: &str) -> String {
    s.split_whitespace()
        .collect::<Vec<_>>()
        .join("_")
        .chars()
        .map(fold_accent)
        .filter(|c| c.is_ascii_alphanumeric() || *c == '_' || *c == '-')
        .collect()
}

fn fold_accent(c: char) -> char {
    match c {
        'á' | 'à' | 'ä' | 'â' => 'a',
        'é' | 'è' | 'ë' | 'ê' => 'e',
        'í' | 'ì' | 'ï' | 'î' => 'i',
        'ó' | 'ò' | 'ö' | 'ô' => 'o',
        'ú' | 'ù' | 'ü' | 'û' => 'u',
        'Á' | 'À' | 'Ä' | 'Â' => 'A',
        'É' | 'È' | 'Ë' | 'Ê' => 'E',
        'Í' | 'Ì' | 'Ï' | 'Î' => 'I',
        'Ó' | 'Ò' | 'Ö' | 'Ô' => 'O',
        'Ú' | 'Ù' | 'Ü' | 'Û' => 'U',
        'ñ' => 'n',
        'Ñ' => 'N',
        'ç' => 'c',
        'Ç' => 'C',
        other => other,
    }
}
