use anyhow::{bail, Context, Result};

use crate::reference::loader::SheetLayout;

/// Application configuration loaded from environment variables.
/// Every variable has a default; only malformed values are rejected.
#[derive(Debug, Clone)]
pub struct Config {
    pub reference_workbook: String,
    pub layout: SheetLayout,
    /// Sheet name of the exported plan. Also the prefix of the download file name.
    pub plan_sheet_name: String,
    pub port: u16,
    pub rust_log: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            reference_workbook: "Valoracion_Jobs.xlsx".to_string(),
            layout: SheetLayout::default(),
            plan_sheet_name: "Plan de Carrera".to_string(),
            port: 8080,
            rust_log: "info".to_string(),
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let defaults = Config::default();
        Ok(Config {
            reference_workbook: env_or("REFERENCE_WORKBOOK", defaults.reference_workbook),
            layout: SheetLayout {
                competency_sheet: env_or("COMPETENCY_SHEET", defaults.layout.competency_sheet),
                level_sheet: env_or("LEVEL_SHEET", defaults.layout.level_sheet),
                level_column: env_or("LEVEL_COLUMN", defaults.layout.level_column),
            },
            plan_sheet_name: sheet_name(env_or("PLAN_SHEET_NAME", defaults.plan_sheet_name))
                .context("PLAN_SHEET_NAME is not a valid worksheet name")?,
            port: parse_port(&env_or("PORT", defaults.port.to_string()))?,
            rust_log: env_or("RUST_LOG", defaults.rust_log),
        })
    }
}

fn env_or(key: &str, default: String) -> String {
    std::env::var(key)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .unwrap_or(default)
}

fn parse_port(value: &str) -> Result<u16> {
    value
        .trim()
        .parse::<u16>()
        .with_context(|| format!("PORT must be a valid port number, got '{value}'"))
}

/// Worksheet names are 1 to 31 characters, without `[ ] : * ? / \` and not quoted.
fn sheet_name(name: String) -> Result<String> {
    const FORBIDDEN: [char; 7] = ['[', ']', ':', '*', '?', '/', '\\'];

    let len = name.chars().count();
    if len == 0 || len > 31 {
        bail!("'{name}' must be 1 to 31 characters long, has {len}");
    }
    if let Some(c) = name.chars().find(|c| FORBIDDEN.contains(c)) {
        bail!("'{name}' contains '{c}'");
    }
    if name.starts_with('\'') || name.ends_with('\'') {
        bail!("'{name}' starts or ends with an apostrophe");
    }
    Ok(name)
}
