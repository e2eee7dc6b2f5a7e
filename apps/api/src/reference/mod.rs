// Reference data: workbook ingest, level derivation, and the joined reference table.
// The table is built once at startup and never mutated afterwards.

pub mod level;
pub mod loader;
pub mod models;
pub mod normalizer;
