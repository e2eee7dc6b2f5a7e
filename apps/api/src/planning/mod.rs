// Career planning: self-assessment validation, gap scoring, and xlsx export.
// Scoring is synchronous and pure; handlers only validate, call the scorer, and serialize.

pub mod assessment;
pub mod export;
pub mod gap_scorer;
pub mod handlers;
