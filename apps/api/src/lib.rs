pub mod config;
pub mod errors;
pub mod planning;
pub mod reference;
pub mod routes;
pub mod state;
pub mod taxonomy;

pub use routes::build_router;
pub use state::AppState;
