// handlers/public/mod.rs - Public handlers (no authentication required)
//
// Security Level: None
// Middleware: request tracing and CORS only
pub mod artifacts;
pub mod health;

pub use artifacts::{get_artifact, list_artifacts, search_artifacts};
pub use health::{health, root};
