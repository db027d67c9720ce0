// handlers/protected/mod.rs - Protected handlers (verified bearer token required)
//
// Security Level: `require_identity` middleware injects a VerifiedIdentity
// Authorization: path-identity or ownership checks from middleware::guard
pub mod artifacts;
pub mod collections;
pub mod likes;

pub use artifacts::{create_artifact, delete_artifact, update_artifact};
pub use collections::{liked_by, my_collection};
pub use likes::toggle_like;
