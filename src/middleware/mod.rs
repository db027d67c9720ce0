pub mod auth;
pub mod guard;
pub mod response;

pub use auth::{extract_bearer_token, require_identity};
pub use guard::{require_owner, require_path_identity, OwnedAction};
pub use response::{ApiResponse, ApiResult};
