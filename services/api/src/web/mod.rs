pub mod analyses;
pub mod analyze;
pub mod auth;
pub mod extract;
pub mod generate;
pub mod locale;
pub mod middleware;
pub mod openapi;
pub mod router;
pub mod state;
pub mod upload;

// Re-export what the binaries need to assemble and document the server.
pub use middleware::require_auth;
pub use openapi::ApiDoc;
pub use router::build_router;
pub use state::AppState;
