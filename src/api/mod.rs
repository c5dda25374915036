//! HTTP surface: the upload page, the identify endpoint and probes

pub mod handlers;
pub mod page;
pub mod routes;

pub use handlers::AppState;
pub use routes::build_router;
