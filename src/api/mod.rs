pub mod handlers;
pub mod server;

pub use handlers::AppState;
pub use server::{build_router, build_service, run_server, NotifyConfig, ServerConfig};
