pub mod middleware;
mod router;
pub mod server;

pub use middleware::RequestTracingConfig;
pub use server::HttpServer;
