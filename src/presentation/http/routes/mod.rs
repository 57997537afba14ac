pub mod health_routes;
pub mod session_routes;

pub use health_routes::health_routes;
pub use session_routes::session_routes;
