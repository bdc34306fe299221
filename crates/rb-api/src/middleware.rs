//! rusty-board/crates/rb-api/src/middleware.rs Middleware
//!
//! Request logging and CORS for the board API.

use actix_cors::Cors;
use actix_web::middleware::Logger;

// Returns a standard set of middleware for the Rusty-Board API.
pub fn standard_middleware() -> Logger {
    // remote-ip "request-line" status-code response-size "referrer" "user-agent"
    Logger::default()
}

// Configures CORS (Cross-Origin Resource Sharing)
// Browser front-ends post, report and delete from other origins.
pub fn cors_policy() -> Cors {
    Cors::default()
        .allow_any_origin()
        .allowed_methods(vec!["GET", "POST", "PUT", "DELETE"])
        .allow_any_header()
        .max_age(3600)
}
