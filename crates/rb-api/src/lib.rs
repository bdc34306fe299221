//! # rb-api
//!
//! The web routing and orchestration layer for Rusty-Board.

pub mod error;
pub mod handlers;
pub mod middleware;

use actix_web::web;

pub use handlers::AppState;

/// Configures the routes for the message board.
///
/// # Developer Note
/// Both resources carry the board name as a path segment, but only thread
/// creation and the board listing use it; everything else is addressed by id.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::JsonConfig::default().error_handler(error::json_error))
        .service(
            web::resource("/api/threads/{board}")
                .route(web::post().to(handlers::create_thread))
                .route(web::get().to(handlers::list_threads))
                .route(web::delete().to(handlers::delete_thread))
                .route(web::put().to(handlers::report_thread)),
        )
        .service(
            web::resource("/api/replies/{board}")
                .route(web::post().to(handlers::create_reply))
                .route(web::get().to(handlers::view_thread))
                .route(web::delete().to(handlers::delete_reply))
                .route(web::put().to(handlers::report_reply)),
        )
        .route("/", web::get().to(handlers::index));
}
