//! # Rusty-Board Binary
//!
//! The entry point that assembles the application based on compile-time features.

mod config;

use std::sync::Arc;

use actix_web::{web, App, HttpServer};
use anyhow::Context;
use rb_api::{configure_routes, middleware, AppState};
use rb_core::traits::AuthProvider;
use rb_core::BoardService;

use crate::config::Settings;

// Feature-gated imports: This is the "Compiled-to-Order" magic
#[cfg(feature = "db-sqlite")]
use rb_db_sqlite::SqliteThreadRepo;

#[cfg(feature = "auth-simple")]
use rb_auth_simple::{Argon2AuthProvider, PlaintextAuthProvider};

#[cfg(not(all(feature = "db-sqlite", feature = "auth-simple")))]
compile_error!("rusty-board needs a store plugin (`db-sqlite`) and an auth plugin (`auth-simple`)");

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let settings = Settings::load().context("invalid configuration")?;

    // 1. Initialize Database Implementation
    let repo = SqliteThreadRepo::connect(&settings.database_url).await?;

    // 2. Initialize Auth Implementation
    let auth: Arc<dyn AuthProvider> = if settings.password_hashing {
        log::info!("delete passwords are stored as Argon2 hashes");
        Arc::new(Argon2AuthProvider::new())
    } else {
        log::warn!("delete passwords are stored in plaintext (BOARD_PASSWORD_HASHING=false)");
        Arc::new(PlaintextAuthProvider)
    };

    // 3. Wrap in AppState; the service owns the store for the life of the process
    let service = BoardService::new(Arc::new(repo), auth);
    let state = web::Data::new(AppState {
        service: service.clone(),
    });

    let (host, port) = settings.bind_addr();
    log::info!("Rusty-Board starting on http://{host}:{port}");

    HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .wrap(middleware::cors_policy())
            .wrap(middleware::standard_middleware())
            .configure(configure_routes)
    })
    .bind((host, port))?
    .run()
    .await?;

    service.shutdown().await;
    Ok(())
}
