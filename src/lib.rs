pub mod application;
pub mod auth;
pub mod config;
pub mod db;
pub mod domain;
pub mod errors;
pub mod handlers;
pub mod infrastructure;
pub mod schema;
pub mod state;

use std::error::Error;

use actix_web::{middleware::Logger, web, App, HttpServer};
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};

pub use config::Config;
pub use db::{create_pool, DbPool};
pub use state::AppState;

pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

/// Run any pending Diesel migrations against the pool's database.
pub fn run_migrations(pool: &DbPool) -> Result<(), Box<dyn Error + Send + Sync>> {
    let mut conn = pool.get()?;
    let applied = conn.run_pending_migrations(MIGRATIONS)?;
    for version in applied {
        log::info!("Applied migration {}", version);
    }
    Ok(())
}

/// Registers every route group on an actix `App`.
pub fn routes(cfg: &mut web::ServiceConfig) {
    cfg.configure(handlers::health::configure)
        .configure(handlers::auth::configure)
        .configure(handlers::users::configure)
        .configure(handlers::sites::configure)
        .configure(handlers::products::configure)
        .configure(handlers::suppliers::configure)
        .configure(handlers::inventory::configure)
        .configure(handlers::purchases::configure)
        .configure(handlers::orders::configure)
        .configure(handlers::promotions::configure)
        .configure(handlers::shifts::configure)
        .configure(handlers::attendance::configure)
        .configure(handlers::claims::configure)
        .configure(handlers::notifications::configure)
        .configure(handlers::reports::configure);
}

/// Build and return an actix-web `Server` bound to `host:port`.
///
/// The caller is responsible for `.await`-ing (or `tokio::spawn`-ing) the
/// returned server.
pub fn build_server(
    state: AppState,
    host: &str,
    port: u16,
) -> std::io::Result<actix_web::dev::Server> {
    Ok(HttpServer::new(move || {
        App::new()
            .app_data(web::Data::new(state.clone()))
            .wrap(Logger::default())
            .service(handlers::openapi::swagger_ui())
            .configure(routes)
    })
    .bind((host.to_string(), port))?
    .run())
}
