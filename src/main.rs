use std::io;

use bakery_backoffice::{build_server, create_pool, run_migrations, AppState, Config};
use dotenvy::dotenv;

fn startup_error(context: &str, e: impl std::fmt::Display) -> io::Error {
    io::Error::new(io::ErrorKind::Other, format!("{context}: {e}"))
}

#[actix_web::main]
async fn main() -> io::Result<()> {
    dotenv().ok();
    env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));

    let config = Config::from_env().map_err(|e| startup_error("Invalid configuration", e))?;
    let pool = create_pool(&config.database_url, config.db_pool_size)
        .map_err(|e| startup_error("Failed to create database pool", e))?;
    run_migrations(&pool).map_err(|e| startup_error("Failed to run database migrations", e))?;

    let state = AppState::from_pool(pool, &config);
    if let Some(seed) = &config.bootstrap_admin {
        state
            .users
            .ensure_admin(&seed.email, &seed.password)
            .map_err(|e| startup_error("Failed to create the initial administrator", e))?;
    }
    log::info!("Starting server at http://{}:{}", config.host, config.port);

    build_server(state, &config.host, config.port)?.await
}
