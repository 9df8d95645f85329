use std::error::Error;

use config::{Config, Environment, File};
use diesel_migrations::{EmbeddedMigrations, MigrationHarness, embed_migrations};

use lunch_record::db::establish_connection_pool;
use lunch_record::models::config::ServerConfig;
use lunch_record::repository::DieselRepository;
use lunch_record::services::grades::correct_average_grades;

pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

fn load_config() -> Result<ServerConfig, config::ConfigError> {
    Config::builder()
        .set_default("run_migrations", true)?
        .add_source(File::with_name("config/default").required(false))
        .add_source(Environment::with_prefix("APP"))
        .build()?
        .try_deserialize()
}

fn main() -> Result<(), Box<dyn Error + Send + Sync>> {
    dotenvy::dotenv().ok();
    env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));

    let server_config = load_config().inspect_err(|e| log::error!("Failed to load config: {e}"))?;

    let pool = establish_connection_pool(&server_config.database_url)
        .inspect_err(|e| log::error!("Failed to establish database connection: {e}"))?;

    if server_config.run_migrations {
        let mut conn = pool.get()?;
        let applied = conn.run_pending_migrations(MIGRATIONS)?;
        log::info!("applied {} pending migration(s)", applied.len());
    }

    let repo = DieselRepository::new(pool);
    let groups = correct_average_grades(&repo)?;
    log::info!("reconciled average grades of {groups} group(s)");

    Ok(())
}
