use serde::Deserialize;

/// Settings for the reconciliation binary.
///
/// Loaded from `config/default.yaml` and `APP_*` environment variables.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Path of the SQLite database file.
    pub database_url: String,
    /// Apply pending embedded migrations before reconciling.
    #[serde(default = "default_run_migrations")]
    pub run_migrations: bool,
}

fn default_run_migrations() -> bool {
    true
}
