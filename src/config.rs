use std::env;
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub ledger_db_path: PathBuf,
    pub stats_db_path: PathBuf,
    pub report_dir: PathBuf,
}

/// `.env.local` first so it wins over `.env` for keys both define. Missing
/// files are fine.
pub fn load_env_files() {
    let _ = dotenvy::from_filename(".env.local");
    let _ = dotenvy::from_filename(".env");
}

impl AppConfig {
    pub fn from_env() -> AppConfig {
        AppConfig {
            ledger_db_path: env_path("LEDGER_DB_PATH", "data/picks_ledger.db"),
            stats_db_path: env_path("STATS_DB_PATH", "data/team_stats.db"),
            report_dir: env_path("REPORT_OUTPUT_DIR", "output"),
        }
    }
}

fn env_path(key: &str, default: &str) -> PathBuf {
    env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(default))
}
