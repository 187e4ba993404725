use std::{env, str::FromStr};

use tracing::{info, warn};

use crate::{
    data::BoardConfig,
    error::{EngineError, Result},
};

/// Server settings read from the environment at startup.
#[derive(Debug, Clone)]
pub struct Settings {
    pub cors_allowed_origins: Vec<String>,
    pub safe_first_click: bool,
    pub max_rows: usize,
    pub max_cols: usize,
    pub rate_limit_games_per_minute: u32,
    pub cleanup_interval_secs: u64,
    pub inactive_timeout_secs: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            cors_allowed_origins: vec!["http://localhost:3000".to_string()],
            safe_first_click: true,
            max_rows: 50,
            max_cols: 50,
            rate_limit_games_per_minute: 30,
            cleanup_interval_secs: 60,
            inactive_timeout_secs: 1800,
        }
    }
}

fn env_or<T: FromStr>(key: &str, default: T) -> T {
    match env::var(key) {
        Ok(value) => value.trim().parse().unwrap_or_else(|_| {
            warn!("Ignoring unparseable {}={:?}, using default", key, value);
            default
        }),
        Err(_) => default,
    }
}

impl Settings {
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let cors_allowed_origins = env::var("CORS_ALLOWED_ORIGINS")
            .map(|origins| {
                origins
                    .split(',')
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
                    .collect()
            })
            .unwrap_or(defaults.cors_allowed_origins);

        let settings = Self {
            cors_allowed_origins,
            safe_first_click: env_or("SAFE_FIRST_CLICK", defaults.safe_first_click),
            max_rows: env_or("MAX_ROWS", defaults.max_rows),
            max_cols: env_or("MAX_COLS", defaults.max_cols),
            rate_limit_games_per_minute: env_or(
                "RATE_LIMIT_GAMES_PER_MINUTE",
                defaults.rate_limit_games_per_minute,
            ),
            cleanup_interval_secs: env_or("CLEANUP_INTERVAL_SECONDS", defaults.cleanup_interval_secs),
            inactive_timeout_secs: env_or(
                "INACTIVE_SESSION_TIMEOUT_SECONDS",
                defaults.inactive_timeout_secs,
            ),
        };

        info!("Loaded settings: {:?}", settings);
        settings
    }

    /// Validates requested dimensions against both the board rules and the
    /// configured size limits.
    pub fn board_config(&self, rows: i64, cols: i64, mines: i64) -> Result<BoardConfig> {
        let (Ok(rows), Ok(cols), Ok(mines)) = (
            usize::try_from(rows),
            usize::try_from(cols),
            usize::try_from(mines),
        ) else {
            return Err(EngineError::InvalidConfiguration(
                "rows, cols and mines must not be negative",
            ));
        };
        if rows > self.max_rows || cols > self.max_cols {
            return Err(EngineError::InvalidConfiguration(
                "board exceeds the maximum size",
            ));
        }
        BoardConfig::new(rows, cols, mines)
    }
}
