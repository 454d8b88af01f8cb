use crate::error::ConfigError;
use std::{env, path::PathBuf, time::Duration};

pub const DEFAULT_TARGET_TABLE: &str = "pdf_data";
pub const DEFAULT_BATCH_SIZE: usize = 1000;

/// Where and how the clean table gets appended.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StoreConfig {
    /// Existing DuckDB database file holding the target table.
    pub store_path: PathBuf,
    pub table_name: String,
    pub batch_size: usize,
}

impl StoreConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from any key → value lookup. `DATABASE_URL` is mandatory.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let url = lookup("DATABASE_URL")
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .ok_or(ConfigError::Missing("DATABASE_URL"))?;
        let store_path = parse_store_url(&url)?;

        let table_name = lookup("TARGET_TABLE")
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| DEFAULT_TARGET_TABLE.to_string());

        let batch_size = match lookup("LOAD_BATCH_SIZE") {
            Some(raw) => match raw.trim().parse::<usize>() {
                Ok(n) if n >= 1 => n,
                _ => {
                    return Err(ConfigError::Invalid {
                        name: "LOAD_BATCH_SIZE",
                        value: raw,
                        reason: "expected a positive integer".into(),
                    })
                }
            },
            None => DEFAULT_BATCH_SIZE,
        };

        Ok(StoreConfig {
            store_path,
            table_name,
            batch_size,
        })
    }
}

/// Accepts `duckdb://<path>` or a bare file path.
///
/// An in-memory database never holds the target table, so `:memory:` is
/// rejected here rather than at load time.
fn parse_store_url(url: &str) -> Result<PathBuf, ConfigError> {
    let rest = match url.split_once("://") {
        Some(("duckdb", rest)) => rest,
        Some(_) => return Err(ConfigError::UnsupportedStore(url.to_string())),
        None => url,
    };
    match rest {
        "" | ":memory:" => Err(ConfigError::UnsupportedStore(url.to_string())),
        path => Ok(PathBuf::from(path)),
    }
}

/// Settings for the external table-detection tools.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DetectionConfig {
    pub camelot_bin: String,
    pub java_bin: String,
    pub tabula_jar: Option<PathBuf>,
    /// Upper bound for one whole backend invocation.
    pub timeout: Option<Duration>,
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            camelot_bin: "camelot".to_string(),
            java_bin: "java".to_string(),
            tabula_jar: None,
            timeout: None,
        }
    }
}

impl DetectionConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = DetectionConfig::default();
        let non_empty = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let timeout = match non_empty("BACKEND_TIMEOUT_SECS") {
            Some(raw) => match raw.parse::<u64>() {
                Ok(secs) if secs > 0 => Some(Duration::from_secs(secs)),
                _ => {
                    return Err(ConfigError::Invalid {
                        name: "BACKEND_TIMEOUT_SECS",
                        value: raw,
                        reason: "expected a positive number of seconds".into(),
                    })
                }
            },
            None => None,
        };

        Ok(DetectionConfig {
            camelot_bin: non_empty("CAMELOT_BIN").unwrap_or(defaults.camelot_bin),
            java_bin: non_empty("JAVA_BIN").unwrap_or(defaults.java_bin),
            tabula_jar: non_empty("TABULA_JAR").map(PathBuf::from),
            timeout,
        })
    }
}
