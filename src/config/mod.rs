//! Configuration for the program.

#[derive(Debug)]
pub enum Error {
    Read((std::path::PathBuf, std::io::Error)),
    Parse((std::path::PathBuf, toml::de::Error)),
}
impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Read((_, err)) => Some(err),
            Error::Parse((_, err)) => Some(err),
        }
    }
}
impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::Read((path, _)) => write!(f, "cannot read {}", path.to_string_lossy()),
            Error::Parse((path, _)) => write!(f, "invalid configuration in {}", path.to_string_lossy()),
        }
    }
}

/// Configuration for the program.
#[derive(Debug, Clone, PartialEq, Eq, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// How long any single external command may run before it is killed.
    pub command_timeout_secs: u64,
    /// Free space required on the working filesystem before building.
    pub min_disk_space_mb: u64,
    /// Upper bound for `make -j`.
    pub max_build_jobs: usize,
}

impl Default for Config {
    fn default() -> Self {
        return Self {
            command_timeout_secs: crate::constants::COMMAND_TIMEOUT_DEFAULT.as_secs(),
            min_disk_space_mb: crate::constants::MIN_DISK_SPACE_MB_DEFAULT,
            max_build_jobs: crate::constants::MAX_BUILD_JOBS_DEFAULT,
        };
    }
}

impl Config {
    /// Where the configuration of this program will be stored at by default,
    /// unless overridden with the `TEEMAKE_CONFIG` environment variable.
    pub fn default_fs_path() -> std::path::PathBuf {
        return match std::env::var_os(crate::constants::ENV_VAR_CONFIG_PATH) {
            Some(n) => std::path::PathBuf::from(n),
            None => crate::constants::PATH_DEFAULT_CONFIG.into(),
        };
    }

    pub fn command_timeout(&self) -> std::time::Duration {
        return std::time::Duration::from_secs(self.command_timeout_secs);
    }

    /// Get configuration from filesystem.
    pub fn get_from_fs(config_file_path: &std::path::Path) -> Result<Self, Error> {
        let content: String = std::fs::read_to_string(config_file_path)
            .map_err(|err| Error::Read((config_file_path.to_path_buf(), err)))?;
        let config: Config = toml::from_str(&content)
            .map_err(|err| Error::Parse((config_file_path.to_path_buf(), err)))?;
        return Ok(config);
    }

    /// Configuration from `path` if it exists, defaults otherwise. A file
    /// that exists but cannot be used is logged and ignored.
    pub fn load_or_default(path: &std::path::Path) -> Self {
        if !path.exists() {
            log::debug!(
                "No configuration file at {}, using defaults",
                path.to_string_lossy()
            );
            return Self::default();
        }
        return match Self::get_from_fs(path) {
            Ok(n) => {
                log::debug!("Configuration read from {}: {n:?}", path.to_string_lossy());
                n
            }
            Err(err) => {
                log::warn!(
                    "Ignoring configuration file: {}",
                    crate::util::aggregate_error_tree(&err, 2).trim_end()
                );
                Self::default()
            }
        };
    }
}
