use std::time::Duration;

pub const COMMAND_TIMEOUT_DEFAULT: Duration = Duration::from_secs(3600);

pub const MIN_DISK_SPACE_MB_DEFAULT: u64 = 2000;

pub const MAX_BUILD_JOBS_DEFAULT: usize = 16;

pub const STDERR_TAIL_LINES: usize = 15;

pub const SUDO_CACHED_CHECK_TIMEOUT: Duration = Duration::from_secs(1);

pub const SUDO_VALIDATE_TIMEOUT: Duration = Duration::from_secs(30);

pub const SERVER_NAME_LEN_MAX: usize = 64;

pub const DIR_NAME_SOURCE: &str = "source";

pub const DIR_NAME_BUILD: &str = "server";

pub const FILE_NAME_BASIC_CONFIG: &str = "basic_config.cfg";

pub const PATH_DEFAULT_CONFIG: &str = "/etc/teemake/config.toml";

pub const ENV_VAR_CONFIG_PATH: &str = "TEEMAKE_CONFIG";

pub const EXECUTABLE_SUDO: &str = "sudo";

/// Tokens that enable a boolean or generator option, compared case-insensitively.
pub const TRUTHY_TOKENS: [&str; 4] = ["ON", "YES", "TRUE", "1"];

/// Tokens that disable a boolean option, compared case-insensitively.
pub const FALSY_TOKENS: [&str; 4] = ["OFF", "NO", "FALSE", "0"];

pub const FLAG_NINJA: &str = "-GNinja";

pub const FLAG_CLIENT: &str = "-DCLIENT";

pub const FLAG_SERVER: &str = "-DSERVER";
