//! Console logging through log4rs, with a root level that can be raised while
//! the wizard runs.

#[derive(Debug)]
pub enum Error {
    /// The appender or root configuration was rejected.
    Config(log4rs::config::runtime::ConfigErrors),
    /// A global logger was already installed.
    AlreadySet(log::SetLoggerError),
}
impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Config(err) => Some(err),
            Error::AlreadySet(err) => Some(err),
        }
    }
}
impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::Config(_) => write!(f, "invalid logger configuration"),
            Error::AlreadySet(_) => write!(f, "a logger is already installed"),
        }
    }
}
impl From<log4rs::config::runtime::ConfigErrors> for Error {
    fn from(err: log4rs::config::runtime::ConfigErrors) -> Self {
        return Self::Config(err);
    }
}
impl From<log::SetLoggerError> for Error {
    fn from(err: log::SetLoggerError) -> Self {
        return Self::AlreadySet(err);
    }
}

/// The whole log4rs configuration for one root `level`. log4rs cannot change
/// the level of a running root logger in place, so switching levels means
/// building this again and handing it to the [`log4rs::Handle`].
fn make_logger_config(
    level: log::LevelFilter,
) -> Result<log4rs::Config, log4rs::config::runtime::ConfigErrors> {
    let console: log4rs::append::console::ConsoleAppender =
        log4rs::append::console::ConsoleAppender::builder()
            .encoder(Box::new(log4rs::encode::pattern::PatternEncoder::new(
                "[{d(%Y-%m-%dT%H:%M:%S)}] {h([{l}])} - {m}{n}",
            )))
            .build();

    return log4rs::Config::builder()
        .appender(log4rs::config::Appender::builder().build("console", Box::new(console)))
        .build(
            log4rs::config::Root::builder()
                .appender("console")
                .build(level),
        );
}

/// Handle to the global logger that allows changing the level later on.
pub struct Logger {
    handle: log4rs::Handle,
}

impl Logger {
    /// Install the global logger at `level`. Fails if one is installed
    /// already.
    pub fn init(level: log::LevelFilter) -> Result<Self, Error> {
        let config: log4rs::Config = make_logger_config(level)?;
        let handle: log4rs::Handle = log4rs::init_config(config)?;
        return Ok(Self { handle });
    }

    /// Replace the root level of the running logger.
    pub fn set_level(&self, level: log::LevelFilter) -> Result<(), Error> {
        let config: log4rs::Config = make_logger_config(level)?;
        self.handle.set_config(config);
        log::debug!("Log level set to {level}");
        return Ok(());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_carries_root_level() {
        for level in [log::LevelFilter::Info, log::LevelFilter::Debug] {
            let config: log4rs::Config = make_logger_config(level).unwrap();
            assert_eq!(config.root().level(), level);
        }
    }
}
