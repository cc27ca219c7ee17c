//! Main error module.

/// Non recoverable errors that the _main_ may exit with.
#[derive(Debug)]
pub enum Error {
    Tty(crate::tty::Error),
    Pipeline(crate::pipeline::Error),
}
impl Error {
    /// Whether the error means the user walked away, i.e. input was closed.
    pub fn is_interrupt(&self) -> bool {
        return matches!(self, Error::Tty(crate::tty::Error::InputClosed));
    }
}
impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Tty(err) => Some(err),
            Error::Pipeline(err) => Some(err),
        }
    }
}
impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::Tty(_) => write!(f, "interaction with the user failed"),
            Error::Pipeline(_) => write!(f, "build could not be carried out"),
        }
    }
}
impl From<crate::tty::Error> for Error {
    fn from(err: crate::tty::Error) -> Self {
        return Self::Tty(err);
    }
}
impl From<crate::pipeline::Error> for Error {
    fn from(err: crate::pipeline::Error) -> Self {
        return Self::Pipeline(err);
    }
}
