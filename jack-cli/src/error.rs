//! Application errors
use std::{
    fmt,
    path::{Path, PathBuf},
};

#[derive(Debug)]
pub struct AppError {
    pub kind: ErrorKind,
}

impl std::error::Error for AppError {}

#[derive(Debug)]
pub enum ErrorKind {
    Jack(jack_compiler::JackError),
    Io(std::io::Error),
    /// Reading or writing the file of one unit failed.
    File(PathBuf, std::io::Error),
    Config(serde_yaml::Error),
    /// Path is neither a `.jack` file nor a directory.
    InvalidInput(PathBuf),
}

impl AppError {
    pub fn invalid_input(path: impl Into<PathBuf>) -> Self {
        Self {
            kind: ErrorKind::InvalidInput(path.into()),
        }
    }

    pub fn file(path: &Path, err: std::io::Error) -> Self {
        Self {
            kind: ErrorKind::File(path.to_path_buf(), err),
        }
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.kind)
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Jack(err) => write!(f, "{err}"),
            Self::Io(err) => write!(f, "io error: {err}"),
            Self::File(path, err) => write!(f, "{}: {err}", path.display()),
            Self::Config(err) => write!(f, "configuration error: {err}"),
            Self::InvalidInput(path) => {
                write!(f, "{} is not a .jack file or a directory", path.display())
            }
        }
    }
}

impl From<jack_compiler::JackError> for AppError {
    fn from(err: jack_compiler::JackError) -> Self {
        Self {
            kind: ErrorKind::Jack(err),
        }
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        Self {
            kind: ErrorKind::Io(err),
        }
    }
}

impl From<serde_yaml::Error> for AppError {
    fn from(err: serde_yaml::Error) -> Self {
        Self {
            kind: ErrorKind::Config(err),
        }
    }
}
