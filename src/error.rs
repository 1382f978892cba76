//! Error type used within crate with From for commonly used crate errors
use std::error;
use std::{fmt, io};

/// Result type used within crate
pub type Result<T> = std::result::Result<T, Error>;

/// `errno` reported when the line buffer cannot be allocated; `ENOMEM` on all supported platforms
pub const ENOMEM: i32 = 12;

#[derive(Debug, PartialEq, Clone)]
/// Kind of error produced
pub enum ErrorKind {
    /// External command could not be started; contains the OS error code if there was one
    Spawn(Option<i32>),
    /// Line buffer could not be allocated after the command was started; contains the errno
    Allocation(i32),
    /// Error parsing config file
    Config,
    /// [`std::io::Error`] writing output or reading a file
    Io,
    /// Invalid arg for method or cli
    InvalidArg,
    /// Error From other crate without enum variant
    Other(&'static str),
}

#[derive(Debug, PartialEq)]
/// usbscan error which impl [`std::error`]
pub struct Error {
    /// The [`ErrorKind`]
    pub kind: ErrorKind,
    /// String description
    pub message: String,
}

impl Error {
    /// New error helper
    pub fn new(kind: ErrorKind, message: &str) -> Error {
        Error {
            kind,
            message: message.to_string(),
        }
    }

    /// New [`ErrorKind::Spawn`] from the [`io::Error`] returned when launching `program`
    pub fn new_spawn(program: &str, error: &io::Error) -> Error {
        Error {
            kind: ErrorKind::Spawn(error.raw_os_error()),
            message: format!("Failed to run '{}': {}", program, error),
        }
    }

    /// New [`ErrorKind::Allocation`] for a line buffer of `capacity` bytes
    pub fn new_allocation(capacity: usize) -> Error {
        Error {
            kind: ErrorKind::Allocation(ENOMEM),
            message: format!("Failed to allocate {} byte line buffer", capacity),
        }
    }

    /// The [`ErrorKind`]
    pub fn kind(&self) -> ErrorKind {
        self.kind.to_owned()
    }

    /// The description
    pub fn message(&self) -> &String {
        &self.message
    }

    /// Numeric system error code carried by the error, if any
    pub fn code(&self) -> Option<i32> {
        match self.kind {
            ErrorKind::Spawn(code) => code,
            ErrorKind::Allocation(code) => Some(code),
            _ => None,
        }
    }
}

impl error::Error for Error {}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if f.alternate() {
            write!(f, "{}", self.message)
        } else {
            write!(f, "{:?} Error: {}", self.kind, self.message)
        }
    }
}

impl From<io::Error> for Error {
    fn from(error: io::Error) -> Self {
        Error {
            kind: ErrorKind::Io,
            message: error.to_string(),
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(error: serde_json::Error) -> Self {
        Error {
            kind: ErrorKind::Config,
            message: format!("Invalid config: {}", error),
        }
    }
}
