use crate::registry::LookupError;
use std::{
    fmt::{self, Formatter},
    io,
};

/// The process exit codes
///
/// Invalid options are reported by the argument parser before any [`Error`] can occur.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[repr(i32)]
pub enum ExitStatus {
    Ok = 0,
    FatalUnspecified = 1,
    InvalidOptions = 3,
    MissingDependency = 4,
    UnknownModule = 5,
    FatalFail = 6,
    ErrorFail = 20,
    /// Not an error, the requested release already exists
    ReturnFalse = 40,
}

impl ExitStatus {
    pub fn code(self) -> i32 {
        self as i32
    }
}

/// Everything that can stop a run
#[derive(Debug)]
pub enum Error {
    /// A required program is not installed
    MissingDependency { program: String, source: io::Error },
    /// The directory does not map to a known image
    UnknownModule(String),
    /// A condition that indicates a broken input or a bug
    Fatal(eyre::Report),
    /// An external command or request failed
    Failed(eyre::Report),
    /// Anything else
    Unspecified(eyre::Report),
}

impl Error {
    /// The exit status to terminate with
    pub fn exit_status(&self) -> ExitStatus {
        match self {
            Self::MissingDependency { .. } => ExitStatus::MissingDependency,
            Self::UnknownModule(_) => ExitStatus::UnknownModule,
            Self::Fatal(_) => ExitStatus::FatalFail,
            Self::Failed(_) => ExitStatus::ErrorFail,
            Self::Unspecified(_) => ExitStatus::FatalUnspecified,
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingDependency { program, .. } => {
                write!(f, "missing dependency: {program} is not installed")
            }
            Self::UnknownModule(name) => write!(
                f,
                "unknown module {name:?}, pass --image-name to build it anyway"
            ),
            Self::Fatal(_) => write!(f, "detected fatal failure"),
            Self::Failed(_) => write!(f, "detected failure"),
            Self::Unspecified(_) => write!(f, "unexpected error"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::MissingDependency { source, .. } => Some(source),
            Self::Fatal(report) | Self::Failed(report) | Self::Unspecified(report) => {
                Some(&**report)
            }
            Self::UnknownModule(_) => None,
        }
    }
}

impl From<LookupError> for Error {
    fn from(err: LookupError) -> Self {
        Self::Failed(eyre::Report::new(err))
    }
}

impl From<io::Error> for Error {
    fn from(err: io::Error) -> Self {
        Self::Unspecified(eyre::Report::new(err))
    }
}
