//! Definition of errors.

use std::error::Error;
use std::fmt;

pub type Result<T, E = HmmTaggerError> = std::result::Result<T, E>;

/// Errors returned by this crate.
#[derive(Debug)]
pub enum HmmTaggerError {
    InvalidModel(InvalidModelError),
    InvalidArgument(InvalidArgumentError),
    MalformedRecord(MalformedRecordError),
    DecodeError(bincode::error::DecodeError),
    EncodeError(bincode::error::EncodeError),
    IOError(std::io::Error),
}

impl HmmTaggerError {
    pub(crate) fn invalid_model<S>(msg: S) -> Self
    where
        S: Into<String>,
    {
        Self::InvalidModel(InvalidModelError { msg: msg.into() })
    }

    pub(crate) fn invalid_argument<S>(arg: &'static str, msg: S) -> Self
    where
        S: Into<String>,
    {
        Self::InvalidArgument(InvalidArgumentError {
            arg,
            msg: msg.into(),
        })
    }

    pub(crate) fn malformed_record<S>(line_no: usize, line: S) -> Self
    where
        S: Into<String>,
    {
        Self::MalformedRecord(MalformedRecordError {
            line_no,
            line: line.into(),
        })
    }
}

impl fmt::Display for HmmTaggerError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::InvalidModel(e) => e.fmt(f),
            Self::InvalidArgument(e) => e.fmt(f),
            Self::MalformedRecord(e) => e.fmt(f),
            Self::DecodeError(e) => e.fmt(f),
            Self::EncodeError(e) => e.fmt(f),
            Self::IOError(e) => e.fmt(f),
        }
    }
}

impl Error for HmmTaggerError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::DecodeError(e) => Some(e),
            Self::EncodeError(e) => Some(e),
            Self::IOError(e) => Some(e),
            _ => None,
        }
    }
}

/// Error used when the model is invalid.
#[derive(Debug)]
pub struct InvalidModelError {
    /// Error message.
    pub(crate) msg: String,
}

impl fmt::Display for InvalidModelError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "InvalidModelError: {}", self.msg)
    }
}

impl Error for InvalidModelError {}

/// Error used when the argument is invalid.
#[derive(Debug)]
pub struct InvalidArgumentError {
    /// Name of the argument.
    pub(crate) arg: &'static str,

    /// Error message.
    pub(crate) msg: String,
}

impl fmt::Display for InvalidArgumentError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "InvalidArgumentError: {}: {}", self.arg, self.msg)
    }
}

impl Error for InvalidArgumentError {}

/// Error used when a line of a labeled corpus does not contain both a word and a tag.
#[derive(Debug)]
pub struct MalformedRecordError {
    /// 1-based line number.
    pub(crate) line_no: usize,

    /// The offending line.
    pub(crate) line: String,
}

impl MalformedRecordError {
    /// Gets the 1-based line number of the record.
    pub const fn line_no(&self) -> usize {
        self.line_no
    }

    /// Gets the text of the record.
    pub fn line(&self) -> &str {
        &self.line
    }
}

impl fmt::Display for MalformedRecordError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "MalformedRecordError: line {}: expected `word tag`, got {:?}",
            self.line_no, self.line
        )
    }
}

impl Error for MalformedRecordError {}

impl From<bincode::error::DecodeError> for HmmTaggerError {
    fn from(error: bincode::error::DecodeError) -> Self {
        Self::DecodeError(error)
    }
}

impl From<bincode::error::EncodeError> for HmmTaggerError {
    fn from(error: bincode::error::EncodeError) -> Self {
        Self::EncodeError(error)
    }
}

impl From<std::io::Error> for HmmTaggerError {
    fn from(error: std::io::Error) -> Self {
        Self::IOError(error)
    }
}
