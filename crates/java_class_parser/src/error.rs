//! Contains the error type that can be emitted

use crate::FQNameBuf;
use std::backtrace::Backtrace;
use std::fmt::{Debug, Display, Formatter};
use std::io;
use std::path::PathBuf;

/// The error type
pub struct Error {
    kind: ErrorKind,
    backtrace: Backtrace,
}

impl Debug for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:#}", self)
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        if f.alternate() {
            write!(f, "{} at\n{}", self.kind, self.backtrace)
        } else {
            write!(f, "{}", self.kind)
        }
    }
}

impl std::error::Error for Error {}

impl Error {
    /// Create a new error from an an error kind
    pub fn new<E: Into<ErrorKind>>(kind: E) -> Self {
        Self {
            kind: kind.into(),
            backtrace: Backtrace::capture(),
        }
    }
    /// Gets the error kind
    pub fn kind(&self) -> &ErrorKind {
        &self.kind
    }
}

impl<E: Into<ErrorKind>> From<E> for Error {
    fn from(error: E) -> Self {
        Self::new(error)
    }
}

/// The error kind
#[derive(Debug, thiserror::Error)]
pub enum ErrorKind {
    /// No class could be found for a given path
    #[error("No class found for path {0:?}")]
    NoClassFound(FQNameBuf),
    /// Encountered an unsupported classpath entry
    #[error("Unsupported entry in classpath: {0:?}")]
    UnsupportedEntry(PathBuf),
    /// The file doesn't start with `0xCAFEBABE`
    #[error("{0:#010x} is not the class file magic number")]
    BadMagic(u32),
    /// An unknown tag was found in the constant pool
    #[error("{0} is not a known constant pool tag")]
    UnknownConstantPoolInfoTag(u8),
    /// A constant pool index pointed nowhere, or at the wrong kind of entry
    #[error("constant pool index {index} is not a valid {expected} entry")]
    InvalidConstantPoolIndex {
        /// the index that was followed
        index: u16,
        /// what kind of entry was expected there
        expected: &'static str,
    },
    /// An attribute could not be parsed
    #[error("An error occurred while resolving attribute {0}")]
    ResolveAttribute(String),
    /// An io error occurred
    #[error(transparent)]
    IoError(#[from] io::Error),
    /// A nom error occurred
    #[error(transparent)]
    NomError {
        /// the nom error kind
        kind: nom::Err<nom::error::Error<Vec<u8>>>,
    },
    /// A zip error occurred.
    #[error(transparent)]
    ZipError(#[from] zip::result::ZipError),
}

impl<'a> From<nom::Err<nom::error::Error<&'a [u8]>>> for ErrorKind {
    fn from(e: nom::Err<nom::error::Error<&'a [u8]>>) -> Self {
        Self::NomError { kind: e.to_owned() }
    }
}

impl ErrorKind {
    pub(crate) fn invalid_index(index: u16, expected: &'static str) -> Self {
        Self::InvalidConstantPoolIndex { index, expected }
    }
}
