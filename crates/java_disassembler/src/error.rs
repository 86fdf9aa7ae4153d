//! Contains the error type that can be emitted

use std::backtrace::Backtrace;
use std::fmt::{Debug, Display, Formatter};

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

    /// Whether this is the provider saying a type doesn't exist
    pub fn is_not_found(&self) -> bool {
        matches!(self.kind, ErrorKind::TypeNotFound(_))
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
    /// The provider has no class with this name
    #[error("no type named {0}")]
    TypeNotFound(String),
    /// The instruction stream ended early or is malformed
    #[error("bad bytecode at offset {offset}: {reason}")]
    BytecodeDecode {
        /// offset of the instruction being decoded
        offset: usize,
        /// what went wrong
        reason: &'static str,
    },
    /// A method expected to have a body has no `Code` attribute
    #[error("method {0} has no Code attribute")]
    MissingCodeAttribute(String),
    /// An instruction operand pointed at a missing or wrong kind of constant
    #[error("constant pool index {index} is not a {expected}")]
    InvalidConstantPoolRef {
        /// the operand value
        index: u16,
        /// what the instruction needed there
        expected: &'static str,
    },
    /// A field or method descriptor could not be parsed
    #[error("invalid descriptor {0:?}")]
    InvalidDescriptor(String),
    /// The class file backing a type could not be read
    #[error(transparent)]
    ClassFile(#[from] java_class_parser::error::Error),
    /// The rendered text could not be written out
    #[error("could not write the disassembly: {0}")]
    Output(#[from] std::io::Error),
}

impl ErrorKind {
    pub(crate) fn truncated(offset: usize) -> Self {
        Self::BytecodeDecode {
            offset,
            reason: "instruction runs past the end of the code",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn write_failures_are_output_errors() {
        let error = Error::from(io::Error::new(io::ErrorKind::PermissionDenied, "read-only"));
        assert!(matches!(error.kind(), ErrorKind::Output(_)));
        assert_eq!(error.to_string(), "could not write the disassembly: read-only");
        assert!(!error.is_not_found());
    }
}
