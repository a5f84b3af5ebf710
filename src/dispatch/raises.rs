// Error kinds compared by verify_throws.

use std::fmt;
use std::io;
use std::num::{IntErrorKind, ParseIntError};

use crate::error::{BridgeError, ErrorCode};

/// Errors that expose a comparable kind.
pub trait Raised {
    type Kind: PartialEq + fmt::Debug;

    fn kind(&self) -> Self::Kind;
}

impl Raised for io::Error {
    type Kind = io::ErrorKind;

    fn kind(&self) -> io::ErrorKind {
        io::Error::kind(self)
    }
}

impl Raised for ParseIntError {
    type Kind = IntErrorKind;

    fn kind(&self) -> IntErrorKind {
        ParseIntError::kind(self).clone()
    }
}

/// Bridge errors compare by numeric code.
impl Raised for BridgeError {
    type Kind = i32;

    fn kind(&self) -> i32 {
        self.code()
    }
}
