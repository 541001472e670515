//! Transport faults that abort a negotiation.
//!
//! Validation failures are not errors here: they resolve locally into a
//! [`Rejection`](crate::Rejection) that has already been written to the
//! peer. Only transport faults surface as [`UpgradeError`]; after one, the
//! socket is unusable and must not be reused.

use std::fmt;
use std::io;

/// Transport fault during handshake I/O.
#[derive(Debug)]
pub enum UpgradeError {
    /// A socket read or write failed mid-handshake.
    Io(io::Error),
    /// The hixie-76 body ended before all 8 challenge key bytes arrived.
    ChallengeShortRead {
        /// Bytes read before EOF.
        got: usize,
    },
}

impl fmt::Display for UpgradeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(e) => write!(f, "I/O error: {e}"),
            Self::ChallengeShortRead { got } => {
                write!(f, "challenge key cut short: got {got} of 8 bytes")
            }
        }
    }
}

impl std::error::Error for UpgradeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            Self::ChallengeShortRead { .. } => None,
        }
    }
}

impl From<io::Error> for UpgradeError {
    fn from(err: io::Error) -> Self {
        Self::Io(err)
    }
}
