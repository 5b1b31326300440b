use std::fmt::{self, Display, Formatter};

use jacarta_interfaces::{ReturnValue, SlotId};
use thiserror::Error;

pub type TokenTestResult<T> = Result<T, TokenTestError>;

/// Why a token could not be resolved
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DiscoveryError {
    #[error("no slots")]
    NoSlots,

    #[error("token not present")]
    TokenNotPresent,

    /// The runtime failed while the directory was being read
    #[error("{operation} failed{}: {code}", on_slot(.slot.as_ref()))]
    Directory {
        operation: &'static str,
        slot: Option<SlotId>,
        code: ReturnValue,
    },
}

fn on_slot(slot: Option<&SlotId>) -> String {
    slot.map(|s| format!(" on slot {s}")).unwrap_or_default()
}

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum PinError {
    #[error("the user PIN is locked")]
    Locked,

    #[error("the user PIN is not initialized")]
    Uninitialized,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TokenTestError {
    #[error("discovery failed: {0}")]
    Discovery(#[from] DiscoveryError),

    #[error("{operation} failed: {code}")]
    Library {
        operation: &'static str,
        code: ReturnValue,
    },

    #[error("{operation} failed: {code}")]
    Session {
        operation: &'static str,
        code: ReturnValue,
    },

    #[error(transparent)]
    Pin(#[from] PinError),

    #[error("{operation} failed: {code}")]
    CryptoOperation {
        operation: &'static str,
        code: ReturnValue,
    },

    #[error(
        "unexpected signature length: {} for a {capacity} byte buffer",
        produced_len(.produced.as_ref())
    )]
    UnexpectedSignatureLength {
        produced: Option<usize>,
        capacity: usize,
    },

    #[error("signature verification failed")]
    VerificationFailed,

    #[error("the token was detached")]
    DeviceDetached,
}

fn produced_len(produced: Option<&usize>) -> String {
    produced.map_or_else(|| "more bytes than fit".to_owned(), |n| format!("{n} bytes"))
}

/// Which family of calls a status was returned by
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum CallKind {
    Library,
    Session,
    Crypto,
}

impl TokenTestError {
    /// Classify a non-OK status at the point where it was returned.
    ///
    /// PIN and detach statuses get their own category whatever the call;
    /// everything else is wrapped with the operation name and the raw code.
    pub(crate) fn classify(kind: CallKind, operation: &'static str, code: ReturnValue) -> Self {
        match code {
            ReturnValue::PIN_LOCKED => Self::Pin(PinError::Locked),
            ReturnValue::USER_PIN_NOT_INITIALIZED => Self::Pin(PinError::Uninitialized),
            ReturnValue::DEVICE_REMOVED | ReturnValue::TOKEN_NOT_PRESENT => Self::DeviceDetached,
            code => match kind {
                CallKind::Library => Self::Library { operation, code },
                CallKind::Session => Self::Session { operation, code },
                CallKind::Crypto => Self::CryptoOperation { operation, code },
            },
        }
    }

    #[must_use]
    pub const fn category(&self) -> ErrorCategory {
        match self {
            Self::Discovery(_) => ErrorCategory::Discovery,
            Self::Pin(PinError::Locked) => ErrorCategory::PinLocked,
            Self::Pin(PinError::Uninitialized) => ErrorCategory::PinUninitialized,
            Self::VerificationFailed => ErrorCategory::VerificationFailed,
            Self::UnexpectedSignatureLength { .. } => ErrorCategory::UnexpectedLength,
            Self::DeviceDetached => ErrorCategory::DeviceDetached,
            Self::Library { .. } | Self::Session { .. } | Self::CryptoOperation { .. } => {
                ErrorCategory::OperationFailed
            }
        }
    }

    /// The raw status carried by this error, if any
    #[must_use]
    pub const fn code(&self) -> Option<ReturnValue> {
        match self {
            Self::Library { code, .. }
            | Self::Session { code, .. }
            | Self::CryptoOperation { code, .. }
            | Self::Discovery(DiscoveryError::Directory { code, .. }) => Some(*code),
            Self::Pin(PinError::Locked) => Some(ReturnValue::PIN_LOCKED),
            Self::Pin(PinError::Uninitialized) => Some(ReturnValue::USER_PIN_NOT_INITIALIZED),
            _ => None,
        }
    }

    #[must_use]
    pub const fn hint(&self) -> Option<&'static str> {
        self.category().hint()
    }
}

/// The category a failure is reported under
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    PinLocked,
    PinUninitialized,
    VerificationFailed,
    OperationFailed,
    DeviceDetached,
    Discovery,
    UnexpectedLength,
}

impl ErrorCategory {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::PinLocked => "pin-locked",
            Self::PinUninitialized => "pin-uninitialized",
            Self::VerificationFailed => "verification-failed",
            Self::OperationFailed => "operation-failed",
            Self::DeviceDetached => "device-detached",
            Self::Discovery => "discovery",
            Self::UnexpectedLength => "unexpected-length",
        }
    }

    /// What the user can do about it
    #[must_use]
    pub const fn hint(self) -> Option<&'static str> {
        match self {
            Self::PinLocked => Some("unblock the user PIN with the PIN unblock flow"),
            Self::PinUninitialized => {
                Some("initialize the token and its user PIN (`jacarta init-token`)")
            }
            Self::DeviceDetached => Some("reconnect the reader or insert the card"),
            _ => None,
        }
    }
}

impl Display for ErrorCategory {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
