use std::fmt::{self, Display, Formatter};

use jacarta_interfaces::ReturnValue;

use crate::{ErrorCategory, TokenTestError};

/// The step of a run a failure is attributed to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    Initialize,
    Discovery,
    OpenSession,
    Login,
    GenerateKeyPair,
    Sign,
    Verify,
    InitToken,
}

impl Phase {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Initialize => "initialize",
            Self::Discovery => "discovery",
            Self::OpenSession => "open-session",
            Self::Login => "login",
            Self::GenerateKeyPair => "generate-key-pair",
            Self::Sign => "sign",
            Self::Verify => "verify",
            Self::InitToken => "init-token",
        }
    }
}

impl Display for Phase {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A completed step, reported to the sink as soon as it succeeds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Milestone {
    SlotResolved,
    SessionOpen,
    Authenticated,
    KeysGenerated,
    Signed,
    Verified,
    TokenInitialized,
}

impl Milestone {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::SlotResolved => "slot-resolved",
            Self::SessionOpen => "session-open",
            Self::Authenticated => "authenticated",
            Self::KeysGenerated => "keys-generated",
            Self::Signed => "signed",
            Self::Verified => "verified",
            Self::TokenInitialized => "token-initialized",
        }
    }
}

impl Display for Milestone {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The single terminal result of a run
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TestOutcome {
    Success,
    Failure { phase: Phase, cause: TokenTestError },
}

impl TestOutcome {
    #[must_use]
    pub const fn is_success(&self) -> bool {
        matches!(self, Self::Success)
    }

    #[must_use]
    pub const fn phase(&self) -> Option<Phase> {
        match self {
            Self::Success => None,
            Self::Failure { phase, .. } => Some(*phase),
        }
    }

    #[must_use]
    pub const fn cause(&self) -> Option<&TokenTestError> {
        match self {
            Self::Success => None,
            Self::Failure { cause, .. } => Some(cause),
        }
    }

    #[must_use]
    pub const fn category(&self) -> Option<ErrorCategory> {
        match self {
            Self::Success => None,
            Self::Failure { cause, .. } => Some(cause.category()),
        }
    }
}

impl Display for TestOutcome {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Success => f.write_str("data was signed and verified successfully"),
            Self::Failure { phase, cause } => {
                write!(f, "{} failure during {phase}: {cause}", cause.category())?;
                if let Some(hint) = cause.hint() {
                    write!(f, " ({hint})")?;
                }
                Ok(())
            }
        }
    }
}

/// A secondary error, observed while releasing the run resources.
///
/// Diagnostics never replace the outcome of the run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub operation: &'static str,
    pub code: ReturnValue,
}

impl Display for Diagnostic {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "teardown: {} failed: {}", self.operation, self.code)
    }
}
