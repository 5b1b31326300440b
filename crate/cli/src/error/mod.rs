use jacarta_base_hsm::HError;
use jacarta_interfaces::ReturnValue;
use jacarta_tester::{DiscoveryError, PlaintextError, RunnerError, TestOutcome};
use thiserror::Error;

pub mod result;

#[derive(Error, Debug)]
pub enum CliError {
    #[error("{0}")]
    Default(String),

    #[error(transparent)]
    Discovery(#[from] DiscoveryError),

    #[error(transparent)]
    Hsm(#[from] HError),

    #[error("invalid payload: {0}")]
    Payload(#[from] PlaintextError),

    #[error(transparent)]
    Pkcs11(#[from] ReturnValue),

    #[error(transparent)]
    Runner(#[from] RunnerError),

    /// The run completed, but not successfully
    #[error("{0}")]
    TestFailed(TestOutcome),

    #[error(transparent)]
    TomlError(#[from] toml::de::Error),
}

/// Construct a CLI error from a string.
#[macro_export]
macro_rules! cli_error {
    ($msg:literal) => {
        $crate::error::CliError::Default(::core::format_args!($msg).to_string())
    };
    ($err:expr $(,)?) => ({
        $crate::error::CliError::Default($err.to_string())
    });
    ($fmt:expr, $($arg:tt)*) => {
        $crate::error::CliError::Default(::core::format_args!($fmt, $($arg)*).to_string())
    };
}

/// Return early with an error if a condition is not satisfied.
#[macro_export]
macro_rules! cli_bail {
    ($msg:literal) => {
        return ::core::result::Result::Err($crate::cli_error!($msg))
    };
    ($err:expr $(,)?) => {
        return ::core::result::Result::Err($err)
    };
    ($fmt:expr, $($arg:tt)*) => {
        return ::core::result::Result::Err($crate::cli_error!($fmt, $($arg)*))
    };
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use jacarta_interfaces::ReturnValue;
    use jacarta_tester::{Phase, PinError, TestOutcome, TokenTestError};

    use super::CliError;
    use crate::error::result::CliResult;

    #[test]
    fn test_cli_error_interpolation() {
        let var = 42;
        let err = cli_error!("interpolate {var}");
        assert_eq!("interpolate 42", err.to_string());

        match bail() {
            Err(e) => assert_eq!("interpolate 43", e.to_string()),
            Ok(()) => panic!("expected error"),
        }
    }

    fn bail() -> CliResult<()> {
        let var = 43;
        if true {
            cli_bail!("interpolate {var}");
        }
        Ok(())
    }

    #[test]
    fn test_failed_run_message() {
        let err = CliError::TestFailed(TestOutcome::Failure {
            phase: Phase::Login,
            cause: TokenTestError::Pin(PinError::Locked),
        });
        let message = err.to_string();
        assert!(message.starts_with("pin-locked failure during login"));
        assert!(message.contains("unblock"));

        let err = CliError::from(ReturnValue::TOKEN_NOT_PRESENT);
        assert_eq!(err.to_string(), "CKR_TOKEN_NOT_PRESENT (0x000000E0)");
    }
}
