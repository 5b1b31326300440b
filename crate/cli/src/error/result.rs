use std::fmt::Display;

use super::CliError;

pub type CliResult<R> = Result<R, CliError>;

/// Trait for providing helper methods for `CliResult`.
pub trait CliResultHelper<T> {
    /// Sets the context for the error using a closure.
    ///
    /// # Errors
    ///
    /// Returns a `CliResult` with the context returned by the closure.
    fn with_context<D, O>(self, op: O) -> CliResult<T>
    where
        D: Display + Send + Sync + 'static,
        O: FnOnce() -> D;
}

impl<T, E> CliResultHelper<T> for Result<T, E>
where
    E: std::error::Error,
{
    fn with_context<D, O>(self, op: O) -> CliResult<T>
    where
        D: Display + Send + Sync + 'static,
        O: FnOnce() -> D,
    {
        self.map_err(|e| CliError::Default(format!("{}: {e}", op())))
    }
}
