//! Copyright 2024 JaCarta tester developers

use jacarta_interfaces::ReturnValue;
use thiserror::Error;

pub type HResult<T> = Result<T, HError>;

#[derive(Error, Debug)]
pub enum HError {
    #[error("{0}")]
    Default(String),

    #[error("Error loading the library: {0}")]
    LibLoading(#[from] libloading::Error),

    #[error("PKCS#11 Error: {0}")]
    Pkcs11(#[from] ReturnValue),
}
