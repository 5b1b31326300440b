use crate::{HError, HResult};

/// Default location of the JaCarta PKCS#11 library installed by the vendor package
pub const JACARTA_PKCS11_LIB: &str = "/usr/lib/libjcPKCS11-2.so";

pub fn get_hsm_password() -> HResult<String> {
    std::env::var("HSM_USER_PASSWORD").map_err(|_| {
        HError::Default(
            "The user password for the token is not set. Please set the HSM_USER_PASSWORD \
             environment variable"
                .to_owned(),
        )
    })
}

/// The library path from `JACARTA_PKCS11_LIB`, or the vendor default
#[must_use]
pub fn get_lib_path() -> String {
    std::env::var("JACARTA_PKCS11_LIB").unwrap_or_else(|_| JACARTA_PKCS11_LIB.to_owned())
}
