//! Copyright 2024 JaCarta tester developers
//!
//! PKCS#11 binding over a vendor library loaded at runtime (e.g. `libjcPKCS11-2.so` for
//! JaCarta tokens). [`HsmLib`] implements the [`jacarta_interfaces::Pkcs11Api`] capability
//! interface consumed by the tester.

#![allow(non_snake_case)]

mod error;
mod hsm_lib;
mod pkcs11_api;
mod session;
mod slots;

pub mod test_helpers;

#[cfg(test)]
#[cfg(feature = "jacarta")]
mod tests;

pub use error::{HError, HResult};
pub use hsm_lib::{HsmLib, Info};

/// Call a PKCS#11 function of the loaded library and turn its `CK_RV` into a
/// [`jacarta_interfaces::Pkcs11Result`].
///
/// A function missing from the library fails with `CKR_FUNCTION_NOT_SUPPORTED`.
#[macro_export]
macro_rules! hsm_call {
    ($hsm_lib:expr, $function:ident $(, $arg:expr)* $(,)?) => {{
        let function = $hsm_lib
            .$function
            .ok_or(::jacarta_interfaces::ReturnValue::FUNCTION_NOT_SUPPORTED)?;
        #[allow(unsafe_code)]
        let rv = unsafe { function($($arg),*) };
        let rv = ::jacarta_interfaces::ReturnValue(u64::from(rv));
        ::jacarta_logger::trace!("{} -> {}", stringify!($function), rv);
        rv.into_result()
    }};
}
