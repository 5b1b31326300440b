use std::{
    fmt::{self, Display, Formatter},
    ptr,
    sync::atomic::{AtomicBool, Ordering},
};

use jacarta_interfaces::Pkcs11Result;
use jacarta_logger::{debug, warn};
use libloading::Library;
use pkcs11_sys::*;

use crate::{HResult, hsm_call, slots::padded_string};

/// A struct representing a PKCS#11 library loaded at runtime.
///
/// The library is loaded and its function pointers resolved by [`HsmLib::instantiate`],
/// but it is *not* initialized: `C_Initialize` and `C_Finalize` are driven by the caller
/// through the [`jacarta_interfaces::Pkcs11Api`] implementation, once per test run.
///
/// # Safety
///
/// This struct handles unsafe FFI calls to the PKCS#11 library internally. The public
/// interface is designed to be safe to use.
///
/// If the library is still initialized when the struct is dropped (a run was abandoned
/// half-way), `C_Finalize` is called on drop.
pub struct HsmLib {
    _library: Library,
    initialized: AtomicBool,
    pub(crate) C_Initialize: CK_C_Initialize,
    pub(crate) C_Finalize: CK_C_Finalize,
    pub(crate) C_GetInfo: CK_C_GetInfo,

    pub(crate) C_GetSlotList: CK_C_GetSlotList,
    pub(crate) C_GetTokenInfo: CK_C_GetTokenInfo,
    pub(crate) C_InitToken: CK_C_InitToken,

    pub(crate) C_OpenSession: CK_C_OpenSession,
    pub(crate) C_CloseSession: CK_C_CloseSession,

    pub(crate) C_Login: CK_C_Login,
    pub(crate) C_Logout: CK_C_Logout,

    pub(crate) C_GenerateKeyPair: CK_C_GenerateKeyPair,

    pub(crate) C_SignInit: CK_C_SignInit,
    pub(crate) C_Sign: CK_C_Sign,
    pub(crate) C_VerifyInit: CK_C_VerifyInit,
    pub(crate) C_Verify: CK_C_Verify,
}

impl HsmLib {
    /// Load the PKCS#11 library at `path` and resolve the functions used by the tester.
    /// # Errors
    /// * If the library cannot be loaded or one of the functions is missing
    pub fn instantiate<P>(path: P) -> HResult<Self>
    where
        P: AsRef<std::ffi::OsStr>,
    {
        debug!(
            "Loading PKCS#11 library: {}",
            path.as_ref().to_string_lossy()
        );
        #[allow(unsafe_code)]
        unsafe {
            let library = Library::new(path)?;
            Ok(Self {
                C_Initialize: Some(*library.get(b"C_Initialize")?),
                C_Finalize: Some(*library.get(b"C_Finalize")?),
                C_GetInfo: Some(*library.get(b"C_GetInfo")?),
                C_GetSlotList: Some(*library.get(b"C_GetSlotList")?),
                C_GetTokenInfo: Some(*library.get(b"C_GetTokenInfo")?),
                C_InitToken: Some(*library.get(b"C_InitToken")?),
                C_OpenSession: Some(*library.get(b"C_OpenSession")?),
                C_CloseSession: Some(*library.get(b"C_CloseSession")?),
                C_Login: Some(*library.get(b"C_Login")?),
                C_Logout: Some(*library.get(b"C_Logout")?),
                C_GenerateKeyPair: Some(*library.get(b"C_GenerateKeyPair")?),
                C_SignInit: Some(*library.get(b"C_SignInit")?),
                C_Sign: Some(*library.get(b"C_Sign")?),
                C_VerifyInit: Some(*library.get(b"C_VerifyInit")?),
                C_Verify: Some(*library.get(b"C_Verify")?),
                initialized: AtomicBool::new(false),
                // we need to keep the library alive
                _library: library,
            })
        }
    }

    pub(crate) fn c_initialize(&self) -> Pkcs11Result<()> {
        let mut init_args = CK_C_INITIALIZE_ARGS {
            CreateMutex: None,
            DestroyMutex: None,
            LockMutex: None,
            UnlockMutex: None,
            flags: CKF_OS_LOCKING_OK,
            pReserved: ptr::null_mut(),
        };
        hsm_call!(
            self,
            C_Initialize,
            (&raw mut init_args).cast::<std::ffi::c_void>()
        )?;
        self.initialized.store(true, Ordering::SeqCst);
        Ok(())
    }

    pub(crate) fn c_finalize(&self) -> Pkcs11Result<()> {
        // the library is considered finalized even if the call fails
        self.initialized.store(false, Ordering::SeqCst);
        hsm_call!(self, C_Finalize, ptr::null_mut())
    }

    /// Get the library information (`C_GetInfo`).
    /// The library must be initialized.
    pub fn get_info(&self) -> HResult<Info> {
        let mut info = CK_INFO::default();
        hsm_call!(self, C_GetInfo, &raw mut info)?;
        Ok(info.into())
    }
}

impl Drop for HsmLib {
    fn drop(&mut self) {
        if self.initialized.load(Ordering::SeqCst) {
            if let Err(rv) = self.c_finalize() {
                warn!("Failed to finalize the PKCS#11 library on drop: {rv}");
            }
        }
    }
}

pub struct Info {
    pub cryptokiVersion: (u8, u8),
    pub manufacturerID: String,
    pub flags: u64,
    pub libraryDescription: String,
    pub libraryVersion: (u8, u8),
}

impl From<CK_INFO> for Info {
    fn from(info: CK_INFO) -> Self {
        Self {
            cryptokiVersion: (info.cryptokiVersion.major, info.cryptokiVersion.minor),
            manufacturerID: padded_string(&info.manufacturerID),
            flags: u64::from(info.flags),
            libraryDescription: padded_string(&info.libraryDescription),
            libraryVersion: (info.libraryVersion.major, info.libraryVersion.minor),
        }
    }
}

impl Display for Info {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Cryptoki Version: {}.{}\nManufacturer ID: {}\nFlags: {}\nLibrary Description: \
             {}\nLibrary Version: {}.{}",
            self.cryptokiVersion.0,
            self.cryptokiVersion.1,
            self.manufacturerID,
            self.flags,
            self.libraryDescription,
            self.libraryVersion.0,
            self.libraryVersion.1
        )
    }
}
