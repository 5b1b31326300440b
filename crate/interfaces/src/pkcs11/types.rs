use std::fmt::{self, Debug, Display, Formatter};

use bitflags::bitflags;

/// Identifier of a card reader slot, as handed out by the PKCS#11 runtime
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SlotId(pub u64);

impl Display for SlotId {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Opaque session handle returned by `C_OpenSession`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SessionHandle(pub u64);

impl Display for SessionHandle {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Raw PKCS#11 object handle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObjectHandle(pub u64);

/// Handle of a public key object living on the token
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PublicKeyHandle(pub ObjectHandle);

impl PublicKeyHandle {
    #[must_use]
    pub const fn as_raw(&self) -> u64 {
        self.0.0
    }
}

/// Handle of a private key object living on the token.
///
/// The handle value is not reachable through `Debug` or a public field.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct PrivateKeyHandle(ObjectHandle);

impl PrivateKeyHandle {
    #[must_use]
    pub const fn new(handle: ObjectHandle) -> Self {
        Self(handle)
    }

    /// The raw handle, to be passed to the runtime only. Do not log it.
    #[must_use]
    pub const fn as_raw(&self) -> u64 {
        self.0.0
    }
}

impl Debug for PrivateKeyHandle {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str("PrivateKeyHandle(<redacted>)")
    }
}

/// `CKU_` user types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserType {
    User,
}

impl UserType {
    #[must_use]
    pub const fn as_raw(self) -> u64 {
        match self {
            Self::User => 1,
        }
    }
}

bitflags! {
    /// `CKF_` flags accepted by `C_OpenSession`
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct SessionFlags: u64 {
        const RW_SESSION = 0x0000_0002;
        const SERIAL_SESSION = 0x0000_0004;
    }
}

bitflags! {
    /// `CKF_` flags found in `CK_TOKEN_INFO`
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct TokenFlags: u64 {
        const RNG = 0x0000_0001;
        const WRITE_PROTECTED = 0x0000_0002;
        const LOGIN_REQUIRED = 0x0000_0004;
        const USER_PIN_INITIALIZED = 0x0000_0008;
        const TOKEN_INITIALIZED = 0x0000_0400;
        const USER_PIN_COUNT_LOW = 0x0001_0000;
        const USER_PIN_FINAL_TRY = 0x0002_0000;
        const USER_PIN_LOCKED = 0x0004_0000;
        const SO_PIN_LOCKED = 0x0040_0000;
    }
}

/// The subset of `CK_TOKEN_INFO` used to identify a token.
///
/// PKCS#11 pads these fields with blanks; implementations of the
/// [`Pkcs11Api`](crate::Pkcs11Api) must return them trimmed.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TokenInfo {
    pub label: String,
    pub manufacturer_id: String,
    pub model: String,
    pub serial_number: String,
    pub flags: TokenFlags,
}

impl Display for TokenInfo {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Label: {}\nManufacturer ID: {}\nModel: {}\nSerial Number: {}\nFlags: {:?}",
            self.label, self.manufacturer_id, self.model, self.serial_number, self.flags
        )
    }
}
