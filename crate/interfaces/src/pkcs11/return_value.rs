use std::fmt::{self, Display, Formatter};

/// A PKCS#11 `CK_RV` status code.
///
/// Every call of the [`Pkcs11Api`](crate::Pkcs11Api) fails with the raw code returned by the
/// runtime; classification into remediation categories happens in the caller, at the point
/// of failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ReturnValue(pub u64);

impl ReturnValue {
    pub const OK: Self = Self(0x0000_0000);
    pub const CANCEL: Self = Self(0x0000_0001);
    pub const HOST_MEMORY: Self = Self(0x0000_0002);
    pub const SLOT_ID_INVALID: Self = Self(0x0000_0003);
    pub const GENERAL_ERROR: Self = Self(0x0000_0005);
    pub const FUNCTION_FAILED: Self = Self(0x0000_0006);
    pub const ARGUMENTS_BAD: Self = Self(0x0000_0007);
    pub const DEVICE_ERROR: Self = Self(0x0000_0030);
    pub const DEVICE_MEMORY: Self = Self(0x0000_0031);
    pub const DEVICE_REMOVED: Self = Self(0x0000_0032);
    pub const FUNCTION_NOT_SUPPORTED: Self = Self(0x0000_0054);
    pub const KEY_HANDLE_INVALID: Self = Self(0x0000_0060);
    pub const MECHANISM_INVALID: Self = Self(0x0000_0070);
    pub const OPERATION_ACTIVE: Self = Self(0x0000_0090);
    pub const OPERATION_NOT_INITIALIZED: Self = Self(0x0000_0091);
    pub const PIN_INCORRECT: Self = Self(0x0000_00A0);
    pub const PIN_LOCKED: Self = Self(0x0000_00A4);
    pub const SESSION_CLOSED: Self = Self(0x0000_00B0);
    pub const SESSION_HANDLE_INVALID: Self = Self(0x0000_00B3);
    pub const SIGNATURE_INVALID: Self = Self(0x0000_00C0);
    pub const SIGNATURE_LEN_RANGE: Self = Self(0x0000_00C1);
    pub const TEMPLATE_INCOMPLETE: Self = Self(0x0000_00D0);
    pub const TEMPLATE_INCONSISTENT: Self = Self(0x0000_00D1);
    pub const TOKEN_NOT_PRESENT: Self = Self(0x0000_00E0);
    pub const TOKEN_NOT_RECOGNIZED: Self = Self(0x0000_00E1);
    pub const USER_ALREADY_LOGGED_IN: Self = Self(0x0000_0100);
    pub const USER_NOT_LOGGED_IN: Self = Self(0x0000_0101);
    pub const USER_PIN_NOT_INITIALIZED: Self = Self(0x0000_0102);
    pub const BUFFER_TOO_SMALL: Self = Self(0x0000_0150);
    pub const CRYPTOKI_NOT_INITIALIZED: Self = Self(0x0000_0190);
    pub const CRYPTOKI_ALREADY_INITIALIZED: Self = Self(0x0000_0191);

    #[must_use]
    pub const fn is_ok(self) -> bool {
        self.0 == Self::OK.0
    }

    /// Convert a raw status into a `Result`, keeping the code on failure.
    pub const fn into_result(self) -> Result<(), Self> {
        if self.is_ok() { Ok(()) } else { Err(self) }
    }

    /// The `CKR_` name of the code, if it is a known one
    #[must_use]
    pub const fn name(self) -> Option<&'static str> {
        Some(match self {
            Self::OK => "CKR_OK",
            Self::CANCEL => "CKR_CANCEL",
            Self::HOST_MEMORY => "CKR_HOST_MEMORY",
            Self::SLOT_ID_INVALID => "CKR_SLOT_ID_INVALID",
            Self::GENERAL_ERROR => "CKR_GENERAL_ERROR",
            Self::FUNCTION_FAILED => "CKR_FUNCTION_FAILED",
            Self::ARGUMENTS_BAD => "CKR_ARGUMENTS_BAD",
            Self::DEVICE_ERROR => "CKR_DEVICE_ERROR",
            Self::DEVICE_MEMORY => "CKR_DEVICE_MEMORY",
            Self::DEVICE_REMOVED => "CKR_DEVICE_REMOVED",
            Self::FUNCTION_NOT_SUPPORTED => "CKR_FUNCTION_NOT_SUPPORTED",
            Self::KEY_HANDLE_INVALID => "CKR_KEY_HANDLE_INVALID",
            Self::MECHANISM_INVALID => "CKR_MECHANISM_INVALID",
            Self::OPERATION_ACTIVE => "CKR_OPERATION_ACTIVE",
            Self::OPERATION_NOT_INITIALIZED => "CKR_OPERATION_NOT_INITIALIZED",
            Self::PIN_INCORRECT => "CKR_PIN_INCORRECT",
            Self::PIN_LOCKED => "CKR_PIN_LOCKED",
            Self::SESSION_CLOSED => "CKR_SESSION_CLOSED",
            Self::SESSION_HANDLE_INVALID => "CKR_SESSION_HANDLE_INVALID",
            Self::SIGNATURE_INVALID => "CKR_SIGNATURE_INVALID",
            Self::SIGNATURE_LEN_RANGE => "CKR_SIGNATURE_LEN_RANGE",
            Self::TEMPLATE_INCOMPLETE => "CKR_TEMPLATE_INCOMPLETE",
            Self::TEMPLATE_INCONSISTENT => "CKR_TEMPLATE_INCONSISTENT",
            Self::TOKEN_NOT_PRESENT => "CKR_TOKEN_NOT_PRESENT",
            Self::TOKEN_NOT_RECOGNIZED => "CKR_TOKEN_NOT_RECOGNIZED",
            Self::USER_ALREADY_LOGGED_IN => "CKR_USER_ALREADY_LOGGED_IN",
            Self::USER_NOT_LOGGED_IN => "CKR_USER_NOT_LOGGED_IN",
            Self::USER_PIN_NOT_INITIALIZED => "CKR_USER_PIN_NOT_INITIALIZED",
            Self::BUFFER_TOO_SMALL => "CKR_BUFFER_TOO_SMALL",
            Self::CRYPTOKI_NOT_INITIALIZED => "CKR_CRYPTOKI_NOT_INITIALIZED",
            Self::CRYPTOKI_ALREADY_INITIALIZED => "CKR_CRYPTOKI_ALREADY_INITIALIZED",
            _ => return None,
        })
    }
}

impl Display for ReturnValue {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self.name() {
            Some(name) => write!(f, "{name} (0x{:08X})", self.0),
            None => write!(f, "0x{:08X}", self.0),
        }
    }
}

impl std::error::Error for ReturnValue {}

impl From<u64> for ReturnValue {
    fn from(rv: u64) -> Self {
        Self(rv)
    }
}
