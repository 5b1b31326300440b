//! PKCS#11 capability interface.
//!
//! This is the subset of the Cryptoki API that the token tester drives. Any PKCS#11 binding
//! can implement it: a dynamically loaded vendor library, a software token used in tests,
//! etc. Calls are blocking and are expected to be issued from a single thread at a time
//! for a given session.

use crate::{
    Attribute, Mechanism, PrivateKeyHandle, PublicKeyHandle, ReturnValue, SessionFlags,
    SessionHandle, SlotId, TokenInfo, UserType,
};

pub type Pkcs11Result<T> = Result<T, ReturnValue>;

/// PKCS#11 trait
/// Each method maps to one (or, for two-pass calls, two) `C_` functions and fails with
/// the raw `CK_RV` returned by the runtime.
pub trait Pkcs11Api: Send + Sync {
    /// `C_Initialize` with OS locking
    fn initialize(&self) -> Pkcs11Result<()>;

    /// `C_Finalize`
    fn finalize(&self) -> Pkcs11Result<()>;

    /// `C_GetSlotList`
    ///
    /// The slots are returned in the order given by the runtime.
    /// # Arguments
    /// * `token_present` - only list slots with a token inserted
    fn list_slots(&self, token_present: bool) -> Pkcs11Result<Vec<SlotId>>;

    /// `C_GetTokenInfo`
    fn get_token_info(&self, slot_id: SlotId) -> Pkcs11Result<TokenInfo>;

    /// `C_InitToken`
    /// # Arguments
    /// * `slot_id` - the slot holding the token
    /// * `so_pin` - the security officer PIN
    /// * `label` - the token label, at most 32 bytes
    fn init_token(&self, slot_id: SlotId, so_pin: &str, label: &str) -> Pkcs11Result<()>;

    /// `C_OpenSession` without notification callback
    fn open_session(&self, slot_id: SlotId, flags: SessionFlags) -> Pkcs11Result<SessionHandle>;

    /// `C_Login`
    fn login(&self, session: SessionHandle, user_type: UserType, pin: &str) -> Pkcs11Result<()>;

    /// `C_Logout`
    fn logout(&self, session: SessionHandle) -> Pkcs11Result<()>;

    /// `C_CloseSession`
    fn close_session(&self, session: SessionHandle) -> Pkcs11Result<()>;

    /// `C_GenerateKeyPair`
    /// # Arguments
    /// * `session` - an authenticated session
    /// * `mechanism` - the key pair generation mechanism
    /// * `public_key_template` - attributes of the public key
    /// * `private_key_template` - attributes of the private key
    /// # Returns
    /// * the public and private key handles, in that order
    fn generate_key_pair(
        &self,
        session: SessionHandle,
        mechanism: &Mechanism,
        public_key_template: &[Attribute],
        private_key_template: &[Attribute],
    ) -> Pkcs11Result<(PublicKeyHandle, PrivateKeyHandle)>;

    /// `C_SignInit`
    fn sign_init(
        &self,
        session: SessionHandle,
        mechanism: &Mechanism,
        key: PrivateKeyHandle,
    ) -> Pkcs11Result<()>;

    /// `C_Sign` into a caller provided buffer.
    ///
    /// # Returns
    /// * the number of bytes written to `signature`. If the buffer is too small,
    ///   the call fails with `CKR_BUFFER_TOO_SMALL`.
    fn sign(
        &self,
        session: SessionHandle,
        data: &[u8],
        signature: &mut [u8],
    ) -> Pkcs11Result<usize>;

    /// `C_VerifyInit`
    fn verify_init(
        &self,
        session: SessionHandle,
        mechanism: &Mechanism,
        key: PublicKeyHandle,
    ) -> Pkcs11Result<()>;

    /// `C_Verify`
    ///
    /// An invalid signature fails with `CKR_SIGNATURE_INVALID` or
    /// `CKR_SIGNATURE_LEN_RANGE`.
    fn verify(&self, session: SessionHandle, data: &[u8], signature: &[u8]) -> Pkcs11Result<()>;
}
