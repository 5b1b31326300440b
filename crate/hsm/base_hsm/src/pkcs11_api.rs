use std::ptr;

use jacarta_interfaces::{
    Attribute, Mechanism, ObjectHandle, Pkcs11Api, Pkcs11Result, PrivateKeyHandle,
    PublicKeyHandle, ReturnValue, SessionFlags, SessionHandle, SlotId, TokenInfo, UserType,
};
use jacarta_logger::debug;
use pkcs11_sys::{
    CK_FLAGS, CK_OBJECT_HANDLE, CK_SESSION_HANDLE, CK_SLOT_ID, CK_ULONG, CK_USER_TYPE,
};
use zeroize::Zeroizing;

use crate::{
    HsmLib, hsm_call,
    session::{NativeTemplate, ck_mechanism},
    slots::padded_label,
};

const fn ck_session(session: SessionHandle) -> CK_SESSION_HANDLE {
    session.0 as CK_SESSION_HANDLE
}

impl Pkcs11Api for HsmLib {
    fn initialize(&self) -> Pkcs11Result<()> {
        self.c_initialize()
    }

    fn finalize(&self) -> Pkcs11Result<()> {
        self.c_finalize()
    }

    fn list_slots(&self, token_present: bool) -> Pkcs11Result<Vec<SlotId>> {
        self.slot_list(token_present)
    }

    fn get_token_info(&self, slot_id: SlotId) -> Pkcs11Result<TokenInfo> {
        self.token_info(slot_id)
    }

    fn init_token(&self, slot_id: SlotId, so_pin: &str, label: &str) -> Pkcs11Result<()> {
        let mut label = padded_label(label)?;
        let mut pin = Zeroizing::new(so_pin.as_bytes().to_vec());
        hsm_call!(
            self,
            C_InitToken,
            slot_id.0 as CK_SLOT_ID,
            pin.as_mut_ptr(),
            pin.len() as CK_ULONG,
            label.as_mut_ptr()
        )
    }

    fn open_session(&self, slot_id: SlotId, flags: SessionFlags) -> Pkcs11Result<SessionHandle> {
        let mut session_handle: CK_SESSION_HANDLE = 0;
        hsm_call!(
            self,
            C_OpenSession,
            slot_id.0 as CK_SLOT_ID,
            flags.bits() as CK_FLAGS,
            ptr::null_mut(),
            None,
            &raw mut session_handle
        )?;
        debug!("Opened session {session_handle} on slot {slot_id}");
        Ok(SessionHandle(u64::from(session_handle)))
    }

    fn login(&self, session: SessionHandle, user_type: UserType, pin: &str) -> Pkcs11Result<()> {
        let mut pin = Zeroizing::new(pin.as_bytes().to_vec());
        hsm_call!(
            self,
            C_Login,
            ck_session(session),
            user_type.as_raw() as CK_USER_TYPE,
            pin.as_mut_ptr(),
            pin.len() as CK_ULONG
        )
    }

    fn logout(&self, session: SessionHandle) -> Pkcs11Result<()> {
        hsm_call!(self, C_Logout, ck_session(session))
    }

    fn close_session(&self, session: SessionHandle) -> Pkcs11Result<()> {
        hsm_call!(self, C_CloseSession, ck_session(session))
    }

    fn generate_key_pair(
        &self,
        session: SessionHandle,
        mechanism: &Mechanism,
        public_key_template: &[Attribute],
        private_key_template: &[Attribute],
    ) -> Pkcs11Result<(PublicKeyHandle, PrivateKeyHandle)> {
        let mut native_mechanism = ck_mechanism(mechanism);
        let mut pub_template = NativeTemplate::new(public_key_template);
        let mut pub_attributes = pub_template.attributes();
        let mut priv_template = NativeTemplate::new(private_key_template);
        let mut priv_attributes = priv_template.attributes();

        let mut pub_key_handle = CK_OBJECT_HANDLE::default();
        let mut priv_key_handle = CK_OBJECT_HANDLE::default();
        hsm_call!(
            self,
            C_GenerateKeyPair,
            ck_session(session),
            &raw mut native_mechanism,
            pub_attributes.as_mut_ptr(),
            pub_attributes.len() as CK_ULONG,
            priv_attributes.as_mut_ptr(),
            priv_attributes.len() as CK_ULONG,
            &raw mut pub_key_handle,
            &raw mut priv_key_handle
        )?;
        Ok((
            PublicKeyHandle(ObjectHandle(u64::from(pub_key_handle))),
            PrivateKeyHandle::new(ObjectHandle(u64::from(priv_key_handle))),
        ))
    }

    fn sign_init(
        &self,
        session: SessionHandle,
        mechanism: &Mechanism,
        key: PrivateKeyHandle,
    ) -> Pkcs11Result<()> {
        let mut native_mechanism = ck_mechanism(mechanism);
        hsm_call!(
            self,
            C_SignInit,
            ck_session(session),
            &raw mut native_mechanism,
            key.as_raw() as CK_OBJECT_HANDLE
        )
    }

    fn sign(
        &self,
        session: SessionHandle,
        data: &[u8],
        signature: &mut [u8],
    ) -> Pkcs11Result<usize> {
        let mut signature_len = signature.len() as CK_ULONG;
        hsm_call!(
            self,
            C_Sign,
            ck_session(session),
            data.as_ptr().cast_mut(),
            data.len() as CK_ULONG,
            signature.as_mut_ptr(),
            &raw mut signature_len
        )?;
        usize::try_from(signature_len).map_err(|_| ReturnValue::GENERAL_ERROR)
    }

    fn verify_init(
        &self,
        session: SessionHandle,
        mechanism: &Mechanism,
        key: PublicKeyHandle,
    ) -> Pkcs11Result<()> {
        let mut native_mechanism = ck_mechanism(mechanism);
        hsm_call!(
            self,
            C_VerifyInit,
            ck_session(session),
            &raw mut native_mechanism,
            key.as_raw() as CK_OBJECT_HANDLE
        )
    }

    fn verify(&self, session: SessionHandle, data: &[u8], signature: &[u8]) -> Pkcs11Result<()> {
        hsm_call!(
            self,
            C_Verify,
            ck_session(session),
            data.as_ptr().cast_mut(),
            data.len() as CK_ULONG,
            signature.as_ptr().cast_mut(),
            signature.len() as CK_ULONG
        )
    }
}
