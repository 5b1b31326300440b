//! These tests require a JaCarta GOST 2.0 token and the vendor PKCS#11 library;
//! they are gated behind the `jacarta` feature.
//! To run them, cd into the crate directory and run (replace the password):
//! ```sh
//! HSM_USER_PASSWORD=12345678 \
//! JACARTA_PKCS11_LIB=/usr/lib/libjcPKCS11-2.so \
//! cargo test --features jacarta -- --ignored
//! ```
use jacarta_interfaces::{
    Attribute, Mechanism, Pkcs11Api, ReturnValue, SessionFlags, SlotId, UserType,
    attribute::{
        CKK_GOSTR3410, CKO_PRIVATE_KEY, CKO_PUBLIC_KEY, GOSTR3410_CRYPTOPRO_A_PARAMS,
        GOSTR3411_2012_256_PARAMS,
    },
    mechanism::{CKM_GOSTR3410_KEY_PAIR_GEN, CKM_GOSTR3410_WITH_GOSTR3411_12_256},
};
use jacarta_logger::{info, log_init};
use rand::RngCore;

use crate::{
    HResult, HsmLib,
    test_helpers::{get_hsm_password, get_lib_path},
};

const MODEL: &str = "JaCarta GOST 2.0";

fn find_gost_slot(hsm: &HsmLib) -> HResult<SlotId> {
    for slot in hsm.list_slots(true)? {
        let info = hsm.get_token_info(slot)?;
        info!("Slot {slot}:\n{info}");
        if info.model.contains(MODEL) {
            return Ok(slot);
        }
    }
    Err(crate::HError::Default(format!("no {MODEL} token found")))
}

fn templates() -> (Vec<Attribute>, Vec<Attribute>) {
    let public = vec![
        Attribute::Class(CKO_PUBLIC_KEY),
        Attribute::KeyType(CKK_GOSTR3410),
        Attribute::Token(false),
        Attribute::Verify(true),
        Attribute::Gostr3410Params(GOSTR3410_CRYPTOPRO_A_PARAMS.to_vec()),
        Attribute::Gostr3411Params(GOSTR3411_2012_256_PARAMS.to_vec()),
    ];
    let private = vec![
        Attribute::Class(CKO_PRIVATE_KEY),
        Attribute::KeyType(CKK_GOSTR3410),
        Attribute::Token(false),
        Attribute::Private(true),
        Attribute::Sign(true),
        Attribute::Gostr3410Params(GOSTR3410_CRYPTOPRO_A_PARAMS.to_vec()),
        Attribute::Gostr3411Params(GOSTR3411_2012_256_PARAMS.to_vec()),
    ];
    (public, private)
}

#[test]
#[ignore = "Requires a JaCarta GOST 2.0 token and the vendor PKCS#11 library"]
fn test_jacarta_list_tokens() -> HResult<()> {
    log_init(None);
    let hsm = HsmLib::instantiate(get_lib_path())?;
    hsm.initialize()?;
    let info = hsm.get_info()?;
    info!("Connected to the library:\n{info}");
    let slot = find_gost_slot(&hsm)?;
    info!("{MODEL} found in slot {slot}");
    hsm.finalize()?;
    Ok(())
}

#[test]
#[ignore = "Requires a JaCarta GOST 2.0 token and the vendor PKCS#11 library"]
fn test_jacarta_sign_verify() -> HResult<()> {
    log_init(None);
    let password = get_hsm_password()?;
    let hsm = HsmLib::instantiate(get_lib_path())?;
    hsm.initialize()?;
    let slot = find_gost_slot(&hsm)?;

    let session =
        hsm.open_session(slot, SessionFlags::RW_SESSION | SessionFlags::SERIAL_SESSION)?;
    hsm.login(session, UserType::User, &password)?;

    let (public, private) = templates();
    let (pk, sk) = hsm.generate_key_pair(
        session,
        &Mechanism::new(CKM_GOSTR3410_KEY_PAIR_GEN),
        &public,
        &private,
    )?;

    let mut data = [0_u8; 128];
    rand::rng().fill_bytes(&mut data);
    let mechanism = Mechanism::new(CKM_GOSTR3410_WITH_GOSTR3411_12_256);

    hsm.sign_init(session, &mechanism, sk)?;
    let mut signature = [0_u8; 64];
    let len = hsm.sign(session, &data, &mut signature)?;
    assert_eq!(len, 64);

    hsm.verify_init(session, &mechanism, pk)?;
    hsm.verify(session, &data, &signature)?;

    data[0] ^= 0x01;
    hsm.verify_init(session, &mechanism, pk)?;
    assert_eq!(
        hsm.verify(session, &data, &signature),
        Err(ReturnValue::SIGNATURE_INVALID)
    );

    hsm.logout(session)?;
    hsm.close_session(session)?;
    hsm.finalize()?;
    Ok(())
}
