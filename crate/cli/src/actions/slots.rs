use std::sync::Arc;

use clap::Parser;
use jacarta_base_hsm::HsmLib;
use jacarta_interfaces::{Pkcs11Api, ReturnValue, SlotId, TokenInfo};
use jacarta_logger::warn;
use jacarta_tester::TokenDirectory;

use crate::{
    cli_error,
    error::{CliError, result::CliResult},
};

/// List the slots with a token, with the token label, model and serial number
#[derive(Parser, Debug, Default)]
pub struct SlotsAction {}

impl SlotsAction {
    pub async fn process(&self, hsm: Arc<HsmLib>) -> CliResult<()> {
        tokio::task::spawn_blocking(move || list_slots(&hsm))
            .await
            .map_err(|e| cli_error!(e))?
    }
}

fn list_slots(hsm: &HsmLib) -> CliResult<()> {
    match hsm.initialize() {
        Ok(()) | Err(ReturnValue::CRYPTOKI_ALREADY_INITIALIZED) => {}
        Err(rv) => return Err(rv.into()),
    }
    let listed = list_tokens(hsm);
    if let Err(rv) = hsm.finalize() {
        warn!("C_Finalize failed: {rv}");
    }
    for (slot, info) in listed? {
        println!("Slot {slot}\n{info}\n");
    }
    Ok(())
}

fn list_tokens(hsm: &HsmLib) -> CliResult<Vec<(SlotId, TokenInfo)>> {
    let info = hsm.get_info()?;
    println!("{info}\n");
    TokenDirectory::new(hsm)
        .list_tokens()
        .map_err(CliError::from)
}
