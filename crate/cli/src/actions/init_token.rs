use std::sync::Arc;

use clap::Parser;
use jacarta_interfaces::Pkcs11Api;
use jacarta_tester::TesterConfig;
use zeroize::Zeroizing;

use super::{channel_tester, drive};
use crate::error::result::CliResult;

/// Initialize the token with the security officer PIN.
/// WARNING: all the objects stored on the token are destroyed.
#[derive(Parser)]
#[clap(verbatim_doc_comment)]
pub struct InitTokenAction {
    /// The security officer PIN
    #[clap(long, env = "JACARTA_SO_PIN", hide_env_values = true)]
    so_pin: String,
}

impl InitTokenAction {
    pub async fn process(&self, api: Arc<dyn Pkcs11Api>, config: TesterConfig) -> CliResult<()> {
        let so_pin = Zeroizing::new(self.so_pin.clone());
        let (tester, rx) = channel_tester(api, config);
        drive(tester, rx, move |tester| Ok(tester.init_token(so_pin)?)).await
    }
}
