use std::sync::Arc;

use clap::Parser;
use jacarta_interfaces::Pkcs11Api;
use jacarta_tester::TesterConfig;

use super::{channel_tester, drive};
use crate::error::result::CliResult;

/// Run the test sequence on the token: log in, generate a GOST key pair,
/// then sign and verify a payload
#[derive(Parser, Debug, Default)]
#[clap(verbatim_doc_comment)]
pub struct RunAction {}

impl RunAction {
    pub async fn process(&self, api: Arc<dyn Pkcs11Api>, config: TesterConfig) -> CliResult<()> {
        let (tester, rx) = channel_tester(api, config);
        drive(tester, rx, |tester| Ok(tester.on_device_ready()?)).await
    }
}
