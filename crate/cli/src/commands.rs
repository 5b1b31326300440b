use std::sync::Arc;

use clap::{Parser, Subcommand};
use jacarta_base_hsm::HsmLib;
use jacarta_logger::{info, log_init, trace};

use crate::{
    actions::{init_token::InitTokenAction, run::RunAction, slots::SlotsAction},
    config::{LoggingConfig, TokenConfig},
    error::result::{CliResult, CliResultHelper},
};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: CliCommands,

    #[clap(flatten)]
    pub token: TokenConfig,

    #[clap(flatten)]
    pub logging: LoggingConfig,
}

#[derive(Subcommand)]
pub enum CliCommands {
    Run(RunAction),
    Slots(SlotsAction),
    InitToken(InitTokenAction),
}

/// Main function of the `jacarta` CLI.
///
/// Initializes logging, loads the PKCS#11 library and the configuration, then runs the
/// requested command.
///
/// # Errors
///
/// This function will return an error if:
/// - The configuration file cannot be read or is malformed.
/// - The PKCS#11 library cannot be loaded.
/// - The command fails, including a test run ending in failure.
pub async fn jacarta_main() -> CliResult<()> {
    let cli = Cli::parse();
    log_init(cli.logging.rust_log.as_deref());
    info!("Starting the JaCarta token tester");
    trace!("Command line configuration: {:?}", cli.token);

    let hsm = Arc::new(
        HsmLib::instantiate(&cli.token.pkcs11_lib)
            .with_context(|| format!("cannot load the PKCS#11 library {}", cli.token.pkcs11_lib))?,
    );

    match cli.command {
        CliCommands::Slots(action) => action.process(hsm).await,
        CliCommands::Run(action) => {
            let config = cli.token.tester_config()?;
            trace!("Configuration: {config:?}");
            action.process(hsm, config).await
        }
        CliCommands::InitToken(action) => {
            let config = cli.token.tester_config()?;
            action.process(hsm, config).await
        }
    }
}
