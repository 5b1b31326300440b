use std::{fs, path::PathBuf};

use clap::Args;
use jacarta_base_hsm::test_helpers::JACARTA_PKCS11_LIB;
use jacarta_tester::{Plaintext, TesterConfig};
use zeroize::Zeroizing;

use crate::error::result::{CliResult, CliResultHelper};

/// Environment variable pointing to the TOML configuration file
pub const JACARTA_CONF_ENV: &str = "JACARTA_CONF";

/// Where the token is found and how to talk to it.
///
/// Values given on the command line (or through their environment variables) override
/// those of the TOML configuration file.
#[derive(Args, Clone, Default)]
pub struct TokenConfig {
    /// The PKCS#11 library of the token vendor
    #[clap(long, env = "JACARTA_PKCS11_LIB", default_value = JACARTA_PKCS11_LIB, global = true)]
    pub pkcs11_lib: String,

    /// Configuration file location
    ///
    /// An empty or missing file yields the JaCarta GOST 2.0 defaults.
    #[clap(short, long, env = JACARTA_CONF_ENV, global = true)]
    pub conf: Option<PathBuf>,

    /// The substring the token model must contain (default: `JaCarta GOST 2.0`)
    #[clap(long, global = true)]
    pub model: Option<String>,

    /// The user PIN
    #[clap(long, env = "JACARTA_USER_PIN", hide_env_values = true, global = true)]
    pub user_pin: Option<String>,

    /// A hex encoded 128 byte payload to sign instead of random data
    #[clap(long, global = true)]
    pub payload: Option<String>,
}

impl std::fmt::Debug for TokenConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenConfig")
            .field("pkcs11_lib", &self.pkcs11_lib)
            .field("conf", &self.conf)
            .field("model", &self.model)
            .field("user_pin", &self.user_pin.as_ref().map(|_| "****"))
            .field("payload", &self.payload)
            .finish()
    }
}

impl TokenConfig {
    /// Load the configuration file, if any, and apply the command line overrides
    pub fn tester_config(&self) -> CliResult<TesterConfig> {
        let mut config = match &self.conf {
            Some(path) => {
                let content = fs::read_to_string(path).with_context(|| {
                    format!("cannot read the configuration file {}", path.display())
                })?;
                toml::from_str(&content)?
            }
            None => TesterConfig::default(),
        };
        if let Some(model) = &self.model {
            config.model.clone_from(model);
        }
        if let Some(pin) = &self.user_pin {
            config.user_pin = Zeroizing::new(pin.clone());
        }
        if let Some(payload) = &self.payload {
            config.payload = Some(Plaintext::try_from(payload.clone())?);
        }
        Ok(config)
    }
}
