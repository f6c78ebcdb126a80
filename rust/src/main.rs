//! Seals `tools/config.json` into `assets/encrypted_config.json` and
//! `lib/config/encrypted_config.dart`, relative to the working directory.

use config_sealer::config::ToolConfig;
use config_sealer::crypto::EncryptionKey;
use config_sealer::logging;
use config_sealer::pipeline::{self, PipelineError};

fn main() -> Result<(), PipelineError> {
    logging::init();

    let config = ToolConfig::default();
    let key = EncryptionKey::embedded();
    pipeline::run(&config, &key)?;

    Ok(())
}
