//! Config command - get and set configuration values

use crate::cli::ConfigCommands;
use crate::config::MailmatchConfig;
use crate::MailmatchError;

type Result<T> = std::result::Result<T, MailmatchError>;

/// Execute a configuration command
///
/// # Errors
///
/// Returns `MailmatchError` if the configuration key is invalid, value parsing fails,
/// or configuration save fails.
pub fn execute(mut config: MailmatchConfig, command: &ConfigCommands, quiet: bool) -> Result<()> {
    match command {
        ConfigCommands::Set { setting } => {
            let Some((key, value)) = setting.split_once('=') else {
                return Err(MailmatchError::InvalidInput(
                    "Invalid format. Use: mailmatch config set key=value".into(),
                ));
            };
            let key = key.trim();

            config.set_value(key, value)?;
            config.save()?;
            if !quiet {
                println!("Set {key} = {}", config.get_value(key)?);
            }
        }
        ConfigCommands::Get { key } => {
            println!("{}", config.get_value(key.trim())?);
        }
    }
    Ok(())
}
