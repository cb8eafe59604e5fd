//! `seisclean config` subcommands.
//!
//! These read and write the INI settings file only; the store is never
//! opened, so they work before a store path is valid.

use clap::Subcommand;
use seisclean::config::{config_file_path, ConfigFile, ConfigKey};

use crate::error::CliError;

/// Config subcommands.
#[derive(Debug, Subcommand)]
pub enum ConfigCommands {
    /// Print one setting
    Get {
        /// Setting name as section.key (e.g. backup.retention)
        key: String,
    },

    /// Change one setting and save the file
    Set {
        /// Setting name as section.key (e.g. logging.level)
        key: String,

        /// New value; an empty string clears optional settings
        value: String,
    },

    /// Print every setting grouped by section
    List,

    /// Print where the settings file lives
    Path,
}

/// Run a config subcommand.
pub fn run(command: ConfigCommands) -> Result<(), CliError> {
    match command {
        ConfigCommands::Get { key } => {
            let key = lookup_key(&key)?;
            let value = key.get(&ConfigFile::load()?);
            println!("{}", display_value(&value));
        }
        ConfigCommands::Set { key, value } => {
            let key = lookup_key(&key)?;
            let mut settings = ConfigFile::load()?;
            let previous = key.get(&settings);
            key.set(&mut settings, &value)?;
            settings.save()?;
            println!(
                "{}: {} -> {}",
                key.name(),
                display_value(&previous),
                display_value(&key.get(&settings))
            );
        }
        ConfigCommands::List => {
            let settings = ConfigFile::load()?;
            let width = ConfigKey::all()
                .iter()
                .map(|k| k.name().len())
                .max()
                .unwrap_or(0);
            for key in ConfigKey::all() {
                println!(
                    "{:<width$}  {}",
                    key.name(),
                    display_value(&key.get(&settings)),
                    width = width
                );
            }
        }
        ConfigCommands::Path => println!("{}", config_file_path().display()),
    }
    Ok(())
}

fn lookup_key(name: &str) -> Result<ConfigKey, CliError> {
    name.parse::<ConfigKey>().map_err(|_| {
        CliError::Config(format!(
            "no setting named '{}' (see 'seisclean config list')",
            name
        ))
    })
}

fn display_value(value: &str) -> &str {
    if value.is_empty() {
        "(unset)"
    } else {
        value
    }
}
