//! Command-line interface.
//!
//! # Usage
//!
//! ```bash
//! # Store a value in localStorage
//! webstorage set theme dark
//!
//! # Read it back from sessionStorage
//! webstorage --area session get theme
//!
//! # Enumerate keys
//! webstorage keys
//! ```

use clap::{Parser, Subcommand};

use crate::domain::StorageArea;
use crate::error::StorageResult;
use crate::facade::StorageFacade;

/// Web Storage command line.
#[derive(Debug, Parser)]
#[command(name = "webstorage", version)]
#[command(about = "Read and modify Web Storage areas", long_about = None)]
pub struct Cli {
    /// Storage area to operate on (`local` or `session`)
    #[arg(long, short, default_value = "local")]
    pub area: StorageArea,

    #[command(subcommand)]
    pub command: Command,
}

/// Storage operations.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Print the value stored under a key
    Get {
        /// Key to read
        key: String,
    },
    /// Store a value
    Set {
        /// Key to store
        key: String,
        /// Value to store
        value: String,
    },
    /// Remove a key
    Remove {
        /// Key to remove
        key: String,
    },
    /// Remove every entry in the area
    Clear,
    /// Print the number of entries
    Length,
    /// Print the key at an index
    Key {
        /// Ordinal position
        #[arg(allow_negative_numbers = true)]
        index: i64,
    },
    /// Print every key and value
    Keys,
}

/// Run `command` against `facade`, returning the lines to print.
///
/// # Errors
///
/// Returns the storage error of a failed mutation.
pub fn execute(
    facade: &StorageFacade,
    area: StorageArea,
    command: &Command,
) -> StorageResult<Vec<String>> {
    let output = match command {
        Command::Get { key } => {
            vec![facade.get(area, key).unwrap_or_else(|| "(null)".to_string())]
        }
        Command::Set { key, value } => {
            facade.set(area, key, value)?;
            Vec::new()
        }
        Command::Remove { key } => {
            facade.remove(area, key)?;
            Vec::new()
        }
        Command::Clear => {
            facade.clear(area)?;
            Vec::new()
        }
        Command::Length => vec![facade.length(area).to_string()],
        Command::Key { index } => {
            vec![facade.key(area, *index).unwrap_or_else(|| "(null)".to_string())]
        }
        Command::Keys => facade
            .area(area)
            .map(|handle| {
                handle
                    .entries()
                    .into_iter()
                    .map(|(key, value)| format!("{key}={value}"))
                    .collect()
            })
            .unwrap_or_default(),
    };

    Ok(output)
}
