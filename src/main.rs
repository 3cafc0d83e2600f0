//! Web Storage command line entry point.
//!
//! Loads configuration, builds the storage facade and runs one operation
//! against the selected area.

use webstorage_shim::run;

fn main() -> anyhow::Result<()> {
    run()
}
