//! Settings are read from a TOML file; see `bin/settings_demo.rs` for a walkthrough.

mod cli;
pub use clap::Parser;
pub use cli::*;

mod settings;
pub use settings::*;
