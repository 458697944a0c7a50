//! Output formatting for CLI

use clap::ValueEnum;
use serde::Serialize;

use crate::error::CliResult;

#[derive(Debug, Clone, Copy, ValueEnum, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// One line per item
    #[default]
    Text,
    /// Pretty-printed JSON
    Json,
}

pub fn print_json<T: Serialize>(value: &T) -> CliResult<()> {
    let rendered = serde_json::to_string_pretty(value)?;
    println!("{}", rendered);
    Ok(())
}
