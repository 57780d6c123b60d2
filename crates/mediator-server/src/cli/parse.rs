// crates/mediator-server/src/cli/parse.rs

use super::read_input;
use anyhow::Result;
use mediator::parser::parse_micro_tag_response;
use std::path::PathBuf;

/// Parse raw model output and print the ParsedResponse JSON
pub fn run_parse(file: Option<PathBuf>) -> Result<()> {
    let raw = read_input(file.as_deref())?;
    let parsed = parse_micro_tag_response(&raw);
    println!("{}", serde_json::to_string_pretty(&parsed)?);
    Ok(())
}
