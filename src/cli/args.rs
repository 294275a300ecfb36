//! Command-line argument definitions

use std::path::PathBuf;

use clap::Args;
use serde_json::Value;

/// Arguments for the import command
#[derive(Args, Debug)]
pub struct ImportArgs {
    /// Local file to import
    pub path: PathBuf,

    /// Import into the background music store instead of uploads
    #[arg(long)]
    pub music: bool,
}

/// Out-of-band values injected into every step
#[derive(Args, Debug, Clone, Default)]
pub struct ContextArgs {
    /// Original upload filename
    #[arg(long)]
    pub filename: Option<String>,

    /// Background music file id
    #[arg(long)]
    pub music_file_id: Option<String>,

    /// Background music filename
    #[arg(long)]
    pub music_filename: Option<String>,
}

/// Arguments for the edit command
#[derive(Args, Debug)]
pub struct EditArgs {
    /// Uploaded file id
    #[arg(long)]
    pub file_id: String,

    /// What to do with the video, in plain language
    #[arg(short, long)]
    pub instruction: String,

    #[command(flatten)]
    pub context: ContextArgs,

    /// Style preference passed to the planner
    #[arg(long)]
    pub style: Option<String>,

    /// Output format passed to the planner
    #[arg(long)]
    pub format: Option<String>,
}

/// Arguments for the run command
#[derive(Args, Debug)]
pub struct RunArgs {
    /// Step name (remove_duplicates, add_captions, add_music, add_broll)
    pub step: String,

    /// Uploaded file id
    #[arg(long)]
    pub file_id: String,

    #[command(flatten)]
    pub context: ContextArgs,

    /// Step argument as key=value (value parsed as JSON when possible)
    #[arg(long = "arg", value_parser = parse_key_value)]
    pub args: Vec<(String, Value)>,
}

/// Arguments for the plan command
#[derive(Args, Debug)]
pub struct PlanArgs {
    /// Uploaded file id
    #[arg(long)]
    pub file_id: String,

    /// Comma-separated step names, run in order
    #[arg(long, value_delimiter = ',', required_unless_present = "plan_file")]
    pub steps: Vec<String>,

    /// JSON file holding an array of {"name", "args"} steps
    #[arg(long, conflicts_with = "steps")]
    pub plan_file: Option<PathBuf>,

    #[command(flatten)]
    pub context: ContextArgs,
}

/// Arguments for the status command
#[derive(Args, Debug)]
pub struct StatusArgs {
    /// Only this file id
    #[arg(long)]
    pub file_id: Option<String>,
}

/// Parse `key=value`; the value is JSON if it parses, otherwise a string
pub fn parse_key_value(raw: &str) -> Result<(String, Value), String> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected key=value, got '{}'", raw))?;
    let key = key.trim();
    if key.is_empty() {
        return Err(format!("empty key in '{}'", raw));
    }
    let value = serde_json::from_str(value).unwrap_or_else(|_| Value::String(value.to_string()));
    Ok((key.to_string(), value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_key_value() {
        assert_eq!(parse_key_value("font_size=32").unwrap(), ("font_size".to_string(), json!(32)));
        assert_eq!(
            parse_key_value("keywords=coffee, city").unwrap(),
            ("keywords".to_string(), json!("coffee, city"))
        );
        assert_eq!(
            parse_key_value("keywords=[\"coffee\"]").unwrap(),
            ("keywords".to_string(), json!(["coffee"]))
        );
        assert!(parse_key_value("novalue").is_err());
        assert!(parse_key_value("=3").is_err());
    }
}
