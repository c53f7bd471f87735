use clap::{Parser, Subcommand};
use dzener_core::config::{ConfigOverrides, canonical_name};

#[derive(Parser, Debug)]
#[command(name = "dzener", author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Output JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Override configuration values (format KEY=VALUE)
    #[arg(long = "config-override", value_name = "KEY=VALUE", global = true)]
    pub config_override: Vec<String>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Submit a link for promotion
    ///
    /// Example: dzener add https://dzen.ru/a/my-post --kind article --actions 1,2,4
    Add {
        url: Option<String>,
        /// Material type: article or video
        #[arg(long, default_value = "article")]
        kind: String,
        /// Comma separated action codes (see `dzener about`)
        #[arg(short = 'a', long, value_name = "CODES")]
        actions: Option<String>,
    },
    /// Remove a submitted link by its number in the list
    ///
    /// Example: dzener remove 2
    Remove { number: String },
    /// Show submitted links
    ///
    /// Example: dzener list
    List,
    /// Run a batch of exchange tasks and collect points
    ///
    /// Example: dzener process
    /// Example: dzener process -n 10 --verbose
    Process {
        /// Number of tasks to run (clamped to 1..=1000)
        #[arg(short = 'n', long, allow_negative_numbers = true)]
        count: Option<i64>,
        /// Print every task and pause between them
        #[arg(long)]
        verbose: bool,
    },
    /// Export submitted links to JSON
    ///
    /// Example: dzener export
    Export,
    /// Reset points and statistics
    ///
    /// Example: dzener reset --yes
    Reset {
        #[arg(long)]
        yes: bool,
    },
    /// Change the nickname used for new submissions
    ///
    /// Example: dzener nickname neo
    Nickname { name: String },
    /// Show balance and statistics
    ///
    /// Example: dzener status
    Status,
    /// Describe the program and the action codes
    About,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigOverrideTarget {
    RewardPerTask,
    BatchSize,
    PauseMs,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedConfigOverride {
    pub target: ConfigOverrideTarget,
    pub value: String,
}

/// Parse a raw `KEY=VALUE` override string into a structured target.
pub fn parse_config_override(raw: &str) -> Result<ParsedConfigOverride, String> {
    let (key_raw, value_raw) = raw
        .trim()
        .split_once('=')
        .ok_or_else(|| "override must be in KEY=VALUE format".to_string())?;

    let key = canonical_name(key_raw).ok_or_else(|| "override key cannot be empty".to_string())?;
    let target = match key.as_str() {
        "reward_per_task" | "reward" => ConfigOverrideTarget::RewardPerTask,
        "batch_size" | "batch" => ConfigOverrideTarget::BatchSize,
        "pause_ms" | "pause" => ConfigOverrideTarget::PauseMs,
        other => return Err(format!("unknown config field '{other}'")),
    };

    Ok(ParsedConfigOverride {
        target,
        value: value_raw.trim().to_string(),
    })
}

/// Folds every `KEY=VALUE` pair into one set of overrides; later pairs win.
pub fn collect_config_overrides(raw: &[String]) -> Result<ConfigOverrides, String> {
    let mut overrides = ConfigOverrides::default();

    for entry in raw {
        let parsed = parse_config_override(entry)?;
        match parsed.target {
            ConfigOverrideTarget::RewardPerTask => {
                overrides.reward_per_task = Some(parse_number(&parsed.value, "reward_per_task")?)
            }
            ConfigOverrideTarget::BatchSize => {
                overrides.batch_size = Some(parse_number(&parsed.value, "batch_size")?)
            }
            ConfigOverrideTarget::PauseMs => {
                overrides.pause_ms = Some(parse_number(&parsed.value, "pause_ms")?)
            }
        }
    }

    Ok(overrides)
}

fn parse_number<T: std::str::FromStr>(value: &str, field: &str) -> Result<T, String> {
    value
        .parse()
        .map_err(|_| format!("{field} override must be a number, got '{value}'"))
}
