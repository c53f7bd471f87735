use clap::{CommandFactory, Parser};
use dzener_cli::cli::{Cli, Command, collect_config_overrides};
use dzener_core::config::{self, Config, ExchangeSettings};
use dzener_core::error::AppError;
use dzener_core::exchange_api::{self, ProcessOutcome};
use dzener_core::model::{ACTION_CATALOG, Task, UserProfile, actions_from_codes};
use dzener_core::progress::{NoopObserver, ProgressObserver};
use std::io::{self, BufRead};
use std::time::Duration;
use tabled::settings::Style;
use tabled::{Table, Tabled};
use tracing_subscriber::EnvFilter;

const LOG_ENV_VAR: &str = "DZENER_LOG";

#[derive(Tabled)]
struct TaskRow {
    #[tabled(rename = "#")]
    number: usize,
    kind: String,
    url: String,
    actions: String,
    added: String,
}

/// Prints each simulated task and pauses between them.
struct ConsoleObserver {
    pause: Duration,
    reward: u64,
}

impl ProgressObserver for ConsoleObserver {
    fn on_batch(&self, total: usize) {
        println!("Found {total} tasks to process.");
    }

    fn on_task(&self, index: usize, task: &Task, balance: u64) {
        println!();
        println!("> [{index}] Processing: {}", task.url);
        println!("  Requested by: {}", task.owner);
        println!("  Type: {}", task.kind);
        println!("  Actions: {}", task.desired_actions.join(", "));
        if !self.pause.is_zero() {
            std::thread::sleep(self.pause);
        }
        println!("  +{} points. Balance: {balance}", self.reward);
    }
}

fn task_json(task: &Task) -> serde_json::Value {
    serde_json::json!({
        "url": task.url,
        "kind": task.kind,
        "desired_actions": task.desired_actions,
        "owner": task.owner,
        "created_at": task.created_at,
    })
}

fn profile_json(profile: &UserProfile) -> serde_json::Value {
    serde_json::json!({
        "nickname": profile.nickname,
        "points": profile.points,
        "completed_tasks": profile.completed_tasks,
        "last_updated": profile.last_updated,
        "submitted_tasks": profile.submitted_tasks.len(),
    })
}

fn print_tasks_plain(tasks: &[Task]) {
    if tasks.is_empty() {
        println!("No submitted links yet.");
        return;
    }

    let rows: Vec<TaskRow> = tasks
        .iter()
        .enumerate()
        .map(|(index, task)| TaskRow {
            number: index + 1,
            kind: task.kind.to_string(),
            url: task.url.clone(),
            actions: task.desired_actions.join(", "),
            added: task.created_at.clone(),
        })
        .collect();

    let mut table = Table::new(rows);
    table.with(Style::psql());
    println!("{table}");
}

fn print_tasks_json(tasks: &[Task]) {
    let payload: Vec<serde_json::Value> = tasks.iter().map(task_json).collect();
    println!("{}", serde_json::Value::Array(payload));
}

fn print_status(profile: &UserProfile) {
    let rule = "=".repeat(62);
    println!("{rule}");
    println!("Dzener v{} - local client", env!("CARGO_PKG_VERSION"));
    println!("{rule}");
    println!("User: {}", profile.nickname);
    println!("Balance: {} points", profile.points);
    println!("Completed tasks: {}", profile.completed_tasks);
    println!("Submitted links: {}", profile.submitted_tasks.len());
    println!("Last updated: {}", profile.last_updated);
    println!("{rule}");
}

fn print_outcome_plain(outcome: &ProcessOutcome) {
    println!(
        "Processed: {}, points added: {}, balance: {}",
        outcome.report.processed, outcome.report.points_added, outcome.points
    );
}

fn print_about(settings: &ExchangeSettings) {
    let data_dir = config::data_dir()
        .map(|path| path.display().to_string())
        .unwrap_or_else(|_| "-".to_string());

    println!(
        "Dzener v{} - a local simulation of a Dzen engagement exchange.",
        env!("CARGO_PKG_VERSION")
    );
    println!();
    println!("  - submit and remove links to articles and videos");
    println!("  - run batches of exchange tasks");
    println!("  - earn {} points per task", settings.reward_per_task);
    println!("  - export submitted links to JSON");
    println!("  - statistics are kept in {data_dir}");
    println!();
    println!("Action codes for --actions:");
    for (code, label) in ACTION_CATALOG {
        println!("  {code}. {label}");
    }
}

fn normalize_parse_error(err: clap::Error) -> AppError {
    let rendered = err.to_string();
    let first_line = rendered.lines().next().unwrap_or("invalid command").trim();
    let message = first_line
        .strip_prefix("error: ")
        .unwrap_or(first_line)
        .to_string();
    AppError::invalid_input(message)
}

fn split_command_line(line: &str) -> Result<Vec<String>, AppError> {
    let mut args = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut escape = false;

    for ch in line.chars() {
        if escape {
            if ch != '"' && ch != '\\' {
                current.push('\\');
            }
            current.push(ch);
            escape = false;
            continue;
        }

        if in_quotes && ch == '\\' {
            escape = true;
            continue;
        }

        if ch == '"' {
            in_quotes = !in_quotes;
            continue;
        }

        if ch.is_whitespace() && !in_quotes {
            if !current.is_empty() {
                args.push(std::mem::take(&mut current));
            }
            continue;
        }

        current.push(ch);
    }

    if in_quotes {
        return Err(AppError::invalid_input("unterminated quote in command"));
    }

    if !current.is_empty() {
        args.push(current);
    }

    Ok(args)
}

fn print_help() {
    let mut cmd = Cli::command();
    let help = cmd.render_help();
    println!("{help}");
}

fn resolve_config(cli: &Cli) -> Result<Config, AppError> {
    let loaded = config::load_config_with_fallback();
    if let Some(err) = loaded.error.as_ref() {
        tracing::warn!(error = %err, "using default settings");
    }

    let overrides = collect_config_overrides(&cli.config_override).map_err(AppError::invalid_input)?;
    Ok(config::merge_overrides(&loaded.config, &overrides))
}

fn run_command(cli: Cli) -> Result<(), AppError> {
    let config = resolve_config(&cli)?;
    let settings = config.exchange_settings();

    match cli.command {
        Command::Add { url, kind, actions } => {
            let url = match url {
                Some(value) if !value.trim().is_empty() => value,
                _ => return Err(AppError::invalid_input("url is required")),
            };
            let actions = actions_from_codes(actions.as_deref().unwrap_or(""));

            let task = exchange_api::add_task(&url, &kind, actions)?;
            if cli.json {
                println!("{}", task_json(&task));
            } else {
                println!("Added link: {} [{}]", task.url, task.kind);
            }
        }
        Command::Remove { number } => {
            let task = exchange_api::remove_task(&number)?;
            if cli.json {
                println!("{}", task_json(&task));
            } else {
                println!("Removed link: {}", task.url);
            }
        }
        Command::List => {
            let tasks = exchange_api::list_tasks()?;
            if cli.json {
                print_tasks_json(&tasks);
            } else {
                print_tasks_plain(&tasks);
            }
        }
        Command::Process { count, verbose } => {
            let settings = ExchangeSettings {
                batch_size: count.unwrap_or(settings.batch_size),
                ..settings
            };

            let outcome = if verbose && !cli.json {
                let observer = ConsoleObserver {
                    pause: Duration::from_millis(settings.pause_ms),
                    reward: settings.reward_per_task,
                };
                exchange_api::process_tasks(&settings, &observer)?
            } else {
                exchange_api::process_tasks(&settings, &NoopObserver)?
            };

            if cli.json {
                println!(
                    "{}",
                    serde_json::json!({
                        "processed": outcome.report.processed,
                        "points_added": outcome.report.points_added,
                        "points": outcome.points,
                        "completed_tasks": outcome.completed_tasks,
                    })
                );
            } else {
                if verbose {
                    println!();
                }
                print_outcome_plain(&outcome);
            }
        }
        Command::Export => {
            let path = exchange_api::export_tasks()?;
            if cli.json {
                println!("{}", serde_json::json!({ "path": path.display().to_string() }));
            } else {
                println!("Exported links to {}", path.display());
            }
        }
        Command::Reset { yes } => {
            if !yes {
                return Err(AppError::invalid_input(
                    "reset needs confirmation, pass --yes",
                ));
            }

            let profile = exchange_api::reset_progress()?;
            if cli.json {
                println!("{}", profile_json(&profile));
            } else {
                println!("Points and statistics reset.");
            }
        }
        Command::Nickname { name } => {
            let profile = exchange_api::set_nickname(&name)?;
            if cli.json {
                println!("{}", profile_json(&profile));
            } else {
                println!("Nickname set: {}", profile.nickname);
            }
        }
        Command::Status => {
            let profile = exchange_api::status()?;
            if cli.json {
                println!("{}", profile_json(&profile));
            } else {
                print_status(&profile);
            }
        }
        Command::About => print_about(&settings),
    }

    Ok(())
}

fn run_interactive() -> Result<(), AppError> {
    let mut input = String::new();
    let stdin = io::stdin();
    let mut stdin_lock = stdin.lock();

    loop {
        input.clear();
        let bytes = stdin_lock
            .read_line(&mut input)
            .map_err(|err| AppError::io(err.to_string()))?;

        if bytes == 0 {
            break;
        }

        let line = input.trim();
        if line.is_empty() {
            continue;
        }

        if line.eq_ignore_ascii_case("exit") || line.eq_ignore_ascii_case("quit") {
            break;
        }

        if line == "help" || line == "?" {
            print_help();
            continue;
        }

        let args = match split_command_line(line) {
            Ok(args) => args,
            Err(err) => {
                eprintln!("ERROR: {}", err);
                continue;
            }
        };

        if args.is_empty() {
            continue;
        }

        let mut argv = Vec::with_capacity(args.len() + 1);
        argv.push("dzener".to_string());
        argv.extend(args);

        let cli = match Cli::try_parse_from(argv) {
            Ok(cli) => cli,
            Err(err) => {
                eprintln!("ERROR: {}", normalize_parse_error(err));
                continue;
            }
        };

        if let Err(err) = run_command(cli) {
            eprintln!("ERROR: {}", err);
        }
    }

    Ok(())
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_env(LOG_ENV_VAR).unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

fn main() {
    init_tracing();

    let mut args = std::env::args_os();
    args.next();
    if args.next().is_none() {
        if let Err(err) = run_interactive() {
            eprintln!("ERROR: {}", err);
            std::process::exit(1);
        }
        return;
    }

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) if !err.use_stderr() => {
            let _ = err.print();
            return;
        }
        Err(err) => {
            eprintln!("ERROR: {}", normalize_parse_error(err));
            std::process::exit(1);
        }
    };

    if let Err(err) = run_command(cli) {
        eprintln!("ERROR: {}", err);
        std::process::exit(1);
    }
}
