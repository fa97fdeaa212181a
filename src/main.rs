use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use finolog::config::Config;
use finolog::resource::{dispatch, ArgValue, Args};
use serde_json::Value;
use std::path::PathBuf;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::EnvFilter;

/// Filter directives that override `--log-level`, e.g. `finolog=trace,reqwest=debug`
const LOG_ENV: &str = "FINOLOG_LOG";
const LOG_FILES_KEPT: usize = 7;

/// Command-line client for the Finolog API
#[derive(Parser, Debug)]
#[command(name = "finolog", version, about, long_about = None)]
struct Cli {
    /// Business account id
    #[arg(short, long, global = true)]
    biz_id: Option<i64>,

    /// API token (overrides FINOLOG_API_TOKEN and the config file)
    #[arg(short, long, global = true)]
    token: Option<String>,

    /// Log level for debugging
    #[arg(long, value_enum, default_value = "off", global = true)]
    log_level: LogLevel,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print one entity as JSON
    Get { kind: Kind, id: i64 },
    /// Print entities matching the filters as a JSON array
    List {
        kind: Kind,
        /// Filter as key=value; values are parsed as JSON when possible
        #[arg(short, long = "filter", value_parser = parse_filter)]
        filters: Vec<(String, Value)>,
    },
    /// Delete one entity
    Delete { kind: Kind, id: i64 },
    /// Change the stored configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
enum ConfigAction {
    /// Store the API token
    SetToken { token: String },
    /// Store the default business id
    SetBiz { biz_id: i64 },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Kind {
    Accounts,
    Companies,
    Contractors,
    Orders,
    Items,
    Transactions,
}

impl Kind {
    fn key(self) -> &'static str {
        match self {
            Kind::Accounts => "accounts",
            Kind::Companies => "companies",
            Kind::Contractors => "contractors",
            Kind::Orders => "orders",
            Kind::Items => "items",
            Kind::Transactions => "transactions",
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum LogLevel {
    Off,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    /// Directive scoped to this crate so dependency chatter stays out
    fn directive(self) -> Option<&'static str> {
        match self {
            LogLevel::Off => None,
            LogLevel::Error => Some("finolog=error"),
            LogLevel::Warn => Some("finolog=warn"),
            LogLevel::Info => Some("finolog=info"),
            LogLevel::Debug => Some("finolog=debug"),
            LogLevel::Trace => Some("finolog=trace"),
        }
    }
}

fn parse_filter(raw: &str) -> std::result::Result<(String, Value), String> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected key=value, got {raw:?}"))?;
    let key = key.trim();
    if key.is_empty() {
        return Err(format!("empty filter name in {raw:?}"));
    }

    let value = serde_json::from_str(value).unwrap_or_else(|_| Value::String(value.to_string()));
    Ok((key.to_string(), value))
}

fn filters_to_args(filters: &[(String, Value)]) -> Result<Args> {
    let mut args = Args::new();
    for (key, value) in filters {
        if let Some(value) = ArgValue::from_json(key, value)? {
            args.insert(key, value);
        }
    }
    Ok(args)
}

/// Pick the active filter; a non-empty `FINOLOG_LOG` wins over the flag
fn log_filter(level: LogLevel, env: Option<&str>) -> Option<EnvFilter> {
    match env.map(str::trim).filter(|spec| !spec.is_empty()) {
        Some(spec) => match EnvFilter::try_new(spec) {
            Ok(filter) => Some(filter),
            Err(e) => {
                eprintln!("Ignoring {LOG_ENV}={spec:?}: {e}");
                level.directive().map(EnvFilter::new)
            }
        },
        None => level.directive().map(EnvFilter::new),
    }
}

fn log_dir() -> PathBuf {
    dirs::state_dir()
        .or_else(dirs::cache_dir)
        .map(|dir| dir.join("finolog"))
        .unwrap_or_else(|| std::env::temp_dir().join("finolog"))
}

/// Install a daily-rotated file subscriber; the guard flushes on drop
fn setup_logging(level: LogLevel) -> Result<Option<WorkerGuard>> {
    let env = std::env::var(LOG_ENV).ok();
    let Some(filter) = log_filter(level, env.as_deref()) else {
        return Ok(None);
    };

    let dir = log_dir();
    let appender = RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .filename_prefix("finolog")
        .filename_suffix("log")
        .max_log_files(LOG_FILES_KEPT)
        .build(&dir)
        .with_context(|| format!("Failed to open log directory {}", dir.display()))?;
    let (writer, guard) = tracing_appender::non_blocking(appender);

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .with_ansi(false)
        .with_target(true)
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to install log subscriber: {e}"))?;

    tracing::info!(dir = %dir.display(), "finolog {} logging", env!("CARGO_PKG_VERSION"));
    Ok(Some(guard))
}

fn print_json(value: &impl serde::Serialize) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let _log_guard = setup_logging(cli.log_level).unwrap_or_else(|e| {
        eprintln!("Logging disabled: {e:#}");
        None
    });

    let mut config = Config::load();

    if let Command::Config { action } = &cli.command {
        match action {
            ConfigAction::SetToken { token } => config.set_token(token)?,
            ConfigAction::SetBiz { biz_id } => config.set_biz_id(*biz_id)?,
        }
        if let Some(path) = Config::config_path() {
            println!("Saved {}", path.display());
        }
        return Ok(());
    }

    let session = config.session(cli.token.as_deref(), cli.biz_id)?;

    match cli.command {
        Command::Get { kind, id } => {
            let value = dispatch::get(&session, kind.key(), id)
                .await
                .with_context(|| format!("Failed to get {} {}", kind.key(), id))?;
            print_json(&value)
        }
        Command::List { kind, filters } => {
            let args = filters_to_args(&filters)?;
            let value = dispatch::list(&session, kind.key(), &args)
                .await
                .with_context(|| format!("Failed to list {}", kind.key()))?;
            print_json(&value)
        }
        Command::Delete { kind, id } => {
            let deleted = dispatch::delete(&session, kind.key(), id)
                .await
                .with_context(|| format!("Failed to delete {} {}", kind.key(), id))?;
            print_json(&deleted)
        }
        Command::Config { .. } => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_filter_json_and_plain() {
        assert_eq!(
            parse_filter("ids=[1,2]").unwrap(),
            ("ids".to_string(), json!([1, 2]))
        );
        assert_eq!(
            parse_filter("query=rent office").unwrap(),
            ("query".to_string(), json!("rent office"))
        );
        assert_eq!(
            parse_filter("date=2024-01-01").unwrap(),
            ("date".to_string(), json!("2024-01-01"))
        );
        assert!(parse_filter("noequals").is_err());
    }

    #[test]
    fn test_filters_to_args() {
        let filters = vec![
            ("date".to_string(), json!(["2024-01-01", "2024-02-01"])),
            ("page".to_string(), json!(2)),
            ("query".to_string(), Value::Null),
        ];
        let args = filters_to_args(&filters).unwrap();
        assert_eq!(args.len(), 2);
        assert!(matches!(args.get("date"), Some(ArgValue::Many(_))));
    }

    #[test]
    fn test_numeric_text_filter_reaches_string_field() {
        use finolog::models::Contractor;
        use finolog::resource::Entity;

        let filter = parse_filter("query=7701234567").unwrap();
        assert_eq!(filter.1, json!(7701234567i64));

        let args = filters_to_args(&[filter]).unwrap();
        let query = Contractor::list_schema().validate(&args).unwrap().to_query();
        assert_eq!(query, vec![("query".to_string(), "7701234567".to_string())]);
    }

    #[test]
    fn test_log_filter_env_overrides_flag() {
        use tracing::level_filters::LevelFilter;

        assert!(log_filter(LogLevel::Off, None).is_none());
        assert!(log_filter(LogLevel::Off, Some("  ")).is_none());

        let flag = log_filter(LogLevel::Debug, None).unwrap();
        assert_eq!(flag.max_level_hint(), Some(LevelFilter::DEBUG));

        let env = log_filter(LogLevel::Off, Some("finolog=trace")).unwrap();
        assert_eq!(env.max_level_hint(), Some(LevelFilter::TRACE));
    }

    #[test]
    fn test_log_dir_is_app_scoped() {
        assert!(log_dir().ends_with("finolog"));
    }

    #[test]
    fn test_kind_keys_match_dispatch() {
        for kind in Kind::value_variants() {
            assert!(dispatch::KINDS.contains(&kind.key()));
        }
    }

    #[test]
    fn test_cli_parses() {
        let cli = Cli::try_parse_from([
            "finolog", "--biz-id", "5", "list", "transactions", "-f", "type=out",
        ])
        .unwrap();
        assert_eq!(cli.biz_id, Some(5));
        assert!(matches!(cli.command, Command::List { kind: Kind::Transactions, .. }));
    }
}
