//! gconnect - read your Garmin Connect data from the command line.
//!
//! Signs in once, keeps the portal session on disk, and prints the
//! requested data as JSON on stdout.

mod config;

use std::io::{self, Write};
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use gconnect_core::{
    ActivityFilter, ConnectError, Credentials, HttpSession, Identity, PortalClient,
};
use serde::Serialize;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use config::Config;

// ============================================================================
// Constants
// ============================================================================

const USERNAME_ENV: &str = "GARMIN_USERNAME";
const PASSWORD_ENV: &str = "GARMIN_PASSWORD";

/// Activities listed by `activities` when no limit is given
const DEFAULT_LIST_LIMIT: i64 = 20;

const USAGE: &str = "\
Usage: gconnect [--reset] <command> [args]

Commands:
  whoami                 Print the signed-in username
  count                  Number of recorded activities
  activities [limit]     Most recent activities
  all-activities         Every activity, fetched page by page
  summary <id>           Summary of one activity
  details <id>           Detailed samples of one activity
  gear                   Gear registered on the account
  export <format> <id>   Save an activity as csv, tcx, gpx or kml
  wellness [YYYY-MM-DD]  Daily wellness summary (default: today)
  logout                 Delete the stored session

Options:
  --reset                Discard the stored session and sign in again

Environment:
  GARMIN_USERNAME, GARMIN_PASSWORD  Credentials (otherwise prompted)
  GCONNECT_SESSION_DIR              Where session cookie files are kept
  RUST_LOG                          Log filter, e.g. RUST_LOG=gconnect_core=debug";

#[derive(Debug, Clone, PartialEq)]
enum Command {
    WhoAmI,
    Count,
    Activities(i64),
    AllActivities,
    Summary(i64),
    Details(i64),
    Gear,
    Export { format: String, activity_id: i64 },
    Wellness(Option<NaiveDate>),
    Logout,
}

#[derive(Debug, PartialEq)]
struct Invocation {
    reset: bool,
    command: Command,
}

fn parse_id(value: Option<&String>) -> Result<i64> {
    let value = value.context("Missing activity id")?;
    value
        .parse()
        .with_context(|| format!("Invalid activity id: {}", value))
}

fn parse_args(args: &[String]) -> Result<Invocation> {
    let reset = args.iter().any(|a| a == "--reset");
    let rest: Vec<&String> = args.iter().filter(|a| *a != "--reset").collect();

    let Some(name) = rest.first() else {
        bail!("Missing command\n\n{}", USAGE);
    };

    let command = match name.as_str() {
        "whoami" => Command::WhoAmI,
        "count" => Command::Count,
        "activities" => match rest.get(1) {
            Some(limit) => Command::Activities(
                limit
                    .parse()
                    .with_context(|| format!("Invalid limit: {}", limit))?,
            ),
            None => Command::Activities(DEFAULT_LIST_LIMIT),
        },
        "all-activities" => Command::AllActivities,
        "summary" => Command::Summary(parse_id(rest.get(1).copied())?),
        "details" => Command::Details(parse_id(rest.get(1).copied())?),
        "gear" => Command::Gear,
        "export" => {
            let format = rest.get(1).context("Missing export format")?.to_string();
            Command::Export {
                format,
                activity_id: parse_id(rest.get(2).copied())?,
            }
        }
        "wellness" => match rest.get(1) {
            Some(date) => Command::Wellness(Some(
                NaiveDate::parse_from_str(date, "%Y-%m-%d")
                    .with_context(|| format!("Invalid date: {}", date))?,
            )),
            None => Command::Wellness(None),
        },
        "logout" => Command::Logout,
        "-h" | "--help" | "help" => {
            println!("{}", USAGE);
            std::process::exit(0);
        }
        other => bail!("Unknown command: {}\n\n{}", other, USAGE),
    };

    Ok(Invocation { reset, command })
}

/// Initialize the tracing subscriber for logging
fn init_tracing() {
    // Use RUST_LOG env var to control log level (e.g., RUST_LOG=debug)
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(filter)
        .init();
}

fn prompt_username(last: Option<&str>) -> Result<String> {
    match last {
        Some(last) => eprint!("Username [{}]: ", last),
        None => eprint!("Username: "),
    }
    io::stderr().flush()?;

    let mut input = String::new();
    io::stdin().read_line(&mut input)?;
    let input = input.trim();

    match (input.is_empty(), last) {
        (true, Some(last)) => Ok(last.to_string()),
        _ => Ok(input.to_string()),
    }
}

fn prompt_password() -> Result<String> {
    let password = rpassword::prompt_password("Password: ")?;
    Ok(password)
}

fn resolve_username(config: &Config) -> Result<String> {
    match std::env::var(USERNAME_ENV) {
        Ok(username) if !username.trim().is_empty() => Ok(username),
        _ => prompt_username(config.last_username.as_deref()),
    }
}

fn env_password() -> Option<String> {
    std::env::var(PASSWORD_ENV).ok().filter(|p| !p.is_empty())
}

/// Connect, asking for the password only if the stored session is unusable
async fn connect(config: &Config, username: &str, reset: bool) -> Result<PortalClient> {
    let password = match env_password() {
        Some(password) => Some(password),
        None if reset => Some(prompt_password()?),
        None => None,
    };

    let credentials = Credentials {
        username: username.to_string(),
        password,
    };
    let with_password = credentials.password.is_some();

    match PortalClient::connect(config.portal.clone(), credentials, reset).await {
        Err(ConnectError::MissingCredential(_)) if !with_password => {
            info!("Stored session expired, asking for password");
            let credentials = Credentials::new(username, prompt_password()?);
            PortalClient::connect(config.portal.clone(), credentials, false)
                .await
                .context("Sign-in failed")
        }
        result => result.context("Sign-in failed"),
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn logout(config: &Config, username: &str) -> Result<()> {
    let identity = Identity::from_username(username)?;
    let mut session = HttpSession::open(&identity, &config.portal)?;
    session.close()?;
    eprintln!("Session removed");
    Ok(())
}

async fn run(invocation: Invocation) -> Result<()> {
    let mut config = Config::load()?;
    let username = resolve_username(&config)?;

    if invocation.command == Command::Logout {
        return logout(&config, &username);
    }

    let mut client = connect(&config, &username, invocation.reset).await?;

    config.remember_username(&username)?;

    match invocation.command {
        Command::WhoAmI => println!("{}", client.username().await?),
        Command::Count => print_json(&client.activity_count().await?)?,
        Command::Activities(limit) => {
            let filter = ActivityFilter::new().start(0)?.limit(limit)?;
            print_json(&client.activities(Some(&filter)).await?)?;
        }
        Command::AllActivities => {
            let all = client.all_activities(ActivityFilter::new()).await?;
            eprintln!("{} activities", all.len());
            print_json(&all)?;
        }
        Command::Summary(id) => print_json(&client.activity_summary(id).await?)?,
        Command::Details(id) => print_json(&client.extended_activity_details(id).await?)?,
        Command::Gear => print_json(&client.gear_list().await?)?,
        Command::Export {
            format,
            activity_id,
        } => {
            let contents = client.data_file(&format, activity_id).await?;
            let path = PathBuf::from(format!("activity_{}.{}", activity_id, format));
            std::fs::write(&path, contents)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            eprintln!("Saved {}", path.display());
        }
        Command::Wellness(date) => print_json(&client.wellness_daily_summary(date).await?)?,
        Command::Logout => unreachable!("handled before connecting"),
    }

    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();

    init_tracing();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let invocation = parse_args(&args)?;
    run(invocation).await
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_parse_reset_anywhere() {
        let parsed = parse_args(&args(&["count", "--reset"])).unwrap();
        assert!(parsed.reset);
        assert_eq!(parsed.command, Command::Count);
    }

    #[test]
    fn test_parse_activities_default_limit() {
        let parsed = parse_args(&args(&["activities"])).unwrap();
        assert_eq!(parsed.command, Command::Activities(DEFAULT_LIST_LIMIT));
        let parsed = parse_args(&args(&["activities", "5"])).unwrap();
        assert_eq!(parsed.command, Command::Activities(5));
    }

    #[test]
    fn test_parse_export() {
        let parsed = parse_args(&args(&["export", "gpx", "123"])).unwrap();
        assert_eq!(
            parsed.command,
            Command::Export {
                format: "gpx".to_string(),
                activity_id: 123
            }
        );
        assert!(parse_args(&args(&["export", "gpx"])).is_err());
        assert!(parse_args(&args(&["export", "gpx", "abc"])).is_err());
    }

    #[test]
    fn test_parse_wellness_date() {
        let parsed = parse_args(&args(&["wellness", "2024-03-09"])).unwrap();
        assert_eq!(
            parsed.command,
            Command::Wellness(NaiveDate::from_ymd_opt(2024, 3, 9))
        );
        assert!(parse_args(&args(&["wellness", "yesterday"])).is_err());
    }

    #[test]
    fn test_parse_rejects_unknown_and_missing() {
        assert!(parse_args(&args(&[])).is_err());
        assert!(parse_args(&args(&["--reset"])).is_err());
        assert!(parse_args(&args(&["sync"])).is_err());
    }
}
