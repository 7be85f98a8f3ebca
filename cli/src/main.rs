//! contacts - terminal client for the contacts service

use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use contacts_core::{config, ApiError, Client, Config, FileStore, Shell};
use tracing_subscriber::EnvFilter;

mod commands;

use commands::{ContactCommands, FavoriteCommands, TagCommands};

/// Manage your contacts from the terminal
#[derive(Parser)]
#[command(name = "contacts", version, about, long_about = None)]
struct Cli {
    /// API base URL
    #[arg(long, env = config::BASE_URL_VAR, default_value = config::DEFAULT_BASE_URL)]
    api_url: String,

    /// Request timeout in seconds
    #[arg(long, env = config::TIMEOUT_VAR, default_value_t = 30)]
    timeout: u64,

    /// Where the session is persisted between runs
    #[arg(long, env = "CONTACTS_SESSION_FILE")]
    session_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Sign in and keep the session for later commands
    Login {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },

    /// Create an account (does not sign in)
    Signup {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },

    /// Sign out and forget the local session
    Logout,

    /// Show the signed-in user
    Whoami,

    /// List and edit contacts
    Contacts {
        #[command(subcommand)]
        command: ContactCommands,
    },

    /// Manage favorite contacts
    Favorites {
        #[command(subcommand)]
        command: FavoriteCommands,
    },

    /// Manage tags and their contacts
    Tags {
        #[command(subcommand)]
        command: TagCommands,
    },
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    match run(Cli::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            report(&err);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    let config = Config::new(&cli.api_url).with_timeout(Duration::from_secs(cli.timeout));
    let session_file = match cli.session_file {
        Some(path) => path,
        None => default_session_file()?,
    };
    tracing::debug!(path = %session_file.display(), "using session file");

    let client = Client::new(&config, FileStore::new(session_file));
    let mut shell = Shell::bootstrap(client.auth.clone());

    match cli.command {
        Commands::Login { email, password } => commands::login(&mut shell, email, password),
        Commands::Signup {
            name,
            email,
            password,
        } => commands::signup(&mut shell, name, email, password),
        Commands::Logout => commands::logout(&mut shell),
        Commands::Whoami => commands::whoami(&shell),
        Commands::Contacts { command } => commands::contacts(&shell, &client, command),
        Commands::Favorites { command } => commands::favorites(&shell, &client, command),
        Commands::Tags { command } => commands::tags(&shell, &client, command),
    }
}

fn default_session_file() -> Result<PathBuf> {
    let dir = dirs::config_dir().context("could not determine config directory")?;
    Ok(dir.join("contacts").join("session.json"))
}

/// Print the screen-level message for API failures, the full chain otherwise.
fn report(err: &anyhow::Error) {
    match err.downcast_ref::<ApiError>() {
        Some(api) => {
            eprintln!("error: {}", api.user_message());
            for field in api.field_errors() {
                eprintln!("  {}: {}", field.field, field.message);
            }
            tracing::debug!(error = %api, "request failed");
        }
        None => eprintln!("error: {err:#}"),
    }
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn attach_takes_several_contacts() {
        let cli = Cli::try_parse_from(["contacts", "tags", "attach", "t1", "c1", "c2"]).unwrap();
        match cli.command {
            Commands::Tags {
                command: TagCommands::Attach { tag, contacts },
            } => {
                assert_eq!(tag, "t1");
                assert_eq!(contacts, vec!["c1", "c2"]);
            }
            _ => panic!("expected tags attach"),
        }
    }

    #[test]
    fn attach_requires_a_contact() {
        assert!(Cli::try_parse_from(["contacts", "tags", "attach", "t1"]).is_err());
    }
}
