//! FreshKart auth server.
//!
//! Usage:
//!   freshkart [--config config.toml] [serve]
//!   freshkart [--config config.toml] create-admin <name> <email>
//!
//! `create-admin` takes the password from `FRESHKART_ADMIN_PASSWORD`, or
//! reads one line from stdin.

use std::io::{self, BufRead, IsTerminal, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use tracing::{error, info};

use freshkart::auth::AuthService;
use freshkart::web::middleware::verifier_from_config;
use freshkart::web::WebServer;
use freshkart::{Config, Database};

#[derive(Parser)]
#[command(name = "freshkart")]
#[command(about = "FreshKart authentication and account security service")]
#[command(version)]
struct Cli {
    /// Path to the TOML configuration file
    #[arg(short, long, global = true, default_value = "config.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Run the HTTP API (default)
    Serve,
    /// Create a verified administrator, or promote an existing account
    CreateAdmin { name: String, email: String },
}

const ADMIN_PASSWORD_ENV: &str = "FRESHKART_ADMIN_PASSWORD";

/// Password from the environment, else the first line of `input`.
fn admin_password(from_env: Option<String>, mut input: impl BufRead) -> io::Result<String> {
    if let Some(password) = from_env.filter(|p| !p.is_empty()) {
        return Ok(password);
    }
    let mut line = String::new();
    input.read_line(&mut line)?;
    let password = line.trim_end_matches(['\r', '\n']).to_string();
    if password.is_empty() {
        return Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("no password given; set {ADMIN_PASSWORD_ENV} or pipe it on stdin"),
        ));
    }
    Ok(password)
}

fn read_admin_password() -> io::Result<String> {
    let from_env = std::env::var(ADMIN_PASSWORD_ENV).ok();
    let stdin = io::stdin();
    if from_env.is_none() && stdin.is_terminal() {
        eprint!("Administrator password: ");
        io::stderr().flush()?;
    }
    admin_password(from_env, stdin.lock())
}

fn load_config(path: &PathBuf) -> Config {
    match Config::load_with_env(path) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load {}: {e}", path.display());
            eprintln!("Using default configuration.");
            let mut config = Config::default();
            config.apply_env_overrides();
            config
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    let config = load_config(&cli.config);

    if let Err(e) = freshkart::logging::init(&config.logging) {
        eprintln!("Failed to initialize logging: {e}");
        freshkart::logging::init_console_only(&config.logging.level);
    }

    if let Err(e) = config.validate() {
        error!("Invalid configuration: {}", e);
        return ExitCode::FAILURE;
    }

    let result = match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => serve(config).await,
        Command::CreateAdmin { name, email } => match read_admin_password() {
            Ok(password) => create_admin(config, &name, &email, &password).await,
            Err(e) => Err(e.into()),
        },
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

async fn open_service(config: &Config) -> Result<AuthService, Box<dyn std::error::Error>> {
    let db = Database::open(&config.database.path).await?;
    Ok(AuthService::new(db, &config.auth)?)
}

async fn serve(config: Config) -> Result<(), Box<dyn std::error::Error>> {
    info!("FreshKart auth service starting");
    let auth = Arc::new(open_service(&config).await?);
    let captcha = Arc::from(verifier_from_config(&config.captcha)?);

    let server = WebServer::new(&config, auth, captcha)?;
    info!("Server configured on {}", server.addr());
    server.run().await?;
    Ok(())
}

async fn create_admin(
    config: Config,
    name: &str,
    email: &str,
    password: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let service = open_service(&config).await?;
    let account = service.bootstrap_admin(name, email, password).await?;
    info!(account_id = account.id, email = %account.email, "Administrator ready");
    println!("Administrator {} ({}) is ready", account.name, account.email);
    Ok(())
}
