//! access-gate: stateless bearer-token access policy in front of an Axum app.
//!
//! # Architecture Overview
//!
//! ```text
//!     Client Request
//!     ──────────────▶ request id ─▶ trace ─▶ timeout ─▶ CORS
//!                                                        │
//!                                                        ▼
//!                          ┌──────────────── security filter chain ───────────────┐
//!                          │  ignoring list ──match──────────────────────────┐    │
//!                          │       │ no match                                │    │
//!                          │       ▼                                         │    │
//!                          │  firewall ──reject──▶ 400                       │    │
//!                          │       ▼                                         │    │
//!                          │  token filter (Bearer → Principal)              │    │
//!                          │       ▼                                         │    │
//!                          │  path rules ──denied──▶ 302 /login              │    │
//!                          └───────┬─────────────────────────────────────────┼────┘
//!                                  ▼                                         ▼
//!                              handlers ◀────────────────────────────────────┘
//! ```

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};

use access_gate::config::loader::load_config;
use access_gate::config::GatewayConfig;
use access_gate::lifecycle::startup;
use access_gate::security::password::{BCryptPasswordEncoder, PasswordEncoder};

#[derive(Parser)]
#[command(name = "access-gate")]
#[command(about = "Stateless bearer-token access policy for web applications", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve the application behind the access policy
    Serve {
        /// TOML configuration file; built-in defaults when omitted, which
        /// still require `jwt.secret` and so refuse to start
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
    /// Print the bcrypt hash (cost 12) of a password, for `security.users`
    EncodePassword { password: String },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = match cli.command {
        Commands::Serve { config } => serve(config).await,
        Commands::EncodePassword { password } => encode_password(&password),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn serve(path: Option<PathBuf>) -> Result<(), Box<dyn std::error::Error>> {
    let config = match path {
        Some(path) => load_config(&path)?,
        None => GatewayConfig::default(),
    };
    startup::run(config).await?;
    Ok(())
}

fn encode_password(password: &str) -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", BCryptPasswordEncoder::default().encode(password)?);
    Ok(())
}
