// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Command-line front end for the BMI Tracker API.

use bmi_tracker::client::{
    form, session::DEFAULT_SESSION_FILE, ApiClient, BmiBackend, ClientError, LogoutTarget,
    SessionFile, StoredSession,
};
use bmi_tracker::models::BmiRecord;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "bmi")]
#[command(about = "BMI Tracker - calculate and record your Body Mass Index")]
#[command(version)]
struct Cli {
    #[arg(
        long,
        global = true,
        default_value = "http://localhost:3000",
        help = "API base URL"
    )]
    api_url: String,

    #[arg(
        long,
        global = true,
        default_value = "http://localhost:3000",
        help = "Frontend URL (used to pick the logout page)"
    )]
    frontend_url: String,

    #[arg(
        long,
        global = true,
        default_value = DEFAULT_SESSION_FILE,
        help = "Where the session token is kept"
    )]
    session_file: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    #[command(about = "Create an account from a Google ID token")]
    Signup {
        #[arg(long, help = "Google ID token")]
        id_token: String,
    },

    #[command(about = "Sign in with a Google ID token")]
    Login {
        #[arg(long, help = "Google ID token")]
        id_token: String,
    },

    #[command(about = "Sign in with an authorization code from the redirect flow")]
    LoginCode {
        #[arg(long, help = "Authorization code")]
        code: String,
    },

    #[command(about = "Print the Google consent URL")]
    AuthUrl,

    #[command(about = "Calculate BMI, save it, and show history")]
    Calc {
        #[arg(help = "Height in centimetres")]
        height: String,
        #[arg(help = "Weight in kilograms")]
        weight: String,
    },

    #[command(about = "Show saved BMI history")]
    History,

    #[command(about = "Delete all saved BMI records")]
    Clear,

    #[command(about = "Forget the stored session")]
    Logout,

    #[command(about = "Show the signed-in user")]
    Whoami,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }

    Ok(())
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let api = ApiClient::new(&cli.api_url)?;
    let session = SessionFile::new(&cli.session_file);

    match cli.command {
        Commands::Signup { id_token } => {
            let response = api.sign_up(&id_token).await?;
            remember(&session, response.into())?;
        }
        Commands::Login { id_token } => {
            let response = api.sign_in(&id_token).await?;
            remember(&session, response.into())?;
        }
        Commands::LoginCode { code } => {
            let response = api.sign_in_with_code(&code).await?;
            remember(&session, response.into())?;
        }
        Commands::AuthUrl => {
            println!("{}", api.auth_url().await?);
        }
        Commands::Calc { height, weight } => {
            let token = session.token();
            let outcome = form::submit(&api, token.as_deref(), &height, &weight).await;
            println!("{}", outcome.message);
            if let Some(records) = outcome.history {
                print_history(&records);
            }
        }
        Commands::History => {
            let token = session.token().ok_or(ClientError::NotSignedIn)?;
            print_history(&api.history(&token).await?);
        }
        Commands::Clear => {
            let token = session.token().ok_or(ClientError::NotSignedIn)?;
            api.clear_history(&token).await?;
            println!("History cleared");
        }
        Commands::Logout => {
            session.clear()?;
            let exists = api
                .page_exists(&cli.frontend_url, LogoutTarget::LOGIN_PAGE)
                .await;
            let target = LogoutTarget::choose(exists);
            println!(
                "Signed out. Continue at {}/{}",
                cli.frontend_url.trim_end_matches('/'),
                target.page()
            );
        }
        Commands::Whoami => match session.load() {
            Some(stored) => {
                let name = stored.user.name.as_deref().unwrap_or("(no name)");
                println!("{} <{}>", name, stored.user.email);
            }
            None => println!("Not signed in"),
        },
    }

    Ok(())
}

fn remember(session: &SessionFile, stored: StoredSession) -> anyhow::Result<()> {
    session.save(&stored)?;
    println!("Signed in as {}", stored.user.email);
    Ok(())
}

fn print_history(records: &[BmiRecord]) {
    println!("History:");
    for line in form::render_history(records) {
        println!("  {line}");
    }
}
