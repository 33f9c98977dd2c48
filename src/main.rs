//
//  stash-client
//  main.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

use anyhow::Result;
use clap::Parser;
use reqwest::StatusCode;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use stash_client::api::ApiError;
use stash_client::cli::{Cancelled, Cli, Commands};
use stash_client::exit_codes;

#[tokio::main]
async fn main() -> Result<()> {
    init_logging();

    let cli = Cli::parse();

    let result = run(cli).await;

    match result {
        Ok(()) => std::process::exit(exit_codes::SUCCESS),
        Err(e) => {
            eprintln!("Error: {e:#}");
            std::process::exit(exit_code(&e));
        }
    }
}

/// Initialize logging from `STASH_DEBUG`, e.g. `STASH_DEBUG=debug`.
fn init_logging() {
    let filter = EnvFilter::try_from_env("STASH_DEBUG").unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .with(filter)
        .init();
}

/// Maps a failure to one of [`exit_codes`].
fn exit_code(error: &anyhow::Error) -> i32 {
    if error.downcast_ref::<Cancelled>().is_some() {
        return exit_codes::CANCELLED;
    }
    match error.downcast_ref::<ApiError>() {
        Some(api) if api.is_not_found() => exit_codes::NOT_FOUND,
        Some(api) if api.is_auth_error() => exit_codes::AUTH_ERROR,
        Some(api) if api.status() == Some(StatusCode::TOO_MANY_REQUESTS) => exit_codes::RATE_LIMIT,
        _ => exit_codes::ERROR,
    }
}

/// Main command dispatcher
async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Auth(cmd) => cmd.run(&cli.global).await,
        Commands::Project(cmd) => cmd.run(&cli.global).await,
        Commands::Repo(cmd) => cmd.run(&cli.global).await,
        Commands::Pr(cmd) => cmd.run(&cli.global).await,
        Commands::Api(cmd) => cmd.run(&cli.global).await,
        Commands::Config(cmd) => cmd.run(&cli.global).await,
        Commands::Completion(cmd) => cmd.run(&cli.global).await,
        Commands::Version => {
            println!("stash version {}", stash_client::VERSION);
            Ok(())
        }
    }
}
