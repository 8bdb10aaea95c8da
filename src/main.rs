#![deny(clippy::implicit_return)]
#![allow(clippy::needless_return)]

mod application;
mod configuration;
mod domain;
mod infrastructure;

use std::env;
use std::io;
use std::process;

use anyhow::Error;
use tracing_appender::non_blocking::NonBlocking;
use tracing_appender::non_blocking::WorkerGuard;
use yansi::Paint;

use crate::application::bot;
use crate::application::cli;

fn handle_error(err: Error) {
    eprintln!(
        "{}",
        Paint::red(format!(
            "Oh no! Letterroast has failed with the following app version and error.\n\nVersion: {}\nCommit: {}\nError: {:#}",
            env!("CARGO_PKG_VERSION"),
            env!("VERGEN_GIT_DESCRIBE"),
            err
        ))
    );

    let backtrace = err.backtrace();
    if backtrace.to_string() == "disabled backtrace" {
        let args = env::args().collect::<Vec<String>>().join(" ");
        eprintln!("\nRunning the following can help explain further what the issue is:");
        eprintln!("\nRUST_BACKTRACE=1 {args}");
    } else {
        eprintln!("\n{}", backtrace);
    }

    process::exit(1);
}

/// Logs go to stderr, keeping stdout clean for subcommand output, unless
/// LETTERROAST_LOG_DIR points somewhere else.
fn log_writer() -> (NonBlocking, WorkerGuard) {
    if let Ok(log_dir) = env::var("LETTERROAST_LOG_DIR") {
        let file_appender = tracing_appender::rolling::never(log_dir, "debug.log");
        return tracing_appender::non_blocking(file_appender);
    }

    return tracing_appender::non_blocking(io::stderr());
}

#[tokio::main]
async fn main() {
    std::panic::set_hook(Box::new(|panic_info| {
        better_panic::Settings::auto().create_panic_handler()(panic_info);
    }));

    // A missing .env is fine, the environment may already be set.
    if let Err(err) = dotenvy::dotenv() {
        if !err.not_found() {
            handle_error(err.into());
        }
    }

    let (writer, _guard) = log_writer();
    let level = if env::var("RUST_LOG")
        .unwrap_or_else(|_| return "".to_string())
        .contains("letterroast")
    {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };
    tracing_subscriber::fmt()
        .json()
        .with_max_level(level)
        .with_writer(writer)
        .init();

    let should_start = match cli::parse().await {
        Ok(should_start) => should_start,
        Err(err) => {
            handle_error(err);
            return;
        }
    };
    if !should_start {
        return;
    }

    let res = tokio::select!(
        res = bot::start() => res,
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Shutting down");
            Ok(())
        },
    );

    if let Err(err) = res {
        handle_error(err);
    }
}
