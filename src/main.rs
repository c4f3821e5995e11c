#![deny(clippy::implicit_return)]
#![allow(clippy::needless_return)]

#[cfg(test)]
#[path = "main_test.rs"]
mod tests;

mod application;
mod configuration;
mod domain;
mod infrastructure;

use std::env;
use std::process;

use anyhow::Error;
use anyhow::Result;
use tracing_appender::non_blocking::NonBlocking;
use tracing_appender::non_blocking::WorkerGuard;
use yansi::Paint;

use crate::application::cli;
use crate::application::ui;
use crate::infrastructure::backends::BackendManager;

fn handle_error(err: Error) {
    eprintln!(
        "{}",
        Paint::red(format!(
            "Oh no! Careerist has failed with the following app version and error.\n\nVersion: {}\nError: {:#}",
            env!("CARGO_PKG_VERSION"),
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
}

fn log_dir() -> String {
    if let Ok(dir) = env::var("CAREERIST_LOG_DIR") {
        return dir;
    }

    return dirs::cache_dir()
        .unwrap_or_else(env::temp_dir)
        .join("careerist")
        .to_string_lossy()
        .to_string();
}

/// Buffered writer for `debug.log`. Lines still queued are flushed when the
/// guard drops.
fn log_writer(dir: &str) -> (NonBlocking, WorkerGuard) {
    let file_appender = tracing_appender::rolling::never(dir, "debug.log");
    return tracing_appender::non_blocking(file_appender);
}

async fn run() -> Result<()> {
    let chat_options = match cli::parse().await? {
        Some(chat_options) => chat_options,
        None => return Ok(()),
    };

    let store = cli::load_session_store(chat_options.ephemeral)?;
    return ui::start(store, BackendManager::get()).await;
}

#[tokio::main]
async fn main() {
    std::panic::set_hook(Box::new(|panic_info| {
        ui::destruct_terminal_for_panic();
        better_panic::Settings::auto().create_panic_handler()(panic_info);
    }));

    let (writer, guard) = log_writer(&log_dir());
    if env::var("RUST_LOG")
        .unwrap_or_else(|_| return "".to_string())
        .contains("careerist")
    {
        tracing_subscriber::fmt()
            .json()
            .with_max_level(tracing::Level::DEBUG)
            .with_writer(writer)
            .init();
    }

    let mut exit_code = 0;
    if let Err(err) = run().await {
        ui::destruct_terminal_for_panic();
        handle_error(err);
        exit_code = 1;
    }

    drop(guard);
    process::exit(exit_code);
}
