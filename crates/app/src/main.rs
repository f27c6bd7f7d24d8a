#![deny(unsafe_code)]

mod command;
mod error;
mod picker;
mod render;
mod session;

use std::process::ExitCode;

use primeai_chat::{ReplyOutcome, SettingsStore};
use snafu::ResultExt;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, Stdout};
use tracing_subscriber::EnvFilter;

use crate::error::{AppResult, ReadStdinSnafu, WriteStdoutSnafu};
use crate::session::{Flow, Session};

enum Input {
    Reply(Option<ReplyOutcome>),
    Line(std::io::Result<Option<String>>),
}

/// Terminal front-end for the PrimeAI chat.
///
/// Logs go to stderr (`RUST_LOG`, default `warn`) so stdout carries only the conversation.
#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let env_filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::new("warn"),
    };
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            tracing::error!(error = %error, "primeai exited with an error");
            ExitCode::FAILURE
        }
    }
}

async fn run() -> AppResult<()> {
    let store = SettingsStore::load();
    let settings = store.settings();
    tracing::info!(
        config_path = ?store.config_path(),
        reply_delay_ms = settings.reply_delay_ms,
        "settings loaded"
    );

    let mut session = Session::new(&settings);
    let mut stdout = tokio::io::stdout();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    let intro = format!(
        "{}{}",
        render::banner(&settings.assistant_name, &settings.tagline),
        session.updates()
    );
    write_out(&mut stdout, &intro).await?;

    loop {
        let waiting = session.is_waiting();
        let input = tokio::select! {
            outcome = session.wait_for_reply(), if waiting => Input::Reply(outcome),
            line = lines.next_line() => Input::Line(line),
        };

        match input {
            Input::Reply(outcome) => {
                let output = session.on_reply(outcome);
                write_out(&mut stdout, &output).await?;
            }
            Input::Line(line) => {
                let Some(line) = line.context(ReadStdinSnafu {
                    stage: "read-input-line",
                })?
                else {
                    // Piped input can end before the reply lands; show it before leaving.
                    if session.is_waiting() {
                        let outcome = session.wait_for_reply().await;
                        let output = session.on_reply(outcome);
                        write_out(&mut stdout, &output).await?;
                    }
                    break;
                };
                let (flow, output) = session.handle_line(&line).await;
                write_out(&mut stdout, &output).await?;
                if flow == Flow::Quit {
                    break;
                }
            }
        }
    }

    tracing::debug!(
        messages = session.controller().log().len(),
        "conversation closed"
    );
    Ok(())
}

async fn write_out(stdout: &mut Stdout, output: &str) -> AppResult<()> {
    if output.is_empty() {
        return Ok(());
    }
    stdout
        .write_all(output.as_bytes())
        .await
        .context(WriteStdoutSnafu {
            stage: "write-output",
        })?;
    stdout.flush().await.context(WriteStdoutSnafu {
        stage: "flush-output",
    })
}
