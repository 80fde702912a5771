//! Command-line front ends for the autosuggest control.
//!
//! `session` plays the rendering collaborator: stdin lines become text
//! changes and picks, notifications are printed as they arrive. The
//! one-shot `suggest` and `resolve` commands call the backend directly.

mod format;

use std::io::{self, Write};
use std::sync::Arc;

use futures::StreamExt;
use tokio::sync::mpsc;
use tokio_util::codec::{FramedRead, LinesCodec, LinesCodecError};

use crate::backend::w3w::Backend;
use crate::backend::{BackendError, Geocoder};
use crate::cli::BackendArgs;
use crate::control::{self, ControlError, Notification};
use crate::geo::address;
use crate::query::config::{ConfigError, SuggestConfig};

/// Maximum accepted stdin line length.
const MAX_LINE: usize = 4096;

/// Session error type.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("configuration: {0}")]
    Config(#[from] ConfigError),
    #[error("backend: {0}")]
    Backend(#[from] BackendError),
    #[error("control: {0}")]
    Control(#[from] ControlError),
    #[error("stdin: {0}")]
    Input(#[from] LinesCodecError),
    #[error("control task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// One parsed stdin line.
#[derive(Debug, PartialEq, Eq)]
enum Line {
    Text(String),
    Begin,
    Pick(usize),
    Quit,
    Invalid(String),
}

fn parse_line(line: &str) -> Line {
    let Some(command) = line.trim().strip_prefix(':') else {
        return Line::Text(line.to_string());
    };
    let mut parts = command.split_whitespace();
    match (parts.next(), parts.next(), parts.next()) {
        (Some("begin"), None, _) => Line::Begin,
        (Some("quit" | "q"), None, _) => Line::Quit,
        (Some("pick"), Some(n), None) => match n.parse() {
            Ok(index) => Line::Pick(index),
            Err(_) => Line::Invalid(format!("not an index: {n:?}")),
        },
        (Some("pick"), ..) => Line::Invalid("usage: :pick N".into()),
        _ => Line::Invalid(format!("unknown command: {line:?}")),
    }
}

fn backend(args: BackendArgs) -> Result<Backend, SessionError> {
    Ok(Backend::with_endpoint(args.api_key, args.endpoint)?)
}

/// Run an interactive session until EOF, `:quit`, or a fatal error.
///
/// A pick outside the current list is reported and the session goes
/// on; backend errors in debug mode end it.
pub async fn run(args: BackendArgs, config: SuggestConfig, json: bool) -> Result<(), SessionError> {
    let geocoder: Arc<dyn Geocoder> = Arc::new(backend(args)?);
    let control::Spawned {
        control,
        mut notifications,
        mut task,
    } = control::spawn(&config, geocoder)?;

    let mut lines = FramedRead::new(tokio::io::stdin(), LinesCodec::new_with_max_length(MAX_LINE));
    tracing::info!("session started");

    loop {
        tokio::select! {
            line = lines.next() => {
                let Some(line) = line else { break };
                match parse_line(&line?) {
                    Line::Text(text) => control.text_changed(text)?,
                    Line::Begin => control.begin_editing()?,
                    Line::Pick(index) => match control.select(index).await {
                        Ok(_) => {}
                        Err(ControlError::Select(e)) => eprintln!("w3wsuggest: {e}"),
                        Err(e) => return Err(e.into()),
                    },
                    Line::Quit => break,
                    Line::Invalid(msg) => eprintln!("w3wsuggest: {msg}"),
                }
            }

            Some(notification) = notifications.recv() => {
                format::print_notification(&notification, json)?;
            }

            result = &mut task => {
                // Only a debug-mode backend failure ends the loop early.
                flush(&mut notifications, &mut io::stdout().lock(), json)?;
                result??;
                return Ok(());
            }
        }
    }

    drop(control);
    task.await??;
    flush(&mut notifications, &mut io::stdout().lock(), json)?;
    tracing::info!("session ended");
    Ok(())
}

/// Write every notification already queued, without waiting for more.
fn flush(
    notifications: &mut mpsc::UnboundedReceiver<Notification>,
    out: &mut impl Write,
    json: bool,
) -> io::Result<()> {
    while let Ok(notification) = notifications.try_recv() {
        format::write_notification(out, &notification, json)?;
    }
    Ok(())
}

/// Query once and print the suggestions.
pub async fn suggest(
    args: BackendArgs,
    config: SuggestConfig,
    input: String,
    json: bool,
) -> Result<(), SessionError> {
    let params = config.options()?.serialize();
    let input = address::normalize(&input);
    let suggestions = backend(args)?.autosuggest(input, params).await?;
    format::print_suggestions(&suggestions, json)?;
    Ok(())
}

/// Resolve once and print the coordinates, if any.
pub async fn resolve(args: BackendArgs, words: String) -> Result<(), SessionError> {
    let words = address::normalize(&words);
    let resolution = backend(args)?.convert_to_coordinates(words.clone()).await?;
    format::print_resolution(&words, &resolution);
    Ok(())
}
