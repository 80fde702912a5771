//! Autosuggest control loop.
//!
//! Architecture: channel-based actor. A single control loop owns all
//! mutable state ([`state::QueryState`], the debouncer and the option
//! set). [`Control`] handles forward inputs over an mpsc channel.
//! Backend calls run on spawned tasks and report back over channels,
//! so they may complete in any order; ordering is recovered from the
//! [`state::RequestId`] each response carries. Earlier requests are
//! never cancelled, only ignored.
//!
//! The rendering side reads [`Notification`]s and calls back into
//! [`Control`]; it never touches the state directly.

pub mod state;

use std::sync::Arc;

use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;

use state::{Dispatch, QueryState, RequestId, ResponseOutcome, SelectError, TextAction};

use crate::backend::{BackendError, Geocoder, Resolution, Suggestion};
use crate::debounce::Debouncer;
use crate::geo::address;
use crate::query::{OptionSet, QueryOption};
use crate::query::config::{ConfigError, SuggestConfig};

/// Control errors.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ControlError {
    #[error(transparent)]
    Select(#[from] SelectError),
    #[error("backend error: {0}")]
    Backend(#[from] BackendError),
    #[error("control loop has stopped")]
    Closed,
}

/// Suggestion list lifecycle signals for the rendering side.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListEvent {
    WillAppear,
    DidAppear,
    WillDisappear,
    DidDisappear,
}

/// Everything the rendering side needs to react to.
#[derive(Debug, Clone, PartialEq)]
pub enum Notification {
    /// The suggestion list changed; carries a full snapshot.
    SuggestionsChanged(Vec<Suggestion>),
    /// Whether the field text is a known three-word address.
    ResolvableChanged(bool),
    /// A suggestion was picked; carries the committed field text.
    Selected(String),
    List(ListEvent),
}

/// Inputs forwarded from [`Control`] handles to the loop.
#[derive(Debug)]
enum Input {
    TextChanged(String),
    BeginEditing,
    Select {
        index: usize,
        reply: oneshot::Sender<Result<Suggestion, SelectError>>,
    },
}

/// Response from a spawned autosuggest call.
#[derive(Debug)]
struct SuggestResponse {
    id: RequestId,
    result: Result<Vec<Suggestion>, BackendError>,
}

/// Response from a spawned resolution check.
#[derive(Debug)]
struct ResolveResponse {
    words: String,
    resolvable: bool,
}

/// Cloneable handle to a running control loop.
///
/// The loop stops once every handle has been dropped.
#[derive(Debug, Clone)]
pub struct Control {
    tx: mpsc::UnboundedSender<Input>,
}

impl Control {
    /// Report the field's full current text. Call on every keystroke.
    pub fn text_changed(&self, text: impl Into<String>) -> Result<(), ControlError> {
        self.send(Input::TextChanged(text.into()))
    }

    /// Report that the field gained focus.
    pub fn begin_editing(&self) -> Result<(), ControlError> {
        self.send(Input::BeginEditing)
    }

    /// Pick suggestion `index` from the list last notified.
    pub async fn select(&self, index: usize) -> Result<Suggestion, ControlError> {
        let (reply, rx) = oneshot::channel();
        self.send(Input::Select { index, reply })?;
        let result = rx.await.map_err(|_| ControlError::Closed)?;
        Ok(result?)
    }

    fn send(&self, input: Input) -> Result<(), ControlError> {
        self.tx.send(input).map_err(|_| ControlError::Closed)
    }
}

/// A spawned control: its handle, notification stream and loop task.
pub struct Spawned {
    pub control: Control,
    pub notifications: mpsc::UnboundedReceiver<Notification>,
    /// Resolves when the loop stops. `Err` only in debug mode, when a
    /// backend error stopped it.
    pub task: JoinHandle<Result<(), ControlError>>,
}

/// Spawn a control loop on the current tokio runtime.
///
/// # Errors
///
/// Returns `ConfigError` if the configuration's option strings do not
/// parse. Nothing is spawned in that case.
pub fn spawn(config: &SuggestConfig, geocoder: Arc<dyn Geocoder>) -> Result<Spawned, ConfigError> {
    let options = config.options()?;

    let (input_tx, input_rx) = mpsc::unbounded_channel();
    let (notify_tx, notify_rx) = mpsc::unbounded_channel();
    let (suggest_tx, suggest_rx) = mpsc::unbounded_channel();
    let (resolve_tx, resolve_rx) = mpsc::unbounded_channel();

    let controller = Controller {
        state: QueryState::new(),
        debouncer: Debouncer::new(config.debounce),
        options,
        geocoder,
        debug: config.debug,
        hide_on_select: config.hide_on_select,
        notify_tx,
        suggest_tx,
        resolve_tx,
    };

    let params: Vec<_> = controller
        .options
        .iter()
        .map(QueryOption::param_name)
        .collect();
    tracing::debug!(
        debounce = ?config.debounce,
        debug = config.debug,
        ?params,
        "control started"
    );

    let task = tokio::spawn(run(controller, input_rx, suggest_rx, resolve_rx));

    Ok(Spawned {
        control: Control { tx: input_tx },
        notifications: notify_rx,
        task,
    })
}

/// Loop-owned state and the channels it reports through.
struct Controller {
    state: QueryState,
    debouncer: Debouncer<Dispatch>,
    options: OptionSet,
    geocoder: Arc<dyn Geocoder>,
    debug: bool,
    hide_on_select: bool,
    notify_tx: mpsc::UnboundedSender<Notification>,
    suggest_tx: mpsc::UnboundedSender<SuggestResponse>,
    resolve_tx: mpsc::UnboundedSender<ResolveResponse>,
}

async fn run(
    mut ctl: Controller,
    mut input_rx: mpsc::UnboundedReceiver<Input>,
    mut suggest_rx: mpsc::UnboundedReceiver<SuggestResponse>,
    mut resolve_rx: mpsc::UnboundedReceiver<ResolveResponse>,
) -> Result<(), ControlError> {
    loop {
        tokio::select! {
            input = input_rx.recv() => {
                match input {
                    Some(input) => ctl.handle_input(input),
                    // Every handle dropped.
                    None => break,
                }
            }

            dispatch = ctl.debouncer.fired() => {
                ctl.dispatch(dispatch);
            }

            Some(response) = suggest_rx.recv() => {
                ctl.handle_response(response)?;
            }

            Some(response) = resolve_rx.recv() => {
                ctl.handle_resolution(response);
            }
        }
    }

    tracing::debug!("control stopped");
    Ok(())
}

impl Controller {
    fn handle_input(&mut self, input: Input) {
        match input {
            Input::TextChanged(text) => self.text_changed(&text),
            Input::BeginEditing => {
                self.state.begin_editing();
                self.notify_suggestions();
                self.notify(Notification::List(ListEvent::WillAppear));
                self.notify(Notification::List(ListEvent::DidAppear));
            }
            Input::Select { index, reply } => {
                let result = self.select(index);
                let _ = reply.send(result);
            }
        }
    }

    fn text_changed(&mut self, text: &str) {
        match self.state.text_changed(text) {
            TextAction::Clear => {
                if self.debouncer.cancel() {
                    tracing::trace!("pending query cancelled");
                }
                self.notify_suggestions();
            }
            TextAction::Query(dispatch) => {
                tracing::trace!(
                    request_id = ?dispatch.id,
                    text = %dispatch.text,
                    superseded = self.debouncer.is_pending(),
                    "query scheduled"
                );
                self.debouncer.schedule(dispatch);
            }
        }
        self.check_resolvable();
    }

    /// Send the settled query to the backend on its own task.
    fn dispatch(&mut self, dispatch: Dispatch) {
        let Dispatch { id, text } = dispatch;
        tracing::debug!(request_id = ?id, text = %text, "autosuggest dispatched");

        let geocoder = Arc::clone(&self.geocoder);
        let params = self.options.serialize();
        let tx = self.suggest_tx.clone();
        tokio::spawn(async move {
            let result = geocoder.autosuggest(text, params).await;
            let _ = tx.send(SuggestResponse { id, result });
        });
    }

    fn handle_response(&mut self, response: SuggestResponse) -> Result<(), ControlError> {
        let SuggestResponse { id, result } = response;
        match self.state.apply_response(id, result) {
            ResponseOutcome::Applied => {
                tracing::debug!(
                    request_id = ?id,
                    count = self.state.suggestions().len(),
                    "suggestions updated"
                );
                self.notify_suggestions();
                Ok(())
            }
            ResponseOutcome::Stale => {
                tracing::debug!(
                    request_id = ?id,
                    current = ?self.state.pending_request_id(),
                    "stale response discarded"
                );
                Ok(())
            }
            ResponseOutcome::Failed(e) => {
                if self.debug {
                    tracing::error!(request_id = ?id, error = %e, "autosuggest failed");
                    return Err(ControlError::Backend(e));
                }
                tracing::warn!(request_id = ?id, error = %e, "autosuggest failed");
                Ok(())
            }
        }
    }

    /// Fire an undebounced lookup for the current text. A result only
    /// applies while the field still holds the words it was looked up for.
    fn check_resolvable(&mut self) {
        let words = self.state.current_text().to_string();
        if !address::is_possible_three_word_address(&words) {
            self.update_resolvable(false);
            return;
        }

        let geocoder = Arc::clone(&self.geocoder);
        let tx = self.resolve_tx.clone();
        tokio::spawn(async move {
            let resolvable = match geocoder.convert_to_coordinates(words.clone()).await {
                Ok(Resolution::Found(_)) => true,
                Ok(Resolution::NotFound) => false,
                Err(e) => {
                    tracing::debug!(error = %e, "resolution check failed");
                    false
                }
            };
            let _ = tx.send(ResolveResponse { words, resolvable });
        });
    }

    fn handle_resolution(&mut self, response: ResolveResponse) {
        let ResolveResponse { words, resolvable } = response;
        if words != self.state.current_text() {
            tracing::debug!(words = %words, "stale resolution discarded");
            return;
        }
        self.update_resolvable(resolvable);
    }

    fn update_resolvable(&mut self, resolvable: bool) {
        if self.state.set_resolvable(resolvable) {
            self.notify(Notification::ResolvableChanged(self.state.resolvable()));
        }
    }

    fn select(&mut self, index: usize) -> Result<Suggestion, SelectError> {
        let suggestion = self.state.select(index)?;
        self.debouncer.cancel();
        tracing::debug!(
            index = ?self.state.selected_index(),
            words = %suggestion.words,
            "suggestion selected"
        );

        if self.hide_on_select {
            self.notify(Notification::List(ListEvent::WillDisappear));
        }
        self.notify(Notification::Selected(suggestion.words.clone()));
        if self.hide_on_select {
            self.notify(Notification::List(ListEvent::DidDisappear));
        }
        Ok(suggestion)
    }

    fn notify_suggestions(&self) {
        self.notify(Notification::SuggestionsChanged(
            self.state.suggestions().to_vec(),
        ));
    }

    fn notify(&self, notification: Notification) {
        if self.notify_tx.send(notification).is_err() {
            tracing::trace!("notification receiver dropped");
        }
    }
}
