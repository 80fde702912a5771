//! Query state: field text, request correlation and the suggestion list.
//!
//! All methods are pure state transitions with no I/O. The control
//! loop owns the only instance and turns the returned actions into
//! backend calls and notifications.

use crate::backend::{BackendError, Suggestion};
use crate::geo::address;

/// Identifier of the most recent query issued for the field text.
///
/// Monotonically increasing. A response tagged with any other id
/// belongs to text the user has since changed and is discarded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct RequestId(u64);

impl RequestId {
    fn next(self) -> Self {
        Self(self.0 + 1)
    }
}

/// A query waiting to be sent once input settles.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dispatch {
    pub id: RequestId,
    pub text: String,
}

/// What the control loop must do after a text change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TextAction {
    /// Text is empty: the list was cleared, nothing to query.
    Clear,
    /// Schedule this query on the debouncer.
    Query(Dispatch),
}

/// Result of applying a backend response.
#[derive(Debug, Clone, PartialEq)]
pub enum ResponseOutcome {
    /// Suggestions replaced.
    Applied,
    /// Response was for an older request and was dropped.
    Stale,
    /// Backend failed; the list is unchanged.
    Failed(BackendError),
}

/// Selection errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SelectError {
    #[error("index {index} out of range for {len} suggestion(s)")]
    IndexOutOfRange { index: usize, len: usize },
}

/// State of one autosuggest field.
///
/// Owned exclusively by the control loop. No concurrent access.
#[derive(Debug, Default)]
pub struct QueryState {
    current_text: String,
    pending_request_id: RequestId,
    suggestions: Vec<Suggestion>,
    selected_index: Option<usize>,
    resolvable: bool,
}

impl QueryState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current_text(&self) -> &str {
        &self.current_text
    }

    pub fn pending_request_id(&self) -> RequestId {
        self.pending_request_id
    }

    pub fn suggestions(&self) -> &[Suggestion] {
        &self.suggestions
    }

    pub fn selected_index(&self) -> Option<usize> {
        self.selected_index
    }

    pub fn resolvable(&self) -> bool {
        self.resolvable
    }

    /// Record new field text.
    ///
    /// Always issues a new request id, so responses to earlier text are
    /// stale even when the new text is empty and nothing is queried.
    pub fn text_changed(&mut self, raw: &str) -> TextAction {
        self.current_text = address::normalize(raw);
        self.selected_index = None;
        self.pending_request_id = self.pending_request_id.next();

        if self.current_text.is_empty() {
            self.suggestions.clear();
            return TextAction::Clear;
        }
        TextAction::Query(Dispatch {
            id: self.pending_request_id,
            text: self.current_text.clone(),
        })
    }

    /// Editing started: drop whatever list was showing.
    pub fn begin_editing(&mut self) {
        self.suggestions.clear();
        self.selected_index = None;
    }

    /// Apply a backend response for request `id`.
    ///
    /// Success replaces the list wholesale, in backend order. Failure
    /// leaves it untouched.
    pub fn apply_response(
        &mut self,
        id: RequestId,
        result: Result<Vec<Suggestion>, BackendError>,
    ) -> ResponseOutcome {
        if id != self.pending_request_id {
            return ResponseOutcome::Stale;
        }
        match result {
            Ok(suggestions) => {
                self.suggestions = suggestions;
                ResponseOutcome::Applied
            }
            Err(e) => ResponseOutcome::Failed(e),
        }
    }

    /// Update the "valid address" flag. Returns whether it changed.
    pub fn set_resolvable(&mut self, resolvable: bool) -> bool {
        let changed = self.resolvable != resolvable;
        self.resolvable = resolvable;
        changed
    }

    /// Pick suggestion `index`.
    ///
    /// On success the field text becomes the suggestion's words and a
    /// new request id is issued so responses still in flight cannot
    /// repopulate the list. State is unchanged on error.
    pub fn select(&mut self, index: usize) -> Result<Suggestion, SelectError> {
        let suggestion = self
            .suggestions
            .get(index)
            .cloned()
            .ok_or(SelectError::IndexOutOfRange {
                index,
                len: self.suggestions.len(),
            })?;
        self.selected_index = Some(index);
        self.current_text = suggestion.words.clone();
        self.pending_request_id = self.pending_request_id.next();
        Ok(suggestion)
    }
}
