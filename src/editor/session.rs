//! Editor session state machine.
//!
//! ```text
//! Closed --open--> Open --snapshot--> Loaded --begin_save--> Saving --ok--> (reload)
//!                   |                   |                      |
//!                   +------close--------+                      +--failed--> Loaded
//! ```
//!
//! Snapshot results are matched against the [`FetchTicket`] issued by
//! `open`; a result arriving after `close` (or after a newer `open`) is
//! dropped instead of building tables on a torn-down overlay.

use crate::capture::Snapshot;
use crate::editor::table::{LocaleTable, TableRow, build_tables};
use crate::error::EditorError;
use crate::submission::EditSubmission;

/// Where the session is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// No overlay.
    Closed,
    /// Overlay visible, snapshot outstanding (or failed).
    Open,
    /// Tables built and editable.
    Loaded,
    /// Submission in flight.
    Saving,
}

impl SessionState {
    const fn label(self) -> &'static str {
        match self {
            Self::Closed => "closed",
            Self::Open => "still loading",
            Self::Loaded => "loaded",
            Self::Saving => "already saving",
        }
    }
}

/// Why the overlay was closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloseReason {
    /// Click on the overlay background outside the edit surface.
    BackgroundClick,
    /// Escape / cancel key.
    Escape,
}

/// Identifies one snapshot fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchTicket {
    generation: u64,
}

/// Everything the transport needs to submit the edits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaveRequest {
    /// Anti-forgery token discovered on the host page.
    pub token: String,
    /// Every row's current input, keyed by locale then path.
    pub submission: EditSubmission,
}

/// Result of a finished save.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveOutcome {
    /// Saved; the host page must be reloaded to start a fresh capture pass.
    Reload,
    /// Not saved; the session is back to `Loaded` and can retry.
    Failed(String),
}

/// One editor overlay instance with its own state; no globals.
#[derive(Debug)]
pub struct EditorSession {
    state: SessionState,
    generation: u64,
    tables: Vec<LocaleTable>,
    key_listener: bool,
    fetch_error: Option<String>,
    alert: Option<String>,
}

impl Default for EditorSession {
    fn default() -> Self {
        Self::new()
    }
}

impl EditorSession {
    /// What: Closed session.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            state: SessionState::Closed,
            generation: 0,
            tables: Vec::new(),
            key_listener: false,
            fetch_error: None,
            alert: None,
        }
    }

    /// What: Current lifecycle state.
    #[must_use]
    pub const fn state(&self) -> SessionState {
        self.state
    }

    /// What: Whether the overlay is showing (any state but `Closed`).
    #[must_use]
    pub fn is_open(&self) -> bool {
        self.state != SessionState::Closed
    }

    /// What: Whether the overlay waits for its snapshot.
    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.state == SessionState::Open && self.fetch_error.is_none()
    }

    /// What: Whether the escape-key listener is registered.
    #[must_use]
    pub const fn key_listener_active(&self) -> bool {
        self.key_listener
    }

    /// What: Tables built from the last accepted snapshot.
    #[must_use]
    pub fn tables(&self) -> &[LocaleTable] {
        &self.tables
    }

    /// What: Message of a failed snapshot fetch, if any.
    #[must_use]
    pub fn fetch_error(&self) -> Option<&str> {
        self.fetch_error.as_deref()
    }

    /// What: Pending user-visible alert.
    #[must_use]
    pub fn alert(&self) -> Option<&str> {
        self.alert.as_deref()
    }

    /// What: Dismiss the pending alert.
    pub fn dismiss_alert(&mut self) {
        self.alert = None;
    }

    /// What: Show the overlay and start a snapshot fetch.
    ///
    /// Output:
    /// - Ticket to hand back with the fetch result
    ///
    /// Details:
    /// - Opening again invalidates any fetch still outstanding.
    pub fn open(&mut self) -> FetchTicket {
        self.generation += 1;
        self.state = SessionState::Open;
        self.tables.clear();
        self.fetch_error = None;
        self.alert = None;
        self.key_listener = true;
        tracing::debug!(generation = self.generation, "editor opened");
        FetchTicket {
            generation: self.generation,
        }
    }

    fn is_current(&self, ticket: FetchTicket) -> bool {
        ticket.generation == self.generation && self.state == SessionState::Open
    }

    /// What: Build the tables from a fetched snapshot.
    ///
    /// Output:
    /// - `false` when the result is late (overlay closed or reopened) and was ignored
    pub fn apply_snapshot(&mut self, ticket: FetchTicket, snapshot: &Snapshot) -> bool {
        if !self.is_current(ticket) {
            tracing::debug!("ignoring late translations snapshot");
            return false;
        }
        self.tables = build_tables(snapshot);
        self.state = SessionState::Loaded;
        tracing::debug!(locales = self.tables.len(), "editor tables built");
        true
    }

    /// What: Record a failed snapshot fetch; the overlay stays open and empty.
    ///
    /// Output:
    /// - `false` when the failure belongs to a stale fetch
    pub fn apply_fetch_error(&mut self, ticket: FetchTicket, message: impl Into<String>) -> bool {
        if !self.is_current(ticket) {
            return false;
        }
        let message = message.into();
        tracing::warn!(error = %message, "translations snapshot fetch failed");
        self.fetch_error = Some(message);
        true
    }

    /// What: Tear the overlay down and release the key listener.
    ///
    /// Output:
    /// - `false` when already closed, or while a save is in flight (the overlay stays up)
    pub fn close(&mut self, reason: CloseReason) -> bool {
        match self.state {
            SessionState::Closed => return false,
            SessionState::Saving => {
                tracing::debug!(?reason, "close ignored while saving");
                return false;
            }
            SessionState::Open | SessionState::Loaded => {}
        }
        tracing::debug!(?reason, "editor closed");
        self.generation += 1;
        self.state = SessionState::Closed;
        self.tables.clear();
        self.fetch_error = None;
        self.key_listener = false;
        true
    }

    /// What: Total rows over all tables.
    #[must_use]
    pub fn row_count(&self) -> usize {
        self.tables.iter().map(|t| t.rows.len()).sum()
    }

    /// What: Row at a flat index across tables, with its locale.
    #[must_use]
    pub fn row(&self, index: usize) -> Option<(&str, &TableRow)> {
        let mut rest = index;
        for table in &self.tables {
            if rest < table.rows.len() {
                return Some((table.locale.as_str(), &table.rows[rest]));
            }
            rest -= table.rows.len();
        }
        None
    }

    /// What: Replace the input of the row at a flat index.
    ///
    /// Output:
    /// - `false` when not `Loaded` or the index is out of range
    pub fn set_input(&mut self, index: usize, value: impl Into<String>) -> bool {
        if self.state != SessionState::Loaded {
            return false;
        }
        let mut rest = index;
        for table in &mut self.tables {
            if rest < table.rows.len() {
                table.rows[rest].input = value.into();
                return true;
            }
            rest -= table.rows.len();
        }
        false
    }

    /// What: Replace the input of `path` in `locale`.
    ///
    /// Output:
    /// - `false` when not `Loaded` or the row does not exist
    pub fn edit(&mut self, locale: &str, path: &str, value: impl Into<String>) -> bool {
        if self.state != SessionState::Loaded {
            return false;
        }
        let row = self
            .tables
            .iter_mut()
            .filter(|t| t.locale == locale)
            .flat_map(|t| t.rows.iter_mut())
            .find(|r| r.path == path);
        match row {
            Some(row) => {
                row.input = value.into();
                true
            }
            None => false,
        }
    }

    /// What: Current inputs as a submission; every row is included.
    #[must_use]
    pub fn submission(&self) -> EditSubmission {
        let mut submission = EditSubmission::new();
        for table in &self.tables {
            for row in &table.rows {
                submission.insert(&table.locale, &row.path, row.input.clone());
            }
        }
        submission
    }

    /// What: Start saving.
    ///
    /// Inputs:
    /// - `token`: Anti-forgery token found on the host page, if any
    ///
    /// Output:
    /// - Request for the transport; the session moves to `Saving`
    ///
    /// # Errors
    /// - `EditorError::MissingCsrfToken` when no token was found; an alert is raised
    ///   and nothing is submitted
    /// - `EditorError::NotLoaded` when there are no tables to save
    pub fn begin_save(&mut self, token: Option<&str>) -> Result<SaveRequest, EditorError> {
        if self.state != SessionState::Loaded {
            return Err(EditorError::NotLoaded(self.state.label()));
        }
        let Some(token) = token.map(str::trim).filter(|t| !t.is_empty()) else {
            let err = EditorError::MissingCsrfToken;
            tracing::warn!("refusing to save: {err}");
            self.alert = Some(err.to_string());
            return Err(err);
        };
        self.state = SessionState::Saving;
        Ok(SaveRequest {
            token: token.to_string(),
            submission: self.submission(),
        })
    }

    /// What: Conclude a save started with `begin_save`.
    ///
    /// Details:
    /// - Success keeps the state `Saving` until the caller reloads and reopens.
    /// - Failure returns to `Loaded` with the edits intact and raises an alert.
    pub fn finish_save(&mut self, result: Result<(), String>) -> SaveOutcome {
        match result {
            Ok(()) => {
                tracing::info!("translations saved; reloading host page");
                SaveOutcome::Reload
            }
            Err(message) => {
                tracing::warn!(error = %message, "saving translations failed");
                if self.state == SessionState::Saving {
                    self.state = SessionState::Loaded;
                }
                self.alert = Some(message.clone());
                SaveOutcome::Failed(message)
            }
        }
    }
}
