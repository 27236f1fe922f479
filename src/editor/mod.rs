//! In-place editor: fetch the captured snapshot, edit it as per-locale tables, submit.
//!
//! [`EditorSession`] holds the overlay state and is driven by a host (the
//! terminal UI in [`crate::tui`]); [`HttpTransport`] talks to the running
//! application.

pub mod session;
pub mod table;
pub mod transport;

pub use session::{CloseReason, EditorSession, FetchTicket, SaveOutcome, SaveRequest, SessionState};
pub use table::{LocaleTable, TableRow, build_tables};
pub use transport::{HttpTransport, extract_csrf_token};
