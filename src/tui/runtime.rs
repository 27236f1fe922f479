//! Event loop of `translator edit`.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crossterm::event::Event as CEvent;
use ratatui::{Terminal, backend::CrosstermBackend};
use tokio::{select, sync::mpsc};

use crate::capture::Snapshot;
use crate::editor::{FetchTicket, HttpTransport, SaveOutcome, SaveRequest};
use crate::tui::render::ui;
use crate::tui::terminal::{restore_terminal, setup_terminal};
use crate::tui::view::{Action, EditorView};

type Result<T> = std::result::Result<T, Box<dyn std::error::Error + Send + Sync>>;

/// Results of background requests, fed back into the loop.
enum Message {
    /// Host page loaded; carries the token it declared.
    PageLoaded(std::result::Result<Option<String>, String>),
    /// Snapshot fetch finished.
    Snapshot(FetchTicket, std::result::Result<Snapshot, String>),
    /// Submission finished.
    Saved(std::result::Result<(), String>),
}

/// What: Spawn the thread forwarding terminal events until cancelled.
///
/// Details:
/// - Polls with a short timeout so the cancel flag is checked regularly.
/// - Exits when the receiver is dropped.
fn spawn_event_thread(event_tx: mpsc::UnboundedSender<CEvent>, cancelled: Arc<AtomicBool>) {
    std::thread::spawn(move || {
        while !cancelled.load(Ordering::Relaxed) {
            match crossterm::event::poll(std::time::Duration::from_millis(50)) {
                Ok(true) => {
                    // ignore transient read errors
                    if let Ok(ev) = crossterm::event::read()
                        && (cancelled.load(Ordering::Relaxed) || event_tx.send(ev).is_err())
                    {
                        break;
                    }
                }
                Ok(false) => {}
                Err(_) => std::thread::sleep(std::time::Duration::from_millis(50)),
            }
        }
    });
}

/// What: Load the host page in the background (a fresh capture pass) and report its token.
fn spawn_page_load(transport: &HttpTransport, tx: &mpsc::UnboundedSender<Message>) {
    let transport = transport.clone();
    let tx = tx.clone();
    tokio::spawn(async move {
        let result = transport
            .discover_csrf_token()
            .await
            .map_err(|e| e.to_string());
        let _ = tx.send(Message::PageLoaded(result));
    });
}

fn spawn_fetch(transport: &HttpTransport, tx: &mpsc::UnboundedSender<Message>, ticket: FetchTicket) {
    let transport = transport.clone();
    let tx = tx.clone();
    tokio::spawn(async move {
        let result = transport.fetch_snapshot().await.map_err(|e| e.to_string());
        let _ = tx.send(Message::Snapshot(ticket, result));
    });
}

fn spawn_save(transport: &HttpTransport, tx: &mpsc::UnboundedSender<Message>, request: SaveRequest) {
    let transport = transport.clone();
    let tx = tx.clone();
    tokio::spawn(async move {
        let result = transport
            .post_submission(&request)
            .await
            .map_err(|e| e.to_string());
        let _ = tx.send(Message::Saved(result));
    });
}

/// What: Open the editor against a running host application until it is closed.
///
/// Inputs:
/// - `transport`: Client for the host page and translator endpoints
///
/// Output:
/// - `Ok(())` once the overlay is closed; `Err` on terminal failures
///
/// Details:
/// - Startup loads the host page (capture pass and token discovery), then opens
///   the session and fetches the snapshot.
/// - A successful save reloads the host page and reopens the session on it.
/// - Closing the overlay, by Esc or a click outside it, ends the program; both
///   are ignored while a save is in flight.
pub async fn run(transport: HttpTransport) -> Result<()> {
    setup_terminal()?;
    let mut terminal = Terminal::new(CrosstermBackend::new(std::io::stdout()))?;
    let outcome = event_loop(&mut terminal, &transport).await;
    restore_terminal()?;
    outcome
}

async fn event_loop(
    terminal: &mut Terminal<CrosstermBackend<std::io::Stdout>>,
    transport: &HttpTransport,
) -> Result<()> {
    let (event_tx, mut event_rx) = mpsc::unbounded_channel::<CEvent>();
    let (msg_tx, mut msg_rx) = mpsc::unbounded_channel::<Message>();
    let cancelled = Arc::new(AtomicBool::new(false));
    spawn_event_thread(event_tx, Arc::clone(&cancelled));

    let mut view = EditorView::new();
    // The overlay is visible while the first page load runs; the fetch waits for it.
    let mut pending = Some(view.session.open());
    spawn_page_load(transport, &msg_tx);

    loop {
        terminal.draw(|f| ui(f, &mut view))?;

        let action = select! {
            Some(ev) = event_rx.recv() => match ev {
                CEvent::Key(ke) => view.handle_key(ke),
                CEvent::Mouse(me) => view.handle_mouse(me),
                _ => Action::None,
            },
            Some(msg) = msg_rx.recv() => {
                match msg {
                    Message::PageLoaded(result) => {
                        match result {
                            Ok(token) => view.token = token,
                            Err(err) => tracing::warn!(error = %err, "host page load failed"),
                        }
                        if let Some(ticket) = pending.take() {
                            spawn_fetch(transport, &msg_tx, ticket);
                        }
                    }
                    Message::Snapshot(ticket, Ok(snapshot)) => {
                        if view.session.apply_snapshot(ticket, &snapshot) {
                            view.reset_cursor();
                        }
                    }
                    Message::Snapshot(ticket, Err(err)) => {
                        view.session.apply_fetch_error(ticket, err);
                    }
                    Message::Saved(result) => {
                        if view.session.finish_save(result) == SaveOutcome::Reload {
                            pending = Some(view.session.open());
                            spawn_page_load(transport, &msg_tx);
                        }
                    }
                }
                Action::None
            }
            else => break,
        };

        match action {
            Action::None => {}
            Action::Save => {
                // A refused save leaves its alert on the session.
                if let Ok(request) = view.session.begin_save(view.token.as_deref()) {
                    spawn_save(transport, &msg_tx, request);
                }
            }
            Action::Closed(reason) => {
                tracing::info!(?reason, "editor closed; exiting");
                break;
            }
        }
    }

    cancelled.store(true, Ordering::Relaxed);
    Ok(())
}
