//! Draw the editor overlay over the host screen.

use ratatui::{
    Frame,
    layout::{Constraint, Layout, Position, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Clear, Paragraph, Wrap},
};
use unicode_width::UnicodeWidthStr;

use crate::tui::view::EditorView;

/// Widest key column before paths are clipped.
const MAX_KEY_WIDTH: usize = 40;

/// What: Area of the overlay: 80% of the screen, centered.
#[must_use]
pub fn overlay_area(area: Rect) -> Rect {
    let [_, middle, _] = Layout::vertical([
        Constraint::Percentage(10),
        Constraint::Percentage(80),
        Constraint::Percentage(10),
    ])
    .areas(area);
    let [_, center, _] = Layout::horizontal([
        Constraint::Percentage(10),
        Constraint::Percentage(80),
        Constraint::Percentage(10),
    ])
    .areas(middle);
    center
}

/// What: Render the whole editor frame.
///
/// Inputs:
/// - `f`: Frame to draw into
/// - `view`: View state; its `overlay` field is updated with the drawn area
///
/// Details:
/// - The background shows a short hint; the overlay shows a loading line, the
///   fetch error, or the per-locale tables followed by the alert and key hints.
pub fn ui(f: &mut Frame, view: &mut EditorView) {
    let area = f.area();
    f.render_widget(
        Paragraph::new(Line::from(Span::styled(
            format!(" translator editor  {}", host_label(view)),
            Style::default().add_modifier(Modifier::DIM),
        ))),
        area,
    );
    if !view.session.is_open() {
        view.overlay = None;
        return;
    }

    let rect = overlay_area(area);
    view.overlay = Some(rect);
    f.render_widget(Clear, rect);
    let block = Block::default()
        .title(Span::styled(
            " Translations ",
            Style::default().add_modifier(Modifier::BOLD),
        ))
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded);
    let inner = block.inner(rect);
    f.render_widget(block, rect);

    let [body, footer] =
        Layout::vertical([Constraint::Min(1), Constraint::Length(2)]).areas(inner);

    if view.session.is_loading() {
        f.render_widget(Paragraph::new("Loading translations..."), body);
    } else if let Some(error) = view.session.fetch_error() {
        f.render_widget(
            Paragraph::new(format!("Could not load translations: {error}"))
                .wrap(Wrap { trim: true }),
            body,
        );
    } else {
        render_tables(f, view, body);
    }

    let mut footer_lines = Vec::new();
    if let Some(alert) = view.session.alert() {
        footer_lines.push(Line::from(Span::styled(
            format!("! {alert}"),
            Style::default().add_modifier(Modifier::BOLD | Modifier::REVERSED),
        )));
    }
    footer_lines.push(Line::from(Span::styled(
        hints(view),
        Style::default().add_modifier(Modifier::DIM),
    )));
    f.render_widget(Paragraph::new(footer_lines), footer);
}

fn host_label(view: &EditorView) -> &'static str {
    if view.token.is_some() {
        "(connected)"
    } else {
        "(no csrf-token on host page)"
    }
}

fn hints(view: &EditorView) -> &'static str {
    if view.editing {
        "type to edit  Enter/Esc done  Ctrl+S save"
    } else if view.session.alert().is_some() {
        "Enter/Esc dismiss"
    } else {
        "Up/Down select  Enter edit  Ctrl+S save  Esc close"
    }
}

fn render_tables(f: &mut Frame, view: &EditorView, area: Rect) {
    let key_width = view
        .session
        .tables()
        .iter()
        .flat_map(|t| t.rows.iter())
        .map(|r| r.path.width())
        .max()
        .unwrap_or(0)
        .min(MAX_KEY_WIDTH);

    let mut lines = Vec::new();
    let mut selected_line = 0usize;
    let mut cursor: Option<(usize, u16)> = None;
    let mut flat = 0usize;
    for table in view.session.tables() {
        lines.push(Line::from(Span::styled(
            table.locale.clone(),
            Style::default().add_modifier(Modifier::BOLD | Modifier::UNDERLINED),
        )));
        for row in &table.rows {
            let selected = flat == view.selected;
            let key = pad(&row.path, key_width);
            let marker = if row.is_dirty() { "*" } else { " " };
            let mut value_style = Style::default();
            if selected {
                value_style = value_style.add_modifier(Modifier::REVERSED);
                selected_line = lines.len();
                if view.editing {
                    let before: String = row.input.chars().take(view.caret).collect();
                    let column = key_width + 3 + before.width();
                    cursor = Some((lines.len(), u16::try_from(column).unwrap_or(u16::MAX)));
                }
            }
            let mut spans = vec![
                Span::raw(key),
                Span::raw(format!(" {marker} ")),
                Span::styled(row.input.clone(), value_style),
            ];
            if !row.options_text.is_empty() {
                spans.push(Span::styled(
                    format!("   {}", row.options_text),
                    Style::default().add_modifier(Modifier::DIM),
                ));
            }
            lines.push(Line::from(spans));
            flat += 1;
        }
        lines.push(Line::default());
    }
    if lines.is_empty() {
        lines.push(Line::from("No translations were looked up by the host page."));
    }

    let height = usize::from(area.height.max(1));
    let scroll = selected_line.saturating_sub(height - 1);
    f.render_widget(
        Paragraph::new(lines).scroll((u16::try_from(scroll).unwrap_or(u16::MAX), 0)),
        area,
    );

    if let Some((line, column)) = cursor {
        let y = line - scroll;
        if let (Ok(y), true) = (u16::try_from(y), column < area.width) {
            f.set_cursor_position(Position::new(area.x + column, area.y + y));
        }
    }
}

/// What: Clip or right-pad `text` to `width` display columns.
fn pad(text: &str, width: usize) -> String {
    let mut out = String::new();
    let mut used = 0;
    for c in text.chars() {
        let w = unicode_width::UnicodeWidthChar::width(c).unwrap_or(0);
        if used + w > width {
            break;
        }
        out.push(c);
        used += w;
    }
    out.push_str(&" ".repeat(width - used));
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capture::{Accumulator, Interpolations};
    use ratatui::{Terminal, backend::TestBackend};

    fn buffer_text(term: &Terminal<TestBackend>) -> String {
        let buffer = term.backend().buffer();
        let mut text = String::new();
        for y in 0..buffer.area.height {
            for x in 0..buffer.area.width {
                text.push_str(buffer[(x, y)].symbol());
            }
            text.push('\n');
        }
        text
    }

    #[test]
    /// What: The overlay shows a loading line, then the captured rows.
    fn renders_loading_then_tables() {
        let backend = TestBackend::new(100, 30);
        let mut term = Terminal::new(backend).expect("Failed to create terminal for test");
        let mut view = EditorView::new();
        let ticket = view.session.open();

        term.draw(|f| ui(f, &mut view)).expect("draws");
        assert!(buffer_text(&term).contains("Loading translations..."));
        assert!(view.overlay.is_some());

        let acc = Accumulator::new();
        let mut opts = Interpolations::new();
        opts.insert("name".into(), "Alice".into());
        acc.record("en", "farewell", "Bye %{name}".into(), opts);
        view.session.apply_snapshot(ticket, &acc.snapshot());
        term.draw(|f| ui(f, &mut view)).expect("draws");
        let text = buffer_text(&term);
        assert!(text.contains("farewell"));
        assert!(text.contains("Bye %{name}"));
        assert!(text.contains("%{name} = Alice"));
    }

    #[test]
    /// What: A closed session draws no overlay.
    fn closed_session_has_no_overlay() {
        let backend = TestBackend::new(60, 20);
        let mut term = Terminal::new(backend).expect("Failed to create terminal for test");
        let mut view = EditorView::new();
        view.overlay = Some(Rect::new(0, 0, 1, 1));
        term.draw(|f| ui(f, &mut view)).expect("draws");
        assert!(view.overlay.is_none());
    }

    #[test]
    /// What: Keys are padded and clipped by display width.
    fn pads_by_width() {
        assert_eq!(pad("ab", 4), "ab  ");
        assert_eq!(pad("abcdef", 3), "abc");
        assert_eq!(pad("日本", 3), "日 ");
    }
}
