use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};
use vaultreg_core::{Field, FieldKind, SubmitPhase};

use crate::app::{App, AppState, FormFocus};

use super::styles;

/// Width the field labels are padded to so inputs line up.
const LABEL_WIDTH: usize = 24;

/// Width of the text input box.
const INPUT_WIDTH: usize = 32;

pub fn render(frame: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Title bar
            Constraint::Min(10),   // Form
            Constraint::Length(2), // Status bar
        ])
        .split(frame.area());

    render_title_bar(frame, app, chunks[0]);
    render_form(frame, app, chunks[1]);
    render_status_bar(frame, app, chunks[2]);

    if matches!(app.state, AppState::ConfirmingQuit) {
        render_quit_overlay(frame);
    }
}

fn render_title_bar(frame: &mut Frame, app: &App, area: Rect) {
    let title = "  Vault Registry";
    let endpoint = app.endpoint.as_str();

    let title_line = Line::from(vec![
        Span::styled(title, styles::title_style()),
        Span::raw(" ".repeat(
            (area.width as usize).saturating_sub(title.len() + endpoint.len() + 2),
        )),
        Span::styled(endpoint, styles::muted_style()),
    ]);

    let block = Block::default()
        .borders(Borders::BOTTOM)
        .border_style(styles::muted_style());

    frame.render_widget(Paragraph::new(title_line).block(block), area);
}

fn render_form(frame: &mut Frame, app: &App, area: Rect) {
    let values = app.form.values();
    let mut lines: Vec<Line> = vec![Line::from("")];
    let mut focus_line = 0;

    for field in Field::ALL {
        if !values.is_visible(field) {
            continue;
        }
        let focused = app.focus == FormFocus::Field(field);
        if focused {
            focus_line = lines.len();
        }

        lines.push(field_line(app, field, focused));

        if let Some(error) = app.form.visible_error(field) {
            lines.push(Line::from(vec![
                Span::raw(" ".repeat(LABEL_WIDTH + 3)),
                Span::styled(error.to_string(), styles::error_style()),
            ]));
        }
    }

    lines.push(Line::from(""));
    let submit_focused = app.focus == FormFocus::Submit;
    if submit_focused {
        focus_line = lines.len();
    }
    lines.push(submit_line(app.form.phase(), submit_focused));

    if let Some(banner) = app.form.phase().banner() {
        let style = match app.form.phase() {
            SubmitPhase::Succeeded => styles::success_style(),
            _ => styles::error_style(),
        };
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(format!("  {}", banner), style)));
    }

    // Keep the focused line inside the bordered area
    let inner_height = area.height.saturating_sub(2) as usize;
    let scroll = (focus_line + 2).saturating_sub(inner_height);

    let block = Block::default()
        .title(Span::styled(" Register a New Member ", styles::title_style()))
        .borders(Borders::ALL)
        .border_style(styles::border_style(true));

    let paragraph = Paragraph::new(lines)
        .block(block)
        .scroll((scroll as u16, 0));
    frame.render_widget(paragraph, area);
}

fn field_line(app: &App, field: Field, focused: bool) -> Line<'static> {
    let values = app.form.values();
    let label = Span::styled(
        format!("  {:<width$}", label_text(field), width = LABEL_WIDTH),
        styles::label_style(focused),
    );
    let cursor = if focused { "▌" } else { "" };

    match field.kind() {
        FieldKind::Flag => {
            let checked = values.flag(field).unwrap_or(false);
            Line::from(vec![
                label,
                Span::styled(
                    if checked { " [x]" } else { " [ ]" },
                    styles::input_style(focused),
                ),
            ])
        }
        FieldKind::Choice => {
            let display = match values.selected_group() {
                Some(group) => format!("< {} {} >", group.id(), group.name()),
                None if values.group.is_empty() => "< Select Group >".to_string(),
                None => format!("< {} >", values.group),
            };
            Line::from(vec![
                label,
                Span::raw(" "),
                Span::styled(display, styles::input_style(focused)),
            ])
        }
        FieldKind::Text | FieldKind::Date => {
            let text = values.text(field).unwrap_or_default();
            let mut spans = vec![label, Span::styled("[", styles::muted_style())];
            if text.is_empty() && field.kind() == FieldKind::Date && !focused {
                spans.push(Span::styled(
                    format!("{:<width$}", "YYYY-MM-DD", width = INPUT_WIDTH),
                    styles::muted_style(),
                ));
            } else {
                let shown = tail_chars(text, INPUT_WIDTH);
                spans.push(Span::styled(
                    format!("{:<width$}", format!("{}{}", shown, cursor), width = INPUT_WIDTH),
                    styles::input_style(focused),
                ));
            }
            spans.push(Span::styled("]", styles::muted_style()));
            Line::from(spans)
        }
    }
}

/// Field label, with a `*` on the ones that must be filled in.
fn label_text(field: Field) -> String {
    if field.is_required() {
        format!("{} *", field.label())
    } else {
        field.label().to_string()
    }
}

fn submit_line(phase: &SubmitPhase, focused: bool) -> Line<'static> {
    let submitting = phase.is_submitting();
    let label = if submitting {
        " Submitting... "
    } else if focused {
        " ▶ Submit ◀ "
    } else {
        "   Submit   "
    };
    Line::from(vec![
        Span::raw(" ".repeat(LABEL_WIDTH + 2)),
        Span::raw("["),
        Span::styled(label, styles::button_style(focused, !submitting)),
        Span::raw("]"),
    ])
}

/// Keep the end of long input visible while typing.
fn tail_chars(text: &str, max: usize) -> String {
    let count = text.chars().count();
    // Leave room for the cursor
    let keep = max.saturating_sub(1);
    if count <= keep {
        text.to_string()
    } else {
        text.chars().skip(count - keep).collect()
    }
}

fn render_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    let mut spans = vec![
        Span::styled(" Tab", styles::help_key_style()),
        Span::raw(" next  "),
        Span::styled("Enter", styles::help_key_style()),
        Span::raw(" select  "),
        Span::styled("←/→", styles::help_key_style()),
        Span::raw(" group  "),
        Span::styled("^S", styles::help_key_style()),
        Span::raw(" submit  "),
        Span::styled("^R", styles::help_key_style()),
        Span::raw(" clear  "),
        Span::styled("Esc", styles::help_key_style()),
        Span::raw(" back"),
    ];

    if let Some(ref message) = app.status_message {
        spans.push(Span::styled("  |  ", styles::muted_style()));
        spans.push(Span::styled(message.clone(), styles::highlight_style()));
    }

    let block = Block::default()
        .borders(Borders::TOP)
        .border_style(styles::muted_style());

    let paragraph = Paragraph::new(Line::from(spans))
        .style(styles::status_bar_style())
        .block(block);
    frame.render_widget(paragraph, area);
}

/// Create a centered rectangle with fixed dimensions
fn centered_rect_fixed(width: u16, height: u16, r: Rect) -> Rect {
    let x = r.x + (r.width.saturating_sub(width)) / 2;
    let y = r.y + (r.height.saturating_sub(height)) / 2;
    Rect::new(x, y, width.min(r.width), height.min(r.height))
}

fn render_quit_overlay(frame: &mut Frame) {
    let area = centered_rect_fixed(46, 7, frame.area());

    frame.render_widget(Clear, area);

    let lines = vec![
        Line::from(""),
        Line::from(Span::styled(
            "   Discard this registration and go back?",
            styles::highlight_style(),
        )),
        Line::from(""),
        Line::from(vec![
            Span::styled("   Press ", styles::muted_style()),
            Span::styled("[Y]", styles::help_key_style()),
            Span::styled(" to discard, ", styles::muted_style()),
            Span::styled("[N]", styles::help_key_style()),
            Span::styled(" to keep editing", styles::muted_style()),
        ]),
    ];

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(styles::border_style(true))
        .style(Style::default());

    frame.render_widget(Paragraph::new(lines).block(block), area);
}
