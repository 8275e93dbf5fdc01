use crate::process::OutputTone;
use crate::store::is_secret_file;
use crate::ui::app::{App, FocusPane};
use crate::ui::dialog::{Field, SettingsDialog};
use crate::ui::theme::Theme;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Wrap},
    Frame,
};

pub fn render(frame: &mut Frame, app: &App) {
    // Header + Body + Footer
    let main_chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(0),
            Constraint::Length(1),
        ])
        .split(frame.area());

    render_header(frame, app, main_chunks[0]);

    let body_chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(40), Constraint::Percentage(60)])
        .split(main_chunks[1]);

    render_tree(frame, app, body_chunks[0]);
    render_output(frame, app, body_chunks[1]);
    render_footer(frame, app, main_chunks[2]);

    if let Some(dialog) = &app.dialog {
        render_dialog(frame, dialog, &app.theme);
    }
}

fn render_header(frame: &mut Frame, app: &App, area: Rect) {
    let theme = &app.theme;
    let mut spans = vec![
        Span::styled(
            " passdeck ",
            Style::default()
                .fg(theme.accent)
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            app.tree.root().display().to_string(),
            Style::default().fg(theme.fg_dim),
        ),
    ];
    if app.is_busy() {
        spans.push(Span::styled(
            "  ⏳ running…",
            Style::default().fg(theme.secondary),
        ));
    }

    let header = Paragraph::new(Line::from(spans))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(theme.accent)),
        )
        .style(Style::default().bg(theme.bg));

    frame.render_widget(header, area);
}

fn render_tree(frame: &mut Frame, app: &App, area: Rect) {
    let theme = &app.theme;
    let dimmed = !app.controls_enabled();

    let items: Vec<ListItem> = app
        .visible_entries()
        .iter()
        .enumerate()
        .map(|(i, entry)| {
            let is_selected = i == app.selected_index;
            let base = if entry.is_dir {
                Style::default().fg(theme.secondary)
            } else if dimmed || !is_secret_file(&entry.path) {
                Style::default().fg(theme.fg_dim)
            } else {
                Style::default().fg(theme.fg)
            };
            let style = if is_selected {
                base.bg(theme.selection_bg).add_modifier(Modifier::BOLD)
            } else {
                base
            };

            let indent = "  ".repeat(entry.depth);
            let icon = if entry.is_dir {
                if app.tree.is_expanded(&entry.path) {
                    "▼ "
                } else {
                    "▶ "
                }
            } else {
                "  "
            };
            ListItem::new(format!("{}{}{}", indent, icon, entry.name)).style(style)
        })
        .collect();

    let border_color = if app.focus == FocusPane::Tree {
        theme.accent
    } else {
        theme.fg_dim
    };

    let list = List::new(items)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" Store ")
                .border_style(Style::default().fg(border_color)),
        )
        .style(Style::default().bg(theme.bg));

    let mut state = ListState::default().with_selected(Some(app.selected_index));
    frame.render_stateful_widget(list, area, &mut state);
}

fn render_output(frame: &mut Frame, app: &App, area: Rect) {
    let theme = &app.theme;
    let color = match app.output.tone() {
        OutputTone::Normal => theme.fg,
        OutputTone::Error => theme.error,
    };

    let text: Vec<Line> = app
        .output
        .lines()
        .map(|line| Line::from(line.to_string()))
        .collect();

    let border_color = if app.focus == FocusPane::Output {
        theme.accent
    } else {
        theme.fg_dim
    };

    let paragraph = Paragraph::new(text)
        .style(Style::default().fg(color).bg(theme.bg))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" Output ")
                .border_style(Style::default().fg(border_color)),
        )
        .wrap(Wrap { trim: false })
        .scroll((u16::try_from(app.output_scroll).unwrap_or(u16::MAX), 0));

    frame.render_widget(paragraph, area);
}

fn render_footer(frame: &mut Frame, app: &App, area: Rect) {
    let theme = &app.theme;
    let footer = if let Some(status) = app.status() {
        Paragraph::new(status.text.clone()).style(Style::default().fg(theme.success))
    } else {
        let help_text = match (app.focus, app.dialog.is_some()) {
            (_, true) => "[↑↓/Tab] Field  [Space] Toggle  [Enter] Save  [Esc] Cancel",
            (FocusPane::Tree, false) => {
                "[↑↓/jk] Navigate  [←→/hl] Collapse/Expand  [Enter] Open  [u] Update  [c] Settings  [Tab] Output  [q] Quit"
            }
            (FocusPane::Output, false) => "[jk] Scroll  [g/G] Top/Bottom  [Tab/Esc] Back",
        };
        Paragraph::new(help_text).style(Style::default().fg(theme.fg_dim))
    };

    frame.render_widget(footer, area);
}

fn render_dialog(frame: &mut Frame, dialog: &SettingsDialog, theme: &Theme) {
    let area = centered_rect(70, Field::ALL.len() as u16 + 4, frame.area());
    frame.render_widget(Clear, area);

    let label_width = Field::ALL
        .iter()
        .map(|f| f.label().len())
        .max()
        .unwrap_or(0);

    let lines: Vec<Line> = Field::ALL
        .iter()
        .map(|&field| {
            let focused = field == dialog.focused();
            let value_style = if focused {
                Style::default()
                    .fg(theme.fg)
                    .bg(theme.selection_bg)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(theme.fg)
            };
            let cursor = if focused && !field.is_toggle() { "▏" } else { "" };
            Line::from(vec![
                Span::styled(
                    format!(" {:width$}  ", field.label(), width = label_width),
                    Style::default().fg(theme.secondary),
                ),
                Span::styled(format!("{}{}", dialog.value(field), cursor), value_style),
            ])
        })
        .collect();

    let paragraph = Paragraph::new(lines)
        .style(Style::default().bg(theme.bg))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" Settings ")
                .border_style(Style::default().fg(theme.accent)),
        );

    frame.render_widget(paragraph, area);
}

/// A rectangle `percent_x` wide and `height` rows tall, centred in `r`.
fn centered_rect(percent_x: u16, height: u16, r: Rect) -> Rect {
    let height = height.min(r.height);
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(r.height.saturating_sub(height) / 2),
            Constraint::Length(height),
            Constraint::Min(0),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical[1])[1]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_centered_rect_fits_inside() {
        let outer = Rect::new(0, 0, 100, 40);
        let inner = centered_rect(70, 12, outer);
        assert_eq!(inner.height, 12);
        assert!(inner.x >= outer.x && inner.right() <= outer.right());
        assert!(inner.y >= outer.y && inner.bottom() <= outer.bottom());
    }

    #[test]
    fn test_centered_rect_clamps_height() {
        let outer = Rect::new(0, 0, 80, 5);
        let inner = centered_rect(70, 12, outer);
        assert!(inner.height <= 5);
    }
}
