//! Console pane rendering: captured output, the completion value and errors

use crate::run::Diagnostic;
use crate::ui::theme::DEFAULT_THEME;
use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    widgets::{Block, Borders, List, ListItem, Padding, Paragraph},
    Frame,
};

/// Render the console pane
pub fn render_console_pane(
    frame: &mut Frame,
    area: Rect,
    diagnostics: &[Diagnostic],
    is_focused: bool,
    scroll_offset: &mut usize,
) {
    let border_style = if is_focused {
        Style::default()
            .fg(DEFAULT_THEME.border_focused)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(DEFAULT_THEME.border_normal)
    };

    let block = Block::default()
        .title(" Console ")
        .borders(Borders::ALL)
        .border_style(border_style);

    if diagnostics.is_empty() {
        let paragraph = Paragraph::new("(no output)")
            .block(block)
            .style(Style::default().fg(DEFAULT_THEME.comment));
        frame.render_widget(paragraph, area);
        return;
    }

    let block = block.padding(Padding::new(1, 0, 0, 0));

    // Multi-line log entries (pretty-printed objects) become several rows
    let all_items: Vec<ListItem> = diagnostics
        .iter()
        .flat_map(|diagnostic| {
            let style = match diagnostic {
                Diagnostic::Log(_) => Style::default().fg(DEFAULT_THEME.fg),
                Diagnostic::Result(_) => Style::default().fg(DEFAULT_THEME.success),
                Diagnostic::Error(_) => Style::default()
                    .fg(DEFAULT_THEME.error)
                    .add_modifier(Modifier::BOLD),
            };
            diagnostic
                .to_string()
                .lines()
                .map(|line| ListItem::new(line.to_string()).style(style))
                .collect::<Vec<_>>()
        })
        .collect();

    let total_items = all_items.len();
    let visible_height = area.height.saturating_sub(2).max(1) as usize; // Borders

    if total_items > visible_height {
        let max_scroll = total_items - visible_height;
        *scroll_offset = (*scroll_offset).min(max_scroll);
    } else {
        *scroll_offset = 0;
    }

    let visible_items: Vec<ListItem> = all_items
        .into_iter()
        .skip(*scroll_offset)
        .take(visible_height)
        .collect();

    let list = List::new(visible_items).block(block);
    frame.render_widget(list, area);
}
