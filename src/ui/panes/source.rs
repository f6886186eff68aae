//! Source code pane rendering with syntax highlighting
//!
//! Shows the snippet being visualized, line-numbered, with the line of a
//! failed run highlighted. A small character scanner applies styles; it does
//! not need the real lexer because highlighting must survive invalid input.

use crate::ui::theme::DEFAULT_THEME;
use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

/// Syntax highlighting for one line of JavaScript
pub fn highlight_line(line: &str) -> Line<'static> {
    let chars: Vec<char> = line.chars().collect();
    let text = |from: usize, to: usize| chars[from..to].iter().collect::<String>();
    let mut spans = Vec::new();
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];

        // Comments run to the end of the line
        if c == '/' && matches!(chars.get(i + 1), Some('/') | Some('*')) {
            spans.push(Span::styled(
                text(i, chars.len()),
                Style::default().fg(DEFAULT_THEME.comment),
            ));
            break;
        }

        if c == '"' || c == '\'' {
            let mut end = i + 1;
            while end < chars.len() && chars[end] != c {
                end += if chars[end] == '\\' { 2 } else { 1 };
            }
            let end = (end + 1).min(chars.len());
            spans.push(Span::styled(text(i, end), Style::default().fg(DEFAULT_THEME.string)));
            i = end;
            continue;
        }

        if c.is_ascii_digit() {
            let mut end = i;
            while end < chars.len() && (chars[end].is_ascii_alphanumeric() || chars[end] == '.') {
                end += 1;
            }
            spans.push(Span::styled(text(i, end), Style::default().fg(DEFAULT_THEME.number)));
            i = end;
            continue;
        }

        if c.is_alphabetic() || c == '_' || c == '$' {
            let mut end = i;
            while end < chars.len()
                && (chars[end].is_alphanumeric() || chars[end] == '_' || chars[end] == '$')
            {
                end += 1;
            }
            let word = text(i, end);
            let is_call = chars[end..].iter().find(|c| !c.is_whitespace()) == Some(&'(');
            let style = word_style(&word, is_call);
            spans.push(Span::styled(word, style));
            i = end;
            continue;
        }

        let style = match c {
            '{' | '}' | '(' | ')' | '[' | ']' => Style::default().fg(DEFAULT_THEME.primary),
            _ => Style::default().fg(DEFAULT_THEME.fg),
        };
        spans.push(Span::styled(c.to_string(), style));
        i += 1;
    }

    Line::from(spans)
}

fn word_style(word: &str, is_call: bool) -> Style {
    match word {
        "let" | "const" | "var" | "typeof" => Style::default()
            .fg(DEFAULT_THEME.keyword)
            .add_modifier(Modifier::BOLD),
        "true" | "false" | "null" | "undefined" | "NaN" | "Infinity" => {
            Style::default().fg(DEFAULT_THEME.number)
        }
        _ if is_call => Style::default().fg(DEFAULT_THEME.function),
        _ => Style::default().fg(DEFAULT_THEME.fg),
    }
}

/// Render the source code pane
pub fn render_source_pane(
    frame: &mut Frame,
    area: Rect,
    source_code: &str,
    error_line: Option<usize>,
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
        .title(" Source ")
        .borders(Borders::ALL)
        .border_style(border_style);

    let lines: Vec<&str> = source_code.lines().collect();
    let visible_height = area.height.saturating_sub(2).max(1) as usize; // Borders

    if lines.len() > visible_height {
        *scroll_offset = (*scroll_offset).min(lines.len() - visible_height);
    } else {
        *scroll_offset = 0;
    }

    let visible_lines: Vec<Line> = lines
        .iter()
        .enumerate()
        .skip(*scroll_offset)
        .take(visible_height)
        .map(|(idx, line)| {
            let line_num = idx + 1;
            let is_error = error_line == Some(line_num);

            let num_style = if is_error {
                Style::default()
                    .fg(DEFAULT_THEME.error)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(DEFAULT_THEME.comment)
            };

            let mut content = highlight_line(line);
            if is_error {
                let error_style = Style::default()
                    .bg(DEFAULT_THEME.error)
                    .fg(Color::White)
                    .add_modifier(Modifier::BOLD);
                for span in &mut content.spans {
                    span.style = error_style;
                }
            }

            let mut spans = vec![Span::styled(format!("{:4} ", line_num), num_style)];
            spans.extend(content.spans);
            Line::from(spans)
        })
        .collect();

    let paragraph = Paragraph::new(visible_lines).block(block);
    frame.render_widget(paragraph, area);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn texts(line: &Line) -> Vec<String> {
        line.spans.iter().map(|s| s.content.to_string()).collect()
    }

    #[test]
    fn test_highlight_splits_tokens() {
        let line = highlight_line("let s = 'a b'; // note");
        assert_eq!(
            texts(&line),
            vec!["let", " ", "s", " ", "=", " ", "'a b'", ";", " ", "// note"]
        );
        assert_eq!(line.spans[0].style.fg, Some(DEFAULT_THEME.keyword));
        assert_eq!(line.spans[6].style.fg, Some(DEFAULT_THEME.string));
        assert_eq!(line.spans[9].style.fg, Some(DEFAULT_THEME.comment));
    }

    #[test]
    fn test_highlight_calls_and_unicode() {
        let line = highlight_line("console.log(\"é\", 1.5)");
        assert_eq!(line.spans[2].content, "log");
        assert_eq!(line.spans[2].style.fg, Some(DEFAULT_THEME.function));
        assert!(texts(&line).contains(&"\"é\"".to_string()));
        assert!(texts(&line).contains(&"1.5".to_string()));
    }

    #[test]
    fn test_unterminated_string() {
        let line = highlight_line("let s = 'abc");
        assert_eq!(line.spans.last().unwrap().content, "'abc");
    }
}
