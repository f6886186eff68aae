//! Memory pane: the stack strip, heap node boxes and arrows on a braille canvas
//!
//! Diagram units are terminal cells, so one unit maps to one canvas cell. The
//! canvas y axis points up; rows are flipped when drawing and the vertical
//! scroll offset is subtracted.

use crate::layout::geometry::point;
use crate::layout::measure::wrap_text;
use crate::layout::{Arrow, Point};
use crate::memory::Address;
use crate::run::Diagram;
use crate::ui::theme::DEFAULT_THEME;
use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    symbols::Marker,
    text::{Line as TextLine, Span},
    widgets::canvas::{Canvas, Context, Line, Rectangle},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

/// Length of each arrowhead wing, in cells
const HEAD_WING: f64 = 1.5;

/// The block the memory pane draws in
pub fn memory_block(is_focused: bool, title: String) -> Block<'static> {
    let border_style = if is_focused {
        Style::default()
            .fg(DEFAULT_THEME.border_focused)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(DEFAULT_THEME.border_normal)
    };
    Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(border_style)
}

/// Diagram point under a terminal cell of the pane's inner area
pub fn to_diagram_point(inner: Rect, scroll: usize, column: u16, row: u16) -> Option<Point> {
    let inside = column >= inner.x
        && column < inner.x + inner.width
        && row >= inner.y
        && row < inner.y + inner.height;
    inside.then(|| {
        point(
            f64::from(column - inner.x),
            f64::from(row - inner.y) + scroll as f64,
        )
    })
}

/// Maps diagram coordinates onto the canvas
#[derive(Clone, Copy)]
struct Viewport {
    height: f64,
    scroll: f64,
}

impl Viewport {
    fn y(&self, diagram_y: f64) -> f64 {
        self.height - 1.0 - (diagram_y - self.scroll)
    }

    fn line(&self, from: Point, to: Point, color: Color) -> Line {
        Line {
            x1: from.x,
            y1: self.y(from.y),
            x2: to.x,
            y2: self.y(to.y),
            color,
        }
    }

    fn outline(&self, rect: crate::layout::Rect, color: Color) -> Rectangle {
        Rectangle {
            x: rect.min_x(),
            y: self.y(rect.max_y() - 1.0),
            width: (rect.width() - 1.0).max(0.0),
            height: (rect.height() - 1.0).max(0.0),
            color,
        }
    }

    fn print(&self, ctx: &mut Context, x: f64, y: f64, text: TextLine<'static>) {
        ctx.print(x, self.y(y), text);
    }
}

fn draw_arrow(ctx: &mut Context, view: Viewport, arrow: &Arrow, color: Color) {
    ctx.draw(&view.line(arrow.start, arrow.end, color));

    // The head is a chevron rotated from the body angle
    let head = arrow.head_angle_degrees();
    for wing in [head + 180.0, head + 270.0] {
        let radians = wing.to_radians();
        let tip = point(
            arrow.end.x + radians.cos() * HEAD_WING,
            arrow.end.y + radians.sin() * HEAD_WING,
        );
        ctx.draw(&view.line(arrow.end, tip, color));
    }
}

/// Render the memory pane
pub fn render_memory_pane(
    frame: &mut Frame,
    area: Rect,
    diagram: &Diagram,
    selected: Option<Address>,
    is_focused: bool,
    scroll_offset: &mut usize,
) {
    let inner_height = area.height.saturating_sub(2).max(1) as usize; // Borders
    let total_rows = diagram.extent.height.ceil() as usize;
    let max_scroll = total_rows.saturating_sub(inner_height);
    *scroll_offset = (*scroll_offset).min(max_scroll);

    let title = if max_scroll > 0 {
        format!(" Memory [{}/{}] ", *scroll_offset, max_scroll)
    } else {
        " Memory ".to_string()
    };
    let block = memory_block(is_focused, title);

    if diagram.slots.is_empty() && diagram.nodes.is_empty() {
        let text = if diagram.has_error() {
            "(run failed, see console)"
        } else {
            "(no bindings)"
        };
        let paragraph = Paragraph::new(text)
            .block(block)
            .style(Style::default().fg(DEFAULT_THEME.comment));
        frame.render_widget(paragraph, area);
        return;
    }

    let inner = block.inner(area);
    let width = f64::from(inner.width.max(1));
    let view = Viewport {
        height: f64::from(inner.height.max(1)),
        scroll: *scroll_offset as f64,
    };

    let canvas = Canvas::default()
        .block(block)
        .marker(Marker::Braille)
        .background_color(DEFAULT_THEME.bg)
        .x_bounds([0.0, width - 1.0])
        .y_bounds([0.0, view.height - 1.0])
        .paint(|ctx| {
            // Divider between the stack strip and the heap
            if !diagram.slots.is_empty() {
                let y = diagram.heap_area.min_y() - 0.5;
                let line = view.line(
                    point(0.0, y),
                    point(width - 1.0, y),
                    DEFAULT_THEME.border_normal,
                );
                ctx.draw(&line);
            }

            for connector in &diagram.connectors {
                if connector.arrow.length > 0.0 {
                    draw_arrow(ctx, view, &connector.arrow, DEFAULT_THEME.arrow);
                }
            }
            ctx.layer();

            for slot in &diagram.slots {
                ctx.draw(&view.outline(slot.rect, DEFAULT_THEME.stack_box));
            }
            for node in &diagram.nodes {
                let color = if selected == Some(node.address) {
                    DEFAULT_THEME.selected
                } else {
                    DEFAULT_THEME.primary
                };
                ctx.draw(&view.outline(node.rect, color));
            }
            ctx.layer();

            for slot in &diagram.slots {
                let x = slot.rect.min_x() + 2.0;
                let y = slot.rect.min_y() + 1.0;
                let name = Span::styled(
                    slot.name.clone(),
                    Style::default()
                        .fg(DEFAULT_THEME.fg)
                        .add_modifier(Modifier::BOLD),
                );
                view.print(ctx, x, y, TextLine::from(name));

                let value_color = if slot.address.is_some() {
                    DEFAULT_THEME.address
                } else {
                    DEFAULT_THEME.number
                };
                let encoded = Span::styled(slot.encoded.clone(), Style::default().fg(value_color));
                view.print(ctx, x, y + 1.0, TextLine::from(encoded));
            }

            for node in &diagram.nodes {
                let rect = node.rect;
                let title_style = if selected == Some(node.address) {
                    Style::default()
                        .fg(DEFAULT_THEME.selected)
                        .add_modifier(Modifier::BOLD)
                } else {
                    Style::default().fg(DEFAULT_THEME.address)
                };
                let title = Span::styled(format!(" {} ", node.address), title_style);
                view.print(ctx, rect.min_x() + 1.0, rect.min_y(), TextLine::from(title));

                let columns = (rect.width() - 4.0).max(1.0) as usize;
                let rows = (rect.height() - 2.0).max(0.0) as usize;
                let lines = wrap_text(&node.label, Some(columns));
                for (i, line) in lines.into_iter().take(rows).enumerate() {
                    let span = Span::styled(line, Style::default().fg(DEFAULT_THEME.fg));
                    let y = rect.min_y() + 1.0 + i as f64;
                    view.print(ctx, rect.min_x() + 2.0, y, TextLine::from(span));
                }

                // Self references have no length to draw
                let points_to_self = diagram
                    .connectors
                    .iter()
                    .any(|c| c.to == node.address && c.arrow.length == 0.0);
                if points_to_self {
                    let mark = Span::styled("↺", Style::default().fg(DEFAULT_THEME.arrow));
                    view.print(ctx, rect.max_x() - 2.0, rect.min_y(), TextLine::from(mark));
                }
            }
        });

    frame.render_widget(canvas, area);
}
