//! Text measurement for node sizing
//!
//! Node boxes are sized from their rendered label. [`TextMeasurer`] is the
//! seam; [`MonospaceMeasurer`] is the deterministic implementation used by the
//! terminal front-end and by tests.

use super::geometry::{size, Size};
use thiserror::Error;

/// How a label is rendered for measurement
#[derive(Debug, Clone, PartialEq)]
pub struct TextStyle {
    pub font_family: String,
    pub font_size: f64,
    /// Line height as a multiple of the font size
    pub line_height: f64,
    /// Inner padding on every side
    pub padding: f64,
    /// Wrap width of the text itself; `None` never wraps
    pub max_width: Option<f64>,
}

impl TextStyle {
    /// Monospace label style, 0.85rem with 1rem padding, wrapping at 400
    pub fn monospace() -> Self {
        TextStyle {
            font_family: "Monaco, Menlo, Ubuntu Mono, monospace".to_string(),
            font_size: 13.6,
            line_height: 1.2,
            padding: 16.0,
            max_width: Some(400.0),
        }
    }

    /// One unit per character cell
    pub fn terminal() -> Self {
        TextStyle {
            font_family: "monospace".to_string(),
            font_size: 1.0,
            line_height: 1.0,
            padding: 0.0,
            max_width: Some(36.0),
        }
    }
}

impl Default for TextStyle {
    fn default() -> Self {
        Self::monospace()
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum MeasureError {
    #[error("font size must be a positive number, got {0}")]
    InvalidFontSize(f64),

    #[error("wrap width {0} is narrower than one character")]
    WrapTooNarrow(f64),
}

/// Measures rendered text
pub trait TextMeasurer {
    fn measure(&self, text: &str, style: &TextStyle) -> Result<Size, MeasureError>;
}

/// Every character has the same advance width
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MonospaceMeasurer {
    /// Character advance as a multiple of the font size
    pub char_width_factor: f64,
}

impl MonospaceMeasurer {
    pub fn new(char_width_factor: f64) -> Self {
        MonospaceMeasurer { char_width_factor }
    }

    /// One character per unit, for layouts in terminal cells
    pub fn cells() -> Self {
        MonospaceMeasurer::new(1.0)
    }

    /// Characters per line for a style, `None` when the style never wraps
    pub fn columns(&self, style: &TextStyle) -> Result<Option<usize>, MeasureError> {
        if !(style.font_size.is_finite() && style.font_size > 0.0) {
            return Err(MeasureError::InvalidFontSize(style.font_size));
        }
        let Some(max_width) = style.max_width else {
            return Ok(None);
        };
        let columns = (max_width / (style.font_size * self.char_width_factor)).floor();
        if columns.is_nan() || columns < 1.0 {
            return Err(MeasureError::WrapTooNarrow(max_width));
        }
        Ok(Some(columns as usize))
    }
}

impl Default for MonospaceMeasurer {
    fn default() -> Self {
        MonospaceMeasurer::new(0.6)
    }
}

impl TextMeasurer for MonospaceMeasurer {
    fn measure(&self, text: &str, style: &TextStyle) -> Result<Size, MeasureError> {
        let lines = wrap_text(text, self.columns(style)?);
        let widest = lines.iter().map(|l| l.chars().count()).max().unwrap_or(0);

        let width = widest as f64 * style.font_size * self.char_width_factor;
        let height = lines.len() as f64 * style.font_size * style.line_height;
        Ok(size(width + 2.0 * style.padding, height + 2.0 * style.padding))
    }
}

/// Break text into lines of at most `columns` characters.
///
/// Explicit newlines always break. Long lines break after a space where
/// possible; a single word longer than a line is split.
pub fn wrap_text(text: &str, columns: Option<usize>) -> Vec<String> {
    let mut lines = Vec::new();

    for raw in text.split('\n') {
        let Some(limit) = columns.filter(|&limit| raw.chars().count() > limit) else {
            lines.push(raw.to_string());
            continue;
        };

        let mut current = String::new();
        let mut current_len = 0;
        for word in raw.split_inclusive(' ') {
            let mut chars: Vec<char> = word.chars().collect();
            if current_len > 0 && current_len + chars.len() > limit {
                lines.push(current.trim_end().to_string());
                current.clear();
                current_len = 0;
            }
            while chars.len() > limit {
                let rest = chars.split_off(limit);
                lines.push(chars.iter().collect::<String>().trim_end().to_string());
                chars = rest;
            }
            current_len += chars.len();
            current.extend(chars);
        }
        if current_len > 0 {
            lines.push(current.trim_end().to_string());
        }
    }

    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wrap_breaks_after_separators() {
        assert_eq!(wrap_text("[1, 2, 3]", Some(5)), vec!["[1,", "2, 3]"]);
        assert_eq!(wrap_text("[1, 2, 3]", None), vec!["[1, 2, 3]"]);
        assert_eq!(wrap_text("a\nb", Some(10)), vec!["a", "b"]);
    }

    #[test]
    fn test_wrap_splits_long_words() {
        assert_eq!(wrap_text("abcdefgh", Some(3)), vec!["abc", "def", "gh"]);
        assert_eq!(wrap_text("", Some(3)), vec![""]);
    }

    #[test]
    fn test_cell_measurement() {
        let style = TextStyle::terminal();
        let measured = MonospaceMeasurer::cells()
            .measure("\"hello\"", &style)
            .unwrap();
        assert_eq!(measured, size(7.0, 1.0));

        let long = "x ".repeat(30);
        let measured = MonospaceMeasurer::cells().measure(&long, &style).unwrap();
        assert!(measured.width <= 36.0);
        assert_eq!(measured.height, 2.0);
    }

    #[test]
    fn test_pixel_measurement_includes_padding() {
        let style = TextStyle::monospace();
        let measured = MonospaceMeasurer::default().measure("{}", &style).unwrap();
        let char_width = 13.6 * 0.6;
        assert!((measured.width - (2.0 * char_width + 32.0)).abs() < 1e-9);
        assert!((measured.height - (13.6 * 1.2 + 32.0)).abs() < 1e-9);
    }

    #[test]
    fn test_bad_styles_are_errors() {
        let mut style = TextStyle::terminal();
        style.font_size = 0.0;
        assert!(matches!(
            MonospaceMeasurer::cells().measure("x", &style),
            Err(MeasureError::InvalidFontSize(_))
        ));

        let mut style = TextStyle::terminal();
        style.max_width = Some(0.5);
        assert!(matches!(
            MonospaceMeasurer::cells().measure("x", &style),
            Err(MeasureError::WrapTooNarrow(_))
        ));
    }
}
