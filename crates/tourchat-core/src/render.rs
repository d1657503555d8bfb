//! Rich-text tokenizer for bot replies.
//!
//! Bot replies are plain text with two kinds of embedded tokens: literal
//! newlines and tour markers of the form `/tour/<digits>`. [`render`] splits
//! a reply into [`Segment`]s so the host UI can map each variant to its own
//! presentation (a line break, a clickable tour card, a text run).
//!
//! ```
//! use tourchat_core::{render, Segment, TourId};
//!
//! let segments: Vec<_> = render("a\n/tour/42\nb").collect();
//! assert_eq!(
//!     segments,
//!     vec![
//!         Segment::Text("a"),
//!         Segment::LineBreak,
//!         Segment::TourReference(TourId(42)),
//!         Segment::LineBreak,
//!         Segment::Text("b"),
//!     ]
//! );
//! ```

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::LazyLock;

// Literal pattern, covered by `test_token_pattern_compiles`.
#[allow(clippy::expect_used)]
static TOKEN_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\n|/tour/(\d+)").expect("TOKEN_PATTERN regex pattern is valid")
});

/// Numeric identifier of a tour referenced from chat text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TourId(pub u64);

impl TourId {
    /// Site-relative path of the tour detail page.
    pub fn path(&self) -> String {
        format!("/tour/{}", self.0)
    }
}

impl fmt::Display for TourId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One piece of rendered message content.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Segment<'a> {
    /// A run of literal text. Never whitespace-only.
    Text(&'a str),
    /// A line break from a `\n` in the source.
    LineBreak,
    /// A navigable reference to a tour; the marker text itself is not kept.
    TourReference(TourId),
}

/// Lazy iterator over the [`Segment`]s of a message body.
///
/// Cloning restarts nothing; it forks the cursor. Call [`render`] again to
/// start over from the beginning.
#[derive(Debug, Clone)]
pub struct Segments<'a> {
    content: &'a str,
    pos: usize,
    pending: Option<Segment<'a>>,
}

/// Tokenize `content` into display segments.
///
/// Pure function of its input; safe to call on every redraw.
pub fn render(content: &str) -> Segments<'_> {
    Segments {
        content,
        pos: 0,
        pending: None,
    }
}

fn text_segment(text: &str) -> Option<Segment<'_>> {
    if text.trim().is_empty() {
        None
    } else {
        Some(Segment::Text(text))
    }
}

impl<'a> Iterator for Segments<'a> {
    type Item = Segment<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(segment) = self.pending.take() {
                return Some(segment);
            }
            if self.pos >= self.content.len() {
                return None;
            }

            let Some(caps) = TOKEN_PATTERN.captures_at(self.content, self.pos) else {
                let rest = &self.content[self.pos..];
                self.pos = self.content.len();
                return text_segment(rest);
            };

            let whole = caps.get(0)?;
            let before = &self.content[self.pos..whole.start()];
            self.pos = whole.end();

            self.pending = Some(match caps.get(1) {
                None => Segment::LineBreak,
                Some(digits) => match digits.as_str().parse::<u64>() {
                    Ok(id) => Segment::TourReference(TourId(id)),
                    // Too large for an id: keep the marker as literal text.
                    Err(_) => Segment::Text(whole.as_str()),
                },
            });

            if let Some(text) = text_segment(before) {
                return Some(text);
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    fn collect(content: &str) -> Vec<Segment<'_>> {
        render(content).collect()
    }

    #[test]
    fn test_token_pattern_compiles() {
        let pattern = LazyLock::force(&TOKEN_PATTERN);
        assert!(pattern.is_match("/tour/7"));
        assert!(pattern.is_match("\n"));
        assert!(!pattern.is_match("/tours/7"));
    }

    #[test]
    fn test_newlines_and_tour_marker() {
        let segments = collect("a\n/tour/42\nb");
        assert_eq!(
            segments,
            vec![
                Segment::Text("a"),
                Segment::LineBreak,
                Segment::TourReference(TourId(42)),
                Segment::LineBreak,
                Segment::Text("b"),
            ]
        );
        assert!(!segments
            .iter()
            .any(|s| matches!(s, Segment::Text(t) if t.contains("/tour/42"))));
    }

    #[test]
    fn test_plain_text_is_single_segment() {
        assert_eq!(collect("Xin chào!"), vec![Segment::Text("Xin chào!")]);
    }

    #[test]
    fn test_empty_input_yields_nothing() {
        assert!(collect("").is_empty());
    }

    #[test]
    fn test_whitespace_only_runs_are_dropped() {
        let segments = collect("  \n   \n");
        assert_eq!(segments, vec![Segment::LineBreak, Segment::LineBreak]);
    }

    #[test]
    fn test_inline_marker_keeps_surrounding_text() {
        let segments = collect("Xem tour /tour/7 nhé");
        assert_eq!(
            segments,
            vec![
                Segment::Text("Xem tour "),
                Segment::TourReference(TourId(7)),
                Segment::Text(" nhé"),
            ]
        );
    }

    #[test]
    fn test_adjacent_markers() {
        let segments = collect("/tour/1/tour/2");
        assert_eq!(
            segments,
            vec![
                Segment::TourReference(TourId(1)),
                Segment::TourReference(TourId(2)),
            ]
        );
    }

    #[test]
    fn test_marker_without_digits_is_text() {
        assert_eq!(collect("/tour/abc"), vec![Segment::Text("/tour/abc")]);
    }

    #[test]
    fn test_overflowing_id_stays_literal() {
        let segments = collect("/tour/99999999999999999999999");
        assert_eq!(segments, vec![Segment::Text("/tour/99999999999999999999999")]);
    }

    #[test]
    fn test_render_is_restartable() {
        let content = "Tour Đà Lạt\n/tour/15";
        let first: Vec<_> = render(content).collect();
        let second: Vec<_> = render(content).collect();
        assert_eq!(first, second);

        let mut iter = render(content);
        iter.next();
        let forked = iter.clone();
        assert_eq!(iter.collect::<Vec<_>>(), forked.collect::<Vec<_>>());
    }

    #[test]
    fn test_tour_id_path() {
        assert_eq!(TourId(42).path(), "/tour/42");
        assert_eq!(TourId(42).to_string(), "42");
    }
}
