use tourchat_core::{render, Message, Role, Segment};
use tourchat_widget::WidgetConfig;

const INDENT: &str = "      ";

/// One transcript entry as terminal text.
///
/// Tour markers become `[tour #id] <link>`; continuation lines are indented
/// under the speaker label.
pub fn format_message(message: &Message, config: &WidgetConfig) -> String {
    let label = match message.role {
        Role::User => "bạn",
        Role::Bot => "bot",
    };
    format!("{label:>4}: {}", format_content(&message.content, config))
}

pub fn format_content(content: &str, config: &WidgetConfig) -> String {
    let mut out = String::new();
    for segment in render(content) {
        match segment {
            Segment::Text(text) => out.push_str(text),
            Segment::LineBreak => {
                out.push('\n');
                out.push_str(INDENT);
            }
            Segment::TourReference(id) => {
                out.push_str(&format!("[tour #{id}] {}", config.tour_url(id)));
            }
        }
    }
    out
}

/// Debug listing of renderer output, one segment per line.
pub fn describe_segments(content: &str) -> Vec<String> {
    render(content)
        .map(|segment| match segment {
            Segment::Text(text) => format!("text {text:?}"),
            Segment::LineBreak => "line-break".to_string(),
            Segment::TourReference(id) => format!("tour {id}"),
        })
        .collect()
}

pub fn format_suggestions(suggestions: &[String]) -> String {
    suggestions
        .iter()
        .enumerate()
        .map(|(i, s)| format!("/{} {s}", i + 1))
        .collect::<Vec<_>>()
        .join("   ")
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    fn config() -> WidgetConfig {
        WidgetConfig {
            site_url: "https://dulich.vn".into(),
            ..WidgetConfig::default()
        }
    }

    #[test]
    fn test_tour_marker_becomes_link() {
        let out = format_content("Xem /tour/42 nhé", &config());
        assert_eq!(out, "Xem [tour #42] https://dulich.vn/tour/42 nhé");
    }

    #[test]
    fn test_line_breaks_are_indented() {
        let msg = Message::bot("a\nb");
        assert_eq!(format_message(&msg, &config()), " bot: a\n      b");
    }

    #[test]
    fn test_describe_segments() {
        assert_eq!(
            describe_segments("a\n/tour/42\nb"),
            vec![
                "text \"a\"",
                "line-break",
                "tour 42",
                "line-break",
                "text \"b\"",
            ]
        );
    }

    #[test]
    fn test_format_suggestions_numbers_from_one() {
        let out = format_suggestions(&["A".to_string(), "B".to_string()]);
        assert_eq!(out, "/1 A   /2 B");
    }
}
