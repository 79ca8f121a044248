//! Segment-display markup.
//!
//! Each line is rendered twice: a crisp foreground layer with the real text and
//! a dim placeholder layer where every digit is `8` and every letter is `B`, the
//! way unlit segments bleed through on a physical display. Colons are wrapped in
//! separator spans so they can be styled (and blinked) on their own.

use crate::clock::RenderState;

pub const SEPARATOR: char = ':';

const FOREGROUND_OPEN: &str = r#"<div class="foreground">"#;
const PLACEHOLDER_OPEN: &str = r#"<div class="placeholder">"#;
const CLOSE: &str = "</div>";

/// Layout and animation rules for the markup produced here.
pub const STYLESHEET: &str = r#".retro-clock {
  padding-right: 8px;
  text-align: right;
  font-family: 'digital-7', monospace;
}
.retro-clock .line {
  position: relative;
}
.retro-clock .foreground {
  display: inline-block;
  position: relative;
  z-index: 100;
}
.retro-clock .placeholder {
  display: inline-block;
  position: absolute;
  top: 0;
  left: 0;
  right: 0;
  z-index: 50;
  opacity: 0.1;
  text-shadow: none;
}
.retro-clock .separator {
  font-weight: 300;
}
.retro-clock .first-line {
  font-size: 2em;
  line-height: 1em;
}
.retro-clock .second-line {
  font-size: 1em;
  line-height: 1em;
}
@keyframes blink {
  0%, 49% { opacity: 1; }
  50%, 100% { opacity: 0; }
}
.retro-clock .blink {
  animation: blink 2s steps(1) infinite;
}
"#;

/// Replaces digits with `8` and ASCII letters with `B`, leaving everything
/// else where it is.
pub fn placeholder(text: &str) -> String {
    text.chars()
        .map(|c| {
            if c.is_ascii_digit() {
                '8'
            } else if c.is_ascii_alphabetic() {
                'B'
            } else {
                c
            }
        })
        .collect()
}

/// Escapes `text` and wraps every colon in a separator span.
pub fn wrap_separators(text: &str, blink: bool) -> String {
    let separator = if blink {
        r#"<span class="separator blink">:</span>"#
    } else {
        r#"<span class="separator">:</span>"#
    };

    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            SEPARATOR => out.push_str(separator),
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
    out
}

/// Foreground container followed by the placeholder container. Only the
/// foreground separators ever blink.
pub fn render_line(text: &str, blink: bool) -> String {
    format!(
        "{}{}{}{}{}{}",
        FOREGROUND_OPEN,
        wrap_separators(text, blink),
        CLOSE,
        PLACEHOLDER_OPEN,
        wrap_separators(&placeholder(text), false),
        CLOSE
    )
}

/// Plain text of the foreground layer of a rendered line.
pub fn foreground_text(line: &str) -> Option<String> {
    layer_text(line, FOREGROUND_OPEN)
}

/// Plain text of the placeholder layer of a rendered line.
pub fn placeholder_text(line: &str) -> Option<String> {
    layer_text(line, PLACEHOLDER_OPEN)
}

fn layer_text(line: &str, open: &str) -> Option<String> {
    let start = line.find(open)? + open.len();
    let len = line[start..].find(CLOSE)?;
    Some(unescape(&strip_tags(&line[start..start + len])))
}

fn strip_tags(markup: &str) -> String {
    let mut out = String::with_capacity(markup.len());
    let mut in_tag = false;
    for c in markup.chars() {
        match c {
            '<' => in_tag = true,
            '>' => in_tag = false,
            c if !in_tag => out.push(c),
            _ => {}
        }
    }
    out
}

fn unescape(text: &str) -> String {
    text.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&amp;", "&")
}

/// The whole clock card: both lines, colored and glowing with the ambient
/// color.
pub fn render_card(state: &RenderState) -> String {
    format!(
        concat!(
            r#"<div class="retro-clock" style="color: {}; text-shadow: {};">"#,
            r#"<div class="line first-line">{}</div>"#,
            r#"<div class="line second-line">{}</div>"#,
            "</div>"
        ),
        state.color.to_hex(),
        state.color.glow(),
        state.first_line,
        state.second_line
    )
}

/// A standalone HTML page showing the card.
pub fn render_document(state: &RenderState) -> String {
    format!(
        "<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n<style>\nbody {{ background: #000; }}\n{}</style>\n</head>\n<body>\n{}\n</body>\n</html>\n",
        STYLESHEET,
        render_card(state)
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::Rgb;

    #[test]
    fn test_placeholder_replaces_digits_and_letters() {
        assert_eq!(placeholder("14:05"), "88:88");
        assert_eq!(placeholder("Mon, Oct 19"), "BBB, BBB 88");
        assert_eq!(placeholder("2:05 PM"), "8:88 BB");
    }

    #[test]
    fn test_placeholder_keeps_other_characters_in_place() {
        let input = "Mär 3. – 12:00!";
        let output = placeholder(input);
        assert_eq!(input.chars().count(), output.chars().count());
        for (a, b) in input.chars().zip(output.chars()) {
            if !a.is_ascii_alphanumeric() {
                assert_eq!(a, b);
            }
        }
        assert_eq!(output, "BäB 8. – 88:88!");
    }

    #[test]
    fn test_no_separators_without_colons() {
        assert_eq!(wrap_separators("Mon, Oct 19", false), "Mon, Oct 19");
        let line = render_line("Mon, Oct 19", true);
        assert!(!line.contains("separator"));
        assert!(!line.contains("blink"));
    }

    #[test]
    fn test_every_colon_wrapped_once_in_both_layers() {
        let line = render_line("12:34:56", false);
        assert_eq!(line.matches(r#"<span class="separator">:</span>"#).count(), 4);
        assert_eq!(line.matches(':').count(), 4);
    }

    #[test]
    fn test_blink_only_on_foreground() {
        let line = render_line("14:05", true);
        let placeholder_start = line.find(PLACEHOLDER_OPEN).unwrap();
        let (foreground, placeholder) = line.split_at(placeholder_start);

        assert_eq!(foreground.matches("separator blink").count(), 1);
        assert!(!placeholder.contains("blink"));
        assert_eq!(placeholder.matches("separator").count(), 1);

        let steady = render_line("14:05", false);
        assert!(!steady.contains("blink"));
    }

    #[test]
    fn test_render_line_layout() {
        assert_eq!(
            render_line("1:2", false),
            concat!(
                r#"<div class="foreground">1<span class="separator">:</span>2</div>"#,
                r#"<div class="placeholder">8<span class="separator">:</span>8</div>"#
            )
        );
    }

    #[test]
    fn test_render_line_is_deterministic() {
        assert_eq!(render_line("23:59", true), render_line("23:59", true));
    }

    #[test]
    fn test_layer_text_round_trips() {
        let line = render_line("14:05", true);
        assert_eq!(foreground_text(&line).as_deref(), Some("14:05"));
        assert_eq!(placeholder_text(&line).as_deref(), Some("88:88"));
    }

    #[test]
    fn test_text_is_escaped() {
        let line = render_line("<b>&", false);
        assert!(line.contains("&lt;b&gt;&amp;"));
        assert_eq!(foreground_text(&line).as_deref(), Some("<b>&"));
        assert_eq!(placeholder_text(&line).as_deref(), Some("<B>&"));
    }

    #[test]
    fn test_render_card_applies_color() {
        let state = RenderState {
            first_line: render_line("14:05", false),
            second_line: render_line("Mon, Oct 19", false),
            color: Rgb::new(255, 0, 0),
        };
        let card = render_card(&state);
        assert!(card.starts_with(r#"<div class="retro-clock" style="color: #ff0000;"#));
        assert!(card.contains(r#"<div class="line first-line"><div class="foreground">14"#));
        assert!(card.contains(r#"<div class="line second-line">"#));

        let document = render_document(&state);
        assert!(document.contains("@keyframes blink"));
        assert!(document.contains(&card));
    }
}
