//! Plain terminal rendering of a clock card.

use std::io::{self, Write};

use crossterm::{
    cursor::{MoveToColumn, MoveUp},
    queue,
    style::{Color, Print, ResetColor, SetForegroundColor},
    terminal::{Clear, ClearType},
};

use crate::clock::RenderState;
use crate::color::Rgb;
use crate::markup::foreground_text;

fn foreground(color: Rgb) -> SetForegroundColor {
    SetForegroundColor(Color::Rgb {
        r: color.r,
        g: color.g,
        b: color.b,
    })
}

/// Wraps `text` in a 24-bit foreground color.
pub fn paint(text: &str, color: Rgb) -> String {
    let mut out = Vec::new();
    // Writing into memory only fails if a command cannot be encoded.
    if queue!(out, foreground(color), Print(text), ResetColor).is_err() {
        return text.to_string();
    }
    String::from_utf8_lossy(&out).into_owned()
}

/// The foreground text of both lines, right-aligned to a common width.
pub fn plain_lines(state: &RenderState) -> [String; 2] {
    let first = foreground_text(&state.first_line).unwrap_or_default();
    let second = foreground_text(&state.second_line).unwrap_or_default();
    let width = first.chars().count().max(second.chars().count());
    [
        format!("{:>width$}", first, width = width),
        format!("{:>width$}", second, width = width),
    ]
}

/// Redraws a card in place. After the first call the cursor is moved back up
/// over the previous two lines before drawing.
pub struct TerminalCard<W: Write> {
    out: W,
    color: bool,
    drawn: bool,
}

impl<W: Write> TerminalCard<W> {
    pub fn new(out: W, color: bool) -> Self {
        Self {
            out,
            color,
            drawn: false,
        }
    }

    pub fn draw(&mut self, state: &RenderState) -> io::Result<()> {
        if self.drawn {
            queue!(self.out, MoveUp(2))?;
        }
        for line in plain_lines(state) {
            queue!(self.out, MoveToColumn(0), Clear(ClearType::CurrentLine))?;
            if self.color {
                queue!(self.out, foreground(state.color), Print(line), ResetColor)?;
            } else {
                queue!(self.out, Print(line))?;
            }
            queue!(self.out, Print("\n"))?;
        }
        self.drawn = true;
        self.out.flush()
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

/// Whether to emit color, honoring `NO_COLOR`.
pub fn color_enabled() -> bool {
    std::env::var_os("NO_COLOR").is_none()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::markup::render_line;

    fn state() -> RenderState {
        RenderState {
            first_line: render_line("14:05", true),
            second_line: render_line("Mon, Oct 19", false),
            color: Rgb::new(255, 122, 69),
        }
    }

    #[test]
    fn test_paint() {
        assert_eq!(
            paint("14:05", Rgb::new(1, 2, 3)),
            "\x1b[38;2;1;2;3m14:05\x1b[0m"
        );
    }

    #[test]
    fn test_plain_lines_are_right_aligned() {
        assert_eq!(
            plain_lines(&state()),
            ["      14:05".to_string(), "Mon, Oct 19".to_string()]
        );
        assert_eq!(
            plain_lines(&RenderState::default()),
            [String::new(), String::new()]
        );
    }

    #[test]
    fn test_redraw_moves_cursor_up() {
        let mut card = TerminalCard::new(Vec::new(), false);
        card.draw(&state()).unwrap();
        card.draw(&state()).unwrap();
        let out = String::from_utf8(card.into_inner()).unwrap();

        assert_eq!(out.matches("\x1b[2A").count(), 1);
        assert_eq!(out.matches("Mon, Oct 19").count(), 2);
        assert!(!out.contains("38;2"));
    }

    #[test]
    fn test_colored_draw() {
        let mut card = TerminalCard::new(Vec::new(), true);
        card.draw(&state()).unwrap();
        let out = String::from_utf8(card.into_inner()).unwrap();
        assert_eq!(out.matches("\x1b[38;2;255;122;69m").count(), 2);
    }
}
