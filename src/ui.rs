use std::io;

use ratatui::{
    backend::Backend,
    buffer::Buffer,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Paragraph, Widget},
    Terminal,
};
use unicode_width::UnicodeWidthChar;

use crate::render::{Scoreboard, StyledLine, Tone, TAB_SIZE};

/// Height of the big-digit clock
pub const CLOCK_ROWS: u16 = 3;
const CLOCK_INDENT: &str = "    ";

/// Rows needed to draw a board for `split_count` splits: the splits, a
/// blank separator and the clock
pub fn viewport_height(split_count: usize) -> u16 {
    u16::try_from(split_count)
        .unwrap_or(u16::MAX)
        .saturating_add(1 + CLOCK_ROWS)
}

pub fn tone_style(tone: Tone) -> Style {
    match tone {
        Tone::Dimmed => Style::default().fg(Color::DarkGray),
        Tone::Highlighted => Style::default().fg(Color::White),
        Tone::Ahead => Style::default().fg(Color::Green),
        Tone::FarAhead => Style::default().fg(Color::Yellow),
        Tone::Behind => Style::default().fg(Color::Red),
    }
}

pub fn line_style(line: &StyledLine) -> Style {
    let style = tone_style(line.tone);
    if line.emphasized {
        style.bg(Color::Black).add_modifier(Modifier::BOLD)
    } else {
        style
    }
}

/// Replaces tabs with spaces up to the next stop; terminal cells cannot
/// hold a tab
pub fn expand_tabs(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut col = 0;

    for c in text.chars() {
        if c == '\t' {
            let pad = TAB_SIZE - col % TAB_SIZE;
            out.extend(std::iter::repeat(' ').take(pad));
            col += pad;
        } else {
            out.push(c);
            col += c.width().unwrap_or(0);
        }
    }

    out
}

fn glyph(c: char) -> [&'static str; 3] {
    match c {
        '0' => [" _ ", "| |", "|_|"],
        '1' => ["   ", "  |", "  |"],
        '2' => [" _ ", " _|", "|_ "],
        '3' => [" _ ", " _|", " _|"],
        '4' => ["   ", "|_|", "  |"],
        '5' => [" _ ", "|_ ", " _|"],
        '6' => [" _ ", "|_ ", "|_|"],
        '7' => [" _ ", "  |", "  |"],
        '8' => [" _ ", "|_|", "|_|"],
        '9' => [" _ ", "|_|", " _|"],
        ':' => [" ", ".", "."],
        '.' => [" ", " ", "."],
        _ => ["   ", "   ", "   "],
    }
}

/// Three-row segment rendering of a clock string
pub fn big_digits(clock: &str) -> [String; 3] {
    let mut rows: [String; 3] = Default::default();
    for c in clock.chars() {
        for (row, part) in rows.iter_mut().zip(glyph(c)) {
            row.push_str(part);
            row.push(' ');
        }
    }
    rows.map(|row| row.trim_end().to_string())
}

impl Widget for &Scoreboard {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let clock_style = Style::default()
            .fg(Color::White)
            .add_modifier(Modifier::BOLD);

        let mut lines = self
            .lines
            .iter()
            .map(|line| Line::from(Span::styled(expand_tabs(&line.text), line_style(line))))
            .collect::<Vec<Line>>();

        lines.push(Line::default());
        lines.extend(
            big_digits(&self.clock)
                .into_iter()
                .map(|row| Line::from(Span::styled(format!("{CLOCK_INDENT}{row}"), clock_style))),
        );

        Paragraph::new(lines).render(area, buf);
    }
}

/// Redraws the board over the region drawn last time
pub fn draw<B: Backend>(terminal: &mut Terminal<B>, board: &Scoreboard) -> io::Result<()> {
    terminal.draw(|f| f.render_widget(board, f.area()))?;
    Ok(())
}
