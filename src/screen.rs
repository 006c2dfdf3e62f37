/// Text layout of a ranked view for a small fixed-font display.
///
/// Produces styled, fixed-width lines; the platform only paints them. The
/// layout fits the 240 px wide landscape ST7789 with a 6 px font.
use core::fmt::Write;

use heapless::{String, Vec};

use crate::aggregate::{RankedView, MAX_RANKED};

/// Characters per display line.
pub const LINE_W: usize = 40;

/// Header, two titles and both lists at their largest.
pub const MAX_LINES: usize = 3 + 2 * MAX_RANKED;

const LABEL_W: usize = 8;
const DEV_W: usize = 17;

pub type LineString = String<LINE_W>;

/// Visual emphasis of a line, mapped to colours by the renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    Header,
    Title,
    Normal,
    Dim,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Line {
    pub tone: Tone,
    pub text: LineString,
}

/// Cut `s` to at most `width` characters, marking a cut with a trailing `.`.
///
/// Width 1 keeps the first character with no marker; width 0 is empty.
pub fn truncate(s: &str, width: usize) -> LineString {
    let width = width.min(LINE_W);
    let mut out = LineString::new();
    if s.chars().count() <= width {
        for c in s.chars() {
            let _ = out.push(c);
        }
        return out;
    }
    match width {
        0 => {}
        1 => {
            if let Some(c) = s.chars().next() {
                let _ = out.push(c);
            }
        }
        _ => {
            for c in s.chars().take(width - 1) {
                let _ = out.push(c);
            }
            let _ = out.push('.');
        }
    }
    out
}

/// Compact age: `42s`, `7m`, `3h`.
pub fn format_age(secs: u32) -> String<8> {
    let mut out = String::new();
    let _ = match secs {
        0..=59 => write!(out, "{}s", secs),
        60..=3599 => write!(out, "{}m", secs / 60),
        _ => write!(out, "{}h", secs / 3600),
    };
    out
}

fn line(lines: &mut Vec<Line, MAX_LINES>, tone: Tone, args: core::fmt::Arguments<'_>) {
    let mut text = LineString::new();
    let _ = text.write_fmt(args);
    let _ = lines.push(Line { tone, text });
}

/// Lay out a ranked view: header, most-seen list, most-recent list.
pub fn render_lines(view: &RankedView) -> Vec<Line, MAX_LINES> {
    let mut lines = Vec::new();

    line(
        &mut lines,
        Tone::Header,
        format_args!(" AIRTALLY  {:>3} active  [{}]", view.active_count, view.filter),
    );

    line(&mut lines, Tone::Title, format_args!(" MOST SEEN"));
    if view.top_by_frequency.is_empty() {
        line(&mut lines, Tone::Dim, format_args!(" ---"));
    }
    for e in &view.top_by_frequency {
        line(
            &mut lines,
            Tone::Normal,
            format_args!(
                " {:<lw$} {:<dw$} {:>4} {:>4}",
                truncate(e.label.as_str(), LABEL_W).as_str(),
                truncate(&e.display, DEV_W).as_str(),
                e.count,
                e.rssi,
                lw = LABEL_W,
                dw = DEV_W,
            ),
        );
    }

    line(&mut lines, Tone::Title, format_args!(" RECENT"));
    if view.top_by_recency.is_empty() {
        line(&mut lines, Tone::Dim, format_args!(" ---"));
    }
    for e in &view.top_by_recency {
        line(
            &mut lines,
            Tone::Normal,
            format_args!(
                " {:<lw$} {:<dw$} {:>4} {:>4}",
                truncate(e.label.as_str(), LABEL_W).as_str(),
                truncate(&e.display, DEV_W).as_str(),
                format_age(e.age_secs).as_str(),
                e.rssi,
                lw = LABEL_W,
                dw = DEV_W,
            ),
        );
    }

    lines
}
