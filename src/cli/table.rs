//! Two-column tag/value tables for the terminal.

/// Width of the tag column.
const TAG_WIDTH: usize = 22;
/// Values wrap past this many characters.
const VALUE_WIDTH: usize = 46;
const RULE_WIDTH: usize = 72;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Paint {
    Bold,
    Dim,
    Green,
}

impl Paint {
    fn apply(self, text: &str) -> String {
        let code = match self {
            Self::Bold => "\x1b[1m",
            Self::Dim => "\x1b[2m",
            Self::Green => "\x1b[32m",
        };
        format!("{code}{text}\x1b[0m")
    }
}

/// How rows are coloured.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    /// Values read back from a file.
    Plain,
    /// Values this run generated and embedded.
    Generated,
}

/// Accumulates table lines; [`Table::render`] joins them for printing.
#[derive(Debug)]
pub struct Table {
    tone: Tone,
    lines: Vec<String>,
}

impl Table {
    pub fn new(tone: Tone) -> Self {
        Self { tone, lines: Vec::new() }
    }

    /// File banner: bold label, then a double rule.
    pub fn banner(&mut self, label: &str, value: &str) -> &mut Self {
        self.lines.push(format!("{} {value}", Paint::Bold.apply(label)));
        self.lines.push(Paint::Dim.apply(&"═".repeat(RULE_WIDTH)));
        self
    }

    pub fn heading(&mut self, title: &str) -> &mut Self {
        self.lines.push(format!("  {}", Paint::Bold.apply(title)));
        self.rule()
    }

    pub fn rule(&mut self) -> &mut Self {
        self.lines.push(format!("  {}", Paint::Dim.apply(&"─".repeat(RULE_WIDTH))));
        self
    }

    pub fn note(&mut self, text: &str) -> &mut Self {
        self.lines.push(format!("  {}", Paint::Dim.apply(text)));
        self
    }

    pub fn blank(&mut self) -> &mut Self {
        self.lines.push(String::new());
        self
    }

    pub fn row(&mut self, tag: &str, value: &str) -> &mut Self {
        let rendered = render_row(tag, value);
        match self.tone {
            Tone::Plain => self.lines.extend(rendered),
            Tone::Generated => self
                .lines
                .extend(rendered.iter().map(|line| Paint::Green.apply(line))),
        }
        self
    }

    /// A headed group of rows. Absent values are left out, and a group with
    /// nothing present is left out entirely.
    pub fn section(&mut self, title: &str, fields: &[(&str, Option<String>)]) -> &mut Self {
        if fields.iter().all(|(_, value)| value.is_none()) {
            return self;
        }
        self.heading(title);
        for (tag, value) in fields {
            if let Some(value) = value {
                self.row(tag, value);
            }
        }
        self.blank()
    }

    pub fn render(&self) -> String {
        self.lines.join("\n")
    }
}

/// Uncoloured lines for one row; continuation lines align under the value.
fn render_row(tag: &str, value: &str) -> Vec<String> {
    let continuation = " ".repeat(TAG_WIDTH + 3);
    wrap(value, VALUE_WIDTH)
        .into_iter()
        .enumerate()
        .map(|(i, line)| match i {
            0 => format!("  {tag:<TAG_WIDTH$} : {line}"),
            _ => format!("  {continuation}{line}"),
        })
        .collect()
}

/// Greedy word wrap measured in characters. Words longer than `width` are
/// split across lines.
fn wrap(value: &str, width: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut line = String::new();
    let mut used = 0;

    for piece in value.split_whitespace().flat_map(|word| split_long(word, width)) {
        let len = piece.chars().count();
        if used > 0 && used + 1 + len > width {
            lines.push(std::mem::take(&mut line));
            used = 0;
        }
        if used > 0 {
            line.push(' ');
            used += 1;
        }
        line.push_str(piece);
        used += len;
    }
    if used > 0 || lines.is_empty() {
        lines.push(line);
    }
    lines
}

fn split_long(word: &str, width: usize) -> Vec<&str> {
    let mut pieces = Vec::new();
    let mut rest = word;
    while let Some((cut, _)) = rest.char_indices().nth(width) {
        let (head, tail) = rest.split_at(cut);
        pieces.push(head);
        rest = tail;
    }
    pieces.push(rest);
    pieces
}

#[cfg(test)]
mod tests {
    use super::*;

    // ── wrap ─────────────────────────────────────────────────────────────

    #[test]
    fn wraps_at_word_boundaries() {
        assert_eq!(
            wrap("Copyright 2024 Jane Doe", 15),
            vec!["Copyright 2024", "Jane Doe"]
        );
    }

    #[test]
    fn width_counts_characters_not_bytes() {
        // 13 characters, 15 bytes.
        assert_eq!(wrap("Zürich Straße", 13), vec!["Zürich Straße"]);
    }

    #[test]
    fn overlong_words_are_split() {
        assert_eq!(
            wrap("beach,summer,sunset,holiday", 10),
            vec!["beach,summ", "er,sunset,", "holiday"]
        );
    }

    #[test]
    fn blank_value_keeps_one_line() {
        assert_eq!(wrap("   ", 10), vec![String::new()]);
    }

    // ── rows ─────────────────────────────────────────────────────────────

    #[test]
    fn continuation_lines_align_under_value() {
        let text = "a long description of a sunset over the beach at the end of summer";
        let lines = render_row("ImageDescription", text);
        assert!(lines.len() > 1);
        let value_column = lines[0].find(" : ").unwrap() + 3;
        assert_eq!(value_column, 2 + TAG_WIDTH + 3);
        for line in &lines[1..] {
            assert_eq!(line.len() - line.trim_start().len(), value_column);
        }
    }

    #[test]
    fn generated_rows_are_green() {
        let mut table = Table::new(Tone::Generated);
        table.row("Make", "Canon");
        assert_eq!(
            table.render(),
            format!("\x1b[32m  {:<22} : Canon\x1b[0m", "Make")
        );
    }

    #[test]
    fn empty_sections_are_skipped() {
        let mut table = Table::new(Tone::Plain);
        table.section("GPS", &[("GPSLatitude", None), ("GPSLongitude", None)]);
        assert!(table.render().is_empty());

        table.section("Camera", &[("Make", Some("Canon".into())), ("Model", None)]);
        let out = table.render();
        assert!(out.contains("Make"));
        assert!(!out.contains("Model"));
    }
}
