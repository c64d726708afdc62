//! Colored report lines for `gdbind` commands.
//!
//! Uses `termcolor`. Respects `NO_COLOR` and the `--color` flag.

use std::io::Write;
use termcolor::{Color, ColorChoice, ColorSpec, StandardStream, WriteColor};

/// Resolve `ColorChoice` from CLI flag and environment.
///
/// Priority: `NO_COLOR` env > `--color` flag > auto-detect TTY.
pub fn resolve_color_choice(flag: Option<&str>) -> ColorChoice {
    if std::env::var_os("NO_COLOR").is_some() {
        return ColorChoice::Never;
    }
    match flag {
        Some("always") => ColorChoice::Always,
        Some("never") => ColorChoice::Never,
        _ => ColorChoice::Auto,
    }
}

/// `  label      count`, label padded so counts line up
pub fn count_cell(label: &str, count: usize) -> (String, String) {
    (format!("  {:<12}", label), format!("{:>5}", count))
}

/// `  kind      description`
pub fn member_cell(kind: &str, description: &str) -> String {
    format!("  {:<9} {}", kind, description)
}

/// Line-oriented report on stdout
pub struct Report {
    stdout: StandardStream,
}

impl Report {
    pub fn new(choice: ColorChoice) -> Self {
        Self {
            stdout: StandardStream::stdout(choice),
        }
    }

    fn write(&mut self, text: &str, spec: &ColorSpec) {
        let _ = self.stdout.set_color(spec);
        let _ = write!(self.stdout, "{}", text);
        let _ = self.stdout.reset();
    }

    fn fg(&mut self, text: &str, color: Option<Color>, bold: bool) {
        let mut spec = ColorSpec::new();
        spec.set_fg(color).set_bold(bold);
        self.write(text, &spec);
    }

    /// Badge line: ` OK  classes.json` or ` FAIL  classes.json`
    pub fn status(&mut self, ok: bool, subject: &str) {
        let (text, bg) = if ok { (" OK ", Color::Green) } else { (" FAIL ", Color::Red) };
        let mut spec = ColorSpec::new();
        spec.set_bg(Some(bg)).set_fg(Some(Color::White)).set_bold(true);
        self.write(text, &spec);
        let _ = writeln!(self.stdout, " {}", subject);
    }

    /// Start a summary row; finish it with [`Report::end_line`]
    pub fn count(&mut self, label: &str, count: usize) {
        let (label, count) = count_cell(label, count);
        let _ = write!(self.stdout, "{}", label);
        self.fg(&count, None, true);
    }

    /// Bold line of its own
    pub fn heading(&mut self, text: &str) {
        self.fg(text, None, true);
        self.end_line();
    }

    /// One bound member, with the declaring class when inherited
    pub fn member(&mut self, kind: &str, description: &str, inherited_from: Option<&str>) {
        let _ = write!(self.stdout, "{}", member_cell(kind, description));
        if let Some(owner) = inherited_from {
            self.note(&format!("[{}]", owner));
        }
        self.end_line();
    }

    /// Secondary detail, dimmed
    pub fn note(&mut self, text: &str) {
        self.fg(&format!("  {}", text), Some(Color::White), false);
    }

    /// Names worth spotting, cyan
    pub fn highlight(&mut self, text: &str) {
        self.fg(&format!("  {}", text), Some(Color::Cyan), false);
    }

    /// Restrictions, yellow
    pub fn caution(&mut self, text: &str) {
        self.fg(&format!("  {}", text), Some(Color::Yellow), true);
    }

    pub fn end_line(&mut self) {
        let _ = writeln!(self.stdout);
    }

    pub fn finish(&mut self) {
        let _ = self.stdout.flush();
    }
}
