//! Console lines for the CLI: headers, status lines and report sections

use std::sync::OnceLock;

use crate::ui::Icons;
use owo_colors::{OwoColorize, Style};

/// What a piece of console text is for; each maps to one color
#[derive(Debug, Clone, Copy)]
enum Tone {
    Heading,
    Good,
    Bad,
    Caution,
    Label,
    Faint,
}

/// Style for `tone`, or no styling at all when stdout is piped
fn paint(tone: Tone) -> Style {
    static COLORED: OnceLock<bool> = OnceLock::new();
    if !*COLORED.get_or_init(|| console::Term::stdout().is_term()) {
        return Style::new();
    }

    match tone {
        Tone::Heading => Style::new().cyan().bold(),
        Tone::Good => Style::new().green().bold(),
        Tone::Bad => Style::new().red().bold(),
        Tone::Caution => Style::new().yellow().bold(),
        Tone::Label => Style::new().magenta(),
        Tone::Faint => Style::new().white().dimmed(),
    }
}

pub fn header(icon: &str, text: &str) {
    println!("{} {}", icon, text.style(paint(Tone::Heading)));
}

pub fn success(label: &str) {
    println!("{} {}", Icons::CHECK, label.style(paint(Tone::Good)));
}

/// A one-off event the user should see, e.g. "database created"
pub fn notice(label: &str) {
    println!("{} {}", Icons::NEW.style(paint(Tone::Good)), label);
}

pub fn error(label: &str) {
    eprintln!("{} {}", Icons::CROSS, label.style(paint(Tone::Bad)));
}

pub fn warn(label: &str) {
    eprintln!("{} {}", Icons::WARN, label.style(paint(Tone::Caution)));
}

pub fn info(label: &str, value: &str) {
    println!(
        "{} {}: {}",
        Icons::INFO.style(paint(Tone::Label)),
        label.style(paint(Tone::Faint)),
        value
    );
}

pub fn section(icon: &str, title: &str) {
    println!();
    println!("{} ━{}━", icon, title.style(paint(Tone::Heading)));
}

/// Explicit "nothing found" line for queries that legitimately return no rows
pub fn nothing_found(what: &str) {
    println!("{} {}", Icons::EMPTY, what.style(paint(Tone::Faint)));
}
