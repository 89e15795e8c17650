//! Terminal output for flowbuild commands.
//!
//! Status lines go to stdout behind a colored symbol, problems go to stderr.
//! With `-o json` a command prints a single JSON document instead.

use anyhow::Context;
use clap::ValueEnum;
use owo_colors::{OwoColorize, Stream, Style};

#[derive(Debug, Clone, Copy, Default, ValueEnum)]
pub enum OutputFormat {
  #[default]
  Text,
  Json,
}

impl OutputFormat {
  pub fn is_json(self) -> bool {
    matches!(self, OutputFormat::Json)
  }
}

pub mod symbols {
  pub const SUCCESS: &str = "✓";
  pub const ERROR: &str = "✗";
  pub const WARNING: &str = "⚠";
  pub const INFO: &str = "•";
  pub const ARROW: &str = "→";
}

/// How a listed file or package changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Change {
  Added,
  Updated,
  Removed,
}

impl Change {
  fn symbol(self) -> &'static str {
    match self {
      Change::Added => "+",
      Change::Updated => "~",
      Change::Removed => "-",
    }
  }

  fn style(self) -> Style {
    match self {
      Change::Added => Style::new().green(),
      Change::Updated => Style::new().yellow(),
      Change::Removed => Style::new().red(),
    }
  }
}

fn styled(text: &str, stream: Stream, style: Style) -> String {
  text.if_supports_color(stream, |s| s.style(style)).to_string()
}

/// First twelve characters of a hash.
pub fn short_hash(hash: &str) -> &str {
  hash.get(..12).unwrap_or(hash)
}

pub fn print_success(message: &str) {
  println!("{} {}", styled(symbols::SUCCESS, Stream::Stdout, Style::new().green()), message);
}

pub fn print_info(message: &str) {
  println!("{} {}", styled(symbols::INFO, Stream::Stdout, Style::new().blue()), message);
}

pub fn print_warning(message: &str) {
  let style = Style::new().yellow();
  eprintln!(
    "{} {}",
    styled(symbols::WARNING, Stream::Stderr, style),
    styled(message, Stream::Stderr, style)
  );
}

pub fn print_error(message: &str) {
  let style = Style::new().red();
  eprintln!(
    "{} {}",
    styled(symbols::ERROR, Stream::Stderr, style),
    styled(message, Stream::Stderr, style)
  );
}

/// Indented `label: value` line under a status line.
pub fn print_detail(label: &str, value: &str) {
  println!("  {}: {}", styled(label, Stream::Stdout, Style::new().dimmed()), value);
}

/// Indented `+ item` line.
pub fn print_change(change: Change, item: &str) {
  println!("  {} {}", styled(change.symbol(), Stream::Stdout, change.style()), item);
}

pub fn print_json<T: serde::Serialize>(value: &T) -> anyhow::Result<()> {
  let json = serde_json::to_string_pretty(value).context("Failed to serialize to JSON")?;
  println!("{}", json);
  Ok(())
}
