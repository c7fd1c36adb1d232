use anyhow::Result;
use clap::ValueEnum;
use colored::Colorize;
use comfy_table::{Attribute, Cell, Color as TableColor, Table};
use serde::Serialize;
use std::io::Write;

use crate::theme::{THEME, Tone};

/// Output format options for CLI commands
#[derive(Clone, Debug, ValueEnum, Default, PartialEq)]
pub enum OutputFormat {
    /// Formatted table output (default)
    #[default]
    Table,
    /// JSON output for scripting
    Json,
    /// Compact single-line output
    Compact,
}

/// Global CLI options that affect output and behavior
#[derive(Clone, Debug, Default)]
pub struct GlobalOptions {
    pub output_format: OutputFormat,
    pub quiet: bool,
    pub verbose: bool,
    pub no_color: bool,
}

/// Trait for data that can be displayed as a table
pub trait TableDisplay {
    fn to_table(&self, options: &GlobalOptions) -> Table;
    fn to_compact(&self) -> String;
}

/// Output manager handles formatting and display
pub struct OutputManager {
    pub options: GlobalOptions,
}

impl OutputManager {
    pub fn new(options: GlobalOptions) -> Self {
        Self { options }
    }

    pub fn is_json(&self) -> bool {
        self.options.output_format == OutputFormat::Json
    }

    /// Display data according to the configured output format
    pub fn display<T>(&self, data: &T) -> Result<()>
    where
        T: Serialize + TableDisplay,
    {
        if self.options.quiet {
            return Ok(());
        }

        match self.options.output_format {
            OutputFormat::Json => {
                let json = serde_json::to_string_pretty(data)?;
                println!("{json}");
            }
            OutputFormat::Table => {
                let table = data.to_table(&self.options);
                println!("{table}");
            }
            OutputFormat::Compact => {
                println!("{}", data.to_compact());
            }
        }
        Ok(())
    }

    /// Render `message` with the tone's icon, uncolored when `--no-color` is set.
    fn render(&self, tone: Tone, message: &str) -> String {
        if self.options.no_color {
            return format!("{} {message}", tone.icon());
        }
        match tone {
            Tone::Detail => format!("{} {}", tone.icon().color(tone.color()), message.dimmed()),
            Tone::Progress => format!("{} {}", tone.icon().color(tone.color()).bold(), message.color(tone.color())),
            _ => format!("{} {}", tone.icon().color(tone.color()), message.color(tone.color())),
        }
    }

    fn shows_status(&self) -> bool {
        !self.options.quiet && !self.is_json()
    }

    pub fn success(&self, message: &str) {
        if self.shows_status() {
            println!("{}", self.render(Tone::Success, message));
        }
    }

    /// Errors are printed even in quiet mode.
    pub fn error(&self, message: &str) {
        eprintln!("{}", self.render(Tone::Error, message));
    }

    pub fn warning(&self, message: &str) {
        if !self.options.quiet {
            eprintln!("{}", self.render(Tone::Warning, message));
        }
    }

    /// Display verbose information (only if verbose mode is enabled)
    pub fn verbose(&self, message: &str) {
        if self.options.verbose && !self.options.quiet {
            eprintln!("{}", self.render(Tone::Detail, message));
        }
    }

    pub fn info(&self, message: &str) {
        if self.shows_status() {
            println!("{}", self.render(Tone::Info, message));
        }
    }

    pub fn heading(&self, text: &str) {
        if !self.shows_status() {
            return;
        }
        if self.options.no_color {
            println!("\n{text}\n{}", "=".repeat(text.chars().count()));
        } else {
            println!("\n{}", text.color(THEME.primary).bold());
        }
    }

    /// Display progress indicator
    #[cfg_attr(not(feature = "mongodb"), allow(dead_code))]
    pub fn progress(&self, message: &str) {
        if self.shows_status() {
            print!("\r{}...", self.render(Tone::Progress, message));
            std::io::stdout().flush().ok();
        }
    }

    /// Clear the current line (useful after progress indicators)
    #[cfg_attr(not(feature = "mongodb"), allow(dead_code))]
    pub fn clear_line(&self) {
        if self.shows_status() {
            print!("\r{}\r", " ".repeat(80));
            std::io::stdout().flush().ok();
        }
    }
}

/// Create a themed table
pub fn create_table(options: &GlobalOptions) -> Table {
    let mut table = Table::new();

    if !options.no_color {
        table.load_preset(comfy_table::presets::UTF8_FULL_CONDENSED);
    } else {
        table.load_preset(comfy_table::presets::ASCII_FULL);
    }

    table
}

/// Add themed header to table
pub fn add_table_header(table: &mut Table, options: &GlobalOptions, headers: &[&str]) {
    let header_cells: Vec<Cell> = headers
        .iter()
        .map(|h| {
            let cell = Cell::new(h).add_attribute(Attribute::Bold);
            if options.no_color { cell } else { cell.fg(TableColor::Cyan) }
        })
        .collect();
    table.set_header(header_cells);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Serialize)]
    struct TestData {
        name: String,
        value: i32,
    }

    impl TableDisplay for TestData {
        fn to_table(&self, options: &GlobalOptions) -> Table {
            let mut table = create_table(options);
            add_table_header(&mut table, options, &["Name", "Value"]);
            table.add_row(vec![Cell::new(&self.name), Cell::new(self.value.to_string())]);
            table
        }

        fn to_compact(&self) -> String {
            format!("{}={}", self.name, self.value)
        }
    }

    #[test]
    fn test_output_manager_json() {
        let options = GlobalOptions {
            output_format: OutputFormat::Json,
            ..Default::default()
        };
        let manager = OutputManager::new(options);
        assert!(manager.is_json());
        let data = TestData {
            name: "test".to_string(),
            value: 42,
        };

        assert!(manager.display(&data).is_ok());
    }

    #[test]
    fn test_table_rendering_contains_values() {
        let options = GlobalOptions {
            no_color: true,
            ..Default::default()
        };
        let data = TestData {
            name: "email_idx".to_string(),
            value: 1,
        };
        let rendered = data.to_table(&options).to_string();
        assert!(rendered.contains("email_idx"));
        assert!(rendered.contains("Name"));
    }
}
