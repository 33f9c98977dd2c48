//
//  stash-client
//  output/mod.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! # Output Formatting Module
//!
//! Renders command results either as human-readable tables or as pretty
//! JSON (`--json`).
//!
//! ## Module Structure
//!
//! - `table`: table rendering with `comfy-table`
//! - `json`: JSON serialization
//!
//! ## Traits
//!
//! - [`TableOutput`]: detail view of a single value
//! - [`TableRow`]: one row of a listing table
//!
//! ## Example
//!
//! ```rust,no_run
//! use stash_client::output::{OutputFormat, OutputWriter};
//!
//! let writer = OutputWriter::new(OutputFormat::Json);
//! writer.write_success("Repository created");
//! ```

mod json;
mod table;

pub use json::*;
pub use table::*;

use serde::Serialize;

/// Output format for command results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
}

impl OutputFormat {
    pub fn from_json_flag(json: bool) -> Self {
        if json {
            Self::Json
        } else {
            Self::Table
        }
    }
}

/// Writes command results in the selected format.
pub struct OutputWriter {
    format: OutputFormat,
    color: bool,
}

impl OutputWriter {
    pub fn new(format: OutputFormat) -> Self {
        Self {
            format,
            color: console::colors_enabled(),
        }
    }

    pub fn is_json(&self) -> bool {
        self.format == OutputFormat::Json
    }

    /// Writes a single value: detail view or JSON object.
    pub fn write<T: Serialize + TableOutput>(&self, value: &T) -> anyhow::Result<()> {
        match self.format {
            OutputFormat::Json => write_json(value),
            OutputFormat::Table => {
                value.print_table(self.color);
                Ok(())
            }
        }
    }

    /// Writes a list: one table or a JSON array.
    ///
    /// `empty_message` is printed instead of an empty table.
    pub fn write_list<T: Serialize + TableRow>(
        &self,
        values: &[T],
        empty_message: &str,
    ) -> anyhow::Result<()> {
        match self.format {
            OutputFormat::Json => write_json(&values),
            OutputFormat::Table => {
                if values.is_empty() {
                    self.write_info(empty_message);
                    return Ok(());
                }
                println!("{}", list_table(values, self.color));
                Ok(())
            }
        }
    }

    pub fn write_warning(&self, msg: &str) {
        use console::style;
        if self.color {
            eprintln!("{} {}", style("warning:").yellow().bold(), msg);
        } else {
            eprintln!("warning: {}", msg);
        }
    }

    pub fn write_info(&self, msg: &str) {
        println!("{}", msg);
    }

    /// Success messages go to stderr in JSON mode so stdout stays parseable.
    pub fn write_success(&self, msg: &str) {
        use console::style;
        let line = if self.color {
            format!("{} {}", style("✓").green().bold(), msg)
        } else {
            format!("✓ {}", msg)
        };
        if self.is_json() {
            eprintln!("{line}");
        } else {
            println!("{line}");
        }
    }
}

/// Detail view of a single value.
pub trait TableOutput {
    fn print_table(&self, color: bool);
}

/// One row of a listing table.
pub trait TableRow {
    fn headers() -> Vec<&'static str>;

    fn row(&self, color: bool) -> Vec<String>;
}

pub fn print_header(text: &str) {
    use console::style;
    println!("{}", style(text).bold());
    println!("{}", "-".repeat(text.chars().count()));
}

pub fn print_field(key: &str, value: &str, color: bool) {
    use console::style;
    if color {
        println!("{}: {}", style(key).dim(), value);
    } else {
        println!("{}: {}", key, value);
    }
}
