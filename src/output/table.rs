//
//  stash-client
//  output/table.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! Table rendering for listings

use comfy_table::{presets::UTF8_FULL, Cell, Color, ContentArrangement, Table};

use super::TableRow;

pub fn create_table() -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table
}

/// Renders one row per value under `T::headers()`. Headers are cyan when
/// `color` is set.
pub fn list_table<T: TableRow>(values: &[T], color: bool) -> Table {
    let mut table = create_table();
    if color {
        table.set_header(T::headers().into_iter().map(|h| Cell::new(h).fg(Color::Cyan)));
    } else {
        table.set_header(T::headers());
    }
    for value in values {
        table.add_row(value.row(color));
    }
    table
}

/// Colours a pull request or repository state.
pub fn format_status(status: &str, color: bool) -> String {
    if !color {
        return status.to_string();
    }

    use console::style;
    match status.to_lowercase().as_str() {
        "open" | "available" => style(status).green().to_string(),
        "merged" => style(status).blue().to_string(),
        "declined" | "initialisation_failed" => style(status).red().to_string(),
        "initialising" => style(status).yellow().to_string(),
        _ => status.to_string(),
    }
}

pub fn format_bool(value: bool, color: bool) -> String {
    let text = if value { "Yes" } else { "No" };
    if !color {
        return text.to_string();
    }

    use console::style;
    if value {
        style(text).green().to_string()
    } else {
        style(text).dim().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Pair(&'static str, &'static str);

    impl TableRow for Pair {
        fn headers() -> Vec<&'static str> {
            vec!["KEY", "NAME"]
        }

        fn row(&self, _color: bool) -> Vec<String> {
            vec![self.0.to_string(), self.1.to_string()]
        }
    }

    #[test]
    fn test_list_table_renders_rows() {
        let rendered = list_table(&[Pair("PRJ", "Platform"), Pair("OPS", "Operations")], false)
            .to_string();
        assert!(rendered.contains("KEY"));
        assert!(rendered.contains("Platform"));
        assert!(rendered.contains("OPS"));
    }

    #[test]
    fn test_plain_formatting() {
        assert_eq!(format_status("OPEN", false), "OPEN");
        assert_eq!(format_bool(true, false), "Yes");
        assert_eq!(format_bool(false, false), "No");
    }
}
