//
//  stash-client
//  output/json.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! JSON output

use std::io::{self, Write};

use serde::Serialize;

/// Writes `value` as pretty JSON to stdout.
pub fn write_json<T: Serialize + ?Sized>(value: &T) -> anyhow::Result<()> {
    let stdout = io::stdout();
    let mut handle = stdout.lock();
    write_json_to(&mut handle, value)
}

/// Writes `value` as pretty JSON followed by a newline.
pub fn write_json_to<W: Write, T: Serialize + ?Sized>(
    writer: &mut W,
    value: &T,
) -> anyhow::Result<()> {
    serde_json::to_writer_pretty(&mut *writer, value)?;
    writeln!(writer)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_write_json_to() {
        let mut buffer = Vec::new();
        write_json_to(&mut buffer, &json!({"key": "PRJ"})).unwrap();
        assert_eq!(String::from_utf8(buffer).unwrap(), "{\n  \"key\": \"PRJ\"\n}\n");
    }
}
