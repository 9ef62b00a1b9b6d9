//! JSON and textual-IR output files.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use inkwell::values::{AnyValue, FunctionValue};
use serde_json::Value;

use crate::driver::DriverError;

/// Incremental writer for the `{"ast":["start", <unit>…, "end"]}` dump.
pub struct AstWriter {
    out: BufWriter<File>,
}

impl AstWriter {
    pub fn create(path: &Path) -> Result<Self, DriverError> {
        let file = File::create(path)
            .map_err(|e| DriverError::new(format!("cannot create {}: {e}", path.display())))?;
        let mut out = BufWriter::new(file);
        out.write_all(b"{\"ast\":[\"start\"")
            .map_err(DriverError::io)?;
        Ok(AstWriter { out })
    }

    /// Append one top-level unit's tree dump.
    pub fn entry(&mut self, unit: &Value) -> Result<(), DriverError> {
        write!(self.out, ",{unit}").map_err(DriverError::io)
    }

    /// Close the array and flush.
    pub fn finish(mut self) -> Result<(), DriverError> {
        self.out.write_all(b",\"end\"]}").map_err(DriverError::io)?;
        self.out.flush().map_err(DriverError::io)
    }
}

/// Appends each successfully lowered function's printed IR, in source
/// order.
pub struct IrWriter {
    out: BufWriter<File>,
}

impl IrWriter {
    pub fn create(path: &Path) -> Result<Self, DriverError> {
        let file = File::create(path)
            .map_err(|e| DriverError::new(format!("cannot create {}: {e}", path.display())))?;
        Ok(IrWriter {
            out: BufWriter::new(file),
        })
    }

    pub fn function(&mut self, function: FunctionValue<'_>) -> Result<(), DriverError> {
        let ir = function.print_to_string().to_string();
        self.out.write_all(ir.as_bytes()).map_err(DriverError::io)
    }

    pub fn finish(mut self) -> Result<(), DriverError> {
        self.out.flush().map_err(DriverError::io)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn temp_path(name: &str) -> std::path::PathBuf {
        let mut path = std::env::temp_dir();
        path.push(format!("pizzac_{}_{name}", std::process::id()));
        path
    }

    #[test]
    fn ast_writer_produces_the_envelope() {
        let path = temp_path("ast.json");
        let mut writer = AstWriter::create(&path).expect("create");
        writer.entry(&json!({ "num": 1.0 })).expect("entry");
        writer.entry(&json!({ "var": "x" })).expect("entry");
        writer.finish().expect("finish");

        let text = std::fs::read_to_string(&path).expect("read back");
        let value: Value = serde_json::from_str(&text).expect("well-formed JSON");
        assert_eq!(
            value,
            json!({ "ast": ["start", { "num": 1.0 }, { "var": "x" }, "end"] })
        );
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn empty_ast_dump_is_still_well_formed() {
        let path = temp_path("ast_empty.json");
        let writer = AstWriter::create(&path).expect("create");
        writer.finish().expect("finish");

        let text = std::fs::read_to_string(&path).expect("read back");
        let value: Value = serde_json::from_str(&text).expect("well-formed JSON");
        assert_eq!(value, json!({ "ast": ["start", "end"] }));
        let _ = std::fs::remove_file(&path);
    }
}
