//! chateau
//!
//! Everything code generated from a `.chateau` schema needs at runtime, plus
//! the compiler API for build scripts and tools.
//!
//! - `Wire`, `WireReader`, `WireWriter`, `WireError` (re-exported from
//!   `chateau-wire`); generated code imports them from this crate root
//! - `compile_schema`, `compile_files`, `compile_schema_to_rust`
//! - `schema_to_json` for dumping a resolved schema

pub use chateau_wire::{Wire, WireError, WireReader, WireWriter};
pub use chateau_compiler::{
    compile_files, compile_files_to_path, compile_schema, compile_schema_text_to_rust,
    compile_schema_to_rust, CompileError, Schema,
};

/// Render a resolved schema as pretty-printed JSON.
pub fn schema_to_json(schema: &Schema) -> Result<String, CompileError> {
    Ok(serde_json::to_string_pretty(schema)?)
}

pub mod wire {
    pub use chateau_wire::*;
}

pub mod compiler {
    pub use chateau_compiler::*;
}
