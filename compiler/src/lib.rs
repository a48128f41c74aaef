//! chateau-compiler
//!
//! This crate implements:
//!  1) A line scanner for `.chateau` schema files feeding a concurrent
//!     object registry,
//!  2) A field resolver (type grammar, primitive kinds, cross-object
//!     references, duplicate fields, by-value reference cycles),
//!  3) Code generation (`compile_schema_to_rust` → `String`) targeting the
//!     `chateau-wire` runtime,
//!  4) Error types (`CompileError`).

pub mod error;
pub mod types;
pub mod utils;
pub mod registry;
pub mod scanner;
pub mod resolver;
pub mod compiler;
pub mod gen_rust;

pub use compiler::{compile_files, compile_files_to_path, compile_schema, compile_schema_text_to_rust};
pub use error::CompileError;
pub use gen_rust::compile_schema_to_rust;
pub use registry::Registry;
pub use types::{FieldDescriptor, Kind, ObjectDescriptor, ObjectId, PrimitiveKind, Schema, Shape};
