use crate::utils::quote;
use std::num::ParseIntError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CompileError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("I/O error on {}: {source}", quote(.path))]
    File {
        path:   String,
        #[source]
        source: std::io::Error,
    },

    #[error("The object {} is defined twice", quote(.name))]
    DuplicateObject {
        name: String,
    },

    #[error("{file}:{line}: the object {} is never closed", quote(.name))]
    UnterminatedBlock {
        file: String,
        name: String,
        line: usize,
    },

    #[error("{file}:{line}: malformed object header {}", quote(.text))]
    MalformedObjectHeader {
        file: String,
        line: usize,
        text: String,
    },

    #[error("{file}:{line}: malformed package declaration {}", quote(.text))]
    MalformedPackage {
        file: String,
        line: usize,
        text: String,
    },

    #[error("line {line}: expected \"<type> <name>\" but found {} in object {}", quote(.text), quote(.object))]
    MalformedField {
        object: String,
        line:   usize,
        text:   String,
    },

    #[error("line {line}: the field {} is declared twice in object {}", quote(.field), quote(.object))]
    DuplicateField {
        object: String,
        field:  String,
        line:   usize,
    },

    #[error("line {line}: invalid array length {} in object {}: {source}", quote(.literal), quote(.object))]
    ParseLength {
        object:  String,
        line:    usize,
        literal: String,
        #[source]
        source:  ParseIntError,
    },

    #[error("line {line}: array length {length} in object {} is larger than {max}", quote(.object))]
    ArrayTooLong {
        object: String,
        line:   usize,
        length: u64,
        max:    u64,
    },

    #[error("line {line}: the type {} is not defined for field {} in object {}", quote(.type_name), quote(.field), quote(.object))]
    UnknownType {
        object:    String,
        field:     String,
        type_name: String,
        line:      usize,
    },

    #[error("Recursive nesting of {} is not allowed", .path.join(" -> "))]
    CyclicReference {
        path: Vec<String>,
    },

    #[error("The objects {} and {} both become the Rust type {}", quote(.first), quote(.second), quote(.rust_name))]
    TypeNameCollision {
        first:     String,
        second:    String,
        rust_name: String,
    },

    #[error("The object {} becomes the Rust type {}, which is empty or used by generated code", quote(.object), quote(.rust_name))]
    ReservedTypeName {
        object:    String,
        rust_name: String,
    },

    #[error("line {line}: the fields {} and {} in object {} both become {} in Rust", quote(.first), quote(.second), quote(.object), quote(.rust_name))]
    FieldNameCollision {
        object:    String,
        first:     String,
        second:    String,
        rust_name: String,
        line:      usize,
    },

    #[error("conflicting package declarations {} and {}", quote(.first), quote(.second))]
    ConflictingPackage {
        first:  String,
        second: String,
    },
}

impl CompileError {
    /// Wraps an I/O error with the path it happened on.
    pub fn file(path: impl Into<String>, source: std::io::Error) -> Self {
        Self::File {
            path: path.into(),
            source,
        }
    }
}
