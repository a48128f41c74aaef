use crate::{
    error::CompileError,
    types::{FieldDescriptor, Kind, ObjectDescriptor, ObjectId, Schema, Shape},
};
use std::collections::HashMap;

/// Type names the generated code refers to besides the schema's own.
const RESERVED_TYPE_NAMES: [&str; 7] = ["String", "Vec", "Result", "Wire", "WireError", "WireReader", "WireWriter"];

/// Converts a schema name to PascalCase. Underscore-separated words are
/// capitalized and joined; a name without underscores only gets its first
/// letter raised, so `HTTPHeader` stays as written.
fn to_pascal_case(s: &str) -> String {
    s.split('_')
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect()
}

/// Converts a schema name to snake_case, keeping acronyms together
/// (`RequestID` becomes `request_id`, `HTTPStatus` becomes `http_status`).
fn to_snake_case(s: &str) -> String {
    let chars: Vec<char> = s.chars().collect();
    let mut snake = String::with_capacity(s.len() + 4);
    for (i, &c) in chars.iter().enumerate() {
        if c.is_uppercase() {
            let prev_lower = i > 0 && !chars[i - 1].is_uppercase() && chars[i - 1] != '_';
            let acronym_end = i > 0
                && chars[i - 1].is_uppercase()
                && chars.get(i + 1).map_or(false, |next| next.is_lowercase());
            if prev_lower || acronym_end {
                snake.push('_');
            }
            snake.extend(c.to_lowercase());
        } else {
            snake.push(c);
        }
    }
    snake
}

/// Escapes Rust reserved keywords by suffixing with an underscore.
fn escape_rust_keyword(s: &str) -> String {
    const KEYWORDS: [&str; 39] = [
        "_", "as", "async", "await", "break", "const", "continue", "crate", "dyn",
        "else", "enum", "extern", "false", "fn", "for", "if", "impl", "in",
        "let", "loop", "match", "mod", "move", "mut", "pub", "ref", "return",
        "self", "Self", "static", "struct", "super", "trait", "true", "type",
        "unsafe", "use", "where", "while",
    ];
    if KEYWORDS.contains(&s) {
        format!("{}_", s)
    } else {
        s.to_string()
    }
}

fn type_name(object: &ObjectDescriptor) -> String {
    escape_rust_keyword(&to_pascal_case(&object.name))
}

fn field_name(field: &FieldDescriptor) -> String {
    escape_rust_keyword(&to_snake_case(&field.name))
}

/// Local binding for a field inside `decode_from`; must not shadow the
/// `reader` parameter.
fn local_name(field: &FieldDescriptor) -> String {
    let name = field_name(field);
    if name == "reader" {
        format!("{}_", name)
    } else {
        name
    }
}

/// Maps a resolved field to its Rust type.
fn map_type(schema: &Schema, field: &FieldDescriptor) -> String {
    let element = match field.kind {
        Kind::Primitive(kind) => kind.rust_type().to_string(),
        Kind::Object(id) => type_name(schema.object(id)),
    };
    match field.shape {
        Shape::Scalar => element,
        Shape::FixedArray(len) => format!("[{}; {}]", element, len),
        Shape::Sequence => format!("Vec<{}>", element),
    }
}

/// Fields in wire order: everything but sequences in declaration order,
/// then the sequences in declaration order.
fn wire_order(object: &ObjectDescriptor) -> impl Iterator<Item = &FieldDescriptor> {
    let fixed = object.fields.iter().filter(|f| f.is_inline());
    let growable = object.fields.iter().filter(|f| !f.is_inline());
    fixed.chain(growable)
}

/// Rejects schemas whose names would not survive the mapping to Rust:
/// objects that share a type name or take one the generated code already
/// uses, and fields of one object that share a field or local name.
pub fn check_rust_names(schema: &Schema) -> Result<(), CompileError> {
    let mut types: HashMap<String, &str> = HashMap::new();
    for object in schema.objects() {
        let rust_name = type_name(object);
        if rust_name.is_empty() || RESERVED_TYPE_NAMES.contains(&rust_name.as_str()) {
            return Err(CompileError::ReservedTypeName {
                object: object.name.clone(),
                rust_name,
            });
        }
        if let Some(first) = types.insert(rust_name.clone(), &object.name) {
            return Err(CompileError::TypeNameCollision {
                first: first.to_string(),
                second: object.name.clone(),
                rust_name,
            });
        }

        let mappings: [fn(&FieldDescriptor) -> String; 2] = [field_name, local_name];
        for mapping in mappings {
            let mut fields: HashMap<String, &str> = HashMap::new();
            for field in &object.fields {
                let rust_name = mapping(field);
                if let Some(first) = fields.insert(rust_name.clone(), &field.name) {
                    return Err(CompileError::FieldNameCollision {
                        object: object.name.clone(),
                        first: first.to_string(),
                        second: field.name.clone(),
                        rust_name,
                        line: field.line,
                    });
                }
            }
        }
    }
    Ok(())
}

/// Compiles a resolved schema into Rust source: one struct per object, an
/// inherent `encode`/`decode` pair and a `Wire` implementation.
pub fn compile_schema_to_rust(schema: &Schema) -> String {
    let mut rust_code: Vec<String> = Vec::new();

    rust_code.push("// Code generated by chateau. DO NOT EDIT.".to_string());
    rust_code.push("".to_string());

    if let Some(name) = &schema.package {
        rust_code.push(format!("pub mod {} {{", escape_rust_keyword(&to_snake_case(name))));
    }

    rust_code.push("use chateau::{Wire, WireError, WireReader, WireWriter};".to_string());
    rust_code.push("".to_string());

    let min_lens = schema.min_encoded_lens();
    for id in schema.ids() {
        rust_code.push(generate_struct(schema, id));
        rust_code.push(generate_inherent_impl(schema, id));
        rust_code.push(generate_wire_impl(schema, id, min_lens[id.index()]));
    }

    if schema.package.is_some() {
        rust_code.push("}".to_string());
    }

    let mut out = rust_code.join("\n");
    out.push('\n');
    out
}

/// Generates the record definition, fields in declaration order.
fn generate_struct(schema: &Schema, id: ObjectId) -> String {
    let object = schema.object(id);
    let fields: Vec<String> = object
        .fields
        .iter()
        .map(|field| format!("    pub {}: {},\n", field_name(field), map_type(schema, field)))
        .collect();

    format!(
        "#[derive(Debug, Clone, PartialEq)]\npub struct {} {{\n{}}}\n",
        type_name(object),
        fields.concat()
    )
}

fn generate_inherent_impl(schema: &Schema, id: ObjectId) -> String {
    let object = schema.object(id);
    let mut lines = Vec::new();

    lines.push(format!("impl {} {{", type_name(object)));
    lines.push("    /// Encodes this record into a new buffer.".to_string());
    lines.push("    pub fn encode(&self) -> Result<Vec<u8>, WireError> {".to_string());
    lines.push("        let mut writer = WireWriter::new();".to_string());
    lines.push("        self.encode_to(&mut writer)?;".to_string());
    lines.push("        Ok(writer.into_bytes())".to_string());
    lines.push("    }".to_string());
    lines.push("".to_string());
    lines.push("    /// Decodes a record from the start of `buffer`.".to_string());
    lines.push("    pub fn decode(buffer: &[u8]) -> Result<Self, WireError> {".to_string());
    lines.push("        let mut reader = WireReader::new(buffer);".to_string());
    lines.push("        Self::decode_from(&mut reader)".to_string());
    lines.push("    }".to_string());
    lines.push("}".to_string());
    lines.push("".to_string());

    lines.join("\n")
}

fn generate_wire_impl(schema: &Schema, id: ObjectId, min_len: usize) -> String {
    let object = schema.object(id);
    let mut lines = Vec::new();

    lines.push(format!("impl Wire for {} {{", type_name(object)));
    lines.push(format!("    const MIN_ENCODED_LEN: usize = {};", min_len));
    lines.push("".to_string());

    lines.push("    fn encode_to(&self, writer: &mut WireWriter) -> Result<(), WireError> {".to_string());
    if object.fields.is_empty() {
        lines.push("        let _ = writer;".to_string());
    }
    for field in wire_order(object) {
        lines.push(format!("        self.{}.encode_to(writer)?;", field_name(field)));
    }
    lines.push("        Ok(())".to_string());
    lines.push("    }".to_string());
    lines.push("".to_string());

    lines.push("    fn decode_from(reader: &mut WireReader<'_>) -> Result<Self, WireError> {".to_string());
    lines.push("        reader.ensure(Self::MIN_ENCODED_LEN)?;".to_string());
    for field in wire_order(object) {
        lines.push(format!(
            "        let {} = <{} as Wire>::decode_from(reader)?;",
            local_name(field),
            map_type(schema, field)
        ));
    }
    lines.push("        Ok(Self {".to_string());
    for field in &object.fields {
        let (name, local) = (field_name(field), local_name(field));
        if name == local {
            lines.push(format!("            {},", name));
        } else {
            lines.push(format!("            {}: {},", name, local));
        }
    }
    lines.push("        })".to_string());
    lines.push("    }".to_string());
    lines.push("}".to_string());
    lines.push("".to_string());

    lines.join("\n")
}
