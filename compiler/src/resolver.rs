use crate::{
    error::CompileError,
    scanner::IDENTIFIER,
    types::{FieldDescriptor, Kind, ObjectId, PrimitiveKind, RawField, Schema, Shape},
};
use std::collections::HashSet;
use tracing::{debug, info};

pub const SEQUENCE_MARKER: &str = "[]";
pub const ARRAY_OPEN:      char = '[';
pub const ARRAY_CLOSE:     char = ']';

/// Largest fixed array length, the same bound the wire puts on sequences.
pub const MAX_ARRAY_LEN: u64 = u32::MAX as u64;

/// Resolves every object's raw field lines into typed fields, then rejects
/// by-value reference cycles.
///
/// Objects may reference each other in any order; a reference only needs the
/// target to exist, not to be resolved already.
pub fn resolve_schema(schema: &mut Schema) -> Result<(), CompileError> {
    let ids: Vec<ObjectId> = schema.ids().collect();
    for id in ids {
        resolve_object(schema, id)?;
    }
    check_cycles(schema)?;

    info!(
        objects = schema.len(),
        fields = schema.objects().map(|o| o.fields.len()).sum::<usize>(),
        "resolved schema"
    );
    Ok(())
}

/// Resolves a single object. Already resolved objects are left as they are.
pub fn resolve_object(schema: &mut Schema, id: ObjectId) -> Result<(), CompileError> {
    let object = schema.object(id);
    if object.resolved {
        return Ok(());
    }

    let mut seen = HashSet::new();
    let mut fields = Vec::with_capacity(object.raw_fields.len());
    for raw in &object.raw_fields {
        let field = parse_field(schema, &object.name, raw)?;
        if !seen.insert(field.name.clone()) {
            return Err(CompileError::DuplicateField {
                object: object.name.clone(),
                field:  field.name,
                line:   raw.line,
            });
        }
        fields.push(field);
    }
    debug!(object = %object.name, fields = fields.len(), "resolved object");

    let object = schema.object_mut(id);
    object.fields = fields;
    object.resolved = true;
    Ok(())
}

/// Parses `<typeToken> <fieldName>` against the objects known to `schema`.
pub fn parse_field(schema: &Schema, object: &str, raw: &RawField) -> Result<FieldDescriptor, CompileError> {
    let malformed = || CompileError::MalformedField {
        object: object.to_string(),
        line:   raw.line,
        text:   raw.text.clone(),
    };

    let tokens: Vec<&str> = raw.text.split_whitespace().collect();
    let [type_token, name] = tokens[..] else {
        return Err(malformed());
    };
    if !IDENTIFIER.is_match(name) {
        return Err(malformed());
    }

    let (shape, kind_name) = parse_shape(type_token).map_err(|(literal, source)| CompileError::ParseLength {
        object: object.to_string(),
        line:   raw.line,
        literal: literal.to_string(),
        source,
    })?;
    if kind_name.is_empty() {
        return Err(malformed());
    }
    if let Shape::FixedArray(length) = shape {
        if length > MAX_ARRAY_LEN {
            return Err(CompileError::ArrayTooLong {
                object: object.to_string(),
                line:   raw.line,
                length,
                max:    MAX_ARRAY_LEN,
            });
        }
    }

    let kind = match PrimitiveKind::from_token(kind_name) {
        Some(primitive) => Kind::Primitive(primitive),
        None => match schema.lookup(kind_name) {
            Some(target) => Kind::Object(target),
            None => {
                return Err(CompileError::UnknownType {
                    object:    object.to_string(),
                    field:     name.to_string(),
                    type_name: kind_name.to_string(),
                    line:      raw.line,
                })
            }
        },
    };

    Ok(FieldDescriptor {
        name: name.to_string(),
        shape,
        kind,
        line: raw.line,
    })
}

/// Splits a type token into its shape prefix and kind name.
///
/// On a bad array length the offending literal is returned with the parse
/// error. A missing `]` makes the whole remainder the literal.
pub fn parse_shape(token: &str) -> Result<(Shape, &str), (&str, std::num::ParseIntError)> {
    if let Some(kind) = token.strip_prefix(SEQUENCE_MARKER) {
        return Ok((Shape::Sequence, kind));
    }
    let Some(rest) = token.strip_prefix(ARRAY_OPEN) else {
        return Ok((Shape::Scalar, token));
    };
    let (literal, kind) = match rest.find(ARRAY_CLOSE) {
        Some(close) => (&rest[..close], &rest[close + 1..]),
        None => (rest, ""),
    };
    let len = literal.parse::<u64>().map_err(|e| (literal, e))?;
    Ok((Shape::FixedArray(len), kind))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Visit {
    Unvisited,
    InProgress,
    Done,
}

/// Rejects objects that contain themselves by value, directly or through
/// other objects. References through a sequence do not count.
pub fn check_cycles(schema: &Schema) -> Result<(), CompileError> {
    let mut state = vec![Visit::Unvisited; schema.len()];
    let mut path = Vec::new();
    for id in schema.ids() {
        visit(schema, id, &mut state, &mut path)?;
    }
    Ok(())
}

fn visit(
    schema: &Schema,
    id: ObjectId,
    state: &mut [Visit],
    path: &mut Vec<ObjectId>,
) -> Result<(), CompileError> {
    match state[id.index()] {
        Visit::Done => return Ok(()),
        Visit::InProgress => {
            let start = path.iter().position(|p| *p == id).unwrap_or(0);
            let path = path[start..]
                .iter()
                .chain(std::iter::once(&id))
                .map(|p| schema.object(*p).name.clone())
                .collect();
            return Err(CompileError::CyclicReference { path });
        }
        Visit::Unvisited => {}
    }

    state[id.index()] = Visit::InProgress;
    path.push(id);
    for field in &schema.object(id).fields {
        if let (true, Kind::Object(target)) = (field.is_inline(), field.kind) {
            visit(schema, target, state, path)?;
        }
    }
    path.pop();
    state[id.index()] = Visit::Done;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{registry::Registry, scanner::scan_source};

    fn schema(text: &str) -> Schema {
        let registry = Registry::new();
        let summary = scan_source("test.chateau", text, &registry).unwrap();
        registry.finish(summary.package)
    }

    fn resolved(text: &str) -> Result<Schema, CompileError> {
        let mut schema = schema(text);
        resolve_schema(&mut schema)?;
        Ok(schema)
    }

    fn field(schema: &Schema, object: &str, index: usize) -> FieldDescriptor {
        schema.get(object).unwrap().fields[index].clone()
    }

    #[test]
    fn shapes() {
        assert_eq!(parse_shape("[]uint32").unwrap(), (Shape::Sequence, "uint32"));
        assert_eq!(parse_shape("[16]byte").unwrap(), (Shape::FixedArray(16), "byte"));
        assert_eq!(parse_shape("[0]bool").unwrap(), (Shape::FixedArray(0), "bool"));
        assert_eq!(parse_shape("string").unwrap(), (Shape::Scalar, "string"));
        assert_eq!(parse_shape("[x]byte").unwrap_err().0, "x");
        assert_eq!(parse_shape("[-1]byte").unwrap_err().0, "-1");
        assert_eq!(parse_shape("[16byte").unwrap_err().0, "16byte");
    }

    #[test]
    fn type_tokens_resolve_to_shape_and_kind() {
        let schema = resolved(
            "object A {\n\
             []uint32 Ids\n\
             [16]byte Hash\n\
             string Name\n\
             }\n",
        )
        .unwrap();

        let ids = field(&schema, "A", 0);
        assert_eq!((ids.shape, ids.kind), (Shape::Sequence, Kind::Primitive(PrimitiveKind::Uint32)));
        let hash = field(&schema, "A", 1);
        assert_eq!((hash.shape, hash.kind), (Shape::FixedArray(16), Kind::Primitive(PrimitiveKind::Byte)));
        let name = field(&schema, "A", 2);
        assert_eq!((name.shape, name.kind), (Shape::Scalar, Kind::Primitive(PrimitiveKind::String)));
        assert!(schema.get("A").unwrap().resolved);
    }

    #[test]
    fn every_primitive_token_is_recognized() {
        let body: String = PrimitiveKind::ALL
            .iter()
            .map(|kind| format!("{} f_{}\n", kind.token(), kind.token()))
            .collect();
        let schema = resolved(&format!("object P {{\n{}}}\n", body)).unwrap();
        let fields = &schema.get("P").unwrap().fields;
        assert_eq!(fields.len(), PrimitiveKind::ALL.len());
        for (field, kind) in fields.iter().zip(PrimitiveKind::ALL) {
            assert_eq!(field.kind, Kind::Primitive(kind));
        }
    }

    #[test]
    fn forward_reference_resolves() {
        let schema = resolved(
            "object Outer {\n\
             Inner First\n\
             []Inner Rest\n\
             }\n\
             object Inner {\n\
             uint8 Value\n\
             }\n",
        )
        .unwrap();
        let inner = schema.lookup("Inner").unwrap();
        assert_eq!(field(&schema, "Outer", 0).kind, Kind::Object(inner));
        assert_eq!(field(&schema, "Outer", 1).shape, Shape::Sequence);
    }

    #[test]
    fn reference_observes_later_resolution() {
        // Outer is resolved before Inner, yet sees Inner's fields through the id
        let schema = resolved("object Outer {\nInner I\n}\nobject Inner {\nbool B\n}\n").unwrap();
        let Kind::Object(id) = field(&schema, "Outer", 0).kind else {
            panic!("expected an object reference");
        };
        assert_eq!(schema.object(id).fields.len(), 1);
        assert_eq!(schema.min_encoded_len(schema.lookup("Outer").unwrap()), 1);
    }

    #[test]
    fn unknown_type_names_the_token() {
        let err = resolved("object A {\nMissing M\n}\n").unwrap_err();
        match err {
            CompileError::UnknownType { type_name, field, object, line } => {
                assert_eq!(type_name, "Missing");
                assert_eq!(field, "M");
                assert_eq!(object, "A");
                assert_eq!(line, 2);
            }
            other => panic!("unexpected error {other}"),
        }
    }

    #[test]
    fn object_keyword_is_an_unknown_type() {
        let err = resolved("object A {\nobject Inline\n}\n").unwrap_err();
        assert!(matches!(err, CompileError::UnknownType { ref type_name, .. } if type_name == "object"));
    }

    #[test]
    fn wrong_token_count_is_malformed() {
        for line in ["uint32 extra name", "uint32", "uint32 9name", "[4] Hash"] {
            let err = resolved(&format!("object A {{\n{}\n}}\n", line)).unwrap_err();
            assert!(matches!(err, CompileError::MalformedField { .. }), "{line}: {err}");
        }
    }

    #[test]
    fn bad_array_length() {
        let err = resolved("object A {\n[abc]byte Hash\n}\n").unwrap_err();
        assert!(matches!(err, CompileError::ParseLength { ref literal, line: 2, .. } if literal == "abc"));
    }

    #[test]
    fn oversized_array_length() {
        let err = resolved("object A {\n[18446744073709551615]byte X\n[18446744073709551615]byte Y\n}\n").unwrap_err();
        assert!(matches!(err, CompileError::ArrayTooLong { length: u64::MAX, line: 2, .. }));

        let schema = resolved("object A {\n[4294967295]byte X\n}\n").unwrap();
        assert_eq!(field(&schema, "A", 0).shape, Shape::FixedArray(MAX_ARRAY_LEN));
    }

    #[test]
    fn duplicate_field() {
        let err = resolved("object A {\nbool X\nuint8 X\n}\n").unwrap_err();
        assert!(matches!(err, CompileError::DuplicateField { ref field, line: 3, .. } if field == "X"));
    }

    #[test]
    fn resolution_is_idempotent() {
        let mut schema = schema("object A {\nbool X\n}\n");
        resolve_schema(&mut schema).unwrap();
        let before = schema.clone();
        resolve_schema(&mut schema).unwrap();
        assert_eq!(schema, before);
    }

    #[test]
    fn cycles_are_rejected() {
        let err = resolved("object A {\nA Me\n}\n").unwrap_err();
        assert!(matches!(err, CompileError::CyclicReference { ref path } if path == &["A", "A"]));

        let err = resolved("object A {\nB b\n}\nobject B {\n[2]C c\n}\nobject C {\nA a\n}\n").unwrap_err();
        match err {
            CompileError::CyclicReference { path } => assert_eq!(path, ["A", "B", "C", "A"]),
            other => panic!("unexpected error {other}"),
        }
    }

    #[test]
    fn sequences_break_cycles() {
        let schema = resolved("object Node {\nuint32 Value\n[]Node Children\n}\n").unwrap();
        assert_eq!(field(&schema, "Node", 1).kind, Kind::Object(ObjectId(0)));
    }
}
