use serde::Serialize;
use std::collections::HashMap;

/// Stable index of an object inside a [`Schema`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct ObjectId(pub u32);

impl ObjectId {
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

/// The closed set of primitive kinds a field may name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PrimitiveKind {
    Byte,
    Uint8,
    Uint16,
    Uint32,
    Uint64,
    Int8,
    Int32,
    Int64,
    Bool,
    String,
}

impl PrimitiveKind {
    pub const ALL: [PrimitiveKind; 10] = [
        PrimitiveKind::Byte,
        PrimitiveKind::Uint8,
        PrimitiveKind::Uint16,
        PrimitiveKind::Uint32,
        PrimitiveKind::Uint64,
        PrimitiveKind::Int8,
        PrimitiveKind::Int32,
        PrimitiveKind::Int64,
        PrimitiveKind::Bool,
        PrimitiveKind::String,
    ];

    /// Classifies a kind name. Anything that is not a primitive token
    /// (including the bare `object` keyword) yields `None`.
    pub fn from_token(token: &str) -> Option<PrimitiveKind> {
        PrimitiveKind::ALL.into_iter().find(|kind| kind.token() == token)
    }

    /// The schema spelling of this kind.
    pub const fn token(self) -> &'static str {
        match self {
            PrimitiveKind::Byte   => "byte",
            PrimitiveKind::Uint8  => "uint8",
            PrimitiveKind::Uint16 => "uint16",
            PrimitiveKind::Uint32 => "uint32",
            PrimitiveKind::Uint64 => "uint64",
            PrimitiveKind::Int8   => "int8",
            PrimitiveKind::Int32  => "int32",
            PrimitiveKind::Int64  => "int64",
            PrimitiveKind::Bool   => "bool",
            PrimitiveKind::String => "string",
        }
    }

    pub const fn rust_type(self) -> &'static str {
        match self {
            PrimitiveKind::Byte | PrimitiveKind::Uint8 => "u8",
            PrimitiveKind::Uint16 => "u16",
            PrimitiveKind::Uint32 => "u32",
            PrimitiveKind::Uint64 => "u64",
            PrimitiveKind::Int8   => "i8",
            PrimitiveKind::Int32  => "i32",
            PrimitiveKind::Int64  => "i64",
            PrimitiveKind::Bool   => "bool",
            PrimitiveKind::String => "String",
        }
    }

    /// Encoded width in bytes, `None` for length-prefixed strings.
    pub const fn fixed_width(self) -> Option<usize> {
        match self {
            PrimitiveKind::Byte | PrimitiveKind::Uint8 | PrimitiveKind::Int8 | PrimitiveKind::Bool => Some(1),
            PrimitiveKind::Uint16 => Some(2),
            PrimitiveKind::Uint32 | PrimitiveKind::Int32 => Some(4),
            PrimitiveKind::Uint64 | PrimitiveKind::Int64 => Some(8),
            PrimitiveKind::String => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Shape {
    Scalar,
    FixedArray(u64),
    /// Growable sequence, written `[]T`.
    Sequence,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Kind {
    Primitive(PrimitiveKind),
    Object(ObjectId),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldDescriptor {
    pub name:  String,
    pub shape: Shape,
    pub kind:  Kind,
    pub line:  usize,
}

impl FieldDescriptor {
    /// Whether this field embeds its kind by value. Sequences are
    /// heap-allocated and may be empty, so they never do.
    pub fn is_inline(&self) -> bool {
        !matches!(self.shape, Shape::Sequence)
    }
}

/// An unparsed field line, trimmed, with its 1-based source line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RawField {
    pub text: String,
    pub line: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SourceLocation {
    pub file: String,
    pub line: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ObjectDescriptor {
    pub name:       String,
    pub source:     SourceLocation,
    pub raw_fields: Vec<RawField>,
    pub fields:     Vec<FieldDescriptor>,
    pub resolved:   bool,
}

impl ObjectDescriptor {
    /// A freshly scanned object: raw lines only, nothing resolved.
    pub fn new(name: impl Into<String>, source: SourceLocation, raw_fields: Vec<RawField>) -> Self {
        ObjectDescriptor {
            name: name.into(),
            source,
            raw_fields,
            fields: Vec::new(),
            resolved: false,
        }
    }
}

/// The compilation context shared by the resolver and the emitter: the
/// declared package and every object, addressed by [`ObjectId`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Schema {
    pub package: Option<String>,
    objects:     Vec<ObjectDescriptor>,
    #[serde(skip)]
    by_name:     HashMap<String, ObjectId>,
}

impl Schema {
    pub(crate) fn from_objects(package: Option<String>, objects: Vec<ObjectDescriptor>) -> Schema {
        let by_name = objects
            .iter()
            .enumerate()
            .map(|(i, obj)| (obj.name.clone(), ObjectId(i as u32)))
            .collect();
        Schema {
            package,
            objects,
            by_name,
        }
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    pub fn lookup(&self, name: &str) -> Option<ObjectId> {
        self.by_name.get(name).copied()
    }

    pub fn get(&self, name: &str) -> Option<&ObjectDescriptor> {
        self.lookup(name).map(|id| self.object(id))
    }

    /// Panics if `id` did not come from this schema.
    pub fn object(&self, id: ObjectId) -> &ObjectDescriptor {
        &self.objects[id.index()]
    }

    pub fn object_mut(&mut self, id: ObjectId) -> &mut ObjectDescriptor {
        &mut self.objects[id.index()]
    }

    pub fn ids(&self) -> impl Iterator<Item = ObjectId> {
        (0..self.objects.len() as u32).map(ObjectId)
    }

    pub fn objects(&self) -> impl Iterator<Item = &ObjectDescriptor> {
        self.objects.iter()
    }

    /// The smallest number of bytes an encoded `id` record can occupy:
    /// strings and sequences count only their `u32` length prefix. Saturates
    /// at `usize::MAX`.
    ///
    /// Only meaningful once the schema resolved without cycles.
    pub fn min_encoded_len(&self, id: ObjectId) -> usize {
        let mut memo = vec![None; self.objects.len()];
        self.measure(id, &mut memo)
    }

    /// [`Schema::min_encoded_len`] of every object, indexed by [`ObjectId`].
    /// Each object is measured once.
    pub fn min_encoded_lens(&self) -> Vec<usize> {
        let mut memo = vec![None; self.objects.len()];
        self.ids().map(|id| self.measure(id, &mut memo)).collect()
    }

    fn measure(&self, id: ObjectId, memo: &mut [Option<usize>]) -> usize {
        if let Some(len) = memo[id.index()] {
            return len;
        }
        // an object still being measured reads as empty, so a cyclic schema
        // still terminates
        memo[id.index()] = Some(0);
        let len = self
            .object(id)
            .fields
            .iter()
            .map(|field| self.min_field_len(field, memo))
            .fold(0, usize::saturating_add);
        memo[id.index()] = Some(len);
        len
    }

    fn min_field_len(&self, field: &FieldDescriptor, memo: &mut [Option<usize>]) -> usize {
        let count = match field.shape {
            Shape::Sequence => return LENGTH_PREFIX,
            Shape::Scalar => 1,
            Shape::FixedArray(len) => usize::try_from(len).unwrap_or(usize::MAX),
        };
        let element = match field.kind {
            Kind::Primitive(kind) => kind.fixed_width().unwrap_or(LENGTH_PREFIX),
            Kind::Object(id) => self.measure(id, memo),
        };
        element.saturating_mul(count)
    }
}

/// Width of the length prefix in front of strings and sequences.
pub const LENGTH_PREFIX: usize = 4;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn primitive_tokens_round_trip() {
        for kind in PrimitiveKind::ALL {
            assert_eq!(PrimitiveKind::from_token(kind.token()), Some(kind));
        }
    }

    #[test]
    fn object_keyword_is_not_a_primitive() {
        assert_eq!(PrimitiveKind::from_token("object"), None);
        assert_eq!(PrimitiveKind::from_token("int16"), None);
        assert_eq!(PrimitiveKind::from_token("Uint32"), None);
    }

    fn object(name: &str, fields: Vec<FieldDescriptor>) -> ObjectDescriptor {
        let source = SourceLocation { file: "test".to_string(), line: 1 };
        let mut object = ObjectDescriptor::new(name, source, Vec::new());
        object.fields = fields;
        object.resolved = true;
        object
    }

    fn field(shape: Shape, kind: Kind) -> FieldDescriptor {
        FieldDescriptor { name: "f".to_string(), shape, kind, line: 1 }
    }

    #[test]
    fn min_lens_of_a_wide_chain() {
        // L0 holds two L1, L1 holds two L2, ... the last one holds a byte
        const DEPTH: usize = 64;
        let mut objects: Vec<ObjectDescriptor> = (0..DEPTH)
            .map(|i| {
                let next = Kind::Object(ObjectId(i as u32 + 1));
                object(&format!("L{}", i), vec![field(Shape::Scalar, next), field(Shape::Scalar, next)])
            })
            .collect();
        objects.push(object("Leaf", vec![field(Shape::Scalar, Kind::Primitive(PrimitiveKind::Uint8))]));
        let schema = Schema::from_objects(None, objects);

        let lens = schema.min_encoded_lens();
        assert_eq!(lens[DEPTH], 1);
        assert_eq!(lens[DEPTH - 10], 1 << 10);
        assert_eq!(lens[0], usize::MAX);
        assert_eq!(schema.min_encoded_len(ObjectId(DEPTH as u32 - 20)), 1 << 20);
    }

    #[test]
    fn min_lens_saturate() {
        let huge = field(Shape::FixedArray(u64::MAX), Kind::Primitive(PrimitiveKind::Byte));
        let schema = Schema::from_objects(None, vec![object("A", vec![huge.clone(), huge])]);
        assert_eq!(schema.min_encoded_len(ObjectId(0)), usize::MAX);
    }

    #[test]
    fn sequences_count_only_their_prefix() {
        let strings = field(Shape::Sequence, Kind::Primitive(PrimitiveKind::String));
        let own = field(Shape::Sequence, Kind::Object(ObjectId(0)));
        let array = field(Shape::FixedArray(3), Kind::Primitive(PrimitiveKind::String));
        let schema = Schema::from_objects(None, vec![object("A", vec![strings, own, array])]);
        assert_eq!(schema.min_encoded_lens(), [4 + 4 + 3 * 4]);
    }

    #[test]
    fn widths() {
        assert_eq!(PrimitiveKind::Byte.fixed_width(), Some(1));
        assert_eq!(PrimitiveKind::Bool.fixed_width(), Some(1));
        assert_eq!(PrimitiveKind::Uint16.fixed_width(), Some(2));
        assert_eq!(PrimitiveKind::Int32.fixed_width(), Some(4));
        assert_eq!(PrimitiveKind::Uint64.fixed_width(), Some(8));
        assert_eq!(PrimitiveKind::String.fixed_width(), None);
    }
}
