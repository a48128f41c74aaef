// Code generated by chateau. DO NOT EDIT.

pub mod endpoints {
use chateau::{Wire, WireError, WireReader, WireWriter};

#[derive(Debug, Clone, PartialEq)]
pub struct Header {
    pub request_id: [u8; 16],
    pub timestamp: u64,
    pub compressed: bool,
}

impl Header {
    /// Encodes this record into a new buffer.
    pub fn encode(&self) -> Result<Vec<u8>, WireError> {
        let mut writer = WireWriter::new();
        self.encode_to(&mut writer)?;
        Ok(writer.into_bytes())
    }

    /// Decodes a record from the start of `buffer`.
    pub fn decode(buffer: &[u8]) -> Result<Self, WireError> {
        let mut reader = WireReader::new(buffer);
        Self::decode_from(&mut reader)
    }
}

impl Wire for Header {
    const MIN_ENCODED_LEN: usize = 25;

    fn encode_to(&self, writer: &mut WireWriter) -> Result<(), WireError> {
        self.request_id.encode_to(writer)?;
        self.timestamp.encode_to(writer)?;
        self.compressed.encode_to(writer)?;
        Ok(())
    }

    fn decode_from(reader: &mut WireReader<'_>) -> Result<Self, WireError> {
        reader.ensure(Self::MIN_ENCODED_LEN)?;
        let request_id = <[u8; 16] as Wire>::decode_from(reader)?;
        let timestamp = <u64 as Wire>::decode_from(reader)?;
        let compressed = <bool as Wire>::decode_from(reader)?;
        Ok(Self {
            request_id,
            timestamp,
            compressed,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Tag {
    pub key: String,
    pub value: String,
}

impl Tag {
    /// Encodes this record into a new buffer.
    pub fn encode(&self) -> Result<Vec<u8>, WireError> {
        let mut writer = WireWriter::new();
        self.encode_to(&mut writer)?;
        Ok(writer.into_bytes())
    }

    /// Decodes a record from the start of `buffer`.
    pub fn decode(buffer: &[u8]) -> Result<Self, WireError> {
        let mut reader = WireReader::new(buffer);
        Self::decode_from(&mut reader)
    }
}

impl Wire for Tag {
    const MIN_ENCODED_LEN: usize = 8;

    fn encode_to(&self, writer: &mut WireWriter) -> Result<(), WireError> {
        self.key.encode_to(writer)?;
        self.value.encode_to(writer)?;
        Ok(())
    }

    fn decode_from(reader: &mut WireReader<'_>) -> Result<Self, WireError> {
        reader.ensure(Self::MIN_ENCODED_LEN)?;
        let key = <String as Wire>::decode_from(reader)?;
        let value = <String as Wire>::decode_from(reader)?;
        Ok(Self {
            key,
            value,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Request {
    pub head: Header,
    pub version: u8,
    pub method: u16,
    pub timeout: u32,
    pub priority: i8,
    pub offset: i32,
    pub deadline: i64,
    pub path: String,
    pub pinned: [Tag; 2],
    pub ids: Vec<u32>,
    pub tags: Vec<Tag>,
}

impl Request {
    /// Encodes this record into a new buffer.
    pub fn encode(&self) -> Result<Vec<u8>, WireError> {
        let mut writer = WireWriter::new();
        self.encode_to(&mut writer)?;
        Ok(writer.into_bytes())
    }

    /// Decodes a record from the start of `buffer`.
    pub fn decode(buffer: &[u8]) -> Result<Self, WireError> {
        let mut reader = WireReader::new(buffer);
        Self::decode_from(&mut reader)
    }
}

impl Wire for Request {
    const MIN_ENCODED_LEN: usize = 73;

    fn encode_to(&self, writer: &mut WireWriter) -> Result<(), WireError> {
        self.head.encode_to(writer)?;
        self.version.encode_to(writer)?;
        self.method.encode_to(writer)?;
        self.timeout.encode_to(writer)?;
        self.priority.encode_to(writer)?;
        self.offset.encode_to(writer)?;
        self.deadline.encode_to(writer)?;
        self.path.encode_to(writer)?;
        self.pinned.encode_to(writer)?;
        self.ids.encode_to(writer)?;
        self.tags.encode_to(writer)?;
        Ok(())
    }

    fn decode_from(reader: &mut WireReader<'_>) -> Result<Self, WireError> {
        reader.ensure(Self::MIN_ENCODED_LEN)?;
        let head = <Header as Wire>::decode_from(reader)?;
        let version = <u8 as Wire>::decode_from(reader)?;
        let method = <u16 as Wire>::decode_from(reader)?;
        let timeout = <u32 as Wire>::decode_from(reader)?;
        let priority = <i8 as Wire>::decode_from(reader)?;
        let offset = <i32 as Wire>::decode_from(reader)?;
        let deadline = <i64 as Wire>::decode_from(reader)?;
        let path = <String as Wire>::decode_from(reader)?;
        let pinned = <[Tag; 2] as Wire>::decode_from(reader)?;
        let ids = <Vec<u32> as Wire>::decode_from(reader)?;
        let tags = <Vec<Tag> as Wire>::decode_from(reader)?;
        Ok(Self {
            head,
            version,
            method,
            timeout,
            priority,
            offset,
            deadline,
            path,
            pinned,
            ids,
            tags,
        })
    }
}

}
