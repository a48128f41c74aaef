use crate::error::WireError;

/// A byte buffer meant for reading fixed-width little-endian values.
///
/// Every read checks the remaining length first and fails with
/// [`WireError::TruncatedBuffer`] instead of panicking.
///
/// ```
/// let mut reader = chateau_wire::WireReader::new(&[1, 0x34, 0x12]);
/// assert_eq!(reader.read_bool(), Ok(true));
/// assert_eq!(reader.read_u16(), Ok(0x1234));
/// assert_eq!(reader.remaining(), 0);
/// ```
#[derive(Debug, Clone)]
pub struct WireReader<'a> {
    data:  &'a [u8],
    index: usize,
}

impl<'a> WireReader<'a> {
    /// Create a new reader positioned at the start of `data`.
    pub fn new(data: &'a [u8]) -> WireReader<'a> {
        WireReader { data, index: 0 }
    }

    /// Retrieves the underlying byte slice.
    pub fn data(&self) -> &'a [u8] {
        self.data
    }

    /// Current read offset. Starts at 0 and ends at `data().len()` once the
    /// whole buffer has been consumed.
    pub fn index(&self) -> usize {
        self.index
    }

    /// Number of bytes not yet consumed.
    pub fn remaining(&self) -> usize {
        self.data.len() - self.index
    }

    /// Fails unless at least `needed` bytes remain.
    pub fn ensure(&self, needed: usize) -> Result<(), WireError> {
        if needed > self.remaining() {
            return Err(WireError::TruncatedBuffer {
                offset:    self.index,
                needed,
                remaining: self.remaining(),
            });
        }
        Ok(())
    }

    /// Read `len` raw bytes.
    pub fn read_bytes(&mut self, len: usize) -> Result<&'a [u8], WireError> {
        self.ensure(len)?;
        let value = &self.data[self.index..self.index + len];
        self.index += len;
        Ok(value)
    }

    fn read_array<const N: usize>(&mut self) -> Result<[u8; N], WireError> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.read_bytes(N)?);
        Ok(out)
    }

    pub fn read_u8(&mut self) -> Result<u8, WireError> {
        Ok(self.read_array::<1>()?[0])
    }

    pub fn read_i8(&mut self) -> Result<i8, WireError> {
        Ok(i8::from_le_bytes(self.read_array()?))
    }

    pub fn read_u16(&mut self) -> Result<u16, WireError> {
        Ok(u16::from_le_bytes(self.read_array()?))
    }

    pub fn read_u32(&mut self) -> Result<u32, WireError> {
        Ok(u32::from_le_bytes(self.read_array()?))
    }

    pub fn read_i32(&mut self) -> Result<i32, WireError> {
        Ok(i32::from_le_bytes(self.read_array()?))
    }

    pub fn read_u64(&mut self) -> Result<u64, WireError> {
        Ok(u64::from_le_bytes(self.read_array()?))
    }

    pub fn read_i64(&mut self) -> Result<i64, WireError> {
        Ok(i64::from_le_bytes(self.read_array()?))
    }

    /// Read a boolean stored as a single `0` or `1` byte.
    pub fn read_bool(&mut self) -> Result<bool, WireError> {
        let offset = self.index;
        match self.read_u8()? {
            0 => Ok(false),
            1 => Ok(true),
            value => Err(WireError::InvalidBool { offset, value }),
        }
    }

    /// Read a `u32` length prefix.
    pub fn read_len(&mut self) -> Result<usize, WireError> {
        Ok(self.read_u32()? as usize)
    }

    /// Read a length-prefixed UTF-8 string.
    pub fn read_string(&mut self) -> Result<String, WireError> {
        let len = self.read_len()?;
        let offset = self.index;
        let bytes = self.read_bytes(len)?;
        String::from_utf8(bytes.to_vec()).map_err(|_| WireError::InvalidUtf8 { offset })
    }
}

/// A growable byte buffer meant for writing fixed-width little-endian values.
///
/// ```
/// let mut writer = chateau_wire::WireWriter::new();
/// writer.write_bool(true);
/// writer.write_u16(0x1234);
/// assert_eq!(writer.into_bytes(), [1, 0x34, 0x12]);
/// ```
#[derive(Debug, Default, Clone)]
pub struct WireWriter {
    data: Vec<u8>,
}

impl WireWriter {
    /// Creates an empty writer.
    pub fn new() -> WireWriter {
        WireWriter { data: vec![] }
    }

    /// Consumes the writer and returns the encoded bytes.
    pub fn into_bytes(self) -> Vec<u8> {
        self.data
    }

    /// Returns the number of bytes written so far.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Write a raw byte slice to the end of the buffer.
    pub fn write_bytes(&mut self, value: &[u8]) {
        self.data.extend_from_slice(value);
    }

    pub fn write_u8(&mut self, value: u8) {
        self.data.push(value);
    }

    pub fn write_i8(&mut self, value: i8) {
        self.write_bytes(&value.to_le_bytes());
    }

    pub fn write_u16(&mut self, value: u16) {
        self.write_bytes(&value.to_le_bytes());
    }

    pub fn write_u32(&mut self, value: u32) {
        self.write_bytes(&value.to_le_bytes());
    }

    pub fn write_i32(&mut self, value: i32) {
        self.write_bytes(&value.to_le_bytes());
    }

    pub fn write_u64(&mut self, value: u64) {
        self.write_bytes(&value.to_le_bytes());
    }

    pub fn write_i64(&mut self, value: i64) {
        self.write_bytes(&value.to_le_bytes());
    }

    pub fn write_bool(&mut self, value: bool) {
        self.data.push(if value { 1 } else { 0 });
    }

    /// Write a `u32` length prefix.
    pub fn write_len(&mut self, len: usize) -> Result<(), WireError> {
        let len = u32::try_from(len).map_err(|_| WireError::LengthOverflow(len))?;
        self.write_u32(len);
        Ok(())
    }

    /// Write a length-prefixed UTF-8 string.
    pub fn write_string(&mut self, value: &str) -> Result<(), WireError> {
        self.write_len(value.len())?;
        self.write_bytes(value.as_bytes());
        Ok(())
    }
}

#[test]
fn read_bool() {
    let read = |bytes| WireReader::new(bytes).read_bool();
    assert!(matches!(read(&[]), Err(WireError::TruncatedBuffer { needed: 1, remaining: 0, .. })));
    assert_eq!(read(&[0]), Ok(false));
    assert_eq!(read(&[1]), Ok(true));
    assert_eq!(read(&[2]), Err(WireError::InvalidBool { offset: 0, value: 2 }));
}

#[test]
fn read_bytes() {
    let mut reader = WireReader::new(&[1, 2, 3, 4, 5]);
    assert_eq!(reader.read_bytes(3), Ok([1, 2, 3].as_slice()));
    assert_eq!(reader.read_bytes(0), Ok([].as_slice()));
    assert_eq!(
        reader.read_bytes(3),
        Err(WireError::TruncatedBuffer { offset: 3, needed: 3, remaining: 2 })
    );
    // a failed read does not consume anything
    assert_eq!(reader.index(), 3);
    assert_eq!(reader.read_bytes(2), Ok([4, 5].as_slice()));
    assert_eq!(reader.remaining(), 0);
}

#[test]
fn read_integers_little_endian() {
    let mut reader = WireReader::new(&[
        0xff, // i8
        0x02, 0x01, // u16
        0x04, 0x03, 0x02, 0x01, // u32
        0xfe, 0xff, 0xff, 0xff, // i32
        0x08, 0x07, 0x06, 0x05, 0x04, 0x03, 0x02, 0x01, // u64
        0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x80, // i64
    ]);
    assert_eq!(reader.read_i8(), Ok(-1));
    assert_eq!(reader.read_u16(), Ok(0x0102));
    assert_eq!(reader.read_u32(), Ok(0x01020304));
    assert_eq!(reader.read_i32(), Ok(-2));
    assert_eq!(reader.read_u64(), Ok(0x0102030405060708));
    assert_eq!(reader.read_i64(), Ok(i64::MIN));
    assert_eq!(reader.remaining(), 0);
}

#[test]
fn read_truncated_integers() {
    assert!(WireReader::new(&[1]).read_u16().is_err());
    assert!(WireReader::new(&[1, 2, 3]).read_u32().is_err());
    assert!(WireReader::new(&[1, 2, 3]).read_i32().is_err());
    assert!(WireReader::new(&[0; 7]).read_u64().is_err());
    assert!(WireReader::new(&[0; 7]).read_i64().is_err());
    assert!(WireReader::new(&[]).read_u8().is_err());
    assert!(WireReader::new(&[]).read_i8().is_err());
}

#[test]
fn read_string() {
    let read = |bytes| WireReader::new(bytes).read_string();
    assert_eq!(read(&[0, 0, 0, 0]), Ok(String::new()));
    assert_eq!(read(&[2, 0, 0, 0, b'h', b'i']), Ok("hi".to_string()));
    assert_eq!(
        read(&[3, 0, 0, 0, b'h', b'i']),
        Err(WireError::TruncatedBuffer { offset: 4, needed: 3, remaining: 2 })
    );
    assert_eq!(read(&[1, 0, 0, 0, 0xff]), Err(WireError::InvalidUtf8 { offset: 4 }));
    assert!(read(&[1, 0]).is_err());
}

#[cfg(test)]
fn write_once(cb: fn(&mut WireWriter)) -> Vec<u8> {
    let mut writer = WireWriter::new();
    cb(&mut writer);
    writer.into_bytes()
}

#[test]
fn write_integers_little_endian() {
    assert_eq!(write_once(|w| w.write_u8(255)), [255]);
    assert_eq!(write_once(|w| w.write_i8(-1)), [0xff]);
    assert_eq!(write_once(|w| w.write_u16(0x0102)), [0x02, 0x01]);
    assert_eq!(write_once(|w| w.write_u32(0x01020304)), [0x04, 0x03, 0x02, 0x01]);
    assert_eq!(write_once(|w| w.write_i32(-2)), [0xfe, 0xff, 0xff, 0xff]);
    assert_eq!(
        write_once(|w| w.write_u64(0x0102030405060708)),
        [0x08, 0x07, 0x06, 0x05, 0x04, 0x03, 0x02, 0x01]
    );
    assert_eq!(write_once(|w| w.write_i64(i64::MIN)), [0, 0, 0, 0, 0, 0, 0, 0x80]);
}

#[test]
fn write_bool() {
    assert_eq!(write_once(|w| w.write_bool(false)), [0]);
    assert_eq!(write_once(|w| w.write_bool(true)), [1]);
}

#[test]
fn write_string() {
    let mut writer = WireWriter::new();
    writer.write_string("").unwrap();
    writer.write_string("🍕").unwrap();
    assert_eq!(writer.into_bytes(), [0, 0, 0, 0, 4, 0, 0, 0, 240, 159, 141, 149]);
}
