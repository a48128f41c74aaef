use thiserror::Error;

/// Errors produced while decoding a wire buffer.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WireError {
    #[error("truncated buffer at offset {offset}: needed {needed} bytes, {remaining} remaining")]
    TruncatedBuffer {
        offset:    usize,
        needed:    usize,
        remaining: usize,
    },

    #[error("invalid bool byte {value} at offset {offset}")]
    InvalidBool {
        offset: usize,
        value:  u8,
    },

    #[error("invalid UTF-8 in string at offset {offset}")]
    InvalidUtf8 {
        offset: usize,
    },

    #[error("length {0} does not fit the u32 length prefix")]
    LengthOverflow(usize),
}
