// example/src/main.rs

#[allow(dead_code)]
mod generated;

use chateau::{Wire, WireError};

// Bring the generated types into scope:
use generated::endpoints::{Header, Request, Tag};

fn tag(key: &str, value: &str) -> Tag {
    Tag { key: key.to_string(), value: value.to_string() }
}

fn main() -> Result<(), WireError> {
    let request = Request {
        head: Header {
            request_id: *b"0123456789abcdef",
            timestamp:  1_700_000_000,
            compressed: false,
        },
        version:  1,
        method:   2,
        timeout:  30_000,
        priority: -1,
        offset:   -42,
        deadline: 1_700_000_030,
        path:     "/v1/objects".to_string(),
        pinned:   [tag("region", "eu"), tag("tier", "gold")],
        ids:      vec![7, 8, 9],
        tags:     vec![tag("trace", "on")],
    };

    let bytes = request.encode()?;
    println!("encoded {} bytes (minimum {})", bytes.len(), Request::MIN_ENCODED_LEN);

    let decoded = Request::decode(&bytes)?;
    println!("path    = {}", decoded.path);
    println!("ids     = {:?}", decoded.ids);
    println!("pinned  = {:?}", decoded.pinned);
    assert_eq!(decoded, request);

    // a cut-off buffer is reported, not panicked on
    match Request::decode(&bytes[..bytes.len() - 1]) {
        Err(err) => println!("truncated: {}", err),
        Ok(_) => println!("truncated buffer unexpectedly decoded"),
    }

    Ok(())
}
