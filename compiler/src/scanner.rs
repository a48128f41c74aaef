use crate::{
    error::CompileError,
    registry::Registry,
    types::{ObjectDescriptor, RawField, SourceLocation},
};
use lazy_static::lazy_static;
use regex::Regex;
use tracing::{debug, warn};

pub const OBJECT_KEYWORD:  &str = "object";
pub const PACKAGE_KEYWORD: &str = "package";
pub const BLOCK_OPEN:      char = '{';
pub const BLOCK_CLOSE:     &str = "}";

lazy_static! {
    pub static ref IDENTIFIER:   Regex = Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").unwrap();
    static ref PACKAGE_LINE:     Regex = Regex::new(r"^package\s+([A-Za-z_][A-Za-z0-9_]*)$").unwrap();
}

/// What one scanned source contributed to the registry.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ScanSummary {
    pub package: Option<String>,
    pub objects: usize,
}

struct OpenBlock {
    name:   String,
    line:   usize,
    fields: Vec<RawField>,
}

/// Splits `text` into object blocks and registers each of them.
///
/// `file` only labels diagnostics. Field lines are stored trimmed and
/// unparsed; resolving them is a separate pass that must wait until every
/// source has been scanned.
pub fn scan_source(file: &str, text: &str, registry: &Registry) -> Result<ScanSummary, CompileError> {
    let mut summary = ScanSummary::default();
    let mut block: Option<OpenBlock> = None;

    for (index, raw_line) in text.lines().enumerate() {
        let line_no = index + 1;
        let line = raw_line.trim();
        if line.is_empty() {
            continue;
        }

        if let Some(mut open) = block.take() {
            if line == BLOCK_CLOSE {
                let object = ObjectDescriptor::new(
                    open.name,
                    SourceLocation { file: file.to_string(), line: open.line },
                    open.fields,
                );
                registry.add(object)?;
                summary.objects += 1;
            } else {
                open.fields.push(RawField { text: line.to_string(), line: line_no });
                block = Some(open);
            }
            continue;
        }

        if line.starts_with(OBJECT_KEYWORD) {
            let name = parse_object_header(line).ok_or_else(|| CompileError::MalformedObjectHeader {
                file: file.to_string(),
                line: line_no,
                text: line.to_string(),
            })?;
            debug!(file, line = line_no, object = %name, "object block opened");
            block = Some(OpenBlock { name, line: line_no, fields: Vec::new() });
        } else if line.starts_with(PACKAGE_KEYWORD) {
            let caps = PACKAGE_LINE.captures(line).ok_or_else(|| CompileError::MalformedPackage {
                file: file.to_string(),
                line: line_no,
                text: line.to_string(),
            })?;
            let package = caps[1].to_string();
            match &summary.package {
                Some(first) if *first != package => {
                    return Err(CompileError::ConflictingPackage { first: first.clone(), second: package });
                }
                _ => summary.package = Some(package),
            }
        } else {
            warn!(file, line = line_no, text = line, "ignoring line outside of an object block");
        }
    }

    if let Some(open) = block {
        return Err(CompileError::UnterminatedBlock {
            file: file.to_string(),
            name: open.name,
            line: open.line,
        });
    }

    Ok(summary)
}

/// Extracts the name from `object <Name> {`, ignoring anything after the
/// last brace and any spaces inside the name. The keyword must stand alone.
fn parse_object_header(line: &str) -> Option<String> {
    let rest = line.strip_prefix(OBJECT_KEYWORD)?;
    if !rest.starts_with(char::is_whitespace) {
        return None;
    }
    let open = rest.rfind(BLOCK_OPEN)?;
    let name: String = rest[..open]
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect();
    if IDENTIFIER.is_match(&name) {
        Some(name)
    } else {
        None
    }
}
