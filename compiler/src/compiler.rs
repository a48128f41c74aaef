use crate::{
    error::CompileError,
    gen_rust::{check_rust_names, compile_schema_to_rust},
    registry::Registry,
    resolver::resolve_schema,
    scanner::{scan_source, ScanSummary},
    types::Schema,
};
use std::{fs, path::Path, thread};
use tracing::info;

/// Label used in diagnostics for sources that did not come from a file.
pub const INLINE_SOURCE: &str = "<input>";

/// Scan and resolve a single schema text, and check that its names map to
/// distinct Rust names.
/// Returns `Err(CompileError)` if scanning or resolution fails.
pub fn compile_schema(text: &str) -> Result<Schema, CompileError> {
    let registry = Registry::new();
    let summary = scan_source(INLINE_SOURCE, text, &registry)?;
    finish(registry, vec![summary])
}

/// Scan and resolve a single schema text straight to Rust source.
pub fn compile_schema_text_to_rust(text: &str) -> Result<String, CompileError> {
    let schema = compile_schema(text)?;
    Ok(compile_schema_to_rust(&schema))
}

/// Scan several schema files in parallel into one registry, then resolve
/// them together so objects may reference objects from any of the files.
///
/// Every scanner thread is joined before resolution starts. The first error,
/// in path order, aborts the whole run.
pub fn compile_files<P: AsRef<Path> + Sync>(paths: &[P]) -> Result<Schema, CompileError> {
    let registry = Registry::new();

    let results: Vec<Result<ScanSummary, CompileError>> = thread::scope(|scope| {
        let handles: Vec<_> = paths
            .iter()
            .map(|path| {
                let registry = &registry;
                scope.spawn(move || scan_file(path.as_ref(), registry))
            })
            .collect();
        handles
            .into_iter()
            .map(|handle| handle.join().unwrap_or_else(|panic| std::panic::resume_unwind(panic)))
            .collect()
    });

    let summaries = results.into_iter().collect::<Result<Vec<_>, _>>()?;
    finish(registry, summaries)
}

/// Reads and scans one schema file.
pub fn scan_file(path: &Path, registry: &Registry) -> Result<ScanSummary, CompileError> {
    let label = path.display().to_string();
    let text = fs::read_to_string(path).map_err(|e| CompileError::file(label.clone(), e))?;
    let summary = scan_source(&label, &text, registry)?;
    info!(file = %label, objects = summary.objects, "scanned schema file");
    Ok(summary)
}

/// Compile schema files and write the generated Rust to `output`.
///
/// The whole output is rendered before anything is written, so a failed run
/// never leaves a partial file behind.
pub fn compile_files_to_path<P: AsRef<Path> + Sync>(paths: &[P], output: &Path) -> Result<Schema, CompileError> {
    let schema = compile_files(paths)?;
    let rust_code = compile_schema_to_rust(&schema);
    fs::write(output, rust_code).map_err(|e| CompileError::file(output.display().to_string(), e))?;
    info!(output = %output.display(), objects = schema.len(), "wrote generated code");
    Ok(schema)
}

/// Merges the package declarations of all sources. Sources without a
/// declaration adopt the others'; two different declarations conflict.
pub fn merge_packages<I>(packages: I) -> Result<Option<String>, CompileError>
where
    I: IntoIterator<Item = Option<String>>,
{
    let mut merged: Option<String> = None;
    for package in packages.into_iter().flatten() {
        match &merged {
            Some(first) if *first != package => {
                return Err(CompileError::ConflictingPackage {
                    first:  first.clone(),
                    second: package,
                });
            }
            _ => merged = Some(package),
        }
    }
    Ok(merged)
}

fn finish(registry: Registry, summaries: Vec<ScanSummary>) -> Result<Schema, CompileError> {
    let package = merge_packages(summaries.into_iter().map(|s| s.package))?;
    let mut schema = registry.finish(package);
    resolve_schema(&mut schema)?;
    check_rust_names(&schema)?;
    Ok(schema)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn merge_packages_rules() {
        assert_eq!(merge_packages(vec![None, None]).unwrap(), None);
        assert_eq!(
            merge_packages(vec![None, Some("p".to_string()), Some("p".to_string())]).unwrap(),
            Some("p".to_string())
        );
        assert!(matches!(
            merge_packages(vec![Some("a".to_string()), None, Some("b".to_string())]),
            Err(CompileError::ConflictingPackage { .. })
        ));
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let err = compile_files(&["/definitely/not/here.chateau"]).unwrap_err();
        assert!(matches!(err, CompileError::File { .. }));
        assert!(err.to_string().contains("/definitely/not/here.chateau"));
    }
}
