use crate::{
    error::CompileError,
    types::{ObjectDescriptor, Schema},
};
use parking_lot::Mutex;
use std::collections::HashMap;
use tracing::debug;

/// Scan-phase store of every declared object.
///
/// Any number of scanners may call [`Registry::add`] concurrently. Once all of
/// them are done, [`Registry::finish`] hands the objects over to a [`Schema`]
/// for resolution; nothing can be added after that point.
#[derive(Debug, Default)]
pub struct Registry {
    objects: Mutex<HashMap<String, ObjectDescriptor>>,
}

impl Registry {
    pub fn new() -> Registry {
        Registry::default()
    }

    /// Registers `object`, failing without side effects if the name is taken.
    pub fn add(&self, object: ObjectDescriptor) -> Result<(), CompileError> {
        let mut objects = self.objects.lock();
        if objects.contains_key(&object.name) {
            return Err(CompileError::DuplicateObject { name: object.name });
        }

        debug!(
            object = %object.name,
            file = %object.source.file,
            line = object.source.line,
            fields = object.raw_fields.len(),
            "registered object"
        );
        objects.insert(object.name.clone(), object);
        Ok(())
    }

    /// Returns a snapshot of the object registered under `name`.
    pub fn lookup(&self, name: &str) -> Option<ObjectDescriptor> {
        self.objects.lock().get(name).cloned()
    }

    pub fn len(&self) -> usize {
        self.objects.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Ends the scan phase and assigns ids.
    ///
    /// Objects are ordered by source file label, then line, so the result does
    /// not depend on which scanner registered first.
    pub fn finish(self, package: Option<String>) -> Schema {
        let mut objects: Vec<ObjectDescriptor> = self.objects.into_inner().into_values().collect();
        objects.sort_by(|a, b| {
            (&a.source.file, a.source.line, &a.name).cmp(&(&b.source.file, b.source.line, &b.name))
        });
        Schema::from_objects(package, objects)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ObjectId, RawField, SourceLocation};
    use std::sync::Arc;

    fn object(name: &str, line: usize, fields: &[&str]) -> ObjectDescriptor {
        let raw = fields
            .iter()
            .enumerate()
            .map(|(i, text)| RawField { text: text.to_string(), line: line + i + 1 })
            .collect();
        ObjectDescriptor::new(name, SourceLocation { file: "test".into(), line }, raw)
    }

    #[test]
    fn add_and_lookup() {
        let registry = Registry::new();
        assert!(registry.is_empty());
        registry.add(object("B", 10, &[])).unwrap();
        registry.add(object("A", 1, &["uint32 Count"])).unwrap();

        let a = registry.lookup("A").unwrap();
        assert_eq!(a.raw_fields[0].text, "uint32 Count");
        assert!(!a.resolved);
        assert!(registry.lookup("C").is_none());
        assert_eq!(registry.len(), 2);

        // ids follow source order, not registration order
        let schema = registry.finish(None);
        assert_eq!(schema.lookup("A"), Some(ObjectId(0)));
        assert_eq!(schema.lookup("B"), Some(ObjectId(1)));
    }

    #[test]
    fn duplicate_is_rejected_atomically() {
        let registry = Registry::new();
        registry.add(object("A", 1, &["uint32 Count"])).unwrap();

        let err = registry.add(object("A", 5, &["bool Flag", "byte B"])).unwrap_err();
        assert!(matches!(err, CompileError::DuplicateObject { ref name } if name == "A"));

        // the first declaration is untouched
        assert_eq!(registry.len(), 1);
        let a = registry.lookup("A").unwrap();
        assert_eq!(a.raw_fields.len(), 1);
        assert_eq!(a.source.line, 1);
    }

    #[test]
    fn concurrent_adds_are_serialized() {
        let registry = Arc::new(Registry::new());
        let handles: Vec<_> = (0..8)
            .map(|t| {
                let registry = Arc::clone(&registry);
                std::thread::spawn(move || {
                    for i in 0..50 {
                        registry.add(object(&format!("T{}_{}", t, i), i + 1, &[])).unwrap();
                    }
                    // every thread also races for the same name; exactly one wins
                    registry.add(object("Shared", 100, &[])).is_ok()
                })
            })
            .collect();
        let winners = handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .filter(|won| *won)
            .count();

        assert_eq!(winners, 1);
        assert_eq!(registry.len(), 8 * 50 + 1);

        let schema = Arc::try_unwrap(registry).unwrap().finish(None);
        assert_eq!(schema.len(), 8 * 50 + 1);
        for id in schema.ids() {
            assert_eq!(schema.lookup(&schema.object(id).name), Some(id));
        }
    }
}
