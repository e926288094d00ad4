use crate::schema_generator::Schema;
use indexmap::IndexMap;
use log::debug;

/// Definition registry - maps a short type name to its compiled schema.
///
/// A registry belongs to exactly one generation run and one [`crate::schema_generator::SchemaGenerator`];
/// it is never shared between documents.
#[derive(Debug, Clone, Default)]
pub struct DefinitionRegistry {
    definitions: IndexMap<String, Schema>,
}

impl DefinitionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn has(&self, name: &str) -> bool {
        self.definitions.contains_key(name)
    }

    pub fn get(&self, name: &str) -> Option<&Schema> {
        self.definitions.get(name)
    }

    /// Inserts or replaces a definition, keeping its original position.
    pub fn put(&mut self, name: &str, schema: Schema) {
        debug!("Registering definition: {}", name);
        self.definitions.insert(name.to_string(), schema);
    }

    /// Replaces a placeholder with the finished schema.
    ///
    /// A description attached to the placeholder while its fields were being compiled is kept
    /// unless the finished schema brings its own.
    pub fn complete(&mut self, name: &str, mut schema: Schema) {
        if schema.description.is_none() {
            schema.description = self
                .definitions
                .get(name)
                .and_then(|existing| existing.description.clone());
        }
        self.put(name, schema);
    }

    /// Sets the description of an existing definition. Last writer wins.
    pub fn describe(&mut self, name: &str, description: &str) {
        if let Some(schema) = self.definitions.get_mut(name) {
            debug!("Describing definition {}: {}", name, description);
            schema.description = Some(description.to_string());
        }
    }

    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Schema)> {
        self.definitions.iter()
    }

    pub fn into_definitions(self) -> IndexMap<String, Schema> {
        self.definitions
    }
}
