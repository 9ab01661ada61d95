//! Importers: parse external data into component nodes

use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use wb_common::ComponentNode;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImportFormat {
    Html,
    Json,
    Zip,
}

impl fmt::Display for ImportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ImportFormat::Html => "html",
            ImportFormat::Json => "json",
            ImportFormat::Zip => "zip",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportOptions {
    pub format: ImportFormat,
    /// Keep incoming ids; otherwise every node gets a fresh id
    #[serde(default)]
    pub preserve_ids: bool,
    /// Passed through to the importer; formats that carry stylesheets merge
    /// them into node styles. The JSON importer ignores it.
    #[serde(default)]
    pub merge_styles: bool,
    /// Reject the import if the forest has validation errors
    #[serde(default)]
    pub validate_components: bool,
}

impl ImportOptions {
    pub fn new(format: ImportFormat) -> Self {
        Self {
            format,
            preserve_ids: false,
            merge_styles: false,
            validate_components: false,
        }
    }

    pub fn preserving_ids(mut self) -> Self {
        self.preserve_ids = true;
        self
    }

    pub fn merging_styles(mut self) -> Self {
        self.merge_styles = true;
        self
    }

    pub fn validated(mut self) -> Self {
        self.validate_components = true;
        self
    }
}

#[async_trait(?Send)]
pub trait Importer {
    fn id(&self) -> &str;

    fn format(&self) -> ImportFormat;

    async fn import(&self, data: &str, options: &ImportOptions) -> anyhow::Result<Vec<ComponentNode>>;
}

/// Parses a JSON array of nodes
#[derive(Debug, Default)]
pub struct JsonImporter;

#[async_trait(?Send)]
impl Importer for JsonImporter {
    fn id(&self) -> &str {
        "json"
    }

    fn format(&self) -> ImportFormat {
        ImportFormat::Json
    }

    async fn import(&self, data: &str, _options: &ImportOptions) -> anyhow::Result<Vec<ComponentNode>> {
        Ok(ComponentNode::from_json_array(data)?)
    }
}

/// Importers keyed by format
#[derive(Clone)]
pub struct ImporterRegistry {
    importers: HashMap<ImportFormat, Rc<dyn Importer>>,
}

impl ImporterRegistry {
    /// Registry with the built-in JSON importer
    pub fn new() -> Self {
        let mut registry = Self {
            importers: HashMap::new(),
        };
        registry.register(Rc::new(JsonImporter));
        registry
    }

    pub fn register(&mut self, importer: Rc<dyn Importer>) -> Option<Rc<dyn Importer>> {
        self.importers.insert(importer.format(), importer)
    }

    pub fn get(&self, format: ImportFormat) -> Option<Rc<dyn Importer>> {
        self.importers.get(&format).cloned()
    }
}

impl Default for ImporterRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for ImporterRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let formats: Vec<_> = self.importers.keys().collect();
        f.debug_struct("ImporterRegistry").field("formats", &formats).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_json_importer() {
        let nodes = JsonImporter
            .import(
                r#"[{"id": "a", "type": "container", "children": [{"id": "b", "type": "text"}]}]"#,
                &ImportOptions::new(ImportFormat::Json),
            )
            .await
            .unwrap();

        assert_eq!(nodes[0].children[0].id, "b");
    }

    #[tokio::test]
    async fn test_json_importer_rejects_garbage() {
        let result = JsonImporter
            .import("<div></div>", &ImportOptions::new(ImportFormat::Json))
            .await;
        assert!(result.is_err());
    }

    #[test]
    fn test_registry() {
        let registry = ImporterRegistry::new();
        assert!(registry.get(ImportFormat::Json).is_some());
        assert!(registry.get(ImportFormat::Zip).is_none());
    }
}
