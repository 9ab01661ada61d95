//! # Exporters
//!
//! The builder hands the materialized forest to an [`Exporter`] chosen by
//! format. JSON is built in; HTML/React/Vue/Angular generation is provided by
//! plugins through [`ExporterRegistry`].

use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use wb_common::ComponentNode;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    Json,
    Html,
    React,
    Vue,
    Angular,
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ExportFormat::Json => "json",
            ExportFormat::Html => "html",
            ExportFormat::React => "react",
            ExportFormat::Vue => "vue",
            ExportFormat::Angular => "angular",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportOptions {
    pub format: ExportFormat,
    #[serde(default)]
    pub minify: bool,
    #[serde(default = "default_true")]
    pub include_styles: bool,
    #[serde(default = "default_true")]
    pub include_scripts: bool,
    #[serde(default)]
    pub standalone: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_directory: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_name: Option<String>,
}

fn default_true() -> bool {
    true
}

impl ExportOptions {
    pub fn new(format: ExportFormat) -> Self {
        Self {
            format,
            minify: false,
            include_styles: true,
            include_scripts: true,
            standalone: false,
            target_directory: None,
            file_name: None,
        }
    }

    pub fn minified(mut self) -> Self {
        self.minify = true;
        self
    }
}

/// Turns a forest into source text for one format
#[async_trait(?Send)]
pub trait Exporter {
    fn id(&self) -> &str;

    fn format(&self) -> ExportFormat;

    async fn export(&self, nodes: &[ComponentNode], options: &ExportOptions) -> anyhow::Result<String>;
}

/// Serializes the forest as a JSON array of nodes
#[derive(Debug, Default)]
pub struct JsonExporter;

#[async_trait(?Send)]
impl Exporter for JsonExporter {
    fn id(&self) -> &str {
        "json"
    }

    fn format(&self) -> ExportFormat {
        ExportFormat::Json
    }

    async fn export(&self, nodes: &[ComponentNode], options: &ExportOptions) -> anyhow::Result<String> {
        Ok(ComponentNode::to_json_array(nodes, !options.minify)?)
    }
}

/// Exporters keyed by format
#[derive(Clone)]
pub struct ExporterRegistry {
    exporters: HashMap<ExportFormat, Rc<dyn Exporter>>,
}

impl ExporterRegistry {
    /// Registry with the built-in JSON exporter
    pub fn new() -> Self {
        let mut registry = Self::empty();
        registry.register(Rc::new(JsonExporter));
        registry
    }

    pub fn empty() -> Self {
        Self {
            exporters: HashMap::new(),
        }
    }

    /// Register an exporter for its format, replacing any previous one
    pub fn register(&mut self, exporter: Rc<dyn Exporter>) -> Option<Rc<dyn Exporter>> {
        self.exporters.insert(exporter.format(), exporter)
    }

    pub fn get(&self, format: ExportFormat) -> Option<Rc<dyn Exporter>> {
        self.exporters.get(&format).cloned()
    }

    pub fn remove(&mut self, format: ExportFormat) -> Option<Rc<dyn Exporter>> {
        self.exporters.remove(&format)
    }

    pub fn formats(&self) -> Vec<ExportFormat> {
        let mut formats: Vec<_> = self.exporters.keys().copied().collect();
        formats.sort_by_key(|format| format.to_string());
        formats
    }
}

impl Default for ExporterRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for ExporterRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExporterRegistry")
            .field("formats", &self.formats())
            .finish()
    }
}
