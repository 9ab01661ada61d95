//! Component libraries and page templates

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use wb_common::{ComponentMetadata, ComponentNode, Styles};

/// A named set of component definitions
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComponentLibrary {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub version: String,
    #[serde(default)]
    pub components: Vec<ComponentMetadata>,
    #[serde(default)]
    pub categories: Vec<String>,
}

impl ComponentLibrary {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            version: "1.0.0".to_string(),
            ..Default::default()
        }
    }

    /// Add a component definition, replacing one with the same type key
    pub fn register(&mut self, metadata: ComponentMetadata) {
        if !metadata.category.is_empty() && !self.categories.contains(&metadata.category) {
            self.categories.push(metadata.category.clone());
        }

        match self
            .components
            .iter_mut()
            .find(|existing| existing.id.is_some() && existing.id == metadata.id)
        {
            Some(existing) => *existing = metadata,
            None => self.components.push(metadata),
        }
    }

    pub fn get(&self, component_type: &str) -> Option<&ComponentMetadata> {
        self.components
            .iter()
            .find(|metadata| metadata.id.as_deref() == Some(component_type))
    }

    pub fn component_types(&self) -> impl Iterator<Item = &str> {
        self.components.iter().filter_map(|metadata| metadata.id.as_deref())
    }

    /// The built-in library loaded by `Builder::initialize`
    pub fn default_library() -> Self {
        let mut library = Self::new("default", "Default Components");
        library.description = "Basic building blocks".to_string();

        let definitions = [
            ("text", "Text", "basic", "Paragraphs and headings"),
            ("image", "Image", "media", "Responsive image"),
            ("button", "Button", "basic", "Clickable button"),
            ("container", "Container", "layout", "Groups other components"),
            ("form", "Form", "forms", "Form wrapper"),
            ("input", "Input", "forms", "Text input field"),
            ("video", "Video", "media", "Embedded video"),
            ("audio", "Audio", "media", "Embedded audio"),
        ];

        for (component_type, name, category, description) in definitions {
            let mut metadata = ComponentMetadata::for_type(component_type)
                .with_category(category)
                .with_description(description)
                .with_icon(component_type);
            metadata.name = name.to_string();
            library.register(metadata);
        }

        library
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateMetadata {
    #[serde(default)]
    pub version: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub tags: Vec<String>,
}

impl Default for TemplateMetadata {
    fn default() -> Self {
        let now = Utc::now();
        Self {
            version: "1.0.0".to_string(),
            author: None,
            created_at: now,
            updated_at: now,
            tags: Vec::new(),
        }
    }
}

/// A prebuilt page that replaces the forest when loaded
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateConfig {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub category: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<String>,
    #[serde(default)]
    pub components: Vec<ComponentNode>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub global_styles: Option<Styles>,
    #[serde(default)]
    pub metadata: TemplateMetadata,
}

impl TemplateConfig {
    pub fn new(id: impl Into<String>, name: impl Into<String>, components: Vec<ComponentNode>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            components,
            ..Default::default()
        }
    }
}
