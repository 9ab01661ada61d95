//! # Plugins
//!
//! A plugin is activated once by `Builder::initialize` and deactivated by
//! `Builder::destroy`. During activation it receives a [`PluginContext`] with
//! four registration points: components, tools, exporters and event listeners.

use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;

use wb_common::ComponentMetadata;

use crate::builder::Builder;
use crate::events::{BuilderEvent, EventBus, EventKind, ListenerId};
use crate::export::{ExportFormat, Exporter, ExporterRegistry};
use crate::library::ComponentLibrary;

pub trait Plugin {
    fn id(&self) -> &str;

    fn name(&self) -> &str {
        self.id()
    }

    fn version(&self) -> &str {
        "1.0.0"
    }

    fn activate(&mut self, context: &mut PluginContext<'_>) -> anyhow::Result<()>;

    fn deactivate(&mut self) -> anyhow::Result<()> {
        Ok(())
    }
}

pub type ToolAction = Rc<dyn Fn(&mut Builder) -> anyhow::Result<()>>;

/// A named action exposed in the builder toolbar
#[derive(Clone)]
pub struct Tool {
    pub id: String,
    pub name: String,
    pub icon: Option<String>,
    pub category: String,
    pub action: ToolAction,
}

impl Tool {
    pub fn new<F>(id: impl Into<String>, name: impl Into<String>, action: F) -> Self
    where
        F: Fn(&mut Builder) -> anyhow::Result<()> + 'static,
    {
        Self {
            id: id.into(),
            name: name.into(),
            icon: None,
            category: "general".to_string(),
            action: Rc::new(action),
        }
    }

    pub fn with_icon(mut self, icon: impl Into<String>) -> Self {
        self.icon = Some(icon.into());
        self
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = category.into();
        self
    }
}

impl fmt::Debug for Tool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Tool")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("icon", &self.icon)
            .field("category", &self.category)
            .finish_non_exhaustive()
    }
}

/// An exporter a plugin installed, with whatever it replaced
pub(crate) type ExporterChange = (ExportFormat, Option<Rc<dyn Exporter>>);

/// Undo a plugin's exporter registrations, newest first
pub(crate) fn revert_exporters(registry: &mut ExporterRegistry, changes: Vec<ExporterChange>) {
    for (format, previous) in changes.into_iter().rev() {
        match previous {
            Some(exporter) => {
                registry.register(exporter);
            }
            None => {
                registry.remove(format);
            }
        }
    }
}

/// Registration hooks handed to [`Plugin::activate`]
pub struct PluginContext<'a> {
    pub(crate) library: &'a mut ComponentLibrary,
    pub(crate) tools: &'a mut BTreeMap<String, Tool>,
    pub(crate) exporters: &'a mut ExporterRegistry,
    pub(crate) bus: &'a mut EventBus,
    pub(crate) exporter_changes: Vec<ExporterChange>,
}

impl PluginContext<'_> {
    pub fn register_component(&mut self, metadata: ComponentMetadata) {
        self.library.register(metadata);
    }

    pub fn register_tool(&mut self, tool: Tool) {
        self.tools.insert(tool.id.clone(), tool);
    }

    pub fn register_exporter(&mut self, exporter: Rc<dyn Exporter>) {
        let format = exporter.format();
        let previous = self.exporters.register(exporter);
        self.exporter_changes.push((format, previous));
    }

    pub fn add_event_listener<F>(&mut self, kind: EventKind, listener: F) -> ListenerId
    where
        F: FnMut(&BuilderEvent) -> anyhow::Result<()> + 'static,
    {
        self.bus.on(kind, listener)
    }
}
