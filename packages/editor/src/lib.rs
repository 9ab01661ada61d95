//! # WB Editor
//!
//! State and document engine for the website builder.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │ common: ComponentNode model, ids, visitors  │
//! └─────────────────────────────────────────────┘
//!                     ↓
//! ┌─────────────────────────────────────────────┐
//! │ linter: per-type validation rules           │
//! └─────────────────────────────────────────────┘
//!                     ↓
//! ┌─────────────────────────────────────────────┐
//! │ editor: Builder                             │
//! │  - ComponentStore (arena + child ids)       │
//! │  - Mutations with validation                │
//! │  - SelectionModel                           │
//! │  - HistoryManager (snapshot undo/redo)      │
//! │  - EventBus (typed, synchronous)            │
//! │  - Import/export, plugins, auto-save        │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! ## Core Principles
//!
//! 1. **One owner per node**: the store arena holds node data; parents hold ids
//! 2. **Validate, then mutate**: a failed operation leaves no partial change
//! 3. **Snapshots for history**: undo restores the state before the change
//! 4. **Isolated listeners**: a failing listener never breaks the operation
//!
//! ## Usage
//!
//! ```rust,ignore
//! use wb_editor::{Builder, ComponentNode, EventKind};
//!
//! let mut builder = Builder::new();
//! builder.initialize();
//!
//! builder.on(EventKind::NodeAdded, |event| {
//!     println!("{:?}", event);
//!     Ok(())
//! });
//!
//! let page = builder.add_component(ComponentNode::new("container"), None, None)?;
//! builder.add_component(
//!     ComponentNode::new("text").with_prop("content", "Hello"),
//!     Some(&page.id),
//!     None,
//! )?;
//!
//! builder.undo();
//! builder.redo();
//!
//! let json = builder.export(&ExportOptions::new(ExportFormat::Json)).await?;
//! ```

mod abort;
mod builder;
mod config;
mod errors;
mod events;
mod export;
mod history;
mod import;
mod library;
mod mutations;
mod persistence;
mod plugin;
mod selection;
mod state;
mod store;

pub use abort::{AbortController, AbortSignal};
pub use builder::Builder;
pub use config::{
    BuilderConfig, BuilderSettings, CanvasState, Dimensions, Point, Theme, UiState, DEFAULT_CONFIG_NAME,
};
pub use errors::BuilderError;
pub use events::{BuilderEvent, EventBus, EventKind, Listener, ListenerId};
pub use export::{ExportFormat, ExportOptions, Exporter, ExporterRegistry, JsonExporter};
pub use history::{HistoryEntry, HistoryManager, HistoryStats};
pub use import::{ImportFormat, ImportOptions, Importer, ImporterRegistry, JsonImporter};
pub use library::{ComponentLibrary, TemplateConfig, TemplateMetadata};
pub use mutations::{Mutation, MutationError, MutationResult, NodePatch};
pub use persistence::{
    load_forest, spawn_auto_save, AutoSaveHandle, FileStore, KeyValueStore, MemoryStore, AUTOSAVE_KEY,
};
pub use plugin::{Plugin, PluginContext, Tool, ToolAction};
pub use selection::SelectionModel;
pub use state::BuilderState;
pub use store::{ComponentStore, StoredNode};

// Re-export common types for convenience
pub use wb_common::{ComponentMetadata, ComponentNode, IdGenerator, PropValue, Props};
pub use wb_linter::{codes, Diagnostic, DiagnosticLevel, ValidationEngine, ValidationResult, ValidationRule};
