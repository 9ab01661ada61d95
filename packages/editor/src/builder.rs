//! # Builder
//!
//! Orchestrates the store, selection, validation, history and event bus.
//!
//! Every structural change follows the same path:
//!
//! ```text
//! snapshot(before) → Mutation::apply (validate, then mutate)
//!   → selection.observe → snapshot(after) → history.save_state
//!   → publish forest (auto-save) → emit event
//! ```
//!
//! A failed mutation returns before the store is touched, so there is nothing
//! to record and nothing to emit.

use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;
use std::rc::Rc;
use std::sync::Arc;

use tokio::sync::watch;
use tracing::{debug, error, info, instrument, warn};
use wb_common::{ComponentNode, IdGenerator, PropValue};
use wb_linter::{ValidationEngine, ValidationResult, ValidationRule};

use crate::abort::AbortSignal;
use crate::config::{BuilderConfig, BuilderSettings, CanvasState, UiState};
use crate::errors::BuilderError;
use crate::events::{BuilderEvent, EventBus, EventKind, ListenerId};
use crate::export::{ExportFormat, ExportOptions, Exporter, ExporterRegistry};
use crate::history::HistoryManager;
use crate::import::{ImportOptions, Importer, ImporterRegistry};
use crate::library::{ComponentLibrary, TemplateConfig};
use crate::mutations::{Mutation, MutationError, MutationResult, NodePatch};
use crate::persistence::{self, AutoSaveHandle, KeyValueStore};
use crate::plugin::{revert_exporters, ExporterChange, Plugin, PluginContext, Tool};
use crate::selection::SelectionModel;
use crate::state::BuilderState;
use crate::store::ComponentStore;

struct PluginSlot {
    plugin: Box<dyn Plugin>,
    active: bool,
    exporters: Vec<ExporterChange>,
}

pub struct Builder {
    store: ComponentStore,
    selection: SelectionModel,
    canvas: CanvasState,
    ui: UiState,
    settings: BuilderSettings,
    clipboard: Vec<ComponentNode>,
    history: HistoryManager,
    validation: ValidationEngine,
    bus: EventBus,
    ids: IdGenerator,
    library: ComponentLibrary,
    tools: BTreeMap<String, Tool>,
    exporters: ExporterRegistry,
    importers: ImporterRegistry,
    plugins: Vec<PluginSlot>,
    initialized: bool,
    forest_tx: watch::Sender<Arc<Vec<ComponentNode>>>,
}

impl Builder {
    pub fn new() -> Self {
        Self::with_config(BuilderConfig::default())
    }

    pub fn with_settings(settings: BuilderSettings) -> Self {
        Self::with_config(BuilderConfig {
            settings,
            ..Default::default()
        })
    }

    pub fn with_config(config: BuilderConfig) -> Self {
        let BuilderConfig { settings, canvas, ui } = config;
        let (forest_tx, _) = watch::channel(Arc::new(Vec::new()));

        Self {
            store: ComponentStore::new(),
            selection: SelectionModel::new(),
            canvas,
            ui,
            history: HistoryManager::new(settings.undo_limit),
            library: ComponentLibrary::new(settings.default_component_library.clone(), "Components"),
            settings,
            clipboard: Vec::new(),
            validation: ValidationEngine::new(),
            bus: EventBus::new(),
            ids: IdGenerator::new("wb"),
            tools: BTreeMap::new(),
            exporters: ExporterRegistry::new(),
            importers: ImporterRegistry::new(),
            plugins: Vec::new(),
            initialized: false,
            forest_tx,
        }
    }

    /// Builder configured from `wb.config.json` in `dir`, if present
    pub fn from_config_dir(dir: impl AsRef<Path>) -> Result<Self, BuilderError> {
        Ok(Self::with_config(BuilderConfig::load(dir)?))
    }

    /// Replace the id generator (deterministic ids in tests and tools)
    pub fn with_id_generator(mut self, ids: IdGenerator) -> Self {
        self.ids = ids;
        self
    }

    // ---- lifecycle ----

    /// Load the default component library and activate registered plugins
    ///
    /// A plugin that fails to activate is logged and left inactive.
    pub fn initialize(&mut self) {
        if self.initialized {
            warn!("Builder already initialized");
            return;
        }

        for metadata in ComponentLibrary::default_library().components {
            self.library.register(metadata);
        }

        for index in 0..self.plugins.len() {
            if let Err(err) = self.activate_plugin(index) {
                error!(error = %err, "Plugin activation failed");
            }
        }

        self.initialized = true;
        info!(
            components = self.library.components.len(),
            plugins = self.plugins.len(),
            "Builder initialized"
        );
        self.bus.emit(&BuilderEvent::Initialized);
    }

    /// Deactivate plugins and drop all state, history and listeners
    ///
    /// Exporters registered by the host survive. A running auto-save task is
    /// stopped without writing, so the last saved forest is kept.
    pub fn destroy(&mut self) {
        for slot in self.plugins.iter_mut().filter(|slot| slot.active) {
            if let Err(err) = slot.plugin.deactivate() {
                warn!(plugin = slot.plugin.id(), error = %err, "Plugin deactivation failed");
            }
            revert_exporters(&mut self.exporters, std::mem::take(&mut slot.exporters));
            slot.active = false;
        }

        // Dropping the sender ends any auto-save loop before the store empties
        self.forest_tx = watch::channel(Arc::new(Vec::new())).0;

        self.store.clear();
        self.selection.clear();
        self.clipboard.clear();
        self.history.clear();
        self.tools.clear();
        self.library = ComponentLibrary::new(self.settings.default_component_library.clone(), "Components");
        self.initialized = false;

        self.bus.emit(&BuilderEvent::Destroyed);
        self.bus.remove_all_listeners(None);
        info!("Builder destroyed");
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    // ---- structural mutations ----

    /// Apply a mutation, record it in history and emit its event
    pub fn apply(&mut self, mutation: Mutation) -> Result<MutationResult, BuilderError> {
        let before = self.snapshot();

        let result = match mutation.apply(&mut self.store, &mut self.ids, &self.validation) {
            Ok(result) => result,
            Err(err) => {
                debug!(action = mutation.action(), error = %err, "Mutation rejected");
                return Err(err.into());
            }
        };

        let event = event_for(&result);
        let selection_changed = self.selection.observe(&event);

        let after = self.snapshot();
        self.history
            .save_state(before, after, mutation.action(), mutation.describe());
        self.publish_forest();

        debug!(action = mutation.action(), nodes = self.store.len(), "Mutation applied");
        self.bus.emit(&event);
        if selection_changed {
            self.emit_selection();
        }

        Ok(result)
    }

    /// Add a node (and its children). Returns the node with ids assigned.
    pub fn add_component(
        &mut self,
        node: ComponentNode,
        parent_id: Option<&str>,
        index: Option<usize>,
    ) -> Result<ComponentNode, BuilderError> {
        let result = self.apply(Mutation::AddNode {
            node,
            parent_id: parent_id.map(str::to_string),
            index,
        })?;

        match result {
            MutationResult::Added { node } => Ok(node),
            _ => Err(MutationError::InvalidStructure("unexpected mutation result".to_string()).into()),
        }
    }

    /// Remove a node and its subtree. Returns every removed id.
    pub fn remove_component(&mut self, id: &str) -> Result<Vec<String>, BuilderError> {
        let result = self.apply(Mutation::RemoveNode {
            node_id: id.to_string(),
        })?;

        match result {
            MutationResult::Removed { removed_ids, .. } => Ok(removed_ids),
            _ => Err(MutationError::InvalidStructure("unexpected mutation result".to_string()).into()),
        }
    }

    pub fn update_component(&mut self, id: &str, patch: NodePatch) -> Result<ComponentNode, BuilderError> {
        let result = self.apply(Mutation::UpdateNode {
            node_id: id.to_string(),
            patch,
        })?;

        match result {
            MutationResult::Updated { node } => Ok(node),
            _ => Err(MutationError::InvalidStructure("unexpected mutation result".to_string()).into()),
        }
    }

    /// Set a single prop, keeping the others
    pub fn set_prop(
        &mut self,
        id: &str,
        key: impl Into<String>,
        value: impl Into<PropValue>,
    ) -> Result<ComponentNode, BuilderError> {
        let mut props = self
            .store
            .get(id)
            .ok_or_else(|| MutationError::NodeNotFound(id.to_string()))?
            .props
            .clone();
        props.insert(key.into(), value.into());

        self.update_component(id, NodePatch::new().props(props))
    }

    /// Move a node under `parent_id` (None = root). Returns the final index.
    pub fn move_component(&mut self, id: &str, parent_id: Option<&str>, index: usize) -> Result<usize, BuilderError> {
        let result = self.apply(Mutation::MoveNode {
            node_id: id.to_string(),
            new_parent_id: parent_id.map(str::to_string),
            index,
        })?;

        match result {
            MutationResult::Moved { index, .. } => Ok(index),
            _ => Err(MutationError::InvalidStructure("unexpected mutation result".to_string()).into()),
        }
    }

    /// Insert a fresh-id copy of `id` right after it
    pub fn duplicate(&mut self, id: &str) -> Result<ComponentNode, BuilderError> {
        let copy = self
            .store
            .tree(id)
            .ok_or_else(|| MutationError::NodeNotFound(id.to_string()))?
            .without_ids();
        let parent = self.store.parent_of(id).map(str::to_string);
        let index = self.store.position_of(id).map(|position| position + 1);

        self.add_component(copy, parent.as_deref(), index)
    }

    /// Remove every node (undoable)
    pub fn clear(&mut self) {
        if self.store.is_empty() {
            return;
        }

        let before = self.snapshot();
        self.store.clear();
        let selection_changed = self.selection.observe(&BuilderEvent::TreeCleared);
        let after = self.snapshot();

        self.history.save_state(before, after, "clear", "Clear all components");
        self.publish_forest();

        self.bus.emit(&BuilderEvent::TreeCleared);
        if selection_changed {
            self.emit_selection();
        }
    }

    /// Run `f` as one history entry
    ///
    /// On error every change made by `f` is rolled back and nothing is recorded.
    pub fn transaction<T, F>(
        &mut self,
        action: impl Into<String>,
        description: impl Into<String>,
        f: F,
    ) -> Result<T, BuilderError>
    where
        F: FnOnce(&mut Self) -> Result<T, BuilderError>,
    {
        let before = self.snapshot();
        let outermost = !self.history.is_batching();
        self.history.begin_batch(before.clone(), action, description);

        match f(self) {
            Ok(value) => {
                let after = self.snapshot();
                self.history.end_batch(after);
                Ok(value)
            }
            Err(err) => {
                if outermost {
                    self.history.discard_batch();
                } else {
                    let current = self.snapshot();
                    self.history.end_batch(current);
                }

                debug!(error = %err, "Transaction rolled back");
                if self.snapshot() != before {
                    self.restore_and_notify(before);
                }
                Err(err)
            }
        }
    }

    /// Replace the forest with a template's components (one history entry)
    pub fn load_template(&mut self, template: &TemplateConfig) -> Result<Vec<String>, BuilderError> {
        let ids = self.transaction(
            "load-template",
            format!("Load template {}", template.name),
            |builder| builder.replace_forest(template.components.clone()),
        )?;

        info!(template = %template.id, roots = ids.len(), "Template loaded");
        self.bus.emit(&BuilderEvent::TemplateLoaded {
            template_id: template.id.clone(),
        });
        Ok(ids)
    }

    fn replace_forest(&mut self, nodes: Vec<ComponentNode>) -> Result<Vec<String>, BuilderError> {
        self.clear();
        nodes
            .into_iter()
            .map(|node| self.add_component(node, None, None).map(|node| node.id))
            .collect()
    }

    // ---- clipboard ----

    /// Copy the selected subtrees. Returns how many were copied.
    pub fn copy_selection(&mut self) -> usize {
        self.clipboard = self
            .selection
            .selected()
            .iter()
            .filter_map(|id| self.store.tree(id))
            .collect();
        self.clipboard.len()
    }

    /// Insert fresh-id copies of the clipboard (one history entry)
    pub fn paste(&mut self, parent_id: Option<&str>) -> Result<Vec<ComponentNode>, BuilderError> {
        if self.clipboard.is_empty() {
            return Ok(Vec::new());
        }

        let nodes = self.clipboard.clone();
        self.transaction("paste", format!("Paste {} component(s)", nodes.len()), |builder| {
            nodes
                .into_iter()
                .map(|node| builder.add_component(node.without_ids(), parent_id, None))
                .collect()
        })
    }

    pub fn clipboard(&self) -> &[ComponentNode] {
        &self.clipboard
    }

    // ---- selection ----

    /// Select nodes; unknown ids are skipped. Returns true if the selection changed.
    pub fn select_component<I, S>(&mut self, ids: I, append: bool) -> bool
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let changed = self.selection.select(ids, append, &self.store);
        if changed {
            self.emit_selection();
        }
        changed
    }

    pub fn clear_selection(&mut self) -> bool {
        let changed = self.selection.clear();
        if changed {
            self.emit_selection();
        }
        changed
    }

    pub fn selected(&self) -> &[String] {
        self.selection.selected()
    }

    pub fn active(&self) -> Option<&str> {
        self.selection.active()
    }

    // ---- history ----

    pub fn undo(&mut self) -> bool {
        let Some(state) = self.history.undo().cloned() else {
            return false;
        };

        self.restore_and_notify(state);
        true
    }

    pub fn redo(&mut self) -> bool {
        let Some(state) = self.history.redo().cloned() else {
            return false;
        };

        self.restore_and_notify(state);
        true
    }

    fn restore_and_notify(&mut self, state: BuilderState) {
        let selection_changed = state.selection != self.selection;
        self.restore(state);

        if selection_changed {
            self.emit_selection();
        }
        self.emit_state_changed();
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    pub fn history(&self) -> &HistoryManager {
        &self.history
    }

    /// Deep copy of the current state
    pub fn snapshot(&self) -> BuilderState {
        BuilderState {
            store: self.store.clone(),
            selection: self.selection.clone(),
            canvas: self.canvas.clone(),
            ui: self.ui.clone(),
        }
    }

    fn restore(&mut self, state: BuilderState) {
        let BuilderState {
            store,
            selection,
            canvas,
            ui,
        } = state;
        self.store = store;
        self.selection = selection;
        self.canvas = canvas;
        self.ui = ui;
        self.publish_forest();
    }

    // ---- validation ----

    /// Validate the whole forest
    pub fn validate(&self) -> ValidationResult {
        self.validation.validate_forest(&self.store.forest())
    }

    pub fn validate_component(&self, id: &str) -> Option<ValidationResult> {
        self.store
            .tree(id)
            .map(|node| self.validation.validate_component(&node))
    }

    pub fn register_rule(&mut self, component_type: impl Into<String>, rule: impl ValidationRule + 'static) {
        self.validation.register_rule(component_type, rule);
    }

    pub fn remove_rule(&mut self, component_type: &str) -> bool {
        self.validation.remove_rule(component_type)
    }

    pub fn list_rules(&self) -> Vec<&str> {
        self.validation.list_rules()
    }

    // ---- library, plugins, tools ----

    /// New node of a registered component type, without an id
    pub fn create_component(&self, component_type: &str) -> Option<ComponentNode> {
        self.library
            .get(component_type)
            .map(|metadata| ComponentNode::new(component_type).with_metadata(metadata.clone()))
    }

    pub fn library(&self) -> &ComponentLibrary {
        &self.library
    }

    /// Register a plugin. Activated now if the builder is already initialized.
    pub fn register_plugin(&mut self, plugin: Box<dyn Plugin>) -> Result<(), BuilderError> {
        if self.plugins.iter().any(|slot| slot.plugin.id() == plugin.id()) {
            return Err(BuilderError::plugin(plugin.id(), "already registered"));
        }

        self.plugins.push(PluginSlot {
            plugin,
            active: false,
            exporters: Vec::new(),
        });
        if self.initialized {
            self.activate_plugin(self.plugins.len() - 1)?;
        }
        Ok(())
    }

    fn activate_plugin(&mut self, index: usize) -> Result<(), BuilderError> {
        let Some(slot) = self.plugins.get_mut(index) else {
            return Ok(());
        };
        if slot.active {
            return Ok(());
        }

        let mut context = PluginContext {
            library: &mut self.library,
            tools: &mut self.tools,
            exporters: &mut self.exporters,
            bus: &mut self.bus,
            exporter_changes: Vec::new(),
        };
        let id = slot.plugin.id().to_string();
        let result = slot.plugin.activate(&mut context);
        let changes = std::mem::take(&mut context.exporter_changes);

        if let Err(err) = result {
            revert_exporters(&mut self.exporters, changes);
            return Err(BuilderError::plugin(&id, err));
        }
        slot.exporters = changes;
        slot.active = true;

        info!(plugin = %id, version = slot.plugin.version(), "Plugin activated");
        self.bus.emit(&BuilderEvent::PluginActivated { id });
        Ok(())
    }

    /// Ids of plugins that are currently active
    pub fn active_plugins(&self) -> Vec<&str> {
        self.plugins
            .iter()
            .filter(|slot| slot.active)
            .map(|slot| slot.plugin.id())
            .collect()
    }

    pub fn tools(&self) -> impl Iterator<Item = &Tool> {
        self.tools.values()
    }

    pub fn run_tool(&mut self, id: &str) -> Result<(), BuilderError> {
        let action = self
            .tools
            .get(id)
            .map(|tool| tool.action.clone())
            .ok_or_else(|| BuilderError::ToolNotFound(id.to_string()))?;

        (*action)(self).map_err(|err| BuilderError::plugin(id, err))
    }

    pub fn register_exporter(&mut self, exporter: Rc<dyn Exporter>) {
        self.exporters.register(exporter);
    }

    pub fn register_importer(&mut self, importer: Rc<dyn Importer>) {
        self.importers.register(importer);
    }

    // ---- events ----

    pub fn on<F>(&mut self, kind: EventKind, listener: F) -> ListenerId
    where
        F: FnMut(&BuilderEvent) -> anyhow::Result<()> + 'static,
    {
        self.bus.on(kind, listener)
    }

    pub fn once<F>(&mut self, kind: EventKind, listener: F) -> ListenerId
    where
        F: FnMut(&BuilderEvent) -> anyhow::Result<()> + 'static,
    {
        self.bus.once(kind, listener)
    }

    pub fn off(&mut self, kind: EventKind, id: ListenerId) -> bool {
        self.bus.off(kind, id)
    }

    fn emit_selection(&mut self) {
        let event = self.selection.changed_event();
        self.bus.emit(&event);
    }

    fn emit_state_changed(&mut self) {
        let event = BuilderEvent::StateChanged {
            can_undo: self.history.can_undo(),
            can_redo: self.history.can_redo(),
        };
        self.bus.emit(&event);
    }

    // ---- import / export ----

    pub async fn export(&self, options: &ExportOptions) -> Result<String, BuilderError> {
        self.export_with_signal(options, &AbortSignal::never()).await
    }

    /// Export the forest, failing with `Cancelled` if `signal` fires first
    ///
    /// Formats other than JSON require a forest without validation errors.
    #[instrument(skip(self, options, signal), fields(format = %options.format))]
    pub async fn export_with_signal(
        &self,
        options: &ExportOptions,
        signal: &AbortSignal,
    ) -> Result<String, BuilderError> {
        let result = self.run_export(options, signal).await;
        if let Err(err) = &result {
            error!(error = %err, "Export failed");
        }
        result
    }

    async fn run_export(&self, options: &ExportOptions, signal: &AbortSignal) -> Result<String, BuilderError> {
        if signal.is_aborted() {
            return Err(BuilderError::Cancelled);
        }

        let exporter = self
            .exporters
            .get(options.format)
            .ok_or_else(|| BuilderError::UnsupportedFormat {
                direction: "export",
                format: options.format.to_string(),
            })?;

        let forest = self.store.forest();
        if options.format != ExportFormat::Json {
            let validation = self.validation.validate_forest(&forest);
            if !validation.valid {
                return Err(BuilderError::ValidationFailed {
                    errors: validation.errors,
                });
            }
        }

        tokio::select! {
            biased;
            _ = signal.aborted() => Err(BuilderError::Cancelled),
            output = exporter.export(&forest, options) => output.map_err(BuilderError::Export),
        }
    }

    pub async fn import(&mut self, data: &str, options: &ImportOptions) -> Result<Vec<String>, BuilderError> {
        self.import_with_signal(data, options, &AbortSignal::never()).await
    }

    /// Parse `data` and add the nodes as new roots. Returns the root ids.
    ///
    /// All or nothing: on failure the forest and history are unchanged.
    #[instrument(skip(self, data, options, signal), fields(format = %options.format))]
    pub async fn import_with_signal(
        &mut self,
        data: &str,
        options: &ImportOptions,
        signal: &AbortSignal,
    ) -> Result<Vec<String>, BuilderError> {
        let result = self.run_import(data, options, signal).await;
        match &result {
            Ok(ids) => info!(roots = ids.len(), "Import complete"),
            Err(err) => error!(error = %err, "Import failed"),
        }
        result
    }

    async fn run_import(
        &mut self,
        data: &str,
        options: &ImportOptions,
        signal: &AbortSignal,
    ) -> Result<Vec<String>, BuilderError> {
        if signal.is_aborted() {
            return Err(BuilderError::Cancelled);
        }

        let importer = self
            .importers
            .get(options.format)
            .ok_or_else(|| BuilderError::UnsupportedFormat {
                direction: "import",
                format: options.format.to_string(),
            })?;

        let nodes = tokio::select! {
            biased;
            _ = signal.aborted() => Err(BuilderError::Cancelled),
            nodes = importer.import(data, options) => nodes.map_err(BuilderError::Import),
        }?;

        self.merge_imported(nodes, options)
    }

    fn merge_imported(
        &mut self,
        nodes: Vec<ComponentNode>,
        options: &ImportOptions,
    ) -> Result<Vec<String>, BuilderError> {
        let mut nodes: Vec<ComponentNode> = if options.preserve_ids {
            nodes
        } else {
            nodes.into_iter().map(ComponentNode::without_ids).collect()
        };
        self.store.assign_forest_ids(&mut nodes, &mut self.ids);

        if options.validate_components {
            let validation = self.validation.validate_forest(&nodes);
            if !validation.valid {
                return Err(BuilderError::ValidationFailed {
                    errors: validation.errors,
                });
            }
        }

        // Check the whole batch up front so a late failure cannot emit partial events
        self.store.check_ids_available(&nodes)?;
        if let Some(diagnostic) = nodes
            .iter()
            .flat_map(|node| self.validation.structural_errors(node))
            .next()
        {
            return Err(MutationError::InvalidStructure(diagnostic.message).into());
        }

        let ids = self.transaction("import", format!("Import {} component(s)", nodes.len()), |builder| {
            nodes
                .into_iter()
                .map(|node| builder.add_component(node, None, None).map(|node| node.id))
                .collect::<Result<Vec<_>, _>>()
        })?;

        self.bus.emit(&BuilderEvent::ComponentsImported { ids: ids.clone() });
        Ok(ids)
    }

    // ---- persistence ----

    /// Start writing the forest to `store` every `auto_save_interval_ms`
    pub fn start_auto_save(&self, store: Arc<dyn KeyValueStore>) -> Result<AutoSaveHandle, BuilderError> {
        if !self.settings.auto_save {
            return Err(BuilderError::Config("auto-save is disabled".to_string()));
        }

        self.forest_tx.send_replace(Arc::new(self.store.forest()));
        persistence::spawn_auto_save(store, self.forest_tx.subscribe(), self.settings.auto_save_interval())
    }

    /// Replace the forest with the auto-saved one. Returns false if nothing was saved.
    pub fn load_autosave(&mut self, store: &dyn KeyValueStore) -> Result<bool, BuilderError> {
        let Some(nodes) = persistence::load_forest(store)? else {
            return Ok(false);
        };

        self.transaction("load", "Restore auto-save", |builder| builder.replace_forest(nodes))?;
        Ok(true)
    }

    fn publish_forest(&self) {
        if self.forest_tx.receiver_count() > 0 {
            self.forest_tx.send_replace(Arc::new(self.store.forest()));
        }
    }

    // ---- canvas / ui ----

    pub fn store(&self) -> &ComponentStore {
        &self.store
    }

    pub fn get_component(&self, id: &str) -> Option<ComponentNode> {
        self.store.tree(id)
    }

    pub fn canvas(&self) -> &CanvasState {
        &self.canvas
    }

    pub fn ui(&self) -> &UiState {
        &self.ui
    }

    pub fn settings(&self) -> &BuilderSettings {
        &self.settings
    }

    pub fn update_canvas(&mut self, f: impl FnOnce(&mut CanvasState)) {
        f(&mut self.canvas);
        self.bus.emit(&BuilderEvent::CanvasChanged);
    }

    pub fn update_ui(&mut self, f: impl FnOnce(&mut UiState)) {
        f(&mut self.ui);
    }
}

impl Default for Builder {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Builder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Builder")
            .field("nodes", &self.store.len())
            .field("selected", &self.selection.selected())
            .field("history", &self.history.stats())
            .field("plugins", &self.plugins.len())
            .field("initialized", &self.initialized)
            .finish_non_exhaustive()
    }
}

fn event_for(result: &MutationResult) -> BuilderEvent {
    match result {
        MutationResult::Added { node } => BuilderEvent::NodeAdded { node: node.clone() },
        MutationResult::Removed { id, removed_ids } => BuilderEvent::NodeRemoved {
            id: id.clone(),
            removed_ids: removed_ids.clone(),
        },
        MutationResult::Updated { node } => BuilderEvent::NodeUpdated { node: node.clone() },
        MutationResult::Moved { id, parent_id, index } => BuilderEvent::NodeMoved {
            id: id.clone(),
            parent_id: parent_id.clone(),
            index: *index,
        },
    }
}
