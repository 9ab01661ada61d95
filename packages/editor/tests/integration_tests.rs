//! Integration tests for the editor crate

use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use wb_editor::{
    codes, load_forest, AbortController, Builder, BuilderError, BuilderEvent, BuilderSettings,
    ComponentMetadata, ComponentNode, EventKind, ExportFormat, ExportOptions, Exporter, IdGenerator,
    ImportFormat, ImportOptions, Importer, KeyValueStore, MemoryStore, Plugin, PluginContext,
    TemplateConfig, Tool, AUTOSAVE_KEY,
};

fn init_tracing() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}

fn builder() -> Builder {
    init_tracing();
    Builder::new().with_id_generator(IdGenerator::from_seed("wb", "it"))
}

fn sample_page(builder: &mut Builder) -> String {
    let page = builder
        .add_component(ComponentNode::new("container").with_style("padding", "8px"), None, None)
        .unwrap();
    builder
        .add_component(
            ComponentNode::new("text").with_prop("content", "Welcome"),
            Some(&page.id),
            None,
        )
        .unwrap();
    builder
        .add_component(
            ComponentNode::new("button")
                .with_prop("text", "Sign up")
                .with_event("click", "onSignup"),
            Some(&page.id),
            None,
        )
        .unwrap();
    page.id
}

struct HtmlExporter;

#[async_trait(?Send)]
impl Exporter for HtmlExporter {
    fn id(&self) -> &str {
        "html"
    }

    fn format(&self) -> ExportFormat {
        ExportFormat::Html
    }

    async fn export(&self, nodes: &[ComponentNode], _options: &ExportOptions) -> anyhow::Result<String> {
        fn render(node: &ComponentNode, out: &mut String) {
            out.push_str(&format!("<{} id=\"{}\">", node.component_type, node.id));
            for child in &node.children {
                render(child, out);
            }
            out.push_str(&format!("</{}>", node.component_type));
        }

        let mut out = String::new();
        for node in nodes {
            render(node, &mut out);
        }
        Ok(out)
    }
}

struct FixedExporter(ExportFormat, &'static str);

#[async_trait(?Send)]
impl Exporter for FixedExporter {
    fn id(&self) -> &str {
        self.1
    }

    fn format(&self) -> ExportFormat {
        self.0
    }

    async fn export(&self, _nodes: &[ComponentNode], _options: &ExportOptions) -> anyhow::Result<String> {
        Ok(self.1.to_string())
    }
}

/// Records the options it was called with
#[derive(Default)]
struct RecordingImporter {
    merge_styles: Rc<Cell<Option<bool>>>,
}

#[async_trait(?Send)]
impl Importer for RecordingImporter {
    fn id(&self) -> &str {
        "recording-html"
    }

    fn format(&self) -> ImportFormat {
        ImportFormat::Html
    }

    async fn import(&self, _data: &str, options: &ImportOptions) -> anyhow::Result<Vec<ComponentNode>> {
        self.merge_styles.set(Some(options.merge_styles));
        Ok(vec![ComponentNode::new("container")])
    }
}

struct SlowExporter;

#[async_trait(?Send)]
impl Exporter for SlowExporter {
    fn id(&self) -> &str {
        "slow-vue"
    }

    fn format(&self) -> ExportFormat {
        ExportFormat::Vue
    }

    async fn export(&self, _nodes: &[ComponentNode], _options: &ExportOptions) -> anyhow::Result<String> {
        tokio::time::sleep(Duration::from_secs(60)).await;
        Ok("<template></template>".to_string())
    }
}

#[derive(Default)]
struct ExportPlugin {
    activations: Rc<Cell<usize>>,
    deactivated: Rc<Cell<bool>>,
    seen: Rc<RefCell<Vec<String>>>,
}

impl Plugin for ExportPlugin {
    fn id(&self) -> &str {
        "html-export"
    }

    fn activate(&mut self, context: &mut PluginContext<'_>) -> anyhow::Result<()> {
        self.activations.set(self.activations.get() + 1);

        context.register_component(ComponentMetadata::for_type("carousel").with_category("media"));
        context.register_exporter(Rc::new(HtmlExporter));
        context.register_tool(Tool::new("clear-all", "Clear canvas", |builder| {
            builder.clear();
            Ok(())
        }));
        context.register_tool(Tool::new("broken", "Broken", |_| Err(anyhow::anyhow!("not today"))));

        let seen = self.seen.clone();
        context.add_event_listener(EventKind::NodeAdded, move |event| {
            if let BuilderEvent::NodeAdded { node } = event {
                seen.borrow_mut().push(node.id.clone());
            }
            Ok(())
        });
        Ok(())
    }

    fn deactivate(&mut self) -> anyhow::Result<()> {
        self.deactivated.set(true);
        Ok(())
    }
}

struct FailingPlugin;

impl Plugin for FailingPlugin {
    fn id(&self) -> &str {
        "failing"
    }

    fn activate(&mut self, _context: &mut PluginContext<'_>) -> anyhow::Result<()> {
        anyhow::bail!("missing license")
    }
}

/// Registers an exporter, then fails
struct HalfwayPlugin;

impl Plugin for HalfwayPlugin {
    fn id(&self) -> &str {
        "halfway"
    }

    fn activate(&mut self, context: &mut PluginContext<'_>) -> anyhow::Result<()> {
        context.register_exporter(Rc::new(FixedExporter(ExportFormat::Angular, "angular")));
        anyhow::bail!("gave up")
    }
}

// ---- import / export ----

#[tokio::test]
async fn test_json_round_trip() {
    let mut builder = builder();
    sample_page(&mut builder);

    let json = builder
        .export(&ExportOptions::new(ExportFormat::Json))
        .await
        .unwrap();

    let mut other = Builder::new();
    let ids = other
        .import(&json, &ImportOptions::new(ImportFormat::Json).preserving_ids())
        .await
        .unwrap();

    assert_eq!(ids.len(), 1);
    assert_eq!(other.store().forest(), builder.store().forest());
}

#[tokio::test]
async fn test_import_assigns_fresh_ids() {
    let mut builder = builder();
    let data = r#"[{"id": "x", "type": "container", "metadata": {"name": "container"},
                   "children": [{"id": "y", "type": "text", "metadata": {"name": "text"}}]}]"#;

    let ids = builder
        .import(data, &ImportOptions::new(ImportFormat::Json))
        .await
        .unwrap();

    assert_ne!(ids[0], "x");
    assert!(!builder.store().contains("y"));
    assert_eq!(builder.store().len(), 2);
    assert_eq!(builder.history().len(), 1);
}

#[tokio::test]
async fn test_import_is_atomic() {
    let mut builder = builder();
    builder
        .add_component(ComponentNode::new("text").with_id("taken"), None, None)
        .unwrap();
    let before = builder.snapshot();

    let data = r#"[
        {"id": "fresh", "type": "text", "metadata": {"name": "text"}},
        {"id": "taken", "type": "text", "metadata": {"name": "text"}}
    ]"#;
    let err = builder
        .import(data, &ImportOptions::new(ImportFormat::Json).preserving_ids())
        .await
        .unwrap_err();

    assert!(matches!(err, BuilderError::Mutation(_)));
    assert_eq!(builder.snapshot(), before);
    assert_eq!(builder.history().len(), 1);
}

#[tokio::test]
async fn test_import_validation() {
    let mut builder = builder();
    let data = r#"[{"id": "img", "type": "image", "metadata": {"name": "image"}}]"#;

    let err = builder
        .import(data, &ImportOptions::new(ImportFormat::Json).validated())
        .await
        .unwrap_err();

    match err {
        BuilderError::ValidationFailed { errors } => {
            assert_eq!(errors[0].code, codes::MISSING_IMAGE_SRC);
        }
        other => panic!("unexpected error: {}", other),
    }
    assert!(builder.store().is_empty());

    // Without validation the same data imports fine
    builder
        .import(data, &ImportOptions::new(ImportFormat::Json))
        .await
        .unwrap();
    assert_eq!(builder.store().len(), 1);
}

#[tokio::test]
async fn test_import_options_reach_importer() {
    let mut builder = builder();
    let importer = RecordingImporter::default();
    let merge_styles = importer.merge_styles.clone();
    builder.register_importer(Rc::new(importer));

    builder
        .import("<div></div>", &ImportOptions::new(ImportFormat::Html).merging_styles())
        .await
        .unwrap();

    assert_eq!(merge_styles.get(), Some(true));
    assert_eq!(builder.store().len(), 1);
}

#[tokio::test]
async fn test_import_parse_failure() {
    let mut builder = builder();
    let err = builder
        .import("not json", &ImportOptions::new(ImportFormat::Json))
        .await
        .unwrap_err();

    assert!(matches!(err, BuilderError::Import(_)));
}

#[tokio::test]
async fn test_unsupported_formats() {
    let mut builder = builder();

    let err = builder
        .export(&ExportOptions::new(ExportFormat::React))
        .await
        .unwrap_err();
    assert!(matches!(err, BuilderError::UnsupportedFormat { direction: "export", .. }));

    let err = builder
        .import("", &ImportOptions::new(ImportFormat::Zip))
        .await
        .unwrap_err();
    assert!(matches!(err, BuilderError::UnsupportedFormat { direction: "import", .. }));
}

#[tokio::test]
async fn test_export_blocked_by_validation_errors() {
    let mut builder = builder();
    builder.register_exporter(Rc::new(HtmlExporter));
    let image = builder
        .add_component(ComponentNode::new("image"), None, None)
        .unwrap();

    let err = builder
        .export(&ExportOptions::new(ExportFormat::Html))
        .await
        .unwrap_err();
    assert!(matches!(err, BuilderError::ValidationFailed { .. }));

    // JSON export is a raw dump and is not gated
    assert!(builder
        .export(&ExportOptions::new(ExportFormat::Json))
        .await
        .is_ok());

    builder.set_prop(&image.id, "src", "hero.png").unwrap();
    let html = builder
        .export(&ExportOptions::new(ExportFormat::Html))
        .await
        .unwrap();
    assert_eq!(html, format!("<image id=\"{}\"></image>", image.id));
}

#[tokio::test]
async fn test_export_cancelled_before_start() {
    let builder = builder();
    let controller = AbortController::new();
    controller.abort();

    let err = builder
        .export_with_signal(&ExportOptions::new(ExportFormat::Json), &controller.signal())
        .await
        .unwrap_err();
    assert!(matches!(err, BuilderError::Cancelled));
}

#[tokio::test(start_paused = true)]
async fn test_export_cancelled_in_flight() {
    let mut builder = builder();
    builder.register_exporter(Rc::new(SlowExporter));
    let controller = AbortController::new();
    let signal = controller.signal();
    let options = ExportOptions::new(ExportFormat::Vue);

    let (result, _) = tokio::join!(
        builder.export_with_signal(&options, &signal),
        async {
            tokio::time::sleep(Duration::from_secs(1)).await;
            controller.abort();
        }
    );

    assert!(matches!(result, Err(BuilderError::Cancelled)));
}

// ---- validation ----

#[test]
fn test_validation_examples() {
    let mut builder = builder();

    let image = builder
        .add_component(ComponentNode::new("image"), None, None)
        .unwrap();
    let result = builder.validate_component(&image.id).unwrap();
    assert!(!result.valid);
    assert!(result.has_error(codes::MISSING_IMAGE_SRC));

    let with_src = builder
        .add_component(ComponentNode::new("image").with_prop("src", "x.png"), None, None)
        .unwrap();
    let result = builder.validate_component(&with_src.id).unwrap();
    assert!(result.valid);
    assert_eq!(result.warnings.len(), 1);
    assert_eq!(result.warnings[0].code, codes::MISSING_ALT_TEXT);

    let button = builder
        .add_component(ComponentNode::new("button"), None, None)
        .unwrap();
    let result = builder.validate_component(&button.id).unwrap();
    assert!(result.valid);
    assert!(result.has_warning(codes::EMPTY_BUTTON));

    assert!(!builder.validate().valid);
}

// ---- plugins, tools, lifecycle ----

#[tokio::test]
async fn test_plugin_lifecycle() {
    let mut builder = builder();
    let plugin = ExportPlugin::default();
    let activations = plugin.activations.clone();
    let deactivated = plugin.deactivated.clone();
    let seen = plugin.seen.clone();

    builder.register_plugin(Box::new(plugin)).unwrap();
    builder.register_plugin(Box::new(FailingPlugin)).unwrap();
    assert_eq!(activations.get(), 0);

    builder.initialize();
    builder.initialize();
    assert_eq!(activations.get(), 1);
    assert_eq!(builder.active_plugins(), vec!["html-export"]);

    // registered component, exporter and listener are live
    assert!(builder.create_component("carousel").is_some());
    let page = sample_page(&mut builder);
    assert_eq!(seen.borrow().len(), 3);
    let html = builder
        .export(&ExportOptions::new(ExportFormat::Html))
        .await
        .unwrap();
    assert!(html.starts_with(&format!("<container id=\"{}\">", page)));

    builder.destroy();
    assert!(deactivated.get());
    assert!(builder.store().is_empty());
    assert!(!builder.is_initialized());

    // listeners were dropped with the old session
    builder
        .add_component(ComponentNode::new("text"), None, None)
        .unwrap();
    assert_eq!(seen.borrow().len(), 3);

    // and so was the plugin's exporter
    assert!(matches!(
        builder.export(&ExportOptions::new(ExportFormat::Html)).await,
        Err(BuilderError::UnsupportedFormat { .. })
    ));
}

#[tokio::test]
async fn test_destroy_keeps_host_exporters() {
    let mut builder = builder();
    builder.register_exporter(Rc::new(FixedExporter(ExportFormat::Html, "<html></html>")));
    builder.register_exporter(Rc::new(FixedExporter(ExportFormat::React, "<App />")));
    builder
        .register_plugin(Box::new(ExportPlugin::default()))
        .unwrap();
    let html = ExportOptions::new(ExportFormat::Html);
    let react = ExportOptions::new(ExportFormat::React);

    builder.initialize();
    // the plugin's exporter replaces the host one while active
    assert_eq!(builder.export(&html).await.unwrap(), "");

    builder.destroy();
    assert_eq!(builder.export(&html).await.unwrap(), "<html></html>");
    assert_eq!(builder.export(&react).await.unwrap(), "<App />");

    builder.initialize();
    assert_eq!(builder.export(&react).await.unwrap(), "<App />");
}

#[tokio::test]
async fn test_failed_activation_reverts_exporters() {
    let mut builder = builder();
    builder.register_plugin(Box::new(HalfwayPlugin)).unwrap();
    builder.initialize();

    assert!(builder.active_plugins().is_empty());
    assert!(matches!(
        builder.export(&ExportOptions::new(ExportFormat::Angular)).await,
        Err(BuilderError::UnsupportedFormat { .. })
    ));
}

#[test]
fn test_register_duplicate_plugin() {
    let mut builder = builder();
    builder
        .register_plugin(Box::new(ExportPlugin::default()))
        .unwrap();

    let err = builder
        .register_plugin(Box::new(ExportPlugin::default()))
        .unwrap_err();
    assert!(matches!(err, BuilderError::Plugin { .. }));
}

#[test]
fn test_late_plugin_failure_is_reported() {
    let mut builder = builder();
    builder.initialize();

    let err = builder.register_plugin(Box::new(FailingPlugin)).unwrap_err();
    match err {
        BuilderError::Plugin { id, message } => {
            assert_eq!(id, "failing");
            assert_eq!(message, "missing license");
        }
        other => panic!("unexpected error: {}", other),
    }
}

#[test]
fn test_run_tool() {
    let mut builder = builder();
    builder
        .register_plugin(Box::new(ExportPlugin::default()))
        .unwrap();
    builder.initialize();
    sample_page(&mut builder);

    builder.run_tool("clear-all").unwrap();
    assert!(builder.store().is_empty());
    assert!(builder.undo());
    assert_eq!(builder.store().len(), 3);

    assert!(matches!(
        builder.run_tool("missing"),
        Err(BuilderError::ToolNotFound(_))
    ));
    assert!(matches!(
        builder.run_tool("broken"),
        Err(BuilderError::Plugin { .. })
    ));
}

// ---- events ----

#[test]
fn test_listener_failures_are_isolated() {
    let mut builder = builder();
    let delivered = Rc::new(Cell::new(0));

    builder.on(EventKind::NodeAdded, |_| Err(anyhow::anyhow!("listener error")));
    builder.on(EventKind::NodeAdded, |_| panic!("listener panic"));
    let counter = delivered.clone();
    builder.on(EventKind::NodeAdded, move |_| {
        counter.set(counter.get() + 1);
        Ok(())
    });

    let node = builder
        .add_component(ComponentNode::new("text"), None, None)
        .unwrap();

    assert!(builder.store().contains(&node.id));
    assert_eq!(delivered.get(), 1);
}

#[test]
fn test_event_sequence() {
    let mut builder = builder();
    let log = Rc::new(RefCell::new(Vec::new()));

    for kind in [
        EventKind::NodeAdded,
        EventKind::NodeRemoved,
        EventKind::SelectionChanged,
        EventKind::StateChanged,
    ] {
        let log = log.clone();
        builder.on(kind, move |event| {
            log.borrow_mut().push(event.kind());
            Ok(())
        });
    }

    let node = builder
        .add_component(ComponentNode::new("text"), None, None)
        .unwrap();
    builder.select_component([&node.id], false);
    builder.remove_component(&node.id).unwrap();
    builder.undo();

    assert_eq!(
        *log.borrow(),
        vec![
            EventKind::NodeAdded,
            EventKind::SelectionChanged,
            EventKind::NodeRemoved,
            EventKind::SelectionChanged,
            EventKind::SelectionChanged,
            EventKind::StateChanged,
        ]
    );
    assert_eq!(builder.selected(), [node.id.clone()]);
}

#[test]
fn test_once_and_off() {
    let mut builder = builder();
    let count = Rc::new(Cell::new(0));

    let counter = count.clone();
    builder.once(EventKind::NodeAdded, move |_| {
        counter.set(counter.get() + 1);
        Ok(())
    });
    let counter = count.clone();
    let id = builder.on(EventKind::NodeAdded, move |_| {
        counter.set(counter.get() + 10);
        Ok(())
    });

    builder.add_component(ComponentNode::new("text"), None, None).unwrap();
    assert!(builder.off(EventKind::NodeAdded, id));
    builder.add_component(ComponentNode::new("text"), None, None).unwrap();

    assert_eq!(count.get(), 11);
}

// ---- templates ----

#[test]
fn test_load_template() {
    let mut builder = builder();
    let existing = builder
        .add_component(ComponentNode::new("text"), None, None)
        .unwrap();

    let loaded = Rc::new(RefCell::new(None));
    let sink = loaded.clone();
    builder.on(EventKind::TemplateLoaded, move |event| {
        if let BuilderEvent::TemplateLoaded { template_id } = event {
            *sink.borrow_mut() = Some(template_id.clone());
        }
        Ok(())
    });

    let template = TemplateConfig::new(
        "landing",
        "Landing",
        vec![
            ComponentNode::new("container")
                .with_id("hero")
                .with_child(ComponentNode::new("text").with_prop("content", "Hi")),
            ComponentNode::new("form").with_child(ComponentNode::new("input")),
        ],
    );
    let roots = builder.load_template(&template).unwrap();

    assert_eq!(roots[0], "hero");
    assert_eq!(builder.store().len(), 4);
    assert!(!builder.store().contains(&existing.id));
    assert_eq!(loaded.borrow().as_deref(), Some("landing"));
    assert_eq!(builder.history().len(), 2);

    builder.undo();
    assert_eq!(builder.store().len(), 1);
    assert!(builder.store().contains(&existing.id));
}

#[test]
fn test_invalid_template_leaves_forest() {
    let mut builder = builder();
    builder
        .add_component(ComponentNode::new("text").with_id("keep"), None, None)
        .unwrap();

    let template = TemplateConfig::new(
        "broken",
        "Broken",
        vec![ComponentNode::new("container").without_metadata()],
    );

    assert!(builder.load_template(&template).is_err());
    assert!(builder.store().contains("keep"));
    assert_eq!(builder.history().len(), 1);
}

// ---- persistence ----

#[tokio::test(start_paused = true)]
async fn test_auto_save_round_trip() {
    init_tracing();
    let store = MemoryStore::new();
    let mut builder = Builder::with_settings(BuilderSettings {
        auto_save_interval_ms: 1_000,
        ..Default::default()
    });

    let handle = builder.start_auto_save(Arc::new(store.clone())).unwrap();
    sample_page(&mut builder);

    tokio::time::sleep(Duration::from_millis(1_500)).await;
    let saved = load_forest(&store).unwrap().unwrap();
    assert_eq!(saved, builder.store().forest());

    handle.stop();

    let mut restored = Builder::new();
    assert!(restored.load_autosave(&store).unwrap());
    assert_eq!(restored.store().forest(), builder.store().forest());
    assert!(restored.can_undo());
}

#[tokio::test(start_paused = true)]
async fn test_destroy_keeps_last_auto_save() {
    init_tracing();
    let store = MemoryStore::new();
    let mut builder = Builder::with_settings(BuilderSettings {
        auto_save_interval_ms: 1_000,
        ..Default::default()
    });

    let handle = builder.start_auto_save(Arc::new(store.clone())).unwrap();
    builder
        .add_component(ComponentNode::new("text"), None, None)
        .unwrap();

    tokio::time::sleep(Duration::from_millis(1_500)).await;
    let saved = store.get(AUTOSAVE_KEY).unwrap();
    assert!(saved.is_some());

    builder.destroy();
    tokio::time::sleep(Duration::from_secs(2)).await;

    assert_eq!(store.get(AUTOSAVE_KEY).unwrap(), saved);
    assert!(handle.is_finished());
}

#[test]
fn test_load_autosave_without_data() {
    let mut builder = builder();
    let store = MemoryStore::new();

    assert!(!builder.load_autosave(&store).unwrap());

    store.set(AUTOSAVE_KEY, "garbage").unwrap();
    assert!(builder.load_autosave(&store).is_err());
}

#[test]
fn test_auto_save_disabled() {
    let builder = Builder::with_settings(BuilderSettings {
        auto_save: false,
        ..Default::default()
    });

    assert!(matches!(
        builder.start_auto_save(Arc::new(MemoryStore::new())),
        Err(BuilderError::Config(_))
    ));
}

#[test]
fn test_builder_from_config_dir() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join(wb_editor::DEFAULT_CONFIG_NAME),
        r#"{ "settings": { "undoLimit": 2 } }"#,
    )
    .unwrap();

    let mut builder = Builder::from_config_dir(dir.path()).unwrap();
    for _ in 0..5 {
        builder.add_component(ComponentNode::new("text"), None, None).unwrap();
    }

    assert_eq!(builder.settings().undo_limit, 2);
    assert_eq!(builder.history().len(), 2);
}
