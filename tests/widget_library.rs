//! Integration tests for loading widgets and templates from disk

use std::fs;
use std::path::Path;
use std::sync::Arc;
use std::thread;

use chrono::NaiveDate;
use pretty_assertions::assert_eq;
use tempfile::TempDir;

use widget_press::widget::{FieldType, WidgetField};
use widget_press::{
    render_preview_at, Document, FsTemplateStore, PipelineConfig, RenderConfig,
    TemplateStore, UserMode, WidgetDefinition, WidgetRegistry,
};

fn write(dir: &Path, name: &str, content: &str) {
    let path = dir.join(name);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, content).unwrap();
}

fn widget_library() -> TempDir {
    let dir = TempDir::new().unwrap();
    write(
        dir.path(),
        "widgets/meeting.json",
        r##"{
            "id": "meeting",
            "displayName": "Meeting Notice",
            "category": "Events",
            "template": "meeting.html",
            "fields": [
                { "id": "title", "type": "String", "label": "Title", "defaultValue": "Meeting" },
                { "id": "when", "type": "DateTime", "label": "When", "required": false }
            ],
            "colors": { "primary": "#BA0C2F" }
        }"##,
    );
    write(
        dir.path(),
        "widgets/notices/policy.toml",
        r#"
id = "policy"
displayName = "Policy Update"
category = "Notices"
template = "policy.html"
allowedModes = ["expert"]
"#,
    );
    write(dir.path(), "widgets/broken.json", "{ not json");
    write(dir.path(), "widgets/README.md", "not a definition");
    write(
        dir.path(),
        "templates/meeting.html",
        r#"<div style="border-left: 4px solid {{color_primary}}; padding: 12px"><h2>{{title}}</h2>Starts {{when}}</div>"#,
    );
    dir
}

#[test]
fn test_load_library_from_directory() {
    let dir = widget_library();
    let registry = WidgetRegistry::new();
    let report = registry.load_all(&dir.path().join("widgets")).unwrap();

    assert_eq!(report.loaded, vec!["meeting", "policy"]);
    assert_eq!(report.failures.len(), 1);
    assert!(report.failures[0].path.ends_with("broken.json"));
    assert!(!report.is_clean());

    let meeting = registry.get("meeting").unwrap();
    assert_eq!(meeting.display_name, "Meeting Notice");
    assert_eq!(meeting.version, "1.0.0");
    assert_eq!(meeting.colors.primary, "#BA0C2F");
    assert_eq!(meeting.colors.accent, "#FFCD00");

    let beginner: Vec<String> = registry
        .filter_by_mode(UserMode::Beginner)
        .iter()
        .map(|d| d.id.clone())
        .collect();
    assert_eq!(beginner, vec!["meeting"]);
    assert_eq!(registry.group_by_category(UserMode::Expert).len(), 2);
}

#[test]
fn test_render_from_disk() {
    let dir = widget_library();
    let registry = WidgetRegistry::new();
    registry.load_all(&dir.path().join("widgets")).unwrap();
    let store = FsTemplateStore::new(dir.path().join("templates"));

    let mut document = Document::new("Squadron News");
    let meeting = registry.get("meeting").unwrap();
    document
        .add_widget(&meeting)
        .set_field_value("when", "19:00");
    // policy.html does not exist: fallback template
    let policy = registry.get("policy").unwrap();
    document
        .add_widget(&policy)
        .set_field_value("content", "New uniform rules");

    let config = PipelineConfig::new().with_render(
        RenderConfig::new()
            .with_standalone(false)
            .with_pretty_print(false),
    );
    let date = NaiveDate::from_ymd_opt(2026, 10, 18).unwrap();
    let preview = render_preview_at(&document, &registry, &store, &config, date);

    let markup = &preview.rendered.markup;
    assert!(markup.contains("border-left: 4px solid #BA0C2F"));
    assert!(markup.contains("<h2>Meeting</h2>Starts 19:00"));
    assert!(markup.contains("New uniform rules"));
    assert_eq!(preview.rendered.rendered_count(), 2);

    // The content wrapper swallows the first widget's container; the
    // fallback template's outer div starts the second span
    assert_eq!(preview.conversion.root.children.len(), 2);
    let texts = preview.conversion.root.leaf_texts();
    assert_eq!(texts, vec!["Meeting", "Starts 19:00", "New uniform rules"]);
}

#[test]
fn test_template_store_round_trip() {
    let dir = TempDir::new().unwrap();
    let store = FsTemplateStore::new(dir.path().join("templates"));

    store.put_template_text("custom", "<p>{{x}}</p>").unwrap();
    assert_eq!(
        store.template_text("custom.html").as_deref(),
        Some("<p>{{x}}</p>")
    );
    assert!(store.delete("custom").unwrap());
    assert!(!store.delete("custom").unwrap());
    assert_eq!(store.template_text("custom.html"), None);
}

#[test]
fn test_reload_while_reading() {
    let dir = widget_library();
    let widgets = dir.path().join("widgets");
    let registry = Arc::new(WidgetRegistry::new());
    registry.load_all(&widgets).unwrap();

    let readers: Vec<_> = (0..4)
        .map(|_| {
            let registry = Arc::clone(&registry);
            thread::spawn(move || {
                for _ in 0..200 {
                    // Either the old or the new catalog, never a partial one
                    let snapshot = registry.snapshot();
                    assert_eq!(snapshot.len(), 2);
                    assert!(snapshot.contains("meeting") && snapshot.contains("policy"));
                }
            })
        })
        .collect();

    for _ in 0..20 {
        registry.load_all(&widgets).unwrap();
    }
    for reader in readers {
        reader.join().unwrap();
    }
}

#[test]
fn test_enum_casing_does_not_skip_definitions() {
    let dir = TempDir::new().unwrap();
    write(
        dir.path(),
        "contact.json",
        r#"{
            "id": "contact",
            "allowedModes": ["EXPERT", 1],
            "fields": [
                { "id": "when", "type": "dateTime" },
                { "id": "site", "type": "URL" },
                { "id": "mail", "type": "EMAIL" },
                { "id": "notes", "type": "multiLine" }
            ]
        }"#,
    );

    let registry = WidgetRegistry::new();
    let report = registry.load_all(dir.path()).unwrap();
    assert!(report.is_clean());

    let contact = registry.get("contact").unwrap();
    let types: Vec<_> = contact.fields.iter().map(|f| f.field_type).collect();
    assert_eq!(
        types,
        vec![FieldType::DateTime, FieldType::Url, FieldType::Email, FieldType::Multiline]
    );
    assert_eq!(
        contact.allowed_modes,
        Some(vec![UserMode::Expert, UserMode::Intermediate])
    );
}

#[test]
fn test_saved_definition_survives_reload() {
    let dir = widget_library();
    let widgets = dir.path().join("widgets");
    let registry = WidgetRegistry::new();
    registry.load_all(&widgets).unwrap();

    let flyer = WidgetDefinition::new("flyer", "Flyer", "flyer.html")
        .with_category("Events")
        .with_field(WidgetField::new("headline", FieldType::String, "Headline").with_default("Hi"));
    registry.save(&widgets, flyer.clone()).unwrap();
    assert_eq!(registry.len(), 3);

    let report = registry.load_all(&widgets).unwrap();
    assert!(report.loaded.contains(&"flyer".to_string()));
    assert_eq!(*registry.get("flyer").unwrap(), flyer);
}
