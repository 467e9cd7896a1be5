use std::fs;
use std::path::Path;

use locale_sheet_sync::ToolError;
use locale_sheet_sync::config::SyncConfig;
use locale_sheet_sync::io::{MemoryStore, TableStore};
use locale_sheet_sync::reconcile::ReconcileLayout;
use locale_sheet_sync::sync;
use serde_json::{Value, json};
use tempfile::tempdir;

fn write_locale(dir: &Path, code: &str, value: Value) {
    fs::write(
        dir.join(format!("{code}.json")),
        serde_json::to_string_pretty(&value).expect("locale serialised"),
    )
    .expect("locale written");
}

fn read_locale(dir: &Path, code: &str) -> Value {
    let text = fs::read_to_string(dir.join(format!("{code}.json"))).expect("locale read");
    serde_json::from_str(&text).expect("locale parsed")
}

fn rows(values: &[&[&str]]) -> Vec<Vec<String>> {
    values
        .iter()
        .map(|row| row.iter().map(|cell| cell.to_string()).collect())
        .collect()
}

fn store_with(config: &SyncConfig, values: &[&[&str]]) -> MemoryStore {
    let range = config.sheet_range().expect("range parsed");
    MemoryStore::new().with_rows(&range, &rows(values))
}

fn config_for(dir: &Path) -> SyncConfig {
    SyncConfig {
        locales_dir: dir.to_path_buf(),
        ..SyncConfig::default()
    }
}

#[test]
fn empty_cells_leave_existing_translations_alone() {
    let temp_dir = tempdir().expect("temporary directory");
    let dir = temp_dir.path();
    write_locale(dir, "zh-tw", json!({ "y": "keep" }));
    write_locale(dir, "zh-cn", json!({ "y": "old" }));
    write_locale(dir, "en", json!({}));
    let config = config_for(dir);
    let mut store = store_with(&config, &[&["y", "", "val2", "val3"]]);

    let report = sync::import(&config, &mut store).expect("import");

    assert_eq!(read_locale(dir, "zh-tw"), json!({ "y": "keep" }));
    assert_eq!(read_locale(dir, "zh-cn"), json!({ "y": "val2" }));
    assert_eq!(read_locale(dir, "en"), json!({ "y": "val3" }));
    assert_eq!(report.applied[0], ("zh-tw".to_string(), 0));
    assert_eq!(report.applied[1], ("zh-cn".to_string(), 1));
    assert_eq!(report.applied[2], ("en".to_string(), 1));
}

#[test]
fn dotted_keys_merge_into_nested_objects() {
    let temp_dir = tempdir().expect("temporary directory");
    let dir = temp_dir.path();
    write_locale(dir, "zh-tw", json!({ "menu": { "edit": "編輯" }, "title": "標題" }));
    let config = config_for(dir);
    let mut store = store_with(
        &config,
        &[
            &["menu.file.open", "開啟"],
            &["menu.file.close", "關閉"],
            &["title", "新標題"],
        ],
    );

    sync::import(&config, &mut store).expect("import");

    assert_eq!(
        read_locale(dir, "zh-tw"),
        json!({
            "menu": { "edit": "編輯", "file": { "open": "開啟", "close": "關閉" } },
            "title": "新標題"
        })
    );
}

#[test]
fn missing_locale_files_are_created() {
    let temp_dir = tempdir().expect("temporary directory");
    let dir = temp_dir.path().join("locales");
    let config = SyncConfig {
        range: "kefu!A2:N".to_string(),
        layout: ReconcileLayout::checking(6),
        ..config_for(&dir)
    };
    let mut store = store_with(&config, &[&["a.b", "", "", "", "", "", "Olá"]]);

    sync::import(&config, &mut store).expect("import");

    assert_eq!(read_locale(&dir, "pt"), json!({ "a": { "b": "Olá" } }));
    assert_eq!(read_locale(&dir, "vi"), json!({}));
}

#[test]
fn default_layout_keeps_annotations_out_of_the_locale_files() {
    let temp_dir = tempdir().expect("temporary directory");
    let dir = temp_dir.path();
    write_locale(dir, "zh-tw", json!({ "ok": "確定", "home": "首頁" }));
    write_locale(dir, "zh-cn", json!({ "home": "首页" }));
    write_locale(dir, "en", json!({ "ok": "OK", "home": "Home" }));
    for code in ["vi", "th", "pt"] {
        write_locale(dir, code, json!({}));
    }
    let config = config_for(dir);
    let mut store = store_with(&config, &[&["home", "舊", "首页", "Home"]]);

    let export = sync::export(&config, &mut store).expect("export");
    assert_eq!(export.summary.updated, 1);
    assert_eq!(export.summary.need_translation, 1);

    let report = sync::import(&config, &mut store).expect("import");

    assert_eq!(read_locale(dir, "zh-tw"), json!({ "ok": "確定", "home": "舊" }));
    assert_eq!(read_locale(dir, "zh-cn"), json!({ "home": "首页" }));
    assert_eq!(read_locale(dir, "en"), json!({ "ok": "OK", "home": "Home" }));
    for code in ["vi", "th", "pt"] {
        assert_eq!(read_locale(dir, code), json!({}), "language {code}");
    }
    assert_eq!(report.applied[3], ("vi".to_string(), 0));
    assert_eq!(report.applied[4], ("th".to_string(), 0));
}

#[test]
fn dotted_keys_in_existing_files_are_expanded() {
    let temp_dir = tempdir().expect("temporary directory");
    let dir = temp_dir.path();
    write_locale(dir, "zh-tw", json!({ "a.b": "old", "a.c": "kept", "blank": "" }));
    let config = config_for(dir);
    let mut store = store_with(&config, &[&["a.b", "new"]]);

    sync::import(&config, &mut store).expect("import");

    assert_eq!(
        read_locale(dir, "zh-tw"),
        json!({ "a": { "b": "new", "c": "kept" }, "blank": "" })
    );
}

#[test]
fn files_are_written_with_two_space_indentation() {
    let temp_dir = tempdir().expect("temporary directory");
    let dir = temp_dir.path();
    let config = SyncConfig {
        languages: "en".parse().expect("languages parsed"),
        layout: ReconcileLayout::checking(1),
        ..config_for(dir)
    };
    let mut store = store_with(&config, &[&["home.title", "Home"], &["ok", "OK"]]);

    sync::import(&config, &mut store).expect("import");

    let written = fs::read_to_string(dir.join("en.json")).expect("locale read");
    assert_eq!(
        written,
        "{\n  \"home\": {\n    \"title\": \"Home\"\n  },\n  \"ok\": \"OK\"\n}\n"
    );
}

#[test]
fn rows_without_a_key_are_skipped() {
    let temp_dir = tempdir().expect("temporary directory");
    let dir = temp_dir.path();
    let config = config_for(dir);
    let mut store = store_with(&config, &[&["", "orphan"], &["kept", "值"]]);

    let report = sync::import(&config, &mut store).expect("import");

    assert_eq!(report.rows_read, 2);
    assert_eq!(report.rows_skipped, 1);
    assert_eq!(read_locale(dir, "zh-tw"), json!({ "kept": "值" }));
}

#[test]
fn status_and_shadow_columns_are_not_imported() {
    let temp_dir = tempdir().expect("temporary directory");
    let dir = temp_dir.path();
    let config = SyncConfig {
        languages: "en,vi".parse().expect("languages parsed"),
        layout: ReconcileLayout::checking(2),
        ..config_for(dir)
    };
    let mut store = store_with(
        &config,
        &[&["greeting", "Hello", "Xin chào", "updated", "Hi"]],
    );

    sync::import(&config, &mut store).expect("import");

    assert_eq!(read_locale(dir, "en"), json!({ "greeting": "Hello" }));
    assert_eq!(read_locale(dir, "vi"), json!({ "greeting": "Xin chào" }));
}

#[test]
fn unreadable_locale_aborts_before_any_file_is_written() {
    let temp_dir = tempdir().expect("temporary directory");
    let dir = temp_dir.path();
    write_locale(dir, "zh-tw", json!({ "y": "before" }));
    fs::write(dir.join("pt.json"), "[1, 2]").expect("non-object locale written");
    let config = config_for(dir);
    let mut store = store_with(&config, &[&["y", "after"]]);

    let error = sync::import(&config, &mut store).expect_err("import must fail");

    assert!(matches!(error, ToolError::InvalidLocale(_)));
    assert_eq!(read_locale(dir, "zh-tw"), json!({ "y": "before" }));
    assert!(!dir.join("zh-cn.json").exists());
}

#[test]
fn empty_sheet_leaves_files_untouched_in_content() {
    let temp_dir = tempdir().expect("temporary directory");
    let dir = temp_dir.path();
    write_locale(dir, "en", json!({ "a": "b" }));
    let config = config_for(dir);
    let mut store = MemoryStore::new();

    let report = sync::import(&config, &mut store).expect("import");

    assert_eq!(report.rows_read, 0);
    assert_eq!(read_locale(dir, "en"), json!({ "a": "b" }));
    assert_eq!(store.writes(), 0);
    assert!(store.read(&config.sheet_range().expect("range")).expect("read").is_empty());
}
