use super::*;

#[test]
fn defaults_validate() {
    let cfg = EditorConfig::default();
    cfg.validate().unwrap();
    assert_eq!(cfg.handle_size, 8.0);
    assert_eq!(cfg.debounce(), std::time::Duration::from_millis(100));
}

#[test]
fn partial_json_keeps_defaults() {
    let cfg: EditorConfig =
        serde_json::from_str(r##"{"minOverlayWidth": 80, "selectionColor": "#ff0000"}"##).unwrap();
    assert_eq!(cfg.min_overlay_width, 80.0);
    assert_eq!(cfg.min_overlay_height, 20.0);
    assert_eq!(cfg.selection_color, Color::rgba8(255, 0, 0, 255));
}

#[test]
fn unknown_fields_are_rejected() {
    assert!(serde_json::from_str::<EditorConfig>(r#"{"handelSize": 4}"#).is_err());
}

#[test]
fn negative_and_zero_values_fail_validation() {
    let cfg = EditorConfig {
        box_padding: -1.0,
        ..EditorConfig::default()
    };
    assert!(cfg.validate().is_err());

    let cfg = EditorConfig {
        history_limit: 0,
        ..EditorConfig::default()
    };
    assert!(cfg.validate().is_err());
}

#[test]
fn from_path_reads_json_file() {
    let dir = std::env::temp_dir().join(format!("overlay-studio-config-{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    let path = dir.join("editor.json");
    std::fs::write(&path, r#"{"historyLimit": 5}"#).unwrap();
    let cfg = EditorConfig::from_path(&path).unwrap();
    assert_eq!(cfg.history_limit, 5);
    assert!(EditorConfig::from_path(&dir.join("missing.json")).is_err());
}
