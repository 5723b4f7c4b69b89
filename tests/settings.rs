use infoapi::settings::Settings;

#[test]
fn missing_file_gives_defaults() {
    let settings = Settings::from_file("no/such/dir/infoapi_settings").expect("settings");
    assert_eq!(settings, Settings::default());
    assert_eq!(settings.log_filter, "info");
    assert!(settings.register_builtins);
}

#[test]
fn file_values_override_defaults() {
    let path = std::env::temp_dir().join("infoapi_settings_test.toml");
    std::fs::write(&path, "log_filter = \"infoapi=trace\"\nregister_builtins = false\n").unwrap();
    let settings = Settings::from_file(path.to_str().unwrap()).expect("settings");
    assert_eq!(settings.log_filter, "infoapi=trace");
    assert!(!settings.register_builtins);
    let _ = std::fs::remove_file(&path);
}

#[test]
fn partial_files_keep_remaining_defaults() {
    let path = std::env::temp_dir().join("infoapi_settings_partial_test.toml");
    std::fs::write(&path, "log_filter = \"warn\"\n").unwrap();
    let settings = Settings::from_file(path.to_str().unwrap()).expect("settings");
    assert_eq!(settings.log_filter, "warn");
    assert!(settings.register_builtins);
    let _ = std::fs::remove_file(&path);
}
