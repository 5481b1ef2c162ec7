//! Configuration parsing and layering

use entity_usage::config::{get_config_value, set_config_value, Config, ConfigLoader, SiblingOrder};
use std::path::PathBuf;

#[test]
fn test_partial_file_keeps_defaults() {
    let yaml = r#"
entityTypes: [media, node]
report:
  siblingOrder: createdDesc
limits:
  maxDepth: 8
"#;
    let config: Config = serde_yaml::from_str(yaml).unwrap();

    assert_eq!(config.entity_types, vec!["media", "node"]);
    assert_eq!(config.report.sibling_order, SiblingOrder::CreatedDesc);
    assert_eq!(config.report.route_separator, " -> ");
    assert_eq!(config.limits.max_depth, 8);
    assert_eq!(config.limits.max_nodes, 10_000);
    assert_eq!(config.links.view, "canonical");
    assert_eq!(
        config.fields.reference_types,
        vec!["entity_reference", "entity_reference_revisions"]
    );
}

#[test]
fn test_unknown_sibling_order_is_rejected() {
    let yaml = "report:\n  siblingOrder: random\n";
    assert!(serde_yaml::from_str::<Config>(yaml).is_err());
}

#[test]
fn test_get_and_set_keys() {
    let mut config = Config::default();

    set_config_value(&mut config, "entityTypes", "media, node").unwrap();
    set_config_value(&mut config, "limits.maxNodes", "500").unwrap();
    set_config_value(&mut config, "report.siblingOrder", "createdDesc").unwrap();
    set_config_value(&mut config, "title.fields", "['field_headline', 'title']").unwrap();
    set_config_value(&mut config, "catalog", "/srv/site.yaml").unwrap();

    assert_eq!(get_config_value(&config, "entityTypes").unwrap(), "media,node");
    assert_eq!(get_config_value(&config, "limits.maxNodes").unwrap(), "500");
    assert_eq!(
        get_config_value(&config, "report.siblingOrder").unwrap(),
        "createdDesc"
    );
    assert_eq!(config.title.fields, vec!["field_headline", "title"]);
    assert_eq!(config.catalog, Some(PathBuf::from("/srv/site.yaml")));

    assert!(set_config_value(&mut config, "limits.maxDepth", "deep").is_err());
    assert!(set_config_value(&mut config, "ui.skin", "dark").is_err());
    assert!(get_config_value(&config, "ui.skin").is_err());
}

#[test]
fn test_layered_loading() {
    let config_dir = tempfile::tempdir().unwrap();
    let data_dir = tempfile::tempdir().unwrap();

    // SAFETY: set_var is unsafe in Rust 2024 due to potential data races.
    // This is the only test in this binary touching the environment.
    unsafe {
        std::env::set_var("ENTITY_USAGE_CONFIG_DIR", config_dir.path());
        std::env::set_var("ENTITY_USAGE_DATA_DIR", data_dir.path());
        std::env::remove_var("ENTITY_USAGE_CATALOG");
        std::env::remove_var("ENTITY_USAGE_MAX_DEPTH");
        std::env::remove_var("ENTITY_USAGE_ENTITY_TYPES");
    }

    // No files: defaults
    assert_eq!(ConfigLoader::load(None).unwrap(), ConfigLoader::load_defaults());

    std::fs::write(
        config_dir.path().join("config.yaml"),
        "entityTypes: [media]\ncatalog: /srv/root.yaml\nlimits:\n  maxDepth: 10\n  maxNodes: 500\nreport:\n  siblingOrder: createdDesc\n  routeSeparator: ' / '\n",
    )
    .unwrap();

    let site_dir = data_dir.path().join("sites").join("intranet");
    std::fs::create_dir_all(&site_dir).unwrap();
    std::fs::write(site_dir.join("config.yaml"), "limits:\n  maxDepth: 3\n").unwrap();

    let root = ConfigLoader::load(None).unwrap();
    assert_eq!(root.entity_types, vec!["media"]);
    assert_eq!(root.limits.max_depth, 10);

    let site = ConfigLoader::load(Some("intranet")).unwrap();
    assert_eq!(site.entity_types, vec!["media"]);
    assert_eq!(site.catalog, Some(PathBuf::from("/srv/root.yaml")));
    assert_eq!(site.limits.max_depth, 3);
    assert_eq!(site.limits.max_nodes, 500);
    assert_eq!(site.report.sibling_order, SiblingOrder::CreatedDesc);
    assert_eq!(site.report.route_separator, " / ");
    assert!(ConfigLoader::validate(Some("intranet")).is_ok());

    // Environment beats every file
    unsafe {
        std::env::set_var("ENTITY_USAGE_MAX_DEPTH", "2");
        std::env::set_var("ENTITY_USAGE_CATALOG", "/tmp/override.yaml");
    }
    let overridden = ConfigLoader::load(Some("intranet")).unwrap();
    assert_eq!(overridden.limits.max_depth, 2);
    assert_eq!(overridden.catalog, Some(PathBuf::from("/tmp/override.yaml")));
    assert_eq!(overridden.report.sibling_order, SiblingOrder::CreatedDesc);

    // A key set for the site adds to the root layer instead of masking it
    ConfigLoader::set_in_file(&site_dir.join("config.yaml"), "links.edit", "edit").unwrap();
    let with_set = ConfigLoader::load(Some("intranet")).unwrap();
    assert_eq!(with_set.links.edit, "edit");
    assert_eq!(with_set.report.route_separator, " / ");
    assert_eq!(with_set.entity_types, vec!["media"]);

    // A broken site file is an error, not silently skipped
    std::fs::write(site_dir.join("config.yaml"), "limits: [not, a, map]\n").unwrap();
    assert!(ConfigLoader::load(Some("intranet")).is_err());
    assert!(ConfigLoader::validate(Some("intranet")).is_err());

    // SAFETY: same as above
    unsafe {
        std::env::remove_var("ENTITY_USAGE_CONFIG_DIR");
        std::env::remove_var("ENTITY_USAGE_DATA_DIR");
        std::env::remove_var("ENTITY_USAGE_MAX_DEPTH");
        std::env::remove_var("ENTITY_USAGE_CATALOG");
    }
}
