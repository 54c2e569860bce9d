use super::*;

#[test]
fn test_default_layout() {
    let settings = MergeSettings::default();

    assert_eq!(
        settings.section_kind("require"),
        SectionKind::Entities { ordered: true }
    );
    assert_eq!(
        settings.section_kind("require-dev"),
        SectionKind::Entities { ordered: true }
    );
    assert_eq!(
        settings.section_kind("replace"),
        SectionKind::Entities { ordered: false }
    );
    assert_eq!(settings.section_kind("extra"), SectionKind::Tree);
    assert!(!settings.is_ignored("name"));
}

/// Verify omitted TOML fields fall back to the defaults.
#[test]
fn test_partial_toml_uses_defaults() {
    let settings: MergeSettings = toml::from_str(
        r#"
        ignored_sections = ["version"]
        excluded_entities = ["Acme/Product"]
        "#,
    )
    .expect("settings should parse");

    assert!(settings.is_ignored("version"));
    assert_eq!(
        settings.ordered_entity_sections,
        MergeSettings::default().ordered_entity_sections
    );
}

#[test]
fn test_exclusion_ignores_case() {
    let settings = MergeSettings {
        excluded_entities: vec!["Acme/Product".to_string()],
        ..Default::default()
    };
    let exclude = settings.exclusion();

    assert!(exclude("acme/product"));
    assert!(exclude("ACME/PRODUCT"));
    assert!(!exclude("acme/other"));
}

#[test]
fn test_custom_layout_overrides_defaults() {
    let settings: MergeSettings = toml::from_str(
        r#"
        ordered_entity_sections = ["dependencies"]
        unordered_entity_sections = []
        "#,
    )
    .unwrap();

    assert_eq!(
        settings.section_kind("dependencies"),
        SectionKind::Entities { ordered: true }
    );
    assert_eq!(settings.section_kind("require"), SectionKind::Tree);
    assert_eq!(settings.section_kind("conflict"), SectionKind::Tree);
}
