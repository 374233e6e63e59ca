use pretty_assertions::assert_eq;
use serde_json::{Map, json};

use crate::config::{
    ConfigError, GlobalLibAction, ImportedInfoDisplay, JsxAttributePatch, JsxAttributeRule,
    KeepOriginal, KeywordsInsertText, MethodSnippetInsertText, MethodSnippetSkip, Settings,
};
use crate::tests::completion_dsl::flat;

#[test]
fn empty_map_yields_defaults() {
    let settings = Settings::from_flat(&Map::new()).unwrap();
    assert_eq!(settings, Settings::default());

    assert!(settings.enable_method_snippets);
    assert!(settings.correct_sorting.enable);
    assert!(settings.switch_exclude_covered_cases);
    assert!(settings.object_literal_completions.enable);
    assert_eq!(
        settings.object_literal_completions.keep_original,
        KeepOriginal::Below
    );
    assert_eq!(settings.method_snippets.skip, MethodSnippetSkip::OptionalAndRest);
    assert_eq!(
        settings.suggestions.keywords_insert_text,
        KeywordsInsertText::Space
    );
    assert_eq!(settings.display_imported_info, ImportedInfoDisplay::ShortFormat);
    assert_eq!(settings.global_lib_completions, GlobalLibAction::None);
}

#[test]
fn dotted_keys_address_nested_sections() {
    let settings = Settings::from_flat(&flat(&[
        ("methodSnippets.skip", json!("only-rest")),
        ("methodSnippets.insertText", json!("always-declaration")),
        ("objectLiteralCompletions.moreVariants", json!(true)),
        ("arrayMethodsSnippets.enable", json!(true)),
        ("jsxImproveElementsSuggestions.enabled", json!(true)),
        ("globalLibCompletions", json!("mark")),
        ("ignoreAutoImports", json!(["lodash"])),
    ]))
    .unwrap();

    assert_eq!(settings.method_snippets.skip, MethodSnippetSkip::OnlyRest);
    assert_eq!(
        settings.method_snippets.insert_text,
        MethodSnippetInsertText::AlwaysDeclaration
    );
    assert!(settings.object_literal_completions.more_variants);
    // Siblings of a dotted key keep their defaults.
    assert!(settings.object_literal_completions.enable);
    assert!(settings.array_methods_snippets.enable);
    assert!(settings.jsx_improve_elements_suggestions.enabled);
    assert_eq!(settings.global_lib_completions, GlobalLibAction::Mark);
    assert_eq!(settings.ignore_auto_imports, ["lodash"]);
}

#[test]
fn dotted_and_object_values_merge() {
    let settings = Settings::from_flat(&flat(&[
        ("objectLiteralCompletions", json!({ "keepOriginal": "above" })),
        ("objectLiteralCompletions.enable", json!(false)),
    ]))
    .unwrap();

    assert!(!settings.object_literal_completions.enable);
    assert_eq!(
        settings.object_literal_completions.keep_original,
        KeepOriginal::Above
    );
}

#[test]
fn jsx_attribute_rules_accept_false_and_patches() {
    let settings = Settings::from_flat(&flat(&[(
        "jsxCompletionsMap",
        json!({
            "hidden": false,
            "div#className": { "insertText": "={$1}", "keepOriginal": "above" }
        }),
    )]))
    .unwrap();

    assert_eq!(
        settings.jsx_completions_map.get("hidden"),
        Some(&JsxAttributeRule::Hide(false))
    );
    assert_eq!(
        settings.jsx_completions_map.get("div#className"),
        Some(&JsxAttributeRule::Patch(JsxAttributePatch {
            insert_text: "={$1}".to_string(),
            keep_original: KeepOriginal::Above,
        }))
    );
}

#[test]
fn namespace_imports_default_to_adding_the_import() {
    let settings = Settings::from_flat(&flat(&[(
        "autoImport.changeToNamespaceImport",
        json!({
            "node:path": { "namespace": "path" },
            "node:fs": { "namespace": "fs", "addImport": false }
        }),
    )]))
    .unwrap();

    let imports = &settings.auto_import.change_to_namespace_import;
    assert!(imports["node:path"].add_import);
    assert!(!imports["node:fs"].add_import);
    assert_eq!(imports["node:fs"].namespace, "fs");
}

#[test]
fn scalar_under_a_dotted_prefix_conflicts() {
    let err = Settings::from_flat(&flat(&[
        ("methodSnippets", json!(true)),
        ("methodSnippets.skip", json!("all")),
    ]))
    .unwrap_err();

    match err {
        ConfigError::ConflictingKey { key, prefix } => {
            assert_eq!(key, "methodSnippets.skip");
            assert_eq!(prefix, "methodSnippets");
        }
        other => panic!("expected a conflicting key, got {other:?}"),
    }
}

#[test]
fn invalid_values_are_reported() {
    let err = Settings::from_flat(&flat(&[("methodSnippets.skip", json!("sometimes"))]))
        .unwrap_err();
    assert!(matches!(err, ConfigError::Invalid(_)));
    assert!(err.to_string().starts_with("invalid configuration: "));
}

#[test]
fn invalid_settings_fall_back_to_defaults() {
    let settings = Settings::from_flat_or_default(&flat(&[("localityBonus", json!("yes"))]));
    assert_eq!(settings, Settings::default());

    let settings = Settings::from_flat_or_default(&flat(&[("localityBonus", json!(true))]));
    assert!(settings.locality_bonus);
}

#[test]
fn malformed_rules_do_not_reject_the_settings() {
    let settings = Settings::from_flat(&flat(&[(
        "replaceSuggestions",
        json!([{ "suggestion": "x", "delete": "yes" }, { "suggestion": "y", "delete": true }]),
    )]))
    .unwrap();
    assert_eq!(settings.replace_suggestions.len(), 2);
}
