use analyzer::RawEntry;
use pretty_assertions::assert_eq;
use serde_json::{Value, json};

use crate::completion::CompletionKind;
use crate::tests::completion_dsl::{Fixture, t, t_in};

fn var(name: &str, sort: &str) -> RawEntry {
    RawEntry::new(name, "var", sort)
}

fn with_rules(fixture: Fixture, rules: Value) -> Fixture {
    fixture.flat(json!({ "replaceSuggestions": rules }))
}

#[test]
fn patch_rewrites_fields_and_snippet_flag() {
    let out = with_rules(
        t("$0").entries([var("alpha", "11"), var("beta", "11")]),
        json!([
            {
                "suggestion": "alpha",
                "patch": {
                    "name": "alpha()",
                    "insertSnippet": "alpha($1)",
                    "kind": "function",
                    "labelDetails": { "description": "custom" }
                }
            }
        ]),
    )
    .run()
    .expect_names(&["alpha()", "beta"])
    .expect_snippet("alpha()", "alpha($1)");

    let alpha = out.entry("alpha()");
    assert_eq!(alpha.kind, CompletionKind::Function);
    assert_eq!(
        alpha
            .label_details
            .as_ref()
            .and_then(|details| details.description.as_deref()),
        Some("custom")
    );
}

#[test]
fn patch_with_plain_insert_text_clears_snippet() {
    with_rules(
        t("$0").entry(RawEntry {
            is_snippet: true,
            ..var("gamma", "11").with_insert_text("gamma($1)")
        }),
        json!([{ "suggestion": "gamma", "patch": { "insertText": "gamma" } }]),
    )
    .run()
    .expect_plain("gamma")
    .expect_insert("gamma", "gamma");
}

#[test]
fn duplicate_original_places_the_copy() {
    let rules = |placement: &str| {
        json!([
            {
                "suggestion": "log",
                "duplicateOriginal": placement,
                "patch": { "name": "log!", "insertText": "console.log" }
            },
            { "suggestion": "log*", "delete": true, "processMany": true }
        ])
    };
    let entries = || [var("log", "11"), var("other", "12")];

    // Both copies are processed, so the delete rule leaves them alone.
    let out = with_rules(t("$0").entries(entries()), rules("before"))
        .run()
        .expect_names(&["log!", "log", "other"])
        .expect_insert("log!", "console.log");
    assert_eq!(
        out.sort_texts(),
        ["11\u{0}0000", "11\u{0}0001", "12\u{0}0002"]
    );

    with_rules(t("$0").entries(entries()), rules("after"))
        .run()
        .expect_names(&["log", "log!", "other"]);
}

#[test]
fn move_takes_the_sort_text_of_the_landing_slot() {
    let entries = || {
        [
            var("a", "10"),
            var("b", "11"),
            var("c", "12"),
            var("d", "13"),
        ]
    };

    let out = with_rules(
        t("$0").entries(entries()),
        json!([{ "suggestion": "d", "movePos": -2 }]),
    )
    .run()
    .expect_names(&["a", "d", "b", "c"]);
    assert!(out.entry("d").sort_text.starts_with("11\u{0}"));

    with_rules(
        t("$0").entries(entries()),
        json!([{ "suggestion": "a", "movePos": 2 }]),
    )
    .run()
    .expect_names(&["b", "c", "a", "d"]);

    with_rules(
        t("$0").entries(entries()),
        json!([{ "suggestion": "b", "movePos": -100 }]),
    )
    .run()
    .expect_names(&["b", "a", "c", "d"]);
}

#[test]
fn first_match_only_without_process_many() {
    with_rules(
        t("$0").entries([var("tmp1", "11"), var("tmp2", "12"), var("keep", "13")]),
        json!([{ "suggestion": "tmp*", "delete": true }]),
    )
    .run()
    .expect_names(&["tmp2", "keep"]);
}

#[test]
fn processed_entries_are_immune_to_later_rules() {
    with_rules(
        t("$0").entries([var("a1", "11"), var("b2", "12")]),
        json!([
            { "suggestion": "a*", "patch": { "name": "b1" } },
            { "suggestion": "b*", "delete": true, "processMany": true }
        ]),
    )
    .run()
    .expect_names(&["b1"]);
}

#[test]
fn malformed_rules_are_skipped() {
    with_rules(
        t("$0").entries([var("x", "11"), var("y", "12"), var("zay", "13")]),
        json!([
            { "suggestion": "x", "delete": "yes" },
            { "suggestion": "*a*", "delete": true },
            { "suggestion": "x", "delete": true, "movePos": 1 },
            { "suggestion": "zay" },
            { "suggestion": "y", "delete": true }
        ]),
    )
    .run()
    .expect_names(&["x", "zay"]);
}

#[test]
fn filters_narrow_the_match() {
    let out = with_rules(
        t("$0").entries([
            RawEntry::new("await", "keyword", "15"),
            var("awaitAll", "11"),
            RawEntry::new("map", "function", "11").auto_import("lodash"),
            RawEntry::new("map", "function", "11").auto_import("ramda"),
        ]),
        json!([
            {
                "suggestion": "*",
                "filter": { "kind": "keyword" },
                "delete": true,
                "processMany": true
            },
            {
                "suggestion": "map",
                "filter": { "sourceModule": "ramda" },
                "delete": true
            }
        ]),
    )
    .run()
    .expect_names(&["awaitAll", "map"]);
    assert_eq!(out.entry("map").source.as_deref(), Some("lodash"));
}

#[test]
fn file_name_pattern_limits_rules() {
    let rules = json!([
        { "suggestion": "it", "fileNamePattern": "**/*.test.ts", "delete": true }
    ]);
    let entries = || [var("it", "11"), var("item", "12")];

    with_rules(t_in("/p/src/app.test.ts", "$0").entries(entries()), rules.clone())
        .run()
        .expect_names(&["item"]);
    with_rules(t("$0").entries(entries()), rules)
        .run()
        .expect_names(&["it", "item"]);
}

#[test]
fn language_mode_limits_rules() {
    let rules = json!([
        { "suggestion": "React", "languageMode": ["javascript", "typescriptreact"], "delete": true }
    ]);
    let entries = || [var("React", "11"), var("Ref", "12")];

    with_rules(t_in("/p/src/App.tsx", "$0").entries(entries()), rules.clone())
        .run()
        .expect_names(&["Ref"]);
    with_rules(t("$0").entries(entries()), rules)
        .run()
        .expect_names(&["React", "Ref"]);
}

#[test]
fn renamed_and_duplicated_entries_keep_their_deferred_edits() {
    let fixture = |rule: Value| {
        t("jo$0")
            .leaf(analyzer::SyntaxKind::Identifier, "jo")
            .entry(RawEntry::new("join", "function", "16").auto_import("node:path"))
            .flat(json!({
                "autoImport.changeToNamespaceImport": { "node:path": { "namespace": "path" } },
                "replaceSuggestions": [rule]
            }))
    };
    let import = [analyzer::TextEdit::insert(0, "import * as path from \"node:path\";\n")];

    let out = fixture(json!({ "suggestion": "join", "patch": { "name": "path.join" } }))
        .run()
        .expect_names(&["path.join"])
        .expect_insert("path.join", "path.join");
    assert_eq!(out.result.deferred["path.join"].additional_edits, import);
    assert!(!out.result.deferred.contains_key("join"));

    let out = fixture(json!({
        "suggestion": "join",
        "duplicateOriginal": "after",
        "patch": { "name": "join (path)" }
    }))
    .run()
    .expect_names(&["join", "join (path)"]);
    assert_eq!(out.result.deferred["join"].additional_edits, import);
    assert_eq!(out.result.deferred["join (path)"].additional_edits, import);
}
