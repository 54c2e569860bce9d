//! Tests for the recursive tree merger.

use super::*;
use crate::console::BufferedConsole;
use crate::errors::MergeError;
use crate::policy::{MergeOptions, Resolution};
use serde_json::json;

// ============================================================================
// Test Helpers
// ============================================================================

fn value(json: serde_json::Value) -> ConfigValue {
    ConfigValue::from(json)
}

/// Runs `merge_tree` with a recording console and returns the result together
/// with the console for message assertions.
fn merge_with(
    options: MergeOptions,
    original: Option<ConfigValue>,
    target: Option<ConfigValue>,
    user: Option<ConfigValue>,
) -> (MergeResult, BufferedConsole) {
    let mut console = BufferedConsole::new();
    let mut ctx = MergeContext::new(&mut console, options);
    let result = merge_tree(
        "extra",
        original.as_ref(),
        target.as_ref(),
        user.as_ref(),
        &mut ctx,
    )
    .expect("merge should succeed");
    (result, console)
}

fn merge(
    original: serde_json::Value,
    target: serde_json::Value,
    user: serde_json::Value,
) -> MergeResult {
    merge_with(
        MergeOptions::default(),
        Some(value(original)),
        Some(value(target)),
        Some(value(user)),
    )
    .0
}

fn as_set(result: &MergeResult) -> Vec<String> {
    let mut members: Vec<String> = result
        .value
        .as_ref()
        .and_then(ConfigValue::as_list)
        .expect("list result expected")
        .iter()
        .map(ToString::to_string)
        .collect();
    members.sort();
    members
}

// ============================================================================
// Flat Part Tests
// ============================================================================

/// Verify target additions are unioned into the installed members.
#[test]
fn test_flat_merge_adds_target_members_and_keeps_local_ones() {
    let result = merge(json!(["v1"]), json!(["v1", "v3"]), json!(["v2", "v1"]));

    assert!(result.changed);
    assert_eq!(as_set(&result), vec!["v1", "v2", "v3"]);
}

/// Verify members dropped by the target are removed, locally added ones stay.
#[test]
fn test_flat_merge_removes_dropped_members() {
    let result = merge(
        json!(["v1", "v2", "v3"]),
        json!(["v2"]),
        json!(["v1", "v2", "v3", "v4"]),
    );

    assert!(result.changed);
    assert_eq!(as_set(&result), vec!["v2", "v4"]);
}

/// Verify a member the installation already removed is not re-added or
/// reported.
#[test]
fn test_flat_merge_respects_local_removal() {
    let result = merge(json!(["a", "b"]), json!(["a", "b", "c"]), json!(["a"]));

    assert!(result.changed);
    assert_eq!(as_set(&result), vec!["a", "c"]);
}

/// Verify installed order is kept and additions are appended.
#[test]
fn test_flat_merge_appends_in_target_order() {
    let result = merge(json!(["a"]), json!(["c", "a", "b"]), json!(["z", "a"]));

    assert_eq!(
        result.value,
        Some(ConfigValue::string_list(["z", "a", "c", "b"]))
    );
}

#[test]
fn test_flat_merge_without_changes_is_unchanged() {
    let result = merge(json!(["a", "b"]), json!(["b", "a"]), json!(["a", "x"]));

    assert!(!result.changed);
    assert_eq!(result.value, Some(ConfigValue::string_list(["a", "x"])));
}

/// Verify flat changes are reported on the console.
#[test]
fn test_flat_merge_logs_changes() {
    let (_, console) = merge_with(
        MergeOptions::default(),
        Some(value(json!(["a", "b"]))),
        Some(value(json!(["a", "c"]))),
        Some(value(json!(["a", "b"]))),
    );

    assert!(console.contains("Adding c to extra"));
    assert!(console.contains("Removing b from extra"));
}

// ============================================================================
// Associative Part Tests
// ============================================================================

/// Verify a key whose merged value becomes empty is dropped.
#[test]
fn test_associative_merge_removes_emptied_key() {
    let result = merge(json!({"k": ["a"]}), json!({"k": []}), json!({"k": ["a"]}));

    assert!(result.changed);
    let map = result.value.as_ref().and_then(ConfigValue::as_map).unwrap();
    assert!(!map.contains_key("k"));
    assert!(result.is_removal());
}

/// Verify nested keys recurse and keys unknown to both baselines survive.
#[test]
fn test_associative_merge_recurses_and_keeps_local_keys() {
    let result = merge(
        json!({"branch-alias": {"dev-main": "1.0-dev"}, "patches": {"a": "x"}}),
        json!({"branch-alias": {"dev-main": "2.0-dev"}, "patches": {"a": "x"}, "new": true}),
        json!({"branch-alias": {"dev-main": "1.0-dev"}, "patches": {"a": "x"}, "local": "keep"}),
    );

    assert!(result.changed);
    assert_eq!(
        result.value,
        Some(value(json!({
            "branch-alias": {"dev-main": "2.0-dev"},
            "patches": {"a": "x"},
            "local": "keep",
            "new": true
        })))
    );
}

/// Verify keys the target dropped are removed if untouched locally.
#[test]
fn test_associative_merge_removes_dropped_key() {
    let result = merge(
        json!({"a": "1", "b": "2"}),
        json!({"a": "1"}),
        json!({"a": "1", "b": "2"}),
    );

    assert!(result.changed);
    assert_eq!(result.value, Some(value(json!({"a": "1"}))));
}

/// Verify an installed key with an empty value is dropped even when no side
/// touched it.
#[test]
fn test_untouched_empty_value_is_removed() {
    let result = merge(
        json!({"k": [], "a": "1"}),
        json!({"k": [], "a": "1"}),
        json!({"k": [], "a": "1"}),
    );

    assert!(result.changed);
    assert_eq!(result.value, Some(value(json!({"a": "1"}))));
}

/// Verify untouched null and empty-map values are dropped the same way.
#[test]
fn test_untouched_null_and_empty_map_are_removed() {
    let result = merge(
        json!({"n": null, "m": {}, "a": "1"}),
        json!({"n": null, "m": {}, "a": "1"}),
        json!({"n": null, "m": {}, "a": "1"}),
    );

    assert!(result.changed);
    let map = result.value.as_ref().and_then(ConfigValue::as_map).unwrap();
    assert_eq!(map.keys().collect::<Vec<_>>(), vec!["a"]);
}

/// Verify a key that was already absent from the installation is not
/// reported as a change when its merged value is empty.
#[test]
fn test_empty_result_for_absent_key_is_not_a_change() {
    let result = merge(json!({"k": []}), json!({"k": []}), json!({"a": "1"}));

    assert!(!result.changed);
    assert_eq!(result.value, Some(value(json!({"a": "1"}))));
}

/// Verify a section absent everywhere except the target is added whole.
#[test]
fn test_absent_sides_count_as_empty_containers() {
    let (result, _) = merge_with(
        MergeOptions::default(),
        None,
        Some(value(json!({"psr-4": {"App\\": "src/"}}))),
        None,
    );

    assert!(result.changed);
    assert_eq!(result.value, Some(value(json!({"psr-4": {"App\\": "src/"}}))));
}

/// Verify flat and associative results are joined with positional keys.
#[test]
fn test_mixed_containers_combine_into_map() {
    let result = merge(json!([]), json!({"k": "v"}), json!(["a"]));

    assert!(result.changed);
    assert_eq!(result.value, Some(value(json!({"0": "a", "k": "v"}))));
}

// ============================================================================
// Scalar Fallback Tests
// ============================================================================

#[test]
fn test_scalar_change_is_applied() {
    let result = merge(json!({"v": "1"}), json!({"v": "2"}), json!({"v": "1"}));
    assert_eq!(result.value, Some(value(json!({"v": "2"}))));
}

/// Verify a conflicting scalar is kept in the default mode.
#[test]
fn test_scalar_conflict_is_kept_by_default() {
    let (result, console) = merge_with(
        MergeOptions::default(),
        Some(value(json!({"v": "1"}))),
        Some(value(json!({"v": "2"}))),
        Some(value(json!({"v": "3"}))),
    );

    assert!(!result.changed);
    assert_eq!(result.value, Some(value(json!({"v": "3"}))));
    assert!(console.contains("extra.v will not be changed"));
}

/// Verify a conflicting scalar is replaced when overriding.
#[test]
fn test_scalar_conflict_is_overridden_when_forced() {
    let (result, console) = merge_with(
        MergeOptions::force_override(),
        Some(value(json!({"v": "1"}))),
        Some(value(json!({"v": "2"}))),
        Some(value(json!({"v": "3"}))),
    );

    assert!(result.changed);
    assert_eq!(result.value, Some(value(json!({"v": "2"}))));
    assert!(console.contains("Overriding local changes"));
}

/// Verify a shape mismatch falls back to scalar classification.
#[test]
fn test_shape_mismatch_falls_back_to_scalar_rules() {
    let result = merge(json!("flat"), json!(["a", "b"]), json!("flat"));

    assert!(result.changed);
    assert_eq!(result.value, Some(ConfigValue::string_list(["a", "b"])));
}

/// Verify a removal in the target deletes an untouched scalar.
#[test]
fn test_scalar_remove_yields_no_value() {
    let (result, _) = merge_with(
        MergeOptions::default(),
        Some(ConfigValue::string("dev")),
        None,
        Some(ConfigValue::string("dev")),
    );

    assert!(result.changed);
    assert_eq!(result.value, None);
}

/// Verify nested conflicts are recorded with their full field path.
#[test]
fn test_conflicts_are_recorded_with_field_path() {
    let original = value(json!({"a": {"b": "1"}}));
    let target = value(json!({"a": {"b": "2"}}));
    let user = value(json!({"a": {"b": "3"}}));
    let mut console = BufferedConsole::new();
    let mut ctx = MergeContext::new(&mut console, MergeOptions::default());

    merge_tree("extra", Some(&original), Some(&target), Some(&user), &mut ctx).unwrap();

    assert_eq!(ctx.conflicts().len(), 1);
    assert_eq!(ctx.conflicts()[0].field, "extra.a.b");
    assert_eq!(ctx.conflicts()[0].resolution, Resolution::Declined);
}

/// Verify interactive mode without a terminal aborts the merge.
#[test]
fn test_interactive_without_terminal_aborts() {
    let original = ConfigValue::string("1");
    let target = ConfigValue::string("2");
    let user = ConfigValue::string("3");
    let mut console = BufferedConsole::new();
    let mut ctx = MergeContext::new(&mut console, MergeOptions::interactive());

    let result = merge_tree("version", Some(&original), Some(&target), Some(&user), &mut ctx);

    assert!(matches!(
        result,
        Err(MergeError::InteractiveUnavailable { .. })
    ));
}

/// Verify merging the same inputs twice gives the same result.
#[test]
fn test_merge_is_idempotent() {
    let first = merge(
        json!({"a": ["x"], "b": "1"}),
        json!({"a": ["x", "y"], "b": "2"}),
        json!({"a": ["z"], "b": "3"}),
    );
    let second = merge(
        json!({"a": ["x"], "b": "1"}),
        json!({"a": ["x", "y"], "b": "2"}),
        json!({"a": ["z"], "b": "3"}),
    );

    assert_eq!(first, second);
}
