//! Recursive three-way merge of generic manifest sections.
//!
//! When all three values are containers, each is split into its flat part
//! (list members, compared as an unordered set) and its associative part
//! (map entries, merged key by key). Anything else falls back to classifying
//! the three values as opaque scalars.
//!
//! # Examples
//!
//! ```rust
//! use manifest_merger::{merge_tree, BufferedConsole, ConfigValue, MergeContext, MergeOptions};
//!
//! let original = ConfigValue::string_list(["a"]);
//! let target = ConfigValue::string_list(["a", "c"]);
//! let installed = ConfigValue::string_list(["b", "a"]);
//!
//! let mut console = BufferedConsole::new();
//! let mut ctx = MergeContext::new(&mut console, MergeOptions::default());
//! let result = merge_tree("files", Some(&original), Some(&target), Some(&installed), &mut ctx)?;
//!
//! assert!(result.changed);
//! assert_eq!(result.value, Some(ConfigValue::string_list(["b", "a", "c"])));
//! # Ok::<(), manifest_merger::MergeError>(())
//! ```

use tracing::debug;

use crate::classifier::{classify, DeltaAction};
use crate::console::Verbosity;
use crate::errors::EngineResult;
use crate::patch::MergeResult;
use crate::policy::MergeContext;
use crate::value::{ConfigMap, ConfigValue};

#[cfg(test)]
#[path = "tree_tests.rs"]
mod tests;

/// Merges one field of a manifest tree.
///
/// `None` means the field is absent on that side. An absent value counts as
/// an empty container when deciding whether all three sides are containers.
///
/// # Errors
///
/// Only the conflict policy can fail, see [`MergeContext::resolve_conflict`].
pub fn merge_tree(
    field: &str,
    original: Option<&ConfigValue>,
    target: Option<&ConfigValue>,
    user: Option<&ConfigValue>,
    ctx: &mut MergeContext<'_>,
) -> EngineResult<MergeResult> {
    let sides = [original, target, user];
    if sides.iter().all(Option::is_none) {
        return Ok(MergeResult::unchanged(None));
    }

    if sides
        .iter()
        .all(|side| side.map_or(true, ConfigValue::is_container))
    {
        merge_containers(field, original, target, user, ctx)
    } else {
        merge_scalars(field, original, target, user, ctx)
    }
}

fn merge_containers(
    field: &str,
    original: Option<&ConfigValue>,
    target: Option<&ConfigValue>,
    user: Option<&ConfigValue>,
    ctx: &mut MergeContext<'_>,
) -> EngineResult<MergeResult> {
    let empty = ConfigMap::new();
    let original_map = original.and_then(ConfigValue::associative_part).unwrap_or(&empty);
    let target_map = target.and_then(ConfigValue::associative_part).unwrap_or(&empty);
    let user_map = user.and_then(ConfigValue::associative_part).unwrap_or(&empty);

    let mut associative = user_map.clone();
    let mut changed = false;

    for key in union_keys(original_map, target_map) {
        let child_field = format!("{}.{}", field, key);
        let child = merge_tree(
            &child_field,
            original_map.get(key),
            target_map.get(key),
            user_map.get(key),
            ctx,
        )?;

        // Null or empty results never survive as keys, touched or not.
        if child.is_removal() {
            if associative.remove(key).is_some() {
                changed = true;
            }
            continue;
        }
        if child.changed {
            if let Some(value) = child.value {
                associative.insert(key, value);
                changed = true;
            }
        }
    }

    let (flat, flat_changed) = merge_flat(
        field,
        flat_part(original),
        flat_part(target),
        flat_part(user),
        ctx,
    );
    changed |= flat_changed;

    if !changed {
        return Ok(MergeResult::unchanged(user.cloned()));
    }

    let prefer_map = user
        .or(target)
        .is_some_and(|value| value.associative_part().is_some());
    Ok(MergeResult::changed(Some(combine(flat, associative, prefer_map))))
}

fn flat_part(value: Option<&ConfigValue>) -> &[ConfigValue] {
    match value {
        Some(value) => value.flat_part(),
        None => &[],
    }
}

/// Keys of `original` followed by the keys only `target` has.
fn union_keys<'m>(original: &'m ConfigMap, target: &'m ConfigMap) -> Vec<&'m str> {
    let mut keys: Vec<&str> = original.keys().collect();
    keys.extend(target.keys().filter(|key| !original.contains_key(key)));
    keys
}

/// Set merge of list members.
///
/// Adds what the target introduced and the installation lacks. Removes what
/// the target dropped, but only where the installation still carries it.
/// Members the installation added on its own are kept.
fn merge_flat(
    field: &str,
    original: &[ConfigValue],
    target: &[ConfigValue],
    user: &[ConfigValue],
    ctx: &mut MergeContext<'_>,
) -> (Vec<ConfigValue>, bool) {
    let mut additions: Vec<&ConfigValue> = Vec::new();
    for value in target {
        if !original.contains(value) && !user.contains(value) && !additions.contains(&value) {
            additions.push(value);
        }
    }
    let removals: Vec<&ConfigValue> = original
        .iter()
        .filter(|value| !target.contains(value) && user.contains(value))
        .collect();

    if additions.is_empty() && removals.is_empty() {
        return (user.to_vec(), false);
    }

    if !additions.is_empty() {
        ctx.log(
            &format!("Adding {} to {}", render(&additions), field),
            Verbosity::Verbose,
            None,
        );
    }
    if !removals.is_empty() {
        ctx.log(
            &format!("Removing {} from {}", render(&removals), field),
            Verbosity::Verbose,
            None,
        );
    }
    debug!(
        field,
        added = additions.len(),
        removed = removals.len(),
        "Merged flat members"
    );

    let mut merged: Vec<ConfigValue> = user
        .iter()
        .filter(|value| !removals.contains(value))
        .cloned()
        .collect();
    merged.extend(additions.into_iter().cloned());
    (merged, true)
}

fn render(values: &[&ConfigValue]) -> String {
    values
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Joins the flat and associative results back into one container.
///
/// Flat members get positional keys when both parts are present; the
/// associative entries are written over them.
fn combine(flat: Vec<ConfigValue>, associative: ConfigMap, prefer_map: bool) -> ConfigValue {
    match (flat.is_empty(), associative.is_empty()) {
        (false, true) => ConfigValue::List(flat),
        (true, false) => ConfigValue::Map(associative),
        (true, true) if prefer_map => ConfigValue::Map(associative),
        (true, true) => ConfigValue::List(flat),
        (false, false) => {
            let mut combined: ConfigMap = flat
                .into_iter()
                .enumerate()
                .map(|(index, value)| (index.to_string(), value))
                .collect();
            for (key, value) in associative {
                combined.insert(key, value);
            }
            ConfigValue::Map(combined)
        }
    }
}

fn merge_scalars(
    field: &str,
    original: Option<&ConfigValue>,
    target: Option<&ConfigValue>,
    user: Option<&ConfigValue>,
    ctx: &mut MergeContext<'_>,
) -> EngineResult<MergeResult> {
    let delta = classify(field, present(original), present(target), present(user));
    if delta.action == DeltaAction::None {
        return Ok(MergeResult::unchanged(user.cloned()));
    }

    let apply = match &delta.conflict {
        Some(description) => ctx.resolve_conflict(field, description)?,
        None => true,
    };
    if !apply {
        return Ok(MergeResult::unchanged(user.cloned()));
    }

    debug!(field, action = %delta.action, "Applying target value");
    match delta.action {
        DeltaAction::Remove => {
            ctx.log(&format!("Removing {}", field), Verbosity::Verbose, None);
            Ok(MergeResult::changed(None))
        }
        _ => {
            let value = target.cloned();
            ctx.log(
                &format!(
                    "Updating {} to {}",
                    field,
                    value.as_ref().map_or_else(|| "null".to_string(), ToString::to_string)
                ),
                Verbosity::Verbose,
                None,
            );
            Ok(MergeResult::changed(value))
        }
    }
}

fn present(value: Option<&ConfigValue>) -> Option<&ConfigValue> {
    value.filter(|v| !v.is_null())
}
