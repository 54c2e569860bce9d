//! Name-keyed entity collections and their three-way merge.
//!
//! Entity sections map a name to a constraint string, like a dependency list.
//! Each name is classified on its own; the merged collection keeps the
//! installed entities in place, drops the removed ones, substitutes changed
//! ones and puts the target's additions first. Order-sensitive sections are
//! then rearranged by [`crate::order`].

use std::collections::HashMap;

use tracing::debug;

use crate::classifier::{classify, DeltaAction};
use crate::console::Verbosity;
use crate::errors::{EngineResult, MergeError};
use crate::order::{arrange, reconcile_order};
use crate::patch::MergeResult;
use crate::policy::MergeContext;
use crate::value::{ConfigMap, ConfigValue};

#[cfg(test)]
#[path = "entities_tests.rs"]
mod tests;

/// One named link, such as a dependency on a package.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamedEntity {
    pub name: String,
    /// Canonical form used for comparisons.
    pub constraint: String,
    /// Form shown to people and written back to the manifest.
    pub display_constraint: String,
}

impl NamedEntity {
    /// An entity whose canonical and display constraints are the same.
    pub fn new(name: impl Into<String>, constraint: impl Into<String>) -> Self {
        let constraint = constraint.into();
        Self {
            name: name.into(),
            display_constraint: constraint.clone(),
            constraint,
        }
    }

    pub fn with_display(
        name: impl Into<String>,
        constraint: impl Into<String>,
        display_constraint: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            constraint: constraint.into(),
            display_constraint: display_constraint.into(),
        }
    }
}

/// Turns a raw constraint string into its comparable form.
///
/// Hosts plug their version-constraint parser in here.
pub trait ConstraintParser {
    fn canonicalize(&self, raw: &str) -> String;
}

/// Compares constraints textually, ignoring surrounding and repeated
/// whitespace.
#[derive(Debug, Clone, Copy, Default)]
pub struct LiteralConstraints;

impl ConstraintParser for LiteralConstraints {
    fn canonicalize(&self, raw: &str) -> String {
        raw.split_whitespace().collect::<Vec<_>>().join(" ")
    }
}

/// Ordered entities with unique names.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EntityCollection {
    entities: Vec<NamedEntity>,
}

impl EntityCollection {
    /// Builds a collection, rejecting duplicate names.
    ///
    /// # Errors
    ///
    /// Returns `MergeError::DuplicateEntity` if a name appears twice.
    pub fn new(section: &str, entities: Vec<NamedEntity>) -> EngineResult<Self> {
        for (index, entity) in entities.iter().enumerate() {
            if entities[..index].iter().any(|e| e.name == entity.name) {
                return Err(MergeError::DuplicateEntity {
                    section: section.to_string(),
                    name: entity.name.clone(),
                });
            }
        }
        Ok(Self { entities })
    }

    /// Reads a section value of the form `{name: constraint, ...}`.
    ///
    /// An absent value, null, or an empty list is an empty collection.
    ///
    /// # Errors
    ///
    /// Returns `MergeError::InvalidSection` for any other shape, including
    /// non-scalar constraints.
    pub fn from_section(
        section: &str,
        value: Option<&ConfigValue>,
        parser: &dyn ConstraintParser,
    ) -> EngineResult<Self> {
        let map = match value {
            None | Some(ConfigValue::Scalar(None)) => return Ok(Self::default()),
            Some(ConfigValue::List(items)) if items.is_empty() => return Ok(Self::default()),
            Some(ConfigValue::Map(map)) => map,
            Some(other) => {
                return Err(MergeError::InvalidSection {
                    section: section.to_string(),
                    reason: format!("expected a map of names to constraints, found {}", other),
                })
            }
        };

        let mut entities = Vec::with_capacity(map.len());
        for (name, constraint) in map.iter() {
            let ConfigValue::Scalar(Some(raw)) = constraint else {
                return Err(MergeError::InvalidSection {
                    section: section.to_string(),
                    reason: format!("constraint for '{}' must be a scalar, found {}", name, constraint),
                });
            };
            let raw = raw.to_string();
            entities.push(NamedEntity::with_display(name, parser.canonicalize(&raw), raw));
        }
        Self::new(section, entities)
    }

    pub fn get(&self, name: &str) -> Option<&NamedEntity> {
        self.entities.iter().find(|e| e.name == name)
    }

    /// Looks a name up ignoring ASCII case, for hosts whose naming rules are
    /// case-insensitive.
    pub fn find_ignore_case(&self, name: &str) -> Option<&NamedEntity> {
        self.entities
            .iter()
            .find(|e| e.name.eq_ignore_ascii_case(name))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entities.iter().map(|e| e.name.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = &NamedEntity> {
        self.entities.iter()
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// The section value: names mapped to their display constraints.
    pub fn to_value(&self) -> ConfigValue {
        ConfigValue::Map(
            self.entities
                .iter()
                .map(|e| (e.name.clone(), ConfigValue::string(e.display_constraint.clone())))
                .collect::<ConfigMap>(),
        )
    }
}

/// Three-way merge of one entity section.
///
/// Names matching `exclude` are neither merged nor reordered, the installed
/// entity is carried through untouched. When `ordered` is set the result is
/// also reconciled against the target's order.
///
/// # Errors
///
/// Only the conflict policy can fail, see [`MergeContext::resolve_conflict`].
///
/// # Examples
///
/// ```rust
/// use manifest_merger::{
///     merge_entities, BufferedConsole, EntityCollection, MergeContext, MergeOptions, NamedEntity,
/// };
///
/// let original = EntityCollection::new("require", vec![NamedEntity::new("a/x", "^1.0")])?;
/// let target = EntityCollection::new("require", vec![NamedEntity::new("a/x", "^2.0")])?;
/// let installed = EntityCollection::new(
///     "require",
///     vec![NamedEntity::new("a/x", "^1.0"), NamedEntity::new("me/local", "*")],
/// )?;
///
/// let mut console = BufferedConsole::new();
/// let mut ctx = MergeContext::new(&mut console, MergeOptions::default());
/// let result = merge_entities(
///     "require", &original, &target, &installed, &|_: &str| false, true, &mut ctx,
/// )?;
///
/// assert!(result.changed);
/// assert_eq!(result.value.unwrap().to_string(), r#"{"a/x":"^2.0","me/local":"*"}"#);
/// # Ok::<(), manifest_merger::MergeError>(())
/// ```
pub fn merge_entities(
    section: &str,
    original: &EntityCollection,
    target: &EntityCollection,
    user: &EntityCollection,
    exclude: &dyn Fn(&str) -> bool,
    ordered: bool,
    ctx: &mut MergeContext<'_>,
) -> EngineResult<MergeResult> {
    let mut adds: Vec<NamedEntity> = Vec::new();
    let mut removes: Vec<&str> = Vec::new();
    let mut changes: HashMap<&str, &NamedEntity> = HashMap::new();

    let names = original
        .names()
        .chain(target.names().filter(|name| original.get(name).is_none()))
        .filter(|name| !exclude(*name));

    for name in names {
        let field = format!("{}.{}", section, name);
        let target_entity = target.get(name);
        let delta = classify(
            &field,
            original.get(name).map(|e| e.constraint.as_str()),
            target_entity.map(|e| e.constraint.as_str()),
            user.get(name).map(|e| e.constraint.as_str()),
        );
        if delta.action == DeltaAction::None {
            continue;
        }
        if let Some(description) = &delta.conflict {
            if !ctx.resolve_conflict(&field, description)? {
                continue;
            }
        }

        match (delta.action, target_entity) {
            (DeltaAction::Remove, _) => {
                ctx.log(
                    &format!("Removing {} {}", section, name),
                    Verbosity::Verbose,
                    None,
                );
                removes.push(name);
            }
            (DeltaAction::Add, Some(entity)) => {
                ctx.log(
                    &format!("Adding {} {} {}", section, name, entity.display_constraint),
                    Verbosity::Verbose,
                    None,
                );
                adds.push(entity.clone());
            }
            (DeltaAction::Change, Some(entity)) => {
                ctx.log(
                    &format!("Updating {} {} to {}", section, name, entity.display_constraint),
                    Verbosity::Verbose,
                    None,
                );
                changes.insert(name, entity);
            }
            _ => {}
        }
    }

    let membership_changed = !adds.is_empty() || !removes.is_empty() || !changes.is_empty();
    debug!(
        section,
        adds = adds.len(),
        removes = removes.len(),
        changes = changes.len(),
        "Classified entities"
    );

    let mut merged = adds;
    for entity in user.iter() {
        if removes.contains(&entity.name.as_str()) {
            continue;
        }
        match changes.get(entity.name.as_str()) {
            Some(changed) => merged.push((*changed).clone()),
            None => merged.push(entity.clone()),
        }
    }

    let mut order_changed = false;
    if ordered {
        let original_order = without_excluded(original, exclude);
        let target_order = without_excluded(target, exclude);
        let user_order = without_excluded(user, exclude);
        let decision = reconcile_order(section, &original_order, &target_order, &user_order, ctx)?;
        order_changed = decision.changed;

        let all_user: Vec<&str> = user.names().collect();
        let merged_names: Vec<&str> = merged.iter().map(|e| e.name.as_str()).collect();
        let arrangement = arrange(&merged_names, &decision.override_order, &target_order, &all_user);
        let mut slots: Vec<Option<NamedEntity>> = merged.into_iter().map(Some).collect();
        merged = arrangement
            .into_iter()
            .filter_map(|index| slots[index].take())
            .collect();
    }

    if !membership_changed && !order_changed {
        return Ok(MergeResult::unchanged(Some(user.to_value())));
    }
    Ok(MergeResult::changed(Some(
        EntityCollection { entities: merged }.to_value(),
    )))
}

fn without_excluded<'c>(
    collection: &'c EntityCollection,
    exclude: &dyn Fn(&str) -> bool,
) -> Vec<&'c str> {
    collection.names().filter(|name| !exclude(*name)).collect()
}
