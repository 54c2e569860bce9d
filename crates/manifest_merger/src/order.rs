//! Order reconciliation for order-sensitive entity sections.
//!
//! The original baseline, the target baseline and the installed copy can each
//! list the same entities in a different order. Order is only reconciled over
//! the names the sides share:
//!
//! 1. Target and installed agree on the shared names: nothing to do.
//! 2. The installation never reordered them (its order matches the original
//!    baseline): the target's order is adopted silently.
//! 3. Otherwise the operator reordered deliberately and the conflict policy
//!    decides between the target's order and the installed one.
//!
//! [`arrange`] then lays the merged entities out by override order, target
//! order and installed order, in that priority.

use std::collections::HashMap;

use tracing::debug;

use crate::console::Verbosity;
use crate::errors::EngineResult;
use crate::policy::MergeContext;

#[cfg(test)]
#[path = "order_tests.rs"]
mod tests;

/// Result of reconciling one section's order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OrderDecision {
    /// Order to impose on the shared names. Empty when no override is needed.
    pub override_order: Vec<String>,
    /// Whether the installed order changes.
    pub changed: bool,
}

/// Decides which order the names shared by target and installed copy follow.
///
/// # Errors
///
/// Only the conflict policy can fail, see [`MergeContext::resolve_conflict`].
pub fn reconcile_order(
    section: &str,
    original: &[&str],
    target: &[&str],
    user: &[&str],
    ctx: &mut MergeContext<'_>,
) -> EngineResult<OrderDecision> {
    let common_target = restrict(target, &[user]);
    let common_user = restrict(user, &[target]);

    if common_target == common_user {
        return Ok(OrderDecision::default());
    }

    let shared_original = restrict(original, &[target, user]);
    let shared_user = restrict(user, &[target, original]);
    if shared_original == shared_user {
        debug!(section, "Adopting target order, installed order was never customized");
        ctx.log(
            &format!(
                "Updating {} order to {}",
                section,
                render(&common_target)
            ),
            Verbosity::Verbose,
            None,
        );
        return Ok(OrderDecision {
            override_order: owned(&common_target),
            changed: true,
        });
    }

    let field = format!("{} order", section);
    let description = format!(
        "Target {} order is {} but the installation has {}",
        section,
        render(&common_target),
        render(&common_user)
    );
    if ctx.resolve_conflict(&field, &description)? {
        Ok(OrderDecision {
            override_order: owned(&common_target),
            changed: true,
        })
    } else {
        ctx.log(
            &format!("Keeping installed {} order {}", section, render(&common_user)),
            Verbosity::Verbose,
            None,
        );
        Ok(OrderDecision {
            override_order: owned(&common_user),
            changed: false,
        })
    }
}

/// Orders `names` by the first of `override_order`, `target`, `user` that
/// relates two names.
///
/// Names the target knows are laid out in target order, with the members of
/// `override_order` permuted into the slots they occupy. A name only the
/// installation knows goes after every placed name that precedes it in
/// `user` and before the next placed one, or leads when nothing precedes it.
/// Returns indices into `names`.
pub(crate) fn arrange(
    names: &[&str],
    override_order: &[String],
    target: &[&str],
    user: &[&str],
) -> Vec<usize> {
    let target_rank = ranks(target.iter().copied());
    let override_rank = ranks(override_order.iter().map(String::as_str));
    let user_rank = ranks(user.iter().copied());

    let (mut ranked, local): (Vec<usize>, Vec<usize>) =
        (0..names.len()).partition(|&i| target_rank.contains_key(names[i]));
    ranked.sort_by_key(|&i| target_rank[names[i]]);

    let slots: Vec<usize> = (0..ranked.len())
        .filter(|&slot| override_rank.contains_key(names[ranked[slot]]))
        .collect();
    let mut members: Vec<usize> = slots.iter().map(|&slot| ranked[slot]).collect();
    members.sort_by_key(|&i| override_rank[names[i]]);
    for (&slot, member) in slots.iter().zip(members) {
        ranked[slot] = member;
    }

    // groups[n] holds the local names that follow the first n placed names.
    let slot_of: HashMap<&str, usize> = ranked
        .iter()
        .enumerate()
        .map(|(slot, &i)| (names[i], slot))
        .collect();
    let local_of: HashMap<&str, usize> = local.iter().map(|&i| (names[i], i)).collect();
    let mut groups: Vec<Vec<usize>> = vec![Vec::new(); ranked.len() + 1];
    groups[0].extend(
        local
            .iter()
            .copied()
            .filter(|&i| !user_rank.contains_key(names[i])),
    );
    let mut floor = 0;
    for name in user {
        if let Some(&slot) = slot_of.get(name) {
            floor = floor.max(slot + 1);
        } else if let Some(&i) = local_of.get(name) {
            groups[floor].push(i);
        }
    }

    let mut groups = groups.into_iter();
    let mut arranged: Vec<usize> = groups.next().unwrap_or_default();
    for (i, group) in ranked.into_iter().zip(groups) {
        arranged.push(i);
        arranged.extend(group);
    }
    arranged
}

/// Position of each name in `list`, first occurrence wins.
fn ranks<'a>(list: impl Iterator<Item = &'a str>) -> HashMap<&'a str, usize> {
    let mut ranks = HashMap::new();
    for (index, name) in list.enumerate() {
        ranks.entry(name).or_insert(index);
    }
    ranks
}

/// `list` without the names missing from any of `within`.
fn restrict<'a>(list: &[&'a str], within: &[&[&str]]) -> Vec<&'a str> {
    list.iter()
        .copied()
        .filter(|name| within.iter().all(|other| other.contains(name)))
        .collect()
}

fn owned(names: &[&str]) -> Vec<String> {
    names.iter().map(|name| name.to_string()).collect()
}

fn render(names: &[&str]) -> String {
    format!("[{}]", names.join(", "))
}
