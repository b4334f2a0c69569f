//! Folding field results into the outcome tree
//!
//! Outcomes are built for every field that had work to do; [`prune`] drops
//! the ones that passed, bottom-up, so a parent survives only if it failed
//! itself or has a failing descendant. [`flatten`] walks a pruned tree and
//! lists every failure with its full path.

use crate::outcome::FieldOutcome;

/// Removes passing outcomes from a tree, keeping sibling order.
///
/// Pruning an already pruned tree returns it unchanged.
pub fn prune(outcomes: Vec<FieldOutcome>) -> Vec<FieldOutcome> {
    outcomes
        .into_iter()
        .filter_map(|mut outcome| {
            outcome.children = prune(std::mem::take(&mut outcome.children));
            outcome.has_failures().then_some(outcome)
        })
        .collect()
}

/// One failed constraint, addressed by its path from the root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlatFailure {
    /// Dotted path with `[index]` for sequence elements.
    pub path: String,
    /// Constraint name.
    pub constraint: String,
    /// Rendered message.
    pub message: String,
}

/// Lists every failure of a tree in depth-first, declaration order.
pub fn flatten(outcomes: &[FieldOutcome]) -> Vec<FlatFailure> {
    let mut flat = Vec::new();
    for outcome in outcomes {
        collect(outcome, "", &mut flat);
    }
    flat
}

fn collect(outcome: &FieldOutcome, parent: &str, flat: &mut Vec<FlatFailure>) {
    let path = if parent.is_empty() {
        outcome.property.clone()
    } else if outcome.property.parse::<usize>().is_ok() {
        format!("{parent}[{}]", outcome.property)
    } else {
        format!("{parent}.{}", outcome.property)
    };

    for (constraint, message) in &outcome.constraints {
        flat.push(FlatFailure {
            path: path.clone(),
            constraint: constraint.clone(),
            message: message.clone(),
        });
    }
    for child in &outcome.children {
        collect(child, &path, flat);
    }
}
