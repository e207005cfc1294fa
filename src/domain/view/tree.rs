//! Category hierarchy: flat list to forest, descendant lookups and move checks.

use std::collections::{HashMap, HashSet};

use tracing::warn;

use crate::domain::entities::category::{Category, CategoryNode};
use crate::domain::entities::record::RecordId;
use crate::domain::view::collate::CollationKey;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TreeError {
    #[error("category hierarchy contains a cycle through {id}")]
    CycleDetected { id: RecordId },
    #[error("unknown category {id}")]
    UnknownCategory { id: RecordId },
    #[error("cannot move category {id} under {parent}: target is inside its own subtree")]
    InvalidMove { id: RecordId, parent: RecordId },
}

/// Builds the category forest.
///
/// Categories whose parent is missing from the input are surfaced as roots.
/// Duplicate ids keep their first occurrence. A cycle anywhere in the input
/// fails the whole build with [`TreeError::CycleDetected`].
pub fn build_tree(categories: &[Category]) -> Result<Vec<CategoryNode>, TreeError> {
    let (by_id, unique) = first_occurrences(categories);

    let mut roots = Vec::new();
    let mut children_of: HashMap<&RecordId, Vec<&Category>> = HashMap::new();
    for category in &unique {
        match category
            .parent_category_id
            .as_ref()
            .filter(|parent| by_id.contains_key(parent))
        {
            Some(parent) => children_of.entry(parent).or_default().push(category),
            None => roots.push(*category),
        }
    }

    let mut placed = HashSet::with_capacity(unique.len());
    let forest = ordered(roots)
        .into_iter()
        .map(|root| attach(root, &children_of, &mut placed))
        .collect::<Vec<_>>();

    if let Some(unplaced) = unique.iter().find(|c| !placed.contains(&c.id)) {
        let id = cycle_member(unplaced, &by_id);
        warn!(%id, "category cycle detected while building tree");
        return Err(TreeError::CycleDetected { id });
    }

    Ok(forest)
}

fn first_occurrences(categories: &[Category]) -> (HashMap<&RecordId, &Category>, Vec<&Category>) {
    let mut by_id: HashMap<&RecordId, &Category> = HashMap::with_capacity(categories.len());
    let mut unique = Vec::with_capacity(categories.len());
    for category in categories {
        if by_id.contains_key(&category.id) {
            warn!(id = %category.id, "duplicate category id ignored");
            continue;
        }
        by_id.insert(&category.id, category);
        unique.push(category);
    }
    (by_id, unique)
}

fn attach<'a>(
    category: &'a Category,
    children_of: &HashMap<&RecordId, Vec<&'a Category>>,
    placed: &mut HashSet<&'a RecordId>,
) -> CategoryNode {
    placed.insert(&category.id);
    let children = children_of
        .get(&category.id)
        .map(|children| {
            ordered(children.clone())
                .into_iter()
                .map(|child| attach(child, children_of, placed))
                .collect()
        })
        .unwrap_or_default();

    CategoryNode {
        category: category.clone(),
        children,
    }
}

fn ordered(mut categories: Vec<&Category>) -> Vec<&Category> {
    categories.sort_by(|a, b| {
        a.display_order
            .unwrap_or(i64::MAX)
            .cmp(&b.display_order.unwrap_or(i64::MAX))
            .then_with(|| CollationKey::new(&a.name).cmp(&CollationKey::new(&b.name)))
    });
    categories
}

// An unplaced category never reaches a root, so its parent chain must repeat.
fn cycle_member<'a>(start: &'a Category, by_id: &HashMap<&RecordId, &'a Category>) -> RecordId {
    let mut seen = HashSet::new();
    let mut current = start;
    loop {
        if !seen.insert(&current.id) {
            return current.id.clone();
        }
        match current
            .parent_category_id
            .as_ref()
            .and_then(|parent| by_id.get(parent).copied())
        {
            Some(parent) => current = parent,
            None => return current.id.clone(),
        }
    }
}

/// Returns `category_id` followed by every descendant, depth first.
///
/// An id that is not in `categories` resolves to itself only. Duplicate ids
/// keep their first occurrence, as in [`build_tree`].
pub fn ids_including_descendants(
    category_id: &RecordId,
    categories: &[Category],
) -> Result<Vec<RecordId>, TreeError> {
    let (_, unique) = first_occurrences(categories);
    let mut children_of: HashMap<&RecordId, Vec<&RecordId>> = HashMap::new();
    for category in unique {
        if let Some(parent) = category.parent_category_id.as_ref() {
            children_of.entry(parent).or_default().push(&category.id);
        }
    }

    let mut visited = HashSet::new();
    let mut ids = Vec::new();
    let mut stack = vec![category_id];
    while let Some(id) = stack.pop() {
        if !visited.insert(id) {
            warn!(
                %id,
                root = %category_id,
                "category cycle detected while collecting descendants"
            );
            return Err(TreeError::CycleDetected { id: id.clone() });
        }
        ids.push(id.clone());
        if let Some(children) = children_of.get(id) {
            stack.extend(children.iter().rev());
        }
    }

    Ok(ids)
}

pub fn find_node<'a>(tree: &'a [CategoryNode], id: &RecordId) -> Option<&'a CategoryNode> {
    for node in tree {
        if node.id() == id {
            return Some(node);
        }
        if let Some(found) = find_node(&node.children, id) {
            return Some(found);
        }
    }
    None
}

/// Checks that re-parenting `category_id` under `new_parent` keeps the hierarchy acyclic.
pub fn validate_move(
    category_id: &RecordId,
    new_parent: Option<&RecordId>,
    categories: &[Category],
) -> Result<(), TreeError> {
    let known = |id: &RecordId| categories.iter().any(|c| &c.id == id);
    if !known(category_id) {
        return Err(TreeError::UnknownCategory {
            id: category_id.clone(),
        });
    }
    let Some(parent) = new_parent else {
        return Ok(());
    };
    if !known(parent) {
        return Err(TreeError::UnknownCategory { id: parent.clone() });
    }

    let subtree = ids_including_descendants(category_id, categories)?;
    if subtree.contains(parent) {
        return Err(TreeError::InvalidMove {
            id: category_id.clone(),
            parent: parent.clone(),
        });
    }
    Ok(())
}
