//! Category hierarchy held as an arena keyed by id with a parent index.

use std::collections::{HashMap, HashSet};

use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParentError {
    SelfParent,
    Cycle,
    MissingParent,
}

#[derive(Debug)]
pub struct CategoryArena<T> {
    nodes: Vec<T>,
    index: HashMap<Uuid, usize>,
    parents: HashMap<Uuid, Option<Uuid>>,
}

/// A category with its children resolved.
#[derive(Debug, Clone, PartialEq)]
pub struct TreeNode<T> {
    pub value: T,
    pub children: Vec<TreeNode<T>>,
}

impl<T> CategoryArena<T> {
    /// Build the arena; `key` extracts `(id, parent_id)` from each node.
    pub fn new<F>(nodes: Vec<T>, key: F) -> Self
    where
        F: Fn(&T) -> (Uuid, Option<Uuid>),
    {
        let mut index = HashMap::with_capacity(nodes.len());
        let mut parents = HashMap::with_capacity(nodes.len());
        for (pos, node) in nodes.iter().enumerate() {
            let (id, parent) = key(node);
            index.insert(id, pos);
            parents.insert(id, parent);
        }
        Self {
            nodes,
            index,
            parents,
        }
    }

    pub fn contains(&self, id: Uuid) -> bool {
        self.index.contains_key(&id)
    }

    pub fn get(&self, id: Uuid) -> Option<&T> {
        self.index.get(&id).and_then(|pos| self.nodes.get(*pos))
    }

    pub fn parent_of(&self, id: Uuid) -> Option<Uuid> {
        self.parents.get(&id).copied().flatten()
    }

    /// Check that `id` may hang under `new_parent`.
    ///
    /// Walks up from `new_parent`; reaching `id` means the move would close a loop.
    pub fn validate_parent(&self, id: Uuid, new_parent: Option<Uuid>) -> Result<(), ParentError> {
        let Some(parent) = new_parent else {
            return Ok(());
        };
        if parent == id {
            return Err(ParentError::SelfParent);
        }
        if !self.contains(parent) {
            return Err(ParentError::MissingParent);
        }

        let mut seen = HashSet::new();
        let mut cursor = Some(parent);
        while let Some(current) = cursor {
            if current == id {
                return Err(ParentError::Cycle);
            }
            if !seen.insert(current) {
                // Pre-existing loop elsewhere in the data; stop walking.
                break;
            }
            cursor = self.parent_of(current);
        }
        Ok(())
    }

    /// `root` followed by every category below it.
    pub fn descendants_of(&self, root: Uuid) -> Vec<Uuid> {
        let children = self.children_index();
        let mut out = Vec::new();
        let mut seen = HashSet::new();
        let mut stack = vec![root];
        while let Some(id) = stack.pop() {
            if !seen.insert(id) {
                continue;
            }
            out.push(id);
            if let Some(kids) = children.get(&Some(id)) {
                stack.extend(kids.iter().rev().copied());
            }
        }
        out
    }

    /// Nested tree preserving input order among siblings. Nodes whose parent is
    /// unknown are promoted to roots.
    pub fn into_tree(self) -> Vec<TreeNode<T>> {
        let children = self.children_index();
        let ids: Vec<Uuid> = {
            let mut by_pos: Vec<(usize, Uuid)> =
                self.index.iter().map(|(id, pos)| (*pos, *id)).collect();
            by_pos.sort_unstable();
            by_pos.into_iter().map(|(_, id)| id).collect()
        };
        let roots: Vec<Uuid> = ids
            .iter()
            .copied()
            .filter(|id| match self.parent_of(*id) {
                None => true,
                Some(parent) => !self.contains(parent),
            })
            .collect();

        let mut slots: Vec<Option<T>> = self.nodes.into_iter().map(Some).collect();
        let mut placed = HashSet::new();
        roots
            .into_iter()
            .filter_map(|id| build(id, &children, &self.index, &mut slots, &mut placed))
            .collect()
    }

    fn children_index(&self) -> HashMap<Option<Uuid>, Vec<Uuid>> {
        let mut ordered: Vec<(usize, Uuid)> =
            self.index.iter().map(|(id, pos)| (*pos, *id)).collect();
        ordered.sort_unstable();
        let mut children: HashMap<Option<Uuid>, Vec<Uuid>> = HashMap::new();
        for (_, id) in ordered {
            children.entry(self.parent_of(id)).or_default().push(id);
        }
        children
    }
}

fn build<T>(
    id: Uuid,
    children: &HashMap<Option<Uuid>, Vec<Uuid>>,
    index: &HashMap<Uuid, usize>,
    slots: &mut [Option<T>],
    placed: &mut HashSet<Uuid>,
) -> Option<TreeNode<T>> {
    if !placed.insert(id) {
        return None;
    }
    let value = index.get(&id).and_then(|pos| slots.get_mut(*pos)).and_then(Option::take)?;
    let kids = children
        .get(&Some(id))
        .map(|kids| {
            kids.iter()
                .filter_map(|kid| build(*kid, children, index, slots, placed))
                .collect()
        })
        .unwrap_or_default();
    Some(TreeNode {
        value,
        children: kids,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    struct Node {
        id: Uuid,
        parent: Option<Uuid>,
        name: &'static str,
    }

    fn node(name: &'static str, parent: Option<Uuid>) -> Node {
        Node {
            id: Uuid::new_v4(),
            parent,
            name,
        }
    }

    fn arena(nodes: Vec<Node>) -> CategoryArena<Node> {
        CategoryArena::new(nodes, |n| (n.id, n.parent))
    }

    #[test]
    fn rejects_self_parent() {
        let a = node("a", None);
        let id = a.id;
        assert_eq!(
            arena(vec![a]).validate_parent(id, Some(id)),
            Err(ParentError::SelfParent)
        );
    }

    #[test]
    fn rejects_moving_under_a_descendant() {
        let root = node("root", None);
        let child = node("child", Some(root.id));
        let grandchild = node("grandchild", Some(child.id));
        let (root_id, grandchild_id) = (root.id, grandchild.id);
        let arena = arena(vec![root, child, grandchild]);
        assert_eq!(
            arena.validate_parent(root_id, Some(grandchild_id)),
            Err(ParentError::Cycle)
        );
    }

    #[test]
    fn accepts_valid_moves_and_detaching() {
        let a = node("a", None);
        let b = node("b", None);
        let (a_id, b_id) = (a.id, b.id);
        let arena = arena(vec![a, b]);
        assert_eq!(arena.validate_parent(a_id, Some(b_id)), Ok(()));
        assert_eq!(arena.validate_parent(a_id, None), Ok(()));
        assert_eq!(
            arena.validate_parent(a_id, Some(Uuid::new_v4())),
            Err(ParentError::MissingParent)
        );
    }

    #[test]
    fn new_category_may_take_any_existing_parent() {
        let a = node("a", None);
        let a_id = a.id;
        assert_eq!(arena(vec![a]).validate_parent(Uuid::new_v4(), Some(a_id)), Ok(()));
    }

    #[test]
    fn builds_nested_tree_in_input_order() {
        let engine = node("engine", None);
        let pistons = node("pistons", Some(engine.id));
        let body = node("body", None);
        let gaskets = node("gaskets", Some(engine.id));
        let tree = arena(vec![engine, pistons, body, gaskets]).into_tree();

        let names: Vec<_> = tree.iter().map(|n| n.value.name).collect();
        assert_eq!(names, vec!["engine", "body"]);
        let kids: Vec<_> = tree[0].children.iter().map(|n| n.value.name).collect();
        assert_eq!(kids, vec!["pistons", "gaskets"]);
        assert!(tree[1].children.is_empty());
    }

    #[test]
    fn orphans_become_roots() {
        let orphan = node("orphan", Some(Uuid::new_v4()));
        let tree = arena(vec![orphan]).into_tree();
        assert_eq!(tree.len(), 1);
        assert_eq!(tree[0].value.name, "orphan");
    }

    #[test]
    fn descendants_include_root_and_all_levels() {
        let root = node("root", None);
        let child = node("child", Some(root.id));
        let grandchild = node("grandchild", Some(child.id));
        let other = node("other", None);
        let (root_id, child_id, grandchild_id) = (root.id, child.id, grandchild.id);
        let found = arena(vec![root, child, grandchild, other]).descendants_of(root_id);
        assert_eq!(found, vec![root_id, child_id, grandchild_id]);
    }
}
