//! Location hierarchy derivation.
//!
//! Builds a parent/child tree from the flat location collection. The tree
//! is derived fresh on every call and never stored; callers that watch the
//! `locations` path rebuild it on notification.

use crate::types::{LocationId, LocationRecord};
use std::collections::HashMap;

/// Traversal cap for parent-chain walks. A cyclic parent chain (bad data)
/// terminates here instead of spinning.
const MAX_DEPTH: usize = 64;

/// One location plus the indices of its children, in source order.
#[derive(Clone, Debug)]
pub struct LocationNode {
    pub record: LocationRecord,
    children: Vec<usize>,
}

/// A derived location tree: arena of nodes, id index, and root list.
///
/// Every input record appears in exactly one place: under its resolved
/// parent, or in `roots` when its parent reference is absent or does not
/// resolve (root promotion). Nothing is silently dropped.
#[derive(Clone, Debug, Default)]
pub struct LocationHierarchy {
    nodes: Vec<LocationNode>,
    by_id: HashMap<LocationId, usize>,
    roots: Vec<usize>,
}

/// Build the hierarchy from a flat record list.
///
/// Two passes: the first creates one childless node per record indexed by
/// id; the second, in input order, attaches each record with a resolvable
/// parent to that parent and promotes the rest to roots. Children keep
/// the input order. The output does not alias the input slice.
///
/// Duplicate ids are the caller's responsibility (later records shadow
/// earlier ones in the id index). Cycles are not detected: each node's
/// children are fixed at construction, so tree traversal stays finite,
/// but depth-dependent views of cyclic data (see [`LocationHierarchy::path_string`])
/// are capped rather than exact.
pub fn build_hierarchy(records: &[LocationRecord]) -> LocationHierarchy {
    let mut nodes = Vec::with_capacity(records.len());
    let mut by_id = HashMap::with_capacity(records.len());

    for record in records {
        by_id.insert(record.id, nodes.len());
        nodes.push(LocationNode {
            record: record.clone(),
            children: Vec::new(),
        });
    }

    let mut roots = Vec::new();
    for (index, record) in records.iter().enumerate() {
        match record.parent.and_then(|parent| by_id.get(&parent).copied()) {
            Some(parent_index) => nodes[parent_index].children.push(index),
            None => roots.push(index),
        }
    }

    LocationHierarchy {
        nodes,
        by_id,
        roots,
    }
}

impl LocationHierarchy {
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Look up a node by location id.
    pub fn get(&self, id: LocationId) -> Option<&LocationNode> {
        self.by_id.get(&id).map(|&index| &self.nodes[index])
    }

    /// Root nodes in input order.
    pub fn roots<'a>(&'a self) -> impl Iterator<Item = &'a LocationNode> + 'a {
        self.roots.iter().map(move |&index| &self.nodes[index])
    }

    /// Children of a node, in input order.
    pub fn children<'a>(
        &'a self,
        node: &'a LocationNode,
    ) -> impl Iterator<Item = &'a LocationNode> + 'a {
        node.children.iter().map(move |&index| &self.nodes[index])
    }

    /// Depth-first walk over all trees, roots first.
    pub fn iter_depth_first<'a>(&'a self) -> impl Iterator<Item = &'a LocationNode> + 'a {
        let mut stack: Vec<usize> = self.roots.iter().rev().copied().collect();
        std::iter::from_fn(move || {
            let index = stack.pop()?;
            let node = &self.nodes[index];
            stack.extend(node.children.iter().rev());
            Some(node)
        })
    }

    /// Display path from root to this location, `"Building / Floor / Room"`.
    ///
    /// Walks the parent chain; the walk is capped at [`MAX_DEPTH`] so
    /// cyclic parent data yields a truncated path instead of hanging.
    pub fn path_string(&self, id: LocationId) -> Option<String> {
        let mut names = Vec::new();
        let mut current = self.get(id)?;
        names.push(current.record.name.as_str());

        for _ in 0..MAX_DEPTH {
            let parent = match current.record.parent.and_then(|p| self.get(p)) {
                Some(parent) => parent,
                None => break,
            };
            names.push(parent.record.name.as_str());
            current = parent;
        }

        names.reverse();
        Some(names.join(" / "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::LocationId;

    fn location(id: u64, name: &str, parent: Option<u64>) -> LocationRecord {
        LocationRecord {
            id: LocationId(id),
            name: name.to_string(),
            code: format!("L{}", id),
            parent: parent.map(LocationId),
            capacity: None,
            occupancy: 0,
            building: None,
            floor: None,
            active: true,
        }
    }

    #[test]
    fn test_build_basic_tree() {
        let records = vec![
            location(1, "Campus", None),
            location(2, "Library", Some(1)),
            location(3, "Lab", Some(1)),
        ];
        let hierarchy = build_hierarchy(&records);

        let roots: Vec<_> = hierarchy.roots().map(|n| n.record.id).collect();
        assert_eq!(roots, vec![LocationId(1)]);

        let campus = hierarchy.get(LocationId(1)).unwrap();
        let children: Vec<_> = hierarchy.children(campus).map(|n| n.record.id).collect();
        assert_eq!(children, vec![LocationId(2), LocationId(3)]);
    }

    #[test]
    fn test_unresolvable_parent_promoted_to_root() {
        // Parent 99 does not exist anywhere in the collection.
        let records = vec![
            location(1, "A", None),
            location(2, "B", Some(1)),
            location(3, "C", Some(99)),
        ];
        let hierarchy = build_hierarchy(&records);

        let roots: Vec<_> = hierarchy.roots().map(|n| n.record.id).collect();
        assert_eq!(roots, vec![LocationId(1), LocationId(3)]);

        let a = hierarchy.get(LocationId(1)).unwrap();
        let children: Vec<_> = hierarchy.children(a).map(|n| n.record.id).collect();
        assert_eq!(children, vec![LocationId(2)]);
    }

    #[test]
    fn test_every_record_appears_exactly_once() {
        let records = vec![
            location(10, "A", None),
            location(20, "B", Some(10)),
            location(30, "C", Some(20)),
            location(40, "D", Some(999)),
            location(50, "E", None),
        ];
        let hierarchy = build_hierarchy(&records);

        let mut visited: Vec<_> = hierarchy.iter_depth_first().map(|n| n.record.id.0).collect();
        visited.sort_unstable();
        assert_eq!(visited, vec![10, 20, 30, 40, 50]);
    }

    #[test]
    fn test_output_does_not_alias_input() {
        let records = vec![location(1, "A", None)];
        let hierarchy = build_hierarchy(&records);
        drop(records);
        assert_eq!(hierarchy.get(LocationId(1)).unwrap().record.name, "A");
    }

    #[test]
    fn test_empty_input() {
        let hierarchy = build_hierarchy(&[]);
        assert!(hierarchy.is_empty());
        assert_eq!(hierarchy.roots().count(), 0);
    }

    #[test]
    fn test_children_preserve_input_order() {
        let records = vec![
            location(1, "Root", None),
            location(5, "Zeta", Some(1)),
            location(2, "Alpha", Some(1)),
            location(9, "Mid", Some(1)),
        ];
        let hierarchy = build_hierarchy(&records);
        let root = hierarchy.get(LocationId(1)).unwrap();
        let children: Vec<_> = hierarchy.children(root).map(|n| n.record.name.clone()).collect();
        assert_eq!(children, vec!["Zeta", "Alpha", "Mid"]);
    }

    #[test]
    fn test_path_string() {
        let records = vec![
            location(1, "Main Building", None),
            location(2, "Floor 2", Some(1)),
            location(3, "Room 201", Some(2)),
        ];
        let hierarchy = build_hierarchy(&records);

        assert_eq!(
            hierarchy.path_string(LocationId(3)).unwrap(),
            "Main Building / Floor 2 / Room 201"
        );
        assert_eq!(hierarchy.path_string(LocationId(99)), None);
    }

    #[test]
    fn test_path_string_terminates_on_cycle() {
        // Mutually-parented records are bad data but must not hang.
        let records = vec![location(1, "A", Some(2)), location(2, "B", Some(1))];
        let hierarchy = build_hierarchy(&records);
        let path = hierarchy.path_string(LocationId(1)).unwrap();
        assert!(!path.is_empty());
    }
}
