//! Schema tree: breadth-first expansion of an entity graph.
//!
//! `build_tree` creates one child node per root attribute and keeps a work
//! queue: every dequeued node whose type names a normal schema gets that
//! schema's attributes appended as children (each a fresh value copy — two
//! tree nodes never alias the same attribute record). A malformed catalog
//! whose type chain is cyclic would otherwise grow forever, so expansion is
//! bounded by a total node count.
//!
//! `annotate` then runs one depth-first pre-order pass assigning each node
//! its ancestry path and a stable traversal-order index. Path-based lookup
//! is only meaningful after that pass.

use std::collections::VecDeque;

use crate::entity::{Entity, EntityAttr};
use crate::types::{ResolvedType, TypeCatalog, TypeKind};
use crate::SchemaError;

/// Node indices start above this floor so they never collide with
/// entity-level schema/attribute indices.
pub const NODE_INDEX_FLOOR: u32 = 1000;

/// Expansion bound. A well-formed catalog stays far below this; a cyclic
/// one hits it and fails with [`SchemaError::Cycle`].
pub const MAX_TREE_NODES: usize = 10_000;

/// One schema field expanded into the tree.
#[derive(Debug, Clone)]
pub struct TreeNode {
    pub label: String,
    pub attr_type: String,
    pub required: bool,
    pub multiple: bool,
    pub words: String,
    /// Resolved type, `None` when the type matches nothing in the catalog.
    pub classification: Option<ResolvedType>,
    /// Ancestor labels, root-exclusive. Filled by [`annotate`].
    pub path: Vec<String>,
    /// Pre-order traversal index above [`NODE_INDEX_FLOOR`]. Filled by
    /// [`annotate`].
    pub node_index: u32,
    /// Entity-level index of the schema/attribute this node was copied from.
    pub schema_index: u32,
    pub children: Vec<TreeNode>,
}

impl TreeNode {
    /// Ancestry path plus this node's own label.
    pub fn full_path(&self) -> Vec<String> {
        let mut path = self.path.clone();
        path.push(self.label.clone());
        path
    }
}

fn node_from_attr(attr: &EntityAttr, types: &TypeCatalog) -> TreeNode {
    TreeNode {
        label: attr.name.clone(),
        attr_type: attr.attr_type.clone(),
        required: attr.required,
        multiple: attr.multiple,
        words: attr.words.clone(),
        classification: types.classify(&attr.attr_type).cloned(),
        path: Vec::new(),
        node_index: 0,
        schema_index: attr.index,
        children: Vec::new(),
    }
}

/// Expand an entity into a rooted tree.
///
/// The root node represents the top schema itself (classification `group`,
/// empty path); its children are the top schema's attributes, recursively
/// expanded.
pub fn build_tree(entity: &Entity) -> Result<TreeNode, SchemaError> {
    let types = TypeCatalog::from_entity(entity);

    // Flat arena + child-id lists; reassembled into an owned tree below.
    let mut nodes: Vec<TreeNode> = Vec::new();
    let mut child_ids: Vec<Vec<usize>> = Vec::new();
    let mut top_ids: Vec<usize> = Vec::new();
    let mut queue: VecDeque<usize> = VecDeque::new();

    for attr in &entity.top.attrs {
        let id = nodes.len();
        nodes.push(node_from_attr(attr, &types));
        child_ids.push(Vec::new());
        top_ids.push(id);
        queue.push_back(id);
    }

    while let Some(id) = queue.pop_front() {
        let attr_type = nodes[id].attr_type.clone();
        // The literal basic "text" type never references a sub-schema.
        if attr_type.is_empty() || attr_type == "text" {
            continue;
        }
        let Some(normal) = entity.normals.iter().find(|n| n.name == attr_type) else {
            continue;
        };
        for attr in &normal.attrs {
            if nodes.len() >= MAX_TREE_NODES {
                return Err(SchemaError::Cycle {
                    limit: MAX_TREE_NODES,
                });
            }
            let child = nodes.len();
            // Value copy per expansion site: a schema referenced from two
            // places yields two independent nodes.
            nodes.push(node_from_attr(attr, &types));
            child_ids.push(Vec::new());
            child_ids[id].push(child);
            queue.push_back(child);
        }
    }

    let mut slots: Vec<Option<TreeNode>> = nodes.into_iter().map(Some).collect();
    let children = assemble(&top_ids, &mut slots, &child_ids);

    Ok(TreeNode {
        label: entity.top.name.clone(),
        attr_type: entity.top.name.clone(),
        required: false,
        multiple: false,
        words: entity.top.words.clone().unwrap_or_default(),
        classification: Some(ResolvedType {
            label: entity.top.name.clone(),
            kind: TypeKind::Group,
        }),
        path: Vec::new(),
        node_index: 0,
        schema_index: entity.top.index,
        children,
    })
}

fn assemble(
    ids: &[usize],
    slots: &mut Vec<Option<TreeNode>>,
    child_ids: &[Vec<usize>],
) -> Vec<TreeNode> {
    let mut out = Vec::with_capacity(ids.len());
    for &id in ids {
        let children = assemble(&child_ids[id], slots, child_ids);
        if let Some(mut node) = slots[id].take() {
            node.children = children;
            out.push(node);
        }
    }
    out
}

/// Depth-first pre-order pass assigning `path` and `node_index`.
///
/// Must run exactly once on a freshly built tree, before any path lookup.
pub fn annotate(root: &mut TreeNode) {
    fn walk(node: &mut TreeNode, parent_path: &[String], next: &mut u32) {
        *next += 1;
        node.node_index = *next;
        node.path = parent_path.to_vec();
        let mut child_path = parent_path.to_vec();
        child_path.push(node.label.clone());
        for child in &mut node.children {
            walk(child, &child_path, next);
        }
    }
    let mut next = NODE_INDEX_FLOOR;
    walk(root, &[], &mut next);
}

/// Lazy pre-order traversal over a built tree.
pub fn preorder(root: &TreeNode) -> Preorder<'_> {
    Preorder { stack: vec![root] }
}

pub struct Preorder<'a> {
    stack: Vec<&'a TreeNode>,
}

impl<'a> Iterator for Preorder<'a> {
    type Item = &'a TreeNode;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        for child in node.children.iter().rev() {
            self.stack.push(child);
        }
        Some(node)
    }
}

/// Resolve a node by exact `(ancestor path, label)` match, first match in
/// pre-order wins. Requires an annotated tree.
pub fn find_by_path<'a>(root: &'a TreeNode, wanted: &[String]) -> Option<&'a TreeNode> {
    preorder(root).find(|node| {
        node.path.len() + 1 == wanted.len()
            && node
                .path
                .iter()
                .chain(std::iter::once(&node.label))
                .eq(wanted.iter())
    })
}
