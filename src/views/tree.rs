use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// `{name, children}` node as consumed by the front-end tree widget.  Leaves
/// have an empty (but present) `children` array.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreeNode {
    pub name: String,
    pub children: Vec<TreeNode>,
}

impl TreeNode {
    pub fn new(name: impl Into<String>) -> TreeNode {
        TreeNode {
            name: name.into(),
            children: Vec::new(),
        }
    }

    pub fn with_children(name: impl Into<String>, children: Vec<TreeNode>) -> TreeNode {
        TreeNode {
            name: name.into(),
            children,
        }
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// Number of leaf descendants (the node itself does not count).
    pub fn count_leaves(&self) -> usize {
        self.children
            .iter()
            .map(|child| {
                if child.is_leaf() {
                    1
                } else {
                    child.count_leaves()
                }
            })
            .sum()
    }

    pub fn child_names(&self) -> Vec<&str> {
        self.children.iter().map(|c| c.name.as_str()).collect()
    }
}

/// How a view reports its leaf amount.  The two dashboard views disagree and
/// both rules are kept as-is.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LeafCounting {
    /// One per top-level group, however many leaves sit below it.
    PerGroup,
    /// One per emitted leaf node.
    PerLeaf,
}

/// Strategy describing how flat records fold into a three level tree:
/// group -> branch (one per record) -> leaves.
pub trait TreeShape {
    type Record;

    fn root_name(&self) -> &str;

    /// Composite identifier giving the total order records are grouped in.
    fn sort_key(&self, record: &Self::Record) -> String;

    fn group_key<'r>(&self, record: &'r Self::Record) -> &'r str;

    fn branch_label(&self, record: &Self::Record) -> String;

    fn leaf_labels(&self, record: &Self::Record) -> Vec<String>;

    fn leaf_counting(&self) -> LeafCounting;
}

/// A finished view: the root node plus the leaf amount shown next to it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BuiltView {
    pub root: TreeNode,
    pub leaf_amount: usize,
}

/// Fold `records` into a tree according to `shape`.
///
/// Records are sorted by `sort_key` first and bucketed by `group_key` in
/// first-seen order, so group order and the order of branches within a group
/// both follow the sort.  Equal sort keys fall back to comparing the rendered
/// labels, which makes the output independent of the input order.
pub fn build_tree<S: TreeShape>(shape: &S, records: &[S::Record]) -> BuiltView {
    let mut sorted: Vec<(String, &S::Record)> =
        records.iter().map(|r| (shape.sort_key(r), r)).collect();
    sorted.sort_by(|(key_a, a), (key_b, b)| {
        key_a
            .cmp(key_b)
            .then_with(|| shape.branch_label(a).cmp(&shape.branch_label(b)))
            .then_with(|| shape.leaf_labels(a).cmp(&shape.leaf_labels(b)))
    });

    let mut groups: Vec<(&str, Vec<&S::Record>)> = Vec::new();
    let mut group_index: HashMap<&str, usize> = HashMap::new();
    for (_, record) in sorted {
        let key = shape.group_key(record);
        match group_index.get(key) {
            Some(&ix) => groups[ix].1.push(record),
            None => {
                group_index.insert(key, groups.len());
                groups.push((key, vec![record]));
            }
        }
    }

    let mut leaf_amount = 0;
    let mut root = TreeNode::new(shape.root_name());
    for (key, members) in groups {
        let mut group_node = TreeNode::new(key);
        for record in members {
            let leaves: Vec<TreeNode> = shape
                .leaf_labels(record)
                .into_iter()
                .map(TreeNode::new)
                .collect();
            if shape.leaf_counting() == LeafCounting::PerLeaf {
                leaf_amount += leaves.len();
            }
            group_node
                .children
                .push(TreeNode::with_children(shape.branch_label(record), leaves));
        }
        if shape.leaf_counting() == LeafCounting::PerGroup {
            leaf_amount += 1;
        }
        root.children.push(group_node);
    }

    BuiltView { root, leaf_amount }
}
