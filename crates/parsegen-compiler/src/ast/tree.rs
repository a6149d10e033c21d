//! Arena storage for AST nodes.

use indexmap::IndexMap;

use super::NodeKind;

/// Handle to a node in a [`Tree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u32);

impl NodeId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// The token a node originated from: enough to report locations and to
/// recover names and literal text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SrcToken {
    pub text: String,
    pub line: u32,
    pub col: u32,
}

impl SrcToken {
    pub fn new(text: impl Into<String>, line: u32, col: u32) -> Self {
        Self {
            text: text.into(),
            line,
            col,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    pub kind: NodeKind,
    pub token: SrcToken,
    pub children: Vec<NodeId>,
    pub parent: Option<NodeId>,
    /// `<k=v>` element options or rule/grammar `options {}` entries.
    pub options: Option<IndexMap<String, String>>,
    /// Filled by the ATN factory for nodes that map to a state.
    pub atn_state: Option<parsegen_core::StateId>,
}

/// Arena of AST nodes. All structural edits go through the tree so parent
/// links can be maintained (or restored wholesale with `refresh_parents`).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Tree {
    nodes: Vec<Node>,
}

impl Tree {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, kind: NodeKind, token: SrcToken) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(Node {
            kind,
            token,
            children: Vec::new(),
            parent: None,
            options: None,
            atn_state: None,
        });
        id
    }

    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.index()]
    }

    pub fn node_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.nodes[id.index()]
    }

    pub fn kind(&self, id: NodeId) -> &NodeKind {
        &self.node(id).kind
    }

    /// Token text of the node.
    pub fn text(&self, id: NodeId) -> &str {
        &self.node(id).token.text
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.node(id).children
    }

    pub fn child(&self, id: NodeId, i: usize) -> NodeId {
        self.node(id).children[i]
    }

    pub fn add_child(&mut self, parent: NodeId, child: NodeId) {
        self.node_mut(parent).children.push(child);
        self.node_mut(child).parent = Some(parent);
    }

    pub fn insert_child(&mut self, parent: NodeId, at: usize, child: NodeId) {
        self.node_mut(parent).children.insert(at, child);
        self.node_mut(child).parent = Some(parent);
    }

    /// Detach and return the `at`-th child.
    pub fn remove_child(&mut self, parent: NodeId, at: usize) -> NodeId {
        let child = self.node_mut(parent).children.remove(at);
        self.node_mut(child).parent = None;
        child
    }

    /// Replace the `at`-th child, returning the old one.
    pub fn replace_child(&mut self, parent: NodeId, at: usize, new: NodeId) -> NodeId {
        let old = self.node(parent).children[at];
        self.node_mut(parent).children[at] = new;
        self.node_mut(new).parent = Some(parent);
        self.node_mut(old).parent = None;
        old
    }

    /// Position of `child` among its parent's children.
    pub fn child_index(&self, child: NodeId) -> Option<usize> {
        let parent = self.node(child).parent?;
        self.children(parent).iter().position(|&c| c == child)
    }

    pub fn set_option(&mut self, id: NodeId, key: &str, value: &str) {
        self.node_mut(id)
            .options
            .get_or_insert_with(IndexMap::new)
            .insert(key.to_string(), value.to_string());
    }

    pub fn option(&self, id: NodeId, key: &str) -> Option<&str> {
        self.node(id)
            .options
            .as_ref()
            .and_then(|m| m.get(key))
            .map(String::as_str)
    }

    /// Option lookup that climbs ancestors, so rule- and grammar-level
    /// options shadow correctly.
    pub fn option_in_scope(&self, id: NodeId, key: &str) -> Option<&str> {
        let mut cur = Some(id);
        while let Some(n) = cur {
            if let Some(v) = self.option(n, key) {
                return Some(v);
            }
            cur = self.node(n).parent;
        }
        None
    }

    /// Preorder traversal from `root`.
    pub fn descendants(&self, root: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack = vec![root];
        while let Some(id) = stack.pop() {
            out.push(id);
            // Push in reverse so children come out in order.
            for &c in self.children(id).iter().rev() {
                stack.push(c);
            }
        }
        out
    }

    /// Preorder descendants whose kind satisfies `pred`.
    pub fn find_all(&self, root: NodeId, pred: impl Fn(&NodeKind) -> bool) -> Vec<NodeId> {
        self.descendants(root)
            .into_iter()
            .filter(|&id| pred(self.kind(id)))
            .collect()
    }

    /// Nearest ancestor (excluding `id` itself) satisfying `pred`.
    pub fn ancestor(&self, id: NodeId, pred: impl Fn(&NodeKind) -> bool) -> Option<NodeId> {
        let mut cur = self.node(id).parent;
        while let Some(n) = cur {
            if pred(self.kind(n)) {
                return Some(n);
            }
            cur = self.node(n).parent;
        }
        None
    }

    /// Deep-copy a subtree from another arena into this one.
    pub fn import_subtree(&mut self, src: &Tree, src_id: NodeId) -> NodeId {
        let src_node = src.node(src_id);
        let new = self.add(src_node.kind.clone(), src_node.token.clone());
        self.node_mut(new).options = src_node.options.clone();
        for &c in &src_node.children {
            let copied = self.import_subtree(src, c);
            self.add_child(new, copied);
        }
        new
    }

    /// Recompute every parent link under `root`.
    ///
    /// Structural edits that bypass the child accessors (or splice whole
    /// subtrees) call this once at the end instead of patching incrementally.
    pub fn refresh_parents(&mut self, root: NodeId) {
        self.node_mut(root).parent = None;
        let mut stack = vec![root];
        while let Some(id) = stack.pop() {
            let children = self.node(id).children.clone();
            for c in children {
                self.node_mut(c).parent = Some(id);
                stack.push(c);
            }
        }
    }

    /// Verify the parent/child invariant for every node reachable from `root`.
    pub fn check_parents(&self, root: NodeId) -> bool {
        self.descendants(root).iter().all(|&id| {
            self.children(id).iter().all(|&c| {
                self.node(c).parent == Some(id)
                    && self.child_index(c).map(|i| self.child(id, i)) == Some(c)
            })
        })
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}
