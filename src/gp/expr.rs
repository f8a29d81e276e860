//! Items related to expressions.

use crate::error::Error;
use crate::gp::{ops, rpn, validate};
use fnv::FnvHashSet;
use log::debug;
use petgraph::visit::EdgeRef;
use petgraph::{self, Incoming, Outgoing};
use std::borrow::Cow;
use std::collections::VecDeque;
use std::fmt;
use std::mem;

/// The argument position of a child within its parent's operand list.
pub type Arg = u32;

/// The directed graph type used to represent an expression.
///
/// Each node within the graph is either a `Function`, a `Number` or a `Variable`. `Function`s
/// are branch nodes whose operands are stored on `Incoming` edges, weighted by the operand's
/// position. Every other node has exactly one `Outgoing` edge leading to its parent.
pub type DiGraph = petgraph::graph::DiGraph<Node, Arg, u32>;

/// The node index type used within the expr DiGraph type.
pub type NodeIndex = petgraph::graph::NodeIndex<u32>;

/// The three kinds of node.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Kind {
    Function,
    Number,
    Variable,
}

/// The label carried by a node.
///
/// Function labels are operator symbols, numbers carry their value and variables their name.
/// Mutation may assign either form of label to a leaf without changing its `Kind`.
#[derive(Clone, Debug, PartialEq)]
pub enum Label {
    Symbol(String),
    Value(f64),
}

/// A single node within an expression tree.
#[derive(Clone, Debug, PartialEq)]
pub struct Node {
    pub kind: Kind,
    pub label: Label,
}

/// An expression tree.
///
/// The root is always stored at node index `0` and every node in the graph is reachable from
/// it.
#[derive(Clone, Debug)]
pub struct Expr {
    graph: DiGraph,
}

/// Input to operations that accept either a tree or its RPN text.
#[derive(Copy, Clone, Debug)]
pub enum Source<'a> {
    Rpn(&'a str),
    Tree(&'a Expr),
}

/// A breadth-first walk over an expression yielding each node alongside its parent.
pub struct Bfs<'a> {
    expr: &'a Expr,
    queue: VecDeque<(NodeIndex, Option<NodeIndex>)>,
}

// Impls.

impl Label {
    /// The numeric value of the label.
    ///
    /// Symbols are interpreted as numeric literals where possible.
    pub fn value(&self) -> Option<f64> {
        match *self {
            Label::Value(v) => Some(v),
            Label::Symbol(ref s) => rpn::parse_literal(s),
        }
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            Label::Symbol(ref s) => write!(f, "{}", s),
            Label::Value(v) => write!(f, "{}", v),
        }
    }
}

impl Node {
    /// A function node applying the given operator.
    pub fn function(op: &ops::Operator) -> Self {
        Node { kind: Kind::Function, label: Label::Symbol(op.symbol.to_string()) }
    }

    /// A numeric constant.
    pub fn number(value: f64) -> Self {
        Node { kind: Kind::Number, label: Label::Value(value) }
    }

    /// A named variable.
    pub fn variable<S>(name: S) -> Self
    where
        S: Into<String>,
    {
        Node { kind: Kind::Variable, label: Label::Symbol(name.into()) }
    }

    /// The operator for function nodes.
    pub fn operator(&self) -> Result<&'static ops::Operator, Error> {
        match self.label {
            Label::Symbol(ref s) => ops::lookup(s),
            Label::Value(v) => Err(Error::UnknownOperator(v.to_string())),
        }
    }
}

impl Expr {
    /// A tree consisting of a single node.
    pub fn leaf(node: Node) -> Self {
        let mut graph = DiGraph::default();
        graph.add_node(node);
        Expr { graph }
    }

    /// Parse a tree from whitespace delimited RPN text.
    pub fn from_rpn(rpn: &str) -> Result<Self, Error> {
        rpn::parse(rpn)
    }

    /// Adopt an externally built graph rooted at `root`.
    ///
    /// The graph must satisfy all tree invariants, see `validate::is_graph_expression_tree`.
    pub fn from_graph(graph: &DiGraph, root: NodeIndex) -> Result<Self, Error> {
        validate::check_graph(graph, root)?;
        Ok(clone_subtree(graph, root))
    }

    /// The index of the root node.
    pub fn root(&self) -> NodeIndex {
        NodeIndex::new(0)
    }

    /// The underlying graph.
    pub fn graph(&self) -> &DiGraph {
        &self.graph
    }

    /// Consume the tree, producing its graph. The root is at index `0`.
    pub fn into_graph(self) -> DiGraph {
        self.graph
    }

    /// The number of nodes in the tree.
    pub fn len(&self) -> usize {
        self.graph.node_count()
    }

    /// The number of levels in the tree. A single node has depth `1`.
    pub fn depth(&self) -> usize {
        let mut depth = 0;
        let mut curr = vec![self.root()];
        let mut next = vec![];
        while !curr.is_empty() {
            depth += 1;
            for a in curr.drain(..) {
                next.extend(self.children(a));
            }
            mem::swap(&mut curr, &mut next);
        }
        depth
    }

    /// The node at the given index.
    pub fn node(&self, nx: NodeIndex) -> &Node {
        &self.graph[nx]
    }

    /// Mutable access to the node at the given index.
    ///
    /// Changing the label of a function to an operator of different arity breaks the tree.
    pub fn node_mut(&mut self, nx: NodeIndex) -> &mut Node {
        &mut self.graph[nx]
    }

    /// The parent of the given node, `None` for the root.
    pub fn parent(&self, nx: NodeIndex) -> Option<NodeIndex> {
        self.graph.edges_directed(nx, Outgoing).next().map(|e| e.target())
    }

    /// The parent of the given node along with the node's operand position within it.
    pub fn parent_slot(&self, nx: NodeIndex) -> Option<(NodeIndex, Arg)> {
        self.graph.edges_directed(nx, Outgoing).next().map(|e| (e.target(), *e.weight()))
    }

    /// The operands of the given node in left-to-right order.
    pub fn children(&self, nx: NodeIndex) -> Vec<NodeIndex> {
        children(&self.graph, nx)
    }

    /// Whether `ancestor` is `nx` itself or lies on the path from `nx` up to the root.
    pub fn is_ancestor(&self, nx: NodeIndex, ancestor: NodeIndex) -> bool {
        let mut curr = Some(nx);
        while let Some(a) = curr {
            if a == ancestor {
                return true;
            }
            curr = self.parent(a);
        }
        false
    }

    /// Walk the tree breadth-first from the root.
    pub fn bfs(&self) -> Bfs {
        let mut queue = VecDeque::with_capacity(self.len());
        queue.push_back((self.root(), None));
        Bfs { expr: self, queue }
    }

    /// Clone the subtree rooted at the given node into a new, independent tree.
    pub fn clone_subtree(&self, subtree_root: NodeIndex) -> Expr {
        clone_subtree(&self.graph, subtree_root)
    }

    /// Replace the subtree rooted at `nx` with a copy of `subtree`.
    ///
    /// The copy takes the operand position previously held by `nx`. The replaced nodes are
    /// detached from the tree and dropped.
    pub fn replace_subtree(&mut self, nx: NodeIndex, subtree: &Expr) {
        let (parent, arg) = match self.parent_slot(nx) {
            Some(slot) => slot,
            None => {
                *self = subtree.clone_subtree(subtree.root());
                return;
            }
        };

        // Sever the old subtree first.
        if let Some(e) = self.graph.find_edge(nx, parent) {
            self.graph.remove_edge(e);
        }

        // Append the new subtree's nodes and edges.
        let offset = self.graph.node_count();
        for n in subtree.graph.node_indices() {
            self.graph.add_node(subtree.graph[n].clone());
        }
        for e in subtree.graph.raw_edges() {
            let a = NodeIndex::new(e.source().index() + offset);
            let b = NodeIndex::new(e.target().index() + offset);
            self.graph.add_edge(a, b, e.weight);
        }
        self.graph.add_edge(NodeIndex::new(offset), parent, arg);

        self.compact();
    }

    /// Exchange the positions of two non-root nodes and their subtrees.
    ///
    /// Neither node may be an ancestor of the other. Node indices remain stable.
    pub fn swap_subtrees(&mut self, a: NodeIndex, b: NodeIndex) {
        let (pa, ia) = match self.parent_slot(a) {
            Some(slot) => slot,
            None => return,
        };
        let (pb, ib) = match self.parent_slot(b) {
            Some(slot) => slot,
            None => return,
        };

        // Edge removal may shift edge indices, so look each edge up right before removing it.
        if let Some(e) = self.graph.find_edge(a, pa) {
            self.graph.remove_edge(e);
        }
        if let Some(e) = self.graph.find_edge(b, pb) {
            self.graph.remove_edge(e);
        }
        self.graph.add_edge(a, pb, ib);
        self.graph.add_edge(b, pa, ia);
    }

    /// Remove the outgoing edges of the operands of `nx`, detaching them from the tree.
    ///
    /// Detached nodes remain in the graph until `compact` is called.
    pub(crate) fn sever_children(&mut self, nx: NodeIndex) {
        for child in self.children(nx) {
            if let Some(e) = self.graph.find_edge(child, nx) {
                self.graph.remove_edge(e);
            }
        }
    }

    /// Drop every node that is no longer reachable from the root.
    ///
    /// Node order is preserved so the root remains at index `0`.
    pub(crate) fn compact(&mut self) {
        let keep = self.bfs().map(|(nx, _)| nx).collect::<FnvHashSet<_>>();
        if keep.len() == self.graph.node_count() {
            return;
        }
        self.graph = self.graph.filter_map(
            |nx, nw| if keep.contains(&nx) { Some(nw.clone()) } else { None },
            |_, ew| Some(*ew),
        );
    }

    /// Serialize the tree to RPN text.
    pub fn to_rpn(&self) -> String {
        rpn::serialize(self)
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.to_rpn())
    }
}

impl<'a> Source<'a> {
    /// Borrow the tree, parsing it first if given as text.
    pub fn expr(self) -> Result<Cow<'a, Expr>, Error> {
        match self {
            Source::Rpn(rpn) => Expr::from_rpn(rpn).map(Cow::Owned),
            Source::Tree(expr) => Ok(Cow::Borrowed(expr)),
        }
    }

    /// An independent tree, either parsed or deep-copied.
    pub fn to_expr(self) -> Result<Expr, Error> {
        match self {
            Source::Rpn(rpn) => Expr::from_rpn(rpn),
            Source::Tree(expr) => Ok(expr.clone_subtree(expr.root())),
        }
    }
}

impl<'a> From<&'a str> for Source<'a> {
    fn from(rpn: &'a str) -> Self {
        Source::Rpn(rpn)
    }
}

impl<'a> From<&'a String> for Source<'a> {
    fn from(rpn: &'a String) -> Self {
        Source::Rpn(rpn)
    }
}

impl<'a> From<&'a Expr> for Source<'a> {
    fn from(expr: &'a Expr) -> Self {
        Source::Tree(expr)
    }
}

impl<'a> From<&'a mut Expr> for Source<'a> {
    fn from(expr: &'a mut Expr) -> Self {
        Source::Tree(expr)
    }
}

impl<'a> Iterator for Bfs<'a> {
    type Item = (NodeIndex, Option<NodeIndex>);
    fn next(&mut self) -> Option<Self::Item> {
        let (nx, parent) = self.queue.pop_front()?;
        for child in self.expr.children(nx) {
            self.queue.push_back((child, Some(nx)));
        }
        Some((nx, parent))
    }
}

// fns

/// The operands of `nx` within `graph`, ordered by their argument position.
pub fn children(graph: &DiGraph, nx: NodeIndex) -> Vec<NodeIndex> {
    let mut edges = graph
        .edges_directed(nx, Incoming)
        .map(|e| (*e.weight(), e.source()))
        .collect::<Vec<_>>();
    edges.sort_by_key(|&(arg, _)| arg);
    edges.into_iter().map(|(_, child)| child).collect()
}

/// Deep-copy a tree, or parse a fresh one from RPN text.
///
/// The copy shares no nodes with the original.
pub fn copy<'a, S>(source: S) -> Result<Expr, Error>
where
    S: Into<Source<'a>>,
{
    let source = source.into();
    source.to_expr().map_err(|err| {
        debug!("failed to copy {:?}: {}", source, err);
        err
    })
}

/// Clone the subtree whose root is at the given node into a new tree.
///
/// Nodes are added in breadth-first order so the subtree root lands at index `0`.
pub fn clone_subtree(tree: &DiGraph, subtree_root: NodeIndex) -> Expr {
    let mut graph = DiGraph::with_capacity(tree.node_count(), tree.edge_count());

    // Add the root without adding any outgoing edges.
    let root = graph.add_node(tree[subtree_root].clone());

    // For all others, add both nodes and their edges into their parent.
    let mut curr = vec![(subtree_root, root)];
    let mut next = vec![];
    while !curr.is_empty() {
        for (a_old, a_new) in curr.drain(..) {
            for (arg, b_old) in children(tree, a_old).into_iter().enumerate() {
                let b_new = graph.add_node(tree[b_old].clone());
                graph.add_edge(b_new, a_new, arg as Arg);
                next.push((b_old, b_new));
            }
        }
        mem::swap(&mut curr, &mut next);
    }

    Expr { graph }
}
