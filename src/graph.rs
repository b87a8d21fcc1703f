//! Dependency graph - in-memory representation of resolved relationships
//!
//! Edges are stored direction-resolved: an edge `X -> Y` always reads
//! "X depends on Y", regardless of which relationship kind produced it.
//! Node and edge iteration follow insertion order, so a graph built from
//! a deterministic resolution session renders identically every time.

use crate::key::ObjectKey;
use crate::object::{ObjectDescriptor, ObjectKind};
use crate::relation::{RelationKind, Relationship};
use serde::Serialize;
use std::collections::{HashMap, HashSet, VecDeque};

/// A direction-resolved edge: `from` depends on `to`.
///
/// `kind` records the relationship kind the edge arrived as; `depth` is
/// the discovery ring stamped during expansion.
#[derive(Debug, Clone, Serialize)]
pub struct GraphEdge {
    pub from: ObjectKey,
    pub to: ObjectKey,
    pub kind: RelationKind,
    pub depth: u32,
    pub description: Option<String>,
}

/// Everything the graph knows about one object.
#[derive(Debug, Clone, Serialize)]
pub struct ObjectDetails {
    pub kind: ObjectKind,
    pub definition: String,
    /// Objects that depend on this one
    pub incoming: Vec<ObjectKey>,
    /// Objects this one depends on
    pub outgoing: Vec<ObjectKey>,
}

/// In-memory dependency graph for building and querying object
/// relationships.
///
/// Built up by the walker during expansion and queried read-only
/// afterwards.
#[derive(Debug, Default)]
pub struct DependencyGraph {
    /// All objects indexed by their key
    nodes: HashMap<ObjectKey, ObjectDescriptor>,
    /// Node insertion order, for deterministic listing
    node_order: Vec<ObjectKey>,
    /// All edges in insertion order
    edges: Vec<GraphEdge>,
    /// Edges leaving an object (what it depends on)
    edges_from: HashMap<ObjectKey, Vec<GraphEdge>>,
    /// Edges arriving at an object (what depends on it)
    edges_to: HashMap<ObjectKey, Vec<GraphEdge>>,
    /// Resolved `(from, to)` pairs already present
    edge_seen: HashSet<(ObjectKey, ObjectKey)>,
}

impl DependencyGraph {
    /// Create a new empty dependency graph
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an object to the graph.
    ///
    /// Upserts never weaken: an existing node keeps its recorded kind,
    /// and a fetched definition is never replaced by an empty one. An
    /// empty definition may be filled in by a later, richer descriptor.
    pub fn add_node(&mut self, object: ObjectDescriptor) {
        match self.nodes.get_mut(&object.key) {
            Some(existing) => {
                if !existing.has_definition() && object.has_definition() {
                    existing.definition = object.definition;
                }
            }
            None => {
                self.node_order.push(object.key.clone());
                self.nodes.insert(object.key.clone(), object);
            }
        }
    }

    /// Add a relationship as a direction-resolved edge.
    ///
    /// Both endpoints are upserted as nodes. Self-loops are refused.
    /// Duplicate edges (same resolved `(from, to)` pair) are dropped, so
    /// `used_by(A, B)` and `depends_on(B, A)` end up as one edge while
    /// `depends_on(A, B)` and `used_by(A, B)` remain two opposite edges.
    /// Returns whether the edge was inserted.
    pub fn add_edge(&mut self, relationship: &Relationship) -> bool {
        if relationship.is_self_loop() {
            return false;
        }

        let (from, to) = relationship.resolved_endpoints();
        let (from, to) = (from.clone(), to.clone());
        self.add_node(from.clone());
        self.add_node(to.clone());

        self.insert_resolved(GraphEdge {
            from: from.key,
            to: to.key,
            kind: relationship.kind,
            depth: relationship.depth,
            description: relationship.description.clone(),
        })
    }

    /// Insert an already-resolved edge, deduplicating on its `(from, to)`
    /// pair. First arrival wins.
    fn insert_resolved(&mut self, edge: GraphEdge) -> bool {
        if !self
            .edge_seen
            .insert((edge.from.clone(), edge.to.clone()))
        {
            return false;
        }

        self.edges_from
            .entry(edge.from.clone())
            .or_default()
            .push(edge.clone());
        self.edges_to
            .entry(edge.to.clone())
            .or_default()
            .push(edge.clone());
        self.edges.push(edge);
        true
    }

    /// Get an object by its key
    pub fn node(&self, key: &ObjectKey) -> Option<&ObjectDescriptor> {
        self.nodes.get(key)
    }

    /// Whether the graph holds this key
    pub fn contains(&self, key: &ObjectKey) -> bool {
        self.nodes.contains_key(key)
    }

    /// Number of objects
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Number of edges
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// All objects in insertion order
    pub fn nodes(&self) -> impl Iterator<Item = &ObjectDescriptor> {
        self.node_order.iter().filter_map(|key| self.nodes.get(key))
    }

    /// All edges in insertion order
    pub fn edges(&self) -> &[GraphEdge] {
        &self.edges
    }

    /// Edges leaving an object (what it depends on)
    pub fn edges_from(&self, key: &ObjectKey) -> &[GraphEdge] {
        self.edges_from.get(key).map(|v| v.as_slice()).unwrap_or(&[])
    }

    /// Edges arriving at an object (what depends on it)
    pub fn edges_to(&self, key: &ObjectKey) -> &[GraphEdge] {
        self.edges_to.get(key).map(|v| v.as_slice()).unwrap_or(&[])
    }

    /// The induced subgraph within `radius` hops of a key, following
    /// edges in both directions.
    ///
    /// Radius 0 yields the single node with no edges. An absent key
    /// yields an empty graph. Every edge whose endpoints both survive
    /// the cut is carried over.
    pub fn neighborhood(&self, key: &ObjectKey, radius: usize) -> DependencyGraph {
        let mut result = DependencyGraph::new();
        let Some(center) = self.nodes.get(key) else {
            return result;
        };

        let mut visited = HashSet::new();
        let mut queue = VecDeque::new();
        visited.insert(key.clone());
        queue.push_back((key.clone(), 0usize));
        result.add_node(center.clone());

        while let Some((current, hops)) = queue.pop_front() {
            if hops == radius {
                continue;
            }

            let outgoing = self.edges_from(&current).iter();
            let incoming = self.edges_to(&current).iter();
            for edge in outgoing.chain(incoming) {
                for next in [&edge.from, &edge.to] {
                    if visited.insert(next.clone()) {
                        if let Some(node) = self.nodes.get(next) {
                            result.add_node(node.clone());
                        }
                        queue.push_back((next.clone(), hops + 1));
                    }
                }
            }
        }

        for edge in &self.edges {
            if result.contains(&edge.from) && result.contains(&edge.to) {
                result.insert_resolved(edge.clone());
            }
        }

        result
    }

    /// Kind, definition and direct neighbors of one object
    pub fn details(&self, key: &ObjectKey) -> Option<ObjectDetails> {
        let node = self.nodes.get(key)?;
        Some(ObjectDetails {
            kind: node.kind,
            definition: node.definition.clone(),
            incoming: self.edges_to(key).iter().map(|e| e.from.clone()).collect(),
            outgoing: self.edges_from(key).iter().map(|e| e.to.clone()).collect(),
        })
    }

    /// Get statistics about the graph
    pub fn stats(&self) -> GraphStats {
        let mut by_kind = Vec::new();
        for kind in ObjectKind::all() {
            let count = self.nodes.values().filter(|n| n.kind == *kind).count();
            if count > 0 {
                by_kind.push((*kind, count));
            }
        }

        GraphStats {
            nodes: self.nodes.len(),
            edges: self.edges.len(),
            by_kind,
        }
    }

    /// Render the graph in the wire format, flagging `central` as the
    /// object the graph was built around.
    pub fn payload(&self, central: &ObjectKey) -> GraphPayload {
        let nodes = self
            .nodes()
            .map(|node| GraphNodePayload {
                id: node.id(),
                name: node.name().to_string(),
                schema: node.schema().to_string(),
                kind: node.kind,
                is_central: node.key == *central,
            })
            .collect();

        let links = self
            .edges
            .iter()
            .map(|edge| GraphLinkPayload {
                source: edge.from.id(),
                target: edge.to.id(),
                kind: edge.kind,
                depth: edge.depth,
            })
            .collect();

        GraphPayload { nodes, links }
    }
}

/// One node in the wire format
#[derive(Debug, Clone, Serialize)]
pub struct GraphNodePayload {
    pub id: String,
    pub name: String,
    pub schema: String,
    #[serde(rename = "type")]
    pub kind: ObjectKind,
    #[serde(rename = "isCentral")]
    pub is_central: bool,
}

/// One link in the wire format; direction already resolved
#[derive(Debug, Clone, Serialize)]
pub struct GraphLinkPayload {
    pub source: String,
    pub target: String,
    #[serde(rename = "type")]
    pub kind: RelationKind,
    pub depth: u32,
}

/// The wire format served to graph consumers
#[derive(Debug, Clone, Serialize)]
pub struct GraphPayload {
    pub nodes: Vec<GraphNodePayload>,
    pub links: Vec<GraphLinkPayload>,
}

/// Statistics about a dependency graph
#[derive(Debug, Clone)]
pub struct GraphStats {
    pub nodes: usize,
    pub edges: usize,
    pub by_kind: Vec<(ObjectKind, usize)>,
}

impl std::fmt::Display for GraphStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Dependency Graph Statistics:")?;
        writeln!(f, "  Objects: {}", self.nodes)?;
        write!(f, "  Edges: {}", self.edges)?;
        for (kind, count) in &self.by_kind {
            write!(f, "\n    {}: {}", kind, count)?;
        }
        Ok(())
    }
}
