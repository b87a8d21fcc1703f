//! Bounded recursive expansion
//!
//! The resolver answers for one object at a time; the walker owns the
//! recursion. Breadth-first over a visited set, expanding both sides of
//! every relationship (what the root uses and what uses the root), with
//! a configurable ring cap and an optional node budget for very dense
//! schemas. Cycles terminate through the visited set.

use crate::catalog::Catalog;
use crate::graph::DependencyGraph;
use crate::key::ObjectKey;
use crate::object::ObjectDescriptor;
use crate::resolver::DependencyResolver;
use std::collections::{HashSet, VecDeque};

/// Limits for one expansion session.
#[derive(Debug, Clone)]
pub struct WalkOptions {
    /// How many discovery rings to expand away from the root
    pub max_depth: usize,
    /// Stop expanding once the graph holds this many objects
    pub node_budget: Option<usize>,
}

impl Default for WalkOptions {
    fn default() -> Self {
        Self {
            max_depth: 10,
            node_budget: None,
        }
    }
}

/// Builds a full dependency graph around a root object.
pub struct GraphWalker<'a> {
    resolver: DependencyResolver<'a>,
    options: WalkOptions,
}

impl<'a> GraphWalker<'a> {
    /// Create a walker with default limits
    pub fn new(catalog: &'a dyn Catalog) -> Self {
        Self::with_options(catalog, WalkOptions::default())
    }

    /// Create a walker with explicit limits
    pub fn with_options(catalog: &'a dyn Catalog, options: WalkOptions) -> Self {
        Self {
            resolver: DependencyResolver::new(catalog),
            options,
        }
    }

    /// Expand the dependency neighborhood of `root` into a graph.
    ///
    /// The root node is always present, even when nothing relates to it.
    /// Every object is expanded at most once; edges are stamped with the
    /// ring they were discovered in (the root's own relationships are
    /// ring 1).
    pub async fn walk(&self, root: ObjectDescriptor) -> DependencyGraph {
        let mut graph = DependencyGraph::new();
        let mut visited: HashSet<ObjectKey> = HashSet::new();
        let mut queue: VecDeque<(ObjectDescriptor, usize)> = VecDeque::new();

        graph.add_node(root.clone());
        queue.push_back((root, 0));

        while let Some((obj, ring)) = queue.pop_front() {
            if !visited.insert(obj.key.clone()) {
                continue;
            }
            if ring >= self.options.max_depth {
                continue;
            }
            if let Some(budget) = self.options.node_budget {
                if graph.node_count() >= budget {
                    tracing::debug!("Node budget {} reached, stopping expansion", budget);
                    break;
                }
            }

            let related = self.resolver.find_related(&obj).await;
            tracing::debug!(
                "Ring {}: {} has {} direct relationships",
                ring,
                obj.id(),
                related.len()
            );

            for relationship in related {
                let relationship = relationship.at_depth((ring + 1) as u32);
                graph.add_edge(&relationship);

                for next in [&relationship.source, &relationship.target] {
                    if !visited.contains(&next.key) {
                        queue.push_back((next.clone(), ring + 1));
                    }
                }
            }
        }

        graph
    }
}
