use petgraph::visit::EdgeRef;
use petgraph::{algo, graph::NodeIndex, Directed, Direction, Graph};
use serde::Serialize;
use std::collections::HashMap;
use std::path::PathBuf;

use super::module::{Module, ModuleMap};

/// A resolved reference to a locally discovered dependency.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DependencyRef {
    pub name: String,
    pub path: PathBuf,
}

/// A module together with the local modules it depends on.
///
/// Only built for modules with at least one local dependency.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DependencyLink {
    pub name: String,
    pub path: PathBuf,
    pub is_skippable: bool,
    pub dependencies: Vec<DependencyRef>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Node {
    pub name: String,
    pub path: PathBuf,
    pub is_skippable: bool,
}

impl From<&Module> for Node {
    fn from(module: &Module) -> Self {
        Self {
            name: module.name.clone(),
            path: module.path.clone(),
            is_skippable: module.is_skippable,
        }
    }
}

/// Edge weight: position of the dependency in the dependent's declaration list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Edge {
    pub position: usize,
}

/// Directed graph, dependent -> dependency.
pub type DependencyGraph = Graph<Node, Edge, Directed>;

pub struct GraphBuilder {
    graph: DependencyGraph,
    node_map: HashMap<String, NodeIndex>,
}

impl GraphBuilder {
    pub fn new() -> Self {
        Self {
            graph: Graph::new(),
            node_map: HashMap::new(),
        }
    }

    /// Adds every module as a node, then an edge for each declared
    /// dependency that names another discovered module.
    pub fn from_modules(modules: &ModuleMap) -> Self {
        let mut builder = Self::new();
        for module in modules {
            builder.add_node(Node::from(module));
        }
        for module in modules {
            for (position, dependency) in module.dependency_names.iter().enumerate() {
                builder.add_edge(&module.name, dependency, Edge { position });
            }
        }
        builder
    }

    pub fn add_node(&mut self, node: Node) -> NodeIndex {
        let name = node.name.clone();
        let index = self.graph.add_node(node);
        self.node_map.insert(name, index);
        index
    }

    /// Returns `None` when either end is not a local module.
    pub fn add_edge(
        &mut self,
        dependent: &str,
        dependency: &str,
        edge: Edge,
    ) -> Option<petgraph::graph::EdgeIndex> {
        let source_idx = self.node_map.get(dependent)?;
        let target_idx = self.node_map.get(dependency)?;
        Some(self.graph.add_edge(*source_idx, *target_idx, edge))
    }

    pub fn has_cycles(&self) -> bool {
        algo::is_cyclic_directed(&self.graph)
    }

    /// One link per module with local dependencies, in registration order.
    /// Dependencies keep the dependent's declaration order.
    pub fn links(&self) -> Vec<DependencyLink> {
        self.graph
            .node_indices()
            .filter_map(|idx| {
                let node = &self.graph[idx];
                let mut edges: Vec<_> = self
                    .graph
                    .edges_directed(idx, Direction::Outgoing)
                    .map(|edge| (edge.weight().position, edge.target()))
                    .collect();
                if edges.is_empty() {
                    return None;
                }
                edges.sort_by_key(|(position, _)| *position);

                let dependencies = edges
                    .into_iter()
                    .map(|(_, target)| {
                        let dependency = &self.graph[target];
                        DependencyRef {
                            name: dependency.name.clone(),
                            path: dependency.path.clone(),
                        }
                    })
                    .collect();

                Some(DependencyLink {
                    name: node.name.clone(),
                    path: node.path.clone(),
                    is_skippable: node.is_skippable,
                    dependencies,
                })
            })
            .collect()
    }
}

impl Default for GraphBuilder {
    fn default() -> Self {
        Self::new()
    }
}
