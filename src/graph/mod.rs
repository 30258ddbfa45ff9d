mod package;

pub use package::{Autoload, AutoloadKind, OneOrMany, Package, DEFAULT_PACKAGE_TYPE};

use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::Direction;
use std::collections::HashMap;
use tracing::{debug, trace};

/// The installed packages and their `requires` edges
///
/// Nodes are package names, an edge `a → b` means `a` requires `b`.
/// Requirements that name no installed package (`php`, `ext-*`, packages
/// that were never installed) get no edge.
#[derive(Debug, Default)]
pub struct PackageGraph {
    inner: DiGraph<String, ()>,

    /// Map from package name to node index
    node_map: HashMap<String, NodeIndex>,

    /// Packages in the order the host supplied them
    packages: Vec<Package>,
}

impl PackageGraph {
    /// Build the graph from the installed package list
    pub fn build(packages: Vec<Package>) -> Self {
        let mut graph = Self {
            inner: DiGraph::with_capacity(packages.len(), 0),
            node_map: HashMap::with_capacity(packages.len()),
            packages: Vec::with_capacity(packages.len()),
        };

        for package in packages {
            if graph.node_map.contains_key(&package.name) {
                debug!("Duplicate package entry {}, keeping the first", package.name);
                continue;
            }
            let idx = graph.inner.add_node(package.name.clone());
            graph.node_map.insert(package.name.clone(), idx);
            graph.packages.push(package);
        }

        for package in &graph.packages {
            let from = graph.node_map[&package.name];
            for required in &package.requires {
                match graph.node_map.get(required) {
                    Some(&to) if to != from => {
                        graph.inner.update_edge(from, to, ());
                    }
                    Some(_) => {}
                    None => trace!("{} requires {}, which is not installed", package.name, required),
                }
            }
        }

        debug!(
            "Package graph: {} packages, {} requires edges",
            graph.package_count(),
            graph.edge_count()
        );

        graph
    }

    /// Packages in input order
    pub fn packages(&self) -> &[Package] {
        &self.packages
    }

    pub fn get(&self, name: &str) -> Option<&Package> {
        self.node_map
            .get(name)
            .map(|idx| &self.packages[idx.index()])
    }

    pub fn contains(&self, name: &str) -> bool {
        self.node_map.contains_key(name)
    }

    pub fn package_count(&self) -> usize {
        self.packages.len()
    }

    pub fn edge_count(&self) -> usize {
        self.inner.edge_count()
    }

    /// Installed packages that `name` requires
    pub fn requirements_of(&self, name: &str) -> Vec<&str> {
        self.neighbors(name, Direction::Outgoing)
    }

    /// Installed packages that require `name`
    pub fn dependents_of(&self, name: &str) -> Vec<&str> {
        self.neighbors(name, Direction::Incoming)
    }

    fn neighbors(&self, name: &str, direction: Direction) -> Vec<&str> {
        let Some(&idx) = self.node_map.get(name) else {
            return Vec::new();
        };

        let mut names: Vec<&str> = self
            .inner
            .neighbors_directed(idx, direction)
            .filter_map(|n| self.inner.node_weight(n))
            .map(String::as_str)
            .collect();
        // petgraph yields neighbors newest edge first
        names.reverse();
        names
    }

    /// Get the underlying petgraph for traversals
    pub fn inner(&self) -> &DiGraph<String, ()> {
        &self.inner
    }

    /// Get node index for a package name
    pub fn node_index(&self, name: &str) -> Option<NodeIndex> {
        self.node_map.get(name).copied()
    }
}
