// Dependency-aware classification of installed packages

use super::matcher::NamespaceMatcher;
use super::usage::UsageSet;
use super::Classification;
use crate::config::Config;
use crate::graph::PackageGraph;
use petgraph::graph::NodeIndex;
use petgraph::Direction;
use serde::Serialize;
use std::collections::{HashMap, VecDeque};
use tracing::{debug, trace};

/// Classification of one package, with the evidence behind it
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PackageVerdict {
    pub name: String,
    pub classification: Classification,

    /// The used name that matched one of the package's prefixes
    #[serde(skip_serializing_if = "Option::is_none")]
    pub matched: Option<String>,

    /// The protected package whose requirement (or dependency) kept this one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub protected_by: Option<String>,
}

/// Result of one classification pass, in input order
#[derive(Debug, Clone, Default, Serialize)]
pub struct Classifications {
    pub verdicts: Vec<PackageVerdict>,

    /// Packages that autoload only through a classmap and so can never be
    /// matched by name
    pub classmap_only: Vec<String>,
}

impl Classifications {
    pub fn get(&self, name: &str) -> Option<&PackageVerdict> {
        self.verdicts.iter().find(|v| v.name == name)
    }

    pub fn classification_of(&self, name: &str) -> Option<Classification> {
        self.get(name).map(|v| v.classification)
    }

    /// Names with the given classification, in input order
    pub fn names(&self, classification: Classification) -> Vec<&str> {
        self.verdicts
            .iter()
            .filter(|v| v.classification == classification)
            .map(|v| v.name.as_str())
            .collect()
    }

    pub fn used(&self) -> Vec<&str> {
        self.names(Classification::Used)
    }

    pub fn excluded(&self) -> Vec<&str> {
        self.names(Classification::Excluded)
    }

    pub fn protected_by_dependency(&self) -> Vec<&str> {
        self.names(Classification::ProtectedByDependency)
    }

    /// Installed minus protected, in input order
    pub fn unused(&self) -> Vec<&str> {
        self.names(Classification::Unused)
    }
}

/// Computes used, excluded, protected and unused packages
pub struct ClosureEngine<'a> {
    config: &'a Config,
    matcher: NamespaceMatcher,
}

impl<'a> ClosureEngine<'a> {
    pub fn new(config: &'a Config) -> Self {
        Self {
            config,
            matcher: NamespaceMatcher::new(config.namespace_matching),
        }
    }

    /// Classify every package of the graph. Never fails.
    pub fn classify(&self, usage: &UsageSet, graph: &PackageGraph) -> Classifications {
        let mut verdicts: Vec<PackageVerdict> = Vec::with_capacity(graph.package_count());
        let mut classmap_only = Vec::new();

        // Steps 1 and 2: direct usage and exclusion; exclusion wins
        for package in graph.packages() {
            let excluded = self.config.is_excluded_name(&package.name)
                || self.config.is_excluded_type(&package.package_type);
            let matched = self
                .matcher
                .find_match(package, usage)
                .map(|(_, name)| name.to_string());

            let classification = if excluded {
                Classification::Excluded
            } else if matched.is_some() {
                Classification::Used
            } else {
                Classification::Unused
            };

            if let Some(name) = &matched {
                trace!("{} is used through {}", package.name, name);
            }
            if package.autoload.is_classmap_only() {
                classmap_only.push(package.name.clone());
            }

            verdicts.push(PackageVerdict {
                name: package.name.clone(),
                classification,
                matched,
                protected_by: None,
            });
        }

        // Step 3: dependency closure
        let pulled_in = self.close_over_dependencies(graph, &verdicts);
        for verdict in &mut verdicts {
            if let Some(by) = pulled_in.get(verdict.name.as_str()) {
                verdict.classification = Classification::ProtectedByDependency;
                verdict.protected_by = Some((*by).to_string());
            }
        }

        let result = Classifications {
            verdicts,
            classmap_only,
        };

        debug!(
            "Classified {} packages: {} used, {} excluded, {} protected by dependency, {} unused",
            result.verdicts.len(),
            result.used().len(),
            result.excluded().len(),
            result.protected_by_dependency().len(),
            result.unused().len()
        );

        result
    }

    /// Breadth-first from every used or excluded package. Returns each newly
    /// protected package with the package that reached it first.
    fn close_over_dependencies<'g>(
        &self,
        graph: &'g PackageGraph,
        verdicts: &[PackageVerdict],
    ) -> HashMap<&'g str, &'g str> {
        let inner = graph.inner();
        let mut protected = vec![false; inner.node_count()];
        let mut worklist: VecDeque<NodeIndex> = VecDeque::new();

        for verdict in verdicts {
            if verdict.classification == Classification::Unused {
                continue;
            }
            if let Some(idx) = graph.node_index(&verdict.name) {
                protected[idx.index()] = true;
                worklist.push_back(idx);
            }
        }

        let mut directions = vec![Direction::Outgoing];
        if self.config.protect_dependents {
            directions.push(Direction::Incoming);
        }

        let mut pulled_in = HashMap::new();

        while let Some(idx) = worklist.pop_front() {
            for &direction in &directions {
                // neighbors come newest edge first; reverse for requires order
                let mut neighbors: Vec<NodeIndex> = inner.neighbors_directed(idx, direction).collect();
                neighbors.reverse();

                for next in neighbors {
                    if protected[next.index()] {
                        continue;
                    }
                    protected[next.index()] = true;
                    worklist.push_back(next);

                    if let (Some(name), Some(by)) = (inner.node_weight(next), inner.node_weight(idx)) {
                        trace!("{} protected by {}", name, by);
                        pulled_in.insert(name.as_str(), by.as_str());
                    }
                }
            }
        }

        pulled_in
    }
}
