//! Dependency graph over dashboard variables.
//!
//! Each variable is a node; a query variable has an edge to every variable
//! its template references. The graph provides cycle detection and the load
//! order a session uses on start-up, dependencies before dependents.

use petgraph::Direction;
use petgraph::algo::toposort;
use petgraph::graph::{DiGraph, NodeIndex};
use std::collections::{BTreeMap, HashMap, HashSet};

use crate::core::DashvarError;
use crate::variable::VariableSet;

/// Color states for cycle detection using DFS.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Color {
    /// Node has not been visited.
    White,
    /// Node is currently being visited (in the DFS stack).
    Gray,
    /// Node has been fully visited.
    Black,
}

/// Graph of "references" edges between variables, keyed by name.
#[derive(Debug, Default)]
pub struct DependencyGraph {
    graph: DiGraph<String, ()>,
    node_map: HashMap<String, NodeIndex>,
    /// References to names that are not declared, per referencing variable
    unresolved: BTreeMap<String, Vec<String>>,
}

impl DependencyGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds the graph for every variable in `variables`.
    ///
    /// References to undeclared names do not become edges; they render as
    /// empty values and are reported through [`unresolved`](Self::unresolved).
    pub fn from_variables(variables: &VariableSet) -> Self {
        let mut graph = Self::new();
        for variable in variables {
            graph.ensure_node(&variable.name);
        }
        for variable in variables {
            for dependency in variable.dependencies() {
                if variables.contains(&dependency) {
                    graph.add_dependency(&variable.name, &dependency);
                } else {
                    graph.unresolved.entry(variable.name.clone()).or_default().push(dependency);
                }
            }
        }
        graph
    }

    fn ensure_node(&mut self, name: &str) -> NodeIndex {
        if let Some(&index) = self.node_map.get(name) {
            index
        } else {
            let index = self.graph.add_node(name.to_string());
            self.node_map.insert(name.to_string(), index);
            index
        }
    }

    /// Records that `from` references `to`, so `to` must load first.
    pub fn add_dependency(&mut self, from: &str, to: &str) {
        let from_idx = self.ensure_node(from);
        let to_idx = self.ensure_node(to);

        if !self.graph.contains_edge(from_idx, to_idx) {
            self.graph.add_edge(from_idx, to_idx, ());
        }
    }

    /// Detect cycles using DFS with colors.
    ///
    /// # Errors
    ///
    /// Returns [`DashvarError::CircularDependency`] naming the cycle, e.g.
    /// `a → b → a`.
    pub fn detect_cycles(&self) -> Result<(), DashvarError> {
        let mut colors: HashMap<NodeIndex, Color> =
            self.graph.node_indices().map(|node| (node, Color::White)).collect();
        let mut path: Vec<NodeIndex> = Vec::new();

        for node in self.graph.node_indices() {
            if !matches!(colors.get(&node), Some(Color::White)) {
                continue;
            }
            if let Some(cycle) = self.dfs_visit(node, &mut colors, &mut path) {
                let chain = cycle
                    .iter()
                    .map(|idx| self.graph[*idx].as_str())
                    .collect::<Vec<_>>()
                    .join(" → ");
                return Err(DashvarError::CircularDependency {
                    chain,
                });
            }
        }

        Ok(())
    }

    fn dfs_visit(
        &self,
        node: NodeIndex,
        colors: &mut HashMap<NodeIndex, Color>,
        path: &mut Vec<NodeIndex>,
    ) -> Option<Vec<NodeIndex>> {
        colors.insert(node, Color::Gray);
        path.push(node);

        for neighbor in self.graph.neighbors(node) {
            match colors.get(&neighbor) {
                Some(Color::Gray) => {
                    let start = path.iter().position(|n| *n == neighbor).unwrap_or(0);
                    let mut cycle = path[start..].to_vec();
                    cycle.push(neighbor);
                    return Some(cycle);
                }
                Some(Color::White) => {
                    if let Some(cycle) = self.dfs_visit(neighbor, colors, path) {
                        return Some(cycle);
                    }
                }
                _ => {}
            }
        }

        path.pop();
        colors.insert(node, Color::Black);
        None
    }

    /// Variable names with every dependency before its dependents.
    ///
    /// # Errors
    ///
    /// Returns [`DashvarError::CircularDependency`] if the graph has a cycle.
    pub fn load_order(&self) -> Result<Vec<String>, DashvarError> {
        self.detect_cycles()?;

        // Edges point at dependencies, so reverse the sort
        let indices = toposort(&self.graph, None).map_err(|cycle| {
            DashvarError::CircularDependency {
                chain: self.graph[cycle.node_id()].clone(),
            }
        })?;
        Ok(indices.into_iter().rev().map(|idx| self.graph[idx].clone()).collect())
    }

    /// Names `name` references directly.
    pub fn direct_deps(&self, name: &str) -> Vec<String> {
        self.neighbors(name, Direction::Outgoing)
    }

    fn neighbors(&self, name: &str, direction: Direction) -> Vec<String> {
        let Some(&idx) = self.node_map.get(name) else {
            return Vec::new();
        };
        let mut names: Vec<String> = self
            .graph
            .neighbors_directed(idx, direction)
            .map(|neighbor| self.graph[neighbor].clone())
            .collect();
        names.sort();
        names
    }

    /// Undeclared names referenced by each variable.
    pub fn unresolved(&self) -> &BTreeMap<String, Vec<String>> {
        &self.unresolved
    }

    /// Roots of the tree view: variables nothing else references.
    pub fn roots(&self) -> Vec<String> {
        let mut roots: Vec<String> = self
            .graph
            .node_indices()
            .filter(|idx| self.graph.neighbors_directed(*idx, Direction::Incoming).next().is_none())
            .map(|idx| self.graph[idx].clone())
            .collect();
        roots.sort();
        roots
    }

    /// Renders what `root` references as a tree.
    pub fn to_tree_string(&self, root: &str) -> String {
        let mut result = String::new();
        let mut visited = HashSet::new();
        self.build_tree_string(root, &mut result, "", true, &mut visited);
        result
    }

    fn build_tree_string(
        &self,
        name: &str,
        result: &mut String,
        prefix: &str,
        is_last: bool,
        visited: &mut HashSet<String>,
    ) {
        let connector = if is_last {
            "└── "
        } else {
            "├── "
        };
        result.push_str(&format!("{prefix}{connector}{name}\n"));

        let child_prefix = if is_last {
            format!("{prefix}    ")
        } else {
            format!("{prefix}│   ")
        };

        if !visited.insert(name.to_string()) {
            result.push_str(&format!("{child_prefix}└── (circular reference)\n"));
            return;
        }

        let deps = self.direct_deps(name);
        for (i, dep) in deps.iter().enumerate() {
            self.build_tree_string(dep, result, &child_prefix, i == deps.len() - 1, visited);
        }
        visited.remove(name);
    }
}
