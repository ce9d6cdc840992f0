//! Core graph data structure.
//!
//! The TradeGraph wraps an undirected petgraph graph and keeps a name
//! index so countries can be looked up directly. It is always a star:
//! the reporter in the middle, one edge per ranked partner.

use crate::edge::{GraphEdge, TradeEdge};
use crate::layout::Layout;
use crate::style::{ColorScale, NodeRole};
use petgraph::graph::{NodeIndex, UnGraph};
use petgraph::visit::EdgeRef;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Unique identifier for a node in the graph.
pub type NodeId = NodeIndex;

/// A country in the trade graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeNode {
    pub name: String,
    pub role: NodeRole,
    pub color: String,
    pub size: u32,
}

/// The trade relationship graph of one reporter.
#[derive(Debug, Clone)]
pub struct TradeGraph {
    /// The underlying petgraph graph.
    pub(crate) graph: UnGraph<TradeNode, TradeEdge>,

    /// Maps country names to graph node indexes.
    name_index: HashMap<String, NodeId>,

    reporter: NodeId,
}

impl TradeGraph {
    /// Creates a graph holding only the reporter node.
    pub fn new(reporter: TradeNode) -> Self {
        let mut graph = UnGraph::default();
        let mut name_index = HashMap::new();

        let name = reporter.name.clone();
        let index = graph.add_node(reporter);
        name_index.insert(name, index);

        Self {
            graph,
            name_index,
            reporter: index,
        }
    }

    /// Adds a partner node linked to the reporter.
    ///
    /// Returns `None` without touching the graph if the name is already
    /// present, which rules out duplicate nodes, duplicate edges and
    /// self-loops.
    pub fn add_partner(&mut self, node: TradeNode, edge: TradeEdge) -> Option<NodeId> {
        if self.name_index.contains_key(&node.name) {
            return None;
        }

        let name = node.name.clone();
        let index = self.graph.add_node(node);
        self.name_index.insert(name, index);
        self.graph.add_edge(self.reporter, index, edge);

        Some(index)
    }

    /// Index of the reporter node.
    pub fn reporter_index(&self) -> NodeId {
        self.reporter
    }

    /// The reporter node.
    pub fn reporter(&self) -> &TradeNode {
        &self.graph[self.reporter]
    }

    /// Gets a node by country name.
    pub fn get_by_name(&self, name: &str) -> Option<&TradeNode> {
        let index = self.name_index.get(name)?;
        self.graph.node_weight(*index)
    }

    /// Gets the node index for a country name.
    pub fn get_index(&self, name: &str) -> Option<NodeId> {
        self.name_index.get(name).copied()
    }

    /// Gets a node by its graph index.
    pub fn get(&self, index: NodeId) -> Option<&TradeNode> {
        self.graph.node_weight(index)
    }

    /// Gets the edge between the reporter and a partner.
    pub fn edge_to(&self, partner: &str) -> Option<&TradeEdge> {
        let index = self.get_index(partner)?;
        let edge = self.graph.find_edge(self.reporter, index)?;
        self.graph.edge_weight(edge)
    }

    /// Returns the number of nodes.
    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    /// Returns the number of edges.
    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Iterates over all nodes in insertion order.
    pub fn nodes(&self) -> impl Iterator<Item = &TradeNode> {
        self.graph.node_weights()
    }

    /// Iterates over all edges.
    pub fn edges(&self) -> impl Iterator<Item = &TradeEdge> {
        self.graph.edge_weights()
    }

    /// Iterates over all node indexes in insertion order.
    pub fn node_indexes(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.graph.node_indices()
    }

    /// Whether two nodes share an edge.
    pub fn is_adjacent(&self, a: NodeId, b: NodeId) -> bool {
        self.graph.contains_edge(a, b)
    }

    /// Returns all edges with source and target names for export.
    pub fn export_edges(&self, scale: ColorScale) -> Vec<GraphEdge> {
        self.graph
            .edge_references()
            .map(|edge_ref| {
                let weight = edge_ref.weight();
                GraphEdge {
                    source: self.graph[edge_ref.source()].name.clone(),
                    target: self.graph[edge_ref.target()].name.clone(),
                    weight: weight.weight,
                    width: weight.width,
                    intensity: weight.intensity,
                    color: scale.color(weight.intensity).to_hex(),
                }
            })
            .collect()
    }

    /// Flattens nodes, edges and positions for a drawing layer.
    ///
    /// Nodes missing from `positions` are placed at the origin.
    pub fn export(&self, positions: &Layout, scale: ColorScale) -> GraphExport {
        let nodes = self
            .nodes()
            .map(|node| {
                let position = positions.get(&node.name).copied().unwrap_or_default();
                GraphNode {
                    name: node.name.clone(),
                    role: node.role,
                    color: node.color.clone(),
                    size: node.size,
                    x: position.x,
                    y: position.y,
                }
            })
            .collect();

        GraphExport {
            reporter: self.reporter().name.clone(),
            stats: self.stats(),
            nodes,
            edges: self.export_edges(scale),
        }
    }
}

/// A positioned node for export.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphNode {
    pub name: String,
    pub role: NodeRole,
    pub color: String,
    pub size: u32,
    pub x: f64,
    pub y: f64,
}

/// Drawing-ready form of a trade graph.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphExport {
    pub reporter: String,
    pub stats: GraphStats,
    pub nodes: Vec<GraphNode>,
    pub edges: Vec<GraphEdge>,
}

/// Graph statistics.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphStats {
    pub node_count: usize,
    pub edge_count: usize,
    pub total_weight: f64,
}

impl TradeGraph {
    /// Returns graph statistics.
    pub fn stats(&self) -> GraphStats {
        GraphStats {
            node_count: self.node_count(),
            edge_count: self.edge_count(),
            total_weight: self.edges().map(|e| e.weight).sum(),
        }
    }
}
