mod canvas;
mod error;
mod graph_layout;
pub mod observer;
mod placement;

use std::{
    collections::{BTreeMap, HashMap},
    fmt,
    hash::Hash,
};

use serde::{Deserialize, Serialize};

pub use canvas::Canvas;
pub use error::{ConfigError, LayoutError};
use graph_layout::{FlowGraph, GraphLayout};
pub use observer::{LayoutObserver, NoopObserver, Stage};

/// Anything usable as a node identifier: UUIDs, strings, integers.
pub trait NodeId: Clone + Eq + Hash + fmt::Debug {}

impl<T: Clone + Eq + Hash + fmt::Debug> NodeId for T {}

/// Integer canvas coordinate of a node's top left corner.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// A node with its box size and (computed) position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodePlacement<Id> {
    pub id: Id,
    #[serde(default)]
    pub position: Position,
    pub width: i32,
    pub height: i32,
}

/// Directed connection between two nodes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Edge<Id> {
    pub from: Id,
    pub to: Id,
}

pub type LevelMap<Id> = HashMap<Id, usize>;
pub type LevelGroups<Id> = BTreeMap<usize, Vec<Id>>;
pub type PositionMap<Id> = HashMap<Id, Position>;

/// Lay out a whole flow graph.
///
/// Returns `nodes` in their original order with `position` filled in. Nodes are put in
/// levels by their longest path from a root, placed in centered rows, separated,
/// reordered to reduce edge crossings and finally centered on the canvas.
pub fn auto_layout<Id: NodeId>(
    canvas: &Canvas,
    nodes: &[NodePlacement<Id>],
    edges: &[Edge<Id>],
) -> Result<Vec<NodePlacement<Id>>, LayoutError> {
    auto_layout_observed(canvas, nodes, edges, &mut NoopObserver)
}

/// [`auto_layout`], reporting each stage to `observer`.
pub fn auto_layout_observed<Id: NodeId>(
    canvas: &Canvas,
    nodes: &[NodePlacement<Id>],
    edges: &[Edge<Id>],
    observer: &mut dyn LayoutObserver<Id>,
) -> Result<Vec<NodePlacement<Id>>, LayoutError> {
    let flow = FlowGraph::new(nodes.iter().map(|node| &node.id), edges);
    let positions = GraphLayout::new(flow, canvas).align_nodes(observer)?;

    Ok(nodes
        .iter()
        .map(|node| NodePlacement {
            position: positions.get(&node.id).copied().unwrap_or(node.position),
            ..node.clone()
        })
        .collect())
}

/// Level of every node: 0 for roots, otherwise one more than its deepest predecessor.
pub fn compute_levels<Id: NodeId>(
    nodes: &[NodePlacement<Id>],
    edges: &[Edge<Id>],
) -> Result<LevelMap<Id>, LayoutError> {
    let flow = FlowGraph::new(nodes.iter().map(|node| &node.id), edges);
    let level_of_node = flow.arrange_nodes_in_levels()?;
    Ok(flow.level_map(&level_of_node))
}

/// Partition node ids by level. Ids keep the order they have in `nodes`, a duplicated id
/// only counts where it first appears, and nodes missing from `levels` count as level 0.
pub fn group_by_level<Id: NodeId>(
    nodes: &[NodePlacement<Id>],
    levels: &LevelMap<Id>,
) -> LevelGroups<Id> {
    let flow = FlowGraph::new(nodes.iter().map(|node| &node.id), &[]);
    flow.group_by_level(|node| levels.get(flow.id(node)).copied().unwrap_or(0))
        .into_iter()
        .map(|(level, row)| {
            let ids: Vec<Id> = row.into_iter().map(|node| flow.id(node).clone()).collect();
            (level, ids)
        })
        .collect()
}

/// Position for a single node added to an already laid out graph.
///
/// `connected_from` lists the nodes with an edge into the new node. Ids not found in
/// `existing` are skipped.
pub fn new_node_position<Id: NodeId>(
    canvas: &Canvas,
    existing: &[NodePlacement<Id>],
    connected_from: &[Id],
) -> Position {
    placement::place_new_node(canvas, existing, connected_from)
}

#[cfg(feature = "python")]
mod python {
    use std::collections::HashMap;

    use pyo3::{exceptions::PyValueError, prelude::*};

    use crate::{Canvas, Edge, NodePlacement, Position};

    /// Lay out a flow on the default canvas.
    ///
    /// `nodes` are `(id, width, height)` tuples, `edges` are `(from, to)` tuples.
    /// Returns the position of every node keyed by id.
    #[pyfunction]
    pub fn auto_layout(
        nodes: Vec<(String, i32, i32)>,
        edges: Vec<(String, String)>,
    ) -> PyResult<HashMap<String, (i32, i32)>> {
        let nodes: Vec<_> = nodes
            .into_iter()
            .map(|(id, width, height)| NodePlacement {
                id,
                position: Position::default(),
                width,
                height,
            })
            .collect();
        let edges: Vec<_> = edges
            .into_iter()
            .map(|(from, to)| Edge { from, to })
            .collect();

        let placed = crate::auto_layout(&Canvas::default(), &nodes, &edges)
            .map_err(|err| PyValueError::new_err(err.to_string()))?;
        Ok(placed
            .into_iter()
            .map(|node| (node.id, (node.position.x, node.position.y)))
            .collect())
    }

    /// Position for a new node on the default canvas.
    ///
    /// `existing` are `(id, x, y)` tuples of the placed nodes.
    #[pyfunction]
    pub fn new_node_position(
        existing: Vec<(String, i32, i32)>,
        connected_from: Vec<String>,
    ) -> (i32, i32) {
        let canvas = Canvas::default();
        let existing: Vec<_> = existing
            .into_iter()
            .map(|(id, x, y)| NodePlacement {
                id,
                position: Position { x, y },
                width: canvas.node_width,
                height: canvas.node_height,
            })
            .collect();
        let position = crate::new_node_position(&canvas, &existing, &connected_from);
        (position.x, position.y)
    }

    #[pymodule]
    fn flow_layout(_py: Python<'_>, m: &PyModule) -> PyResult<()> {
        m.add_function(wrap_pyfunction!(auto_layout, m)?)?;
        m.add_function(wrap_pyfunction!(new_node_position, m)?)?;
        Ok(())
    }
}
