/*
 AYUDAME/TEMANEJO toolset
--------------------------

 (C) 2024, HLRS, University of Stuttgart
 All rights reserved.
 This software is published under the terms of the BSD license:

Redistribution and use in source and binary forms, with or without
modification, are permitted provided that the following conditions are met:
    * Redistributions of source code must retain the above copyright
      notice, this list of conditions and the following disclaimer.
    * Redistributions in binary form must reproduce the above copyright
      notice, this list of conditions and the following disclaimer in the
      documentation and/or other materials provided with the distribution.
    * Neither the name of the <organization> nor the
      names of its contributors may be used to endorse or promote products
      derived from this software without specific prior written permission.

THIS SOFTWARE IS PROVIDED BY THE COPYRIGHT HOLDERS AND CONTRIBUTORS "AS IS" AND
ANY EXPRESS OR IMPLIED WARRANTIES, INCLUDING, BUT NOT LIMITED TO, THE IMPLIED
WARRANTIES OF MERCHANTABILITY AND FITNESS FOR A PARTICULAR PURPOSE ARE
DISCLAIMED. IN NO EVENT SHALL <COPYRIGHT HOLDER> BE LIABLE FOR ANY
DIRECT, INDIRECT, INCIDENTAL, SPECIAL, EXEMPLARY, OR CONSEQUENTIAL DAMAGES
(INCLUDING, BUT NOT LIMITED TO, PROCUREMENT OF SUBSTITUTE GOODS OR SERVICES;
LOSS OF USE, DATA, OR PROFITS; OR BUSINESS INTERRUPTION) HOWEVER CAUSED AND
ON ANY THEORY OF LIABILITY, WHETHER IN CONTRACT, STRICT LIABILITY, OR TORT
(INCLUDING NEGLIGENCE OR OTHERWISE) ARISING IN ANY WAY OUT OF THE USE OF THIS
SOFTWARE, EVEN IF ADVISED OF THE POSSIBILITY OF SUCH DAMAGE.
*/
use std::collections::{BTreeMap, HashMap};

use log::{debug, trace, warn};
use petgraph::{
    algo::toposort,
    stable_graph::{NodeIndex, StableDiGraph},
    Direction,
};

use crate::{
    observer::{LayoutObserver, Stage},
    Canvas, Edge, LayoutError, LevelMap, NodeId, Position, PositionMap,
};

/// y coordinate of level 0 before centering.
const BASE_OFFSET_Y: i32 = 100;
/// Rows never start left of this, even on canvases narrower than the row.
const MIN_LEFT_MARGIN: i32 = 100;
pub(crate) const MAX_COLLISION_PASSES: usize = 10;

/// The directed flow graph a layout is computed for.
///
/// Node indices follow the order in which ids were handed in, so iterating
/// `graph.node_indices()` visits nodes in input order.
#[derive(Debug)]
pub(crate) struct FlowGraph<Id> {
    graph: StableDiGraph<Id, ()>,
}

impl<Id: NodeId> FlowGraph<Id> {
    pub(crate) fn new<'a, I>(ids: I, edges: &[Edge<Id>]) -> Self
    where
        I: IntoIterator<Item = &'a Id>,
        Id: 'a,
    {
        let mut graph: StableDiGraph<Id, ()> = StableDiGraph::new();
        let mut index_of_id: HashMap<Id, NodeIndex> = HashMap::new();

        for id in ids {
            if index_of_id.contains_key(id) {
                warn!("duplicate node id {id:?}, keeping the first occurrence");
                continue;
            }
            let index = graph.add_node(id.clone());
            index_of_id.insert(id.clone(), index);
        }

        for edge in edges {
            match (index_of_id.get(&edge.from), index_of_id.get(&edge.to)) {
                (Some(&from), Some(&to)) => {
                    graph.add_edge(from, to, ());
                }
                _ => debug!(
                    "ignoring edge {:?} -> {:?}: unknown endpoint",
                    edge.from, edge.to
                ),
            }
        }

        Self { graph }
    }

    pub(crate) fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    /// Put every node one level below its deepest predecessor.
    ///
    /// Nodes are visited in topological order, so by the time a node is reached all of
    /// its predecessors already have their final level. Roots get level 0.
    pub(crate) fn arrange_nodes_in_levels(
        &self,
    ) -> Result<HashMap<NodeIndex, usize>, LayoutError> {
        let order = toposort(&self.graph, None).map_err(|cycle| LayoutError::CyclicGraph {
            node: format!("{:?}", self.graph[cycle.node_id()]),
        })?;

        let mut level_of_node: HashMap<NodeIndex, usize> = HashMap::with_capacity(order.len());
        for node in order {
            let node_level = self
                .graph
                .neighbors_directed(node, Direction::Incoming)
                .filter_map(|predecessor| level_of_node.get(&predecessor).map(|l| l + 1))
                .max()
                .unwrap_or(0);
            level_of_node.insert(node, node_level);
        }
        Ok(level_of_node)
    }

    pub(crate) fn level_map(&self, level_of_node: &HashMap<NodeIndex, usize>) -> LevelMap<Id> {
        level_of_node
            .iter()
            .map(|(node, level)| (self.id(*node).clone(), *level))
            .collect()
    }

    pub(crate) fn id(&self, node: NodeIndex) -> &Id {
        &self.graph[node]
    }

    /// Partition the nodes by level, keeping input order inside each level.
    pub(crate) fn group_by_level(
        &self,
        level_of: impl Fn(NodeIndex) -> usize,
    ) -> BTreeMap<usize, Vec<NodeIndex>> {
        let mut layers: BTreeMap<usize, Vec<NodeIndex>> = BTreeMap::new();
        for node in self.graph.node_indices() {
            layers.entry(level_of(node)).or_default().push(node);
        }
        layers
    }
}

/// Represents a layout of a flow graph in progress.
///
/// The fields are:
///     - flow: the graph being laid out
///     - canvas: sizes and paddings used for every placement decision
///     - layers: the nodes of each level, in their current left-to-right order
///     - positions: the working position of every node
#[derive(Debug)]
pub(crate) struct GraphLayout<'c, Id> {
    flow: FlowGraph<Id>,
    canvas: &'c Canvas,
    layers: BTreeMap<usize, Vec<NodeIndex>>,
    positions: HashMap<NodeIndex, Position>,
}

impl<'c, Id: NodeId> GraphLayout<'c, Id> {
    pub(crate) fn new(flow: FlowGraph<Id>, canvas: &'c Canvas) -> Self {
        Self {
            flow,
            canvas,
            layers: BTreeMap::new(),
            positions: HashMap::new(),
        }
    }

    /// Align the nodes contained in the graph in layers.
    ///
    /// This performs the following steps:
    /// 1. Put each node in a level, below all of its predecessors
    /// 2. Place each level in a centered row
    /// 3. Push apart nodes that overlap within a level
    /// 4. Reorder the nodes of each level by the mean x of their predecessors
    /// 5. Center the whole graph on the canvas
    pub(crate) fn align_nodes(
        &mut self,
        observer: &mut dyn LayoutObserver<Id>,
    ) -> Result<PositionMap<Id>, LayoutError> {
        if self.flow.node_count() == 0 {
            return Ok(PositionMap::new());
        }

        let level_of_node = self.flow.arrange_nodes_in_levels()?;
        self.group_by_level(&level_of_node);
        debug!(
            "assigned {} nodes to {} levels",
            self.flow.node_count(),
            self.layers.len()
        );
        observer.levels_assigned(&self.flow.level_map(&level_of_node));
        observer.stage_finished(Stage::Leveling, &self.position_map());

        self.place_initial_rows();
        observer.stage_finished(Stage::InitialPlacement, &self.position_map());

        let passes = self.resolve_collisions(observer);
        debug!("collision resolution finished after {passes} pass(es)");
        observer.stage_finished(Stage::CollisionResolution, &self.position_map());

        self.minimize_crossings();
        observer.stage_finished(Stage::CrossingMinimization, &self.position_map());

        self.center_on_canvas();
        observer.stage_finished(Stage::Centering, &self.position_map());

        Ok(self.position_map())
    }

    fn group_by_level(&mut self, level_of_node: &HashMap<NodeIndex, usize>) {
        self.layers = self
            .flow
            .group_by_level(|node| level_of_node.get(&node).copied().unwrap_or(0));
    }

    fn place_initial_rows(&mut self) {
        for (level, row) in &self.layers {
            let y = BASE_OFFSET_Y + *level as i32 * self.canvas.row_height();
            let start_x = row_start_x(self.canvas, row.len());
            for (index, node) in row.iter().enumerate() {
                let x = start_x + index as i32 * self.canvas.pitch_x();
                self.positions.insert(*node, Position { x, y });
            }
        }
    }

    /// Push colliding pairs of a level apart around their midpoint.
    ///
    /// Returns the number of passes run, at most [`MAX_COLLISION_PASSES`]. Overlap left
    /// after the last pass is accepted.
    fn resolve_collisions(&mut self, observer: &mut dyn LayoutObserver<Id>) -> usize {
        let canvas = self.canvas;
        let half_pitch = canvas.pitch_x() / 2;
        let positions = &mut self.positions;

        for pass in 1..=MAX_COLLISION_PASSES {
            let mut collisions = 0;
            for row in self.layers.values() {
                for i in 0..row.len() {
                    for j in i + 1..row.len() {
                        let left = positions.get(&row[i]).copied().unwrap_or_default();
                        let right = positions.get(&row[j]).copied().unwrap_or_default();
                        if !canvas.collides(left, right) {
                            continue;
                        }

                        collisions += 1;
                        let midpoint = (left.x + right.x) / 2;
                        positions.insert(
                            row[i],
                            Position {
                                x: midpoint - half_pitch,
                                y: left.y,
                            },
                        );
                        positions.insert(
                            row[j],
                            Position {
                                x: midpoint + half_pitch,
                                y: right.y,
                            },
                        );
                    }
                }
            }

            trace!("collision pass {pass}: {collisions} collision(s)");
            observer.collision_pass(pass, collisions);
            if collisions == 0 {
                return pass;
            }
        }

        warn!("nodes still collided in pass {MAX_COLLISION_PASSES}, keeping the overlap");
        MAX_COLLISION_PASSES
    }

    /// Barycenter ordering: sort every level but the first by the mean x of each node's
    /// predecessors, then respace the level in that order.
    fn minimize_crossings(&mut self) {
        let canvas = self.canvas;
        let graph = &self.flow.graph;
        let positions = &mut self.positions;

        for (level, row) in self.layers.iter_mut() {
            if *level == 0 {
                continue;
            }

            let mut scores: Vec<(NodeIndex, f64)> = row
                .iter()
                .map(|&node| {
                    let parent_xs: Vec<f64> = graph
                        .neighbors_directed(node, Direction::Incoming)
                        .filter_map(|parent| positions.get(&parent))
                        .map(|parent| f64::from(parent.x))
                        .collect();
                    let score = if parent_xs.is_empty() {
                        positions.get(&node).map_or(0.0, |p| f64::from(p.x))
                    } else {
                        parent_xs.iter().sum::<f64>() / parent_xs.len() as f64
                    };
                    (node, score)
                })
                .collect();

            // stable, so equal barycenters keep their current order
            scores.sort_by(|a, b| a.1.total_cmp(&b.1));
            *row = scores.into_iter().map(|(node, _)| node).collect();

            let start_x = row_start_x(canvas, row.len());
            for (index, node) in row.iter().enumerate() {
                if let Some(position) = positions.get_mut(node) {
                    position.x = start_x + index as i32 * canvas.pitch_x();
                }
            }
        }
    }

    /// Translate every node so the bounding box of the graph sits in the middle of the canvas.
    fn center_on_canvas(&mut self) {
        let Some(min_x) = self.positions.values().map(|p| p.x).min() else {
            return;
        };
        let min_y = self.positions.values().map(|p| p.y).min().unwrap_or(min_x);
        let max_x = self.positions.values().map(|p| p.x).max().unwrap_or(min_x);
        let max_y = self.positions.values().map(|p| p.y).max().unwrap_or(min_y);

        let graph_width = max_x - min_x + self.canvas.node_width;
        let graph_height = max_y - min_y + self.canvas.node_height;
        let offset_x = (self.canvas.width - graph_width) / 2;
        let offset_y = (self.canvas.height - graph_height) / 2;

        for position in self.positions.values_mut() {
            position.x = position.x - min_x + offset_x;
            position.y = position.y - min_y + offset_y;
        }
    }

    fn position_map(&self) -> PositionMap<Id> {
        self.positions
            .iter()
            .map(|(node, position)| (self.flow.id(*node).clone(), *position))
            .collect()
    }
}

/// Left edge of a centered row of `len` nodes.
fn row_start_x(canvas: &Canvas, len: usize) -> i32 {
    let len = len as i32;
    let total_width = len * canvas.node_width + (len - 1).max(0) * canvas.padding_x;
    ((canvas.width - total_width) / 2).max(MIN_LEFT_MARGIN)
}
