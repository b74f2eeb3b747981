use flow_layout::{Edge, NodePlacement, Position};

use self::lcg::Lcg;

mod lcg;

/// Build a layered DAG with `n_layers` layers of `width` nodes.
///
/// Every node below the first layer gets `degree` incoming edges from random nodes of
/// the layer above, so the layout sees plenty of crossings to sort out. Nodes are
/// returned bottom layer first to keep the input out of topological order.
pub(crate) fn layered_flow(
    n_layers: usize,
    width: usize,
    degree: usize,
    seed: u128,
) -> (Vec<NodePlacement<usize>>, Vec<Edge<usize>>) {
    let mut lcg = Lcg::new_seed(seed);
    let nodes = (0..n_layers * width)
        .rev()
        .map(|id| NodePlacement {
            id,
            position: Position::default(),
            width: 220,
            height: 80,
        })
        .collect();

    let mut edges = Vec::new();
    for layer in 1..n_layers {
        for offset in 0..width {
            let to = layer * width + offset;
            for _ in 0..degree {
                let from = (layer - 1) * width + lcg.generate_range(width);
                edges.push(Edge { from, to });
            }
        }
    }
    (nodes, edges)
}
