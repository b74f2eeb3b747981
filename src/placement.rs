use log::debug;

use crate::{Canvas, NodeId, NodePlacement, Position};

/// y coordinate used for a new node that has nothing to line up with.
const DEFAULT_TOP: i32 = 100;

/// Position for one node added to an existing layout, without re-running the pipeline.
///
/// A node connected from placed nodes goes one pitch right of their average position.
/// Otherwise it goes one pitch right of the rightmost placed node. Either way it moves
/// down in steps of `node_height + padding_y / 2` until it collides with nothing.
pub(crate) fn place_new_node<Id: NodeId>(
    canvas: &Canvas,
    existing: &[NodePlacement<Id>],
    connected_from: &[Id],
) -> Position {
    if existing.is_empty() {
        return Position {
            x: canvas.width / 2,
            y: DEFAULT_TOP,
        };
    }

    let sources: Vec<Position> = connected_from
        .iter()
        .filter_map(|id| existing.iter().find(|node| &node.id == id))
        .map(|node| node.position)
        .collect();

    let candidate = if sources.is_empty() {
        if !connected_from.is_empty() {
            debug!(
                "none of the {} source node(s) are placed, using the rightmost node",
                connected_from.len()
            );
        }
        let max_x = existing
            .iter()
            .map(|node| node.position.x)
            .fold(0, i32::max);
        Position {
            x: max_x.saturating_add(canvas.pitch_x()),
            y: DEFAULT_TOP,
        }
    } else {
        let avg_x = average(sources.iter().map(|p| p.x));
        let avg_y = average(sources.iter().map(|p| p.y));
        Position {
            x: avg_x.saturating_add(canvas.pitch_x()),
            y: avg_y,
        }
    };

    step_down_until_free(canvas, candidate, existing)
}

fn step_down_until_free<Id>(
    canvas: &Canvas,
    mut candidate: Position,
    existing: &[NodePlacement<Id>],
) -> Position {
    let step = canvas.node_height + canvas.padding_y / 2;
    while canvas.is_occupied(candidate, existing.iter().map(|node| &node.position)) {
        let next = candidate.y.saturating_add(step);
        if next == candidate.y {
            break;
        }
        candidate.y = next;
    }
    candidate
}

/// Mean of `values`, summed wide so large coordinates cannot overflow.
fn average(values: impl ExactSizeIterator<Item = i32>) -> i32 {
    let count = values.len().max(1) as i64;
    let sum: i64 = values.map(i64::from).sum();
    i32::try_from(sum / count).unwrap_or(if sum < 0 { i32::MIN } else { i32::MAX })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node(id: u32, x: i32, y: i32) -> NodePlacement<u32> {
        NodePlacement {
            id,
            position: Position { x, y },
            width: 220,
            height: 80,
        }
    }

    #[test]
    fn test_first_node_goes_top_center() {
        let canvas = Canvas::default();
        assert_eq!(
            place_new_node::<u32>(&canvas, &[], &[7]),
            Position { x: 1000, y: 100 }
        );
    }

    #[test]
    fn test_right_of_single_source() {
        let canvas = Canvas::default();
        let existing = [node(1, 500, 300)];
        assert_eq!(
            place_new_node(&canvas, &existing, &[1]),
            Position { x: 780, y: 300 }
        );
    }

    #[test]
    fn test_averages_sources() {
        let canvas = Canvas::default();
        let existing = [node(1, 100, 100), node(2, 300, 500)];
        assert_eq!(
            place_new_node(&canvas, &existing, &[1, 2]),
            Position { x: 480, y: 300 }
        );
    }

    #[test]
    fn test_steps_down_past_occupied_slot() {
        let canvas = Canvas::default();
        let existing = [node(1, 500, 300), node(2, 780, 300), node(3, 780, 430)];
        // step is 80 + 100 / 2 = 130
        assert_eq!(
            place_new_node(&canvas, &existing, &[1]),
            Position { x: 780, y: 560 }
        );
    }

    #[test]
    fn test_unconnected_goes_right_of_rightmost() {
        let canvas = Canvas::default();
        let existing = [node(1, 500, 300), node(2, 900, 700)];
        assert_eq!(
            place_new_node::<u32>(&canvas, &existing, &[]),
            Position { x: 1180, y: 100 }
        );
    }

    #[test]
    fn test_missing_sources_fall_back_to_rightmost() {
        let canvas = Canvas::default();
        let existing = [node(1, 500, 100)];
        // (780, 100) is free: dx = 280 is outside the 250 threshold
        assert_eq!(
            place_new_node(&canvas, &existing, &[42, 43]),
            Position { x: 780, y: 100 }
        );
    }

    #[test]
    fn test_averaging_large_coordinates_does_not_overflow() {
        let canvas = Canvas::default();
        let existing = [node(1, 1_500_000_000, 0), node(2, 1_500_000_000, 0)];
        assert_eq!(
            place_new_node(&canvas, &existing, &[1, 2]),
            Position {
                x: 1_500_000_280,
                y: 0
            }
        );
    }

    #[test]
    fn test_saturated_candidate_stops_stepping_down() {
        let canvas = Canvas::default();
        let existing = [node(1, i32::MAX, i32::MAX), node(2, i32::MAX, i32::MAX - 50)];
        assert_eq!(
            place_new_node(&canvas, &existing, &[2]),
            Position {
                x: i32::MAX,
                y: i32::MAX
            }
        );
    }

    #[test]
    fn test_average_of_extremes() {
        assert_eq!(average([i32::MAX, i32::MAX].into_iter()), i32::MAX);
        assert_eq!(average([i32::MIN, i32::MIN, 0].into_iter()), -1_431_655_765);
        assert_eq!(average([7, -3].into_iter()), 2);
    }

    #[test]
    fn test_missing_source_is_skipped_when_averaging() {
        let canvas = Canvas::default();
        let existing = [node(1, 500, 300)];
        assert_eq!(
            place_new_node(&canvas, &existing, &[99, 1]),
            Position { x: 780, y: 300 }
        );
    }
}
