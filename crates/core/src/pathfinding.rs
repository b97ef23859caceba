//! Grid connectivity and single-floor shortest-path search.
//! This module exists so tile moves and the route planner share one deterministic search.
//! It does not own target sequencing or traversal timing.

use std::collections::VecDeque;

use crate::state::Venue;
use crate::types::*;

/// East, west, south, north. Search tie-breaks follow this order.
const STEPS: [(isize, isize); 4] = [(1, 0), (-1, 0), (0, 1), (0, -1)];

/// In-bounds axis neighbours of `index`, in [`STEPS`] order. Cell types are
/// not consulted, so the result is shared by every floor of the same size.
pub fn neighbors(dims: GridDims, index: usize) -> Vec<usize> {
    let Ok(origin) = dims.to_coord(index) else {
        return Vec::new();
    };
    STEPS
        .iter()
        .filter_map(|&(dx, dy)| {
            let x = origin.x.checked_add_signed(dx)?;
            let y = origin.y.checked_add_signed(dy)?;
            dims.to_index(Coord { x, y }).ok()
        })
        .collect()
}

pub fn manhattan(dims: GridDims, a: usize, b: usize) -> usize {
    let (ax, ay) = (a % dims.cols, a / dims.cols);
    let (bx, by) = (b % dims.cols, b / dims.cols);
    ax.abs_diff(bx) + ay.abs_diff(by)
}

pub fn is_adjacent(dims: GridDims, a: Position, b: Position) -> bool {
    a.floor == b.floor && manhattan(dims, a.index, b.index) == 1
}

/// Breadth-first search from `start` to `goal` on one floor.
///
/// Every cell entered after `start` must be non-blocked, the goal included.
/// A node is marked when it is enqueued, so each cell is expanded at most once
/// and the returned path has the minimum number of hops. `start == goal`
/// yields the single-node path.
pub fn shortest_path(
    venue: &Venue,
    floor: usize,
    start: usize,
    goal: usize,
) -> Result<Vec<Position>, NavError> {
    let layer = venue.floor(floor)?;
    let dims = venue.dims();
    for index in [start, goal] {
        if !dims.contains(index) {
            return Err(NavError::OutOfRange(OutOfRange::Index(index)));
        }
    }
    if start == goal {
        return Ok(vec![Position::new(floor, start)]);
    }

    let mut came_from: Vec<Option<usize>> = vec![None; dims.cell_count()];
    came_from[start] = Some(start);
    let mut queue = VecDeque::from([start]);
    let mut expanded = 0usize;

    while let Some(current) = queue.pop_front() {
        if current == goal {
            break;
        }
        expanded += 1;
        for next in neighbors(dims, current) {
            if came_from[next].is_none() && !layer.is_blocked(next) {
                came_from[next] = Some(current);
                queue.push_back(next);
            }
        }
    }

    if came_from[goal].is_none() {
        log::debug!("floor {floor}: {start} -> {goal} unreachable after {expanded} expansions");
        return Err(NavError::Unreachable {
            from: Position::new(floor, start),
            to: Position::new(floor, goal),
        });
    }

    let mut path = vec![Position::new(floor, goal)];
    let mut cursor = goal;
    while cursor != start {
        let Some(previous) = came_from[cursor] else {
            break;
        };
        cursor = previous;
        path.push(Position::new(floor, cursor));
    }
    path.reverse();
    log::debug!("floor {floor}: {start} -> {goal} in {} nodes", path.len());
    Ok(path)
}
