use std::collections::BTreeSet;

use mallnav_core::pathfinding::{is_adjacent, manhattan, neighbors, shortest_path};
use mallnav_core::{Cell, GridDims, NavError, Position, TargetSet, Venue, plan_route};
use proptest::prelude::*;

const MAX_SIDE: usize = 10;

fn venue_with_walls(cols: usize, rows: usize, walls: &[u8]) -> Venue {
    let dims = GridDims::new(cols, rows).expect("non-zero sides");
    let mut venue = Venue::new(dims, vec!["G".to_string()]);
    for index in 0..cols * rows {
        if walls[index] == 0 {
            venue.set_cell(0, index, Cell::Blocked).expect("in range");
        }
    }
    venue
}

fn wall_mask() -> impl Strategy<Value = Vec<u8>> {
    prop::collection::vec(0_u8..4, MAX_SIDE * MAX_SIDE)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    #[test]
    fn neighbours_stay_in_bounds_and_adjacent(
        cols in 1_usize..=MAX_SIDE,
        rows in 1_usize..=MAX_SIDE,
        seed in any::<usize>()
    ) {
        let dims = GridDims::new(cols, rows).expect("non-zero sides");
        let index = seed % dims.cell_count();
        let found = neighbors(dims, index);
        prop_assert!(found.len() <= 4);
        for next in found {
            prop_assert!(dims.contains(next));
            prop_assert_eq!(manhattan(dims, index, next), 1);
        }
    }

    #[test]
    fn open_floor_path_length_is_manhattan_plus_one(
        cols in 1_usize..=MAX_SIDE,
        rows in 1_usize..=MAX_SIDE,
        a in any::<usize>(),
        b in any::<usize>()
    ) {
        let dims = GridDims::new(cols, rows).expect("non-zero sides");
        let venue = Venue::new(dims, vec!["G".to_string()]);
        let count = cols * rows;
        let (start, goal) = (a % count, b % count);

        let path = shortest_path(&venue, 0, start, goal).expect("open floor is connected");
        prop_assert_eq!(path.len(), manhattan(venue.dims(), start, goal) + 1);
        prop_assert_eq!(path[0], Position::new(0, start));
        prop_assert_eq!(path[path.len() - 1], Position::new(0, goal));
    }

    #[test]
    fn search_avoids_blocked_cells_and_is_deterministic(
        cols in 1_usize..=MAX_SIDE,
        rows in 1_usize..=MAX_SIDE,
        walls in wall_mask(),
        a in any::<usize>(),
        b in any::<usize>()
    ) {
        let mut venue = venue_with_walls(cols, rows, &walls);
        let count = cols * rows;
        let (start, goal) = (a % count, b % count);
        venue.set_cell(0, start, Cell::Empty).expect("in range");

        let first = shortest_path(&venue, 0, start, goal);
        let second = shortest_path(&venue, 0, start, goal);
        prop_assert_eq!(&first, &second);

        match first {
            Ok(path) => {
                prop_assert!(path.len() > manhattan(venue.dims(), start, goal));
                for position in &path {
                    prop_assert!(!venue.floors()[0].is_blocked(position.index));
                }
                for pair in path.windows(2) {
                    prop_assert!(is_adjacent(venue.dims(), pair[0], pair[1]));
                }
            }
            Err(NavError::Unreachable { .. }) => prop_assert!(start != goal),
            Err(other) => prop_assert!(false, "unexpected error {other}"),
        }
    }

    #[test]
    fn self_path_is_single_node(
        cols in 1_usize..=MAX_SIDE,
        rows in 1_usize..=MAX_SIDE,
        walls in wall_mask(),
        a in any::<usize>()
    ) {
        let venue = venue_with_walls(cols, rows, &walls);
        let index = a % (cols * rows);
        prop_assert_eq!(
            shortest_path(&venue, 0, index, index),
            Ok(vec![Position::new(0, index)])
        );
    }

    #[test]
    fn planned_route_is_adjacent_and_accounts_for_every_target(
        cols in 2_usize..=MAX_SIDE,
        rows in 2_usize..=MAX_SIDE,
        walls in wall_mask(),
        a in any::<usize>(),
        picks in prop::collection::vec(any::<usize>(), 1..6)
    ) {
        let mut venue = venue_with_walls(cols, rows, &walls);
        let count = cols * rows;
        let start = Position::new(0, a % count);
        venue.set_cell(0, start.index, Cell::Empty).expect("in range");
        let targets: TargetSet = picks.iter().map(|pick| Position::new(0, pick % count)).collect();

        let plan = match plan_route(&venue, start, &targets) {
            Ok(plan) => plan,
            Err(NavError::Unreachable { .. }) => return Ok(()),
            Err(other) => return Err(TestCaseError::fail(format!("unexpected error {other}"))),
        };

        let route = plan.route.positions();
        prop_assert_eq!(route[0], start);
        for pair in route.windows(2) {
            prop_assert!(is_adjacent(venue.dims(), pair[0], pair[1]));
        }

        let visited: BTreeSet<Position> = plan.visit_order.iter().copied().collect();
        let dropped: BTreeSet<Position> = plan.dropped.iter().copied().collect();
        prop_assert_eq!(visited.len(), plan.visit_order.len());
        prop_assert!(visited.is_disjoint(&dropped));
        let accounted: BTreeSet<Position> = visited.union(&dropped).copied().collect();
        let selected: BTreeSet<Position> = targets.iter().copied().collect();
        prop_assert_eq!(accounted, selected);

        let mut cursor = 0;
        for stop in &plan.visit_order {
            let offset = route[cursor..].iter().position(|position| position == stop);
            prop_assert!(offset.is_some(), "stop {} missing from route", stop);
            cursor += offset.unwrap_or(0);
        }
        prop_assert_eq!(route[route.len() - 1], plan.visit_order[plan.visit_order.len() - 1]);
    }
}
