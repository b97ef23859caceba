//! Shared venue fixtures for unit tests across the crate.

use crate::state::Venue;
use crate::types::*;

pub(crate) fn open_venue(cols: usize, rows: usize, floors: usize) -> Venue {
    let labels = (0..floors).map(|floor| floor.to_string()).collect();
    Venue::new(GridDims { cols, rows }, labels)
}

pub(crate) fn cell(venue: &Venue, x: usize, y: usize) -> usize {
    venue.to_index(Coord { x, y }).expect("fixture coordinate in range")
}

pub(crate) fn shop(name: &str) -> Cell {
    Cell::Shop(ShopMeta { name: name.to_string(), ..ShopMeta::default() })
}

/// 12x8 floor whose blocked goal at (6,4) is boxed in by blocked cells.
pub(crate) fn walled_goal_fixture() -> (Venue, usize, usize) {
    let mut venue = open_venue(12, 8, 1);
    let goal = cell(&venue, 6, 4);
    for (x, y) in [(6, 4), (7, 4), (5, 4), (6, 5), (6, 3)] {
        let index = cell(&venue, x, y);
        venue.set_cell(0, index, Cell::Blocked).expect("in range");
    }
    let start = cell(&venue, 1, 1);
    (venue, start, goal)
}

/// 12x8 floor with a wall down column 2 that leaves only the bottom row open.
pub(crate) fn wall_with_gap_fixture() -> (Venue, usize, usize) {
    let mut venue = open_venue(12, 8, 1);
    for y in 1..=7 {
        let index = cell(&venue, 2, y);
        venue.set_cell(0, index, Cell::Blocked).expect("in range");
    }
    let start = cell(&venue, 1, 1);
    let end = cell(&venue, 3, 1);
    (venue, start, end)
}

/// Two-floor 12x8 venue with shops at (2,2) and (3,2) on floor 0 and one at
/// (4,3) on floor 1.
pub(crate) fn two_floor_mall() -> Venue {
    let mut venue = open_venue(12, 8, 2);
    let fruits = cell(&venue, 2, 2);
    let clothing = cell(&venue, 3, 2);
    let electronics = cell(&venue, 4, 3);
    venue.set_cell(0, fruits, shop("Fruits")).expect("in range");
    venue.set_cell(0, clothing, shop("Clothing")).expect("in range");
    venue.set_cell(1, electronics, shop("Electronics")).expect("in range");
    venue
}
