//! Built-in venue content: shop defaults, the colour palette, and the
//! reference layout installed when no saved layout exists.

use crate::state::Venue;
use crate::types::*;

pub const DEFAULT_COLS: usize = 12;
pub const DEFAULT_ROWS: usize = 8;
pub const DEFAULT_FLOOR_LABELS: [&str; 3] = ["G", "1", "2"];

pub const DEFAULT_SHOP_NAME: &str = "Shop";
pub const DEFAULT_SHOP_COLOR: &str = "#94a3b8";
pub const NEW_SHOP_NAME: &str = "New Shop";

pub const SHOP_PALETTE: [&str; 5] = ["#f97316", "#60a5fa", "#7c3aed", "#34d399", "#f43f5e"];

/// Items given to a shop created with `add_shop`.
pub fn new_shop_items() -> ItemList {
    [("item".to_string(), Price::Amount(100.into()))].into_iter().collect()
}

struct SeedShop {
    floor: usize,
    at: Coord,
    name: &'static str,
    items: &'static [(&'static str, i64)],
    color: &'static str,
}

const SEED_LANDMARKS: [(Coord, LandmarkKind); 3] = [
    (Coord { x: 1, y: 1 }, LandmarkKind::Office),
    (Coord { x: 10, y: 1 }, LandmarkKind::Washroom),
    (Coord { x: 6, y: 6 }, LandmarkKind::Escalator),
];

const SEED_SHOPS: [SeedShop; 4] = [
    SeedShop {
        floor: 0,
        at: Coord { x: 2, y: 2 },
        name: "Fruits",
        items: &[("apple", 30), ("banana", 10)],
        color: "#f97316",
    },
    SeedShop {
        floor: 0,
        at: Coord { x: 3, y: 2 },
        name: "Clothing",
        items: &[("shirt", 499), ("dress", 899)],
        color: "#60a5fa",
    },
    SeedShop {
        floor: 1,
        at: Coord { x: 4, y: 3 },
        name: "Electronics",
        items: &[("headphones", 799), ("charger", 199)],
        color: "#7c3aed",
    },
    SeedShop {
        floor: 2,
        at: Coord { x: 9, y: 2 },
        name: "Home",
        items: &[("mop", 199), ("soap", 49)],
        color: "#34d399",
    },
];

/// The reference venue: three 12x8 floors, landmarks on the ground floor and
/// one or two shops per floor.
pub fn seeded_venue() -> Venue {
    let dims = GridDims { cols: DEFAULT_COLS, rows: DEFAULT_ROWS };
    let labels = DEFAULT_FLOOR_LABELS.iter().map(|label| label.to_string()).collect();
    let mut venue = Venue::new(dims, labels);

    for (at, kind) in SEED_LANDMARKS {
        let index = (at.y - 1) * DEFAULT_COLS + (at.x - 1);
        venue.floors[0].cells[index] = Cell::Landmark(kind);
    }
    for shop in &SEED_SHOPS {
        let index = (shop.at.y - 1) * DEFAULT_COLS + (shop.at.x - 1);
        let items =
            shop.items.iter().map(|(name, price)| (name.to_string(), Price::Amount((*price).into())));
        venue.floors[shop.floor].cells[index] = Cell::Shop(ShopMeta {
            name: shop.name.to_string(),
            items: items.collect(),
            color: shop.color.to_string(),
        });
    }
    venue
}
