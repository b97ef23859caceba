use std::mem;

use crate::content::{DEFAULT_SHOP_NAME, NEW_SHOP_NAME, new_shop_items};
use crate::pathfinding;
use crate::types::*;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Floor {
    pub(crate) cells: Vec<Cell>,
}

impl Floor {
    pub fn empty(cell_count: usize) -> Self {
        Self { cells: vec![Cell::Empty; cell_count] }
    }

    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    pub fn is_blocked(&self, index: usize) -> bool {
        self.cells.get(index).is_none_or(Cell::is_blocked)
    }
}

/// A shop found by [`Venue::shops`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ShopListing<'a> {
    pub position: Position,
    pub floor_label: &'a str,
    pub coord: Coord,
    pub meta: &'a ShopMeta,
}

/// The whole multi-floor grid. Dimensions and the floor list are fixed at
/// construction; only cell contents change afterwards.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Venue {
    dims: GridDims,
    labels: Vec<String>,
    pub(crate) floors: Vec<Floor>,
}

impl Venue {
    pub fn new(dims: GridDims, labels: Vec<String>) -> Self {
        let floors = labels.iter().map(|_| Floor::empty(dims.cell_count())).collect();
        Self { dims, labels, floors }
    }

    /// Caller guarantees one floor per label, each with `dims.cell_count()` cells.
    pub(crate) fn from_parts(dims: GridDims, labels: Vec<String>, floors: Vec<Floor>) -> Self {
        debug_assert_eq!(labels.len(), floors.len());
        Self { dims, labels, floors }
    }

    pub fn dims(&self) -> GridDims {
        self.dims
    }

    pub fn floors(&self) -> &[Floor] {
        &self.floors
    }

    pub fn floor_count(&self) -> usize {
        self.floors.len()
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    pub fn floor_label(&self, floor: usize) -> Option<&str> {
        self.labels.get(floor).map(String::as_str)
    }

    pub fn floor_by_label(&self, label: &str) -> Option<usize> {
        self.labels.iter().position(|candidate| candidate == label)
    }

    pub fn floor(&self, floor: usize) -> Result<&Floor, NavError> {
        self.floors.get(floor).ok_or(NavError::OutOfRange(OutOfRange::Floor(floor)))
    }

    pub fn cell_at(&self, floor: usize, index: usize) -> Result<&Cell, NavError> {
        self.floor(floor)?.cells.get(index).ok_or(NavError::OutOfRange(OutOfRange::Index(index)))
    }

    pub fn set_cell(&mut self, floor: usize, index: usize, cell: Cell) -> Result<(), NavError> {
        let slot = self
            .floors
            .get_mut(floor)
            .ok_or(NavError::OutOfRange(OutOfRange::Floor(floor)))?
            .cells
            .get_mut(index)
            .ok_or(NavError::OutOfRange(OutOfRange::Index(index)))?;
        *slot = cell;
        Ok(())
    }

    pub fn to_coord(&self, index: usize) -> Result<Coord, NavError> {
        self.dims.to_coord(index)
    }

    pub fn to_index(&self, coord: Coord) -> Result<usize, NavError> {
        self.dims.to_index(coord)
    }

    pub fn position(&self, floor: usize, coord: Coord) -> Result<Position, NavError> {
        self.floor(floor)?;
        Ok(Position::new(floor, self.dims.to_index(coord)?))
    }

    pub fn neighbors(&self, index: usize) -> Vec<usize> {
        pathfinding::neighbors(self.dims, index)
    }

    pub fn shortest_path(
        &self,
        floor: usize,
        start: usize,
        goal: usize,
    ) -> Result<Vec<Position>, NavError> {
        pathfinding::shortest_path(self, floor, start, goal)
    }

    pub fn shops(&self) -> impl Iterator<Item = ShopListing<'_>> {
        let cols = self.dims.cols;
        self.floors.iter().enumerate().flat_map(move |(floor, layer)| {
            let floor_label = self.labels[floor].as_str();
            layer.cells.iter().enumerate().filter_map(move |(index, cell)| {
                cell.shop().map(|meta| ShopListing {
                    position: Position::new(floor, index),
                    floor_label,
                    coord: Coord { x: index % cols + 1, y: index / cols + 1 },
                    meta,
                })
            })
        })
    }

    pub fn first_empty(&self, floor: usize) -> Result<Option<usize>, NavError> {
        Ok(self.floor(floor)?.cells.iter().position(Cell::is_empty))
    }

    /// Places a fresh shop on the first empty cell of `floor`.
    pub fn add_shop(&mut self, floor: usize, color: &str) -> Result<usize, NavError> {
        let index = self.first_empty(floor)?.ok_or(NavError::FloorFull(floor))?;
        let meta = ShopMeta {
            name: NEW_SHOP_NAME.to_string(),
            items: new_shop_items(),
            color: color.to_string(),
        };
        self.set_cell(floor, index, Cell::Shop(meta))?;
        log::info!("added shop on floor {floor} at cell {index}");
        Ok(index)
    }

    /// Creates or overwrites the shop at `(floor, index)`. A blank name falls
    /// back to the default shop name.
    pub fn save_shop(
        &mut self,
        floor: usize,
        index: usize,
        name: &str,
        items: ItemList,
        color: &str,
    ) -> Result<(), NavError> {
        let name = match name.trim() {
            "" => DEFAULT_SHOP_NAME,
            trimmed => trimmed,
        };
        let meta = ShopMeta { name: name.to_string(), items, color: color.to_string() };
        self.set_cell(floor, index, Cell::Shop(meta))
    }

    pub fn delete_shop(&mut self, floor: usize, index: usize) -> Result<ShopMeta, NavError> {
        let slot = self
            .floors
            .get_mut(floor)
            .ok_or(NavError::OutOfRange(OutOfRange::Floor(floor)))?
            .cells
            .get_mut(index)
            .ok_or(NavError::OutOfRange(OutOfRange::Index(index)))?;
        let Cell::Shop(meta) = slot else {
            return Err(NavError::NotAShop(Position::new(floor, index)));
        };
        let meta = mem::take(meta);
        *slot = Cell::Empty;
        log::info!("deleted shop {:?} on floor {floor} at cell {index}", meta.name);
        Ok(meta)
    }
}

/// Parses the `name:price, name:price` item text of the shop editor.
/// Entries with an empty name are skipped.
pub fn parse_item_list(text: &str) -> ItemList {
    text.split(',')
        .filter_map(|entry| {
            let (name, price) = entry.split_once(':').unwrap_or((entry, ""));
            let name = name.trim();
            (!name.is_empty()).then(|| (name.to_string(), Price::parse(price)))
        })
        .collect()
}
