use std::fmt;
use std::mem;

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Number;
use thiserror::Error;

use crate::content::{DEFAULT_SHOP_COLOR, DEFAULT_SHOP_NAME};

/// Venue-wide grid size. Every floor has exactly `cols * rows` cells.
/// Both sides are at least 1; build one with [`GridDims::new`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct GridDims {
    pub(crate) cols: usize,
    pub(crate) rows: usize,
}

impl GridDims {
    pub fn new(cols: usize, rows: usize) -> Result<Self, NavError> {
        if cols == 0 || rows == 0 {
            return Err(NavError::InvalidDimensions { cols, rows });
        }
        Ok(Self { cols, rows })
    }

    pub fn cols(self) -> usize {
        self.cols
    }

    pub fn rows(self) -> usize {
        self.rows
    }

    pub fn cell_count(self) -> usize {
        self.cols * self.rows
    }

    pub fn contains(self, index: usize) -> bool {
        index < self.cell_count()
    }

    /// Linear index to 1-based `(x, y)`.
    pub fn to_coord(self, index: usize) -> Result<Coord, NavError> {
        if !self.contains(index) {
            return Err(NavError::OutOfRange(OutOfRange::Index(index)));
        }
        Ok(Coord { x: index % self.cols + 1, y: index / self.cols + 1 })
    }

    /// 1-based `(x, y)` to linear index: `(y - 1) * cols + (x - 1)`.
    pub fn to_index(self, coord: Coord) -> Result<usize, NavError> {
        if coord.x == 0 || coord.y == 0 || coord.x > self.cols || coord.y > self.rows {
            return Err(NavError::OutOfRange(OutOfRange::Coord(coord)));
        }
        Ok((coord.y - 1) * self.cols + (coord.x - 1))
    }
}

/// 1-based grid coordinate, `x` along columns and `y` along rows.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Coord {
    pub x: usize,
    pub y: usize,
}

impl fmt::Display for Coord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({},{})", self.x, self.y)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Position {
    pub floor: usize,
    pub index: usize,
}

impl Position {
    pub fn new(floor: usize, index: usize) -> Self {
        Self { floor, index }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.floor, self.index)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum LandmarkKind {
    Office,
    Washroom,
    Escalator,
}

impl LandmarkKind {
    pub fn label(self) -> &'static str {
        match self {
            Self::Office => "Mall Office",
            Self::Washroom => "Washroom",
            Self::Escalator => "Escalator",
        }
    }
}

/// Item price: a JSON number kept verbatim, or any free-form text.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Price {
    Amount(Number),
    Label(String),
}

impl Price {
    /// Numbers become `Amount`, anything else is kept as trimmed text.
    pub fn parse(raw: &str) -> Self {
        let raw = raw.trim();
        if let Ok(whole) = raw.parse::<i64>() {
            return Self::Amount(whole.into());
        }
        match raw.parse::<f64>().ok().and_then(Number::from_f64) {
            Some(number) => Self::Amount(number),
            None => Self::Label(raw.to_string()),
        }
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Amount(number) => write!(f, "{number}"),
            Self::Label(text) => f.write_str(text),
        }
    }
}

/// Item prices in entry order. Inserting an existing name replaces its price
/// in place; the persisted form is a JSON object written in the same order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ItemList(Vec<(String, Price)>);

impl ItemList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: String, price: Price) -> Option<Price> {
        match self.0.iter_mut().find(|(existing, _)| *existing == name) {
            Some((_, slot)) => Some(mem::replace(slot, price)),
            None => {
                self.0.push((name, price));
                None
            }
        }
    }

    pub fn get(&self, name: &str) -> Option<&Price> {
        self.0.iter().find(|(existing, _)| existing == name).map(|(_, price)| price)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Price)> {
        self.0.iter().map(|(name, price)| (name.as_str(), price))
    }
}

impl FromIterator<(String, Price)> for ItemList {
    fn from_iter<I: IntoIterator<Item = (String, Price)>>(iter: I) -> Self {
        let mut items = Self::new();
        for (name, price) in iter {
            items.insert(name, price);
        }
        items
    }
}

impl Serialize for ItemList {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (name, price) in &self.0 {
            map.serialize_entry(name, price)?;
        }
        map.end()
    }
}

struct ItemListVisitor;

impl<'de> Visitor<'de> for ItemListVisitor {
    type Value = ItemList;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a map of item names to prices")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<ItemList, A::Error> {
        let mut items = ItemList::new();
        while let Some((name, price)) = access.next_entry::<String, Price>()? {
            items.insert(name, price);
        }
        Ok(items)
    }
}

impl<'de> Deserialize<'de> for ItemList {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_map(ItemListVisitor)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShopMeta {
    #[serde(default = "default_shop_name")]
    pub name: String,
    #[serde(default)]
    pub items: ItemList,
    #[serde(default = "default_shop_color")]
    pub color: String,
}

fn default_shop_name() -> String {
    DEFAULT_SHOP_NAME.to_string()
}

fn default_shop_color() -> String {
    DEFAULT_SHOP_COLOR.to_string()
}

impl Default for ShopMeta {
    fn default() -> Self {
        Self { name: default_shop_name(), items: ItemList::new(), color: default_shop_color() }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub enum Cell {
    #[default]
    Empty,
    Blocked,
    Landmark(LandmarkKind),
    Shop(ShopMeta),
}

impl Cell {
    pub fn is_blocked(&self) -> bool {
        matches!(self, Self::Blocked)
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }

    pub fn shop(&self) -> Option<&ShopMeta> {
        match self {
            Self::Shop(meta) => Some(meta),
            _ => None,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutOfRange {
    Floor(usize),
    Index(usize),
    Coord(Coord),
}

impl fmt::Display for OutOfRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Floor(floor) => write!(f, "floor {floor}"),
            Self::Index(index) => write!(f, "cell index {index}"),
            Self::Coord(coord) => write!(f, "coordinate {coord}"),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum NavError {
    #[error("{0} is out of range")]
    OutOfRange(OutOfRange),
    #[error("no path from {from} to {to}")]
    Unreachable { from: Position, to: Position },
    #[error("cannot start a traversal on an empty route")]
    EmptyRoute,
    #[error("{} selected target(s) are not on floor {start_floor}; change selection or location", .offending.len())]
    CrossFloorTargets { start_floor: usize, offending: Vec<Position> },
    #[error("no targets selected")]
    NoTargets,
    #[error("current location is not set")]
    NoLocation,
    #[error("cell {0} is not a shop")]
    NotAShop(Position),
    #[error("floor {0} has no empty cell left")]
    FloorFull(usize),
    #[error("grid must have at least one column and one row, got {cols}x{rows}")]
    InvalidDimensions { cols: usize, rows: usize },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FloorSwitch {
    pub from: Option<usize>,
    pub to: usize,
}

/// One emitted traversal step. A renderer applies `floor_switch` first, then
/// moves the avatar to `position` and redraws `remaining`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Step {
    pub position: Position,
    pub floor_switch: Option<FloorSwitch>,
    pub remaining: Vec<Position>,
    pub arrived: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HaltReason {
    Arrived,
    Cancelled,
    /// No traversal was in flight.
    Idle,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StepResult {
    Stepped(Step),
    Halted(HaltReason),
}
