//! JSON layout file: the persisted shape of every floor's cells.
//!
//! The document is an array of floors, each an array of exactly `cols * rows`
//! cell records in index order:
//!
//! ```json
//! [[{"type": "office"}, {"type": "shop", "meta": {"name": "Fruits", "items": {"apple": 30}, "color": "#f97316"}}, ...], ...]
//! ```
//!
//! `type` is one of `empty`, `blocked`, `office`, `washroom`, `escalator`,
//! `shop`. `meta` is only written for shops; a shop read without it gets the
//! default shop metadata. Writes go through a temporary file and a rename.

use std::fs;
use std::io;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::state::{Floor, Venue};
use crate::types::*;

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
enum CellType {
    Empty,
    Blocked,
    Office,
    Washroom,
    Escalator,
    Shop,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
struct CellRecord {
    #[serde(rename = "type")]
    kind: CellType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    meta: Option<ShopMeta>,
}

impl From<&Cell> for CellRecord {
    fn from(cell: &Cell) -> Self {
        let (kind, meta) = match cell {
            Cell::Empty => (CellType::Empty, None),
            Cell::Blocked => (CellType::Blocked, None),
            Cell::Landmark(LandmarkKind::Office) => (CellType::Office, None),
            Cell::Landmark(LandmarkKind::Washroom) => (CellType::Washroom, None),
            Cell::Landmark(LandmarkKind::Escalator) => (CellType::Escalator, None),
            Cell::Shop(meta) => (CellType::Shop, Some(meta.clone())),
        };
        Self { kind, meta }
    }
}

impl From<CellRecord> for Cell {
    fn from(record: CellRecord) -> Self {
        match record.kind {
            CellType::Empty => Cell::Empty,
            CellType::Blocked => Cell::Blocked,
            CellType::Office => Cell::Landmark(LandmarkKind::Office),
            CellType::Washroom => Cell::Landmark(LandmarkKind::Washroom),
            CellType::Escalator => Cell::Landmark(LandmarkKind::Escalator),
            CellType::Shop => Cell::Shop(record.meta.unwrap_or_default()),
        }
    }
}

#[derive(Debug, Error)]
pub enum LayoutError {
    #[error("layout file i/o failed: {0}")]
    Io(#[from] io::Error),
    #[error("layout is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("layout has {found} floor(s) but {expected} floor label(s) are configured")]
    FloorCount { expected: usize, found: usize },
    #[error("floor {floor} has {found} cells, expected {expected}")]
    CellCount { floor: usize, expected: usize, found: usize },
}

/// Builds a venue from layout JSON. Every floor must have exactly
/// `dims.cell_count()` cells and there must be one floor per label.
pub fn venue_from_json(
    text: &str,
    dims: GridDims,
    labels: Vec<String>,
) -> Result<Venue, LayoutError> {
    let document: Vec<Vec<CellRecord>> = serde_json::from_str(text)?;
    if document.len() != labels.len() {
        return Err(LayoutError::FloorCount { expected: labels.len(), found: document.len() });
    }
    let expected = dims.cell_count();
    let mut floors = Vec::with_capacity(document.len());
    for (floor, records) in document.into_iter().enumerate() {
        if records.len() != expected {
            return Err(LayoutError::CellCount { floor, expected, found: records.len() });
        }
        floors.push(Floor { cells: records.into_iter().map(Cell::from).collect() });
    }
    Ok(Venue::from_parts(dims, labels, floors))
}

pub fn venue_to_json(venue: &Venue) -> Result<String, LayoutError> {
    let document: Vec<Vec<CellRecord>> = venue
        .floors
        .iter()
        .map(|floor| floor.cells.iter().map(CellRecord::from).collect())
        .collect();
    Ok(serde_json::to_string_pretty(&document)?)
}

pub fn load(path: &Path, dims: GridDims, labels: Vec<String>) -> Result<Venue, LayoutError> {
    let content = fs::read_to_string(path)?;
    let venue = venue_from_json(&content, dims, labels)?;
    log::debug!("loaded {} floor(s) from {}", venue.floor_count(), path.display());
    Ok(venue)
}

pub fn write_atomic(venue: &Venue, path: &Path) -> Result<(), LayoutError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    let tmp_path = path.with_extension("json.tmp");
    let json = venue_to_json(venue)?;

    fs::write(&tmp_path, json)?;
    fs::rename(&tmp_path, path)?;
    log::debug!("saved layout to {}", path.display());

    Ok(())
}

#[cfg(test)]
mod tests;
