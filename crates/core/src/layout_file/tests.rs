use serde_json::{Value, json};
use tempfile::tempdir;

use super::*;
use crate::content::seeded_venue;
use crate::test_support::*;

fn labels(count: usize) -> Vec<String> {
    (0..count).map(|floor| floor.to_string()).collect()
}

#[test]
fn seeded_venue_serializes_to_persisted_shape() {
    let venue = seeded_venue();
    let value: Value =
        serde_json::from_str(&venue_to_json(&venue).expect("serializable")).expect("valid json");

    let floors = value.as_array().expect("array of floors");
    assert_eq!(floors.len(), 3);
    assert!(floors.iter().all(|floor| floor.as_array().map(Vec::len) == Some(96)));

    assert_eq!(floors[0][0], json!({"type": "office"}));
    assert_eq!(floors[0][2], json!({"type": "empty"}));
    assert_eq!(
        floors[0][13],
        json!({
            "type": "shop",
            "meta": {"name": "Fruits", "items": {"apple": 30, "banana": 10}, "color": "#f97316"}
        })
    );
}

#[test]
fn json_roundtrip_preserves_every_cell() {
    let mut venue = seeded_venue();
    venue.set_cell(2, 50, Cell::Blocked).expect("in range");
    let text = venue_to_json(&venue).expect("serializable");

    let decoded =
        venue_from_json(&text, venue.dims(), venue.labels().to_vec()).expect("same shape");
    assert_eq!(decoded, venue);
}

#[test]
fn shop_without_meta_and_text_prices_load() {
    let text = json!([[
        {"type": "shop"},
        {"type": "shop", "meta": {"name": "Tailor", "items": {"hem": "on request", "zip": 12.5}}},
        {"type": "escalator"},
        {"type": "blocked"}
    ]])
    .to_string();

    let venue = venue_from_json(&text, GridDims { cols: 2, rows: 2 }, labels(1)).expect("valid");
    assert_eq!(venue.cell_at(0, 0), Ok(&Cell::Shop(ShopMeta::default())));

    let tailor = venue.cell_at(0, 1).expect("in range").shop().expect("shop");
    assert_eq!(tailor.color, "#94a3b8");
    assert_eq!(tailor.items.get("hem"), Some(&Price::Label("on request".into())));
    assert_eq!(tailor.items.get("zip").map(Price::to_string).as_deref(), Some("12.5"));
    assert_eq!(venue.cell_at(0, 2), Ok(&Cell::Landmark(LandmarkKind::Escalator)));
    assert_eq!(venue.cell_at(0, 3), Ok(&Cell::Blocked));
}

#[test]
fn item_order_survives_load_and_save() {
    let text = json!([[
        {"type": "shop", "meta": {"name": "Clothing", "items": {"shirt": 499, "dress": 899, "belt": 150}}}
    ]])
    .to_string();
    let dims = GridDims::new(1, 1).expect("valid dims");

    let venue = venue_from_json(&text, dims, labels(1)).expect("valid");
    let meta = venue.cell_at(0, 0).expect("in range").shop().expect("shop");
    let names: Vec<&str> = meta.items.iter().map(|(name, _)| name).collect();
    assert_eq!(names, ["shirt", "dress", "belt"]);

    let saved = venue_to_json(&venue).expect("serializable");
    let shirt = saved.find("shirt").expect("shirt written");
    let dress = saved.find("dress").expect("dress written");
    let belt = saved.find("belt").expect("belt written");
    assert!(shirt < dress && dress < belt, "items reordered: {saved}");
    assert_eq!(venue_from_json(&saved, dims, labels(1)).expect("reload"), venue);
}

#[test]
fn short_floor_is_rejected() {
    let text = json!([[{"type": "empty"}], [{"type": "empty"}, {"type": "empty"}]]).to_string();
    let err = venue_from_json(&text, GridDims { cols: 2, rows: 1 }, labels(2))
        .expect_err("first floor too short");
    assert!(matches!(err, LayoutError::CellCount { floor: 0, expected: 2, found: 1 }));
}

#[test]
fn floor_count_must_match_labels() {
    let text = json!([[{"type": "empty"}]]).to_string();
    let err = venue_from_json(&text, GridDims { cols: 1, rows: 1 }, labels(3))
        .expect_err("missing floors");
    assert!(matches!(err, LayoutError::FloorCount { expected: 3, found: 1 }));
}

#[test]
fn unknown_cell_type_is_a_json_error() {
    let text = json!([[{"type": "lift"}]]).to_string();
    let err = venue_from_json(&text, GridDims { cols: 1, rows: 1 }, labels(1))
        .expect_err("unknown type");
    assert!(matches!(err, LayoutError::Json(_)));
}

#[test]
fn atomic_write_and_load() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("nested").join("layout.json");

    let mut venue = two_floor_mall();
    venue.add_shop(1, "#f43f5e").expect("room left");
    write_atomic(&venue, &path).unwrap();
    assert!(path.exists());

    let loaded = load(&path, venue.dims(), venue.labels().to_vec()).unwrap();
    assert_eq!(loaded, venue);

    let tmp_path = path.with_extension("json.tmp");
    assert!(!tmp_path.exists());
}

#[test]
fn missing_file_is_an_io_error() {
    let dir = tempdir().unwrap();
    let err = load(&dir.path().join("absent.json"), GridDims { cols: 1, rows: 1 }, labels(1))
        .expect_err("no file");
    assert!(matches!(err, LayoutError::Io(_)));
}
