//! Level catalog loading and the gallery built from it.

use std::io::Write;

use swap_puzzle::{Gallery, LevelCatalog, LevelId, RecordStore};
use tempfile::NamedTempFile;

const CATALOG: &str = r#"[
    { "id": 1, "img": "images/one.jpg", "title": "One" },
    { "id": "two", "image": "images/two.jpg", "title": "Two" },
    { "id": 3, "img": "images/three.jpg" }
]"#;

#[test]
fn test_mixed_id_types_and_image_alias() {
    let catalog = LevelCatalog::from_json(CATALOG).expect("valid catalog");

    assert_eq!(catalog.ids(), vec![LevelId::from("1"), LevelId::from("two"), LevelId::from("3")]);
    let two = catalog.get(&LevelId::from("two")).expect("level two");
    assert_eq!(two.image(), "images/two.jpg");
    assert_eq!(catalog.get(&LevelId::from("3")).expect("level three").title(), "");
}

#[test]
fn test_from_file() {
    let mut file = NamedTempFile::new().expect("Failed to create temp file");
    file.write_all(CATALOG.as_bytes()).expect("write");

    let catalog = LevelCatalog::from_file(file.path()).expect("valid catalog");
    assert_eq!(catalog.len(), 3);
    assert_eq!(catalog.position(&LevelId::from("3")), Some(2));
}

#[test]
fn test_bad_catalogs_rejected() {
    assert!(LevelCatalog::from_json("{").is_err());
    assert!(LevelCatalog::from_json(r#"[{ "id": 1 }]"#).is_err());
    assert!(LevelCatalog::from_json(r#"[{ "id": 1, "img": "a" }, { "id": "1", "img": "b" }]"#).is_err());
    assert!(LevelCatalog::from_file("/nonexistent/levels.json").is_err());
}

#[test]
fn test_gallery_and_resume_point() {
    let catalog = LevelCatalog::from_json(CATALOG).expect("valid catalog");
    let mut records = RecordStore::in_memory();
    records.compare_and_store(&LevelId::from("1"), 61, 9);

    let gallery = Gallery::build(&catalog, &records);
    let badges: Vec<String> = gallery.entries().iter().map(|entry| entry.badge()).collect();
    assert_eq!(badges, vec!["✓", "2", "3"]);
    assert!(gallery.to_string().contains("01:01"));

    let ids = catalog.ids();
    assert_eq!(records.first_incomplete_level(&ids), Some(&LevelId::from("two")));

    // Custom play keeps its own record without touching catalog levels.
    records.compare_and_store(&LevelId::custom(), 10, 3);
    assert_eq!(Gallery::build(&catalog, &records).completed(), 1);
    assert_eq!(catalog.next_after(&LevelId::custom()).map(|level| level.id().clone()), Some(LevelId::from("1")));
}
