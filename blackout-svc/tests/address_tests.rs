//! Address search and district listing against the fixture registry

mod helpers;

use blackout_svc::services::{AddressResolver, BuildingLocator};
use helpers::TestRegistry;

#[tokio::test]
async fn test_street_and_number_tokens() {
    let registry = TestRegistry::new().await;
    let resolver = AddressResolver::new(registry.db.clone());

    let hits = resolver.search(Some("светланская 1")).await.unwrap();
    let numbers: Vec<&str> = hits.iter().map(|h| h.building.as_str()).collect();

    assert_eq!(numbers, vec!["118А", "12"]);
    assert!(hits.iter().all(|h| h.street == "Светланская ул."));
    assert_eq!(hits[0].building_id, "b-main");
}

#[tokio::test]
async fn test_case_insensitive_cyrillic() {
    let registry = TestRegistry::new().await;
    let resolver = AddressResolver::new(registry.db.clone());

    let hits = resolver.search(Some("АЛЕУТСКАЯ 25")).await.unwrap();

    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].building_id, "b-near");
}

#[tokio::test]
async fn test_blank_input_returns_whole_corpus_in_order() {
    let registry = TestRegistry::new().await;
    let resolver = AddressResolver::new(registry.db.clone());

    let all = resolver.search(None).await.unwrap();
    let blank = resolver.search(Some("   ")).await.unwrap();

    let ids: Vec<&str> = all.iter().map(|h| h.building_id.as_str()).collect();
    assert_eq!(
        ids,
        vec!["b-near", "b-quiet", "b-near2", "b-twin", "b-main", "b-nocoords", "b-far"]
    );
    assert_eq!(all, blank);
}

#[tokio::test]
async fn test_no_match_is_empty_not_error() {
    let registry = TestRegistry::new().await;
    let resolver = AddressResolver::new(registry.db.clone());

    assert!(resolver.search(Some("несуществующая")).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_search_is_repeatable() {
    let registry = TestRegistry::new().await;
    let resolver = AddressResolver::new(registry.db.clone());

    let first = resolver.search(Some("ул")).await.unwrap();
    let second = resolver.search(Some("ул")).await.unwrap();
    assert_eq!(first, second);
}

#[tokio::test]
async fn test_districts_union_all_levels() {
    let registry = TestRegistry::new().await;
    let resolver = AddressResolver::new(registry.db.clone());

    let names: Vec<String> = resolver
        .districts()
        .await
        .unwrap()
        .into_iter()
        .map(|d| d.name)
        .collect();

    assert_eq!(
        names,
        vec!["Ленинский", "Первореченский", "Центр", "Центральный"]
    );
}

#[tokio::test]
async fn test_locate_resolves_reference_names() {
    let registry = TestRegistry::new().await;
    let locator = BuildingLocator::new(registry.db.clone());

    let building = locator.locate("b-main").await.unwrap().unwrap();

    assert_eq!(building.number, "118А");
    assert_eq!(building.street.as_deref(), Some("Светланская ул."));
    assert_eq!(building.district.as_deref(), Some("Ленинский"));
    assert_eq!(building.folk_district.as_deref(), Some("Центр"));
    assert_eq!(building.big_folk_district.as_deref(), Some("Центральный"));
    assert_eq!(building.city.as_deref(), Some("Владивосток"));
    let coords = building.coordinates.unwrap();
    assert!((coords.latitude - 43.100).abs() < 1e-9);
    assert!((coords.longitude - 131.900).abs() < 1e-9);
}

#[tokio::test]
async fn test_locate_missing_coordinates_and_unknown_id() {
    let registry = TestRegistry::new().await;
    let locator = BuildingLocator::new(registry.db.clone());

    let building = locator.locate("b-nocoords").await.unwrap().unwrap();
    assert!(building.coordinates.is_none());
    assert!(building.district.is_none());

    assert!(locator.locate("b-missing").await.unwrap().is_none());
}
