//! Aggregate reports and delete policies across repositories
//!
//! Run with: cargo test --package insight-storage --test reports

mod common;

use common::{World, date, range, reais};
use insight_core::{Money, Rating};
use insight_storage::repositories::{
    AddressRepository, ClientRepository, OwnerRepository, PropertyRepository, RentalRepository,
    ReviewRepository,
};

#[tokio::test]
async fn test_revenue_sums_contained_rentals_across_properties() {
    let world = World::in_memory().await;
    let flat = world.property("Apartamento").await;
    let house = world.property("Casa").await;
    let maria = world.client("Maria").await;

    world.rent(&maria, &flat, "2024-01-10", "2024-01-15", 1500).await;
    world.rent(&maria, &house, "2024-01-01", "2024-01-31", 3000).await;
    world.rent(&maria, &house, "2023-12-28", "2024-01-02", 800).await;

    let january = world
        .rentals
        .get_revenue_by_period(range("2024-01-01", "2024-01-31"))
        .await
        .unwrap();
    assert_eq!(january, reais(4500));

    let empty = world
        .rentals
        .get_revenue_by_period(range("2025-01-01", "2025-01-31"))
        .await
        .unwrap();
    assert_eq!(empty, Money::ZERO);
    assert_eq!(empty.to_string(), "0.00");
}

#[tokio::test]
async fn test_most_frequent_clients_ranking() {
    let world = World::in_memory().await;
    let flat = world.property("Apartamento").await;
    let ana = world.client("Ana").await;
    let bia = world.client("Bia").await;
    let caio = world.client("Caio").await;
    world.client("Sem aluguel").await;

    for (month, client) in [(1, &bia), (2, &bia), (3, &bia), (4, &ana), (5, &caio), (6, &ana)] {
        let start = format!("2024-{month:02}-01");
        let end = format!("2024-{month:02}-05");
        world.rent(client, &flat, &start, &end, 100).await;
    }

    let ranking = world.rentals.get_most_frequent_clients(10).await.unwrap();
    let counts: Vec<_> = ranking
        .iter()
        .map(|entry| (entry.client.nome.as_str(), entry.rental_count))
        .collect();
    assert_eq!(counts, [("Bia", 3), ("Ana", 2), ("Caio", 1)]);

    let top = world.rentals.get_most_frequent_clients(1).await.unwrap();
    assert_eq!(top.len(), 1);
    assert_eq!(top[0].client, bia);
}

#[tokio::test]
async fn test_most_frequent_clients_ties_ordered_by_id() {
    let world = World::in_memory().await;
    let flat = world.property("Apartamento").await;
    let a = world.client("A").await;
    let b = world.client("B").await;
    world.rent(&a, &flat, "2024-01-01", "2024-01-02", 100).await;
    world.rent(&b, &flat, "2024-02-01", "2024-02-02", 100).await;

    let mut expected = vec![a.id.clone(), b.id.clone()];
    expected.sort();

    let ranking = world.rentals.get_most_frequent_clients(10).await.unwrap();
    let ids: Vec<_> = ranking.into_iter().map(|entry| entry.client.id).collect();
    assert_eq!(ids, expected);
}

#[tokio::test]
async fn test_highest_rated_excludes_perfect_score_with_two_reviews() {
    let world = World::in_memory().await;
    let perfect = world.property("Chalé").await;
    let decent = world.property("Casa").await;
    let maria = world.client("Maria").await;

    world.review(&maria, &perfect, 5).await;
    world.review(&maria, &perfect, 5).await;
    for nota in [3, 4, 2] {
        world.review(&maria, &decent, nota).await;
    }

    let ranking = world.reviews.get_highest_rated_properties(10).await.unwrap();
    assert_eq!(ranking.len(), 1);
    assert_eq!(ranking[0].property.id, decent.id);
    assert_eq!(ranking[0].average_rating, 3.0);

    // A third review makes it eligible, and it now leads
    world.review(&maria, &perfect, 5).await;
    let ranking = world.reviews.get_highest_rated_properties(10).await.unwrap();
    assert_eq!(ranking.len(), 2);
    assert_eq!(ranking[0].property.id, perfect.id);
}

#[tokio::test]
async fn test_ratings_summary_for_property_without_reviews() {
    let world = World::in_memory().await;
    let property = world.property("Apartamento").await;

    let summary = world.reviews.get_ratings_summary(&property.id).await.unwrap();
    assert!(summary.is_empty());
    for rating in Rating::all() {
        assert_eq!(summary.count(rating), 0);
    }

    let json = serde_json::to_value(summary).unwrap();
    assert_eq!(
        json,
        serde_json::json!({"1": 0, "2": 0, "3": 0, "4": 0, "5": 0})
    );
}

#[tokio::test]
async fn test_deleting_client_cascades_to_rentals_and_reviews() {
    let world = World::in_memory().await;
    let property = world.property("Apartamento").await;
    let maria = world.client("Maria").await;
    let pedro = world.client("Pedro").await;

    world.rent(&maria, &property, "2024-01-10", "2024-01-15", 100).await;
    world.review(&maria, &property, 5).await;
    world.rent(&pedro, &property, "2024-02-10", "2024-02-15", 100).await;

    assert!(world.clients.delete(&maria.id).await.unwrap());

    assert_eq!(world.count("alugueis").await, 1);
    assert_eq!(world.count("avaliacoes").await, 0);
    assert!(world.rentals.get_by_client(&maria.id).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_deleting_owner_cascades_to_properties() {
    let world = World::in_memory().await;
    let property = world.property("Apartamento").await;
    let maria = world.client("Maria").await;
    world.rent(&maria, &property, "2024-01-10", "2024-01-15", 100).await;

    assert!(world.owners.delete(&world.owner.id).await.unwrap());

    assert!(world.properties.get_by_id(&property.id).await.unwrap().is_none());
    assert_eq!(world.count("alugueis").await, 0);
    // The address is independent of the owner
    assert!(world.addresses.get_by_id(&world.address.id).await.unwrap().is_some());
}

#[tokio::test]
async fn test_property_delete_policy() {
    let world = World::in_memory().await;
    let rented = world.property("Apartamento").await;
    let idle = world.property("Casa").await;
    let maria = world.client("Maria").await;
    world.rent(&maria, &rented, "2024-01-10", "2024-01-15", 100).await;

    assert!(world.properties.delete(&rented.id).await.unwrap());
    assert!(world.properties.delete(&idle.id).await.unwrap());

    let rented_after = world.properties.get_by_id(&rented.id).await.unwrap().unwrap();
    assert!(!rented_after.ativo);
    assert!(world.properties.get_by_id(&idle.id).await.unwrap().is_none());

    // Rental history of the deactivated property stays reportable
    let revenue = world
        .rentals
        .get_revenue_by_period(range("2024-01-01", "2024-01-31"))
        .await
        .unwrap();
    assert_eq!(revenue, reais(100));
}

#[tokio::test]
async fn test_address_delete_refused_while_in_use() {
    let world = World::in_memory().await;
    let property = world.property("Apartamento").await;

    assert!(!world.addresses.delete(&world.address.id).await.unwrap());

    // Still refused while the property is only deactivated
    let maria = world.client("Maria").await;
    world.rent(&maria, &property, "2024-01-10", "2024-01-15", 100).await;
    world.properties.delete(&property.id).await.unwrap();
    assert!(!world.addresses.delete(&world.address.id).await.unwrap());
    assert!(world.addresses.get_by_id(&world.address.id).await.unwrap().is_some());
}

#[tokio::test]
async fn test_delete_nonexistent_returns_false_everywhere() {
    let world = World::in_memory().await;

    assert!(!world.owners.delete("missing").await.unwrap());
    assert!(!world.clients.delete("missing").await.unwrap());
    assert!(!world.addresses.delete("missing").await.unwrap());
    assert!(!world.properties.delete("missing").await.unwrap());
    assert!(!world.rentals.delete("missing").await.unwrap());
    assert!(!world.reviews.delete("missing").await.unwrap());
}

#[tokio::test]
async fn test_active_rentals_today_defaults_to_current_date() {
    let world = World::in_memory().await;
    let property = world.property("Apartamento").await;
    let maria = world.client("Maria").await;
    world.rent(&maria, &property, "2000-01-01", "2000-01-02", 100).await;

    assert!(world.rentals.get_active_rentals(None).await.unwrap().is_empty());
    let then = world
        .rentals
        .get_active_rentals(Some(date("2000-01-02")))
        .await
        .unwrap();
    assert_eq!(then.len(), 1);
}
