//! Item lifecycle against the SQLite gateway
//!
//! available -> accepted -> (rider assigned) -> picked_up -> completed,
//! with the transaction row following the item at every step.

mod common;

use common::*;
use rust_decimal::Decimal;
use sajilo_core::domain::{Actor, ItemStatus, NotificationKind};
use sajilo_core::error::AppError;
use sajilo_core::port::TransactionRepository;
use std::collections::HashSet;

#[tokio::test]
async fn test_full_item_lifecycle() {
    let market = Marketplace::seeded().await;
    let customer = Actor::customer(CUSTOMER);
    let dealer_a = Actor::dealer(DEALER_A);
    let dealer_b = Actor::dealer(DEALER_B);
    let rider = Actor::rider(RIDER);

    // Customer posts
    let item = market
        .items
        .create_new_item(&customer, plastic_bottles())
        .await
        .unwrap();
    assert_eq!(item.status, ItemStatus::Available);
    assert_eq!(item.price, Decimal::new(50, 0));

    let listings = market.items.get_available_items().await.unwrap();
    assert_eq!(listings.len(), 1);
    assert_eq!(listings[0].item.id, item.id);
    assert_eq!(listings[0].poster_name.as_deref(), Some("Sita Sharma"));

    // Dealer A wins, dealer B is turned away
    let accepted = market
        .items
        .accept_item_by_dealer(&dealer_a, &item.id)
        .await
        .unwrap();
    assert_eq!(accepted.item.status, ItemStatus::Accepted);
    assert_eq!(accepted.item.dealer_id.as_deref(), Some(DEALER_A));
    assert_eq!(accepted.transaction.amount, Decimal::new(50, 0));
    assert_eq!(accepted.transaction.customer_id, CUSTOMER);
    assert_eq!(accepted.transaction.dealer_id, DEALER_A);

    let err = market
        .items
        .accept_item_by_dealer(&dealer_b, &item.id)
        .await
        .unwrap_err();
    assert!(err.is_conflict(), "expected conflict, got {err}");

    let after = market.items.get_item(&item.id).await.unwrap();
    assert_eq!(after.dealer_id.as_deref(), Some(DEALER_A));
    assert!(market.items.get_available_items().await.unwrap().is_empty());

    // Rider flow
    let assigned = market
        .items
        .assign_rider_to_item(&dealer_a, &item.id, RIDER)
        .await
        .unwrap();
    assert_eq!(assigned.status, ItemStatus::Accepted);
    assert_eq!(assigned.rider_id.as_deref(), Some(RIDER));

    let picked = market.items.pickup_item(&rider, &item.id).await.unwrap();
    assert_eq!(picked.status, ItemStatus::PickedUp);

    let done = market.items.complete_item(&rider, &item.id).await.unwrap();
    assert_eq!(done.status, ItemStatus::Completed);

    // Transaction mirrors the item
    let transaction = market
        .repos
        .transactions
        .get_transaction_for_item(&item.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(transaction.id, accepted.transaction.id);
    assert_eq!(transaction.status, ItemStatus::Completed);
    assert_eq!(transaction.rider_id.as_deref(), Some(RIDER));

    for actor in [&customer, &dealer_a, &rider] {
        let visible = market.items.get_transactions(actor).await.unwrap();
        assert_eq!(visible.len(), 1, "{} should see the transaction", actor.user_id);
    }
    assert!(market.items.get_transactions(&dealer_b).await.unwrap().is_empty());

    // Customer heard about every step
    let inbox = market.notifications.list(&customer).await.unwrap();
    let kinds: HashSet<_> = inbox.iter().map(|n| n.kind).collect();
    assert_eq!(
        kinds,
        HashSet::from([
            NotificationKind::ItemAccepted,
            NotificationKind::RiderAssigned,
            NotificationKind::ItemPickedUp,
            NotificationKind::ItemCompleted,
        ])
    );
    assert!(inbox.iter().all(|n| n.related_id.as_deref() == Some(item.id.as_str())));
    assert_eq!(
        market.notifications.unread_count(&customer).await.unwrap(),
        inbox.len() as i64
    );
}

#[tokio::test]
async fn test_created_item_is_listed_for_its_owner() {
    let market = Marketplace::seeded().await;
    let customer = Actor::customer(CUSTOMER);

    let item = market
        .items
        .create_new_item(&customer, plastic_bottles())
        .await
        .unwrap();

    let mine = market.items.get_items_by_user(CUSTOMER).await.unwrap();
    assert_eq!(mine.len(), 1);
    assert_eq!(mine[0], item);
    assert!(market
        .items
        .get_items_by_user(OTHER_CUSTOMER)
        .await
        .unwrap()
        .is_empty());
}

#[tokio::test]
async fn test_newest_items_listed_first() {
    let market = Marketplace::seeded().await;
    let customer = Actor::customer(CUSTOMER);

    let mut ids = Vec::new();
    for title in ["Cardboard", "Glass jars", "Scrap copper"] {
        let mut req = plastic_bottles();
        req.title = title.to_string();
        ids.push(market.items.create_new_item(&customer, req).await.unwrap().id);
        market.clock.advance(1_000);
    }
    ids.reverse();

    let listed: Vec<_> = market
        .items
        .get_available_items()
        .await
        .unwrap()
        .into_iter()
        .map(|l| l.item.id)
        .collect();
    assert_eq!(listed, ids);
}

#[tokio::test]
async fn test_non_positive_price_never_persisted() {
    let market = Marketplace::seeded().await;
    let customer = Actor::customer(CUSTOMER);

    for price in [Decimal::new(-5, 0), Decimal::ZERO] {
        let mut req = plastic_bottles();
        req.price = price;
        let err = market
            .items
            .create_new_item(&customer, req)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)), "got {err}");
    }

    assert!(market.items.get_items_by_user(CUSTOMER).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_illegal_jump_rejected_and_item_unchanged() {
    let market = Marketplace::seeded().await;
    let item = market
        .items
        .create_new_item(&Actor::customer(CUSTOMER), plastic_bottles())
        .await
        .unwrap();

    let err = market
        .items
        .update_item_status(&Actor::rider(RIDER), &item.id, ItemStatus::Completed)
        .await
        .unwrap_err();
    assert!(err.is_conflict(), "got {err}");

    let err = market
        .items
        .update_item_status(&Actor::dealer(DEALER_A), &item.id, ItemStatus::Available)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Validation(_)), "got {err}");

    let stored = market.items.get_item(&item.id).await.unwrap();
    assert_eq!(stored.status, ItemStatus::Available);
    assert_eq!(stored.updated_at, item.updated_at);
}

#[tokio::test]
async fn test_pickup_requires_assigned_rider() {
    let market = Marketplace::seeded().await;
    let item = market
        .items
        .create_new_item(&Actor::customer(CUSTOMER), plastic_bottles())
        .await
        .unwrap();
    market
        .items
        .accept_item_by_dealer(&Actor::dealer(DEALER_A), &item.id)
        .await
        .unwrap();

    let err = market
        .items
        .pickup_item(&Actor::rider(RIDER), &item.id)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::InvalidState(_)), "got {err}");
    assert_eq!(
        market.items.get_item(&item.id).await.unwrap().status,
        ItemStatus::Accepted
    );
}

#[tokio::test]
async fn test_only_owning_dealer_assigns_rider() {
    let market = Marketplace::seeded().await;
    let item = market
        .items
        .create_new_item(&Actor::customer(CUSTOMER), plastic_bottles())
        .await
        .unwrap();
    market
        .items
        .accept_item_by_dealer(&Actor::dealer(DEALER_A), &item.id)
        .await
        .unwrap();

    let err = market
        .items
        .assign_rider_to_item(&Actor::dealer(DEALER_B), &item.id, RIDER)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Forbidden(_)), "got {err}");

    // Assigning a non-rider is a validation error
    let err = market
        .items
        .assign_rider_to_item(&Actor::dealer(DEALER_A), &item.id, OTHER_CUSTOMER)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Validation(_)), "got {err}");

    assert!(market.items.get_item(&item.id).await.unwrap().rider_id.is_none());
}

#[tokio::test]
async fn test_accept_missing_item_is_not_found() {
    let market = Marketplace::seeded().await;
    let err = market
        .items
        .accept_item_by_dealer(&Actor::dealer(DEALER_A), "item_missing")
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)), "got {err}");
}
