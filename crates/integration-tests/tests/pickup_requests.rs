//! Pickup request flow against the SQLite gateway
//!
//! pending -> offered -> accepted -> assigned -> completed

mod common;

use chrono::{NaiveDate, NaiveTime};
use common::*;
use rust_decimal::Decimal;
use sajilo_core::application::NewPickupRequest;
use sajilo_core::domain::{Actor, NotificationKind, PickupStatus};
use sajilo_core::error::AppError;
use std::collections::{BTreeMap, BTreeSet};

fn household_pickup() -> NewPickupRequest {
    NewPickupRequest {
        selected_items: BTreeSet::from(["paper".to_string(), "plastic".to_string()]),
        quantities: BTreeMap::from([("plastic".to_string(), 2)]),
        pickup_date: NaiveDate::from_ymd_opt(2030, 1, 15).unwrap(),
        pickup_time: NaiveTime::from_hms_opt(10, 30, 0).unwrap(),
        location: "Baneshwor, Kathmandu".to_string(),
        images: vec!["https://img.example.com/sacks.jpg".to_string()],
    }
}

#[tokio::test]
async fn test_offer_flow_keeps_offered_price() {
    let market = Marketplace::seeded().await;
    let customer = Actor::customer(CUSTOMER);
    let dealer_a = Actor::dealer(DEALER_A);
    let rider = Actor::rider(RIDER);
    let price = Decimal::new(45050, 2);

    let request = market
        .pickups
        .create_pickup_request(&customer, household_pickup())
        .await
        .unwrap();
    assert_eq!(request.status, PickupStatus::Pending);
    assert!(request.offered_price.is_none());

    let pending = market.pickups.get_pending_pickup_requests().await.unwrap();
    assert_eq!(pending.len(), 1);
    assert_eq!(pending[0].requester_name.as_deref(), Some("Sita Sharma"));
    assert_eq!(pending[0].request.quantities.get("plastic"), Some(&2));

    let offered = market
        .pickups
        .make_offer(&dealer_a, &request.id, price)
        .await
        .unwrap();
    assert_eq!(offered.status, PickupStatus::Offered);
    assert_eq!(offered.dealer_id.as_deref(), Some(DEALER_A));
    assert_eq!(offered.offered_price, Some(price));
    assert!(market
        .pickups
        .get_pending_pickup_requests()
        .await
        .unwrap()
        .is_empty());

    let accepted = market
        .pickups
        .accept_offer(&customer, &request.id)
        .await
        .unwrap();
    assert_eq!(accepted.status, PickupStatus::Accepted);

    let assigned = market
        .pickups
        .assign_rider(&dealer_a, &request.id, RIDER)
        .await
        .unwrap();
    assert_eq!(assigned.status, PickupStatus::Assigned);
    assert_eq!(assigned.rider_id.as_deref(), Some(RIDER));

    let for_rider = market
        .pickups
        .get_pickup_requests_for_rider(&rider)
        .await
        .unwrap();
    assert_eq!(for_rider.len(), 1);

    let done = market.pickups.complete(&rider, &request.id).await.unwrap();
    assert_eq!(done.status, PickupStatus::Completed);
    assert_eq!(done.offered_price, Some(price));
    assert_eq!(done.selected_items, request.selected_items);
    assert_eq!(done.images, request.images);

    let dealer_inbox = market.notifications.list(&dealer_a).await.unwrap();
    assert!(dealer_inbox
        .iter()
        .any(|n| n.kind == NotificationKind::OfferAccepted));
    let customer_inbox = market.notifications.list(&customer).await.unwrap();
    for kind in [
        NotificationKind::OfferReceived,
        NotificationKind::PickupAssigned,
        NotificationKind::PickupCompleted,
    ] {
        assert!(
            customer_inbox.iter().any(|n| n.kind == kind),
            "customer missing {kind}"
        );
    }
}

#[tokio::test]
async fn test_second_offer_conflicts() {
    let market = Marketplace::seeded().await;
    let request = market
        .pickups
        .create_pickup_request(&Actor::customer(CUSTOMER), household_pickup())
        .await
        .unwrap();

    market
        .pickups
        .make_offer(&Actor::dealer(DEALER_A), &request.id, Decimal::new(300, 0))
        .await
        .unwrap();
    let err = market
        .pickups
        .make_offer(&Actor::dealer(DEALER_B), &request.id, Decimal::new(350, 0))
        .await
        .unwrap_err();
    assert!(err.is_conflict(), "got {err}");

    let stored = market.pickups.get_pickup_request(&request.id).await.unwrap();
    assert_eq!(stored.dealer_id.as_deref(), Some(DEALER_A));
    assert_eq!(stored.offered_price, Some(Decimal::new(300, 0)));
}

#[tokio::test]
async fn test_only_requester_accepts_offer() {
    let market = Marketplace::seeded().await;
    let request = market
        .pickups
        .create_pickup_request(&Actor::customer(CUSTOMER), household_pickup())
        .await
        .unwrap();
    market
        .pickups
        .make_offer(&Actor::dealer(DEALER_A), &request.id, Decimal::new(300, 0))
        .await
        .unwrap();

    let err = market
        .pickups
        .accept_offer(&Actor::customer(OTHER_CUSTOMER), &request.id)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Forbidden(_)), "got {err}");

    let stored = market.pickups.get_pickup_request(&request.id).await.unwrap();
    assert_eq!(stored.status, PickupStatus::Offered);
}

#[tokio::test]
async fn test_accept_before_offer_is_rejected() {
    let market = Marketplace::seeded().await;
    let request = market
        .pickups
        .create_pickup_request(&Actor::customer(CUSTOMER), household_pickup())
        .await
        .unwrap();

    let err = market
        .pickups
        .accept_offer(&Actor::customer(CUSTOMER), &request.id)
        .await
        .unwrap_err();
    assert!(err.is_conflict(), "got {err}");
}

#[tokio::test]
async fn test_invalid_requests_never_persisted() {
    let market = Marketplace::seeded().await;
    let customer = Actor::customer(CUSTOMER);

    let mut past = household_pickup();
    past.pickup_date = NaiveDate::from_ymd_opt(2020, 1, 1).unwrap();

    let mut nothing_selected = household_pickup();
    nothing_selected.selected_items.clear();
    nothing_selected.quantities.clear();

    for req in [past, nothing_selected] {
        let err = market
            .pickups
            .create_pickup_request(&customer, req)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)), "got {err}");
    }

    let err = market
        .pickups
        .make_offer(&Actor::dealer(DEALER_A), "pickup_missing", Decimal::new(-1, 0))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Validation(_)), "got {err}");

    assert!(market
        .pickups
        .get_pickup_requests_by_user(CUSTOMER)
        .await
        .unwrap()
        .is_empty());
}
