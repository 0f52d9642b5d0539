//! User sync, notification inbox, and the unconfigured store

mod common;

use common::*;
use rust_decimal::Decimal;
use sajilo_core::application::{
    ExternalIdentity, ItemService, NotificationService, PersistedNotificationSink,
    PickupRequestService, UserService,
};
use sajilo_core::domain::{Actor, UserRole};
use sajilo_core::error::{AppError, DATABASE_NOT_CONFIGURED};
use sajilo_core::port::id_provider::mocks::SequentialIdProvider;
use sajilo_core::port::time_provider::mocks::FixedTimeProvider;
use sajilo_core::port::{NotificationSink, Repositories};
use std::sync::Arc;
use tokio_test::{assert_err, assert_ok};

#[tokio::test]
async fn test_sync_defaults_role_and_keeps_it_on_resync() {
    let market = Marketplace::empty().await;

    let user = market
        .users
        .sync_user_to_database(&identity(CUSTOMER, "sita@example.com", "Sita", "Sharma", None))
        .await
        .unwrap();
    assert_eq!(user.role, UserRole::Customer);
    assert_eq!(user.display_name(), "Sita Sharma");

    let promoted = market
        .users
        .update_user_role_in_database(CUSTOMER, UserRole::Dealer)
        .await
        .unwrap();
    assert_eq!(promoted.role, UserRole::Dealer);

    // A later sign-in without role metadata refreshes the name only
    market.clock.advance(60_000);
    let resynced = market
        .users
        .sync_user_to_database(&identity(CUSTOMER, "sita@example.com", "Sita", "Shrestha", None))
        .await
        .unwrap();
    assert_eq!(resynced.role, UserRole::Dealer);
    assert_eq!(resynced.last_name.as_deref(), Some("Shrestha"));
    assert_eq!(resynced.created_at, user.created_at);
    assert!(resynced.updated_at > user.updated_at);
}

#[tokio::test]
async fn test_sync_falls_back_to_secondary_email() {
    let market = Marketplace::empty().await;
    let identity = ExternalIdentity {
        id: "user_no_primary".to_string(),
        email_addresses: vec!["  ".to_string(), "backup@example.com".to_string()],
        ..Default::default()
    };

    let user = market.users.sync_user_to_database(&identity).await.unwrap();
    assert_eq!(user.email, "backup@example.com");
    assert_eq!(user.display_name(), "backup@example.com");
}

#[tokio::test]
async fn test_riders_listing() {
    let market = Marketplace::seeded().await;
    let riders = market.users.get_riders().await.unwrap();
    assert_eq!(riders.len(), 1);
    assert_eq!(riders[0].id, RIDER);

    assert!(market.users.get_user_from_database("user_unknown").await.unwrap().is_none());
    let err = market
        .users
        .update_user_role_in_database("user_unknown", UserRole::Rider)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)), "got {err}");
}

#[tokio::test]
async fn test_mark_as_read_is_idempotent() {
    let market = Marketplace::seeded().await;
    let customer = Actor::customer(CUSTOMER);

    // Two accepted items give the customer two notifications
    for _ in 0..2 {
        let item = market
            .items
            .create_new_item(&customer, plastic_bottles())
            .await
            .unwrap();
        market
            .items
            .accept_item_by_dealer(&Actor::dealer(DEALER_A), &item.id)
            .await
            .unwrap();
    }
    assert_eq!(market.notifications.unread_count(&customer).await.unwrap(), 2);

    let first = market.notifications.list(&customer).await.unwrap()[0].clone();
    for _ in 0..2 {
        let read = assert_ok!(market.notifications.mark_as_read(&customer, &first.id).await);
        assert!(read.is_read);
    }
    assert_eq!(market.notifications.unread_count(&customer).await.unwrap(), 1);

    // Another user's notification is off limits
    let err = assert_err!(
        market
            .notifications
            .mark_as_read(&Actor::customer(OTHER_CUSTOMER), &first.id)
            .await
    );
    assert!(matches!(err, AppError::Forbidden(_)), "got {err}");

    assert_eq!(market.notifications.mark_all_as_read(&customer).await.unwrap(), 1);
    assert_eq!(market.notifications.mark_all_as_read(&customer).await.unwrap(), 0);
    assert_eq!(market.notifications.unread_count(&customer).await.unwrap(), 0);
}

fn unconfigured_services() -> (UserService, ItemService, PickupRequestService, NotificationService) {
    let repos = Repositories::unconfigured();
    let ids = Arc::new(SequentialIdProvider::new());
    let clock = Arc::new(FixedTimeProvider::new(NOW_MS));
    let notifier: Arc<dyn NotificationSink> = Arc::new(PersistedNotificationSink::new(
        repos.notifications.clone(),
        ids.clone(),
        clock.clone(),
    ));

    (
        UserService::new(repos.users.clone()),
        ItemService::new(&repos, notifier.clone(), ids.clone(), clock.clone()),
        PickupRequestService::new(&repos, notifier, ids, clock),
        NotificationService::new(repos.notifications.clone()),
    )
}

fn assert_not_configured<T: std::fmt::Debug>(result: Result<T, AppError>) {
    match result {
        Err(AppError::Config(msg)) => assert_eq!(msg, DATABASE_NOT_CONFIGURED),
        other => panic!("expected not-configured error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_unconfigured_store_fails_every_call() {
    let (users, items, pickups, notifications) = unconfigured_services();
    let customer = Actor::customer(CUSTOMER);

    assert_not_configured(
        users
            .sync_user_to_database(&identity(CUSTOMER, "sita@example.com", "Sita", "Sharma", None))
            .await,
    );
    assert_not_configured(users.get_riders().await);
    assert_not_configured(items.create_new_item(&customer, plastic_bottles()).await);
    assert_not_configured(items.get_available_items().await);
    assert_not_configured(
        items
            .accept_item_by_dealer(&Actor::dealer(DEALER_A), "item_1")
            .await,
    );
    assert_not_configured(pickups.get_pending_pickup_requests().await);
    assert_not_configured(
        pickups
            .make_offer(&Actor::dealer(DEALER_A), "pickup_1", Decimal::new(10, 0))
            .await,
    );
    assert_not_configured(notifications.unread_count(&customer).await);
}
