//! Shared harness: a migrated file-backed store with seeded users

#![allow(dead_code)]

use rust_decimal::Decimal;
use sajilo_core::application::{
    ExternalIdentity, IdentityMetadata, ItemService, NewItem, NotificationService,
    PersistedNotificationSink, PickupRequestService, UserService,
};
use sajilo_core::domain::UserRole;
use sajilo_core::port::id_provider::mocks::SequentialIdProvider;
use sajilo_core::port::time_provider::mocks::FixedTimeProvider;
use sajilo_core::port::{IdProvider, NotificationSink, Repositories, TimeProvider};
use sajilo_infra_sqlite::{create_pool, run_migrations, SqliteStore};
use std::sync::Arc;
use tempfile::TempDir;

pub const CUSTOMER: &str = "user_sita";
pub const OTHER_CUSTOMER: &str = "user_hari";
pub const DEALER_A: &str = "user_dealer_a";
pub const DEALER_B: &str = "user_dealer_b";
pub const RIDER: &str = "user_rider";

/// 2025-10-09T08:53:20Z
pub const NOW_MS: i64 = 1_760_000_000_000;

pub struct Marketplace {
    pub repos: Repositories,
    pub users: UserService,
    pub items: ItemService,
    pub pickups: PickupRequestService,
    pub notifications: NotificationService,
    pub clock: Arc<FixedTimeProvider>,
    _dir: TempDir,
}

pub fn identity(
    id: &str,
    email: &str,
    first: &str,
    last: &str,
    role: Option<UserRole>,
) -> ExternalIdentity {
    ExternalIdentity {
        id: id.to_string(),
        primary_email: Some(email.to_string()),
        first_name: Some(first.to_string()),
        last_name: Some(last.to_string()),
        metadata: IdentityMetadata {
            role,
            ..Default::default()
        },
        ..Default::default()
    }
}

impl Marketplace {
    /// Empty store, no users
    pub async fn empty() -> Self {
        let dir = TempDir::new().unwrap();
        let url = format!("sqlite://{}", dir.path().join("sajilo.db").display());

        let pool = create_pool(&url).await.unwrap();
        run_migrations(&pool).await.unwrap();

        let clock = Arc::new(FixedTimeProvider::new(NOW_MS));
        let time_provider: Arc<dyn TimeProvider> = clock.clone();
        let id_provider: Arc<dyn IdProvider> = Arc::new(SequentialIdProvider::new());

        let repos = SqliteStore::repositories(pool, time_provider.clone());
        Self::wire(repos, id_provider, time_provider, clock, dir)
    }

    /// Store with one user per role plus a second customer and dealer
    pub async fn seeded() -> Self {
        let market = Self::empty().await;
        for identity in [
            identity(CUSTOMER, "sita@example.com", "Sita", "Sharma", None),
            identity(OTHER_CUSTOMER, "hari@example.com", "Hari", "Thapa", None),
            identity(DEALER_A, "a@dealers.example.com", "Ram", "Karki", Some(UserRole::Dealer)),
            identity(DEALER_B, "b@dealers.example.com", "Gita", "Rai", Some(UserRole::Dealer)),
            identity(RIDER, "rider@example.com", "Bikash", "Lama", Some(UserRole::Rider)),
        ] {
            market.users.sync_user_to_database(&identity).await.unwrap();
        }
        market
    }

    fn wire(
        repos: Repositories,
        id_provider: Arc<dyn IdProvider>,
        time_provider: Arc<dyn TimeProvider>,
        clock: Arc<FixedTimeProvider>,
        dir: TempDir,
    ) -> Self {
        let notifier: Arc<dyn NotificationSink> = Arc::new(PersistedNotificationSink::new(
            repos.notifications.clone(),
            id_provider.clone(),
            time_provider.clone(),
        ));

        Self {
            users: UserService::new(repos.users.clone()),
            items: ItemService::new(
                &repos,
                notifier.clone(),
                id_provider.clone(),
                time_provider.clone(),
            ),
            pickups: PickupRequestService::new(&repos, notifier, id_provider, time_provider),
            notifications: NotificationService::new(repos.notifications.clone()),
            repos,
            clock,
            _dir: dir,
        }
    }
}

pub fn plastic_bottles() -> NewItem {
    NewItem {
        title: "Plastic bottles".to_string(),
        description: "Two sacks of PET bottles".to_string(),
        price: Decimal::new(50, 0),
        location_lat: 27.7172,
        location_lng: 85.324,
        category: Some("plastic".to_string()),
        quantity: Some("2 sacks".to_string()),
        image_url: None,
    }
}
