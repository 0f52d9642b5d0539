//! Unit tests for item validation

#[cfg(test)]
mod tests {
    use super::super::create::validate_request;
    use super::super::*;
    use crate::domain::Actor;
    use crate::error::AppError;
    use crate::port::id_provider::mocks::SequentialIdProvider;
    use crate::port::time_provider::mocks::FixedTimeProvider;
    use crate::port::UnconfiguredStore;
    use rust_decimal::Decimal;

    fn request() -> NewItem {
        NewItem {
            title: "Plastic bottles".to_string(),
            description: "Two sacks of PET bottles".to_string(),
            price: Decimal::new(50, 0),
            location_lat: 27.7172,
            location_lng: 85.3240,
            category: Some("plastic".to_string()),
            quantity: Some("2 sacks".to_string()),
            image_url: None,
        }
    }

    #[test]
    fn test_validate_valid_request() {
        assert!(validate_request(&request()).is_ok());
    }

    #[test]
    fn test_validate_price_zero() {
        let req = NewItem {
            price: Decimal::ZERO,
            ..request()
        };

        let result = validate_request(&req);
        assert!(result.unwrap_err().to_string().contains("must be positive"));
    }

    #[test]
    fn test_validate_price_negative() {
        let req = NewItem {
            price: Decimal::new(-1, 2),
            ..request()
        };

        assert!(matches!(validate_request(&req), Err(AppError::Validation(_))));
    }

    #[test]
    fn test_validate_title_empty() {
        let req = NewItem {
            title: "   ".to_string(),
            ..request()
        };

        assert!(validate_request(&req).unwrap_err().to_string().contains("empty"));
    }

    #[test]
    fn test_validate_title_too_long() {
        let req = NewItem {
            title: "a".repeat(121),
            ..request()
        };

        assert!(validate_request(&req).unwrap_err().to_string().contains("too long"));
    }

    #[test]
    fn test_validate_coordinates() {
        let req = NewItem {
            location_lat: 91.0,
            ..request()
        };
        assert!(validate_request(&req).unwrap_err().to_string().contains("Latitude"));

        let req = NewItem {
            location_lng: f64::NAN,
            ..request()
        };
        assert!(validate_request(&req).unwrap_err().to_string().contains("Longitude"));
    }

    // The unconfigured store fails every call, so a Validation error here
    // proves no write was attempted.
    #[tokio::test]
    async fn test_negative_price_rejected_before_store() {
        let result = create::execute(
            &UnconfiguredStore,
            &SequentialIdProvider::new(),
            &FixedTimeProvider::new(1_000),
            &Actor::customer("customer_1"),
            NewItem {
                price: Decimal::new(-50, 0),
                ..request()
            },
        )
        .await;

        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_valid_item_reaches_store() {
        let result = create::execute(
            &UnconfiguredStore,
            &SequentialIdProvider::new(),
            &FixedTimeProvider::new(1_000),
            &Actor::customer("customer_1"),
            request(),
        )
        .await;

        assert!(matches!(result, Err(AppError::Config(_))));
    }

    #[tokio::test]
    async fn test_only_customers_post_items() {
        let result = create::execute(
            &UnconfiguredStore,
            &SequentialIdProvider::new(),
            &FixedTimeProvider::new(1_000),
            &Actor::dealer("dealer_1"),
            request(),
        )
        .await;

        assert!(matches!(result, Err(AppError::Domain(_))));
    }
}
