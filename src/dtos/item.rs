// src/dtos/item.rs
use rust_decimal::Decimal;
use serde::Deserialize;
use validator::Validate;

use crate::error::AppError;

#[derive(Debug, Deserialize, Validate)]
pub struct CreateItemRequest {
    #[validate(length(min = 3, max = 50))]
    pub sku: String,
    #[validate(length(min = 3, max = 150))]
    pub name: String,
    #[validate(range(min = 1))]
    pub category_id: i64,
    #[validate(range(min = 1))]
    pub rack_id: i64,
    #[validate(range(min = 0))]
    pub stock: i32,
    #[validate(range(min = 0))]
    #[serde(default)]
    pub minimum_stock: i32,
    pub price: Decimal,
}

/// Partial update. No `stock`: after creation it only moves through sales.
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateItemRequest {
    #[validate(length(min = 3, max = 50))]
    pub sku: Option<String>,
    #[validate(length(min = 3, max = 150))]
    pub name: Option<String>,
    #[validate(range(min = 1))]
    pub category_id: Option<i64>,
    #[validate(range(min = 1))]
    pub rack_id: Option<i64>,
    #[validate(range(min = 0))]
    pub minimum_stock: Option<i32>,
    pub price: Option<Decimal>,
}

/// Largest price a NUMERIC(12,2) column holds.
pub fn max_price() -> Decimal {
    Decimal::new(999_999_999_999, 2)
}

/// Prices are stored with two decimal places and must be positive.
pub fn normalize_price(price: Decimal) -> Result<Decimal, AppError> {
    let price = price.round_dp(2);
    if price <= Decimal::ZERO {
        return Err(AppError::invalid_input("price must be greater than 0"));
    }
    if price > max_price() {
        return Err(AppError::invalid_input("price exceeds the supported amount"));
    }
    Ok(price)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn price_is_rounded_to_cents() {
        assert_eq!(normalize_price(Decimal::new(19999, 3)).unwrap(), Decimal::new(2000, 2));
        assert_eq!(normalize_price(Decimal::new(500, 2)).unwrap(), Decimal::new(5, 0));
    }

    #[test]
    fn non_positive_price_is_rejected() {
        assert!(matches!(normalize_price(Decimal::ZERO), Err(AppError::InvalidInput(_))));
        assert!(matches!(normalize_price(Decimal::new(-1, 0)), Err(AppError::InvalidInput(_))));
        // rounds to 0.00
        assert!(normalize_price(Decimal::new(4, 3)).is_err());
    }

    #[test]
    fn price_beyond_column_range_is_rejected() {
        assert_eq!(normalize_price(max_price()).unwrap(), max_price());

        let err = normalize_price(Decimal::new(10_000_000_000, 0)).unwrap_err();
        assert_eq!(err.to_string(), "price exceeds the supported amount");
        // 9999999999.995 rounds up past the limit
        assert!(normalize_price(Decimal::new(9_999_999_999_995, 3)).is_err());
    }

    #[test]
    fn create_request_checks_lengths_and_ranges() {
        let req: CreateItemRequest = serde_json::from_value(serde_json::json!({
            "sku": "AB",
            "name": "Hex bolt",
            "category_id": 0,
            "rack_id": 1,
            "stock": -1,
            "price": 2.5
        }))
        .unwrap();

        let errors = req.validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("sku"));
        assert!(fields.contains_key("category_id"));
        assert!(fields.contains_key("stock"));
        assert!(!fields.contains_key("name"));
    }

    #[test]
    fn update_request_validates_only_present_fields() {
        let req: UpdateItemRequest = serde_json::from_value(serde_json::json!({ "name": "Washer" })).unwrap();
        assert!(req.validate().is_ok());
        assert!(req.sku.is_none());
    }
}
