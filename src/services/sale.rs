use std::collections::{BTreeMap, HashMap};

use rust_decimal::Decimal;
use sqlx::PgPool;
use tracing::{info, instrument, warn};

use crate::dtos::sale::SaleLineRequest;
use crate::error::AppError;
use crate::models::item::Item;
use crate::models::sale::{NewSaleItem, Sale, SaleItem};
use crate::repository::item::ItemRepository;
use crate::repository::sale::SaleRepository;

/// Turns requested lines into priced, stock-consistent sales.
#[derive(Clone)]
pub struct SaleService {
    pool: PgPool,
    sales: SaleRepository,
    items: ItemRepository,
}

impl SaleService {
    pub fn new(pool: PgPool) -> Self {
        Self {
            sales: SaleRepository::new(pool.clone()),
            items: ItemRepository::new(pool.clone()),
            pool,
        }
    }

    #[instrument(skip(self, lines), fields(lines = lines.len()))]
    pub async fn create(&self, user_id: i64, lines: &[SaleLineRequest]) -> Result<Sale, AppError> {
        validate_lines(lines)?;

        let catalog = self.load_items(lines).await?;
        check_stock(lines, &catalog)?;

        let priced = price_lines(lines, &catalog)?;
        let total = total_amount(&priced)?;

        let sale = self.sales.create(user_id, total, &priced).await?;
        info!(sale_id = sale.id, %total, "sale created");
        Ok(sale)
    }

    /// Full replacement. New lines are priced from the current catalog, so
    /// `price_at_sale` reflects the price at update time.
    #[instrument(skip(self, lines), fields(lines = lines.len()))]
    pub async fn update(&self, sale_id: i64, lines: &[SaleLineRequest]) -> Result<Sale, AppError> {
        validate_lines(lines)?;

        if self.sales.find_by_id(sale_id).await?.is_none() {
            return Err(AppError::not_found("sale not found"));
        }

        let catalog = self.load_items(lines).await?;
        let priced = price_lines(lines, &catalog)?;
        let total = total_amount(&priced)?;

        let sale = self.sales.update(sale_id, total, &priced).await?;
        info!(sale_id, %total, "sale updated");
        Ok(sale)
    }

    #[instrument(skip(self))]
    pub async fn delete(&self, sale_id: i64) -> Result<(), AppError> {
        self.sales.delete(sale_id).await?;
        info!(sale_id, "sale deleted");
        Ok(())
    }

    pub async fn get_by_id(&self, sale_id: i64) -> Result<(Sale, Vec<SaleItem>), AppError> {
        let sale = self
            .sales
            .find_by_id(sale_id)
            .await?
            .ok_or_else(|| AppError::not_found("sale not found"))?;
        let items = self.sales.find_sale_items(&self.pool, sale_id).await?;
        Ok((sale, items))
    }

    pub async fn list(&self, limit: i64, offset: i64) -> Result<(Vec<Sale>, i64), AppError> {
        Ok(self.sales.find_all(limit, offset).await?)
    }

    async fn load_items(&self, lines: &[SaleLineRequest]) -> Result<HashMap<i64, Item>, AppError> {
        let ids: Vec<i64> = requested_quantities(lines).into_keys().collect();
        let found = self.items.find_by_ids(&self.pool, &ids).await?;
        let catalog: HashMap<i64, Item> = found.into_iter().map(|item| (item.id, item)).collect();

        if let Some(missing) = ids.iter().find(|id| !catalog.contains_key(*id)) {
            return Err(AppError::not_found(format!("item {missing} not found")));
        }
        Ok(catalog)
    }
}

pub fn validate_lines(lines: &[SaleLineRequest]) -> Result<(), AppError> {
    if lines.is_empty() {
        return Err(AppError::invalid_input("sale must contain at least one item"));
    }
    for line in lines {
        if line.item_id <= 0 {
            return Err(AppError::invalid_input("item_id must be greater than 0"));
        }
        if line.quantity <= 0 {
            return Err(AppError::invalid_input("quantity must be greater than 0"));
        }
    }
    Ok(())
}

/// Total quantity requested per item, keyed in ascending id order.
pub fn requested_quantities(lines: &[SaleLineRequest]) -> BTreeMap<i64, i64> {
    let mut totals = BTreeMap::new();
    for line in lines {
        *totals.entry(line.item_id).or_insert(0) += i64::from(line.quantity);
    }
    totals
}

/// Rejects the request early when an item cannot cover what all its lines ask for.
/// The guarded decrement still decides at write time.
pub fn check_stock(lines: &[SaleLineRequest], catalog: &HashMap<i64, Item>) -> Result<(), AppError> {
    for (item_id, wanted) in requested_quantities(lines) {
        let item = catalog
            .get(&item_id)
            .ok_or_else(|| AppError::not_found(format!("item {item_id} not found")))?;
        if wanted > i64::from(item.stock) {
            warn!(item_id, wanted, available = item.stock, "insufficient stock");
            return Err(AppError::insufficient_stock(item.label()));
        }
    }
    Ok(())
}

/// Largest value a NUMERIC(14,2) subtotal or total column holds.
pub fn max_amount() -> Decimal {
    Decimal::new(99_999_999_999_999, 2)
}

fn amount_too_large() -> AppError {
    AppError::invalid_input("sale total exceeds the supported amount")
}

pub fn price_line(item: &Item, quantity: i32) -> Result<NewSaleItem, AppError> {
    let subtotal = item
        .price
        .checked_mul(Decimal::from(quantity))
        .filter(|subtotal| *subtotal <= max_amount())
        .ok_or_else(amount_too_large)?;

    Ok(NewSaleItem { item_id: item.id, quantity, price_at_sale: item.price, subtotal })
}

pub fn price_lines(lines: &[SaleLineRequest], catalog: &HashMap<i64, Item>) -> Result<Vec<NewSaleItem>, AppError> {
    lines
        .iter()
        .map(|line| {
            catalog
                .get(&line.item_id)
                .ok_or_else(|| AppError::not_found(format!("item {} not found", line.item_id)))
                .and_then(|item| price_line(item, line.quantity))
        })
        .collect()
}

pub fn total_amount(lines: &[NewSaleItem]) -> Result<Decimal, AppError> {
    lines
        .iter()
        .try_fold(Decimal::ZERO, |total, line| total.checked_add(line.subtotal))
        .filter(|total| *total <= max_amount())
        .ok_or_else(amount_too_large)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use rust_decimal_macros::dec;

    fn item(id: i64, stock: i32, price: Decimal) -> Item {
        Item {
            id,
            sku: format!("SKU-{id}"),
            name: format!("Item {id}"),
            category_id: 1,
            rack_id: 1,
            stock,
            minimum_stock: 0,
            price,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn line(item_id: i64, quantity: i32) -> SaleLineRequest {
        SaleLineRequest { item_id, quantity }
    }

    fn catalog(items: Vec<Item>) -> HashMap<i64, Item> {
        items.into_iter().map(|i| (i.id, i)).collect()
    }

    #[test]
    fn empty_or_non_positive_lines_are_invalid_input() {
        assert!(matches!(validate_lines(&[]), Err(AppError::InvalidInput(_))));
        assert!(matches!(validate_lines(&[line(1, 0)]), Err(AppError::InvalidInput(_))));
        assert!(matches!(validate_lines(&[line(1, 2), line(2, -1)]), Err(AppError::InvalidInput(_))));
        assert!(matches!(validate_lines(&[line(0, 1)]), Err(AppError::InvalidInput(_))));
        assert!(validate_lines(&[line(1, 1)]).is_ok());
    }

    #[test]
    fn line_snapshots_catalog_price() {
        let priced = price_line(&item(7, 10, dec!(5.00)), 3).unwrap();
        assert_eq!(priced.price_at_sale, dec!(5.00));
        assert_eq!(priced.subtotal, dec!(15.00));
    }

    #[test]
    fn total_is_sum_of_subtotals() {
        let cat = catalog(vec![item(1, 10, dec!(5.00)), item(2, 10, dec!(2.49))]);
        let priced = price_lines(&[line(1, 3), line(2, 4)], &cat).unwrap();
        assert_eq!(total_amount(&priced).unwrap(), dec!(24.96));
    }

    #[test]
    fn subtotal_beyond_column_range_is_invalid_input() {
        let err = price_line(&item(1, i32::MAX, dec!(1000.00)), 1_000_000_000).unwrap_err();
        assert!(matches!(err, AppError::InvalidInput(_)));
        assert_eq!(err.to_string(), "sale total exceeds the supported amount");

        assert!(price_line(&item(1, i32::MAX, dec!(999.99)), 1_000_000_000).is_ok());
    }

    #[test]
    fn total_beyond_column_range_is_invalid_input() {
        let cat = catalog(vec![item(1, i32::MAX, dec!(600.00)), item(2, i32::MAX, dec!(600.00))]);
        let priced = price_lines(&[line(1, 1_000_000_000), line(2, 1_000_000_000)], &cat).unwrap();

        let err = total_amount(&priced).unwrap_err();
        assert_eq!(err.to_string(), "sale total exceeds the supported amount");
    }

    #[test]
    fn stock_check_sums_repeated_items() {
        let cat = catalog(vec![item(1, 5, dec!(1.00))]);
        assert!(check_stock(&[line(1, 3), line(1, 2)], &cat).is_ok());

        let err = check_stock(&[line(1, 3), line(1, 3)], &cat).unwrap_err();
        assert_eq!(err.to_string(), "insufficient stock for 'Item 1' (id 1)");
    }

    #[test]
    fn stock_check_rejects_when_request_exceeds_stock() {
        let cat = catalog(vec![item(1, 2, dec!(5.00))]);
        assert!(matches!(check_stock(&[line(1, 3)], &cat), Err(AppError::InsufficientStock { .. })));
    }

    #[test]
    fn unknown_item_is_not_found() {
        let cat = catalog(vec![item(1, 2, dec!(5.00))]);
        assert!(matches!(price_lines(&[line(2, 1)], &cat), Err(AppError::NotFound(_))));
    }

    #[test]
    fn quantities_are_keyed_in_ascending_item_order() {
        let totals = requested_quantities(&[line(9, 1), line(3, 2), line(9, 4)]);
        assert_eq!(totals.into_iter().collect::<Vec<_>>(), vec![(3, 2), (9, 5)]);
    }
}
