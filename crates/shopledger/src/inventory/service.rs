use chrono::Utc;
use parking_lot::{Mutex, MutexGuard};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{info, warn};

use super::domain::{
    InventoryValuation, MovementFilter, MovementKind, StockAdjustment, StockChange, StockMovement,
};
use crate::catalog::Product;
use crate::domain::{MovementId, Page, PageRequest, ProductId, UserId};
use crate::error::ServiceError;
use crate::store::Repository;

/// Owns every change to stock on hand.
pub struct InventoryService {
    products: Arc<dyn Repository<Product>>,
    movements: Arc<dyn Repository<StockMovement>>,
    stock_lock: Mutex<()>,
}

impl InventoryService {
    pub fn new(
        products: Arc<dyn Repository<Product>>,
        movements: Arc<dyn Repository<StockMovement>>,
    ) -> Self {
        Self {
            products,
            movements,
            stock_lock: Mutex::new(()),
        }
    }

    /// Serializes catalog writes, reference checks and stock changes.
    /// Lock order: a service's own status lock first, then this one.
    pub(crate) fn lock(&self) -> MutexGuard<'_, ()> {
        self.stock_lock.lock()
    }

    /// Applies a batch of changes: all of them or none.
    pub fn apply(
        &self,
        changes: Vec<StockChange>,
        actor: Option<UserId>,
    ) -> Result<Vec<StockMovement>, ServiceError> {
        let _guard = self.lock();
        self.apply_locked(changes, actor)
    }

    pub(crate) fn apply_locked(
        &self,
        changes: Vec<StockChange>,
        actor: Option<UserId>,
    ) -> Result<Vec<StockMovement>, ServiceError> {
        let mut touched: BTreeMap<ProductId, Product> = BTreeMap::new();
        let mut planned = Vec::with_capacity(changes.len());

        for change in changes {
            if !touched.contains_key(&change.product_id) {
                let product = self
                    .products
                    .fetch(change.product_id)?
                    .ok_or_else(|| ServiceError::not_found("product", change.product_id))?;
                touched.insert(change.product_id, product);
            }
            let Some(product) = touched.get_mut(&change.product_id) else {
                continue;
            };

            let quantity_after = product
                .quantity
                .checked_add(change.delta)
                .ok_or_else(|| out_of_range(product.id, change.delta))?;
            if quantity_after < 0 {
                let requested = change
                    .delta
                    .checked_neg()
                    .ok_or_else(|| out_of_range(product.id, change.delta))?;
                warn!(
                    product_id = %product.id,
                    requested,
                    available = product.quantity,
                    "stock change rejected"
                );
                return Err(ServiceError::InsufficientStock {
                    product_id: product.id,
                    requested,
                    available: product.quantity,
                });
            }
            product.quantity = quantity_after;
            planned.push((change, quantity_after));
        }

        let now = Utc::now();
        for mut product in touched.into_values() {
            product.updated_at = now;
            self.products.update(product)?;
        }

        let mut recorded = Vec::with_capacity(planned.len());
        for (change, quantity_after) in planned {
            let movement = self.movements.insert(StockMovement {
                id: MovementId(0),
                product_id: change.product_id,
                delta: change.delta,
                kind: change.kind,
                reference: change.reference,
                note: change.note,
                quantity_after,
                created_by: actor,
                created_at: now,
            })?;
            info!(
                product_id = %movement.product_id,
                delta = movement.delta,
                quantity_after = movement.quantity_after,
                kind = ?movement.kind,
                "stock moved"
            );
            recorded.push(movement);
        }
        Ok(recorded)
    }

    /// Manual correction of stock on hand.
    pub fn adjust(
        &self,
        adjustment: StockAdjustment,
        actor: Option<UserId>,
    ) -> Result<StockMovement, ServiceError> {
        if adjustment.delta == 0 {
            return Err(ServiceError::validation("adjustment delta must not be zero"));
        }
        let change = StockChange::new(
            adjustment.product_id,
            adjustment.delta,
            MovementKind::Adjustment,
        )
        .with_note(adjustment.note);

        self.apply(vec![change], actor)?
            .pop()
            .ok_or_else(|| ServiceError::validation("adjustment produced no movement"))
    }

    /// Journal entries, newest first.
    pub fn movements(
        &self,
        filter: &MovementFilter,
        page: &PageRequest,
    ) -> Result<Page<StockMovement>, ServiceError> {
        let mut movements: Vec<StockMovement> = self
            .movements
            .list()?
            .into_iter()
            .filter(|movement| filter.matches(movement))
            .collect();
        movements.reverse();
        Ok(Page::paginate(movements, page))
    }

    /// Active products at or below their reorder level, most depleted first.
    pub fn low_stock(&self) -> Result<Vec<Product>, ServiceError> {
        let mut products: Vec<Product> = self
            .products
            .list()?
            .into_iter()
            .filter(Product::is_low_stock)
            .collect();
        products.sort_by_key(|product| (product.quantity - product.reorder_level, product.id));
        Ok(products)
    }

    pub fn valuation(&self) -> Result<InventoryValuation, ServiceError> {
        let products = self.products.list()?;
        Ok(products
            .iter()
            .filter(|product| product.active)
            .fold(InventoryValuation::default(), |mut acc, product| {
                acc.product_count += 1;
                acc.units_on_hand = acc.units_on_hand.saturating_add(product.quantity);
                acc.cost_value += product.cost_price.times_signed(product.quantity);
                acc.retail_value += product.unit_price.times_signed(product.quantity);
                acc
            }))
    }
}

fn out_of_range(product_id: ProductId, delta: i64) -> ServiceError {
    ServiceError::validation(format!(
        "stock change of {delta} puts product {product_id} out of range"
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Money;
    use crate::store::MemoryRepository;

    fn product(sku: &str, quantity: i64, reorder_level: i64) -> Product {
        let now = Utc::now();
        Product {
            id: ProductId(0),
            sku: sku.to_string(),
            name: format!("Product {sku}"),
            description: None,
            category: None,
            unit_price: Money(500),
            cost_price: Money(300),
            quantity,
            reorder_level,
            supplier_id: None,
            active: true,
            created_at: now,
            updated_at: now,
        }
    }

    fn setup() -> (InventoryService, MemoryRepository<Product>) {
        let products = MemoryRepository::<Product>::default();
        let movements = MemoryRepository::<StockMovement>::default();
        let service = InventoryService::new(Arc::new(products.clone()), Arc::new(movements));
        (service, products)
    }

    #[test]
    fn batch_is_rejected_as_a_whole_when_one_line_is_short() {
        let (service, products) = setup();
        let bolts = products.insert(product("BOLT", 10, 2)).expect("insert");
        let nuts = products.insert(product("NUT", 1, 2)).expect("insert");

        let result = service.apply(
            vec![
                StockChange::new(bolts.id, -4, MovementKind::Sale),
                StockChange::new(nuts.id, -3, MovementKind::Sale),
            ],
            None,
        );

        match result {
            Err(ServiceError::InsufficientStock {
                product_id,
                requested,
                available,
            }) => {
                assert_eq!(product_id, nuts.id);
                assert_eq!(requested, 3);
                assert_eq!(available, 1);
            }
            other => panic!("expected insufficient stock, got {other:?}"),
        }

        let bolts = products.fetch(bolts.id).expect("fetch").expect("present");
        assert_eq!(bolts.quantity, 10, "no partial application");
    }

    #[test]
    fn repeated_product_lines_are_validated_cumulatively() {
        let (service, products) = setup();
        let bolts = products.insert(product("BOLT", 5, 0)).expect("insert");

        let result = service.apply(
            vec![
                StockChange::new(bolts.id, -3, MovementKind::Sale),
                StockChange::new(bolts.id, -3, MovementKind::Sale),
            ],
            None,
        );
        assert!(matches!(result, Err(ServiceError::InsufficientStock { .. })));
    }

    #[test]
    fn adjust_records_movement_with_running_quantity() {
        let (service, products) = setup();
        let bolts = products.insert(product("BOLT", 5, 0)).expect("insert");

        let movement = service
            .adjust(
                StockAdjustment {
                    product_id: bolts.id,
                    delta: 7,
                    note: Some("cycle count".to_string()),
                },
                Some(UserId(1)),
            )
            .expect("adjusts");
        assert_eq!(movement.quantity_after, 12);
        assert_eq!(movement.kind, MovementKind::Adjustment);
        assert_eq!(movement.created_by, Some(UserId(1)));

        let page = service
            .movements(&MovementFilter::default(), &PageRequest::default())
            .expect("lists");
        assert_eq!(page.total, 1);
    }

    #[test]
    fn zero_adjustment_is_invalid() {
        let (service, products) = setup();
        let bolts = products.insert(product("BOLT", 5, 0)).expect("insert");
        let result = service.adjust(
            StockAdjustment {
                product_id: bolts.id,
                delta: 0,
                note: None,
            },
            None,
        );
        assert!(matches!(result, Err(ServiceError::Validation(_))));
    }

    #[test]
    fn extreme_adjustments_are_invalid_not_overflowing() {
        let (service, products) = setup();
        let bolts = products.insert(product("BOLT", 5, 0)).expect("insert");

        for delta in [i64::MAX, i64::MIN] {
            let result = service.adjust(
                StockAdjustment {
                    product_id: bolts.id,
                    delta,
                    note: None,
                },
                None,
            );
            assert!(
                matches!(result, Err(ServiceError::Validation(_))),
                "delta {delta} gave {result:?}"
            );
        }

        let bolts = products.fetch(bolts.id).expect("fetch").expect("present");
        assert_eq!(bolts.quantity, 5);
    }

    #[test]
    fn low_stock_and_valuation_ignore_inactive_products() {
        let (service, products) = setup();
        products.insert(product("LOW", 1, 5)).expect("insert");
        products.insert(product("OK", 20, 5)).expect("insert");
        let mut retired = product("OLD", 0, 5);
        retired.active = false;
        products.insert(retired).expect("insert");

        let low = service.low_stock().expect("low stock");
        assert_eq!(low.len(), 1);
        assert_eq!(low[0].sku, "LOW");

        let valuation = service.valuation().expect("valuation");
        assert_eq!(valuation.product_count, 2);
        assert_eq!(valuation.units_on_hand, 21);
        assert_eq!(valuation.cost_value, Money(6_300));
        assert_eq!(valuation.retail_value, Money(10_500));
    }
}
