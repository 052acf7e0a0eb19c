use chrono::Utc;
use parking_lot::Mutex;
use std::sync::Arc;
use tracing::info;

use super::domain::{
    NewOrderLine, NewPurchaseOrder, OrderLine, PurchaseOrder, PurchaseOrderFilter,
    PurchaseOrderUpdate,
};
use crate::catalog::{Product, Supplier};
use crate::domain::{OrderStatus, Page, PageRequest, PurchaseOrderId, SupplierId, UserId};
use crate::error::ServiceError;
use crate::inventory::{InventoryService, MovementKind, StockChange};
use crate::store::{Repository, SequenceStore};
use crate::transactions::numbering::next_number;
use crate::transactions::{TransactionLine, TransactionService};

const NUMBER_PREFIX: &str = "PO";

/// Purchase orders from draft to delivery.
pub struct PurchasingService {
    orders: Arc<dyn Repository<PurchaseOrder>>,
    suppliers: Arc<dyn Repository<Supplier>>,
    products: Arc<dyn Repository<Product>>,
    sequences: Arc<dyn SequenceStore>,
    inventory: Arc<InventoryService>,
    transactions: Arc<TransactionService>,
    status_lock: Mutex<()>,
}

impl PurchasingService {
    pub fn new(
        orders: Arc<dyn Repository<PurchaseOrder>>,
        suppliers: Arc<dyn Repository<Supplier>>,
        products: Arc<dyn Repository<Product>>,
        sequences: Arc<dyn SequenceStore>,
        inventory: Arc<InventoryService>,
        transactions: Arc<TransactionService>,
    ) -> Self {
        Self {
            orders,
            suppliers,
            products,
            sequences,
            inventory,
            transactions,
            status_lock: Mutex::new(()),
        }
    }

    pub fn create(
        &self,
        new_order: NewPurchaseOrder,
        actor: Option<UserId>,
    ) -> Result<PurchaseOrder, ServiceError> {
        let _references = self.inventory.lock();
        let supplier = self.supplier(new_order.supplier_id)?;
        if !supplier.active {
            return Err(ServiceError::validation(format!(
                "supplier '{}' is inactive",
                supplier.name
            )));
        }
        let lines = self.resolve_lines(new_order.lines)?;

        let now = Utc::now();
        let number = next_number(self.sequences.as_ref(), NUMBER_PREFIX, now.date_naive())?;
        let order = self.orders.insert(PurchaseOrder {
            id: PurchaseOrderId(0),
            number,
            supplier_id: supplier.id,
            status: OrderStatus::Pending,
            total: lines.iter().map(OrderLine::amount).sum(),
            lines,
            expected_on: new_order.expected_on,
            notes: new_order.notes.filter(|notes| !notes.trim().is_empty()),
            transaction_id: None,
            created_by: actor,
            created_at: now,
            updated_at: now,
        })?;
        info!(
            number = %order.number,
            supplier = %supplier.name,
            total = %order.total,
            "purchase order created"
        );
        Ok(order)
    }

    pub fn get(&self, id: PurchaseOrderId) -> Result<PurchaseOrder, ServiceError> {
        self.orders
            .fetch(id)?
            .ok_or_else(|| ServiceError::not_found("purchase order", id))
    }

    /// Matching orders, newest first.
    pub fn list(
        &self,
        filter: &PurchaseOrderFilter,
        page: &PageRequest,
    ) -> Result<Page<PurchaseOrder>, ServiceError> {
        let mut orders: Vec<PurchaseOrder> = self
            .orders
            .list()?
            .into_iter()
            .filter(|order| filter.matches(order))
            .collect();
        orders.reverse();
        Ok(Page::paginate(orders, page))
    }

    pub fn update(
        &self,
        id: PurchaseOrderId,
        update: PurchaseOrderUpdate,
    ) -> Result<PurchaseOrder, ServiceError> {
        let _guard = self.status_lock.lock();
        let _references = self.inventory.lock();
        let mut order = self.get(id)?;
        if order.status != OrderStatus::Pending {
            return Err(ServiceError::conflict(format!(
                "purchase order {} is {} and can no longer be edited",
                order.number, order.status
            )));
        }

        if let Some(lines) = update.lines {
            order.lines = self.resolve_lines(lines)?;
            order.total = order.lines.iter().map(OrderLine::amount).sum();
        }
        if let Some(expected_on) = update.expected_on {
            order.expected_on = expected_on;
        }
        if let Some(notes) = update.notes {
            order.notes = notes.filter(|notes| !notes.trim().is_empty());
        }
        order.updated_at = Utc::now();

        self.orders.update(order.clone())?;
        info!(number = %order.number, "purchase order updated");
        Ok(order)
    }

    /// Moves an order along its lifecycle; delivery receives stock and books the purchase.
    pub fn update_status(
        &self,
        id: PurchaseOrderId,
        next: OrderStatus,
        actor: Option<UserId>,
    ) -> Result<PurchaseOrder, ServiceError> {
        let _guard = self.status_lock.lock();
        let mut order = self.get(id)?;
        let previous = order.status;
        order.status = previous.transition(next)?;
        let now = Utc::now();

        if next == OrderStatus::Delivered {
            let supplier = self.supplier(order.supplier_id)?;
            let lines = order
                .lines
                .iter()
                .map(|line| TransactionLine {
                    product_id: line.product_id,
                    product_name: line.product_name.clone(),
                    quantity: line.quantity,
                    unit_price: line.unit_cost,
                })
                .collect();
            let transaction = self.transactions.record_delivery(
                &order,
                &supplier,
                lines,
                now.date_naive(),
                actor,
            )?;

            let receipts = order
                .lines
                .iter()
                .map(|line| {
                    StockChange::new(
                        line.product_id,
                        i64::from(line.quantity),
                        MovementKind::Receipt,
                    )
                    .with_reference(order.number.clone())
                })
                .collect();
            if let Err(err) = self.inventory.apply(receipts, actor) {
                self.transactions.discard_delivery(&transaction)?;
                return Err(err);
            }
            order.transaction_id = Some(transaction.id);
        }

        order.updated_at = now;
        self.orders.update(order.clone())?;
        info!(
            number = %order.number,
            from = %previous,
            to = %next,
            "purchase order status changed"
        );
        Ok(order)
    }

    pub fn delete(&self, id: PurchaseOrderId) -> Result<(), ServiceError> {
        let _guard = self.status_lock.lock();
        let order = self.get(id)?;
        if !matches!(order.status, OrderStatus::Pending | OrderStatus::Cancelled) {
            return Err(ServiceError::conflict(format!(
                "purchase order {} is {} and cannot be deleted",
                order.number, order.status
            )));
        }
        self.orders.delete(id)?;
        info!(number = %order.number, "purchase order deleted");
        Ok(())
    }

    fn supplier(&self, id: SupplierId) -> Result<Supplier, ServiceError> {
        self.suppliers
            .fetch(id)?
            .ok_or_else(|| ServiceError::not_found("supplier", id))
    }

    fn resolve_lines(&self, lines: Vec<NewOrderLine>) -> Result<Vec<OrderLine>, ServiceError> {
        if lines.is_empty() {
            return Err(ServiceError::validation(
                "a purchase order needs at least one line",
            ));
        }
        lines
            .into_iter()
            .map(|line| {
                if line.quantity == 0 {
                    return Err(ServiceError::validation("line quantity must be positive"));
                }
                let product = self
                    .products
                    .fetch(line.product_id)?
                    .ok_or_else(|| ServiceError::not_found("product", line.product_id))?;
                let unit_cost = line.unit_cost.unwrap_or(product.cost_price);
                if unit_cost.is_negative() {
                    return Err(ServiceError::validation("unit_cost must not be negative"));
                }
                Ok(OrderLine {
                    product_id: product.id,
                    product_name: product.name,
                    quantity: line.quantity,
                    unit_cost,
                })
            })
            .collect()
    }
}
