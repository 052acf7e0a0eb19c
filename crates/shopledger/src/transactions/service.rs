use chrono::{NaiveDate, Utc};
use parking_lot::Mutex;
use std::sync::Arc;
use tracing::{info, warn};

use super::domain::{
    NewTransaction, Transaction, TransactionFilter, TransactionKind, TransactionLine,
};
use super::numbering::next_number;
use crate::catalog::{Product, Supplier};
use crate::domain::{OrderStatus, Page, PageRequest, TransactionId, UserId};
use crate::error::ServiceError;
use crate::inventory::{InventoryService, MovementKind, StockChange};
use crate::purchasing::PurchaseOrder;
use crate::store::{Repository, SequenceStore};

/// Sales and purchase records and their stock side effects.
pub struct TransactionService {
    transactions: Arc<dyn Repository<Transaction>>,
    products: Arc<dyn Repository<Product>>,
    suppliers: Arc<dyn Repository<Supplier>>,
    sequences: Arc<dyn SequenceStore>,
    inventory: Arc<InventoryService>,
    status_lock: Mutex<()>,
}

impl TransactionService {
    pub fn new(
        transactions: Arc<dyn Repository<Transaction>>,
        products: Arc<dyn Repository<Product>>,
        suppliers: Arc<dyn Repository<Supplier>>,
        sequences: Arc<dyn SequenceStore>,
        inventory: Arc<InventoryService>,
    ) -> Self {
        Self {
            transactions,
            products,
            suppliers,
            sequences,
            inventory,
            status_lock: Mutex::new(()),
        }
    }

    pub fn create(
        &self,
        new_transaction: NewTransaction,
        actor: Option<UserId>,
    ) -> Result<Transaction, ServiceError> {
        let NewTransaction {
            kind,
            partner,
            supplier_id,
            date,
            notes,
            lines,
        } = new_transaction;

        let _references = self.inventory.lock();
        let partner = partner
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty());
        let partner = match (kind, supplier_id) {
            (TransactionKind::Sale, Some(_)) => {
                return Err(ServiceError::validation(
                    "sales cannot reference a supplier",
                ))
            }
            (TransactionKind::Purchase, Some(supplier_id)) => {
                let supplier = self
                    .suppliers
                    .fetch(supplier_id)?
                    .ok_or_else(|| ServiceError::not_found("supplier", supplier_id))?;
                partner.unwrap_or(supplier.name)
            }
            (_, None) => {
                partner.ok_or_else(|| ServiceError::validation("partner must not be empty"))?
            }
        };

        if lines.is_empty() {
            return Err(ServiceError::validation(
                "a transaction needs at least one line",
            ));
        }
        let lines = lines
            .into_iter()
            .map(|line| {
                if line.quantity == 0 {
                    return Err(ServiceError::validation("line quantity must be positive"));
                }
                let product = self
                    .products
                    .fetch(line.product_id)?
                    .ok_or_else(|| ServiceError::not_found("product", line.product_id))?;
                if !product.active {
                    return Err(ServiceError::validation(format!(
                        "product {} is inactive",
                        product.sku
                    )));
                }
                let default_price = match kind {
                    TransactionKind::Sale => product.unit_price,
                    TransactionKind::Purchase => product.cost_price,
                };
                let unit_price = line.unit_price.unwrap_or(default_price);
                if unit_price.is_negative() {
                    return Err(ServiceError::validation("unit_price must not be negative"));
                }
                Ok(TransactionLine {
                    product_id: product.id,
                    product_name: product.name,
                    quantity: line.quantity,
                    unit_price,
                })
            })
            .collect::<Result<Vec<_>, ServiceError>>()?;

        let date = date.unwrap_or_else(|| Utc::now().date_naive());
        let transaction = self.store_new(Transaction {
            id: TransactionId(0),
            number: String::new(),
            kind,
            partner,
            supplier_id,
            purchase_order_id: None,
            status: OrderStatus::Pending,
            total: lines.iter().map(TransactionLine::amount).sum(),
            lines,
            date,
            notes: notes.filter(|value| !value.trim().is_empty()),
            created_by: actor,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        })?;
        info!(
            number = %transaction.number,
            kind = transaction.kind.label(),
            total = %transaction.total,
            "transaction recorded"
        );
        Ok(transaction)
    }

    /// Books the purchase produced by a delivered purchase order. The caller receives the stock.
    pub(crate) fn record_delivery(
        &self,
        order: &PurchaseOrder,
        supplier: &Supplier,
        lines: Vec<TransactionLine>,
        date: NaiveDate,
        actor: Option<UserId>,
    ) -> Result<Transaction, ServiceError> {
        let now = Utc::now();
        let transaction = self.store_new(Transaction {
            id: TransactionId(0),
            number: String::new(),
            kind: TransactionKind::Purchase,
            partner: supplier.name.clone(),
            supplier_id: Some(supplier.id),
            purchase_order_id: Some(order.id),
            status: OrderStatus::Delivered,
            total: lines.iter().map(TransactionLine::amount).sum(),
            lines,
            date,
            notes: Some(format!("Delivery of {}", order.number)),
            created_by: actor,
            created_at: now,
            updated_at: now,
        })?;
        info!(
            number = %transaction.number,
            order = %order.number,
            "purchase booked from delivered order"
        );
        Ok(transaction)
    }

    /// Drops a delivery booking whose stock receipt failed.
    pub(crate) fn discard_delivery(&self, transaction: &Transaction) -> Result<(), ServiceError> {
        self.transactions.delete(transaction.id)?;
        warn!(number = %transaction.number, "delivery booking rolled back");
        Ok(())
    }

    pub fn get(&self, id: TransactionId) -> Result<Transaction, ServiceError> {
        self.transactions
            .fetch(id)?
            .ok_or_else(|| ServiceError::not_found("transaction", id))
    }

    /// Matching transactions, newest first.
    pub fn list(&self, filter: &TransactionFilter) -> Result<Vec<Transaction>, ServiceError> {
        let mut transactions: Vec<Transaction> = self
            .transactions
            .list()?
            .into_iter()
            .filter(|transaction| filter.matches(transaction))
            .collect();
        transactions.sort_by(|a, b| b.date.cmp(&a.date).then(b.id.cmp(&a.id)));
        Ok(transactions)
    }

    pub fn page(
        &self,
        filter: &TransactionFilter,
        page: &PageRequest,
    ) -> Result<Page<Transaction>, ServiceError> {
        Ok(Page::paginate(self.list(filter)?, page))
    }

    /// Moves a transaction along its lifecycle, applying stock effects first.
    pub fn update_status(
        &self,
        id: TransactionId,
        next: OrderStatus,
        actor: Option<UserId>,
    ) -> Result<Transaction, ServiceError> {
        let _guard = self.status_lock.lock();
        let mut transaction = self.get(id)?;
        let previous = transaction.status;
        transaction.status = previous.transition(next)?;

        if let Some(changes) = stock_effect(&transaction, previous, next) {
            self.inventory.apply(changes, actor)?;
        }

        transaction.updated_at = Utc::now();
        self.transactions.update(transaction.clone())?;
        info!(
            number = %transaction.number,
            from = %previous,
            to = %next,
            "transaction status changed"
        );
        Ok(transaction)
    }

    fn store_new(&self, mut transaction: Transaction) -> Result<Transaction, ServiceError> {
        transaction.number = next_number(
            self.sequences.as_ref(),
            transaction.kind.number_prefix(),
            transaction.date,
        )?;
        Ok(self.transactions.insert(transaction)?)
    }
}

fn stock_effect(
    transaction: &Transaction,
    previous: OrderStatus,
    next: OrderStatus,
) -> Option<Vec<StockChange>> {
    let (kind, sign) = match (transaction.kind, next) {
        (TransactionKind::Sale, OrderStatus::Confirmed) => (MovementKind::Sale, -1),
        (TransactionKind::Sale, OrderStatus::Cancelled) if previous.is_committed() => {
            (MovementKind::Return, 1)
        }
        (TransactionKind::Purchase, OrderStatus::Delivered)
            if transaction.purchase_order_id.is_none() =>
        {
            (MovementKind::Receipt, 1)
        }
        _ => return None,
    };

    Some(
        transaction
            .lines
            .iter()
            .map(|line| {
                StockChange::new(line.product_id, sign * i64::from(line.quantity), kind)
                    .with_reference(transaction.number.clone())
            })
            .collect(),
    )
}
