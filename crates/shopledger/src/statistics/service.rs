use chrono::{NaiveDate, Utc};
use std::sync::Arc;

use super::aggregate;
use super::views::{
    Dashboard, MonthlyEntry, Overview, PartnerEntry, ProductEntry, StatisticsQuery,
};
use crate::catalog::{Product, Supplier};
use crate::domain::{Money, OrderStatus};
use crate::error::ServiceError;
use crate::inventory::InventoryService;
use crate::purchasing::PurchaseOrder;
use crate::store::Repository;
use crate::transactions::{Transaction, TransactionKind};

const RECENT_TRANSACTIONS: usize = 5;

/// Read-only aggregates over the ledger.
pub struct StatisticsService {
    transactions: Arc<dyn Repository<Transaction>>,
    products: Arc<dyn Repository<Product>>,
    suppliers: Arc<dyn Repository<Supplier>>,
    orders: Arc<dyn Repository<PurchaseOrder>>,
    inventory: Arc<InventoryService>,
}

impl StatisticsService {
    pub fn new(
        transactions: Arc<dyn Repository<Transaction>>,
        products: Arc<dyn Repository<Product>>,
        suppliers: Arc<dyn Repository<Supplier>>,
        orders: Arc<dyn Repository<PurchaseOrder>>,
        inventory: Arc<InventoryService>,
    ) -> Self {
        Self {
            transactions,
            products,
            suppliers,
            orders,
            inventory,
        }
    }

    pub fn overview(&self, query: &StatisticsQuery) -> Result<Overview, ServiceError> {
        validate_window(query)?;
        Ok(aggregate::overview(&self.transactions.list()?, query))
    }

    pub fn monthly(&self, query: &StatisticsQuery) -> Result<Vec<MonthlyEntry>, ServiceError> {
        validate_window(query)?;
        Ok(aggregate::monthly(&self.transactions.list()?, query))
    }

    pub fn partners(&self, query: &StatisticsQuery) -> Result<Vec<PartnerEntry>, ServiceError> {
        validate_window(query)?;
        Ok(aggregate::partners(&self.transactions.list()?, query))
    }

    pub fn products(&self, query: &StatisticsQuery) -> Result<Vec<ProductEntry>, ServiceError> {
        validate_window(query)?;
        Ok(aggregate::products(&self.transactions.list()?, query))
    }

    pub fn dashboard(&self) -> Result<Dashboard, ServiceError> {
        self.dashboard_on(Utc::now().date_naive())
    }

    pub fn dashboard_on(&self, today: NaiveDate) -> Result<Dashboard, ServiceError> {
        let products = self.products.list()?;
        let transactions = self.transactions.list()?;

        let sales_today: Money = transactions
            .iter()
            .filter(|tx| {
                tx.kind == TransactionKind::Sale && tx.status.is_committed() && tx.date == today
            })
            .map(|tx| tx.total)
            .sum();

        let mut recent = transactions.clone();
        recent.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        recent.truncate(RECENT_TRANSACTIONS);

        Ok(Dashboard {
            products: products.len(),
            active_products: products.iter().filter(|product| product.active).count(),
            suppliers: self.suppliers.list()?.len(),
            low_stock: products.iter().filter(|product| product.is_low_stock()).count(),
            pending_purchase_orders: self
                .orders
                .list()?
                .iter()
                .filter(|order| order.status == OrderStatus::Pending)
                .count(),
            pending_transactions: transactions
                .iter()
                .filter(|tx| tx.status == OrderStatus::Pending)
                .count(),
            inventory: self.inventory.valuation()?,
            sales_today,
            recent_transactions: recent,
        })
    }
}

fn validate_window(query: &StatisticsQuery) -> Result<(), ServiceError> {
    match (query.from, query.to) {
        (Some(from), Some(to)) if from > to => Err(ServiceError::validation(format!(
            "from ({from}) must not be after to ({to})"
        ))),
        _ => Ok(()),
    }
}
