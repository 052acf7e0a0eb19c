use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::domain::{Money, ProductId};
use crate::inventory::InventoryValuation;
use crate::transactions::{Transaction, TransactionKind};

pub const DEFAULT_BREAKDOWN_LIMIT: usize = 10;

/// Date window and size limit shared by the statistics endpoints.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StatisticsQuery {
    #[serde(default)]
    pub from: Option<NaiveDate>,
    #[serde(default)]
    pub to: Option<NaiveDate>,
    #[serde(default)]
    pub limit: Option<usize>,
}

impl StatisticsQuery {
    pub fn limit(&self) -> usize {
        self.limit.unwrap_or(DEFAULT_BREAKDOWN_LIMIT).max(1)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Overview {
    pub sales_total: Money,
    pub sales_count: usize,
    pub purchase_total: Money,
    pub purchase_count: usize,
    pub gross_margin: Money,
    pub average_sale: Money,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MonthlyEntry {
    /// `YYYY-MM`.
    pub month: String,
    pub sales: Money,
    pub purchases: Money,
    pub net: Money,
    pub transactions: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PartnerEntry {
    pub partner: String,
    pub kind: TransactionKind,
    pub total: Money,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProductEntry {
    pub product_id: ProductId,
    pub product_name: String,
    pub quantity_sold: u64,
    pub revenue: Money,
    pub quantity_purchased: u64,
    pub spend: Money,
}

#[derive(Debug, Clone, Serialize)]
pub struct Dashboard {
    pub products: usize,
    pub active_products: usize,
    pub suppliers: usize,
    pub low_stock: usize,
    pub pending_purchase_orders: usize,
    pub pending_transactions: usize,
    pub inventory: InventoryValuation,
    pub sales_today: Money,
    pub recent_transactions: Vec<Transaction>,
}
