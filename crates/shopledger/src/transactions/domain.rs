use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::catalog::domain::contains_ignore_case;
use crate::domain::{
    Money, OrderStatus, ProductId, PurchaseOrderId, SupplierId, TransactionId, UserId,
};
use crate::store::Record;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransactionKind {
    Sale,
    Purchase,
}

impl TransactionKind {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Sale => "SALE",
            Self::Purchase => "PURCHASE",
        }
    }

    /// Prefix used in transaction numbers.
    pub const fn number_prefix(self) -> &'static str {
        match self {
            Self::Sale => "SAL",
            Self::Purchase => "PUR",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionLine {
    pub product_id: ProductId,
    pub product_name: String,
    pub quantity: u32,
    pub unit_price: Money,
}

impl TransactionLine {
    pub fn amount(&self) -> Money {
        self.unit_price.times(self.quantity)
    }
}

/// A sale to a customer or a purchase from a supplier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: TransactionId,
    pub number: String,
    pub kind: TransactionKind,
    pub partner: String,
    pub supplier_id: Option<SupplierId>,
    pub purchase_order_id: Option<PurchaseOrderId>,
    pub status: OrderStatus,
    pub lines: Vec<TransactionLine>,
    pub total: Money,
    pub date: NaiveDate,
    pub notes: Option<String>,
    pub created_by: Option<UserId>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Record for Transaction {
    type Id = TransactionId;

    fn id(&self) -> TransactionId {
        self.id
    }

    fn set_id(&mut self, id: TransactionId) {
        self.id = id;
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewTransactionLine {
    pub product_id: ProductId,
    pub quantity: u32,
    /// Defaults to the product's selling price (sales) or cost price (purchases).
    #[serde(default)]
    pub unit_price: Option<Money>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewTransaction {
    pub kind: TransactionKind,
    #[serde(default)]
    pub partner: Option<String>,
    #[serde(default)]
    pub supplier_id: Option<SupplierId>,
    #[serde(default)]
    pub date: Option<NaiveDate>,
    #[serde(default)]
    pub notes: Option<String>,
    pub lines: Vec<NewTransactionLine>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TransactionFilter {
    #[serde(default)]
    pub kind: Option<TransactionKind>,
    #[serde(default)]
    pub status: Option<OrderStatus>,
    #[serde(default)]
    pub partner: Option<String>,
    #[serde(default)]
    pub from: Option<NaiveDate>,
    #[serde(default)]
    pub to: Option<NaiveDate>,
}

impl TransactionFilter {
    pub fn matches(&self, transaction: &Transaction) -> bool {
        self.kind.map_or(true, |kind| kind == transaction.kind)
            && self.status.map_or(true, |status| status == transaction.status)
            && self.from.map_or(true, |from| transaction.date >= from)
            && self.to.map_or(true, |to| transaction.date <= to)
            && self
                .partner
                .as_deref()
                .map(str::trim)
                .filter(|needle| !needle.is_empty())
                .map_or(true, |needle| contains_ignore_case(&transaction.partner, needle))
    }
}
