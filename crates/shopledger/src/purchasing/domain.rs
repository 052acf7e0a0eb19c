use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{
    Money, OrderStatus, ProductId, PurchaseOrderId, SupplierId, TransactionId, UserId,
};
use crate::store::Record;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderLine {
    pub product_id: ProductId,
    pub product_name: String,
    pub quantity: u32,
    pub unit_cost: Money,
}

impl OrderLine {
    pub fn amount(&self) -> Money {
        self.unit_cost.times(self.quantity)
    }
}

/// Goods ordered from a supplier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PurchaseOrder {
    pub id: PurchaseOrderId,
    pub number: String,
    pub supplier_id: SupplierId,
    pub status: OrderStatus,
    pub lines: Vec<OrderLine>,
    pub total: Money,
    pub expected_on: Option<NaiveDate>,
    pub notes: Option<String>,
    /// Purchase transaction booked when the order was delivered.
    pub transaction_id: Option<TransactionId>,
    pub created_by: Option<UserId>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Record for PurchaseOrder {
    type Id = PurchaseOrderId;

    fn id(&self) -> PurchaseOrderId {
        self.id
    }

    fn set_id(&mut self, id: PurchaseOrderId) {
        self.id = id;
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewOrderLine {
    pub product_id: ProductId,
    pub quantity: u32,
    /// Defaults to the product's cost price.
    #[serde(default)]
    pub unit_cost: Option<Money>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewPurchaseOrder {
    pub supplier_id: SupplierId,
    #[serde(default)]
    pub expected_on: Option<NaiveDate>,
    #[serde(default)]
    pub notes: Option<String>,
    pub lines: Vec<NewOrderLine>,
}

/// Changes allowed while an order is still pending.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PurchaseOrderUpdate {
    #[serde(default, deserialize_with = "crate::catalog::domain::double_option")]
    pub expected_on: Option<Option<NaiveDate>>,
    #[serde(default, deserialize_with = "crate::catalog::domain::double_option")]
    pub notes: Option<Option<String>>,
    #[serde(default)]
    pub lines: Option<Vec<NewOrderLine>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PurchaseOrderFilter {
    #[serde(default)]
    pub status: Option<OrderStatus>,
    #[serde(default)]
    pub supplier_id: Option<SupplierId>,
}

impl PurchaseOrderFilter {
    pub fn matches(&self, order: &PurchaseOrder) -> bool {
        self.status.map_or(true, |status| status == order.status)
            && self
                .supplier_id
                .map_or(true, |supplier_id| supplier_id == order.supplier_id)
    }
}
