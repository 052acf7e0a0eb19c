use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{Money, MovementId, ProductId, UserId};
use crate::store::Record;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MovementKind {
    /// Goods received from a supplier.
    Receipt,
    /// Goods leaving with a confirmed sale.
    Sale,
    /// Goods coming back from a cancelled sale.
    Return,
    /// Manual correction or opening balance.
    Adjustment,
}

/// Journal entry for one change of stock on hand.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StockMovement {
    pub id: MovementId,
    pub product_id: ProductId,
    pub delta: i64,
    pub kind: MovementKind,
    pub reference: Option<String>,
    pub note: Option<String>,
    pub quantity_after: i64,
    pub created_by: Option<UserId>,
    pub created_at: DateTime<Utc>,
}

impl Record for StockMovement {
    type Id = MovementId;

    fn id(&self) -> MovementId {
        self.id
    }

    fn set_id(&mut self, id: MovementId) {
        self.id = id;
    }
}

/// Requested change, validated as part of a batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StockChange {
    pub product_id: ProductId,
    pub delta: i64,
    pub kind: MovementKind,
    pub reference: Option<String>,
    pub note: Option<String>,
}

impl StockChange {
    pub fn new(product_id: ProductId, delta: i64, kind: MovementKind) -> Self {
        Self {
            product_id,
            delta,
            kind,
            reference: None,
            note: None,
        }
    }

    pub fn with_reference(mut self, reference: impl Into<String>) -> Self {
        self.reference = Some(reference.into());
        self
    }

    pub fn with_note(mut self, note: Option<String>) -> Self {
        self.note = note;
        self
    }
}

/// Manual adjustment request as received from the API.
#[derive(Debug, Clone, Deserialize)]
pub struct StockAdjustment {
    pub product_id: ProductId,
    pub delta: i64,
    #[serde(default)]
    pub note: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct MovementFilter {
    #[serde(default)]
    pub product_id: Option<ProductId>,
    #[serde(default)]
    pub kind: Option<MovementKind>,
}

impl MovementFilter {
    pub fn matches(&self, movement: &StockMovement) -> bool {
        self.product_id.map_or(true, |id| id == movement.product_id)
            && self.kind.map_or(true, |kind| kind == movement.kind)
    }
}

/// Value of the stock on hand.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct InventoryValuation {
    pub product_count: usize,
    pub units_on_hand: i64,
    pub cost_value: Money,
    pub retail_value: Money,
}
