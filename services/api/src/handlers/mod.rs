//! `/api/v1` handlers, one router per resource.

mod auth;
mod catalog;
mod inventory;
mod purchasing;
mod statistics;
mod transactions;

use axum::Router;
use serde::Deserialize;
use shopledger::domain::OrderStatus;

use crate::infra::ApiContext;

/// Body of the `.../:id/status` endpoints.
#[derive(Debug, Deserialize)]
pub(crate) struct StatusChange {
    pub(crate) status: OrderStatus,
}

pub(crate) fn api_router() -> Router<ApiContext> {
    Router::new()
        .merge(auth::router())
        .merge(catalog::router())
        .merge(inventory::router())
        .merge(purchasing::router())
        .merge(transactions::router())
        .merge(statistics::router())
}
