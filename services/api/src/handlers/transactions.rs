use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::Router;
use chrono::NaiveDate;
use serde::Deserialize;
use shopledger::auth::Permission;
use shopledger::domain::{OrderStatus, Page, TransactionId};
use shopledger::error::AppError;
use shopledger::transactions::{
    transactions_csv, NewTransaction, Transaction, TransactionFilter, TransactionKind,
};
use tracing::info;

use super::StatusChange;
use crate::extract::{Json, Path, Query};
use crate::infra::{ApiContext, CurrentUser, PageParams};

pub(crate) fn router() -> Router<ApiContext> {
    Router::new()
        .route(
            "/api/v1/transactions",
            get(list_transactions).post(create_transaction),
        )
        .route("/api/v1/transactions/export", get(export_transactions))
        .route("/api/v1/transactions/:id", get(get_transaction))
        .route("/api/v1/transactions/:id/status", post(change_status))
}

#[derive(Debug, Default, Deserialize)]
struct TransactionQuery {
    #[serde(default)]
    kind: Option<TransactionKind>,
    #[serde(default)]
    status: Option<OrderStatus>,
    #[serde(default)]
    partner: Option<String>,
    #[serde(default)]
    from: Option<NaiveDate>,
    #[serde(default)]
    to: Option<NaiveDate>,
    #[serde(default)]
    page: Option<u32>,
    #[serde(default)]
    per_page: Option<u32>,
}

impl TransactionQuery {
    fn split(self) -> (TransactionFilter, PageParams) {
        let params = PageParams {
            page: self.page,
            per_page: self.per_page,
        };
        let filter = TransactionFilter {
            kind: self.kind,
            status: self.status,
            partner: self.partner,
            from: self.from,
            to: self.to,
        };
        (filter, params)
    }
}

async fn list_transactions(
    State(context): State<ApiContext>,
    current: CurrentUser,
    Query(query): Query<TransactionQuery>,
) -> Result<Json<Page<Transaction>>, AppError> {
    current.require(Permission::ViewRecords)?;
    let (filter, params) = query.split();
    Ok(Json(
        context
            .ledger
            .transactions
            .page(&filter, &context.page(&params))?,
    ))
}

/// Same filters as the list, without paging, as `text/csv`.
async fn export_transactions(
    State(context): State<ApiContext>,
    current: CurrentUser,
    Query(query): Query<TransactionQuery>,
) -> Result<impl IntoResponse, AppError> {
    current.require(Permission::ViewRecords)?;
    let (filter, _) = query.split();
    let transactions = context.ledger.transactions.list(&filter)?;
    let body = transactions_csv(&transactions)?;
    info!(rows = transactions.len(), "transactions exported");

    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8"),
            (
                header::CONTENT_DISPOSITION,
                "attachment; filename=\"transactions.csv\"",
            ),
        ],
        body,
    ))
}

async fn create_transaction(
    State(context): State<ApiContext>,
    current: CurrentUser,
    Json(new_transaction): Json<NewTransaction>,
) -> Result<(StatusCode, Json<Transaction>), AppError> {
    let actor = current.require(Permission::RecordTransactions)?.id;
    let transaction = context
        .ledger
        .transactions
        .create(new_transaction, Some(actor))?;
    Ok((StatusCode::CREATED, Json(transaction)))
}

async fn get_transaction(
    State(context): State<ApiContext>,
    current: CurrentUser,
    Path(id): Path<u64>,
) -> Result<Json<Transaction>, AppError> {
    current.require(Permission::ViewRecords)?;
    Ok(Json(context.ledger.transactions.get(TransactionId(id))?))
}

async fn change_status(
    State(context): State<ApiContext>,
    current: CurrentUser,
    Path(id): Path<u64>,
    Json(change): Json<StatusChange>,
) -> Result<Json<Transaction>, AppError> {
    let actor = current.require(Permission::ManageOrders)?.id;
    Ok(Json(context.ledger.transactions.update_status(
        TransactionId(id),
        change.status,
        Some(actor),
    )?))
}
