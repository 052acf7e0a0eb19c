use axum::extract::FromRequestParts;
use axum::http::header;
use axum::http::request::Parts;
use chrono::NaiveDate;
use metrics_exporter_prometheus::PrometheusHandle;
use serde::Deserialize;
use shopledger::auth::{Permission, User};
use shopledger::domain::PageRequest;
use shopledger::error::{AppError, ServiceError};
use shopledger::ledger::Ledger;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use tracing::warn;

/// Process-level state for the operational endpoints.
#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Router state shared by every `/api/v1` handler.
#[derive(Clone)]
pub(crate) struct ApiContext {
    pub(crate) ledger: Ledger,
    pub(crate) default_page_size: u32,
}

impl ApiContext {
    pub(crate) fn new(ledger: Ledger, default_page_size: u32) -> Self {
        Self {
            ledger,
            default_page_size,
        }
    }

    pub(crate) fn page(&self, params: &PageParams) -> PageRequest {
        PageRequest::new(params.page, params.per_page, self.default_page_size)
    }
}

/// `?page=&per_page=` on list endpoints.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub(crate) struct PageParams {
    #[serde(default)]
    pub(crate) page: Option<u32>,
    #[serde(default)]
    pub(crate) per_page: Option<u32>,
}

/// The account behind the request's bearer token.
#[derive(Debug, Clone)]
pub(crate) struct CurrentUser(pub(crate) User);

impl CurrentUser {
    pub(crate) fn require(&self, permission: Permission) -> Result<&User, AppError> {
        if self.0.can(permission) {
            Ok(&self.0)
        } else {
            warn!(
                user = %self.0.username,
                role = self.0.role.label(),
                ?permission,
                "permission denied"
            );
            Err(ServiceError::Forbidden.into())
        }
    }
}

#[axum::async_trait]
impl FromRequestParts<ApiContext> for CurrentUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        context: &ApiContext,
    ) -> Result<Self, Self::Rejection> {
        let token = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(bearer_token)
            .ok_or(ServiceError::Unauthorized)?;
        let user = context.ledger.auth.authenticate(token)?;
        Ok(Self(user))
    }
}

pub(crate) fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|err| format!("failed to parse '{raw}' as YYYY-MM-DD ({err})"))
}

fn bearer_token(value: &str) -> Option<&str> {
    let (scheme, token) = value.split_once(' ')?;
    let token = token.trim();
    (scheme.eq_ignore_ascii_case("bearer") && !token.is_empty()).then_some(token)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bearer_scheme_is_case_insensitive() {
        assert_eq!(bearer_token("Bearer abc.def"), Some("abc.def"));
        assert_eq!(bearer_token("bearer  abc "), Some("abc"));
        assert_eq!(bearer_token("Basic abc"), None);
        assert_eq!(bearer_token("Bearer "), None);
        assert_eq!(bearer_token("token"), None);
    }

    #[test]
    fn dates_parse_as_iso() {
        assert_eq!(
            parse_date(" 2026-10-18 "),
            Ok(NaiveDate::from_ymd_opt(2026, 10, 18).expect("valid date"))
        );
        assert!(parse_date("18/10/2026").is_err());
    }
}
