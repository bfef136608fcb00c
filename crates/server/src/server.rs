use axum::{
    Router,
    extract::{Request, State},
    http::StatusCode,
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{get, post, put},
};
use axum_extra::{
    TypedHeader,
    headers::{Error as AxumError, Header},
};

use std::sync::Arc;

use crate::{ServerError, allocations, budgets, goals, months, transactions};
use engine::Engine;

static USER_ID_HEADER: axum::http::HeaderName = axum::http::HeaderName::from_static("x-user-id");

#[derive(Clone)]
pub struct ServerState {
    pub engine: Arc<Engine>,
}

/// `TypedHeader` for the caller identity.
///
/// The upstream gateway authenticates the caller and forwards their id in
/// the "x-user-id" header.
#[derive(Debug)]
struct UserIdHeader(String);

impl Header for UserIdHeader {
    fn name() -> &'static axum::http::HeaderName {
        &USER_ID_HEADER
    }

    fn decode<'i, I>(values: &mut I) -> Result<Self, AxumError>
    where
        Self: Sized,
        I: Iterator<Item = &'i axum::http::HeaderValue>,
    {
        let value = values.next().ok_or_else(AxumError::invalid)?;
        let Ok(value) = value.to_str() else {
            return Err(AxumError::invalid());
        };
        let value = value.trim();
        if value.is_empty() {
            return Err(AxumError::invalid());
        }

        Ok(UserIdHeader(value.to_string()))
    }

    fn encode<E: Extend<axum::http::HeaderValue>>(&self, values: &mut E) {
        match axum::http::HeaderValue::from_str(&self.0) {
            Ok(value) => values.extend(std::iter::once(value)),
            Err(_) => tracing::error!("failed to encode x-user-id header"),
        }
    }
}

/// Resolves the caller's [`engine::Principal`] from their memberships and
/// stores it in the request extensions.
async fn principal(
    user_id: Option<TypedHeader<UserIdHeader>>,
    State(state): State<ServerState>,
    mut request: Request,
    next: Next,
) -> Result<Response, Response> {
    let Some(TypedHeader(UserIdHeader(user_id))) = user_id else {
        return Err(StatusCode::UNAUTHORIZED.into_response());
    };
    let principal = state
        .engine
        .principal_for(&user_id)
        .await
        .map_err(|err| ServerError::from(err).into_response())?;
    request.extensions_mut().insert(principal);
    Ok(next.run(request).await)
}

pub fn router(engine: Engine) -> Router {
    let state = ServerState {
        engine: Arc::new(engine),
    };
    Router::new()
        .route("/budgets", post(budgets::budget_new))
        .route("/budgets/{budget_id}/members", post(budgets::member_new))
        .route(
            "/budgets/{budget_id}/accounts",
            get(budgets::accounts).post(budgets::account_new),
        )
        .route(
            "/budgets/{budget_id}/accounts/recompute",
            post(budgets::accounts_recompute),
        )
        .route(
            "/budgets/{budget_id}/accounts/{account_id}",
            get(budgets::account),
        )
        .route(
            "/budgets/{budget_id}/category-groups",
            post(budgets::group_new),
        )
        .route("/budgets/{budget_id}/categories", post(budgets::category_new))
        .route(
            "/budgets/{budget_id}/categories/{category_id}/archive",
            post(budgets::category_archive),
        )
        .route(
            "/budgets/{budget_id}/recurring-bills",
            post(budgets::bill_new),
        )
        .route(
            "/budgets/{budget_id}/income-sources",
            post(budgets::income_source_new),
        )
        .route(
            "/budgets/{budget_id}/income-sources/{source_id}/allocation",
            put(budgets::income_allocation_set),
        )
        .route(
            "/budgets/{budget_id}/allocations",
            get(allocations::get).post(allocations::set),
        )
        .route(
            "/budgets/{budget_id}/transactions",
            get(transactions::list).post(transactions::create),
        )
        .route(
            "/budgets/{budget_id}/transactions/scheduled",
            get(months::scheduled),
        )
        .route(
            "/budgets/{budget_id}/transactions/installments",
            post(transactions::installments),
        )
        .route(
            "/budgets/{budget_id}/transactions/{transaction_id}",
            get(transactions::get)
                .patch(transactions::update)
                .delete(transactions::delete),
        )
        .route("/budgets/{budget_id}/start-month", post(months::start))
        .route("/budgets/{budget_id}/close-month", post(months::close))
        .route("/budgets/{budget_id}/month-status", get(months::status))
        .route(
            "/budgets/{budget_id}/goals",
            get(goals::list).post(goals::goal_new),
        )
        .route(
            "/budgets/{budget_id}/goals/{goal_id}/contributions",
            post(goals::contribute),
        )
        .route_layer(middleware::from_fn_with_state(state.clone(), principal))
        .with_state(state)
}

pub async fn run_with_listener(
    engine: Engine,
    listener: tokio::net::TcpListener,
) -> Result<(), std::io::Error> {
    let addr = listener.local_addr()?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, router(engine)).await
}
