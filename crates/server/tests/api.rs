use axum::{
    Router,
    body::Body,
    http::{Method, Request, StatusCode},
};
use engine::{Account, Engine, Schedule, StartMonthOutcome, Transaction, TransactionPage};
use http_body_util::BodyExt;
use migration::MigratorTrait;
use sea_orm::Database;
use serde_json::{Value, json};
use tower::ServiceExt;
use uuid::Uuid;

async fn app() -> Router {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    let engine = Engine::builder().database(db).build().await.unwrap();
    server::router(engine)
}

async fn send(
    app: &Router,
    method: Method,
    uri: &str,
    user: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(user) = user {
        builder = builder.header("x-user-id", user);
    }
    let request = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(serde_json::to_vec(&body).unwrap()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

fn id_of(value: &Value) -> Uuid {
    serde_json::from_value(value["id"].clone()).unwrap()
}

/// Budget owned by alice with one checking account.
async fn setup(app: &Router) -> (Uuid, Uuid) {
    let (status, body) = send(
        app,
        Method::POST,
        "/budgets",
        Some("alice"),
        Some(json!({ "name": "Home", "member_name": "Alice" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let budget_id = id_of(&body);

    let (status, body) = send(
        app,
        Method::POST,
        &format!("/budgets/{budget_id}/accounts"),
        Some("alice"),
        Some(json!({ "name": "Checking", "kind": "checking" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    (budget_id, id_of(&body))
}

#[tokio::test]
async fn missing_user_header_is_unauthorized() {
    let app = app().await;
    let (status, _) = send(
        &app,
        Method::POST,
        "/budgets",
        None,
        Some(json!({ "name": "Home", "member_name": "Alice" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn transactions_move_account_balances() {
    let app = app().await;
    let (budget_id, checking) = setup(&app).await;

    let (status, body) = send(
        &app,
        Method::POST,
        &format!("/budgets/{budget_id}/transactions"),
        Some("alice"),
        Some(json!({
            "account_id": checking,
            "kind": "income",
            "amount": 100000,
            "date": "2030-01-05",
            "description": "Salary",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let income: Transaction = serde_json::from_value(body).unwrap();

    let (status, body) = send(
        &app,
        Method::POST,
        &format!("/budgets/{budget_id}/transactions"),
        Some("alice"),
        Some(json!({
            "account_id": checking,
            "kind": "expense",
            "amount": 2500,
            "date": "2030-01-06",
            "description": "Bakery",
            "status": "pending",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let bakery: Transaction = serde_json::from_value(body).unwrap();

    let (status, body) = send(
        &app,
        Method::GET,
        &format!("/budgets/{budget_id}/accounts/{checking}"),
        Some("alice"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let account: Account = serde_json::from_value(body).unwrap();
    assert_eq!(account.balance, 97500);
    assert_eq!(account.cleared_balance, 100000);

    let (status, body) = send(
        &app,
        Method::GET,
        &format!("/budgets/{budget_id}/transactions?limit=1"),
        Some("alice"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let page: TransactionPage = serde_json::from_value(body).unwrap();
    assert_eq!(page.items.len(), 1);
    assert_eq!(page.items[0].id, bakery.id);
    let cursor = page.next_cursor.unwrap();

    let (status, body) = send(
        &app,
        Method::GET,
        &format!("/budgets/{budget_id}/transactions?limit=1&cursor={cursor}"),
        Some("alice"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let page: TransactionPage = serde_json::from_value(body).unwrap();
    assert_eq!(page.items[0].id, income.id);

    let (status, body) = send(
        &app,
        Method::PATCH,
        &format!("/budgets/{budget_id}/transactions/{}", bakery.id),
        Some("alice"),
        Some(json!({ "status": "cleared", "notes": null })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "cleared");

    let (status, body) = send(
        &app,
        Method::DELETE,
        &format!("/budgets/{budget_id}/transactions/{}", bakery.id),
        Some("alice"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["deleted"].as_array().unwrap().len(), 1);

    let (_, body) = send(
        &app,
        Method::GET,
        &format!("/budgets/{budget_id}/accounts/{checking}"),
        Some("alice"),
        None,
    )
    .await;
    let account: Account = serde_json::from_value(body).unwrap();
    assert_eq!((account.balance, account.cleared_balance), (100000, 100000));
}

#[tokio::test]
async fn engine_errors_map_to_status_codes() {
    let app = app().await;
    let (budget_id, checking) = setup(&app).await;

    let (status, body) = send(
        &app,
        Method::POST,
        &format!("/budgets/{budget_id}/transactions"),
        Some("alice"),
        Some(json!({
            "account_id": checking,
            "kind": "expense",
            "amount": 0,
            "date": "2030-01-06",
            "description": "Nothing",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["kind"], "validation");

    let (status, _) = send(
        &app,
        Method::GET,
        &format!("/budgets/{budget_id}/accounts"),
        Some("mallory"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = send(
        &app,
        Method::GET,
        &format!("/budgets/{budget_id}/transactions/{}", Uuid::new_v4()),
        Some("alice"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(
        &app,
        Method::GET,
        &format!("/budgets/{budget_id}/transactions?cursor=garbage"),
        Some("alice"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn viewers_read_but_cannot_write() {
    let app = app().await;
    let (budget_id, checking) = setup(&app).await;

    let (status, _) = send(
        &app,
        Method::POST,
        &format!("/budgets/{budget_id}/members"),
        Some("alice"),
        Some(json!({ "user_id": "bob", "name": "Bob", "role": "viewer" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = send(
        &app,
        Method::GET,
        &format!("/budgets/{budget_id}/accounts"),
        Some("bob"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 1);

    let (status, _) = send(
        &app,
        Method::POST,
        &format!("/budgets/{budget_id}/transactions"),
        Some("bob"),
        Some(json!({
            "account_id": checking,
            "kind": "expense",
            "amount": 1000,
            "date": "2030-01-06",
            "description": "Snacks",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn month_lifecycle_over_http() {
    let app = app().await;
    let (budget_id, checking) = setup(&app).await;

    let (_, body) = send(
        &app,
        Method::POST,
        &format!("/budgets/{budget_id}/category-groups"),
        Some("alice"),
        Some(json!({ "name": "Housing" })),
    )
    .await;
    let group_id = id_of(&body);
    let (_, body) = send(
        &app,
        Method::POST,
        &format!("/budgets/{budget_id}/categories"),
        Some("alice"),
        Some(json!({ "group_id": group_id, "name": "Rent", "behavior": "set_aside" })),
    )
    .await;
    let rent = id_of(&body);
    let (status, _) = send(
        &app,
        Method::POST,
        &format!("/budgets/{budget_id}/recurring-bills"),
        Some("alice"),
        Some(json!({
            "category_id": rent,
            "name": "Rent",
            "amount": 150000,
            "frequency": "monthly",
            "due_day": 10,
            "account_id": checking,
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = send(
        &app,
        Method::GET,
        &format!("/budgets/{budget_id}/transactions/scheduled?year=2030&month=1"),
        Some("alice"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let schedule: Schedule = serde_json::from_value(body).unwrap();
    assert!(schedule.items.is_empty());

    let (status, body) = send(
        &app,
        Method::POST,
        &format!("/budgets/{budget_id}/start-month"),
        Some("alice"),
        Some(json!({ "year": 2030, "month": 1 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let outcome: StartMonthOutcome = serde_json::from_value(body).unwrap();
    assert_eq!((outcome.created, outcome.skipped), (1, 0));

    let (_, body) = send(
        &app,
        Method::GET,
        &format!(
            "/budgets/{budget_id}/transactions/scheduled?from=2030-01-01&to=2030-01-15"
        ),
        Some("alice"),
        None,
    )
    .await;
    let schedule: Schedule = serde_json::from_value(body).unwrap();
    assert_eq!(schedule.items.len(), 1);
    assert!(schedule.items[0].is_materialized());
    assert_eq!(schedule.totals.bills.due, 150000);

    let (status, body) = send(
        &app,
        Method::GET,
        &format!("/budgets/{budget_id}/allocations?year=2030&month=1"),
        Some("alice"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["year"], 2030);

    let (status, _) = send(
        &app,
        Method::GET,
        &format!("/budgets/{budget_id}/transactions/scheduled?year=2030"),
        Some("alice"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = send(
        &app,
        Method::POST,
        &format!("/budgets/{budget_id}/close-month"),
        Some("alice"),
        Some(json!({ "year": 2030, "month": 1 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["state"], "closed");

    let (status, body) = send(
        &app,
        Method::POST,
        &format!("/budgets/{budget_id}/start-month"),
        Some("alice"),
        Some(json!({ "year": 2030, "month": 1 })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["kind"], "invalid_transition");
}
