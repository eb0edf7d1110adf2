//! End-to-end flows through the scenario runner and suite executor, against
//! scripted in-memory ports.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use conform_application::{
    FixtureError, FixtureProvider, HttpClient, HttpClientError, ScenarioRunner, SuiteExecutor,
};
use conform_domain::{
    ComparisonOperator, Contract, Expected, FailureKind, HttpMethod, HttpRequest, HttpResponse, JsonType, Matcher,
    Scenario, ScenarioState, SortOrder, Step, Suite,
};
use pretty_assertions::assert_eq;
use serde_json::{Value, json};

type Handler = Box<dyn Fn(&HttpRequest) -> HttpResponse + Send + Sync>;

/// Answers requests from a route table and records every request it sees.
#[derive(Default)]
struct ScriptedApi {
    routes: HashMap<(HttpMethod, String), Handler>,
    seen: Mutex<Vec<HttpRequest>>,
    delay: Option<Duration>,
}

impl ScriptedApi {
    fn route(
        mut self,
        method: HttpMethod,
        url: &str,
        handler: impl Fn(&HttpRequest) -> HttpResponse + Send + Sync + 'static,
    ) -> Self {
        self.routes.insert((method, url.to_string()), Box::new(handler));
        self
    }

    fn seen(&self) -> Vec<HttpRequest> {
        self.seen.lock().unwrap().clone()
    }
}

#[async_trait]
impl HttpClient for ScriptedApi {
    async fn send(&self, request: &HttpRequest) -> Result<HttpResponse, HttpClientError> {
        self.seen.lock().unwrap().push(request.clone());
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if request.url.contains("/panic") {
            panic!("scripted panic");
        }
        match self.routes.get(&(request.method, request.url.clone())) {
            Some(handler) => Ok(handler(request)),
            None => Ok(HttpResponse::json(404, &json!({"message": "not found"}))),
        }
    }
}

#[derive(Default)]
struct Fixtures(HashMap<String, Value>);

impl Fixtures {
    fn with(mut self, name: &str, value: Value) -> Self {
        self.0.insert(name.to_string(), value);
        self
    }
}

#[async_trait]
impl FixtureProvider for Fixtures {
    async fn resolve(&self, name: &str) -> Result<Value, FixtureError> {
        self.0
            .get(name)
            .cloned()
            .ok_or_else(|| FixtureError::NotFound(name.to_string()))
    }
}

fn runner(api: &Arc<ScriptedApi>, fixtures: Fixtures) -> ScenarioRunner {
    ScenarioRunner::new(api.clone(), Arc::new(fixtures))
}

fn crud_scenario() -> Scenario {
    Scenario::new("product CRUD")
        .with_step(
            Step::new("create", HttpMethod::Post, "/products/add")
                .with_body(json!({"title": "X", "price": 123}))
                .expect_status(201)
                .with_contract(
                    Contract::new()
                        .rule("$.id", Matcher::is_type(JsonType::Number))
                        .unwrap(),
                )
                .capture("product_id", "$.id")
                .unwrap(),
        )
        .with_step(
            Step::new("read", HttpMethod::Get, "/products/{{product_id}}")
                .expect_status(200)
                .with_contract(
                    Contract::new()
                        .rule("$.id", Matcher::equals_capture("product_id"))
                        .unwrap(),
                ),
        )
        .with_step(
            Step::new("delete", HttpMethod::Delete, "/products/{{product_id}}")
                .expect_status(200)
                .with_contract(
                    Contract::new()
                        .rule("$.isDeleted", Matcher::equals(true))
                        .unwrap(),
                ),
        )
}

#[tokio::test]
async fn capture_round_trip_substitutes_exact_value() {
    let api = Arc::new(
        ScriptedApi::default()
            .route(HttpMethod::Post, "/products/add", |_| {
                HttpResponse::json(201, &json!({"id": 42, "title": "X", "price": 123}))
            })
            .route(HttpMethod::Get, "/products/42", |_| {
                HttpResponse::json(200, &json!({"id": 42, "title": "X"}))
            })
            .route(HttpMethod::Delete, "/products/42", |_| {
                HttpResponse::json(200, &json!({"id": 42, "isDeleted": true}))
            }),
    );

    let result = runner(&api, Fixtures::default()).run(&crud_scenario()).await;

    assert_eq!(result.state, ScenarioState::Passed, "{result:#?}");
    assert_eq!(result.steps.len(), 3);
    assert_eq!(result.skipped_steps, 0);
    let urls: Vec<String> = api.seen().into_iter().map(|r| r.url).collect();
    assert_eq!(urls, vec!["/products/add", "/products/42", "/products/42"]);
    assert_eq!(result.steps[0].captures[0].value, Some(json!(42)));
}

#[tokio::test]
async fn missing_id_halts_crud_flow_after_first_step() {
    let api = Arc::new(ScriptedApi::default().route(HttpMethod::Post, "/products/add", |_| {
        HttpResponse::json(201, &json!({"title": "X", "price": 123}))
    }));

    let result = runner(&api, Fixtures::default()).run(&crud_scenario()).await;

    assert_eq!(result.state, ScenarioState::Failed);
    assert_eq!(result.steps.len(), 1);
    assert_eq!(result.skipped_steps, 2);
    assert!(!result.steps[0].passed);
    assert_eq!(result.steps[0].rules[0].detail.as_deref(), Some("path not found"));
    assert_eq!(result.steps[0].captures[0].error.as_deref(), Some("path not found"));
    assert_eq!(api.seen().len(), 1);
}

#[tokio::test]
async fn typed_body_substitution_keeps_numbers() {
    let api = Arc::new(
        ScriptedApi::default()
            .route(HttpMethod::Get, "/products/1", |_| {
                HttpResponse::json(200, &json!({"id": 1, "price": 9.99}))
            })
            .route(HttpMethod::Post, "/carts/add", |request| {
                HttpResponse::json(201, request.body.as_ref().unwrap_or(&Value::Null))
            }),
    );
    let scenario = Scenario::new("cart")
        .with_step(
            Step::new("read", HttpMethod::Get, "/products/1")
                .capture("price", "$.price")
                .unwrap(),
        )
        .with_step(
            Step::new("add", HttpMethod::Post, "/carts/add")
                .with_body(json!({"price": "{{price}}", "note": "costs {{price}}"}))
                .expect_status(201),
        );

    let result = runner(&api, Fixtures::default()).run(&scenario).await;

    assert!(result.passed(), "{result:#?}");
    assert_eq!(
        api.seen()[1].body,
        Some(json!({"price": 9.99, "note": "costs 9.99"}))
    );
}

#[tokio::test]
async fn status_mismatch_is_reported_with_rules() {
    let api = Arc::new(ScriptedApi::default());
    let scenario = Scenario::new("missing product").with_step(
        Step::new("read", HttpMethod::Get, "/products/0")
            .expect_status(200)
            .with_contract(
                Contract::new()
                    .rule("$.message", Matcher::NotEmpty)
                    .unwrap(),
            ),
    );

    let result = runner(&api, Fixtures::default()).run(&scenario).await;
    let step = &result.steps[0];
    assert!(!step.passed);
    assert!(!step.status_matched);
    assert_eq!(step.actual_status, Some(404));
    assert!(step.rules[0].passed);
    assert_eq!(step.failure_kind, Some(FailureKind::Assertion));
}

#[tokio::test]
async fn fixtures_bind_before_validation() {
    let categories = json!(["beauty", "fragrances", "furniture"]);
    let api = Arc::new(ScriptedApi::default().route(
        HttpMethod::Get,
        "/products/category-list",
        |_| HttpResponse::json(200, &json!(["furniture", "beauty", "fragrances"])),
    ));
    let scenario = Scenario::new("categories").with_step(
        Step::new("list", HttpMethod::Get, "/products/category-list").with_contract(
            Contract::new()
                .rule("$", Matcher::set_equals(Expected::fixture("categories")))
                .unwrap(),
        ),
    );

    let result = runner(&api, Fixtures::default().with("categories", categories))
        .run(&scenario)
        .await;
    assert!(result.passed(), "{result:#?}");
}

#[tokio::test]
async fn unknown_fixture_fails_before_any_request() {
    let api = Arc::new(ScriptedApi::default());
    let scenario = Scenario::new("categories")
        .with_step(Step::new("warmup", HttpMethod::Get, "/products"))
        .with_step(
            Step::new("list", HttpMethod::Get, "/products/category-list").with_contract(
                Contract::new()
                    .rule("$", Matcher::set_equals(Expected::fixture("categories")))
                    .unwrap(),
            ),
        );

    let result = runner(&api, Fixtures::default()).run(&scenario).await;

    assert_eq!(result.state, ScenarioState::Failed);
    assert_eq!(result.failure_kind, Some(FailureKind::Configuration));
    assert_eq!(result.error.as_deref(), Some("fixture not found: categories"));
    assert_eq!(result.skipped_steps, 2);
    assert!(api.seen().is_empty());
}

#[tokio::test(start_paused = true)]
async fn timeout_is_a_transport_failure() {
    let api = Arc::new(ScriptedApi {
        delay: Some(Duration::from_secs(60)),
        ..ScriptedApi::default()
    });
    let scenario = Scenario::new("slow")
        .with_step(Step::new("read", HttpMethod::Get, "/products"))
        .with_step(Step::new("never", HttpMethod::Get, "/products/1"));

    let result = runner(&api, Fixtures::default())
        .with_timeout(Duration::from_millis(100))
        .run(&scenario)
        .await;

    assert_eq!(result.failure_kind, Some(FailureKind::Transport));
    assert_eq!(result.steps.len(), 1);
    assert_eq!(
        result.steps[0].error.as_deref(),
        Some("request timed out after 100ms")
    );
    assert_eq!(result.skipped_steps, 1);
}

fn page_scenario(name: &str, url: &str, skip: u64) -> Scenario {
    Scenario::new(name).with_step(
        Step::new("page", HttpMethod::Get, url).with_contract(
            Contract::new()
                .rule("$.products", Matcher::length(Matcher::equals(10)))
                .unwrap()
                .rule("$.skip", Matcher::equals(skip))
                .unwrap()
                .rule("$.limit", Matcher::equals(10))
                .unwrap()
                .rule("$.total", Matcher::compare(ComparisonOperator::GreaterThan, 10))
                .unwrap()
                .rule(
                    "$.products",
                    Matcher::is_sorted_by("title", SortOrder::Asc).unwrap(),
                )
                .unwrap(),
        ),
    )
}

fn page(skip: u64) -> HttpResponse {
    page_of(skip, 194)
}

fn page_of(skip: u64, total: u64) -> HttpResponse {
    let products: Vec<Value> = (skip + 1..=skip + 10)
        .map(|id| json!({"id": id, "title": format!("Item {id:03}")}))
        .collect();
    HttpResponse::json(
        200,
        &json!({"products": products, "total": total, "skip": skip, "limit": 10}),
    )
}

#[tokio::test]
async fn suite_isolates_failures_and_keeps_declaration_order() {
    let api = Arc::new(
        ScriptedApi::default()
            .route(HttpMethod::Get, "/products?limit=10&skip=10", |_| page(10))
            // The server ignores skip here, so only the skip rule fails.
            .route(HttpMethod::Get, "/products?limit=10&skip=20", |_| page(0)),
    );

    let suite = Suite::new("pagination")
        .with_scenario(page_scenario("second page", "/products?limit=10&skip=10", 10))
        .with_scenario(page_scenario("third page", "/products?limit=10&skip=20", 20))
        .with_scenario(Scenario::new("crashes").with_step(Step::new(
            "boom",
            HttpMethod::Get,
            "/panic",
        )))
        .with_scenario(Scenario::new("empty"));

    let executor = SuiteExecutor::new(api.clone(), Arc::new(Fixtures::default())).with_concurrency(2);
    let report = executor.run_suite(&suite).await;

    let names: Vec<&str> = report.scenarios.iter().map(|s| s.name.as_str()).collect();
    assert_eq!(names, vec!["second page", "third page", "crashes", "empty"]);
    assert_eq!(report.total, 4);
    assert_eq!(report.passed, 1);
    assert_eq!(report.failed, 3);
    assert!(!report.all_passed());

    let third = &report.scenarios[1].steps[0];
    let failed: Vec<&str> = third.failed_rules().map(|r| r.path.as_str()).collect();
    assert_eq!(failed, vec!["$.skip"]);

    assert_eq!(report.scenarios[2].failure_kind, Some(FailureKind::Internal));
    assert_eq!(
        report.scenarios[3].failure_kind,
        Some(FailureKind::Configuration)
    );
    assert!(api.seen().iter().all(|r| r.url != "/empty"));
}

#[tokio::test]
async fn pagination_total_fails_on_its_own() {
    let api = Arc::new(ScriptedApi::default().route(
        HttpMethod::Get,
        "/products?limit=10&skip=10",
        |_| page_of(10, 5),
    ));

    let result = runner(&api, Fixtures::default())
        .run(&page_scenario("short catalog", "/products?limit=10&skip=10", 10))
        .await;

    assert_eq!(result.failure_kind, Some(FailureKind::Assertion));
    let step = &result.steps[0];
    let failed: Vec<&str> = step.failed_rules().map(|r| r.path.as_str()).collect();
    assert_eq!(failed, vec!["$.total"]);
    assert_eq!(step.rules.len(), 5);
    assert_eq!(step.rules.iter().filter(|r| r.passed).count(), 4);
}

#[tokio::test]
async fn suite_variables_reach_scenarios() {
    let api = Arc::new(ScriptedApi::default().route(
        HttpMethod::Get,
        "/products/category/smartphones",
        |_| HttpResponse::json(200, &json!({"products": [{"category": "smartphones"}]})),
    ));
    let mut suite = Suite::new("by category").with_scenario(
        Scenario::new("smartphones").with_step(
            Step::new("list", HttpMethod::Get, "/products/category/{{category}}").with_contract(
                Contract::new()
                    .rule(
                        "$.products",
                        Matcher::for_each(
                            Contract::new()
                                .rule("$.category", Matcher::equals("smartphones"))
                                .unwrap(),
                        ),
                    )
                    .unwrap(),
            ),
        ),
    );
    suite
        .variables
        .insert("category".to_string(), json!("smartphones"));

    let report = SuiteExecutor::new(api, Arc::new(Fixtures::default()))
        .run_suite(&suite)
        .await;
    assert!(report.all_passed(), "{report:#?}");
}
