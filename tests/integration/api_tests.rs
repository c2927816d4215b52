//! HTTP client tests against an in-process mock catalog backend

use std::sync::{Arc, Mutex};

use axum::{
    extract::{RawQuery, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use serde_json::{json, Value};

use elidune_discovery::{
    api::{CatalogApi, CatalogFilter, CatalogQuery, HttpCatalogApi},
    config::{AppConfig, BackendConfig},
    error::ErrorCode,
    models::{NumericRange, SortOrder},
    services::Services,
    Location,
};

#[derive(Clone, Default)]
struct MockBackend {
    queries: Arc<Mutex<Vec<String>>>,
    catalog_body: Arc<Mutex<Option<(StatusCode, String)>>>,
    instant_body: Arc<Mutex<Option<(StatusCode, String)>>>,
}

impl MockBackend {
    fn queries(&self) -> Vec<String> {
        self.queries.lock().unwrap().clone()
    }

    fn set_catalog(&self, status: StatusCode, body: impl Into<String>) {
        *self.catalog_body.lock().unwrap() = Some((status, body.into()));
    }

    fn set_instant(&self, status: StatusCode, body: impl Into<String>) {
        *self.instant_body.lock().unwrap() = Some((status, body.into()));
    }
}

fn respond(scripted: Option<(StatusCode, String)>, fallback: Value) -> Response {
    let (status, body) = scripted.unwrap_or((StatusCode::OK, fallback.to_string()));
    (status, [(header::CONTENT_TYPE, "application/json")], body).into_response()
}

async fn catalog_filter(State(mock): State<MockBackend>, RawQuery(query): RawQuery) -> Response {
    mock.queries.lock().unwrap().push(query.unwrap_or_default());
    let scripted = mock.catalog_body.lock().unwrap().clone();
    respond(
        scripted,
        json!({
            "result": [
                {"id": 7, "title": "Dune", "authors": ["Frank Herbert"], "publishedYear": 1965, "price": 450000},
                {"id": "8", "title": "Dune Messiah", "authors": ["Frank Herbert"]}
            ],
            "pagination": {"currentPage": 1, "totalPages": 3, "totalItems": 6, "pageSize": 2}
        }),
    )
}

async fn instant_search(State(mock): State<MockBackend>, RawQuery(query): RawQuery) -> Response {
    mock.queries.lock().unwrap().push(query.unwrap_or_default());
    let scripted = mock.instant_body.lock().unwrap().clone();
    respond(
        scripted,
        json!({
            "data": {
                "suggestions": {
                    "titles": [{"text": "Dune"}, {"text": "Dune Messiah"}],
                    "authors": [{"text": "Frank Herbert"}]
                },
                "books": []
            }
        }),
    )
}

/// Start the mock backend and return it with the base URL to reach it
async fn spawn_backend() -> (MockBackend, String) {
    let mock = MockBackend::default();
    let app = Router::new()
        .route("/api/v1/catalog/filter", get(catalog_filter))
        .route("/api/v1/search/instant", get(instant_search))
        .with_state(mock.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind mock backend");
    let addr = listener.local_addr().expect("No local address");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("Mock backend failed");
    });

    (mock, format!("http://{}/api/v1/", addr))
}

fn client(base_url: &str) -> HttpCatalogApi {
    HttpCatalogApi::new(&BackendConfig {
        base_url: base_url.to_string(),
        timeout_ms: 5_000,
    })
    .expect("Failed to build client")
}

#[tokio::test]
async fn test_filter_sends_repeated_keys() {
    let (mock, base_url) = spawn_backend().await;
    let api = client(&base_url);

    let query = CatalogQuery::new(
        CatalogFilter {
            search: Some("dune".to_string()),
            genres: vec!["Fiction".to_string(), "Sci-Fi".to_string()],
            language: Some("en".to_string()),
            price_range: Some(NumericRange::new(300_000, 1_200_000)),
            year_range: None,
            order: SortOrder::PriceAsc,
        },
        2,
    );
    let page = api.filter_catalog(&query).await.unwrap().expect("Expected a page");

    assert_eq!(page.result.len(), 2);
    assert_eq!(page.result[0].id, "7");
    assert_eq!(page.result[0].published_year, Some(1965));
    assert_eq!(page.pagination.total_pages, 3);

    assert_eq!(
        mock.queries(),
        vec![
            "page=2&priceRange=300000&priceRange=1200000&search=dune&order=price_asc\
             &genres=Fiction&genres=Sci-Fi&language=en"
                .to_string()
        ]
    );
}

#[tokio::test]
async fn test_inactive_filters_are_omitted() {
    let (mock, base_url) = spawn_backend().await;
    let api = client(&base_url);

    api.filter_catalog(&CatalogQuery::new(CatalogFilter::default(), 1))
        .await
        .unwrap();

    assert_eq!(mock.queries(), vec!["page=1&order=newest".to_string()]);
}

#[tokio::test]
async fn test_wrapped_and_null_data() {
    let (mock, base_url) = spawn_backend().await;
    let api = client(&base_url);
    let query = CatalogQuery::new(CatalogFilter::default(), 1);

    mock.set_catalog(
        StatusCode::OK,
        json!({"data": {"result": [{"id": 1, "title": "Solaris"}], "pagination": {"currentPage": 1, "totalPages": 1, "totalItems": 1, "pageSize": 20}}}).to_string(),
    );
    let page = api.filter_catalog(&query).await.unwrap().expect("Expected a page");
    assert_eq!(page.result[0].title, "Solaris");

    mock.set_catalog(StatusCode::OK, json!({"data": null}).to_string());
    assert!(api.filter_catalog(&query).await.unwrap().is_none());

    mock.set_catalog(StatusCode::OK, "<html>maintenance</html>");
    assert!(api.filter_catalog(&query).await.unwrap().is_none());
}

#[tokio::test]
async fn test_server_error_is_network_error() {
    let (mock, base_url) = spawn_backend().await;
    let api = client(&base_url);

    mock.set_catalog(StatusCode::INTERNAL_SERVER_ERROR, "{}");
    let err = api
        .filter_catalog(&CatalogQuery::new(CatalogFilter::default(), 1))
        .await
        .unwrap_err();
    assert_eq!(err.code(), ErrorCode::Network);
    assert!(err.is_recoverable());

    mock.set_instant(StatusCode::BAD_GATEWAY, "");
    assert!(api.instant_search("dune").await.is_err());
}

#[tokio::test]
async fn test_instant_search_unwraps_data() {
    let (mock, base_url) = spawn_backend().await;
    let api = client(&base_url);

    let response = api.instant_search("dune mess").await.unwrap();
    let titles: Vec<&str> = response.suggestions.titles.iter().map(|t| t.text.as_str()).collect();
    assert_eq!(titles, vec!["Dune", "Dune Messiah"]);
    assert_eq!(response.suggestions.authors[0].text, "Frank Herbert");
    assert_eq!(mock.queries(), vec!["q=dune+mess".to_string()]);
}

#[tokio::test]
async fn test_session_end_to_end() {
    let (mock, base_url) = spawn_backend().await;
    let mut config = AppConfig::default();
    config.backend.base_url = base_url;
    let services = Services::new(Arc::new(config)).unwrap();

    let location = Location::parse("https://lib.example/catalog?genres=Fiction&minPrice=300000").unwrap();
    let mut session = services.session(location, 1440.0);
    session.refresh().await;

    assert_eq!(session.fetcher().items().len(), 2);
    assert!(session.fetcher().has_next_page());
    let sent = mock.queries();
    assert_eq!(sent.len(), 1);
    assert!(sent[0].starts_with("page=1&priceRange=300000&priceRange="));
    assert!(sent[0].ends_with("&order=newest&genres=Fiction"));

    session.update(|store| store.set_search_query("dune"));
    session.refresh().await;
    assert!(mock.queries()[1].contains("&search=dune&"));
    assert_eq!(
        session.store().location().query().as_deref(),
        Some("q=dune&genres=Fiction&minPrice=300000")
    );
}
