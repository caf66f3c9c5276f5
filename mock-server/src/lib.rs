use std::{collections::BTreeMap, sync::Arc};

use axum::{
    extract::{Path, Query, Request, State},
    http::{header, HeaderMap, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{get, post, put},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tokio::{net::TcpListener, sync::RwLock};
use uuid::Uuid;

pub const API_KEY_HEADER: &str = "x-textrazor-key";

const DEFAULT_PAGE_LIMIT: usize = 100;

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DictionaryProperties {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub match_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub case_insensitive: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Entry {
    pub id: String,
    pub text: String,
    #[serde(default)]
    pub data: BTreeMap<String, Vec<String>>,
}

#[derive(Deserialize)]
pub struct NewEntry {
    pub id: Option<String>,
    pub text: String,
    #[serde(default)]
    pub data: BTreeMap<String, Vec<String>>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub category_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub query: Option<String>,
}

#[derive(Clone, Debug, Default)]
pub struct Dictionary {
    pub properties: DictionaryProperties,
    pub entries: Vec<Entry>,
}

#[derive(Debug, Default)]
pub struct Store {
    pub dictionaries: BTreeMap<String, Dictionary>,
    pub classifiers: BTreeMap<String, Vec<Category>>,
    pub requests_today: u64,
}

pub type Db = Arc<RwLock<Store>>;

#[derive(Clone)]
pub struct AppState {
    db: Db,
    api_key: Arc<str>,
}

#[derive(Deserialize)]
pub struct Page {
    pub limit: Option<usize>,
    pub offset: Option<usize>,
}

/// JSON error body in the service's `{"ok":false,"error":...}` shape.
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(json!({"ok": false, "error": self.message}))).into_response()
    }
}

type ApiResult = Result<Json<Value>, ApiError>;

fn ok(response: Value) -> ApiResult {
    Ok(Json(json!({"ok": true, "response": response})))
}

pub fn app(api_key: &str) -> Router {
    let state = AppState {
        db: Arc::new(RwLock::new(Store::default())),
        api_key: Arc::from(api_key),
    };
    Router::new()
        .route("/", post(analyze))
        .route("/entities/", get(list_dictionaries))
        .route(
            "/entities/{id}",
            get(get_dictionary).put(create_dictionary).delete(delete_dictionary),
        )
        .route("/entities/{id}/", post(add_entries))
        .route("/entities/{id}/_all", get(list_entries))
        .route("/entities/{id}/{entry_id}", get(get_entry).delete(delete_entry))
        .route("/categories/{id}", put(create_classifier).delete(delete_classifier))
        .route("/categories/{id}/_all", get(list_categories))
        .route(
            "/categories/{id}/{category_id}",
            get(get_category).delete(delete_category),
        )
        .route("/account/", get(account))
        .layer(middleware::from_fn_with_state(state.clone(), require_key))
        .with_state(state)
}

pub async fn run(listener: TcpListener, api_key: &str) -> Result<(), std::io::Error> {
    axum::serve(listener, app(api_key)).await
}

async fn require_key(State(state): State<AppState>, request: Request, next: Next) -> Response {
    let supplied = request
        .headers()
        .get(API_KEY_HEADER)
        .and_then(|value| value.to_str().ok());
    if supplied != Some(state.api_key.as_ref()) {
        tracing::warn!(path = %request.uri().path(), "rejected request with invalid API key");
        return ApiError::new(StatusCode::UNAUTHORIZED, "Invalid or missing API key").into_response();
    }
    next.run(request).await
}

fn page<T: Clone>(items: &[T], page: &Page) -> Vec<T> {
    items
        .iter()
        .skip(page.offset.unwrap_or(0))
        .take(page.limit.unwrap_or(DEFAULT_PAGE_LIMIT))
        .cloned()
        .collect()
}

// --- analysis ---

struct Form {
    pairs: Vec<(String, String)>,
}

impl Form {
    fn parse(body: &str) -> Self {
        Self {
            pairs: url::form_urlencoded::parse(body.as_bytes()).into_owned().collect(),
        }
    }

    fn all(&self, key: &str) -> Vec<&str> {
        self.pairs
            .iter()
            .filter(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
            .collect()
    }

    fn first(&self, key: &str) -> Option<&str> {
        self.all(key).into_iter().next()
    }

    fn flag(&self, key: &str) -> bool {
        self.first(key) == Some("true")
    }
}

async fn analyze(State(state): State<AppState>, body: String) -> ApiResult {
    let form = Form::parse(&body);
    let mut store = state.db.write().await;
    store.requests_today += 1;

    let text = match (form.first("text"), form.first("url")) {
        (Some(text), None) => text,
        (None, Some(url)) => {
            return Err(ApiError::bad_request(format!(
                "Unable to download {url}: this server does not fetch documents"
            )))
        }
        _ => return Err(ApiError::bad_request("Please specify exactly one of text or url")),
    };

    let extractors = form.all("extractors");
    let classifiers = form.all("classifiers");
    if extractors.is_empty() && classifiers.is_empty() {
        return Err(ApiError::bad_request("Please specify at least one extractor"));
    }

    let mut response = json!({
        "language": form.first("languageOverride").unwrap_or("eng"),
        "languageIsReliable": true,
    });
    if form.flag("cleanup.returnCleaned") {
        response["cleanedText"] = json!(text);
    }
    if form.flag("cleanup.returnRaw") {
        response["rawText"] = json!(text);
    }

    if extractors.contains(&"words") {
        let words: Vec<Value> = text
            .split_whitespace()
            .enumerate()
            .map(|(position, token)| json!({"position": position, "token": token}))
            .collect();
        response["sentences"] = json!([{"position": 0, "words": words}]);
    }

    if extractors.contains(&"entities") {
        let mut entities = Vec::new();
        for dictionary_id in form.all("entities.dictionaries") {
            let dictionary = store
                .dictionaries
                .get(dictionary_id)
                .ok_or_else(|| ApiError::bad_request(format!("Unknown dictionary: {dictionary_id}")))?;
            let case_insensitive = dictionary.properties.case_insensitive.unwrap_or(false);
            for entry in &dictionary.entries {
                let found = if case_insensitive {
                    text.to_lowercase().contains(&entry.text.to_lowercase())
                } else {
                    text.contains(&entry.text)
                };
                if found {
                    entities.push(json!({
                        "entityId": entry.id,
                        "matchedText": entry.text,
                        "customEntityId": dictionary_id,
                        "data": entry.data,
                    }));
                }
            }
        }
        response["entities"] = Value::Array(entities);
    }

    if !classifiers.is_empty() {
        let max_categories = form
            .first("classifier.maxCategories")
            .and_then(|n| n.parse::<usize>().ok())
            .unwrap_or(usize::MAX);
        let lowered = text.to_lowercase();
        let mut categories = Vec::new();
        for classifier_id in classifiers {
            let defined = store
                .classifiers
                .get(classifier_id)
                .ok_or_else(|| ApiError::bad_request(format!("Unknown classifier: {classifier_id}")))?;
            for category in defined {
                let matched = category
                    .label
                    .as_deref()
                    .is_some_and(|label| lowered.contains(&label.to_lowercase()));
                if matched {
                    categories.push(json!({
                        "classifierId": classifier_id,
                        "categoryId": category.category_id,
                        "label": category.label,
                        "score": 1.0,
                    }));
                }
            }
        }
        categories.truncate(max_categories);
        response["categories"] = Value::Array(categories);
    }

    Ok(Json(json!({"ok": true, "time": 0.0, "response": response})))
}

// --- dictionaries ---

async fn list_dictionaries(State(state): State<AppState>) -> ApiResult {
    let store = state.db.read().await;
    let dictionaries: Vec<Value> = store
        .dictionaries
        .iter()
        .map(|(id, dictionary)| dictionary_json(id, dictionary))
        .collect();
    ok(json!({"dictionaries": dictionaries}))
}

fn dictionary_json(id: &str, dictionary: &Dictionary) -> Value {
    let mut value = json!(dictionary.properties);
    value["id"] = json!(id);
    value
}

async fn create_dictionary(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(properties): Json<DictionaryProperties>,
) -> ApiResult {
    let mut store = state.db.write().await;
    let dictionary = store.dictionaries.entry(id).or_default();
    dictionary.properties = properties;
    Ok(Json(json!({"ok": true})))
}

async fn get_dictionary(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult {
    let store = state.db.read().await;
    let dictionary = store
        .dictionaries
        .get(&id)
        .ok_or_else(|| ApiError::not_found(format!("No dictionary with id {id}")))?;
    ok(dictionary_json(&id, dictionary))
}

async fn delete_dictionary(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult {
    let mut store = state.db.write().await;
    store
        .dictionaries
        .remove(&id)
        .ok_or_else(|| ApiError::not_found(format!("No dictionary with id {id}")))?;
    Ok(Json(json!({"ok": true})))
}

async fn list_entries(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(paging): Query<Page>,
) -> ApiResult {
    let store = state.db.read().await;
    let dictionary = store
        .dictionaries
        .get(&id)
        .ok_or_else(|| ApiError::not_found(format!("No dictionary with id {id}")))?;
    ok(json!({
        "entries": page(&dictionary.entries, &paging),
        "total": dictionary.entries.len(),
    }))
}

async fn add_entries(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(entries): Json<Vec<NewEntry>>,
) -> ApiResult {
    if entries.is_empty() {
        return Err(ApiError::bad_request("Array of new entries cannot be empty"));
    }
    let mut store = state.db.write().await;
    let dictionary = store
        .dictionaries
        .get_mut(&id)
        .ok_or_else(|| ApiError::not_found(format!("No dictionary with id {id}")))?;

    let mut added = Vec::with_capacity(entries.len());
    for new in entries {
        let entry = Entry {
            id: new.id.unwrap_or_else(|| Uuid::new_v4().to_string()),
            text: new.text,
            data: new.data,
        };
        dictionary.entries.retain(|existing| existing.id != entry.id);
        dictionary.entries.push(entry.clone());
        added.push(entry);
    }
    ok(json!({"entries": added}))
}

async fn get_entry(
    State(state): State<AppState>,
    Path((id, entry_id)): Path<(String, String)>,
) -> ApiResult {
    let store = state.db.read().await;
    let entry = store
        .dictionaries
        .get(&id)
        .and_then(|dictionary| dictionary.entries.iter().find(|e| e.id == entry_id))
        .ok_or_else(|| ApiError::not_found(format!("No entry {entry_id} in dictionary {id}")))?;
    ok(json!(entry))
}

async fn delete_entry(
    State(state): State<AppState>,
    Path((id, entry_id)): Path<(String, String)>,
) -> ApiResult {
    let mut store = state.db.write().await;
    let dictionary = store
        .dictionaries
        .get_mut(&id)
        .ok_or_else(|| ApiError::not_found(format!("No dictionary with id {id}")))?;
    let before = dictionary.entries.len();
    dictionary.entries.retain(|e| e.id != entry_id);
    if dictionary.entries.len() == before {
        return Err(ApiError::not_found(format!("No entry {entry_id} in dictionary {id}")));
    }
    Ok(Json(json!({"ok": true})))
}

// --- classifiers ---

/// `categoryId,label,query` per line; the query may itself contain commas.
fn parse_csv(body: &str) -> Result<Vec<Category>, ApiError> {
    body.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(|line| {
            let mut fields = line.splitn(3, ',');
            let category_id = fields.next().unwrap_or_default().trim();
            if category_id.is_empty() {
                return Err(ApiError::bad_request(format!("Missing category id in line: {line}")));
            }
            let non_empty = |field: Option<&str>| {
                field
                    .map(str::trim)
                    .filter(|f| !f.is_empty())
                    .map(str::to_string)
            };
            Ok(Category {
                category_id: category_id.to_string(),
                label: non_empty(fields.next()),
                query: non_empty(fields.next()),
            })
        })
        .collect()
}

async fn create_classifier(
    State(state): State<AppState>,
    Path(id): Path<String>,
    headers: HeaderMap,
    body: String,
) -> ApiResult {
    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();
    let categories = if content_type.starts_with("application/csv") || content_type.starts_with("text/csv") {
        parse_csv(&body)?
    } else {
        serde_json::from_str::<Vec<Category>>(&body)
            .map_err(|e| ApiError::bad_request(format!("Invalid categories: {e}")))?
    };
    if categories.is_empty() {
        return Err(ApiError::bad_request("Array of new categories cannot be empty"));
    }
    state.db.write().await.classifiers.insert(id, categories);
    Ok(Json(json!({"ok": true})))
}

async fn delete_classifier(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult {
    let mut store = state.db.write().await;
    store
        .classifiers
        .remove(&id)
        .ok_or_else(|| ApiError::not_found(format!("No classifier with id {id}")))?;
    Ok(Json(json!({"ok": true})))
}

async fn list_categories(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(paging): Query<Page>,
) -> ApiResult {
    let store = state.db.read().await;
    let categories = store
        .classifiers
        .get(&id)
        .ok_or_else(|| ApiError::not_found(format!("No classifier with id {id}")))?;
    ok(json!({
        "categories": page(categories, &paging),
        "total": categories.len(),
    }))
}

async fn get_category(
    State(state): State<AppState>,
    Path((id, category_id)): Path<(String, String)>,
) -> ApiResult {
    let store = state.db.read().await;
    let category = store
        .classifiers
        .get(&id)
        .and_then(|categories| categories.iter().find(|c| c.category_id == category_id))
        .ok_or_else(|| ApiError::not_found(format!("No category {category_id} in classifier {id}")))?;
    ok(json!(category))
}

async fn delete_category(
    State(state): State<AppState>,
    Path((id, category_id)): Path<(String, String)>,
) -> ApiResult {
    let mut store = state.db.write().await;
    let categories = store
        .classifiers
        .get_mut(&id)
        .ok_or_else(|| ApiError::not_found(format!("No classifier with id {id}")))?;
    let before = categories.len();
    categories.retain(|c| c.category_id != category_id);
    if categories.len() == before {
        return Err(ApiError::not_found(format!("No category {category_id} in classifier {id}")));
    }
    Ok(Json(json!({"ok": true})))
}

// --- account ---

async fn account(State(state): State<AppState>) -> ApiResult {
    let store = state.db.read().await;
    ok(json!({
        "plan": "stub",
        "concurrentRequestLimit": 2,
        "concurrentRequestsUsed": 0,
        "planDailyRequestsIncluded": 500,
        "requestsUsedToday": store.requests_today,
    }))
}
