//! In-memory contacts backend speaking the `{success, data}` envelope.
//!
//! Users register and log in under `/auth`; everything under `/user`
//! requires `Authorization: Bearer <token>` and is scoped to that user.

use std::{collections::HashMap, sync::Arc};

use axum::{
    extract::{Path, Query, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{delete, get, post, put},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use tokio::{net::TcpListener, sync::RwLock};
use uuid::Uuid;

#[derive(Clone, Debug, Serialize)]
pub struct User {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    pub email: String,
    #[serde(skip)]
    pub password: String,
}

#[derive(Clone, Debug, Serialize)]
pub struct Contact {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(rename = "isFavorite")]
    pub is_favorite: bool,
    #[serde(flatten)]
    pub fields: Map<String, Value>,
    #[serde(skip)]
    pub owner: String,
}

#[derive(Clone, Debug, Serialize)]
pub struct Tag {
    #[serde(rename = "_id")]
    pub id: String,
    pub contacts: Vec<String>,
    #[serde(flatten)]
    pub fields: Map<String, Value>,
    #[serde(skip)]
    pub owner: String,
}

#[derive(Deserialize)]
pub struct Register {
    pub name: String,
    pub email: String,
    pub password: String,
}

#[derive(Deserialize)]
pub struct Login {
    pub email: String,
    pub password: String,
}

#[derive(Deserialize)]
pub struct Search {
    pub search: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddContact {
    pub contact_id: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddContacts {
    pub contact_ids: Vec<String>,
}

#[derive(Default)]
pub struct Store {
    users: HashMap<String, User>,
    tokens: HashMap<String, String>,
    contacts: Vec<Contact>,
    tags: Vec<Tag>,
}

impl Store {
    fn owner(&self, headers: &HeaderMap) -> Result<String, Failure> {
        let token = headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "))
            .ok_or(Failure(StatusCode::UNAUTHORIZED, "missing bearer token"))?;
        self.tokens
            .get(token)
            .cloned()
            .ok_or(Failure(StatusCode::UNAUTHORIZED, "invalid token"))
    }

    fn contact(&self, owner: &str, id: &str) -> Result<&Contact, Failure> {
        self.contacts
            .iter()
            .find(|c| c.owner == owner && c.id == id)
            .ok_or(Failure(StatusCode::NOT_FOUND, "contact not found"))
    }

    fn tag(&self, owner: &str, id: &str) -> Result<&Tag, Failure> {
        self.tags
            .iter()
            .find(|t| t.owner == owner && t.id == id)
            .ok_or(Failure(StatusCode::NOT_FOUND, "tag not found"))
    }

    fn contact_mut(&mut self, owner: &str, id: &str) -> Result<&mut Contact, Failure> {
        self.contacts
            .iter_mut()
            .find(|c| c.owner == owner && c.id == id)
            .ok_or(Failure(StatusCode::NOT_FOUND, "contact not found"))
    }

    fn tag_mut(&mut self, owner: &str, id: &str) -> Result<&mut Tag, Failure> {
        self.tags
            .iter_mut()
            .find(|t| t.owner == owner && t.id == id)
            .ok_or(Failure(StatusCode::NOT_FOUND, "tag not found"))
    }

    fn owns_contact(&self, owner: &str, id: &str) -> bool {
        self.contacts.iter().any(|c| c.owner == owner && c.id == id)
    }

    fn owned_contacts<'a>(&'a self, owner: &'a str) -> impl Iterator<Item = &'a Contact> + 'a {
        self.contacts.iter().filter(move |c| c.owner == owner)
    }
}

pub type Db = Arc<RwLock<Store>>;

/// Error response: `{success: false, message}` with the given status.
#[derive(Debug)]
pub struct Failure(pub StatusCode, pub &'static str);

impl IntoResponse for Failure {
    fn into_response(self) -> Response {
        (self.0, Json(json!({"success": false, "message": self.1}))).into_response()
    }
}

type Reply = Result<Json<Value>, Failure>;
type Created = Result<(StatusCode, Json<Value>), Failure>;

fn ok<T: Serialize>(data: T) -> Json<Value> {
    Json(json!({"success": true, "data": data}))
}

fn new_id() -> String {
    Uuid::new_v4().simple().to_string()
}

/// Object fields of a payload, minus server-owned keys.
fn client_fields(payload: Value) -> Result<Map<String, Value>, Failure> {
    let Value::Object(mut fields) = payload else {
        return Err(Failure(StatusCode::BAD_REQUEST, "payload must be an object"));
    };
    fields.remove("_id");
    fields.remove("isFavorite");
    fields.remove("contacts");
    Ok(fields)
}

pub fn app() -> Router {
    let db: Db = Arc::new(RwLock::new(Store::default()));
    Router::new()
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
        .route("/auth/logout", post(logout))
        .route("/user/contacts", get(list_contacts).post(create_contact))
        .route(
            "/user/contacts/{id}",
            get(get_contact).put(update_contact).delete(delete_contact),
        )
        .route("/user/favorites", get(list_favorites))
        .route("/user/favorites/{id}", put(add_favorite).delete(remove_favorite))
        .route("/user/tags", get(list_tags).post(create_tag))
        .route("/user/tags/{id}", get(get_tag).put(update_tag).delete(delete_tag))
        .route("/user/tags/{id}/contacts", get(tag_contacts).post(add_tag_contact))
        .route("/user/tags/{id}/contacts/bulk", post(add_tag_contacts))
        .route("/user/tags/{id}/contacts/{contact_id}", delete(remove_tag_contact))
        .route("/user/tags/{id}/available-contacts", get(available_contacts))
        .with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

// ---------------------------------------------------------------------------
// Auth
// ---------------------------------------------------------------------------

async fn register(State(db): State<Db>, Json(input): Json<Register>) -> Created {
    let email = input.email.trim().to_lowercase();
    if input.name.trim().is_empty() || email.is_empty() || input.password.is_empty() {
        return Err(Failure(StatusCode::BAD_REQUEST, "name, email and password are required"));
    }
    let mut store = db.write().await;
    if store.users.values().any(|u| u.email == email) {
        return Err(Failure(StatusCode::CONFLICT, "email already registered"));
    }
    let user = User {
        id: new_id(),
        name: input.name.trim().to_string(),
        email,
        password: input.password,
    };
    store.users.insert(user.id.clone(), user.clone());
    Ok((StatusCode::CREATED, ok(user)))
}

async fn login(State(db): State<Db>, Json(input): Json<Login>) -> Reply {
    let email = input.email.trim().to_lowercase();
    let mut store = db.write().await;
    let user = store
        .users
        .values()
        .find(|u| u.email == email && u.password == input.password)
        .cloned()
        .ok_or(Failure(StatusCode::UNAUTHORIZED, "invalid credentials"))?;
    let token = Uuid::new_v4().to_string();
    store.tokens.insert(token.clone(), user.id.clone());
    Ok(ok(json!({"user": user, "token": token})))
}

async fn logout(State(db): State<Db>, headers: HeaderMap) -> Json<Value> {
    let token = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "));
    if let Some(token) = token {
        db.write().await.tokens.remove(token);
    }
    ok(Value::Null)
}

// ---------------------------------------------------------------------------
// Contacts
// ---------------------------------------------------------------------------

async fn list_contacts(
    State(db): State<Db>,
    headers: HeaderMap,
    Query(query): Query<Search>,
) -> Reply {
    let store = db.read().await;
    let owner = store.owner(&headers)?;
    let term = query.search.unwrap_or_default().to_lowercase();
    let contacts: Vec<&Contact> = store
        .owned_contacts(&owner)
        .filter(|c| {
            term.is_empty()
                || ["name", "email", "phone"].iter().any(|field| {
                    c.fields
                        .get(*field)
                        .and_then(Value::as_str)
                        .is_some_and(|v| v.to_lowercase().contains(&term))
                })
        })
        .collect();
    Ok(ok(contacts))
}

async fn create_contact(
    State(db): State<Db>,
    headers: HeaderMap,
    Json(payload): Json<Value>,
) -> Created {
    let mut store = db.write().await;
    let owner = store.owner(&headers)?;
    let contact = Contact {
        id: new_id(),
        is_favorite: false,
        fields: client_fields(payload)?,
        owner,
    };
    store.contacts.push(contact.clone());
    Ok((StatusCode::CREATED, ok(contact)))
}

async fn get_contact(State(db): State<Db>, headers: HeaderMap, Path(id): Path<String>) -> Reply {
    let store = db.read().await;
    let owner = store.owner(&headers)?;
    Ok(ok(store.contact(&owner, &id)?))
}

async fn update_contact(
    State(db): State<Db>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(payload): Json<Value>,
) -> Reply {
    let mut store = db.write().await;
    let owner = store.owner(&headers)?;
    let fields = client_fields(payload)?;
    let contact = store.contact_mut(&owner, &id)?;
    contact.fields.extend(fields);
    Ok(ok(contact.clone()))
}

async fn delete_contact(State(db): State<Db>, headers: HeaderMap, Path(id): Path<String>) -> Reply {
    let mut store = db.write().await;
    let owner = store.owner(&headers)?;
    if !store.owns_contact(&owner, &id) {
        return Err(Failure(StatusCode::NOT_FOUND, "contact not found"));
    }
    store.contacts.retain(|c| c.id != id);
    for tag in store.tags.iter_mut().filter(|t| t.owner == owner) {
        tag.contacts.retain(|c| *c != id);
    }
    Ok(ok(Value::Null))
}

// ---------------------------------------------------------------------------
// Favorites
// ---------------------------------------------------------------------------

async fn list_favorites(State(db): State<Db>, headers: HeaderMap) -> Reply {
    let store = db.read().await;
    let owner = store.owner(&headers)?;
    let favorites: Vec<&Contact> = store
        .owned_contacts(&owner)
        .filter(|c| c.is_favorite)
        .collect();
    Ok(ok(favorites))
}

async fn set_favorite(db: Db, headers: HeaderMap, id: String, favorite: bool) -> Reply {
    let mut store = db.write().await;
    let owner = store.owner(&headers)?;
    let contact = store.contact_mut(&owner, &id)?;
    contact.is_favorite = favorite;
    Ok(ok(contact.clone()))
}

async fn add_favorite(State(db): State<Db>, headers: HeaderMap, Path(id): Path<String>) -> Reply {
    set_favorite(db, headers, id, true).await
}

async fn remove_favorite(State(db): State<Db>, headers: HeaderMap, Path(id): Path<String>) -> Reply {
    set_favorite(db, headers, id, false).await
}

// ---------------------------------------------------------------------------
// Tags
// ---------------------------------------------------------------------------

async fn list_tags(State(db): State<Db>, headers: HeaderMap) -> Reply {
    let store = db.read().await;
    let owner = store.owner(&headers)?;
    let tags: Vec<&Tag> = store.tags.iter().filter(|t| t.owner == owner).collect();
    Ok(ok(tags))
}

async fn create_tag(State(db): State<Db>, headers: HeaderMap, Json(payload): Json<Value>) -> Created {
    let mut store = db.write().await;
    let owner = store.owner(&headers)?;
    let fields = client_fields(payload)?;
    if fields.get("name").and_then(Value::as_str).is_none_or(|n| n.trim().is_empty()) {
        return Err(Failure(StatusCode::BAD_REQUEST, "tag name is required"));
    }
    let tag = Tag {
        id: new_id(),
        contacts: Vec::new(),
        fields,
        owner,
    };
    store.tags.push(tag.clone());
    Ok((StatusCode::CREATED, ok(tag)))
}

async fn get_tag(State(db): State<Db>, headers: HeaderMap, Path(id): Path<String>) -> Reply {
    let store = db.read().await;
    let owner = store.owner(&headers)?;
    Ok(ok(store.tag(&owner, &id)?))
}

async fn update_tag(
    State(db): State<Db>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(payload): Json<Value>,
) -> Reply {
    let mut store = db.write().await;
    let owner = store.owner(&headers)?;
    let fields = client_fields(payload)?;
    let tag = store.tag_mut(&owner, &id)?;
    tag.fields.extend(fields);
    Ok(ok(tag.clone()))
}

async fn delete_tag(State(db): State<Db>, headers: HeaderMap, Path(id): Path<String>) -> Reply {
    let mut store = db.write().await;
    let owner = store.owner(&headers)?;
    store.tag(&owner, &id)?;
    store.tags.retain(|t| t.id != id);
    Ok(ok(Value::Null))
}

async fn tag_contacts(State(db): State<Db>, headers: HeaderMap, Path(id): Path<String>) -> Reply {
    let store = db.read().await;
    let owner = store.owner(&headers)?;
    let members = &store.tag(&owner, &id)?.contacts;
    let contacts: Vec<&Contact> = store
        .owned_contacts(&owner)
        .filter(|c| members.contains(&c.id))
        .collect();
    Ok(ok(contacts))
}

async fn available_contacts(
    State(db): State<Db>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Reply {
    let store = db.read().await;
    let owner = store.owner(&headers)?;
    let members = &store.tag(&owner, &id)?.contacts;
    let contacts: Vec<&Contact> = store
        .owned_contacts(&owner)
        .filter(|c| !members.contains(&c.id))
        .collect();
    Ok(ok(contacts))
}

async fn attach(db: Db, headers: HeaderMap, tag_id: String, contact_ids: Vec<String>) -> Reply {
    let mut store = db.write().await;
    let owner = store.owner(&headers)?;
    if contact_ids.iter().any(|id| !store.owns_contact(&owner, id)) {
        return Err(Failure(StatusCode::NOT_FOUND, "contact not found"));
    }
    let tag = store.tag_mut(&owner, &tag_id)?;
    for id in contact_ids {
        if !tag.contacts.contains(&id) {
            tag.contacts.push(id);
        }
    }
    Ok(ok(tag.clone()))
}

async fn add_tag_contact(
    State(db): State<Db>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(input): Json<AddContact>,
) -> Reply {
    attach(db, headers, id, vec![input.contact_id]).await
}

async fn add_tag_contacts(
    State(db): State<Db>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(input): Json<AddContacts>,
) -> Reply {
    attach(db, headers, id, input.contact_ids).await
}

async fn remove_tag_contact(
    State(db): State<Db>,
    headers: HeaderMap,
    Path((id, contact_id)): Path<(String, String)>,
) -> Reply {
    let mut store = db.write().await;
    let owner = store.owner(&headers)?;
    let tag = store.tag_mut(&owner, &id)?;
    if !tag.contacts.contains(&contact_id) {
        return Err(Failure(StatusCode::NOT_FOUND, "contact not in tag"));
    }
    tag.contacts.retain(|c| *c != contact_id);
    Ok(ok(tag.clone()))
}
