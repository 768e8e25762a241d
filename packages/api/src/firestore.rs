//! # Firestore profile store
//!
//! [`FirestoreStore`] implements [`store::ProfileStore`] over the Firestore REST
//! API. Profile documents live at `users/{uid}`.
//!
//! - Reads use `GET documents/users/{uid}`; a 404 means "no profile".
//! - Writes go through `documents:commit` so `createdAt` and `lastSeen` can be
//!   stamped with `REQUEST_TIME`, the store's own clock.
//! - The online-users set is `documents:runQuery` on `isOnline == true`,
//!   re-run after every write and whenever [`ProfileStore::refresh_online`] is
//!   called (the UI polls it).
//!
//! Firestore wraps every value in a typed envelope (`{"stringValue": ...}`);
//! [`encode_fields`] and [`decode_fields`] convert between that and plain JSON
//! so the serde models in `store::models` work unchanged.

use std::sync::{Arc, RwLock};
use std::time::Duration;

use reqwest::{Client, RequestBuilder};
use serde::Deserialize;
use serde_json::{json, Map, Value};
use store::{OnlineUser, ProfileStore, ProfileUpdate, StoreError, UserProfile};
use tokio::sync::watch;

use crate::timer::with_timeout;
use crate::ApiError;

const FIRESTORE_BASE: &str = "https://firestore.googleapis.com/v1";
const TIMESTAMP_FIELDS: [&str; 2] = ["createdAt", "lastSeen"];

#[derive(Clone, Debug)]
pub struct FirestoreStore {
    http: Client,
    project_id: String,
    api_key: String,
    timeout: Duration,
    id_token: Arc<RwLock<Option<String>>>,
    online: Arc<watch::Sender<Vec<OnlineUser>>>,
}

/// Plain JSON object → Firestore `fields` map.
pub fn encode_fields(object: &Map<String, Value>) -> Map<String, Value> {
    object
        .iter()
        .map(|(k, v)| {
            let encoded = if TIMESTAMP_FIELDS.contains(&k.as_str()) && v.is_string() {
                json!({ "timestampValue": v })
            } else {
                encode_value(v)
            };
            (k.clone(), encoded)
        })
        .collect()
}

fn encode_value(value: &Value) -> Value {
    match value {
        Value::Null => json!({ "nullValue": null }),
        Value::Bool(b) => json!({ "booleanValue": b }),
        Value::Number(n) => match n.as_i64() {
            Some(i) => json!({ "integerValue": i.to_string() }),
            None => json!({ "doubleValue": n }),
        },
        Value::String(s) => json!({ "stringValue": s }),
        Value::Array(items) => {
            json!({ "arrayValue": { "values": items.iter().map(encode_value).collect::<Vec<_>>() } })
        }
        Value::Object(map) => json!({ "mapValue": { "fields": encode_fields(map) } }),
    }
}

/// Firestore `fields` map → plain JSON object.
pub fn decode_fields(fields: &Map<String, Value>) -> Map<String, Value> {
    fields
        .iter()
        .map(|(k, v)| (k.clone(), decode_value(v)))
        .collect()
}

fn decode_value(value: &Value) -> Value {
    let Some((kind, inner)) = value.as_object().and_then(|o| o.iter().next()) else {
        return Value::Null;
    };
    match kind.as_str() {
        "stringValue" | "timestampValue" | "referenceValue" | "bytesValue" => inner.clone(),
        "booleanValue" | "doubleValue" => inner.clone(),
        "integerValue" => inner
            .as_str()
            .and_then(|s| s.parse::<i64>().ok())
            .map(Value::from)
            .unwrap_or_else(|| inner.clone()),
        "arrayValue" => Value::Array(
            inner
                .get("values")
                .and_then(Value::as_array)
                .map(|values| values.iter().map(decode_value).collect())
                .unwrap_or_default(),
        ),
        "mapValue" => Value::Object(
            inner
                .get("fields")
                .and_then(Value::as_object)
                .map(decode_fields)
                .unwrap_or_default(),
        ),
        _ => Value::Null,
    }
}

#[derive(Debug, Deserialize)]
struct Document {
    name: String,
    #[serde(default)]
    fields: Map<String, Value>,
}

#[derive(Debug, Deserialize)]
struct QueryRow {
    #[serde(default)]
    document: Option<Document>,
}

fn decode_profile(fields: &Map<String, Value>) -> Result<UserProfile, StoreError> {
    serde_json::from_value(Value::Object(decode_fields(fields)))
        .map_err(|e| StoreError::Decode(e.to_string()))
}

/// Online users from `runQuery` rows, sorted by id.
fn online_users(rows: Vec<QueryRow>) -> Vec<OnlineUser> {
    let mut users: Vec<OnlineUser> = rows
        .into_iter()
        .filter_map(|row| row.document)
        .filter_map(|doc| {
            let id = doc.name.rsplit('/').next()?.to_string();
            match decode_profile(&doc.fields) {
                Ok(profile) => Some(OnlineUser::from_profile(&id, &profile)),
                Err(e) => {
                    tracing::warn!(id = %id, "skipping malformed profile: {}", e);
                    None
                }
            }
        })
        .collect();
    users.sort_by(|a, b| a.id.cmp(&b.id));
    users
}

fn server_time(field: &str) -> Value {
    json!({ "fieldPath": field, "setToServerValue": "REQUEST_TIME" })
}

fn store_error(e: ApiError) -> StoreError {
    match e {
        ApiError::Http { status, message } if (400..500).contains(&status) => {
            StoreError::Rejected(message)
        }
        ApiError::Unauthorized(message) => StoreError::Rejected(message),
        ApiError::Decode(message) => StoreError::Decode(message),
        other => StoreError::Unavailable(other.to_string()),
    }
}

impl FirestoreStore {
    pub fn new(project_id: &str, api_key: &str, timeout: Duration) -> Self {
        let (online, _) = watch::channel(Vec::new());
        Self {
            http: Client::new(),
            project_id: project_id.to_string(),
            api_key: api_key.to_string(),
            timeout,
            id_token: Arc::default(),
            online: Arc::new(online),
        }
    }

    fn database(&self) -> String {
        format!("projects/{}/databases/(default)/documents", self.project_id)
    }

    fn document_name(&self, uid: &str) -> String {
        format!("{}/users/{}", self.database(), uid)
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}?key={}", FIRESTORE_BASE, path, self.api_key)
    }

    fn with_auth(&self, builder: RequestBuilder) -> RequestBuilder {
        let token = self.id_token.read().ok().and_then(|t| t.clone());
        match token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    async fn execute(&self, builder: RequestBuilder) -> Result<Value, ApiError> {
        let request = self.with_auth(builder);
        with_timeout(self.timeout, async {
            let response = request.send().await?;
            let status = response.status();
            if !status.is_success() {
                let body = response.text().await.unwrap_or_default();
                return Err(ApiError::from_status(status.as_u16(), &body));
            }
            Ok(response.json::<Value>().await?)
        })
        .await
    }

    /// Commit one `update` write with optional mask and server-time transforms.
    async fn commit(
        &self,
        uid: &str,
        fields: Map<String, Value>,
        mask: Option<Vec<&str>>,
        transforms: Vec<Value>,
    ) -> Result<(), StoreError> {
        let mut write = json!({
            "update": { "name": self.document_name(uid), "fields": fields },
        });
        if let Some(paths) = mask {
            write["updateMask"] = json!({ "fieldPaths": paths });
        }
        if !transforms.is_empty() {
            write["updateTransforms"] = Value::Array(transforms);
        }
        let url = self.url(&format!("{}:commit", self.database()));
        self.execute(self.http.post(url).json(&json!({ "writes": [write] })))
            .await
            .map_err(store_error)?;

        if let Err(e) = self.refresh_online().await {
            tracing::debug!("online users refresh after write failed: {}", e);
        }
        Ok(())
    }
}

impl ProfileStore for FirestoreStore {
    async fn get_profile(&self, uid: &str) -> Result<Option<UserProfile>, StoreError> {
        let url = self.url(&self.document_name(uid));
        match self.execute(self.http.get(url)).await {
            Ok(body) => {
                let doc: Document =
                    serde_json::from_value(body).map_err(|e| StoreError::Decode(e.to_string()))?;
                decode_profile(&doc.fields).map(Some)
            }
            Err(ApiError::NotFound) => Ok(None),
            Err(e) => Err(store_error(e)),
        }
    }

    async fn set_profile(&self, uid: &str, profile: &UserProfile) -> Result<(), StoreError> {
        let Value::Object(mut object) =
            serde_json::to_value(profile).map_err(|e| StoreError::Decode(e.to_string()))?
        else {
            return Err(StoreError::Decode("profile is not an object".to_string()));
        };

        let mut transforms = vec![server_time("lastSeen")];
        object.remove("lastSeen");
        if profile.created_at.is_none() {
            object.remove("createdAt");
            transforms.push(server_time("createdAt"));
        }
        self.commit(uid, encode_fields(&object), None, transforms).await
    }

    async fn merge_profile(&self, uid: &str, update: &ProfileUpdate) -> Result<(), StoreError> {
        let Value::Object(object) =
            serde_json::to_value(update).map_err(|e| StoreError::Decode(e.to_string()))?
        else {
            return Err(StoreError::Decode("update is not an object".to_string()));
        };
        let transforms = if update.touch_last_seen {
            vec![server_time("lastSeen")]
        } else {
            Vec::new()
        };
        self.commit(uid, encode_fields(&object), Some(update.field_paths()), transforms)
            .await
    }

    async fn refresh_online(&self) -> Result<(), StoreError> {
        let query = json!({
            "structuredQuery": {
                "from": [{ "collectionId": "users" }],
                "where": {
                    "fieldFilter": {
                        "field": { "fieldPath": "isOnline" },
                        "op": "EQUAL",
                        "value": { "booleanValue": true },
                    }
                }
            }
        });
        let url = self.url(&format!("{}:runQuery", self.database()));
        let body = self
            .execute(self.http.post(url).json(&query))
            .await
            .map_err(store_error)?;
        let rows: Vec<QueryRow> =
            serde_json::from_value(body).map_err(|e| StoreError::Decode(e.to_string()))?;
        self.online.send_replace(online_users(rows));
        Ok(())
    }

    fn subscribe_online(&self) -> watch::Receiver<Vec<OnlineUser>> {
        self.online.subscribe()
    }

    fn authorize(&self, id_token: Option<&str>) {
        if let Ok(mut slot) = self.id_token.write() {
            *slot = id_token.map(str::to_string);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_profile_fields() {
        let mut profile = UserProfile::new("Ada", "ada@example.com");
        profile.preferred_categories = vec!["Energy".into()];
        profile.stats = Some(store::UserStats {
            ideas_submitted: 2,
            ..Default::default()
        });
        let Value::Object(object) = serde_json::to_value(&profile).unwrap() else {
            panic!("profile must serialize to an object");
        };
        let fields = encode_fields(&object);

        assert_eq!(fields["displayName"], json!({ "stringValue": "Ada" }));
        assert_eq!(fields["isOnline"], json!({ "booleanValue": true }));
        assert_eq!(
            fields["preferredCategories"],
            json!({ "arrayValue": { "values": [{ "stringValue": "Energy" }] } })
        );
        assert_eq!(
            fields["stats"]["mapValue"]["fields"]["ideasSubmitted"],
            json!({ "integerValue": "2" })
        );
        assert_eq!(fields["createdAt"], json!({ "nullValue": null }));
    }

    #[test]
    fn test_decode_document_into_profile() {
        let fields: Map<String, Value> = serde_json::from_value(json!({
            "displayName": { "stringValue": "Bob" },
            "email": { "stringValue": "bob@example.com" },
            "photoURL": { "stringValue": "" },
            "isOnline": { "booleanValue": true },
            "createdAt": { "timestampValue": "2024-03-01T10:00:00.123456Z" },
            "lastSeen": { "timestampValue": "2024-03-02T08:30:00Z" },
            "languagePreferences": { "arrayValue": {} },
            "stats": { "mapValue": { "fields": {
                "ideasSubmitted": { "integerValue": "4" },
                "offersReceived": { "integerValue": "0" },
                "offersMade": { "integerValue": "1" },
                "ideasPurchased": { "integerValue": "0" }
            } } }
        }))
        .unwrap();

        let profile = decode_profile(&fields).unwrap();
        assert_eq!(profile.display_name, "Bob");
        assert!(profile.is_online);
        assert!(profile.created_at.is_some());
        assert!(profile.language_preferences.is_empty());
        assert_eq!(profile.stats.unwrap().ideas_submitted, 4);
    }

    #[test]
    fn test_online_users_from_query_rows() {
        let rows: Vec<QueryRow> = serde_json::from_value(json!([
            { "document": {
                "name": "projects/p/databases/(default)/documents/users/zed",
                "fields": { "displayName": { "stringValue": "" }, "email": { "stringValue": "z@x.io" }, "isOnline": { "booleanValue": true } }
            }, "readTime": "2024-01-01T00:00:00Z" },
            { "document": {
                "name": "projects/p/databases/(default)/documents/users/amy",
                "fields": { "displayName": { "stringValue": "Amy" }, "email": { "stringValue": "a@x.io" }, "isOnline": { "booleanValue": true } }
            } },
            { "readTime": "2024-01-01T00:00:00Z" }
        ]))
        .unwrap();

        let users = online_users(rows);
        assert_eq!(users.len(), 2);
        assert_eq!(users[0].id, "amy");
        assert_eq!(users[1].display_name, "Anonymous");
    }

    #[test]
    fn test_client_errors_become_rejections() {
        assert_eq!(
            store_error(ApiError::Http { status: 400, message: "bad".into() }),
            StoreError::Rejected("bad".into())
        );
        assert!(matches!(store_error(ApiError::Timeout), StoreError::Unavailable(_)));
    }

    #[test]
    fn test_document_name() {
        let store = FirestoreStore::new("ideady", "key", Duration::from_secs(10));
        assert_eq!(
            store.document_name("u1"),
            "projects/ideady/databases/(default)/documents/users/u1"
        );
        assert_eq!(
            store.url(&store.document_name("u1")),
            "https://firestore.googleapis.com/v1/projects/ideady/databases/(default)/documents/users/u1?key=key"
        );
    }
}
