/// Firestore REST 客户端
///
/// 封装列出集合文档与批量提交两类调用，实现 `DocumentStore`
use reqwest::{RequestBuilder, Url};
use serde::Deserialize;
use serde_json::{json, Value as JsonValue};
use tracing::debug;

use crate::clients::auth::TokenProvider;
use crate::config::Config;
use crate::error::{AppResult, ConfigError, ParseError, StoreError};
use crate::infrastructure::ServiceAccount;
use crate::models::value::{fields_from_rest, fields_to_rest, Fields};
use crate::store::{CollectionPath, Document, DocumentPath, DocumentStore, Write, WriteBatch};

/// 列表接口的响应
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListDocumentsResponse {
    #[serde(default)]
    documents: Vec<RestDocument>,
    #[serde(default)]
    next_page_token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RestDocument {
    name: String,
    #[serde(default)]
    fields: Option<JsonValue>,
}

/// Firestore 客户端
pub struct FirestoreClient {
    http: reqwest::Client,
    tokens: TokenProvider,
    endpoint: String,
    project_id: String,
    database_id: String,
    page_size: u32,
}

impl FirestoreClient {
    /// 使用服务账号建立客户端，并立即完成一次认证
    pub async fn connect(config: &Config, account: ServiceAccount) -> AppResult<Self> {
        let http = reqwest::Client::new();
        let project_id = account.project_id.clone();
        let tokens = TokenProvider::new(http.clone(), account);
        tokens.access_token().await?;

        Ok(Self::from_parts(config, http, tokens, project_id))
    }

    /// 使用固定令牌建立客户端（本地模拟器或测试）
    pub fn with_token(config: &Config, project_id: impl Into<String>, token: impl Into<String>) -> Self {
        Self::from_parts(
            config,
            reqwest::Client::new(),
            TokenProvider::with_static_token(token),
            project_id.into(),
        )
    }

    fn from_parts(
        config: &Config,
        http: reqwest::Client,
        tokens: TokenProvider,
        project_id: String,
    ) -> Self {
        Self {
            http,
            tokens,
            endpoint: config.firestore_endpoint.trim_end_matches('/').to_string(),
            project_id,
            database_id: config.database_id.clone(),
            page_size: config.page_size,
        }
    }

    pub fn project_id(&self) -> &str {
        &self.project_id
    }

    /// `projects/{p}/databases/{d}/documents`
    fn documents_name(&self) -> String {
        format!(
            "projects/{}/databases/{}/documents",
            self.project_id, self.database_id
        )
    }

    /// 文档完整资源名
    fn document_name(&self, path: &DocumentPath) -> String {
        format!("{}/{}", self.documents_name(), path)
    }

    fn documents_url(&self) -> AppResult<Url> {
        let raw = format!("{}/v1/{}", self.endpoint, self.documents_name());
        Url::parse(&raw).map_err(|e| ConfigError::InvalidEndpoint(format!("{} ({})", raw, e)).into())
    }

    fn collection_url(&self, collection: &CollectionPath) -> AppResult<Url> {
        let mut url = self.documents_url()?;
        url.path_segments_mut()
            .map_err(|_| ConfigError::InvalidEndpoint(self.endpoint.clone()))?
            .extend(collection.segments());
        Ok(url)
    }

    fn commit_url(&self) -> String {
        format!("{}/v1/{}:commit", self.endpoint, self.documents_name())
    }

    /// 资源名 → 相对文档路径
    fn parse_document_name(&self, name: &str) -> AppResult<DocumentPath> {
        let prefix = format!("{}/", self.documents_name());
        let relative = name
            .strip_prefix(&prefix)
            .ok_or_else(|| ParseError::shape(format!("document name {}", name), "name under this database"))?;

        let segments = relative.split('/').map(str::to_string).collect();
        DocumentPath::from_segments(segments)
            .ok_or_else(|| ParseError::shape(format!("document name {}", name), "document path").into())
    }

    /// 发送请求并返回响应文本
    async fn send(&self, request: RequestBuilder, endpoint: &str) -> AppResult<String> {
        let token = self.tokens.access_token().await?;
        let response = request
            .bearer_auth(token)
            .send()
            .await
            .map_err(|e| StoreError::request_failed(endpoint, e))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| StoreError::request_failed(endpoint, e))?;

        if !status.is_success() {
            return Err(StoreError::BadResponse {
                endpoint: endpoint.to_string(),
                status: status.as_u16(),
                body,
            }
            .into());
        }

        Ok(body)
    }

    fn encode_write(&self, write: &Write) -> JsonValue {
        match write {
            Write::Set { path, fields } => json!({
                "update": {
                    "name": self.document_name(path),
                    "fields": fields_to_rest(fields),
                }
            }),
            Write::Update { path, fields } => {
                let field_paths: Vec<String> = fields.keys().map(|k| quote_field_path(k)).collect();
                json!({
                    "update": {
                        "name": self.document_name(path),
                        "fields": fields_to_rest(fields),
                    },
                    "updateMask": { "fieldPaths": field_paths },
                    "currentDocument": { "exists": true },
                })
            }
        }
    }
}

impl DocumentStore for FirestoreClient {
    async fn list_documents(&self, collection: &CollectionPath) -> AppResult<Vec<Document>> {
        let url = self.collection_url(collection)?;
        let endpoint = collection.to_string();
        let mut documents = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let mut request = self
                .http
                .get(url.clone())
                .query(&[("pageSize", self.page_size.to_string())]);
            if let Some(token) = &page_token {
                request = request.query(&[("pageToken", token)]);
            }

            let body = self.send(request, &endpoint).await?;
            let page: ListDocumentsResponse = serde_json::from_str(&body)
                .map_err(|e| ParseError::json(format!("list {}", endpoint), e))?;

            for doc in page.documents {
                let fields = match &doc.fields {
                    Some(raw) => fields_from_rest(raw)?,
                    None => Fields::new(),
                };
                documents.push(Document {
                    path: self.parse_document_name(&doc.name)?,
                    fields,
                });
            }

            match page.next_page_token.filter(|t| !t.is_empty()) {
                Some(next) => page_token = Some(next),
                None => break,
            }
        }

        debug!("{}: 读取到 {} 个文档", endpoint, documents.len());
        Ok(documents)
    }

    async fn commit(&self, batch: WriteBatch) -> AppResult<()> {
        batch.check_size()?;
        let writes: Vec<JsonValue> = batch.writes().iter().map(|w| self.encode_write(w)).collect();
        let body = json!({ "writes": writes });

        debug!("提交 {} 个写入", batch.len());
        let request = self.http.post(self.commit_url()).json(&body);
        self.send(request, "documents:commit").await?;
        Ok(())
    }
}

/// 字段路径：非简单标识符需要用反引号包裹
fn quote_field_path(field: &str) -> String {
    let simple = field
        .chars()
        .next()
        .map_or(false, |c| c.is_ascii_alphabetic() || c == '_')
        && field.chars().all(|c| c.is_ascii_alphanumeric() || c == '_');
    if simple {
        field.to_string()
    } else {
        format!("`{}`", field.replace('\\', "\\\\").replace('`', "\\`"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::value::FieldValue;

    fn client() -> FirestoreClient {
        FirestoreClient::with_token(&Config::default(), "demo", "token")
    }

    #[test]
    fn test_quote_field_path() {
        assert_eq!(quote_field_path("order"), "order");
        assert_eq!(quote_field_path("_x1"), "_x1");
        assert_eq!(quote_field_path("1st"), "`1st`");
        assert_eq!(quote_field_path("a.b"), "`a.b`");
    }

    #[test]
    fn test_parse_document_name() {
        let client = client();
        let path = client
            .parse_document_name(
                "projects/demo/databases/(default)/documents/lessons/L1/screens/screen_001",
            )
            .unwrap();
        assert_eq!(path.to_string(), "lessons/L1/screens/screen_001");

        assert!(client
            .parse_document_name("projects/other/databases/(default)/documents/lessons/L1")
            .is_err());
    }

    #[test]
    fn test_encode_merge_update() {
        let client = client();
        let path = CollectionPath::root("lessons").doc("L1");
        let write = Write::Update {
            path,
            fields: Fields::from([("order".to_string(), FieldValue::Integer(3))]),
        };

        assert_eq!(
            client.encode_write(&write),
            json!({
                "update": {
                    "name": "projects/demo/databases/(default)/documents/lessons/L1",
                    "fields": { "order": { "integerValue": "3" } }
                },
                "updateMask": { "fieldPaths": ["order"] },
                "currentDocument": { "exists": true }
            })
        );
    }

    #[test]
    fn test_collection_url_encodes_segments() {
        let client = client();
        let collection = CollectionPath::root("lessons").doc("a b").collection("screens");
        let url = client.collection_url(&collection).unwrap();
        assert_eq!(
            url.as_str(),
            "https://firestore.googleapis.com/v1/projects/demo/databases/(default)/documents/lessons/a%20b/screens"
        );
    }
}
