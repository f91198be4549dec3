/// 服务账号访问令牌
///
/// 用私钥签名 RS256 JWT，换取 OAuth 访问令牌；令牌在过期前复用
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::error::{AppResult, StoreError};
use crate::infrastructure::ServiceAccount;

/// Firestore 所需的授权范围
pub const DATASTORE_SCOPE: &str = "https://www.googleapis.com/auth/datastore";

const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";
const ASSERTION_LIFETIME_SECS: i64 = 3600;
/// 距离过期不足该秒数时提前刷新
const REFRESH_MARGIN_SECS: i64 = 60;

/// JWT 断言载荷
#[derive(Debug, Serialize)]
struct AssertionClaims<'a> {
    iss: &'a str,
    scope: &'a str,
    aud: &'a str,
    iat: i64,
    exp: i64,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default = "default_expires_in")]
    expires_in: i64,
}

fn default_expires_in() -> i64 {
    ASSERTION_LIFETIME_SECS
}

#[derive(Debug, Clone)]
struct AccessToken {
    value: String,
    expires_at: DateTime<Utc>,
}

impl AccessToken {
    fn is_fresh(&self, now: DateTime<Utc>) -> bool {
        self.expires_at - Duration::seconds(REFRESH_MARGIN_SECS) > now
    }
}

enum TokenSource {
    ServiceAccount(ServiceAccount),
    Static(String),
}

/// 访问令牌提供者
pub struct TokenProvider {
    http: reqwest::Client,
    source: TokenSource,
    cached: Mutex<Option<AccessToken>>,
}

impl TokenProvider {
    /// 使用服务账号换取令牌
    pub fn new(http: reqwest::Client, account: ServiceAccount) -> Self {
        Self {
            http,
            source: TokenSource::ServiceAccount(account),
            cached: Mutex::new(None),
        }
    }

    /// 使用固定令牌（本地模拟器或测试）
    pub fn with_static_token(token: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            source: TokenSource::Static(token.into()),
            cached: Mutex::new(None),
        }
    }

    /// 获取有效的访问令牌
    pub async fn access_token(&self) -> AppResult<String> {
        let account = match &self.source {
            TokenSource::Static(token) => return Ok(token.clone()),
            TokenSource::ServiceAccount(account) => account,
        };

        let mut cached = self.cached.lock().await;
        let now = Utc::now();
        if let Some(token) = cached.as_ref().filter(|t| t.is_fresh(now)) {
            return Ok(token.value.clone());
        }

        let token = self.exchange(account, now).await?;
        let value = token.value.clone();
        *cached = Some(token);
        Ok(value)
    }

    async fn exchange(&self, account: &ServiceAccount, now: DateTime<Utc>) -> AppResult<AccessToken> {
        let assertion = sign_assertion(account, now)?;
        debug!("正在换取访问令牌: {}", account.token_uri);

        let response = self
            .http
            .post(&account.token_uri)
            .form(&[("grant_type", JWT_BEARER_GRANT), ("assertion", assertion.as_str())])
            .send()
            .await
            .map_err(|e| StoreError::request_failed(&account.token_uri, e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(StoreError::Auth(format!("status={}, body={}", status.as_u16(), body)).into());
        }

        let parsed: TokenResponse = response
            .json()
            .await
            .map_err(|e| StoreError::Auth(format!("无法解析令牌响应: {}", e)))?;

        info!("✓ 已获取访问令牌 ({})", account.client_email);
        Ok(AccessToken {
            value: parsed.access_token,
            expires_at: now + Duration::seconds(parsed.expires_in),
        })
    }
}

/// 生成签名后的 JWT 断言
fn sign_assertion(account: &ServiceAccount, now: DateTime<Utc>) -> Result<String, StoreError> {
    let iat = now.timestamp();
    let claims = AssertionClaims {
        iss: &account.client_email,
        scope: DATASTORE_SCOPE,
        aud: &account.token_uri,
        iat,
        exp: iat + ASSERTION_LIFETIME_SECS,
    };

    let mut header = Header::new(Algorithm::RS256);
    header.kid = account.private_key_id.clone();

    let key = EncodingKey::from_rsa_pem(account.private_key.as_bytes())
        .map_err(|e| StoreError::Auth(format!("私钥格式错误: {}", e)))?;

    encode(&header, &claims, &key).map_err(|e| StoreError::Auth(format!("JWT 签名失败: {}", e)))
}
