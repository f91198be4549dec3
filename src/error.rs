use std::path::PathBuf;

use thiserror::Error;

/// 应用程序错误类型
#[derive(Debug, Error)]
pub enum AppError {
    /// 配置错误（在任何网络请求之前发现）
    #[error("配置错误: {0}")]
    Config(#[from] ConfigError),
    /// 解析错误
    #[error("解析错误: {0}")]
    Parse(#[from] ParseError),
    /// 文档数据库读写错误
    #[error("数据库错误: {0}")]
    Store(#[from] StoreError),
}

/// 配置错误
#[derive(Debug, Error)]
pub enum ConfigError {
    /// 凭证文件不存在
    #[error("凭证文件不存在: {}", path.display())]
    CredentialsNotFound { path: PathBuf },
    /// 种子文件不存在
    #[error("种子文件不存在: {}", path.display())]
    SeedNotFound { path: PathBuf },
    /// 读取文件失败
    #[error("读取文件失败 ({}): {source}", path.display())]
    ReadFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// 配置文件格式错误
    #[error("配置文件解析失败 ({}): {source}", path.display())]
    InvalidConfigFile {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    /// Firestore 地址无效
    #[error("无效的 Firestore 地址: {0}")]
    InvalidEndpoint(String),
}

/// 解析错误
#[derive(Debug, Error)]
pub enum ParseError {
    /// JSON 解析失败
    #[error("JSON解析失败 ({context}): {source}")]
    Json {
        context: String,
        #[source]
        source: serde_json::Error,
    },
    /// 凭证文件缺少字段或字段为空
    #[error("凭证文件缺少字段: {field}")]
    CredentialField { field: &'static str },
    /// 数据结构不符合预期
    #[error("数据格式错误 ({context}): 期望 {expected}")]
    UnexpectedShape {
        context: String,
        expected: &'static str,
    },
    /// 时间戳无法解析
    #[error("无法解析时间戳 ({field}): {value}")]
    InvalidTimestamp { field: String, value: String },
    /// REST 返回的字段值无法识别
    #[error("无法识别的字段值: {0}")]
    UnknownFieldValue(String),
    /// 正则表达式无效
    #[error("正则表达式无效: {0}")]
    Pattern(#[from] regex::Error),
}

/// 文档数据库错误
#[derive(Debug, Error)]
pub enum StoreError {
    /// 网络请求失败
    #[error("请求失败 ({endpoint}): {source}")]
    RequestFailed {
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },
    /// 服务端返回错误状态
    #[error("服务端返回错误 ({endpoint}): status={status}, body={body}")]
    BadResponse {
        endpoint: String,
        status: u16,
        body: String,
    },
    /// 获取访问令牌失败
    #[error("获取访问令牌失败: {0}")]
    Auth(String),
    /// 批量写入超出上限
    #[error("批量写入数量 {count} 超出上限 {max}")]
    BatchTooLarge { count: usize, max: usize },
    /// 文档不存在（合并更新要求文档存在）
    #[error("文档不存在: {0}")]
    NotFound(String),
}

// ========== 便捷构造函数 ==========

impl ParseError {
    /// 创建 JSON 解析错误
    pub fn json(context: impl Into<String>, source: serde_json::Error) -> Self {
        ParseError::Json {
            context: context.into(),
            source,
        }
    }

    /// 创建数据结构错误
    pub fn shape(context: impl Into<String>, expected: &'static str) -> Self {
        ParseError::UnexpectedShape {
            context: context.into(),
            expected,
        }
    }
}

impl StoreError {
    /// 创建请求失败错误
    pub fn request_failed(endpoint: impl Into<String>, source: reqwest::Error) -> Self {
        StoreError::RequestFailed {
            endpoint: endpoint.into(),
            source,
        }
    }
}

impl AppError {
    /// 是否是配置错误
    pub fn is_config(&self) -> bool {
        matches!(self, AppError::Config(_))
    }
}

// ========== Result 类型别名 ==========

/// 应用程序结果类型
pub type AppResult<T> = Result<T, AppError>;
