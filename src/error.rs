use thiserror::Error;

/// 应用程序错误类型
#[derive(Debug, Error)]
pub enum AppError {
    /// 配置错误
    #[error("配置错误: {0}")]
    Config(#[from] ConfigError),
    /// 页面解析错误
    #[error("解析错误: {0}")]
    Extract(#[from] ExtractError),
    /// 网络请求错误
    #[error("网络错误: {0}")]
    Transport(#[from] TransportError),
    /// 文件存储错误
    #[error("文件错误: {0}")]
    Store(#[from] StoreError),
}

/// 配置错误
///
/// 唯一允许直接抛给调用方的错误：说明调用方用错了，而不是网络或页面问题。
#[derive(Debug, Error)]
pub enum ConfigError {
    /// 未知科目
    #[error("未知科目 '{key}'，可用科目: {available}")]
    UnknownSubject { key: String, available: String },
    /// 环境变量解析失败
    #[error("环境变量 {var_name} 解析失败: 值 '{value}' 无法转换为 {expected_type}")]
    EnvVarParseFailed {
        var_name: String,
        value: String,
        expected_type: String,
    },
}

/// 单个题目块的解析错误
///
/// 只在单个 fragment 内部传播，页面级解析会记录日志并跳过该题。
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ExtractError {
    /// 缺少必需字段（guid 或题干单元格）
    #[error("缺少必需字段: {what}")]
    NotFound { what: &'static str },
    /// 结构与预期不符
    #[error("页面结构不符: {what}")]
    StructuralMismatch { what: String },
}

/// 网络请求错误
#[derive(Debug, Error)]
pub enum TransportError {
    /// 请求发送失败（超时、连接错误等）
    #[error("请求失败 ({endpoint}): {source}")]
    RequestFailed {
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },
    /// 服务器返回非 2xx 状态
    #[error("服务器返回错误状态 ({endpoint}): {status}")]
    BadStatus {
        endpoint: String,
        status: reqwest::StatusCode,
    },
    /// 构建 HTTP 客户端失败
    #[error("无法构建 HTTP 客户端: {0}")]
    ClientBuild(#[source] reqwest::Error),
    /// 站点地址无法解析
    #[error("站点地址无效 ({url}): {reason}")]
    InvalidBaseUrl { url: String, reason: String },
}

/// 文件存储错误
#[derive(Debug, Error)]
pub enum StoreError {
    /// 读取文件失败
    #[error("读取文件失败 ({path}): {source}")]
    ReadFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },
    /// 写入文件失败
    #[error("写入文件失败 ({path}): {source}")]
    WriteFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },
    /// JSON 解析或序列化失败
    #[error("JSON 处理失败 ({path}): {source}")]
    Json {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

// ========== 便捷构造函数 ==========

impl ExtractError {
    /// 创建结构不符错误
    pub fn mismatch(what: impl Into<String>) -> Self {
        ExtractError::StructuralMismatch { what: what.into() }
    }
}

impl TransportError {
    /// 包装 reqwest 请求错误
    pub fn request_failed(endpoint: impl Into<String>, source: reqwest::Error) -> Self {
        TransportError::RequestFailed {
            endpoint: endpoint.into(),
            source,
        }
    }
}

impl StoreError {
    /// 创建文件读取错误
    pub fn read_failed(path: impl AsRef<std::path::Path>, source: std::io::Error) -> Self {
        StoreError::ReadFailed {
            path: path.as_ref().display().to_string(),
            source,
        }
    }

    /// 创建文件写入错误
    pub fn write_failed(path: impl AsRef<std::path::Path>, source: std::io::Error) -> Self {
        StoreError::WriteFailed {
            path: path.as_ref().display().to_string(),
            source,
        }
    }
}

// ========== Result 类型别名 ==========

/// 应用程序结果类型
pub type AppResult<T> = Result<T, AppError>;
