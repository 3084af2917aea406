use core::fmt;
use std::sync::Arc;
use std::time::Duration;

use base64::Engine;
use reqwest::{
    Client,
    header::{AUTHORIZATION, HeaderMap, HeaderValue},
};
use sha2::{Digest, Sha256};
use url::Url;

use crate::internal::store::structs::store_error::StoreError;

/// 单次远程请求的超时上限；分片本身可达 4MB，留足传输时间
const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

/// 认证结构体
///
/// 该结构体定位
/// - 存储访问 WebDav 消息仓库所需的基础认证信息
/// - 为 WebdavStore 的元数据解析与分片拉取提供 http 客户端
///
/// 需要跨请求、跨任务共享（axum 状态），所以内部只用 Arc
#[derive(Clone)]
pub struct WebdavAuth {
    pub client: Client,      // 内部是Arc，不需要特殊处理
    pub base_url: Arc<Url>,  // 已保证以 / 结尾
    pub(crate) token_fingerprint: Arc<String>, // 只保留哈希，不保留原始 token
}

impl WebdavAuth {
    /// 创建新的认证结构体
    pub fn new(
        username: &str,
        password: &str,
        base_url: &str,
    ) -> Result<Self, StoreError> {
        let http_client = InternalHttpClient::create(username, password)?;
        let base_url = format_base_url(base_url)?;

        Ok(Self {
            client: http_client.client,
            base_url: Arc::new(base_url),
            token_fingerprint: Arc::new(http_client.token_fingerprint),
        })
    }

    /// 以 base_url 为根拼接相对路径，拒绝逃逸出根目录的路径
    pub fn join(&self, path: &str) -> Result<Url, StoreError> {
        let joined = self
            .base_url
            .join(path)
            .map_err(|_| StoreError::InvalidPath(path.to_string()))?;

        if joined.scheme() != self.base_url.scheme()
            || joined.host_str() != self.base_url.host_str()
            || !joined.path().starts_with(self.base_url.path())
        {
            return Err(StoreError::InvalidPath(path.to_string()));
        }

        Ok(joined)
    }

    /// 仅比较账号指纹是否相等
    pub fn eq_only_token(&self, other: &Self) -> bool {
        self.token_fingerprint == other.token_fingerprint
    }
}

impl PartialEq for WebdavAuth {
    fn eq(&self, other: &Self) -> bool {
        self.token_fingerprint == other.token_fingerprint
            && self.base_url == other.base_url
    }
}

/// 防止debug泄漏账号
impl fmt::Debug for WebdavAuth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WebdavAuth")
            .field("base_url", &self.base_url.as_str())
            .field("client", &"<Client with hidden authorization>")
            .finish()
    }
}

fn format_base_url(url: &str) -> Result<Url, StoreError> {
    if url.is_empty() {
        return Err(StoreError::InvalidPath("路径为空".to_string()));
    }

    let mut base_url =
        Url::parse(url).map_err(|e| StoreError::InvalidPath(e.to_string()))?;

    if !base_url.path().ends_with('/') {
        let new_path = format!("{}/", base_url.path());
        base_url.set_path(&new_path);
    }

    Ok(base_url)
}

/// 初始化 WebdavAuth 时临时使用的 http 客户端
struct InternalHttpClient {
    client: Client,
    token_fingerprint: String,
}

impl InternalHttpClient {
    fn fingerprint(data: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(data.as_bytes());
        format!("{:x}", hasher.finalize())
    }

    fn create(username: &str, password: &str) -> Result<Self, StoreError> {
        let mut headers = HeaderMap::new();

        let token = base64::engine::general_purpose::STANDARD
            .encode(format!("{username}:{password}"));

        let auth_value = HeaderValue::from_str(&format!("Basic {}", token))
            .map_err(|e| StoreError::Client(e.to_string()))?;

        headers.insert(AUTHORIZATION, auth_value);

        let client = Client::builder()
            .http1_only()
            .timeout(REQUEST_TIMEOUT)
            .default_headers(headers)
            .build()
            .map_err(|e| StoreError::Client(e.to_string()))?;

        Ok(Self {
            client,
            token_fingerprint: Self::fingerprint(&token),
        })
    }
}
