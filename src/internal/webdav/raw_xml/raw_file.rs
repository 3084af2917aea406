use serde::Deserialize;

/// 对应 WebDAV 响应 XML 顶层的 `<D:multistatus>` 节点
#[derive(Debug, Deserialize, Clone)]
pub struct MultiStatus {
    /// 每个 `<D:response>` 表示一个资源；Depth 1 时第一项是集合本身
    #[serde(rename = "response", default)]
    pub responses: Vec<Response>,
}

/// 对应单个 `<D:response>` 节点
#[derive(Debug, Deserialize, Clone)]
pub struct Response {
    /// 资源路径（URL 编码）
    pub href: String,
    #[serde(rename = "propstat", default)]
    pub propstats: Vec<PropStat>,
}

/// 一个属性集 + 对应的 HTTP 状态，如 "HTTP/1.1 200 OK"
#[derive(Debug, Deserialize, Clone)]
pub struct PropStat {
    pub prop: Prop,
    pub status: String,
}

impl PropStat {
    pub fn is_ok(&self) -> bool {
        self.status
            .split_whitespace()
            .find_map(|t| t.parse::<u16>().ok())
            .map(|code| (200..=299).contains(&code))
            .unwrap_or(false)
    }
}

/// `<D:prop>`：只声明附件解析用到的属性
#[derive(Debug, Deserialize, Clone)]
pub struct Prop {
    #[serde(rename = "resourcetype")]
    pub resource_type: Option<ResourceType>,

    #[serde(rename = "getcontentlength")]
    pub content_length: Option<u64>,

    #[serde(rename = "getcontenttype")]
    pub content_type: Option<String>,

    #[serde(rename = "displayname")]
    pub display_name: Option<String>,
}

/// `<resourcetype>` 节点
#[derive(Debug, Deserialize, Clone)]
pub struct ResourceType {
    /// `<collection/>` 存在表示是目录
    #[serde(rename = "collection")]
    pub is_collection: Option<EmptyElement>,
}

/// 空元素的占位结构，例如 `<collection/>`
#[derive(Debug, Deserialize, Clone)]
pub struct EmptyElement {}
