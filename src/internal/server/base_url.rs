//! 对外基础地址：优先取请求头里的反向代理信息，其次取启动时探测到的地址。

use std::net::IpAddr;

use axum::http::HeaderMap;
use axum::http::header::HOST;
use tokio::net::UdpSocket;

/// 托管平台注入的环境变量，启动时读取一次
#[derive(Debug, Clone, Default)]
pub struct PlatformEnv {
    pub custom_domain: Option<String>,
    pub heroku_app_name: Option<String>,
    pub render_external_url: Option<String>,
    pub railway_public_domain: Option<String>,
    pub railway_static_url: Option<String>,
    pub fly_app_name: Option<String>,
    pub vercel_url: Option<String>,
}

impl PlatformEnv {
    pub fn from_lookup<F>(lookup: &F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        Self {
            custom_domain: lookup("CUSTOM_DOMAIN"),
            heroku_app_name: lookup("HEROKU_APP_NAME"),
            render_external_url: lookup("RENDER_EXTERNAL_URL"),
            railway_public_domain: lookup("RAILWAY_PUBLIC_DOMAIN"),
            railway_static_url: lookup("RAILWAY_STATIC_URL"),
            fly_app_name: lookup("FLY_APP_NAME"),
            vercel_url: lookup("VERCEL_URL"),
        }
    }
}

/// 按平台优先级推导基础地址，都没配置时返回 `None`
pub fn platform_base_url(env: &PlatformEnv) -> Option<String> {
    if let Some(domain) = &env.custom_domain {
        let domain = domain.trim();
        return Some(if domain.starts_with("http") {
            domain.to_string()
        } else {
            format!("https://{domain}")
        });
    }
    if let Some(app) = &env.heroku_app_name {
        return Some(format!("https://{app}.herokuapp.com"));
    }
    if let Some(url) = &env.render_external_url {
        return Some(url.trim_end_matches('/').to_string());
    }
    if let Some(domain) = &env.railway_public_domain {
        return Some(format!("https://{domain}"));
    }
    if let Some(url) = &env.railway_static_url {
        return Some(url.trim_end_matches('/').to_string());
    }
    if let Some(app) = &env.fly_app_name {
        return Some(format!("https://{app}.fly.dev"));
    }
    if let Some(url) = &env.vercel_url {
        return Some(format!("https://{url}"));
    }
    None
}

/// 通过一次 UDP connect 找出出口网卡的本机地址，不会真正发包
pub async fn local_ip() -> Option<IpAddr> {
    let socket = UdpSocket::bind("0.0.0.0:0").await.ok()?;
    socket.connect("8.8.8.8:80").await.ok()?;
    socket.local_addr().ok().map(|addr| addr.ip())
}

/// 启动时探测基础地址：平台变量 → 本机出口地址 → 回环地址
pub async fn detect_base_url(env: &PlatformEnv, port: u16) -> String {
    if let Some(url) = platform_base_url(env) {
        return url;
    }
    match local_ip().await {
        Some(ip) => format!("http://{ip}:{port}"),
        None => {
            tracing::warn!("无法探测本机地址，使用 127.0.0.1");
            format!("http://127.0.0.1:{port}")
        }
    }
}

/// 从请求头推导基础地址。
///
/// 有 `X-Forwarded-Host` 时协议取 `X-Forwarded-Proto`，缺省 https；
/// 只有 `Host` 时仅在 `X-Forwarded-Proto: https` 下用 https；都没有时用兜底值。
pub fn base_url_from_request(headers: &HeaderMap, fallback: &str) -> String {
    let header = |name: &str| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            // 多级代理时取第一个
            .and_then(|v| v.split(',').next())
            .map(str::trim)
            .filter(|v| !v.is_empty())
    };
    let forwarded_proto = header("x-forwarded-proto");

    if let Some(host) = header("x-forwarded-host") {
        let scheme = forwarded_proto.unwrap_or("https");
        return format!("{scheme}://{host}");
    }
    if let Some(host) = header(HOST.as_str()) {
        let scheme = if forwarded_proto == Some("https") { "https" } else { "http" };
        return format!("{scheme}://{host}");
    }
    fallback.trim_end_matches('/').to_string()
}
