//! 服务配置：启动时从环境变量读取一次，之后作为只读值注入各处理器。

use std::time::Duration;

use thiserror::Error;

use crate::internal::streaming::StreamTuning;

use super::base_url::PlatformEnv;

pub const DEFAULT_BIND_ADDRESS: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 5000;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("缺少环境变量 {0}")]
    MissingEnv(&'static str),

    #[error("环境变量 {name} 无效: {value}")]
    InvalidEnv { name: &'static str, value: String },
}

/// WebDav 消息仓库的连接信息
#[derive(Clone)]
pub struct WebdavSettings {
    pub url: String,
    pub username: String,
    pub password: String,
    /// 消息集合所在的相对根目录
    pub root: String,
}

/// 防止debug泄漏账号
impl std::fmt::Debug for WebdavSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WebdavSettings")
            .field("url", &self.url)
            .field("root", &self.root)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub bind_address: String,
    pub port: u16,
    pub webdav: WebdavSettings,
    pub platform: PlatformEnv,
    pub tuning: StreamTuning,
}

impl ServerConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// 通过任意查找函数读取配置，便于测试时不碰进程环境
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());
        let require = |name: &'static str| get(name).ok_or(ConfigError::MissingEnv(name));

        let bind_address = get("BIND_ADDRESS").unwrap_or_else(|| DEFAULT_BIND_ADDRESS.into());
        let port = parse_or("PORT", get("PORT"), DEFAULT_PORT)?;

        let webdav = WebdavSettings {
            url: require("WEBDAV_URL")?,
            username: require("WEBDAV_USERNAME")?,
            password: require("WEBDAV_PASSWORD")?,
            root: get("WEBDAV_ROOT").unwrap_or_else(|| "./".into()),
        };

        let defaults = StreamTuning::default();
        let tuning = StreamTuning {
            max_sessions: parse_or("MAX_CONCURRENT", get("MAX_CONCURRENT"), defaults.max_sessions)?,
            max_parallel_chunks: parse_or(
                "MAX_PARALLEL_CHUNKS",
                get("MAX_PARALLEL_CHUNKS"),
                defaults.max_parallel_chunks,
            )?,
            buffer_capacity: parse_or(
                "PREFETCH_BUFFER",
                get("PREFETCH_BUFFER"),
                defaults.buffer_capacity,
            )?,
            max_pull_timeouts: parse_or(
                "MAX_PULL_TIMEOUTS",
                get("MAX_PULL_TIMEOUTS"),
                defaults.max_pull_timeouts,
            )?,
            pull_timeout: parse_or("PULL_TIMEOUT_SECS", get("PULL_TIMEOUT_SECS"), defaults.pull_timeout.as_secs())
                .map(Duration::from_secs)?,
            ..defaults
        };

        if tuning.max_sessions == 0 {
            return Err(ConfigError::InvalidEnv {
                name: "MAX_CONCURRENT",
                value: "0".into(),
            });
        }
        // 为 0 时第一次拉取没就绪就算一次超时
        if tuning.pull_timeout.is_zero() {
            return Err(ConfigError::InvalidEnv {
                name: "PULL_TIMEOUT_SECS",
                value: "0".into(),
            });
        }

        Ok(Self {
            bind_address,
            port,
            webdav,
            platform: PlatformEnv::from_lookup(&get),
            tuning,
        })
    }
}

fn parse_or<T: std::str::FromStr>(
    name: &'static str,
    raw: Option<String>,
    default: T,
) -> Result<T, ConfigError> {
    match raw {
        None => Ok(default),
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidEnv { name, value }),
    }
}
