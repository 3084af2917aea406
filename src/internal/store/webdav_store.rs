//! 基于 WebDav 的消息仓库。
//!
//! ## 仓库布局
//!
//! 每条消息对应根目录下的一个集合 `<root>/<id>/`：
//! - 集合内的 `caption.txt` 是消息正文，去掉首尾空白后作为访问码；
//! - 集合内其余的第一个文件（按名字排序）是消息附件。
//!
//! 元数据解析走一次 `PROPFIND Depth: 1`，分片拉取对附件发 Range GET，每个分片一次请求。

use async_trait::async_trait;
use bytes::{Bytes, BytesMut};
use futures_util::StreamExt;
use reqwest::{Response, StatusCode};
use reqwest::header::RANGE;

use crate::internal::auth::structs::webdav_auth::WebdavAuth;
use crate::internal::store::structs::{FileHandle, MediaKind, StoreError};
use crate::internal::store::structs::media_kind::guess_mime;
use crate::internal::store::traits::file_store::{ChunkSource, FileStore};
use crate::internal::webdav::enums::Depth;
use crate::internal::webdav::functions::propfind::propfind;
use crate::internal::webdav::raw_xml::impl_multi_status::{RemoteEntry, ToRemoteEntries};

/// 消息正文所在的文件名
pub const CAPTION_FILE: &str = "caption.txt";

/// 生成单个 Range 请求头：`bytes=start-(end-1)`，end 为不含上界。
pub(crate) fn range_header(start: u64, end: u64) -> String {
    let end_inclusive = end.saturating_sub(1);
    format!("bytes={}-{}", start, end_inclusive)
}

#[derive(Debug, Clone)]
pub struct WebdavStore {
    auth: WebdavAuth,
    /// 消息集合所在的相对根目录，已保证以 / 结尾
    root: String,
}

impl WebdavStore {
    pub fn new(auth: WebdavAuth, root: &str) -> Self {
        let root = root.trim().trim_start_matches('/');
        let root = match root {
            "" | "." | "./" => "./".to_string(),
            r if r.ends_with('/') => r.to_string(),
            r => format!("{r}/"),
        };
        Self { auth, root }
    }

    async fn read_caption(&self, entry: &RemoteEntry) -> Result<Option<String>, StoreError> {
        let resp = self.auth.client.get(entry.url.as_str()).send().await?;
        if resp.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let status = resp.status();
        let text = resp.text().await?;
        if !status.is_success() {
            return Err(StoreError::UnexpectedStatus {
                status: status.as_u16(),
                body: text,
            });
        }
        let code = text.trim();
        Ok((!code.is_empty()).then(|| code.to_string()))
    }
}

/// 最多读取响应体的前 `len` 字节，然后丢弃响应。
///
/// 忽略 Range 的服务器会返回整个文件，不能整体读进内存。
async fn read_at_most(resp: Response, len: u64) -> Result<Bytes, StoreError> {
    let mut body = resp.bytes_stream();
    let mut buf = BytesMut::with_capacity(len as usize);
    while (buf.len() as u64) < len {
        match body.next().await {
            Some(part) => buf.extend_from_slice(&part?),
            None => break,
        }
    }
    buf.truncate(len as usize);
    Ok(buf.freeze())
}

fn is_caption(entry: &RemoteEntry) -> bool {
    entry.name.eq_ignore_ascii_case(CAPTION_FILE)
}

#[async_trait]
impl FileStore for WebdavStore {
    async fn resolve_file(&self, id: u64) -> Result<Option<FileHandle>, StoreError> {
        let url = self.auth.join(&format!("{}{}/", self.root, id))?;

        let Some(multi_status) = propfind(&self.auth, &url, &Depth::One).await? else {
            return Ok(None);
        };

        let mut entries = multi_status.to_remote_entries(&url);
        entries.retain(|e| !e.is_dir);
        entries.sort_by(|a, b| a.name.cmp(&b.name));

        let access_code = match entries.iter().find(|e| is_caption(e)) {
            Some(caption) => self.read_caption(caption).await?,
            None => None,
        };

        let Some(attachment) = entries.into_iter().find(|e| !is_caption(e)) else {
            tracing::debug!(file_id = id, "消息中没有附件");
            return Ok(None);
        };

        let mime = attachment
            .mime
            .clone()
            .or_else(|| guess_mime(&attachment.name).map(str::to_string));
        let media_kind = mime.as_deref().map(MediaKind::from_mime);

        Ok(Some(FileHandle {
            id,
            location: attachment.url.to_string(),
            name: Some(attachment.name).filter(|n| !n.is_empty()),
            size: attachment.size.unwrap_or(0),
            mime: attachment.mime,
            media_kind,
            access_code,
        }))
    }
}

#[async_trait]
impl ChunkSource for WebdavStore {
    async fn fetch_chunk(
        &self,
        handle: &FileHandle,
        offset: u64,
        len: u64,
    ) -> Result<Bytes, StoreError> {
        let resp = self
            .auth
            .client
            .get(&handle.location)
            .header(RANGE, range_header(offset, offset + len))
            .send()
            .await?;

        let status = resp.status();
        let body = match status {
            StatusCode::PARTIAL_CONTENT => read_at_most(resp, len).await?,
            // 忽略 Range 的服务器只在首个分片时还能凑合用
            StatusCode::OK if offset == 0 => read_at_most(resp, len).await?,
            StatusCode::OK => return Err(StoreError::RangeNotSupported),
            _ => {
                return Err(StoreError::UnexpectedStatus {
                    status: status.as_u16(),
                    body: resp.text().await.unwrap_or_default(),
                });
            }
        };

        let actual = body.len() as u64;
        if actual < len {
            return Err(StoreError::ShortChunk {
                offset,
                expected: len,
                actual,
            });
        }

        Ok(body)
    }
}
