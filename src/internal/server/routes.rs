//! HTTP 路由：首页、播放页、下载。
//!
//! 两个文件端点共用同一段准入流程：校验访问码存在 → 申请闸门名额 → 限时解析元数据 →
//! 校验访问码 → 补齐文件属性。下载时名额随响应体一起交给会话，发送结束才归还。

use std::sync::Arc;

use axum::body::Body;
use axum::extract::{Path, Query, State};
use axum::http::header::{
    ACCEPT_RANGES, CACHE_CONTROL, CONTENT_DISPOSITION, CONTENT_LENGTH, CONTENT_RANGE,
    CONTENT_TYPE, RANGE,
};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{Html, IntoResponse, Response};
use axum::routing::get;
use axum::Router;
use chrono::Local;
use serde::Deserialize;
use tracing::Instrument;

use crate::internal::store::structs::{FileHandle, FileProperties};
use crate::internal::store::traits::file_store::FileStore;
use crate::internal::streaming::{
    AdmissionToken, ConcurrencyGate, StreamAssembler, StreamSession, StreamTuning, resolve_range,
};

use super::base_url::base_url_from_request;
use super::error::LinkError;
use super::headers::{content_disposition, quote_code};
use super::pages::{PlayerPage, home_page};

/// `/dl` 上访问码带这个后缀时改为返回播放页
const STREAM_SUFFIX: &str = "=stream";
const CACHE_CONTROL_VALUE: &str = "public, max-age=3600";

/// 处理器共享状态，启动时构造一次
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn FileStore>,
    pub gate: ConcurrencyGate,
    pub tuning: Arc<StreamTuning>,
    /// 请求头推导不出地址时使用
    pub base_url: Arc<str>,
}

impl AppState {
    pub fn new(store: Arc<dyn FileStore>, tuning: StreamTuning, base_url: impl Into<Arc<str>>) -> Self {
        Self {
            store,
            gate: ConcurrencyGate::new(tuning.max_sessions),
            tuning: Arc::new(tuning),
            base_url: base_url.into(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct CodeQuery {
    code: Option<String>,
}

impl CodeQuery {
    fn code(&self) -> Result<&str, LinkError> {
        self.code
            .as_deref()
            .filter(|c| !c.is_empty())
            .ok_or(LinkError::MissingCode)
    }
}

pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/", get(home))
        .route("/stream/:id", get(stream_page))
        .route("/dl/:id", get(download))
        .with_state(state)
}

async fn home() -> Html<String> {
    Html(home_page())
}

/// 准入通过后的文件
struct Admitted {
    token: AdmissionToken,
    file: FileHandle,
    props: FileProperties,
}

async fn admit_and_resolve(state: &AppState, id: u64, code: &str) -> Result<Admitted, LinkError> {
    let token = state.gate.acquire().await?;

    let file = match tokio::time::timeout(state.tuning.metadata_timeout, state.store.resolve_file(id)).await {
        Err(_) => return Err(LinkError::MetadataTimeout),
        Ok(Err(err)) => return Err(LinkError::Store(err)),
        Ok(Ok(None)) => return Err(LinkError::FileNotFound),
        Ok(Ok(Some(file))) => file,
    };

    if !file.code_matches(code) {
        return Err(LinkError::InvalidCode);
    }

    let props = file.properties(Local::now()).ok_or(LinkError::InvalidMedia)?;
    tracing::info!(
        file_id = id,
        name = %props.name,
        size = props.size,
        mime = %props.mime,
        "文件属性"
    );

    Ok(Admitted { token, file, props })
}

async fn stream_page(
    State(state): State<AppState>,
    Path(id): Path<u64>,
    Query(query): Query<CodeQuery>,
    headers: HeaderMap,
) -> Result<Response, LinkError> {
    let code = query.code()?;
    tracing::info!(file_id = id, "播放页请求");
    render_player(&state, id, code, &headers)
        .instrument(tracing::info_span!("stream_page", file_id = id))
        .await
}

async fn render_player(
    state: &AppState,
    id: u64,
    code: &str,
    headers: &HeaderMap,
) -> Result<Response, LinkError> {
    let admitted = admit_and_resolve(state, id, code).await?;
    // 渲染页面不需要占着名额
    drop(admitted.token);

    let base = base_url_from_request(headers, &state.base_url);
    let file_url = format!("{base}/dl/{id}?code={}", quote_code(code));
    Ok(Html(PlayerPage::new(&admitted.props, file_url).render()).into_response())
}

async fn download(
    State(state): State<AppState>,
    Path(id): Path<u64>,
    Query(query): Query<CodeQuery>,
    headers: HeaderMap,
) -> Result<Response, LinkError> {
    let code = query.code()?;
    if let Some(clean) = code.strip_suffix(STREAM_SUFFIX) {
        tracing::info!(file_id = id, "下载链接转播放页");
        return render_player(&state, id, clean, &headers)
            .instrument(tracing::info_span!("stream_page", file_id = id))
            .await;
    }

    tracing::info!(file_id = id, "下载请求");
    start_download(&state, id, code, &headers)
        .instrument(tracing::info_span!("download", file_id = id))
        .await
}

async fn start_download(
    state: &AppState,
    id: u64,
    code: &str,
    headers: &HeaderMap,
) -> Result<Response, LinkError> {
    let Admitted { token, file, props } = admit_and_resolve(state, id, code).await?;

    // 空 Range 头当作没有
    let range_header = match headers.get(RANGE) {
        None => None,
        Some(value) => Some(
            value
                .to_str()
                .map_err(|_| LinkError::InvalidRange("Range 头不是合法文本".into()))?
                .trim(),
        ),
    }
    .filter(|h| !h.is_empty());

    if props.size == 0 {
        if range_header.is_some() {
            return Err(LinkError::InvalidRange("空文件不支持 Range".into()));
        }
        return file_response(StatusCode::OK, &props, None, 0, Body::empty());
    }

    let range = resolve_range(range_header, props.size)?;
    let status = if range_header.is_some() {
        StatusCode::PARTIAL_CONTENT
    } else {
        StatusCode::OK
    };

    let session = StreamSession::open(
        Arc::clone(&state.store),
        file,
        range,
        &state.tuning,
        Some(token),
    );
    tracing::info!(
        file_id = id,
        from = range.start,
        until = range.end,
        parts = session.plan.part_count,
        chunk_size = session.plan.chunk_size,
        "开始发送文件"
    );

    let body = Body::from_stream(StreamAssembler::new(session, &state.tuning).into_stream());
    file_response(
        status,
        &props,
        Some(range.content_range(props.size)),
        range.len(),
        body,
    )
}

fn file_response(
    status: StatusCode,
    props: &FileProperties,
    content_range: Option<String>,
    content_length: u64,
    body: Body,
) -> Result<Response, LinkError> {
    let mut builder = Response::builder()
        .status(status)
        .header(CONTENT_TYPE, props.mime.as_str())
        .header(CONTENT_LENGTH, content_length)
        .header(CONTENT_DISPOSITION, content_disposition(&props.name))
        .header(ACCEPT_RANGES, "bytes")
        .header(CACHE_CONTROL, CACHE_CONTROL_VALUE);
    if let Some(content_range) = content_range {
        builder = builder.header(CONTENT_RANGE, content_range);
    }
    builder
        .body(body)
        .map_err(|err| LinkError::Internal(format!("构造响应失败: {err}")))
}
