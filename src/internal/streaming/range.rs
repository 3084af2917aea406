//! Range 头解析：把 `bytes=<from>-[<until>]` 解析为闭区间。

use super::error::StreamError;

/// 闭区间字节范围，保证 `start <= end < file_size`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ByteRange {
    pub start: u64,
    pub end: u64,
}

impl ByteRange {
    /// 区间字节数
    pub fn len(&self) -> u64 {
        self.end - self.start + 1
    }

    /// `Content-Range` 头的值
    pub fn content_range(&self, file_size: u64) -> String {
        format!("bytes {}-{}/{}", self.start, self.end, file_size)
    }
}

/// 根据可选的 Range 头和文件大小解析请求区间。
///
/// - 没有头：整个文件；
/// - `from` 必填，`until` 可省略（默认到文件末尾）；
/// - `until > file_size`、`from < 0`、`until < from` 都拒绝；`until == file_size` 收到末尾。
///
/// 空文件没有可表示的闭区间，调用方需先行处理；这里对空文件一律拒绝。
pub fn resolve_range(
    header: Option<&str>,
    file_size: u64,
) -> Result<ByteRange, StreamError> {
    if file_size == 0 {
        return Err(StreamError::InvalidRange("空文件没有可请求的区间".into()));
    }
    let last = file_size - 1;

    let Some(header) = header.map(str::trim).filter(|h| !h.is_empty()) else {
        return Ok(ByteRange { start: 0, end: last });
    };

    let spec = header
        .strip_prefix("bytes=")
        .ok_or_else(|| StreamError::InvalidRange(format!("不支持的单位: {header}")))?;

    let (from_s, until_s) = spec
        .split_once('-')
        .ok_or_else(|| StreamError::InvalidRange(format!("缺少 '-': {header}")))?;

    // `bytes=-N` 这类后缀区间（以及负起点）在这里解析失败
    let from: u64 = from_s
        .trim()
        .parse()
        .map_err(|_| StreamError::InvalidRange(format!("起点无效: {header}")))?;

    let until: u64 = match until_s.trim() {
        "" => last,
        s => s
            .parse()
            .map_err(|_| StreamError::InvalidRange(format!("终点无效: {header}")))?,
    };

    if until > file_size || until < from {
        return Err(StreamError::InvalidRange(format!(
            "区间越界: {from}-{until}/{file_size}"
        )));
    }

    let end = until.min(last);
    if from > end {
        return Err(StreamError::InvalidRange(format!(
            "起点超出文件末尾: {from}-{until}/{file_size}"
        )));
    }

    Ok(ByteRange { start: from, end })
}
