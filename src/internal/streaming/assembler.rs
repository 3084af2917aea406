//! 流组装：按顺序消费预取缓冲区，裁掉首尾分片的多余字节，正好输出 `total_bytes` 字节。

use std::time::Duration;

use bytes::Bytes;
use futures_util::Stream;

use super::error::StreamError;
use super::prefetch::Prefetched;
use super::session::StreamSession;
use super::tuning::StreamTuning;

pub struct StreamAssembler {
    session: StreamSession,
    /// 下一个要输出的分片序号，从 1 开始
    current_part: u32,
    bytes_sent: u64,
    pull_timeout: Duration,
    /// 0 表示不设上限
    max_pull_timeouts: u32,
}

impl StreamAssembler {
    pub fn new(session: StreamSession, tuning: &StreamTuning) -> Self {
        Self {
            session,
            current_part: 1,
            bytes_sent: 0,
            pull_timeout: tuning.pull_timeout,
            max_pull_timeouts: tuning.max_pull_timeouts,
        }
    }

    pub fn session(&self) -> &StreamSession {
        &self.session
    }

    /// 取下一个裁剪后的分片；全部输出完返回 `Ok(None)`
    pub async fn next_part(&mut self) -> Result<Option<Bytes>, StreamError> {
        let plan = self.session.plan;
        if self.current_part > plan.part_count {
            return Ok(None);
        }

        let mut timeouts = 0u32;
        let item = loop {
            match tokio::time::timeout(self.pull_timeout, self.session.buffer.recv()).await {
                Ok(item) => break item,
                Err(_) => {
                    timeouts += 1;
                    tracing::warn!(
                        file_id = self.session.file.id,
                        part = self.current_part,
                        timeouts,
                        "预取超时，重试"
                    );
                    if self.max_pull_timeouts > 0 && timeouts >= self.max_pull_timeouts {
                        return Err(StreamError::UpstreamFailure(format!(
                            "连续 {timeouts} 次等待分片超时"
                        )));
                    }
                }
            }
        };

        let chunk = match item {
            Some(Prefetched::Chunk(chunk)) => chunk,
            Some(Prefetched::Failed(message)) => {
                return Err(StreamError::UpstreamFailure(message));
            }
            Some(Prefetched::End) => {
                return Err(StreamError::StreamTruncated {
                    expected: plan.part_count,
                    received: self.current_part - 1,
                });
            }
            None => {
                return Err(StreamError::UpstreamFailure("预取任务意外退出".into()));
            }
        };

        // 分片比计划短说明远端内容和声明的大小对不上
        let expected_len = plan.chunk_len(self.current_part - 1);
        if (chunk.len() as u64) < expected_len {
            return Err(StreamError::StreamTruncated {
                expected: plan.part_count,
                received: self.current_part - 1,
            });
        }

        let (from, to) = plan.slice_bounds(self.current_part, expected_len);
        if to > chunk.len() as u64 || from > to {
            return Err(StreamError::StreamTruncated {
                expected: plan.part_count,
                received: self.current_part - 1,
            });
        }

        self.current_part += 1;
        self.bytes_sent += to - from;
        Ok(Some(chunk.slice(from as usize..to as usize)))
    }

    /// 转成一次性的惰性字节流。
    ///
    /// 无论正常结束还是出错，都会先拆除会话再结束流；出错时最后产出一个 `Err`，
    /// 让传输层中断连接，而不是把截断的响应当成功发出去。
    pub fn into_stream(mut self) -> impl Stream<Item = Result<Bytes, StreamError>> + Send + 'static {
        async_stream::stream! {
            let mut failure = None;
            loop {
                match self.next_part().await {
                    Ok(Some(part)) => yield Ok(part),
                    Ok(None) => break,
                    Err(err) => {
                        failure = Some(err);
                        break;
                    }
                }
            }

            self.session.shutdown().await;

            let file_id = self.session.file.id;
            match failure {
                None => {
                    tracing::info!(file_id, bytes = self.bytes_sent, "文件发送完成");
                }
                Some(err) => {
                    tracing::error!(file_id, bytes = self.bytes_sent, error = %err, "文件发送中断");
                    yield Err(err);
                }
            }
        }
    }
}
