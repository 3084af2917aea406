use url::Url;

use super::raw_file::{MultiStatus, Prop, PropStat, Response};

/// 多状态响应中的一个资源，已解码名字、拼好绝对地址
#[derive(Debug, Clone, PartialEq)]
pub struct RemoteEntry {
    pub href: String,
    pub url: Url,
    pub name: String,
    pub is_dir: bool,
    pub size: Option<u64>,
    pub mime: Option<String>,
}

pub trait ToRemoteEntries {
    /// 转换为资源列表，跳过集合本身（href 与 `collection_url` 相同的那一项）
    fn to_remote_entries(self, collection_url: &Url) -> Vec<RemoteEntry>;
}

fn decode_name(display_name: Option<String>, href: &str) -> String {
    display_name.filter(|n| !n.trim().is_empty()).unwrap_or_else(|| {
        percent_encoding::percent_decode_str(
            href.trim_end_matches('/').rsplit('/').next().unwrap_or(""),
        )
        .decode_utf8_lossy()
        .to_string()
    })
}

fn same_resource(a: &Url, b: &Url) -> bool {
    a.path().trim_end_matches('/') == b.path().trim_end_matches('/')
}

impl ToRemoteEntries for MultiStatus {
    fn to_remote_entries(self, collection_url: &Url) -> Vec<RemoteEntry> {
        let mut entries = Vec::new();

        for Response { href, propstats } in self.responses {
            let Some(PropStat { prop, .. }) =
                propstats.into_iter().find(PropStat::is_ok)
            else {
                continue;
            };

            let Ok(url) = collection_url.join(&href) else {
                continue;
            };
            if same_resource(&url, collection_url) {
                continue;
            }

            let Prop {
                resource_type,
                content_length,
                content_type,
                display_name,
            } = prop;

            let is_dir = resource_type
                .as_ref()
                .and_then(|rt| rt.is_collection.as_ref())
                .is_some();

            entries.push(RemoteEntry {
                name: decode_name(display_name, &href),
                href,
                url,
                is_dir,
                size: content_length,
                mime: content_type.filter(|m| !m.trim().is_empty()),
            });
        }

        entries
    }
}
