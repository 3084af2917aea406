//! 首页与播放页。页面很小，直接拼 HTML，插入的值都先转义。

use crate::internal::store::structs::FileProperties;

/// 播放页需要的数据
#[derive(Debug, Clone)]
pub struct PlayerPage {
    pub file_name: String,
    pub file_size_mb: String,
    pub file_url: String,
    pub mime: String,
}

impl PlayerPage {
    pub fn new(props: &FileProperties, file_url: String) -> Self {
        Self {
            file_name: props.name.clone(),
            file_size_mb: format_size_mb(props.size),
            file_url,
            mime: props.mime.clone(),
        }
    }

    pub fn render(&self) -> String {
        let name = escape_html(&self.file_name);
        let url = escape_html(&self.file_url);
        let mime = escape_html(&self.mime);
        let size = escape_html(&self.file_size_mb);

        let media = if self.mime.starts_with("video/") {
            format!(r#"<video controls preload="metadata" src="{url}" type="{mime}"></video>"#)
        } else if self.mime.starts_with("audio/") {
            format!(r#"<audio controls preload="metadata" src="{url}" type="{mime}"></audio>"#)
        } else if self.mime.starts_with("image/") {
            format!(r#"<img src="{url}" alt="{name}">"#)
        } else {
            String::new()
        };

        format!(
            r#"<!DOCTYPE html>
<html>
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>{name}</title>
</head>
<body>
<h1>{name}</h1>
<p>Size: {size}</p>
{media}
<p><a href="{url}">Download</a></p>
</body>
</html>
"#
        )
    }
}

pub fn home_page() -> String {
    r#"<!DOCTYPE html>
<html>
<head><meta charset="utf-8"><title>WebDav Link</title></head>
<body>
<h1>WebDav Link</h1>
<p>Status: Running</p>
</body>
</html>
"#
    .to_string()
}

/// 字节数转成 `x.xx MB`
pub fn format_size_mb(size: u64) -> String {
    format!("{:.2} MB", size as f64 / (1024.0 * 1024.0))
}

pub fn escape_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            _ => out.push(c),
        }
    }
    out
}
