use quick_xml::de::from_str;
use reqwest::header::{ACCEPT, CONTENT_TYPE, HeaderMap, HeaderValue};
use url::Url;

use crate::internal::auth::structs::webdav_auth::WebdavAuth;
use crate::internal::store::structs::store_error::StoreError;
use crate::internal::webdav::enums::{Depth, WebDavMethod};
use crate::internal::webdav::raw_xml::raw_file::MultiStatus;

/// 只取附件解析需要的属性，避免 allprop 拉回一堆无用字段
const PROPFIND_BODY: &str = r#"<?xml version="1.0" encoding="utf-8" ?>
<D:propfind xmlns:D="DAV:">
  <D:prop>
    <D:resourcetype/>
    <D:displayname/>
    <D:getcontentlength/>
    <D:getcontenttype/>
  </D:prop>
</D:propfind>"#;

/// 对一个集合发起 PROPFIND，返回原始多状态数据。
///
/// 集合不存在时返回 `Ok(None)`，其余非 2xx/207 状态都算错误。
pub async fn propfind(
    webdav_auth: &WebdavAuth,
    url: &Url,
    depth: &Depth,
) -> Result<Option<MultiStatus>, StoreError> {
    let mut headers = HeaderMap::new();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/xml"));
    headers.insert("Depth", HeaderValue::from_static(depth.as_str()));
    headers.insert(ACCEPT, HeaderValue::from_static("application/xml"));

    let res = webdav_auth
        .client
        .request(WebDavMethod::Propfind.to_method()?, url.as_str())
        .headers(headers)
        .body(PROPFIND_BODY)
        .send()
        .await?;

    let status = res.status();
    if status.as_u16() == 404 {
        return Ok(None);
    }

    let xml_text = res.text().await?;

    if !status.is_success() {
        return Err(StoreError::UnexpectedStatus {
            status: status.as_u16(),
            body: xml_text,
        });
    }

    let multi_status: MultiStatus = from_str(&xml_text)?;

    Ok(Some(multi_status))
}
