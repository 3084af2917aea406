//! PROPFIND 多状态响应解析。

use quick_xml::de::from_str;
use url::Url;

use crate::internal::store::webdav_store::range_header;
use crate::internal::webdav::raw_xml::impl_multi_status::ToRemoteEntries;
use crate::internal::webdav::raw_xml::raw_file::MultiStatus;

const MESSAGE_42: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<D:multistatus xmlns:D="DAV:">
  <D:response>
    <D:href>/dav/msgs/42/</D:href>
    <D:propstat>
      <D:prop>
        <D:resourcetype><D:collection/></D:resourcetype>
        <D:displayname>42</D:displayname>
      </D:prop>
      <D:status>HTTP/1.1 200 OK</D:status>
    </D:propstat>
  </D:response>
  <D:response>
    <D:href>/dav/msgs/42/caption.txt</D:href>
    <D:propstat>
      <D:prop>
        <D:resourcetype/>
        <D:getcontentlength>6</D:getcontentlength>
        <D:getcontenttype>text/plain</D:getcontenttype>
      </D:prop>
      <D:status>HTTP/1.1 200 OK</D:status>
    </D:propstat>
  </D:response>
  <D:response>
    <D:href>/dav/msgs/42/my%20clip.mp4</D:href>
    <D:propstat>
      <D:prop>
        <D:resourcetype/>
        <D:getcontentlength>10485760</D:getcontentlength>
        <D:getcontenttype>video/mp4</D:getcontenttype>
        <D:getetag>W/"abc123"</D:getetag>
        <D:getlastmodified>Mon, 01 Jan 2024 08:00:00 GMT</D:getlastmodified>
      </D:prop>
      <D:status>HTTP/1.1 200 OK</D:status>
    </D:propstat>
  </D:response>
  <D:response>
    <D:href>/dav/msgs/42/thumbs/</D:href>
    <D:propstat>
      <D:prop>
        <D:resourcetype><D:collection/></D:resourcetype>
      </D:prop>
      <D:status>HTTP/1.1 200 OK</D:status>
    </D:propstat>
  </D:response>
  <D:response>
    <D:href>/dav/msgs/42/ghost.bin</D:href>
    <D:propstat>
      <D:prop>
        <D:getcontentlength>1</D:getcontentlength>
      </D:prop>
      <D:status>HTTP/1.1 404 Not Found</D:status>
    </D:propstat>
  </D:response>
</D:multistatus>"#;

#[test]
fn parses_prefixed_multistatus() {
    let ms: MultiStatus = from_str(MESSAGE_42).unwrap();
    assert_eq!(ms.responses.len(), 5);
    assert!(ms.responses[0].propstats[0].is_ok());
    assert!(!ms.responses[4].propstats[0].is_ok());
}

#[test]
fn entries_skip_collection_and_failed_props() {
    let ms: MultiStatus = from_str(MESSAGE_42).unwrap();
    let collection = Url::parse("https://dav.example.com/dav/msgs/42/").unwrap();
    let entries = ms.to_remote_entries(&collection);

    let names: Vec<&str> = entries.iter().map(|e| e.name.as_str()).collect();
    assert_eq!(names, vec!["caption.txt", "my clip.mp4", "thumbs"]);

    let clip = &entries[1];
    assert!(!clip.is_dir);
    assert_eq!(clip.size, Some(10 * 1024 * 1024));
    assert_eq!(clip.mime.as_deref(), Some("video/mp4"));
    assert_eq!(
        clip.url.as_str(),
        "https://dav.example.com/dav/msgs/42/my%20clip.mp4"
    );

    assert!(entries[2].is_dir);
}

#[test]
fn chunk_range_header_is_inclusive() {
    assert_eq!(range_header(0, 4 * 1024 * 1024), "bytes=0-4194303");
    assert_eq!(range_header(64, 100), "bytes=64-99");
}
