//! WebDav 基础访问能力：PROPFIND 请求与多状态 XML 模型。

pub mod enums;
pub mod functions;
pub mod raw_xml;
