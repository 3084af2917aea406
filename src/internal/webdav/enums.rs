use reqwest::Method;

use crate::internal::store::structs::store_error::StoreError;

pub enum WebDavMethod {
    Propfind,
}

impl WebDavMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            WebDavMethod::Propfind => "PROPFIND",
        }
    }

    pub fn to_method(&self) -> Result<Method, StoreError> {
        Method::from_bytes(self.as_str().as_bytes())
            .map_err(|e| StoreError::Client(e.to_string()))
    }
}

pub enum Depth {
    /// 返回当前资源及直接子资源（一条消息下的附件）
    One,
}

impl Depth {
    pub fn as_str(&self) -> &'static str {
        match self {
            Depth::One => "1",
        }
    }
}
