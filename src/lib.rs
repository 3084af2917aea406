/// 内部导出的模块
mod internal;


/// 导出服务入口：配置、路由与共享状态
pub use internal::server::{AppState, ConfigError, LinkError, ServerConfig, app};

pub mod auth {
    use crate::internal;
    pub use internal::auth::*;
    pub use internal::auth::structs::webdav_auth::WebdavAuth;
}

/// 对外提供webdav基础访问能力，自己实现仓库时也能复用
pub mod webdav {
    pub mod functions {
        use crate::internal;
        pub use internal::webdav::functions::propfind::*;
    }

    pub mod enums {
        use crate::internal;
        pub use internal::webdav::enums::*;
    }

    pub mod traits {
        pub use crate::internal::webdav::raw_xml::impl_multi_status::*;
    }

    pub mod structs {
        pub use crate::internal::webdav::raw_xml::raw_file::*;
    }
}

/// 消息仓库：协作方接口与 WebDav 实现
pub mod store {
    use crate::internal;
    pub use internal::store::structs::*;
    pub use internal::store::structs::media_kind::{FALLBACK_MIME, guess_mime};
    pub use internal::store::traits::file_store::*;
    pub use internal::store::webdav_store::*;
}

/// 流式引擎
pub mod streaming {
    pub use crate::internal::streaming::*;
}

pub mod server {
    use crate::internal;
    pub use internal::server::base_url::*;
    pub use internal::server::config::*;
    pub use internal::server::error::*;
    pub use internal::server::headers::*;
    pub use internal::server::pages::*;
    pub use internal::server::routes::*;
}

pub mod states {
    pub mod unlock_reactive {
        use crate::internal;
        pub use internal::states::unlock_reactive::*;
    }
}
