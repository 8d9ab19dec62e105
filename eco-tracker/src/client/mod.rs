// src/client/mod.rs

//! EcoTracker API のクライアントラッパー
//!
//! モバイルアプリが行っていた呼び出しを型付きで提供する。
//! トークンは `TokenStore` に永続化され、呼び出しごとに読み出される。

pub mod api_client;
pub mod error;
pub mod session;
pub mod token_store;

pub use api_client::{ApiClient, ImageAttachment};
pub use error::{ClientError, ClientResult};
pub use session::{landing_route, Route, Session};
pub use token_store::{FileTokenStore, MemoryTokenStore, TokenStore};
