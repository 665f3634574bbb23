pub mod api;
pub mod client;
pub mod codec;
pub mod config;
pub mod crypto;
pub mod error;
pub mod model;
pub mod notify;

pub use client::WxPayClient;
pub use codec::Params;
pub use config::{ClientConfig, ClientConfigBuilder};
pub use crypto::sign::SignType;
pub use error::{ErrorKind, WxPayError};
pub use model::notify::NotifyReply;
