mod backend;
mod client;
pub mod dev_backend;
pub mod dto;
mod error;

pub use backend::{AuthBackend, Connector, TaskBackend};
pub use client::{ApiClient, AuthClient, RemoteConnector};
pub use dev_backend::DevBackend;
pub use error::{ApiError, SESSION_EXPIRED_MESSAGE};
