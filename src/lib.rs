pub mod api;
pub mod auth;
pub mod cli;
pub mod client;
pub mod error;
pub mod request;
pub mod response;
pub mod session;
pub mod zones;

// Re-export commonly used types
pub use api::UltraApi;
pub use auth::Credentials;
pub use cli::{Cli, Command};
pub use client::ClientConfig;
pub use error::{Result, UdnsError};
pub use request::{ApiRequest, RequestBody};
pub use response::{ApiResponse, OutputFormat};
pub use session::{Session, SessionState};
