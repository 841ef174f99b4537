pub mod client;
pub mod error;
pub mod types;

pub use client::{RemoteClient, RemoteConfig};
pub use error::RemoteError;
pub use types::VisitRow;
