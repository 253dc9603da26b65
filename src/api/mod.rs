//! Backend access: the transport seam, the authenticated fetcher every view goes
//! through, and typed wrappers for the administrative endpoints.

pub mod transport;
pub mod fetcher;
pub mod models;
pub mod admin;
#[cfg(test)]
pub(crate) mod mock;

pub use transport::{ApiRequest, ApiResponse, Body, FilePart, HttpTransport, Method, Transport};
pub use fetcher::{Anonymous, Fetcher, RequestOptions, SessionSource};
pub use admin::{blogs_path, users_list_path, AdminApi, BlogSort, DEFAULT_USERS_LIMIT};
