pub mod client;
pub mod error;
pub mod types;

pub use client::HttpGateway;
pub use error::GatewayError;
pub use types::{BackendConfig, ImageFile, SharedConfig};

/// The two outbound calls a ritual makes.
pub trait Gateway {
    /// Sever the background from `file`, returning the processed image bytes.
    async fn remove_background(
        &self,
        file: &ImageFile,
        config: &BackendConfig,
    ) -> Result<Vec<u8>, GatewayError>;

    /// Fetch a short caption for `file`. Failures never escape: they become `None`.
    async fn describe(&self, file: &ImageFile, config: &BackendConfig) -> Option<String>;
}
