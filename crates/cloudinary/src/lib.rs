//! # Meme Cloudinary
//!
//! [`meme_catalog::RemoteStore`] over the Cloudinary HTTP APIs. Assets live
//! under the `memes/` folder; names in the catalog never carry that prefix.
//!
//! ```no_run
//! use meme_catalog::{RemoteSnapshot, RemoteStore};
//! use meme_cloudinary::{CloudinaryClient, CloudinaryConfig};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let client = CloudinaryClient::new(CloudinaryConfig::from_env()?)?;
//!     let snapshot = RemoteSnapshot::fetch(&client).await?;
//!     println!("{} memes online", snapshot.len());
//!     Ok(())
//! }
//! ```

mod client;
mod config;
mod sign;
mod wire;

pub use client::CloudinaryClient;
pub use config::{CloudinaryConfig, API_BASE_ENV, CLOUDINARY_URL_ENV, DEFAULT_API_BASE};
pub use wire::{ASSET_PREFIX, MAX_RESULTS};
