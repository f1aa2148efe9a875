//! Configuration-Blob API Client
//!
//! A client for a remote configuration-blob service: conditional GETs with
//! bearer authentication and ETag revalidation, plus a polling subscription
//! that streams the current value of a single blob over a channel.

pub mod client;
pub mod error;
pub mod subscription;

pub use client::{BlobClient, BlobFetch};
pub use error::{BlobClientError, Result};
pub use subscription::{BlobSubscription, BlobUpdate, SubscriptionConfig};
