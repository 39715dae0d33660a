pub mod config;
pub mod logging;

pub mod checksum;
pub mod error;
pub mod fetch;
pub mod length;
pub mod mac;
pub mod pipeline;
pub mod signature;
pub mod storage;
pub mod webhook;

pub use error::MediaError;
