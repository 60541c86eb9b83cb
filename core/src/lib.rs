pub mod archive;
pub mod config;
pub mod integrity;
pub mod keys;
pub mod model;
pub mod normalizer;
pub mod pipeline;
pub mod query;
pub mod sns;
pub mod source;
pub mod store;
pub mod timestamp;

pub mod error;
