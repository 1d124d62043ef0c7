mod metadata;

pub use metadata::{MetadataResult, Price};
