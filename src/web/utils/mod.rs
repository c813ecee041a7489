pub mod errors;
pub mod mime;
pub mod policy;
pub mod sniff;
pub mod streaming;
