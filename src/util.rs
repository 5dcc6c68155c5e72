pub mod checksum;
pub mod upload_source;
