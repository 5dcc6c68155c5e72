pub mod coordinates;
pub mod metadata_xml;
pub mod paths;
pub mod pom;
pub mod remote_repo;
pub mod transient_repo;
pub mod version;
