pub mod client;
pub mod document;
pub mod import;
pub mod profile;
pub mod resolve;
pub mod resource;
