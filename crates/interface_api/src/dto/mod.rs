//! Request/response data transfer objects

pub mod campaigns;
pub mod claims;
