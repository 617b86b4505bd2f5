//! Request handlers

pub mod appointments;
pub mod campaigns;
pub mod claims;
pub mod health;
pub mod vehicles;
