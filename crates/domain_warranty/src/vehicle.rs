//! Vehicles as seen by the warranty workflow

use serde::{Deserialize, Serialize};

use core_kernel::Vin;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vehicle {
    pub vin: Vin,
    pub model: String,
    pub owner_name: Option<String>,
}

impl Vehicle {
    pub fn new(vin: impl Into<Vin>, model: impl Into<String>) -> Self {
        Self {
            vin: vin.into(),
            model: model.into(),
            owner_name: None,
        }
    }

    pub fn with_owner(mut self, owner: impl Into<String>) -> Self {
        self.owner_name = Some(owner.into());
        self
    }
}
