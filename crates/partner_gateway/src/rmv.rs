//! RMV client
//!
//! Registry of Motor Vehicles lookups, used to verify the registration
//! behind an excess-auto coverage.

use async_trait::async_trait;
use chrono::NaiveDate;
use serde::Deserialize;

use core_kernel::{DomainPort, PortError};

use crate::client::RestClient;
use crate::config::PartnerConfig;
use crate::ports::{RegistrationQuery, RegistrationRecord, VehicleRegistry};

/// REST client for the RMV
#[derive(Debug)]
pub struct RmvClient {
    rest: RestClient,
}

impl RmvClient {
    /// Creates an RMV client
    pub fn new(config: PartnerConfig) -> Result<Self, PortError> {
        Ok(Self {
            rest: RestClient::new("rmv", config)?,
        })
    }
}

#[derive(Debug, Deserialize)]
struct RmvRegistrationResponse {
    vin: String,
    owner_name: String,
    registration_status: String,
    expiration_date: NaiveDate,
}

impl DomainPort for RmvClient {}

#[async_trait]
impl VehicleRegistry for RmvClient {
    async fn lookup_registration(
        &self,
        query: RegistrationQuery,
    ) -> Result<RegistrationRecord, PortError> {
        let path = format!(
            "registrations/{}/{}",
            query.state.to_ascii_uppercase(),
            query.plate.to_ascii_uppercase()
        );
        let response: RmvRegistrationResponse = self.rest.get_json(&path).await?;

        Ok(RegistrationRecord {
            vin: response.vin,
            registered_owner: response.owner_name,
            status: response.registration_status,
            expires: response.expiration_date,
        })
    }
}
