//! PolicySTAR client
//!
//! Export of bound policies to the downstream policy administration system.
//! PolicySTAR applies exports asynchronously: a successful submission comes
//! back as accepted (queued) or completed (already applied).

use async_trait::async_trait;
use serde::Deserialize;

use core_kernel::{DomainPort, PortError};

use crate::client::RestClient;
use crate::config::PartnerConfig;
use crate::ports::{ExportReceipt, ExportStatus, PolicyExportRequest, PolicyExporter};

/// REST client for PolicySTAR
#[derive(Debug)]
pub struct PolicyStarClient {
    rest: RestClient,
}

impl PolicyStarClient {
    /// Creates a PolicySTAR client
    pub fn new(config: PartnerConfig) -> Result<Self, PortError> {
        Ok(Self {
            rest: RestClient::new("policystar", config)?,
        })
    }
}

#[derive(Debug, Deserialize)]
struct PolicyStarResponse {
    export_reference: String,
    state: String,
}

fn map_state(state: &str) -> Result<ExportStatus, PortError> {
    match state {
        "queued" | "accepted" => Ok(ExportStatus::Accepted),
        "applied" | "completed" => Ok(ExportStatus::Completed),
        "failed" => Ok(ExportStatus::Failed),
        other => Err(PortError::Transformation {
            message: format!("policystar: unknown export state '{}'", other),
        }),
    }
}

impl DomainPort for PolicyStarClient {}

#[async_trait]
impl PolicyExporter for PolicyStarClient {
    async fn export_policy(&self, request: PolicyExportRequest) -> Result<ExportReceipt, PortError> {
        let response: PolicyStarResponse = self.rest.post_json("exports", &request).await?;

        Ok(ExportReceipt {
            reference: response.export_reference,
            status: map_state(&response.state)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_mapping() {
        assert_eq!(map_state("queued").unwrap(), ExportStatus::Accepted);
        assert_eq!(map_state("applied").unwrap(), ExportStatus::Completed);
        assert_eq!(map_state("failed").unwrap(), ExportStatus::Failed);
        assert!(map_state("limbo").is_err());
    }
}
