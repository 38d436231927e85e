//! SpeedPay client
//!
//! Claim disbursements. SpeedPay acknowledges a submission synchronously;
//! the receipt carries its transaction id and a settlement status.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use core_kernel::{DomainPort, PortError};

use crate::client::RestClient;
use crate::config::PartnerConfig;
use crate::ports::{DisbursementReceipt, DisbursementRequest, DisbursementStatus, PaymentGateway};

/// REST client for SpeedPay
#[derive(Debug)]
pub struct SpeedPayClient {
    rest: RestClient,
}

impl SpeedPayClient {
    /// Creates a SpeedPay client
    pub fn new(config: PartnerConfig) -> Result<Self, PortError> {
        Ok(Self {
            rest: RestClient::new("speedpay", config)?,
        })
    }
}

#[derive(Debug, Serialize)]
struct SpeedPayDisbursement<'a> {
    account_reference: &'a str,
    amount: rust_decimal::Decimal,
    currency: &'a str,
    channel: &'a str,
    client_reference: &'a str,
}

#[derive(Debug, Deserialize)]
struct SpeedPayResponse {
    transaction_id: String,
    status: String,
    processed_at: Option<DateTime<Utc>>,
}

fn map_status(status: &str) -> Result<DisbursementStatus, PortError> {
    match status {
        "completed" | "settled" => Ok(DisbursementStatus::Completed),
        "accepted" | "processing" => Ok(DisbursementStatus::Processing),
        "declined" | "rejected" => Ok(DisbursementStatus::Declined),
        other => Err(PortError::Transformation {
            message: format!("speedpay: unknown disbursement status '{}'", other),
        }),
    }
}

impl DomainPort for SpeedPayClient {}

#[async_trait]
impl PaymentGateway for SpeedPayClient {
    async fn submit_disbursement(
        &self,
        request: DisbursementRequest,
    ) -> Result<DisbursementReceipt, PortError> {
        let wire = SpeedPayDisbursement {
            account_reference: &request.claim_number,
            amount: request.amount,
            currency: &request.currency,
            channel: &request.method,
            client_reference: &request.reference,
        };

        let response: SpeedPayResponse = self.rest.post_json("disbursements", &wire).await?;

        Ok(DisbursementReceipt {
            transaction_id: response.transaction_id,
            status: map_status(&response.status)?,
            processed_at: response.processed_at.unwrap_or_else(Utc::now),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(map_status("completed").unwrap(), DisbursementStatus::Completed);
        assert_eq!(map_status("settled").unwrap(), DisbursementStatus::Completed);
        assert_eq!(map_status("accepted").unwrap(), DisbursementStatus::Processing);
        assert_eq!(map_status("declined").unwrap(), DisbursementStatus::Declined);
        assert!(map_status("exploded").is_err());
    }
}
