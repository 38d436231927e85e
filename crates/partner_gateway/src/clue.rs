//! CLUE Property client
//!
//! Comprehensive Loss Underwriting Exchange reports: prior losses reported
//! against a property, used while adjusting property claims.

use async_trait::async_trait;
use chrono::NaiveDate;
use serde::Deserialize;

use core_kernel::{DomainPort, PortError};

use crate::client::RestClient;
use crate::config::PartnerConfig;
use crate::ports::{LossHistoryEntry, LossHistoryProvider, LossHistoryReport, LossHistoryRequest};

/// REST client for CLUE Property
#[derive(Debug)]
pub struct ClueClient {
    rest: RestClient,
}

impl ClueClient {
    /// Creates a CLUE client
    pub fn new(config: PartnerConfig) -> Result<Self, PortError> {
        Ok(Self {
            rest: RestClient::new("clue", config)?,
        })
    }
}

#[derive(Debug, Deserialize)]
struct ClueReportResponse {
    report_id: String,
    losses: Vec<ClueLoss>,
}

#[derive(Debug, Deserialize)]
struct ClueLoss {
    date_of_loss: NaiveDate,
    cause: String,
    amount_paid: rust_decimal::Decimal,
}

impl DomainPort for ClueClient {}

#[async_trait]
impl LossHistoryProvider for ClueClient {
    async fn order_report(
        &self,
        request: LossHistoryRequest,
    ) -> Result<LossHistoryReport, PortError> {
        let response: ClueReportResponse = self.rest.post_json("reports/property", &request).await?;

        Ok(LossHistoryReport {
            reference: response.report_id,
            entries: response
                .losses
                .into_iter()
                .map(|loss| LossHistoryEntry {
                    loss_date: loss.date_of_loss,
                    loss_type: loss.cause,
                    amount_paid: loss.amount_paid,
                })
                .collect(),
        })
    }
}
