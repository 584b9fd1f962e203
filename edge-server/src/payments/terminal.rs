//! Payment terminal collaborator.
//!
//! The terminal protocol itself (wire format, pairing, hardware handshake)
//! is out of scope — `PaymentTerminal` models only the four outcomes the
//! core needs to make a billing decision. [`HttpPaymentTerminal`] is a
//! thin, swappable client over whatever terminal integration a deployment
//! actually runs behind this interface; [`MockPaymentTerminal`] always
//! approves and is what the test suite wires up in its place.

use std::time::Duration;

use async_trait::async_trait;
use shared::Money;

#[derive(Debug, Clone)]
pub enum TerminalOutcome {
    Approved { transaction_id: String },
    Declined { reason: String },
    Timeout,
    Error { reason: String },
}

#[async_trait]
pub trait PaymentTerminal: Send + Sync {
    async fn charge(&self, amount: Money, terminal_id: &str) -> TerminalOutcome;
    async fn refund(&self, terminal_transaction_id: &str, amount: Money) -> Result<(), String>;
}

/// Always approves with a freshly generated transaction id; refunds always
/// succeed. Used by integration tests and by deployments with no terminal
/// configured.
pub struct MockPaymentTerminal;

#[async_trait]
impl PaymentTerminal for MockPaymentTerminal {
    async fn charge(&self, _amount: Money, _terminal_id: &str) -> TerminalOutcome {
        TerminalOutcome::Approved {
            transaction_id: uuid::Uuid::new_v4().to_string(),
        }
    }

    async fn refund(&self, _terminal_transaction_id: &str, _amount: Money) -> Result<(), String> {
        Ok(())
    }
}

#[derive(serde::Serialize)]
struct ChargeRequest<'a> {
    amount: Money,
    terminal_id: &'a str,
}

#[derive(serde::Deserialize)]
#[serde(tag = "status", rename_all = "UPPERCASE")]
enum ChargeResponse {
    Approved { transaction_id: String },
    Declined { reason: String },
}

#[derive(serde::Serialize)]
struct RefundRequest<'a> {
    transaction_id: &'a str,
    amount: Money,
}

pub struct HttpPaymentTerminal {
    client: reqwest::Client,
    base_url: String,
}

impl HttpPaymentTerminal {
    pub fn new(base_url: String, timeout_ms: u64) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(timeout_ms))
            .build()
            .unwrap_or_default();
        Self { client, base_url }
    }
}

#[async_trait]
impl PaymentTerminal for HttpPaymentTerminal {
    async fn charge(&self, amount: Money, terminal_id: &str) -> TerminalOutcome {
        let request = self
            .client
            .post(format!("{}/charge", self.base_url))
            .json(&ChargeRequest { amount, terminal_id });
        match request.send().await {
            Ok(resp) => match resp.json::<ChargeResponse>().await {
                Ok(ChargeResponse::Approved { transaction_id }) => {
                    TerminalOutcome::Approved { transaction_id }
                }
                Ok(ChargeResponse::Declined { reason }) => TerminalOutcome::Declined { reason },
                Err(e) => TerminalOutcome::Error {
                    reason: format!("malformed terminal response: {e}"),
                },
            },
            Err(e) if e.is_timeout() => TerminalOutcome::Timeout,
            Err(e) => TerminalOutcome::Error {
                reason: e.to_string(),
            },
        }
    }

    async fn refund(&self, terminal_transaction_id: &str, amount: Money) -> Result<(), String> {
        let request = self
            .client
            .post(format!("{}/refund", self.base_url))
            .json(&RefundRequest {
                transaction_id: terminal_transaction_id,
                amount,
            });
        match request.send().await {
            Ok(resp) if resp.status().is_success() => Ok(()),
            Ok(resp) => Err(format!("terminal refund failed with status {}", resp.status())),
            Err(e) => Err(e.to_string()),
        }
    }
}
