//! Printer transport collaborator.
//!
//! Hardware-level printer protocol is out of scope for this core — but a
//! `NORMAL`-routed job still has to resolve to `PRINTED` or `FAILED`, the
//! same way `PaymentService` resolves a charge through `PaymentTerminal`.
//! `PrinterTransport` is that seam: a thin, swappable handle over
//! `crab_printer::NetworkPrinter` in production, and an always-succeeds
//! mock the test suite wires up in its place.

use std::time::Duration;

use async_trait::async_trait;
use crab_printer::{NetworkPrinter, Printer as CrabPrinter};

#[derive(Debug, Clone)]
pub enum TransmitOutcome {
    Sent,
    Failed { reason: String },
}

#[async_trait]
pub trait PrinterTransport: Send + Sync {
    async fn transmit(&self, address: Option<&str>, content: &[u8]) -> TransmitOutcome;
}

/// Sends over TCP port 9100 to the printer's configured `host:port` address.
/// A printer with no address configured always fails — dispatch still owes
/// the job a terminal status, and there is nowhere to send the bytes.
pub struct NetworkPrinterTransport {
    timeout: Duration,
}

impl NetworkPrinterTransport {
    pub fn new(timeout_ms: u64) -> Self {
        Self {
            timeout: Duration::from_millis(timeout_ms),
        }
    }
}

#[async_trait]
impl PrinterTransport for NetworkPrinterTransport {
    async fn transmit(&self, address: Option<&str>, content: &[u8]) -> TransmitOutcome {
        let Some(address) = address else {
            return TransmitOutcome::Failed {
                reason: "printer has no network address configured".to_string(),
            };
        };
        let printer = match NetworkPrinter::from_addr(address) {
            Ok(p) => p.with_timeout(self.timeout),
            Err(e) => return TransmitOutcome::Failed { reason: e.to_string() },
        };
        match printer.print(content).await {
            Ok(()) => TransmitOutcome::Sent,
            Err(e) => TransmitOutcome::Failed { reason: e.to_string() },
        }
    }
}

/// Always succeeds without touching the network — what the integration test
/// suite wires up so dispatch doesn't need a live TCP listener.
pub struct MockPrinterTransport;

#[async_trait]
impl PrinterTransport for MockPrinterTransport {
    async fn transmit(&self, _address: Option<&str>, _content: &[u8]) -> TransmitOutcome {
        TransmitOutcome::Sent
    }
}
