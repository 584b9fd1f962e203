//! Kitchen print dispatch: one ticket per confirmed order line, routed to a
//! printer by zone, with REDIRECT/WAIT/IGNORE routing and dedupe-keyed
//! re-dispatch safety.

pub mod renderer;
pub mod service;
pub mod transport;
pub mod types;

pub use renderer::{BillReceiptRenderer, KitchenTicketRenderer};
pub use service::KitchenPrintService;
pub use transport::{MockPrinterTransport, NetworkPrinterTransport, PrinterTransport, TransmitOutcome};
pub use types::{BillContext, BillLine, TicketContext, TicketLine};
