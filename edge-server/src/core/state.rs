//! Server state — every repository and domain service behind one `Clone`
//! handle, wired into axum as `State<ServerState>`.

use std::sync::Arc;

use shared::error::AppError;

use crate::audit::{AuditService, AuditWorker};
use crate::auth::{AuthService, JwtConfig, JwtService};
use crate::cash::CashService;
use crate::core::Config;
use crate::customer::CustomerService;
use crate::db::DbService;
use crate::db::repository::{
    BlacklistRepository, CashClosingRepository, CashMovementRepository, CashRegisterRepository,
    CashSessionRepository, CatalogRepository, CustomerRepository, DiningTableRepository,
    FiscalDocumentRepository, OrderRepository, PaymentRepository, PrintJobRepository,
    PrinterRepository, RefreshTokenRepository, SiteRepository, SplitShareRepository,
    TenantRepository, UserRepository,
};
use crate::dining_room::DiningRoomService;
use crate::events::{DomainEvent, EventBus};
use crate::orders::OrderService;
use crate::payments::{MockPaymentTerminal, PaymentService, PaymentTerminal};
use crate::printing::{
    BillReceiptRenderer, KitchenPrintService, KitchenTicketRenderer, NetworkPrinterTransport, PrinterTransport,
};
use crate::reporting::SaftReportService;
use crate::api::rate_limit::RateLimiter;

/// Capacity of the domain event broadcast channel. A listener more than
/// this many events behind the publisher sees a `Lagged` gap and resumes
/// from the next event, tolerated by design — see [`crate::events`].
const EVENT_BUS_CAPACITY: usize = 1024;

#[derive(Clone)]
pub struct ServerState {
    pub config: Arc<Config>,
    pub db: DbService,
    pub events: EventBus,

    pub jwt: Arc<JwtService>,
    pub auth: AuthService,
    pub audit: Arc<AuditService>,

    pub tenants: TenantRepository,
    pub sites: SiteRepository,
    pub users: UserRepository,
    pub catalog: CatalogRepository,
    pub customers: CustomerRepository,

    pub dining_room: Arc<DiningRoomService>,
    pub orders: Arc<OrderService>,
    pub payments: Arc<PaymentService>,
    pub cash: Arc<CashService>,
    pub customer_service: Arc<CustomerService>,
    pub printing: Arc<KitchenPrintService>,
    pub rate_limiter: Arc<RateLimiter>,
    pub saft: Arc<SaftReportService>,
}

impl ServerState {
    /// Opens the database, runs schema setup, wires every repository and
    /// domain service, and spawns the background workers (audit writer,
    /// domain event listeners). Returns a handle cheap enough to clone into
    /// every axum handler.
    pub async fn initialize(config: &Config) -> Result<Self, AppError> {
        let db = DbService::new(&config.database_path).await?;

        let tenants = TenantRepository::new(db.db.clone());
        let sites = SiteRepository::new(db.db.clone());
        let users = UserRepository::new(db.db.clone());
        let refresh_tokens = RefreshTokenRepository::new(db.db.clone());
        let catalog = CatalogRepository::new(db.db.clone());
        let customers = CustomerRepository::new(db.db.clone());
        let dining_tables = DiningTableRepository::new(db.db.clone());
        let blacklist = BlacklistRepository::new(db.db.clone());
        let orders = OrderRepository::new(db.db.clone());
        let payments = PaymentRepository::new(db.db.clone());
        let fiscal_documents = FiscalDocumentRepository::new(db.db.clone());
        let split_shares = SplitShareRepository::new(db.db.clone());
        let cash_registers = CashRegisterRepository::new(db.db.clone());
        let cash_sessions = CashSessionRepository::new(db.db.clone());
        let cash_movements = CashMovementRepository::new(db.db.clone());
        let cash_closings = CashClosingRepository::new(db.db.clone());
        let printers = PrinterRepository::new(db.db.clone());
        let print_jobs = PrintJobRepository::new(db.db.clone());

        let jwt = Arc::new(JwtService::with_config(JwtConfig {
            secret: config.jwt.secret.clone(),
            ..config.jwt.clone()
        }));
        let auth = AuthService::new(users.clone(), refresh_tokens, jwt.clone());

        let (audit, audit_rx) = AuditService::new(db.db.clone(), std::path::Path::new(&config.work_dir), 256);
        let audit_worker = AuditWorker::new(audit.storage().clone());
        tokio::spawn(audit_worker.run(audit_rx));

        let events = EventBus::new(EVENT_BUS_CAPACITY);

        let dining_room = DiningRoomService::new(dining_tables.clone(), blacklist.clone(), orders.clone());
        let order_service = OrderService::new(
            orders.clone(),
            catalog.clone(),
            dining_tables.clone(),
            blacklist.clone(),
            events.clone(),
        );
        let cash_service = CashService::new(cash_registers, cash_sessions, cash_movements, cash_closings);
        let terminal: Arc<dyn PaymentTerminal> = Arc::new(MockPaymentTerminal);
        let bill_renderer = Arc::new(BillReceiptRenderer::default());
        let payment_service = PaymentService::new(
            payments.clone(),
            fiscal_documents.clone(),
            split_shares,
            orders.clone(),
            blacklist,
            dining_tables.clone(),
            terminal,
            events.clone(),
            bill_renderer,
            cash_service.clone(),
        );
        let customer_service = CustomerService::new(customers.clone(), orders.clone());
        let renderer = KitchenTicketRenderer::default();
        let transport: Arc<dyn PrinterTransport> = Arc::new(NetworkPrinterTransport::new(config.print_transmit_timeout_ms));
        let printing = KitchenPrintService::new(printers, print_jobs, orders.lines_repo(), renderer, transport);

        spawn_event_listeners(events.clone(), printing.clone(), cash_service.clone());

        let rate_limiter = RateLimiter::new(config.rate_limit_per_minute);
        let saft = SaftReportService::new(fiscal_documents, audit.clone());

        Ok(Self {
            config: Arc::new(config.clone()),
            db,
            events,
            jwt,
            auth,
            audit,
            tenants,
            sites,
            users,
            catalog,
            customers,
            dining_room,
            orders: order_service,
            payments: payment_service,
            cash: cash_service,
            customer_service,
            printing,
            rate_limiter,
            saft,
        })
    }

    pub fn get_jwt_service(&self) -> Arc<JwtService> {
        self.jwt.clone()
    }
}

/// Subscribes one task per downstream context to the domain event bus.
/// Each listener re-derives what it needs from the database rather than
/// trusting the event payload as a cache, so a `Lagged` gap just means the
/// next delivered event is handled against current state.
fn spawn_event_listeners(events: EventBus, printing: Arc<KitchenPrintService>, cash: Arc<CashService>) {
    let mut print_rx = events.subscribe();
    tokio::spawn(async move {
        loop {
            match print_rx.recv().await {
                Ok(DomainEvent::OrderConfirmed {
                    tenant,
                    site,
                    order_id,
                    table_number,
                    line_ids,
                    confirmation_ordinal,
                    confirmed_at,
                }) => {
                    if let Err(e) = printing
                        .dispatch_for_order(
                            &tenant,
                            &site,
                            &order_id,
                            table_number,
                            &line_ids,
                            confirmation_ordinal,
                            confirmed_at,
                        )
                        .await
                    {
                        tracing::error!(error = %e, order_id, "kitchen print dispatch failed");
                    }
                }
                Ok(_) => {}
                Err(tokio::sync::broadcast::error::RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "print listener lagged behind the event bus");
                }
                Err(tokio::sync::broadcast::error::RecvError::Closed) => break,
            }
        }
    });

    let mut cash_rx = events.subscribe();
    tokio::spawn(async move {
        loop {
            match cash_rx.recv().await {
                Ok(DomainEvent::PaymentCompleted {
                    tenant,
                    site,
                    payment_id,
                    amount,
                    method,
                    ..
                }) => {
                    if let Err(e) = cash.on_payment_completed(&tenant, &site, &payment_id, amount, method).await {
                        tracing::error!(error = %e, payment_id, "cash movement recording failed");
                    }
                }
                Ok(_) => {}
                Err(tokio::sync::broadcast::error::RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "cash listener lagged behind the event bus");
                }
                Err(tokio::sync::broadcast::error::RecvError::Closed) => break,
            }
        }
    });
}
