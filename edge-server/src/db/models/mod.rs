//! Database models — one module per aggregate/entity.

pub mod serde_helpers;

pub mod tenant;
pub mod user;

pub mod catalog;
pub mod customer;
pub mod dining_table;

pub mod order;
pub mod payment;

pub mod cash;
pub mod printer;

pub use tenant::{Site, SiteCreate, Tenant, TenantCreate, TenantStatus};
pub use user::{RefreshToken, Role, User, UserCreate, UserResponse, UserStatus, UserUpdate};

pub use catalog::{Family, Item, ItemSnapshot, Subfamily};
pub use customer::{Customer, CustomerCreate, CustomerUpdate};
pub use dining_table::{BlacklistEntityType, BlacklistEntry, DiningTable, DiningTableCreate, TableStatus};

pub use order::{
    Consumption, Discount, DiscountTarget, DiscountType, Order, OrderLine, OrderLineStatus,
    OrderStatus, OrderType,
};
pub use payment::{
    FiscalDocument, FiscalDocumentType, Payment, PaymentMethod, PaymentStatus, SplitShare,
};

pub use cash::{
    CashClosing, CashClosingType, CashMovement, CashMovementType, CashRegister, CashSession,
    CashSessionStatus,
};
pub use printer::{PrintJob, PrintJobStatus, Printer, PrinterStatus};
