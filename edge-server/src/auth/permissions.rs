//! Coarse-grained RBAC: a fixed matrix of six roles against six
//! sensitive-action permissions. Unlike a fine-grained permission-string
//! system, there is no per-tenant permission customization — the matrix is
//! the same for every tenant, and `SUPER_ADMIN`/`ADMIN` always pass.

use crate::db::models::Role;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Permission {
    /// Void a confirmed (post-subtotal) order line.
    VoidAfterSubtotal,
    /// Apply a percentage or fixed-amount discount to an order or line.
    ApplyDiscount,
    /// Reprint an already-issued fiscal document or kitchen ticket.
    ReprintDocument,
    /// Redirect a kitchen printer's routing to another printer.
    RedirectPrinter,
    /// Close a cash session.
    CloseCash,
    /// Void a completed payment or fiscal document.
    VoidInvoice,
    /// Generate a SAF-T export over issued fiscal documents.
    ExportFiscalReport,
}

/// `true` if `role` may perform `permission`. `SUPER_ADMIN` and `ADMIN`
/// hold every permission; every other role is looked up in the matrix below.
pub fn role_has_permission(role: Role, permission: Permission) -> bool {
    if matches!(role, Role::SuperAdmin | Role::Admin) {
        return true;
    }
    matches!(
        (role, permission),
        (Role::Manager, _)
            | (Role::Cashier, Permission::ApplyDiscount)
            | (Role::Cashier, Permission::ReprintDocument)
            | (Role::Cashier, Permission::CloseCash)
            | (Role::Waiter, Permission::ReprintDocument)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn manager_holds_every_permission() {
        for p in [
            Permission::VoidAfterSubtotal,
            Permission::ApplyDiscount,
            Permission::ReprintDocument,
            Permission::RedirectPrinter,
            Permission::CloseCash,
            Permission::VoidInvoice,
            Permission::ExportFiscalReport,
        ] {
            assert!(role_has_permission(Role::Manager, p));
        }
    }

    #[test]
    fn waiter_cannot_void_after_subtotal() {
        assert!(!role_has_permission(Role::Waiter, Permission::VoidAfterSubtotal));
    }

    #[test]
    fn kitchen_staff_holds_no_sensitive_permission() {
        for p in [
            Permission::VoidAfterSubtotal,
            Permission::ApplyDiscount,
            Permission::ReprintDocument,
            Permission::RedirectPrinter,
            Permission::CloseCash,
            Permission::VoidInvoice,
        ] {
            assert!(!role_has_permission(Role::KitchenStaff, p));
        }
    }

    #[test]
    fn cashier_can_close_cash_but_not_redirect_printer() {
        assert!(role_has_permission(Role::Cashier, Permission::CloseCash));
        assert!(!role_has_permission(Role::Cashier, Permission::RedirectPrinter));
    }
}
