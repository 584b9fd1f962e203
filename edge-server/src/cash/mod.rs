//! Cash register: session open/close, manual movements, the event-driven
//! `SALE` movement on completed cash payments, and closings.

use std::sync::Arc;

use shared::Money;
use shared::error::{AppError, ErrorCode};

use crate::auth::permissions::{Permission, role_has_permission};
use crate::db::models::{
    CashClosing, CashClosingType, CashMovement, CashMovementType, CashRegister, CashSession,
    PaymentMethod, Role,
};
use crate::db::repository::{
    CashClosingRepository, CashMovementRepository, CashRegisterRepository, CashSessionRepository,
};

fn id_of(id: &Option<surrealdb::RecordId>) -> String {
    id.as_ref().map(|t| t.to_string()).unwrap_or_default()
}

#[derive(Clone)]
pub struct CashService {
    registers: CashRegisterRepository,
    sessions: CashSessionRepository,
    movements: CashMovementRepository,
    closings: CashClosingRepository,
}

impl CashService {
    pub fn new(
        registers: CashRegisterRepository,
        sessions: CashSessionRepository,
        movements: CashMovementRepository,
        closings: CashClosingRepository,
    ) -> Arc<Self> {
        Arc::new(Self {
            registers,
            sessions,
            movements,
            closings,
        })
    }

    pub async fn create_register(&self, tenant: &str, site: &str, name: &str) -> Result<CashRegister, AppError> {
        Ok(self.registers.create(tenant, site, name).await?)
    }

    pub async fn list_registers(&self, tenant: &str, site: &str) -> Result<Vec<CashRegister>, AppError> {
        Ok(self.registers.find_all(tenant, site).await?)
    }

    pub async fn open_session(
        &self,
        tenant: &str,
        site: &str,
        register_id: &str,
        employee_id: &str,
        opening_amount: Money,
    ) -> Result<CashSession, AppError> {
        if self.registers.find_by_id(tenant, register_id).await?.is_none() {
            return Err(AppError::with_message(
                ErrorCode::CashRegisterNotFound,
                "register not found",
            ));
        }
        let session = self
            .sessions
            .open(tenant, site, register_id, employee_id, opening_amount)
            .await
            .map_err(|e| match e {
                crate::db::repository::RepoError::Duplicate(msg) => {
                    AppError::with_message(ErrorCode::CashSessionAlreadyOpen, msg)
                }
                other => other.into(),
            })?;
        self.movements
            .record(
                tenant,
                &id_of(&session.id),
                CashMovementType::Opening,
                opening_amount,
                None,
                None,
                Some(employee_id.to_string()),
            )
            .await?;
        Ok(session)
    }

    pub async fn close_session(
        &self,
        tenant: &str,
        role: Role,
        session_id: &str,
        actual_close: Money,
    ) -> Result<CashSession, AppError> {
        if !role_has_permission(role, Permission::CloseCash) {
            return Err(AppError::permission_denied(
                "closing a cash session requires CLOSE_CASH",
            ));
        }
        let session = self
            .sessions
            .find_by_id(tenant, session_id)
            .await?
            .ok_or_else(|| AppError::not_found("cash session"))?;
        // `close` records the compensating CLOSING movement itself, in the
        // same transaction as the session write — see
        // `CashSessionRepository::close`.
        let closed = self
            .sessions
            .close(tenant, session_id, actual_close, session.version)
            .await
            .map_err(|e| match e {
                crate::db::repository::RepoError::Validation(msg)
                    if msg.contains("not open") =>
                {
                    AppError::with_message(ErrorCode::CashSessionAlreadyClosed, msg)
                }
                other => other.into(),
            })?;
        Ok(closed)
    }

    /// Only `DEPOSIT` and `WITHDRAWAL` may be recorded manually — every
    /// other movement type is a side effect of some other operation
    /// (`SALE`/`REFUND` from a payment, `OPENING`/`CLOSING` from the
    /// session itself).
    pub async fn record_manual_movement(
        &self,
        tenant: &str,
        session_id: &str,
        movement_type: CashMovementType,
        amount: Money,
        note: Option<String>,
        recorded_by: String,
    ) -> Result<CashMovement, AppError> {
        if !movement_type.is_manually_recordable() {
            return Err(AppError::validation(
                "only DEPOSIT and WITHDRAWAL may be recorded manually",
            ));
        }
        let session = self
            .sessions
            .find_by_id(tenant, session_id)
            .await?
            .ok_or_else(|| AppError::not_found("cash session"))?;
        if session.status != crate::db::models::CashSessionStatus::Open {
            return Err(AppError::with_message(
                ErrorCode::CashMovementRequiresOpenSession,
                "session is not open",
            ));
        }
        Ok(self
            .movements
            .record(tenant, session_id, movement_type, amount, None, note, Some(recorded_by))
            .await?)
    }

    /// Reacts to a completed `CASH` payment by recording a `SALE` movement
    /// against the one OPEN session at the payment's site. Idempotent on
    /// `payment_id` — a re-delivered event never double-records. If no
    /// session is open at the site, the movement is skipped and a warning
    /// logged; recording a pending reconciliation entry instead was left
    /// unspecified (see DESIGN.md) and is not implemented here.
    pub async fn on_payment_completed(
        &self,
        tenant: &str,
        site: &str,
        payment_id: &str,
        amount: Money,
        method: PaymentMethod,
    ) -> Result<(), AppError> {
        if method != PaymentMethod::Cash {
            return Ok(());
        }
        if self.movements.find_by_payment(tenant, payment_id).await?.is_some() {
            return Ok(());
        }
        let registers = self.registers.find_all(tenant, site).await?;
        let mut open_session = None;
        for register in &registers {
            if let Some(session) = self
                .sessions
                .find_open_for_register(tenant, &id_of(&register.id))
                .await?
            {
                open_session = Some(session);
                break;
            }
        }
        let Some(session) = open_session else {
            tracing::warn!(
                tenant,
                site,
                payment_id,
                "cash payment completed with no open session at site; SALE movement skipped"
            );
            return Ok(());
        };
        self.movements
            .record(
                tenant,
                &id_of(&session.id),
                CashMovementType::Sale,
                amount,
                Some(payment_id.to_string()),
                None,
                None,
            )
            .await?;
        Ok(())
    }

    /// Reacts to a voided `CASH` payment by recording a compensating
    /// `REFUND` movement against the one OPEN session at the payment's
    /// site. Idempotent on `(payment_id, REFUND)` — a retried void never
    /// double-records. If no session is open at the site, the movement is
    /// skipped and a warning logged, same as [`Self::on_payment_completed`].
    pub async fn on_payment_voided(
        &self,
        tenant: &str,
        site: &str,
        payment_id: &str,
        amount: Money,
        method: PaymentMethod,
    ) -> Result<(), AppError> {
        if method != PaymentMethod::Cash {
            return Ok(());
        }
        if self
            .movements
            .find_by_payment_and_type(tenant, payment_id, CashMovementType::Refund)
            .await?
            .is_some()
        {
            return Ok(());
        }
        let registers = self.registers.find_all(tenant, site).await?;
        let mut open_session = None;
        for register in &registers {
            if let Some(session) = self
                .sessions
                .find_open_for_register(tenant, &id_of(&register.id))
                .await?
            {
                open_session = Some(session);
                break;
            }
        }
        let Some(session) = open_session else {
            tracing::warn!(
                tenant,
                site,
                payment_id,
                "cash payment voided with no open session at site; REFUND movement skipped"
            );
            return Ok(());
        };
        self.movements
            .record(
                tenant,
                &id_of(&session.id),
                CashMovementType::Refund,
                amount,
                Some(payment_id.to_string()),
                None,
                None,
            )
            .await?;
        Ok(())
    }

    /// Aggregates closed sessions in `[window_start, window_end)` across the
    /// register set implied by `closing_type`:
    /// - `SESSION`: the one session named in `session_ids`.
    /// - `REGISTER`: every closed session for one register.
    /// - `DAY`: every register at one site — restricted to a single site
    ///   because `CashClosing` has no natural multi-site aggregation unit.
    /// - `FINANCIAL_PERIOD`: every register in the tenant.
    pub async fn create_closing(
        &self,
        tenant: &str,
        role: Role,
        closing_type: CashClosingType,
        site: Option<String>,
        register_id: Option<String>,
        window_start: i64,
        window_end: i64,
    ) -> Result<CashClosing, AppError> {
        if !role_has_permission(role, Permission::CloseCash) {
            return Err(AppError::permission_denied(
                "creating a cash closing requires CLOSE_CASH",
            ));
        }
        let register_ids: Vec<String> = match closing_type {
            CashClosingType::Session | CashClosingType::Register => {
                let register_id = register_id
                    .ok_or_else(|| AppError::validation("a register id is required for this closing type"))?;
                vec![register_id]
            }
            CashClosingType::Day => {
                let site = site
                    .clone()
                    .ok_or_else(|| AppError::validation("a DAY closing requires a single site"))?;
                self.registers
                    .find_all(tenant, &site)
                    .await?
                    .into_iter()
                    .map(|r| id_of(&r.id))
                    .collect()
            }
            CashClosingType::FinancialPeriod => self
                .registers
                .find_all_for_tenant(tenant)
                .await?
                .into_iter()
                .map(|r| id_of(&r.id))
                .collect(),
        };

        let sessions = self
            .sessions
            .find_closed_in_window(tenant, &register_ids, window_start, window_end)
            .await?;

        let mut total_sales = Money::ZERO;
        let mut total_refunds = Money::ZERO;
        let mut total_variance = Money::ZERO;
        let mut session_ids = Vec::with_capacity(sessions.len());
        for session in &sessions {
            let sid = id_of(&session.id);
            let movements = self.movements.find_by_session(tenant, &sid).await?;
            for m in movements {
                match m.movement_type {
                    CashMovementType::Sale => total_sales = total_sales + m.amount,
                    CashMovementType::Refund => total_refunds = total_refunds + m.amount,
                    _ => {}
                }
            }
            if let Some(variance) = session.variance {
                total_variance = total_variance + variance;
            }
            session_ids.push(sid);
        }

        let closing_site = match closing_type {
            CashClosingType::Day => site,
            _ => sessions.first().map(|s| s.site.clone()),
        };

        Ok(self
            .closings
            .create(
                tenant,
                closing_site,
                closing_type,
                window_start,
                window_end,
                session_ids,
                total_sales,
                total_refunds,
                total_variance,
            )
            .await?)
    }
}
