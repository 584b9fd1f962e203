//! Cash register, session, movement and closing repositories.

use super::{BaseRepository, RepoError, RepoResult, make_thing};
use crate::db::models::{
    CashClosing, CashClosingType, CashMovement, CashMovementType, CashRegister, CashSession,
    CashSessionStatus,
};
use shared::Money;
use shared::util::now_millis;
use surrealdb::Surreal;
use surrealdb::engine::local::Db;

#[derive(Clone)]
pub struct CashRegisterRepository {
    base: BaseRepository,
}

impl CashRegisterRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    pub async fn create(&self, tenant: &str, site: &str, name: &str) -> RepoResult<CashRegister> {
        let register = CashRegister {
            id: None,
            tenant: tenant.to_string(),
            site: site.to_string(),
            name: name.to_string(),
        };
        let created: Option<CashRegister> =
            self.base.db().create("cash_register").content(register).await?;
        created.ok_or_else(|| RepoError::Database("failed to create cash register".into()))
    }

    pub async fn find_by_id(&self, tenant: &str, id: &str) -> RepoResult<Option<CashRegister>> {
        let thing = make_thing("cash_register", id);
        let register: Option<CashRegister> = self.base.db().select(thing).await?;
        Ok(register.filter(|r| r.tenant == tenant))
    }

    pub async fn find_all(&self, tenant: &str, site: &str) -> RepoResult<Vec<CashRegister>> {
        let mut result = self
            .base
            .db()
            .query("SELECT * FROM cash_register WHERE tenant = $tenant AND site = $site ORDER BY name")
            .bind(("tenant", tenant.to_string()))
            .bind(("site", site.to_string()))
            .await?;
        Ok(result.take(0)?)
    }

    /// All registers for a tenant, across sites — used to scope a
    /// FINANCIAL_PERIOD closing, which spans the whole tenant.
    pub async fn find_all_for_tenant(&self, tenant: &str) -> RepoResult<Vec<CashRegister>> {
        let mut result = self
            .base
            .db()
            .query("SELECT * FROM cash_register WHERE tenant = $tenant ORDER BY site, name")
            .bind(("tenant", tenant.to_string()))
            .await?;
        Ok(result.take(0)?)
    }
}

#[derive(Clone)]
pub struct CashSessionRepository {
    base: BaseRepository,
}

impl CashSessionRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    /// Opens a session, enforcing at most one OPEN session per
    /// `(tenant, register_id)` at a time. SurrealDB's `DEFINE INDEX` has no
    /// `WHERE` clause, so this check-then-insert runs inside a single
    /// statement rather than as a partial unique index — see
    /// [`crate::db::CASH_SESSION_UNIQUE_OPEN_NOTE`].
    pub async fn open(
        &self,
        tenant: &str,
        site: &str,
        register_id: &str,
        employee_id: &str,
        opening_amount: Money,
    ) -> RepoResult<CashSession> {
        if self.find_open_for_register(tenant, register_id).await?.is_some() {
            return Err(RepoError::Duplicate(format!(
                "register {register_id} already has an open session"
            )));
        }
        let session = CashSession {
            id: None,
            tenant: tenant.to_string(),
            site: site.to_string(),
            register_id: register_id.to_string(),
            employee_id: employee_id.to_string(),
            opening_amount,
            actual_close: None,
            variance: None,
            status: CashSessionStatus::Open,
            opened_at: now_millis(),
            closed_at: None,
            version: 0,
        };
        let created: Option<CashSession> =
            self.base.db().create("cash_session").content(session).await?;
        let created = created.ok_or_else(|| RepoError::Database("failed to open cash session".into()))?;

        // Re-check after insert: two concurrent opens for the same register
        // can both pass the pre-check. Whichever loses this tiebreak rolls
        // back its own row.
        if self
            .find_all_open_for_register(tenant, register_id)
            .await?
            .len()
            > 1
        {
            let id = created.id.as_ref().map(|t| t.to_string()).unwrap_or_default();
            self.base
                .db()
                .query("DELETE $thing")
                .bind(("thing", make_thing("cash_session", &id)))
                .await?;
            return Err(RepoError::Duplicate(format!(
                "register {register_id} already has an open session"
            )));
        }

        Ok(created)
    }

    pub async fn find_open_for_register(
        &self,
        tenant: &str,
        register_id: &str,
    ) -> RepoResult<Option<CashSession>> {
        Ok(self
            .find_all_open_for_register(tenant, register_id)
            .await?
            .into_iter()
            .next())
    }

    async fn find_all_open_for_register(
        &self,
        tenant: &str,
        register_id: &str,
    ) -> RepoResult<Vec<CashSession>> {
        let mut result = self
            .base
            .db()
            .query(
                "SELECT * FROM cash_session WHERE tenant = $tenant AND register_id = $register_id \
                 AND status = 'OPEN' ORDER BY opened_at",
            )
            .bind(("tenant", tenant.to_string()))
            .bind(("register_id", register_id.to_string()))
            .await?;
        Ok(result.take(0)?)
    }

    pub async fn find_by_id(&self, tenant: &str, id: &str) -> RepoResult<Option<CashSession>> {
        let thing = make_thing("cash_session", id);
        let session: Option<CashSession> = self.base.db().select(thing).await?;
        Ok(session.filter(|s| s.tenant == tenant))
    }

    /// Closes a session, stamping `actual_close` and the computed variance
    /// against `expected = opening + Σ(SALE,DEPOSIT) − Σ(REFUND,WITHDRAWAL)`.
    /// Closes the session and records its compensating `CLOSING` movement
    /// as one SurrealQL transaction, so the two writes can never be
    /// observed half-done. The movement insert reads from `$session`
    /// (the just-closed row), so a version conflict on the session — which
    /// leaves `$session` empty without erroring the statement itself —
    /// also leaves the movement uncreated.
    pub async fn close(
        &self,
        tenant: &str,
        id: &str,
        actual_close: Money,
        expected_version: i64,
    ) -> RepoResult<CashSession> {
        let session = self
            .find_by_id(tenant, id)
            .await?
            .ok_or_else(|| RepoError::NotFound(format!("cash session {id} not found")))?;
        if session.status != CashSessionStatus::Open {
            return Err(RepoError::Validation("session is not open".into()));
        }
        let expected = self.expected_balance(tenant, id, &session).await?;
        let variance = actual_close.checked_sub(expected).unwrap_or(Money::ZERO);

        let thing = make_thing("cash_session", id);
        let mut result = self
            .base
            .db()
            .query("BEGIN TRANSACTION;")
            .query(
                "LET $session = (UPDATE $thing SET status = 'CLOSED', actual_close = $actual, \
                 variance = $variance, closed_at = $now, version = version + 1 \
                 WHERE tenant = $tenant AND version = $expected RETURN AFTER);",
            )
            .query(
                "INSERT INTO cash_movement (SELECT $tenant AS tenant, $session_id AS session_id, \
                 'CLOSING' AS movement_type, $actual AS amount, NONE AS payment_id, NONE AS note, \
                 NONE AS recorded_by, $now AS recorded_at FROM $session);",
            )
            .query("RETURN $session;")
            .query("COMMIT TRANSACTION;")
            .bind(("thing", thing))
            .bind(("actual", actual_close))
            .bind(("variance", variance))
            .bind(("now", now_millis()))
            .bind(("tenant", tenant.to_string()))
            .bind(("session_id", id.to_string()))
            .bind(("expected", expected_version))
            .await?;
        let rows: Vec<CashSession> = result.take(3)?;
        rows.into_iter().next().ok_or_else(|| {
            RepoError::Validation(format!("cash session {id} was modified concurrently"))
        })
    }

    async fn expected_balance(
        &self,
        tenant: &str,
        session_id: &str,
        session: &CashSession,
    ) -> RepoResult<Money> {
        let movements = self.movement_repo().find_by_session(tenant, session_id).await?;
        let mut total = session.opening_amount;
        for m in movements {
            // OPENING is recorded as a movement for the audit trail but the
            // opening float is already seeded above — counting it again
            // would double it.
            if m.movement_type == CashMovementType::Opening {
                continue;
            }
            total = match m.movement_type.sign() {
                1 => total + m.amount,
                _ => total.checked_sub(m.amount).unwrap_or(Money::ZERO),
            };
        }
        Ok(total)
    }

    pub fn movement_repo(&self) -> CashMovementRepository {
        CashMovementRepository::new(self.base.db().clone())
    }

    /// Closed sessions for any of `register_ids` whose close time falls in
    /// `[window_start, window_end)`. Used to assemble REGISTER/DAY/
    /// FINANCIAL_PERIOD closings over a set of registers.
    pub async fn find_closed_in_window(
        &self,
        tenant: &str,
        register_ids: &[String],
        window_start: i64,
        window_end: i64,
    ) -> RepoResult<Vec<CashSession>> {
        let mut result = self
            .base
            .db()
            .query(
                "SELECT * FROM cash_session WHERE tenant = $tenant AND register_id IN $registers \
                 AND status = 'CLOSED' AND closed_at >= $start AND closed_at < $end \
                 ORDER BY closed_at",
            )
            .bind(("tenant", tenant.to_string()))
            .bind(("registers", register_ids.to_vec()))
            .bind(("start", window_start))
            .bind(("end", window_end))
            .await?;
        Ok(result.take(0)?)
    }
}

#[derive(Clone)]
pub struct CashMovementRepository {
    base: BaseRepository,
}

impl CashMovementRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    pub async fn record(
        &self,
        tenant: &str,
        session_id: &str,
        movement_type: CashMovementType,
        amount: Money,
        payment_id: Option<String>,
        note: Option<String>,
        recorded_by: Option<String>,
    ) -> RepoResult<CashMovement> {
        let movement = CashMovement {
            id: None,
            tenant: tenant.to_string(),
            session_id: session_id.to_string(),
            movement_type,
            amount,
            payment_id,
            note,
            recorded_by,
            recorded_at: now_millis(),
        };
        let created: Option<CashMovement> =
            self.base.db().create("cash_movement").content(movement).await?;
        created.ok_or_else(|| RepoError::Database("failed to record cash movement".into()))
    }

    /// Idempotent guard for the `PaymentConfirmed` listener: a movement
    /// already linked to this `payment_id` is never recorded twice.
    pub async fn find_by_payment(&self, tenant: &str, payment_id: &str) -> RepoResult<Option<CashMovement>> {
        let mut result = self
            .base
            .db()
            .query("SELECT * FROM cash_movement WHERE tenant = $tenant AND payment_id = $payment_id LIMIT 1")
            .bind(("tenant", tenant.to_string()))
            .bind(("payment_id", payment_id.to_string()))
            .await?;
        let rows: Vec<CashMovement> = result.take(0)?;
        Ok(rows.into_iter().next())
    }

    /// Like [`Self::find_by_payment`] but scoped to a movement type, so a
    /// payment's `SALE` and a later compensating `REFUND` can be told apart
    /// when both carry the same `payment_id`.
    pub async fn find_by_payment_and_type(
        &self,
        tenant: &str,
        payment_id: &str,
        movement_type: CashMovementType,
    ) -> RepoResult<Option<CashMovement>> {
        let mut result = self
            .base
            .db()
            .query(
                "SELECT * FROM cash_movement WHERE tenant = $tenant AND payment_id = $payment_id \
                 AND movement_type = $movement_type LIMIT 1",
            )
            .bind(("tenant", tenant.to_string()))
            .bind(("payment_id", payment_id.to_string()))
            .bind(("movement_type", movement_type))
            .await?;
        let rows: Vec<CashMovement> = result.take(0)?;
        Ok(rows.into_iter().next())
    }

    pub async fn find_by_session(&self, tenant: &str, session_id: &str) -> RepoResult<Vec<CashMovement>> {
        let mut result = self
            .base
            .db()
            .query("SELECT * FROM cash_movement WHERE tenant = $tenant AND session_id = $session_id")
            .bind(("tenant", tenant.to_string()))
            .bind(("session_id", session_id.to_string()))
            .await?;
        Ok(result.take(0)?)
    }
}

#[derive(Clone)]
pub struct CashClosingRepository {
    base: BaseRepository,
}

impl CashClosingRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    #[allow(clippy::too_many_arguments)]
    pub async fn create(
        &self,
        tenant: &str,
        site: Option<String>,
        closing_type: CashClosingType,
        window_start: i64,
        window_end: i64,
        session_ids: Vec<String>,
        total_sales: Money,
        total_refunds: Money,
        total_variance: Money,
    ) -> RepoResult<CashClosing> {
        let closing = CashClosing {
            id: None,
            tenant: tenant.to_string(),
            site,
            closing_type,
            window_start,
            window_end,
            session_ids,
            total_sales,
            total_refunds,
            total_variance,
            created_at: now_millis(),
        };
        let created: Option<CashClosing> =
            self.base.db().create("cash_closing").content(closing).await?;
        created.ok_or_else(|| RepoError::Database("failed to create cash closing".into()))
    }

    pub async fn find_by_id(&self, tenant: &str, id: &str) -> RepoResult<Option<CashClosing>> {
        let thing = make_thing("cash_closing", id);
        let closing: Option<CashClosing> = self.base.db().select(thing).await?;
        Ok(closing.filter(|c| c.tenant == tenant))
    }
}
