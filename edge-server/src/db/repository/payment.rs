//! Payment, fiscal document and split-share repositories.

use super::{BaseRepository, RepoError, RepoResult, make_thing};
use crate::db::models::{
    FiscalDocument, FiscalDocumentType, Payment, PaymentMethod, PaymentStatus, SplitShare,
};
use shared::Money;
use shared::util::now_millis;
use surrealdb::Surreal;
use surrealdb::engine::local::Db;

#[derive(Clone)]
pub struct PaymentRepository {
    base: BaseRepository,
}

impl PaymentRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    /// Idempotent create: a retried request carrying a key already seen for
    /// this tenant returns the existing row untouched instead of erroring.
    /// Returns `(payment, was_newly_created)`.
    pub async fn create_or_get(
        &self,
        tenant: &str,
        order_id: &str,
        idempotency_key: &str,
        amount: Money,
        method: PaymentMethod,
        terminal_transaction_id: Option<String>,
        split_group_id: Option<String>,
    ) -> RepoResult<(Payment, bool)> {
        if let Some(existing) = self.find_by_idempotency_key(tenant, idempotency_key).await? {
            return Ok((existing, false));
        }
        let payment = Payment {
            id: None,
            tenant: tenant.to_string(),
            order_id: order_id.to_string(),
            idempotency_key: idempotency_key.to_string(),
            amount,
            method,
            status: PaymentStatus::Pending,
            terminal_transaction_id,
            split_group_id,
            void_reason: None,
            version: 0,
            created_at: now_millis(),
        };
        match self
            .base
            .db()
            .create::<Option<Payment>>("payment")
            .content(payment)
            .await
        {
            Ok(Some(created)) => Ok((created, true)),
            Ok(None) => Err(RepoError::Database("failed to create payment".into())),
            Err(e) => {
                // Lost the race against a concurrent retry with the same key.
                if let Some(existing) = self.find_by_idempotency_key(tenant, idempotency_key).await? {
                    Ok((existing, false))
                } else {
                    Err(e.into())
                }
            }
        }
    }

    pub async fn find_by_idempotency_key(
        &self,
        tenant: &str,
        key: &str,
    ) -> RepoResult<Option<Payment>> {
        let mut result = self
            .base
            .db()
            .query("SELECT * FROM payment WHERE tenant = $tenant AND idempotency_key = $key LIMIT 1")
            .bind(("tenant", tenant.to_string()))
            .bind(("key", key.to_string()))
            .await?;
        let rows: Vec<Payment> = result.take(0)?;
        Ok(rows.into_iter().next())
    }

    pub async fn find_by_id(&self, tenant: &str, id: &str) -> RepoResult<Option<Payment>> {
        let thing = make_thing("payment", id);
        let payment: Option<Payment> = self.base.db().select(thing).await?;
        Ok(payment.filter(|p| p.tenant == tenant))
    }

    pub async fn find_by_order(&self, tenant: &str, order_id: &str) -> RepoResult<Vec<Payment>> {
        let mut result = self
            .base
            .db()
            .query("SELECT * FROM payment WHERE tenant = $tenant AND order_id = $order_id")
            .bind(("tenant", tenant.to_string()))
            .bind(("order_id", order_id.to_string()))
            .await?;
        Ok(result.take(0)?)
    }

    pub async fn set_terminal_transaction_id(
        &self,
        tenant: &str,
        id: &str,
        transaction_id: &str,
    ) -> RepoResult<()> {
        let thing = make_thing("payment", id);
        self.base
            .db()
            .query("UPDATE $thing SET terminal_transaction_id = $txid WHERE tenant = $tenant")
            .bind(("thing", thing))
            .bind(("txid", transaction_id.to_string()))
            .bind(("tenant", tenant.to_string()))
            .await?;
        Ok(())
    }

    pub async fn complete(
        &self,
        tenant: &str,
        id: &str,
        expected_version: i64,
    ) -> RepoResult<Payment> {
        let thing = make_thing("payment", id);
        let mut result = self
            .base
            .db()
            .query(
                "UPDATE $thing SET status = 'COMPLETED', version = version + 1 \
                 WHERE tenant = $tenant AND version = $expected RETURN AFTER",
            )
            .bind(("thing", thing))
            .bind(("tenant", tenant.to_string()))
            .bind(("expected", expected_version))
            .await?;
        let rows: Vec<Payment> = result.take(0)?;
        rows.into_iter()
            .next()
            .ok_or_else(|| RepoError::Validation(format!("payment {id} was modified concurrently")))
    }

    pub async fn void(
        &self,
        tenant: &str,
        id: &str,
        reason: &str,
        expected_version: i64,
    ) -> RepoResult<Payment> {
        let thing = make_thing("payment", id);
        let mut result = self
            .base
            .db()
            .query(
                "UPDATE $thing SET status = 'VOIDED', void_reason = $reason, version = version + 1 \
                 WHERE tenant = $tenant AND version = $expected RETURN AFTER",
            )
            .bind(("thing", thing))
            .bind(("reason", reason.to_string()))
            .bind(("tenant", tenant.to_string()))
            .bind(("expected", expected_version))
            .await?;
        let rows: Vec<Payment> = result.take(0)?;
        rows.into_iter()
            .next()
            .ok_or_else(|| RepoError::Validation(format!("payment {id} was modified concurrently")))
    }
}

#[derive(Clone)]
pub struct FiscalDocumentRepository {
    base: BaseRepository,
}

impl FiscalDocumentRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    /// Allocate the next gap-free document number for
    /// `(tenant, site, document_type)` and insert the document in one
    /// statement, so the read of the current max and the insert of the next
    /// number are atomic — concurrent callers never observe or hand out the
    /// same number twice.
    pub async fn generate(
        &self,
        tenant: &str,
        site: &str,
        order_id: &str,
        document_type: FiscalDocumentType,
        customer_tax_id: Option<String>,
        total_amount: Money,
    ) -> RepoResult<FiscalDocument> {
        let query = "
            CREATE fiscal_document CONTENT {
                tenant: $tenant,
                site: $site,
                order_id: $order_id,
                document_type: $doc_type,
                document_number: (((SELECT VALUE document_number FROM fiscal_document
                    WHERE tenant = $tenant AND site = $site AND document_type = $doc_type
                    ORDER BY document_number DESC LIMIT 1)[0]) ?? 0) + 1,
                customer_tax_id: $tax_id,
                total_amount: $total,
                voided: false,
                void_reason: NONE,
                issued_at: $now,
            };
        ";
        let mut result = self
            .base
            .db()
            .query(query)
            .bind(("tenant", tenant.to_string()))
            .bind(("site", site.to_string()))
            .bind(("order_id", order_id.to_string()))
            .bind(("doc_type", document_type))
            .bind(("tax_id", customer_tax_id))
            .bind(("total", total_amount))
            .bind(("now", now_millis()))
            .await?;
        let rows: Vec<FiscalDocument> = result.take(0)?;
        rows.into_iter()
            .next()
            .ok_or_else(|| RepoError::Database("failed to generate fiscal document".into()))
    }

    pub async fn find_by_id(&self, tenant: &str, id: &str) -> RepoResult<Option<FiscalDocument>> {
        let thing = make_thing("fiscal_document", id);
        let doc: Option<FiscalDocument> = self.base.db().select(thing).await?;
        Ok(doc.filter(|d| d.tenant == tenant))
    }

    pub async fn find_by_order(&self, tenant: &str, order_id: &str) -> RepoResult<Vec<FiscalDocument>> {
        let mut result = self
            .base
            .db()
            .query("SELECT * FROM fiscal_document WHERE tenant = $tenant AND order_id = $order_id")
            .bind(("tenant", tenant.to_string()))
            .bind(("order_id", order_id.to_string()))
            .await?;
        Ok(result.take(0)?)
    }

    /// Every document issued at `site` within `[from, to]` (inclusive),
    /// ordered by document number — the iteration order a SAF-T export
    /// reads in.
    pub async fn find_in_range(
        &self,
        tenant: &str,
        site: &str,
        from: i64,
        to: i64,
    ) -> RepoResult<Vec<FiscalDocument>> {
        let mut result = self
            .base
            .db()
            .query(
                "SELECT * FROM fiscal_document \
                 WHERE tenant = $tenant AND site = $site AND issued_at >= $from AND issued_at <= $to \
                 ORDER BY document_type, document_number",
            )
            .bind(("tenant", tenant.to_string()))
            .bind(("site", site.to_string()))
            .bind(("from", from))
            .bind(("to", to))
            .await?;
        Ok(result.take(0)?)
    }

    pub async fn void(&self, tenant: &str, id: &str, reason: &str) -> RepoResult<FiscalDocument> {
        let thing = make_thing("fiscal_document", id);
        let mut result = self
            .base
            .db()
            .query("UPDATE $thing SET voided = true, void_reason = $reason WHERE tenant = $tenant RETURN AFTER")
            .bind(("thing", thing))
            .bind(("reason", reason.to_string()))
            .bind(("tenant", tenant.to_string()))
            .await?;
        let rows: Vec<FiscalDocument> = result.take(0)?;
        rows.into_iter()
            .next()
            .ok_or_else(|| RepoError::NotFound(format!("fiscal document {id} not found")))
    }
}

#[derive(Clone)]
pub struct SplitShareRepository {
    base: BaseRepository,
}

impl SplitShareRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    pub async fn create_group(
        &self,
        tenant: &str,
        order_id: &str,
        split_group_id: &str,
        shares: Vec<Money>,
    ) -> RepoResult<Vec<SplitShare>> {
        let mut created = Vec::with_capacity(shares.len());
        for (i, amount) in shares.into_iter().enumerate() {
            let share = SplitShare {
                id: None,
                tenant: tenant.to_string(),
                order_id: order_id.to_string(),
                split_group_id: split_group_id.to_string(),
                share_index: i as i32,
                amount,
                settled: false,
            };
            let row: Option<SplitShare> = self.base.db().create("split_share").content(share).await?;
            created.push(row.ok_or_else(|| RepoError::Database("failed to create split share".into()))?);
        }
        Ok(created)
    }

    pub async fn find_by_id(&self, tenant: &str, id: &str) -> RepoResult<Option<SplitShare>> {
        let thing = make_thing("split_share", id);
        let share: Option<SplitShare> = self.base.db().select(thing).await?;
        Ok(share.filter(|s| s.tenant == tenant))
    }

    pub async fn find_by_group(&self, tenant: &str, split_group_id: &str) -> RepoResult<Vec<SplitShare>> {
        let mut result = self
            .base
            .db()
            .query("SELECT * FROM split_share WHERE tenant = $tenant AND split_group_id = $group")
            .bind(("tenant", tenant.to_string()))
            .bind(("group", split_group_id.to_string()))
            .await?;
        Ok(result.take(0)?)
    }

    pub async fn mark_settled(&self, tenant: &str, id: &str) -> RepoResult<()> {
        let thing = make_thing("split_share", id);
        self.base
            .db()
            .query("UPDATE $thing SET settled = true WHERE tenant = $tenant")
            .bind(("thing", thing))
            .bind(("tenant", tenant.to_string()))
            .await?;
        Ok(())
    }

    pub async fn all_settled(&self, tenant: &str, split_group_id: &str) -> RepoResult<bool> {
        let shares = self.find_by_group(tenant, split_group_id).await?;
        Ok(!shares.is_empty() && shares.iter().all(|s| s.settled))
    }
}
