//! Customer repository — phone lookup backing delivery order creation.

use super::{BaseRepository, RepoError, RepoResult, make_thing};
use crate::db::models::{Customer, CustomerCreate, CustomerUpdate};
use surrealdb::Surreal;
use surrealdb::engine::local::Db;

/// Strip whitespace and anything but digits and a leading `+` from a phone
/// number before it's ever persisted or searched on.
pub fn sanitize_phone(raw: &str) -> String {
    raw.chars()
        .filter(|c| c.is_ascii_digit() || *c == '+')
        .collect()
}

#[derive(Clone)]
pub struct CustomerRepository {
    base: BaseRepository,
}

impl CustomerRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    pub async fn create(&self, tenant: &str, data: CustomerCreate) -> RepoResult<Customer> {
        let phone = sanitize_phone(&data.phone);
        if phone.is_empty() {
            return Err(RepoError::Validation("phone must not be empty".into()));
        }
        if self.find_by_phone(tenant, &phone).await?.is_some() {
            return Err(RepoError::Duplicate(format!(
                "customer with phone '{phone}' already exists"
            )));
        }
        let customer = Customer {
            id: None,
            tenant: tenant.to_string(),
            name: data.name,
            phone,
            tax_id: data.tax_id,
        };
        let created: Option<Customer> = self.base.db().create("customer").content(customer).await?;
        created.ok_or_else(|| RepoError::Database("failed to create customer".into()))
    }

    pub async fn update(&self, tenant: &str, id: &str, data: CustomerUpdate) -> RepoResult<Customer> {
        let existing = self
            .find_by_id(tenant, id)
            .await?
            .ok_or_else(|| RepoError::NotFound(format!("customer {id} not found")))?;

        let name = data.name.unwrap_or(existing.name);
        let phone = data.phone.map(|p| sanitize_phone(&p)).unwrap_or(existing.phone);
        let tax_id = data.tax_id.or(existing.tax_id);

        let thing = make_thing("customer", id);
        self.base
            .db()
            .query("UPDATE $thing SET name = $name, phone = $phone, tax_id = $tax_id")
            .bind(("thing", thing))
            .bind(("name", name))
            .bind(("phone", phone))
            .bind(("tax_id", tax_id))
            .await?;

        self.find_by_id(tenant, id)
            .await?
            .ok_or_else(|| RepoError::NotFound(format!("customer {id} not found")))
    }

    pub async fn find_by_id(&self, tenant: &str, id: &str) -> RepoResult<Option<Customer>> {
        let thing = make_thing("customer", id);
        let customer: Option<Customer> = self.base.db().select(thing).await?;
        Ok(customer.filter(|c| c.tenant == tenant))
    }

    pub async fn find_by_phone(&self, tenant: &str, phone: &str) -> RepoResult<Option<Customer>> {
        let sanitized = sanitize_phone(phone);
        let mut result = self
            .base
            .db()
            .query("SELECT * FROM customer WHERE tenant = $tenant AND phone = $phone LIMIT 1")
            .bind(("tenant", tenant.to_string()))
            .bind(("phone", sanitized))
            .await?;
        let rows: Vec<Customer> = result.take(0)?;
        Ok(rows.into_iter().next())
    }

    /// Suffix search (last N digits), for counter staff who only caught the
    /// end of a customer's number.
    pub async fn search_by_phone_suffix(&self, tenant: &str, suffix: &str) -> RepoResult<Vec<Customer>> {
        let sanitized = sanitize_phone(suffix);
        if sanitized.is_empty() {
            return Ok(Vec::new());
        }
        let mut result = self
            .base
            .db()
            .query("SELECT * FROM customer WHERE tenant = $tenant AND string::ends_with(phone, $suffix) LIMIT 20")
            .bind(("tenant", tenant.to_string()))
            .bind(("suffix", sanitized))
            .await?;
        Ok(result.take(0)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sanitize_strips_formatting() {
        assert_eq!(sanitize_phone("(351) 912-345-678"), "351912345678");
    }

    #[test]
    fn sanitize_keeps_leading_plus() {
        assert_eq!(sanitize_phone("+351 912 345 678"), "+351912345678");
    }
}
