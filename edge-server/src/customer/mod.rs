//! Customer — phone-indexed lookup for delivery orders, and order history.

use std::sync::Arc;

use crate::db::models::{Customer, CustomerCreate, CustomerUpdate, Order};
use crate::db::repository::{CustomerRepository, OrderRepository};
use crate::utils::validation::{MAX_NAME_LEN, validate_required_text};
use shared::error::AppError;

#[derive(Clone)]
pub struct CustomerService {
    customers: CustomerRepository,
    orders: OrderRepository,
}

impl CustomerService {
    pub fn new(customers: CustomerRepository, orders: OrderRepository) -> Arc<Self> {
        Arc::new(Self { customers, orders })
    }

    pub async fn create(&self, tenant: &str, data: CustomerCreate) -> Result<Customer, AppError> {
        validate_required_text(&data.name, "name", MAX_NAME_LEN)?;
        Ok(self.customers.create(tenant, data).await?)
    }

    pub async fn update(&self, tenant: &str, id: &str, data: CustomerUpdate) -> Result<Customer, AppError> {
        if let Some(name) = &data.name {
            validate_required_text(name, "name", MAX_NAME_LEN)?;
        }
        Ok(self.customers.update(tenant, id, data).await?)
    }

    pub async fn find_by_phone(&self, tenant: &str, phone: &str) -> Result<Option<Customer>, AppError> {
        Ok(self.customers.find_by_phone(tenant, phone).await?)
    }

    pub async fn search_by_phone_suffix(&self, tenant: &str, suffix: &str) -> Result<Vec<Customer>, AppError> {
        Ok(self.customers.search_by_phone_suffix(tenant, suffix).await?)
    }

    /// Newest-first order history for a customer.
    pub async fn order_history(&self, tenant: &str, customer_id: &str) -> Result<Vec<Order>, AppError> {
        Ok(self.orders.find_by_customer(tenant, customer_id).await?)
    }
}
