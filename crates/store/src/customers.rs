//! Customer persistence and the legacy import path.

use sqlx::Row;
use sqlx::sqlite::SqliteRow;
use tracing::{info, instrument, warn};

use ledgerly_core::{CustomerId, DomainError, DomainResult};
use ledgerly_parties::{Customer, CustomerUpdate, NewCustomer};

use crate::error::map_sqlx_error;
use crate::rows::address_from_row;
use crate::store::Store;

/// Outcome of a bulk customer import.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImportSummary {
    pub imported: usize,
    pub skipped: usize,
}

fn customer_from_row(row: &SqliteRow) -> Result<Customer, sqlx::Error> {
    Ok(Customer {
        id: CustomerId::new(row.try_get("id")?),
        name: row.try_get("name")?,
        contact_name: row.try_get("contact_name")?,
        phone: row.try_get("phone")?,
        email: row.try_get("email")?,
        email_name: row.try_get("email_name")?,
        billing_email: row.try_get("billing_email")?,
        billing_email_name: row.try_get("billing_email_name")?,
        shipping: address_from_row(row, "shipping")?,
        billing: address_from_row(row, "billing")?,
    })
}

impl Store {
    #[instrument(skip(self, new), err)]
    pub async fn create_customer(&self, new: NewCustomer) -> DomainResult<Customer> {
        new.validate()?;
        let result = sqlx::query(
            "INSERT INTO customers (
                name, contact_name, phone, email, email_name,
                billing_email, billing_email_name,
                shipping_line1, shipping_line2, shipping_city,
                shipping_state, shipping_zip, shipping_country,
                billing_line1, billing_line2, billing_city,
                billing_state, billing_zip, billing_country
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&new.name)
        .bind(&new.contact_name)
        .bind(&new.phone)
        .bind(&new.email)
        .bind(&new.email_name)
        .bind(&new.billing_email)
        .bind(&new.billing_email_name)
        .bind(&new.shipping.line1)
        .bind(&new.shipping.line2)
        .bind(&new.shipping.city)
        .bind(&new.shipping.state)
        .bind(&new.shipping.zip)
        .bind(&new.shipping.country)
        .bind(&new.billing.line1)
        .bind(&new.billing.line2)
        .bind(&new.billing.city)
        .bind(&new.billing.state)
        .bind(&new.billing.zip)
        .bind(&new.billing.country)
        .execute(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("create_customer", e))?;
        Ok(Customer::from_new(CustomerId::new(result.last_insert_rowid()), new))
    }

    pub async fn get_customer(&self, id: CustomerId) -> DomainResult<Customer> {
        let row = sqlx::query("SELECT * FROM customers WHERE id = ?")
            .bind(id.get())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("get_customer", e))?
            .ok_or(DomainError::NotFound)?;
        customer_from_row(&row).map_err(|e| map_sqlx_error("get_customer", e))
    }

    pub async fn list_customers(&self) -> DomainResult<Vec<Customer>> {
        let rows = sqlx::query("SELECT * FROM customers ORDER BY name")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("list_customers", e))?;
        rows.iter()
            .map(|row| customer_from_row(row).map_err(|e| map_sqlx_error("list_customers", e)))
            .collect()
    }

    #[instrument(skip(self, update), fields(id = %id), err)]
    pub async fn update_customer(
        &self,
        id: CustomerId,
        update: CustomerUpdate,
    ) -> DomainResult<Customer> {
        let mut customer = self.get_customer(id).await?;
        customer.apply_update(update)?;
        sqlx::query(
            "UPDATE customers SET
                name = ?, contact_name = ?, phone = ?, email = ?, email_name = ?,
                billing_email = ?, billing_email_name = ?,
                shipping_line1 = ?, shipping_line2 = ?, shipping_city = ?,
                shipping_state = ?, shipping_zip = ?, shipping_country = ?,
                billing_line1 = ?, billing_line2 = ?, billing_city = ?,
                billing_state = ?, billing_zip = ?, billing_country = ?
            WHERE id = ?",
        )
        .bind(&customer.name)
        .bind(&customer.contact_name)
        .bind(&customer.phone)
        .bind(&customer.email)
        .bind(&customer.email_name)
        .bind(&customer.billing_email)
        .bind(&customer.billing_email_name)
        .bind(&customer.shipping.line1)
        .bind(&customer.shipping.line2)
        .bind(&customer.shipping.city)
        .bind(&customer.shipping.state)
        .bind(&customer.shipping.zip)
        .bind(&customer.shipping.country)
        .bind(&customer.billing.line1)
        .bind(&customer.billing.line2)
        .bind(&customer.billing.city)
        .bind(&customer.billing.state)
        .bind(&customer.billing.zip)
        .bind(&customer.billing.country)
        .bind(id.get())
        .execute(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("update_customer", e))?;
        Ok(customer)
    }

    /// Delete a customer. Refused while any customer order references it.
    #[instrument(skip(self), fields(id = %id), err)]
    pub async fn delete_customer(&self, id: CustomerId) -> DomainResult<()> {
        let referencing: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM customer_orders WHERE customer_id = ?")
                .bind(id.get())
                .fetch_one(&self.pool)
                .await
                .map_err(|e| map_sqlx_error("delete_customer", e))?;
        if referencing > 0 {
            return Err(DomainError::referenced(format!(
                "customer {id} is referenced by {referencing} order(s)"
            )));
        }

        let result = sqlx::query("DELETE FROM customers WHERE id = ?")
            .bind(id.get())
            .execute(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("delete_customer", e))?;
        if result.rows_affected() == 0 {
            return Err(DomainError::NotFound);
        }
        Ok(())
    }

    /// Bulk import of legacy customer records.
    ///
    /// A record is skipped (never aborting the batch) when its name is
    /// blank, its name already exists, or its non-empty email already
    /// exists. Matching is exact.
    #[instrument(skip(self, records), err)]
    pub async fn import_customers(
        &self,
        records: Vec<NewCustomer>,
    ) -> DomainResult<ImportSummary> {
        let mut summary = ImportSummary::default();
        for record in records {
            if record.validate().is_err() {
                warn!("import: skipping record with blank name");
                summary.skipped += 1;
                continue;
            }

            let name_taken: i64 =
                sqlx::query_scalar("SELECT COUNT(*) FROM customers WHERE name = ?")
                    .bind(&record.name)
                    .fetch_one(&self.pool)
                    .await
                    .map_err(|e| map_sqlx_error("import_customers", e))?;
            if name_taken > 0 {
                warn!(name = %record.name, "import: duplicate name, skipping");
                summary.skipped += 1;
                continue;
            }

            if let Some(email) = record.email.as_deref().filter(|e| !e.trim().is_empty()) {
                let email_taken: i64 =
                    sqlx::query_scalar("SELECT COUNT(*) FROM customers WHERE email = ?")
                        .bind(email)
                        .fetch_one(&self.pool)
                        .await
                        .map_err(|e| map_sqlx_error("import_customers", e))?;
                if email_taken > 0 {
                    warn!(name = %record.name, "import: duplicate email, skipping");
                    summary.skipped += 1;
                    continue;
                }
            }

            self.create_customer(record).await?;
            summary.imported += 1;
        }
        info!(imported = summary.imported, skipped = summary.skipped, "import finished");
        Ok(summary)
    }
}
