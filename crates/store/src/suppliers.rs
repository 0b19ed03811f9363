//! Supplier persistence.

use sqlx::Row;
use sqlx::sqlite::SqliteRow;
use tracing::instrument;

use ledgerly_core::{DomainError, DomainResult, SupplierId};
use ledgerly_parties::{NewSupplier, Supplier, SupplierUpdate};

use crate::error::map_sqlx_error;
use crate::rows::address_from_row;
use crate::store::Store;

fn supplier_from_row(row: &SqliteRow) -> Result<Supplier, sqlx::Error> {
    Ok(Supplier {
        id: SupplierId::new(row.try_get("id")?),
        name: row.try_get("name")?,
        contact_name: row.try_get("contact_name")?,
        email: row.try_get("email")?,
        phone: row.try_get("phone")?,
        tax_id: row.try_get("tax_id")?,
        physical: address_from_row(row, "physical")?,
        billing: address_from_row(row, "billing")?,
        notes: row.try_get("notes")?,
    })
}

impl Store {
    #[instrument(skip(self, new), err)]
    pub async fn create_supplier(&self, new: NewSupplier) -> DomainResult<Supplier> {
        new.validate()?;
        let result = sqlx::query(
            "INSERT INTO suppliers (
                name, contact_name, email, phone, tax_id,
                physical_line1, physical_line2, physical_city,
                physical_state, physical_zip, physical_country,
                billing_line1, billing_line2, billing_city,
                billing_state, billing_zip, billing_country,
                notes
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&new.name)
        .bind(&new.contact_name)
        .bind(&new.email)
        .bind(&new.phone)
        .bind(&new.tax_id)
        .bind(&new.physical.line1)
        .bind(&new.physical.line2)
        .bind(&new.physical.city)
        .bind(&new.physical.state)
        .bind(&new.physical.zip)
        .bind(&new.physical.country)
        .bind(&new.billing.line1)
        .bind(&new.billing.line2)
        .bind(&new.billing.city)
        .bind(&new.billing.state)
        .bind(&new.billing.zip)
        .bind(&new.billing.country)
        .bind(&new.notes)
        .execute(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("create_supplier", e))?;
        Ok(Supplier::from_new(SupplierId::new(result.last_insert_rowid()), new))
    }

    pub async fn get_supplier(&self, id: SupplierId) -> DomainResult<Supplier> {
        let row = sqlx::query("SELECT * FROM suppliers WHERE id = ?")
            .bind(id.get())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("get_supplier", e))?
            .ok_or(DomainError::NotFound)?;
        supplier_from_row(&row).map_err(|e| map_sqlx_error("get_supplier", e))
    }

    pub async fn list_suppliers(&self) -> DomainResult<Vec<Supplier>> {
        let rows = sqlx::query("SELECT * FROM suppliers ORDER BY name")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("list_suppliers", e))?;
        rows.iter()
            .map(|row| supplier_from_row(row).map_err(|e| map_sqlx_error("list_suppliers", e)))
            .collect()
    }

    #[instrument(skip(self, update), fields(id = %id), err)]
    pub async fn update_supplier(
        &self,
        id: SupplierId,
        update: SupplierUpdate,
    ) -> DomainResult<Supplier> {
        let mut supplier = self.get_supplier(id).await?;
        supplier.apply_update(update)?;
        sqlx::query(
            "UPDATE suppliers SET
                name = ?, contact_name = ?, email = ?, phone = ?, tax_id = ?,
                physical_line1 = ?, physical_line2 = ?, physical_city = ?,
                physical_state = ?, physical_zip = ?, physical_country = ?,
                billing_line1 = ?, billing_line2 = ?, billing_city = ?,
                billing_state = ?, billing_zip = ?, billing_country = ?,
                notes = ?
            WHERE id = ?",
        )
        .bind(&supplier.name)
        .bind(&supplier.contact_name)
        .bind(&supplier.email)
        .bind(&supplier.phone)
        .bind(&supplier.tax_id)
        .bind(&supplier.physical.line1)
        .bind(&supplier.physical.line2)
        .bind(&supplier.physical.city)
        .bind(&supplier.physical.state)
        .bind(&supplier.physical.zip)
        .bind(&supplier.physical.country)
        .bind(&supplier.billing.line1)
        .bind(&supplier.billing.line2)
        .bind(&supplier.billing.city)
        .bind(&supplier.billing.state)
        .bind(&supplier.billing.zip)
        .bind(&supplier.billing.country)
        .bind(&supplier.notes)
        .bind(id.get())
        .execute(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("update_supplier", e))?;
        Ok(supplier)
    }

    /// Delete a supplier. Refused while any product or purchase order still
    /// references it.
    #[instrument(skip(self), fields(id = %id), err)]
    pub async fn delete_supplier(&self, id: SupplierId) -> DomainResult<()> {
        let referencing: i64 = sqlx::query_scalar(
            "SELECT (SELECT COUNT(*) FROM products WHERE supplier_id = ?)
                  + (SELECT COUNT(*) FROM purchase_orders WHERE supplier_id = ?)",
        )
        .bind(id.get())
        .bind(id.get())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("delete_supplier", e))?;
        if referencing > 0 {
            return Err(DomainError::referenced(format!(
                "supplier {id} is referenced by {referencing} record(s)"
            )));
        }

        let result = sqlx::query("DELETE FROM suppliers WHERE id = ?")
            .bind(id.get())
            .execute(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("delete_supplier", e))?;
        if result.rows_affected() == 0 {
            return Err(DomainError::NotFound);
        }
        Ok(())
    }
}
