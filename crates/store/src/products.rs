//! Product persistence.

use sqlx::Row;
use sqlx::sqlite::SqliteRow;
use tracing::instrument;

use ledgerly_core::{DomainError, DomainResult, Price, ProductId, SupplierId};
use ledgerly_products::{NewProduct, Product, ProductUpdate};

use crate::error::map_sqlx_error;
use crate::store::Store;

fn product_from_row(row: &SqliteRow) -> Result<Product, sqlx::Error> {
    let unit_price: String = row.try_get("unit_price")?;
    let cost_price: String = row.try_get("cost_price")?;
    Ok(Product {
        id: ProductId::new(row.try_get("id")?),
        sku: row.try_get("sku")?,
        sku_number: row.try_get("sku_number")?,
        name: row.try_get("name")?,
        description: row.try_get("description")?,
        category: row.try_get("category")?,
        unit_price: Price::parse(&unit_price),
        cost_price: Price::parse(&cost_price),
        reorder_level: row.try_get("reorder_level")?,
        is_active: row.try_get("is_active")?,
        supplier_id: row
            .try_get::<Option<i64>, _>("supplier_id")?
            .map(SupplierId::new),
    })
}

impl Store {
    async fn sku_taken(&self, sku: &str, exclude: Option<ProductId>) -> DomainResult<bool> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM products WHERE sku = ? AND id != ?",
        )
        .bind(sku)
        .bind(exclude.map(ProductId::get).unwrap_or(0))
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("sku_taken", e))?;
        Ok(count > 0)
    }

    #[instrument(skip(self, new), fields(sku = %new.sku), err)]
    pub async fn create_product(&self, new: NewProduct) -> DomainResult<Product> {
        new.validate()?;
        if self.sku_taken(&new.sku, None).await? {
            return Err(DomainError::duplicate_key(format!(
                "sku {} already exists",
                new.sku
            )));
        }
        let result = sqlx::query(
            "INSERT INTO products (
                sku, sku_number, name, description, category,
                unit_price, cost_price, reorder_level, is_active, supplier_id
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&new.sku)
        .bind(&new.sku_number)
        .bind(&new.name)
        .bind(&new.description)
        .bind(&new.category)
        .bind(new.unit_price.to_string())
        .bind(new.cost_price.to_string())
        .bind(new.reorder_level)
        .bind(new.is_active)
        .bind(new.supplier_id.map(SupplierId::get))
        .execute(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("create_product", e))?;
        Ok(Product::from_new(ProductId::new(result.last_insert_rowid()), new))
    }

    pub async fn get_product(&self, id: ProductId) -> DomainResult<Product> {
        let row = sqlx::query("SELECT * FROM products WHERE id = ?")
            .bind(id.get())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("get_product", e))?
            .ok_or(DomainError::NotFound)?;
        product_from_row(&row).map_err(|e| map_sqlx_error("get_product", e))
    }

    pub async fn list_products(&self) -> DomainResult<Vec<Product>> {
        let rows = sqlx::query("SELECT * FROM products ORDER BY sku")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("list_products", e))?;
        rows.iter()
            .map(|row| product_from_row(row).map_err(|e| map_sqlx_error("list_products", e)))
            .collect()
    }

    #[instrument(skip(self, update), fields(id = %id), err)]
    pub async fn update_product(
        &self,
        id: ProductId,
        update: ProductUpdate,
    ) -> DomainResult<Product> {
        let mut product = self.get_product(id).await?;
        if let Some(sku) = update.sku.as_deref() {
            if sku != product.sku && self.sku_taken(sku, Some(id)).await? {
                return Err(DomainError::duplicate_key(format!("sku {sku} already exists")));
            }
        }
        product.apply_update(update)?;
        sqlx::query(
            "UPDATE products SET
                sku = ?, sku_number = ?, name = ?, description = ?, category = ?,
                unit_price = ?, cost_price = ?, reorder_level = ?, is_active = ?,
                supplier_id = ?
            WHERE id = ?",
        )
        .bind(&product.sku)
        .bind(&product.sku_number)
        .bind(&product.name)
        .bind(&product.description)
        .bind(&product.category)
        .bind(product.unit_price.to_string())
        .bind(product.cost_price.to_string())
        .bind(product.reorder_level)
        .bind(product.is_active)
        .bind(product.supplier_id.map(SupplierId::get))
        .bind(id.get())
        .execute(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("update_product", e))?;
        Ok(product)
    }

    /// Delete a product. Its lots are removed by cascade; a product still
    /// referenced by order lines is refused by the database.
    #[instrument(skip(self), fields(id = %id), err)]
    pub async fn delete_product(&self, id: ProductId) -> DomainResult<()> {
        let result = sqlx::query("DELETE FROM products WHERE id = ?")
            .bind(id.get())
            .execute(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("delete_product", e))?;
        if result.rows_affected() == 0 {
            return Err(DomainError::NotFound);
        }
        Ok(())
    }
}
