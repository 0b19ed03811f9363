//! Product lot persistence. Lot receipt is the only stock inflow.

use chrono::Utc;
use sqlx::Row;
use sqlx::sqlite::SqliteRow;
use tracing::instrument;

use ledgerly_core::{DomainError, DomainResult, LotId, ProductId};
use ledgerly_inventory::{NewLot, ProductLot, fifo_sequence, on_hand};

use crate::error::map_sqlx_error;
use crate::store::Store;

fn lot_from_row(row: &SqliteRow) -> Result<ProductLot, sqlx::Error> {
    Ok(ProductLot {
        id: LotId::new(row.try_get("id")?),
        product_id: ProductId::new(row.try_get("product_id")?),
        lot_number: row.try_get("lot_number")?,
        quantity: row.try_get("quantity")?,
        cost_price: row.try_get("cost_price")?,
        date_received: row.try_get("date_received")?,
        production_date: row.try_get("production_date")?,
        expiration_date: row.try_get("expiration_date")?,
        created_at: row.try_get("created_at")?,
    })
}

impl Store {
    /// Receive a lot against a product.
    #[instrument(skip(self, new), fields(product_id = %product_id), err)]
    pub async fn add_lot(&self, product_id: ProductId, new: NewLot) -> DomainResult<ProductLot> {
        new.validate()?;
        // Friendlier than the bare foreign-key failure.
        self.get_product(product_id).await?;

        let created_at = Utc::now();
        let result = sqlx::query(
            "INSERT INTO product_lots (
                product_id, lot_number, quantity, cost_price,
                date_received, production_date, expiration_date, created_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(product_id.get())
        .bind(&new.lot_number)
        .bind(new.quantity)
        .bind(new.cost_price)
        .bind(new.date_received)
        .bind(new.production_date)
        .bind(new.expiration_date)
        .bind(created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("add_lot", e))?;

        Ok(ProductLot {
            id: LotId::new(result.last_insert_rowid()),
            product_id,
            lot_number: new.lot_number,
            quantity: new.quantity,
            cost_price: new.cost_price,
            date_received: new.date_received,
            production_date: new.production_date,
            expiration_date: new.expiration_date,
            created_at,
        })
    }

    pub async fn lots_for_product(&self, product_id: ProductId) -> DomainResult<Vec<ProductLot>> {
        let rows = sqlx::query("SELECT * FROM product_lots WHERE product_id = ? ORDER BY id")
            .bind(product_id.get())
            .fetch_all(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("lots_for_product", e))?;
        rows.iter()
            .map(|row| lot_from_row(row).map_err(|e| map_sqlx_error("lots_for_product", e)))
            .collect()
    }

    /// Total on-hand quantity for a product (active lots only).
    pub async fn on_hand(&self, product_id: ProductId) -> DomainResult<i64> {
        let lots = self.lots_for_product(product_id).await?;
        Ok(on_hand(&lots))
    }

    /// Active lots in first-in-first-out consumption order.
    pub async fn fifo_lots(&self, product_id: ProductId) -> DomainResult<Vec<ProductLot>> {
        let lots = self.lots_for_product(product_id).await?;
        Ok(fifo_sequence(&lots).into_iter().cloned().collect())
    }

    /// Correct or consume a lot's remaining quantity. Never below zero.
    #[instrument(skip(self), fields(lot_id = %lot_id), err)]
    pub async fn set_lot_quantity(&self, lot_id: LotId, quantity: i64) -> DomainResult<ProductLot> {
        let row = sqlx::query("SELECT * FROM product_lots WHERE id = ?")
            .bind(lot_id.get())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("set_lot_quantity", e))?
            .ok_or(DomainError::NotFound)?;
        let mut lot = lot_from_row(&row).map_err(|e| map_sqlx_error("set_lot_quantity", e))?;
        lot.set_quantity(quantity)?;

        sqlx::query("UPDATE product_lots SET quantity = ? WHERE id = ?")
            .bind(lot.quantity)
            .bind(lot_id.get())
            .execute(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("set_lot_quantity", e))?;
        Ok(lot)
    }
}
