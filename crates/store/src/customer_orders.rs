//! Customer order persistence.

use sqlx::Row;
use sqlx::sqlite::SqliteRow;
use tracing::instrument;

use ledgerly_core::{CustomerId, CustomerOrderId, DomainError, DomainResult, ProductId};
use ledgerly_sales::{
    CustomerOrder, CustomerOrderDraft, CustomerOrderLine, CustomerOrderStatus, CustomerOrderUpdate,
};

use crate::error::map_sqlx_error;
use crate::store::Store;

fn header_from_row(row: &SqliteRow) -> Result<CustomerOrder, sqlx::Error> {
    let status: String = row.try_get("status")?;
    Ok(CustomerOrder {
        id: CustomerOrderId::new(row.try_get("id")?),
        customer_id: CustomerId::new(row.try_get("customer_id")?),
        invoice_number: row.try_get("invoice_number")?,
        po_number: row.try_get("po_number")?,
        date: row.try_get("date")?,
        status: status
            .parse::<CustomerOrderStatus>()
            .map_err(|e| sqlx::Error::Decode(Box::new(e)))?,
        credit: row.try_get("credit")?,
        discount: row.try_get("discount")?,
        amount_paid: row.try_get("amount_paid")?,
        shipping: row.try_get("shipping")?,
        tracking_terms: row.try_get("tracking_terms")?,
        bill_to_address: row.try_get("bill_to_address")?,
        ship_to_address: row.try_get("ship_to_address")?,
        notes: row.try_get("notes")?,
        lines: Vec::new(),
    })
}

fn line_from_row(row: &SqliteRow) -> Result<CustomerOrderLine, sqlx::Error> {
    Ok(CustomerOrderLine {
        line_no: row.try_get::<i64, _>("line_no")? as u32,
        product_id: ProductId::new(row.try_get("product_id")?),
        description: row.try_get("description")?,
        qty: row.try_get("qty")?,
        unit: row.try_get("unit")?,
        selling_price: row.try_get("selling_price")?,
        amount: row.try_get("amount")?,
    })
}

impl Store {
    pub(crate) async fn invoice_number_taken(
        &self,
        invoice_number: &str,
        exclude: Option<CustomerOrderId>,
    ) -> DomainResult<bool> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM customer_orders WHERE invoice_number = ? AND id != ?",
        )
        .bind(invoice_number)
        .bind(exclude.map(CustomerOrderId::get).unwrap_or(0))
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("invoice_number_taken", e))?;
        Ok(count > 0)
    }

    async fn load_customer_order_lines(
        &self,
        id: CustomerOrderId,
    ) -> DomainResult<Vec<CustomerOrderLine>> {
        let rows = sqlx::query(
            "SELECT * FROM customer_order_lines
             WHERE customer_order_id = ? ORDER BY line_no",
        )
        .bind(id.get())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("load_customer_order_lines", e))?;
        rows.iter()
            .map(|row| {
                line_from_row(row).map_err(|e| map_sqlx_error("load_customer_order_lines", e))
            })
            .collect()
    }

    /// Create a customer order: header plus lines in one transaction.
    #[instrument(skip(self, draft), err)]
    pub async fn create_customer_order(
        &self,
        draft: CustomerOrderDraft,
    ) -> DomainResult<CustomerOrder> {
        draft.validate()?;
        if let Some(invoice_number) = draft.invoice_number.as_deref() {
            if self.invoice_number_taken(invoice_number, None).await? {
                return Err(DomainError::duplicate_key(format!(
                    "invoice_number {invoice_number} already exists"
                )));
            }
        }

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| map_sqlx_error("create_customer_order", e))?;

        let result = sqlx::query(
            "INSERT INTO customer_orders (
                customer_id, invoice_number, po_number, date, status,
                credit, discount, amount_paid, shipping, tracking_terms,
                bill_to_address, ship_to_address, notes
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(draft.customer_id.get())
        .bind(&draft.invoice_number)
        .bind(&draft.po_number)
        .bind(draft.date)
        .bind(CustomerOrderStatus::Pending.as_str())
        .bind(draft.credit)
        .bind(draft.discount)
        .bind(draft.amount_paid)
        .bind(draft.shipping)
        .bind(&draft.tracking_terms)
        .bind(&draft.bill_to_address)
        .bind(&draft.ship_to_address)
        .bind(&draft.notes)
        .execute(&mut *tx)
        .await
        .map_err(|e| map_sqlx_error("create_customer_order", e))?;

        let order =
            CustomerOrder::from_draft(CustomerOrderId::new(result.last_insert_rowid()), draft)?;
        for line in &order.lines {
            sqlx::query(
                "INSERT INTO customer_order_lines (
                    customer_order_id, line_no, product_id, description,
                    qty, unit, selling_price, amount
                ) VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
            )
            .bind(order.id.get())
            .bind(line.line_no as i64)
            .bind(line.product_id.get())
            .bind(&line.description)
            .bind(line.qty)
            .bind(&line.unit)
            .bind(line.selling_price)
            .bind(line.amount)
            .execute(&mut *tx)
            .await
            .map_err(|e| map_sqlx_error("create_customer_order", e))?;
        }

        tx.commit()
            .await
            .map_err(|e| map_sqlx_error("create_customer_order", e))?;
        Ok(order)
    }

    pub async fn get_customer_order(&self, id: CustomerOrderId) -> DomainResult<CustomerOrder> {
        let row = sqlx::query("SELECT * FROM customer_orders WHERE id = ?")
            .bind(id.get())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("get_customer_order", e))?
            .ok_or(DomainError::NotFound)?;
        let mut order =
            header_from_row(&row).map_err(|e| map_sqlx_error("get_customer_order", e))?;
        order.lines = self.load_customer_order_lines(id).await?;
        Ok(order)
    }

    pub async fn list_customer_orders(&self) -> DomainResult<Vec<CustomerOrder>> {
        let rows = sqlx::query("SELECT * FROM customer_orders ORDER BY id")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("list_customer_orders", e))?;
        let mut orders = Vec::with_capacity(rows.len());
        for row in &rows {
            let mut order =
                header_from_row(row).map_err(|e| map_sqlx_error("list_customer_orders", e))?;
            order.lines = self.load_customer_order_lines(order.id).await?;
            orders.push(order);
        }
        Ok(orders)
    }

    /// Edit header fields. Status is not editable here; use
    /// [`Store::set_customer_order_status`].
    #[instrument(skip(self, update), fields(id = %id), err)]
    pub async fn update_customer_order(
        &self,
        id: CustomerOrderId,
        update: CustomerOrderUpdate,
    ) -> DomainResult<CustomerOrder> {
        let mut order = self.get_customer_order(id).await?;
        if let Some(invoice_number) = update.invoice_number.as_deref() {
            if Some(invoice_number) != order.invoice_number.as_deref()
                && self.invoice_number_taken(invoice_number, Some(id)).await?
            {
                return Err(DomainError::duplicate_key(format!(
                    "invoice_number {invoice_number} already exists"
                )));
            }
        }
        order.apply_update(update)?;
        sqlx::query(
            "UPDATE customer_orders SET
                invoice_number = ?, po_number = ?, date = ?, credit = ?,
                discount = ?, amount_paid = ?, shipping = ?, tracking_terms = ?,
                bill_to_address = ?, ship_to_address = ?, notes = ?
            WHERE id = ?",
        )
        .bind(&order.invoice_number)
        .bind(&order.po_number)
        .bind(order.date)
        .bind(order.credit)
        .bind(order.discount)
        .bind(order.amount_paid)
        .bind(order.shipping)
        .bind(&order.tracking_terms)
        .bind(&order.bill_to_address)
        .bind(&order.ship_to_address)
        .bind(&order.notes)
        .bind(id.get())
        .execute(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("update_customer_order", e))?;
        Ok(order)
    }

    /// Move a customer order through its lifecycle. Illegal transitions are
    /// rejected and leave the stored status unchanged.
    #[instrument(skip(self), fields(id = %id, next = %next), err)]
    pub async fn set_customer_order_status(
        &self,
        id: CustomerOrderId,
        next: CustomerOrderStatus,
    ) -> DomainResult<CustomerOrder> {
        let mut order = self.get_customer_order(id).await?;
        order.transition_to(next)?;
        sqlx::query("UPDATE customer_orders SET status = ? WHERE id = ?")
            .bind(order.status.as_str())
            .bind(id.get())
            .execute(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("set_customer_order_status", e))?;
        Ok(order)
    }

    /// Record a payment against a customer order.
    #[instrument(skip(self), fields(id = %id), err)]
    pub async fn record_payment(
        &self,
        id: CustomerOrderId,
        amount: f64,
    ) -> DomainResult<CustomerOrder> {
        let mut order = self.get_customer_order(id).await?;
        order.record_payment(amount)?;
        sqlx::query("UPDATE customer_orders SET amount_paid = ? WHERE id = ?")
            .bind(order.amount_paid)
            .bind(id.get())
            .execute(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("record_payment", e))?;
        Ok(order)
    }

    /// Delete a customer order and its lines (cascade).
    #[instrument(skip(self), fields(id = %id), err)]
    pub async fn delete_customer_order(&self, id: CustomerOrderId) -> DomainResult<()> {
        let result = sqlx::query("DELETE FROM customer_orders WHERE id = ?")
            .bind(id.get())
            .execute(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("delete_customer_order", e))?;
        if result.rows_affected() == 0 {
            return Err(DomainError::NotFound);
        }
        Ok(())
    }
}
