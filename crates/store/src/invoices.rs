//! Invoice persistence and conversion from customer orders.

use std::collections::HashMap;

use sqlx::Row;
use sqlx::sqlite::SqliteRow;
use tracing::instrument;

use ledgerly_core::{CustomerOrderId, DomainError, DomainResult, InvoiceId};
use ledgerly_invoicing::{
    Invoice, InvoiceDraft, InvoiceKind, InvoiceLine, draft_from_customer_order,
};
use ledgerly_sales::CustomerOrderStatus;

use crate::error::map_sqlx_error;
use crate::store::Store;

fn header_from_row(row: &SqliteRow) -> Result<Invoice, sqlx::Error> {
    let kind: String = row.try_get("kind")?;
    Ok(Invoice {
        id: InvoiceId::new(row.try_get("id")?),
        kind: kind
            .parse::<InvoiceKind>()
            .map_err(|e| sqlx::Error::Decode(Box::new(e)))?,
        date: row.try_get("date")?,
        customer_order_id: row
            .try_get::<Option<i64>, _>("customer_order_id")?
            .map(CustomerOrderId::new),
        lines: Vec::new(),
    })
}

fn line_from_row(row: &SqliteRow) -> Result<InvoiceLine, sqlx::Error> {
    Ok(InvoiceLine {
        line_no: row.try_get::<i64, _>("line_no")? as u32,
        description: row.try_get("description")?,
        qty: row.try_get("qty")?,
        unit_price: row.try_get("unit_price")?,
        total: row.try_get("total")?,
    })
}

impl Store {
    async fn load_invoice_lines(&self, id: InvoiceId) -> DomainResult<Vec<InvoiceLine>> {
        let rows = sqlx::query("SELECT * FROM invoice_lines WHERE invoice_id = ? ORDER BY line_no")
            .bind(id.get())
            .fetch_all(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("load_invoice_lines", e))?;
        rows.iter()
            .map(|row| line_from_row(row).map_err(|e| map_sqlx_error("load_invoice_lines", e)))
            .collect()
    }

    /// Create an invoice: header plus lines in one transaction.
    #[instrument(skip(self, draft), err)]
    pub async fn create_invoice(&self, draft: InvoiceDraft) -> DomainResult<Invoice> {
        draft.validate()?;

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| map_sqlx_error("create_invoice", e))?;

        let result = sqlx::query(
            "INSERT INTO invoices (kind, date, customer_order_id) VALUES (?, ?, ?)",
        )
        .bind(draft.kind.as_str())
        .bind(draft.date)
        .bind(draft.customer_order_id.map(CustomerOrderId::get))
        .execute(&mut *tx)
        .await
        .map_err(|e| map_sqlx_error("create_invoice", e))?;

        let invoice = Invoice::from_draft(InvoiceId::new(result.last_insert_rowid()), draft)?;
        for line in &invoice.lines {
            sqlx::query(
                "INSERT INTO invoice_lines (
                    invoice_id, line_no, description, qty, unit_price, total
                ) VALUES (?, ?, ?, ?, ?, ?)",
            )
            .bind(invoice.id.get())
            .bind(line.line_no as i64)
            .bind(&line.description)
            .bind(line.qty)
            .bind(line.unit_price)
            .bind(line.total)
            .execute(&mut *tx)
            .await
            .map_err(|e| map_sqlx_error("create_invoice", e))?;
        }

        tx.commit()
            .await
            .map_err(|e| map_sqlx_error("create_invoice", e))?;
        Ok(invoice)
    }

    pub async fn get_invoice(&self, id: InvoiceId) -> DomainResult<Invoice> {
        let row = sqlx::query("SELECT * FROM invoices WHERE id = ?")
            .bind(id.get())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("get_invoice", e))?
            .ok_or(DomainError::NotFound)?;
        let mut invoice = header_from_row(&row).map_err(|e| map_sqlx_error("get_invoice", e))?;
        invoice.lines = self.load_invoice_lines(id).await?;
        Ok(invoice)
    }

    pub async fn list_invoices(&self) -> DomainResult<Vec<Invoice>> {
        let rows = sqlx::query("SELECT * FROM invoices ORDER BY id")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("list_invoices", e))?;
        let mut invoices = Vec::with_capacity(rows.len());
        for row in &rows {
            let mut invoice =
                header_from_row(row).map_err(|e| map_sqlx_error("list_invoices", e))?;
            invoice.lines = self.load_invoice_lines(invoice.id).await?;
            invoices.push(invoice);
        }
        Ok(invoices)
    }

    /// Convert a pending customer order into an invoice.
    ///
    /// One transaction: the invoice (header + lines copied from the order)
    /// is inserted and the order moves to Invoiced. An order that is not
    /// Pending fails the status transition and nothing is written.
    #[instrument(skip(self), fields(order_id = %order_id, kind = %kind), err)]
    pub async fn convert_customer_order_to_invoice(
        &self,
        order_id: CustomerOrderId,
        kind: InvoiceKind,
    ) -> DomainResult<Invoice> {
        let mut order = self.get_customer_order(order_id).await?;

        let mut products = HashMap::new();
        for line in &order.lines {
            match self.get_product(line.product_id).await {
                Ok(product) => {
                    products.insert(product.id, product);
                }
                // A deleted product only degrades the line description.
                Err(DomainError::NotFound) => {}
                Err(e) => return Err(e),
            }
        }
        let draft = draft_from_customer_order(&order, &products, kind)?;
        order.transition_to(CustomerOrderStatus::Invoiced)?;

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| map_sqlx_error("convert_customer_order_to_invoice", e))?;

        let result = sqlx::query(
            "INSERT INTO invoices (kind, date, customer_order_id) VALUES (?, ?, ?)",
        )
        .bind(draft.kind.as_str())
        .bind(draft.date)
        .bind(order_id.get())
        .execute(&mut *tx)
        .await
        .map_err(|e| map_sqlx_error("convert_customer_order_to_invoice", e))?;

        let invoice = Invoice::from_draft(InvoiceId::new(result.last_insert_rowid()), draft)?;
        for line in &invoice.lines {
            sqlx::query(
                "INSERT INTO invoice_lines (
                    invoice_id, line_no, description, qty, unit_price, total
                ) VALUES (?, ?, ?, ?, ?, ?)",
            )
            .bind(invoice.id.get())
            .bind(line.line_no as i64)
            .bind(&line.description)
            .bind(line.qty)
            .bind(line.unit_price)
            .bind(line.total)
            .execute(&mut *tx)
            .await
            .map_err(|e| map_sqlx_error("convert_customer_order_to_invoice", e))?;
        }

        sqlx::query("UPDATE customer_orders SET status = ? WHERE id = ?")
            .bind(order.status.as_str())
            .bind(order_id.get())
            .execute(&mut *tx)
            .await
            .map_err(|e| map_sqlx_error("convert_customer_order_to_invoice", e))?;

        tx.commit()
            .await
            .map_err(|e| map_sqlx_error("convert_customer_order_to_invoice", e))?;
        Ok(invoice)
    }

    /// Delete an invoice and its lines (cascade).
    #[instrument(skip(self), fields(id = %id), err)]
    pub async fn delete_invoice(&self, id: InvoiceId) -> DomainResult<()> {
        let result = sqlx::query("DELETE FROM invoices WHERE id = ?")
            .bind(id.get())
            .execute(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("delete_invoice", e))?;
        if result.rows_affected() == 0 {
            return Err(DomainError::NotFound);
        }
        Ok(())
    }
}
