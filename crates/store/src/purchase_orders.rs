//! Purchase order persistence.
//!
//! Header and lines are written in one transaction; line order is preserved
//! through `line_no` on read.

use chrono::{DateTime, Utc};
use sqlx::Row;
use sqlx::sqlite::SqliteRow;
use tracing::instrument;

use ledgerly_core::{DomainError, DomainResult, ProductId, PurchaseOrderId, SupplierId};
use ledgerly_purchasing::{
    PurchaseOrder, PurchaseOrderDraft, PurchaseOrderLine, PurchaseOrderStatus, PurchaseOrderUpdate,
};

use crate::error::map_sqlx_error;
use crate::store::Store;

fn header_from_row(row: &SqliteRow) -> Result<PurchaseOrder, sqlx::Error> {
    let status: String = row.try_get("status")?;
    Ok(PurchaseOrder {
        id: PurchaseOrderId::new(row.try_get("id")?),
        supplier_id: SupplierId::new(row.try_get("supplier_id")?),
        po_number: row.try_get("po_number")?,
        date: row.try_get("date")?,
        status: status
            .parse::<PurchaseOrderStatus>()
            .map_err(|e| sqlx::Error::Decode(Box::new(e)))?,
        created_by: row.try_get("created_by")?,
        approved_by: row.try_get("approved_by")?,
        vendor_reference: row.try_get("vendor_reference")?,
        expected_date: row.try_get("expected_date")?,
        currency: row.try_get("currency")?,
        payment_terms: row.try_get("payment_terms")?,
        discount_amount: row.try_get("discount_amount")?,
        shipping_cost: row.try_get("shipping_cost")?,
        tax_amount: row.try_get("tax_amount")?,
        ship_to_address: row.try_get("ship_to_address")?,
        shipping_method: row.try_get("shipping_method")?,
        incoterm: row.try_get("incoterm")?,
        port_of_destination: row.try_get("port_of_destination")?,
        consignee: row.try_get("consignee")?,
        notify_party: row.try_get("notify_party")?,
        tc_party: row.try_get("tc_party")?,
        notes: row.try_get("notes")?,
        lines: Vec::new(),
    })
}

fn line_from_row(row: &SqliteRow) -> Result<PurchaseOrderLine, sqlx::Error> {
    Ok(PurchaseOrderLine {
        line_no: row.try_get::<i64, _>("line_no")? as u32,
        product_id: ProductId::new(row.try_get("product_id")?),
        description: row.try_get("description")?,
        qty: row.try_get("qty")?,
        unit: row.try_get("unit")?,
        cost: row.try_get("cost")?,
        packing_structure: row.try_get("packing_structure")?,
        quantity_received: row.try_get("quantity_received")?,
        received_date: row.try_get("received_date")?,
    })
}

impl Store {
    async fn po_number_taken(
        &self,
        po_number: &str,
        exclude: Option<PurchaseOrderId>,
    ) -> DomainResult<bool> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM purchase_orders WHERE po_number = ? AND id != ?",
        )
        .bind(po_number)
        .bind(exclude.map(PurchaseOrderId::get).unwrap_or(0))
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("po_number_taken", e))?;
        Ok(count > 0)
    }

    async fn load_purchase_order_lines(
        &self,
        id: PurchaseOrderId,
    ) -> DomainResult<Vec<PurchaseOrderLine>> {
        let rows = sqlx::query(
            "SELECT * FROM purchase_order_lines
             WHERE purchase_order_id = ? ORDER BY line_no",
        )
        .bind(id.get())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("load_purchase_order_lines", e))?;
        rows.iter()
            .map(|row| {
                line_from_row(row).map_err(|e| map_sqlx_error("load_purchase_order_lines", e))
            })
            .collect()
    }

    /// Create a purchase order: header plus lines in one transaction.
    #[instrument(skip(self, draft), err)]
    pub async fn create_purchase_order(
        &self,
        draft: PurchaseOrderDraft,
    ) -> DomainResult<PurchaseOrder> {
        draft.validate()?;
        if let Some(po_number) = draft.po_number.as_deref() {
            if self.po_number_taken(po_number, None).await? {
                return Err(DomainError::duplicate_key(format!(
                    "po_number {po_number} already exists"
                )));
            }
        }

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| map_sqlx_error("create_purchase_order", e))?;

        let result = sqlx::query(
            "INSERT INTO purchase_orders (
                supplier_id, po_number, date, status, created_by, approved_by,
                vendor_reference, expected_date, currency, payment_terms,
                discount_amount, shipping_cost, tax_amount, ship_to_address,
                shipping_method, incoterm, port_of_destination, consignee,
                notify_party, tc_party, notes
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(draft.supplier_id.get())
        .bind(&draft.po_number)
        .bind(draft.date)
        .bind(PurchaseOrderStatus::Draft.as_str())
        .bind(&draft.created_by)
        .bind(&draft.approved_by)
        .bind(&draft.vendor_reference)
        .bind(draft.expected_date)
        .bind(&draft.currency)
        .bind(&draft.payment_terms)
        .bind(draft.discount_amount)
        .bind(draft.shipping_cost)
        .bind(draft.tax_amount)
        .bind(&draft.ship_to_address)
        .bind(&draft.shipping_method)
        .bind(&draft.incoterm)
        .bind(&draft.port_of_destination)
        .bind(&draft.consignee)
        .bind(&draft.notify_party)
        .bind(&draft.tc_party)
        .bind(&draft.notes)
        .execute(&mut *tx)
        .await
        .map_err(|e| map_sqlx_error("create_purchase_order", e))?;

        let order = PurchaseOrder::from_draft(
            PurchaseOrderId::new(result.last_insert_rowid()),
            draft,
        )?;
        for line in &order.lines {
            sqlx::query(
                "INSERT INTO purchase_order_lines (
                    purchase_order_id, line_no, product_id, description, qty,
                    unit, cost, packing_structure, quantity_received, received_date
                ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
            )
            .bind(order.id.get())
            .bind(line.line_no as i64)
            .bind(line.product_id.get())
            .bind(&line.description)
            .bind(line.qty)
            .bind(&line.unit)
            .bind(line.cost)
            .bind(&line.packing_structure)
            .bind(line.quantity_received)
            .bind(line.received_date)
            .execute(&mut *tx)
            .await
            .map_err(|e| map_sqlx_error("create_purchase_order", e))?;
        }

        tx.commit()
            .await
            .map_err(|e| map_sqlx_error("create_purchase_order", e))?;
        Ok(order)
    }

    pub async fn get_purchase_order(&self, id: PurchaseOrderId) -> DomainResult<PurchaseOrder> {
        let row = sqlx::query("SELECT * FROM purchase_orders WHERE id = ?")
            .bind(id.get())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("get_purchase_order", e))?
            .ok_or(DomainError::NotFound)?;
        let mut order =
            header_from_row(&row).map_err(|e| map_sqlx_error("get_purchase_order", e))?;
        order.lines = self.load_purchase_order_lines(id).await?;
        Ok(order)
    }

    pub async fn list_purchase_orders(&self) -> DomainResult<Vec<PurchaseOrder>> {
        let rows = sqlx::query("SELECT * FROM purchase_orders ORDER BY id")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("list_purchase_orders", e))?;
        let mut orders = Vec::with_capacity(rows.len());
        for row in &rows {
            let mut order =
                header_from_row(row).map_err(|e| map_sqlx_error("list_purchase_orders", e))?;
            order.lines = self.load_purchase_order_lines(order.id).await?;
            orders.push(order);
        }
        Ok(orders)
    }

    /// Edit header fields. Status is not editable here; use
    /// [`Store::set_purchase_order_status`].
    #[instrument(skip(self, update), fields(id = %id), err)]
    pub async fn update_purchase_order(
        &self,
        id: PurchaseOrderId,
        update: PurchaseOrderUpdate,
    ) -> DomainResult<PurchaseOrder> {
        let mut order = self.get_purchase_order(id).await?;
        if let Some(po_number) = update.po_number.as_deref() {
            if Some(po_number) != order.po_number.as_deref()
                && self.po_number_taken(po_number, Some(id)).await?
            {
                return Err(DomainError::duplicate_key(format!(
                    "po_number {po_number} already exists"
                )));
            }
        }
        order.apply_update(update)?;
        sqlx::query(
            "UPDATE purchase_orders SET
                po_number = ?, date = ?, created_by = ?, approved_by = ?,
                vendor_reference = ?, expected_date = ?, currency = ?,
                payment_terms = ?, discount_amount = ?, shipping_cost = ?,
                tax_amount = ?, ship_to_address = ?, shipping_method = ?,
                incoterm = ?, port_of_destination = ?, consignee = ?,
                notify_party = ?, tc_party = ?, notes = ?
            WHERE id = ?",
        )
        .bind(&order.po_number)
        .bind(order.date)
        .bind(&order.created_by)
        .bind(&order.approved_by)
        .bind(&order.vendor_reference)
        .bind(order.expected_date)
        .bind(&order.currency)
        .bind(&order.payment_terms)
        .bind(order.discount_amount)
        .bind(order.shipping_cost)
        .bind(order.tax_amount)
        .bind(&order.ship_to_address)
        .bind(&order.shipping_method)
        .bind(&order.incoterm)
        .bind(&order.port_of_destination)
        .bind(&order.consignee)
        .bind(&order.notify_party)
        .bind(&order.tc_party)
        .bind(&order.notes)
        .bind(id.get())
        .execute(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("update_purchase_order", e))?;
        Ok(order)
    }

    /// Move a purchase order through its lifecycle. Illegal transitions are
    /// rejected and leave the stored status unchanged.
    #[instrument(skip(self), fields(id = %id, next = %next), err)]
    pub async fn set_purchase_order_status(
        &self,
        id: PurchaseOrderId,
        next: PurchaseOrderStatus,
    ) -> DomainResult<PurchaseOrder> {
        let mut order = self.get_purchase_order(id).await?;
        order.transition_to(next)?;
        sqlx::query("UPDATE purchase_orders SET status = ? WHERE id = ?")
            .bind(order.status.as_str())
            .bind(id.get())
            .execute(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("set_purchase_order_status", e))?;
        Ok(order)
    }

    /// Record goods received against one line of a purchase order.
    #[instrument(skip(self), fields(id = %id, line_no = line_no), err)]
    pub async fn record_purchase_receipt(
        &self,
        id: PurchaseOrderId,
        line_no: u32,
        qty: i64,
        received: DateTime<Utc>,
    ) -> DomainResult<PurchaseOrder> {
        let mut order = self.get_purchase_order(id).await?;
        order.record_receipt(line_no, qty, received)?;
        let line = order
            .lines
            .iter()
            .find(|l| l.line_no == line_no)
            .ok_or(DomainError::NotFound)?;
        sqlx::query(
            "UPDATE purchase_order_lines
             SET quantity_received = ?, received_date = ?
             WHERE purchase_order_id = ? AND line_no = ?",
        )
        .bind(line.quantity_received)
        .bind(line.received_date)
        .bind(id.get())
        .bind(line_no as i64)
        .execute(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("record_purchase_receipt", e))?;
        Ok(order)
    }

    /// Delete a purchase order and its lines (cascade).
    #[instrument(skip(self), fields(id = %id), err)]
    pub async fn delete_purchase_order(&self, id: PurchaseOrderId) -> DomainResult<()> {
        let result = sqlx::query("DELETE FROM purchase_orders WHERE id = ?")
            .bind(id.get())
            .execute(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("delete_purchase_order", e))?;
        if result.rows_affected() == 0 {
            return Err(DomainError::NotFound);
        }
        Ok(())
    }
}
