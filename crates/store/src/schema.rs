//! Schema bootstrap.
//!
//! Idempotent `CREATE TABLE IF NOT EXISTS` statements run on every open.
//! Uniqueness of sku / po_number / invoice_number is enforced by the
//! database itself; the store layer adds friendlier pre-checks on top.
//! SQLite unique indexes ignore NULL, so orders without a number coexist.

use sqlx::SqlitePool;

use ledgerly_core::DomainResult;

use crate::error::map_sqlx_error;

const SCHEMA: &[&str] = &[
    "CREATE TABLE IF NOT EXISTS suppliers (
        id INTEGER PRIMARY KEY,
        name TEXT NOT NULL,
        contact_name TEXT,
        email TEXT,
        phone TEXT,
        tax_id TEXT,
        physical_line1 TEXT,
        physical_line2 TEXT,
        physical_city TEXT,
        physical_state TEXT,
        physical_zip TEXT,
        physical_country TEXT,
        billing_line1 TEXT,
        billing_line2 TEXT,
        billing_city TEXT,
        billing_state TEXT,
        billing_zip TEXT,
        billing_country TEXT,
        notes TEXT
    )",
    "CREATE TABLE IF NOT EXISTS customers (
        id INTEGER PRIMARY KEY,
        name TEXT NOT NULL,
        contact_name TEXT,
        phone TEXT,
        email TEXT,
        email_name TEXT,
        billing_email TEXT,
        billing_email_name TEXT,
        shipping_line1 TEXT,
        shipping_line2 TEXT,
        shipping_city TEXT,
        shipping_state TEXT,
        shipping_zip TEXT,
        shipping_country TEXT,
        billing_line1 TEXT,
        billing_line2 TEXT,
        billing_city TEXT,
        billing_state TEXT,
        billing_zip TEXT,
        billing_country TEXT
    )",
    "CREATE TABLE IF NOT EXISTS products (
        id INTEGER PRIMARY KEY,
        sku TEXT NOT NULL,
        sku_number TEXT,
        name TEXT,
        description TEXT,
        category TEXT,
        unit_price TEXT NOT NULL,
        cost_price TEXT NOT NULL,
        reorder_level INTEGER NOT NULL DEFAULT 0,
        is_active INTEGER NOT NULL DEFAULT 1,
        supplier_id INTEGER REFERENCES suppliers(id)
    )",
    "CREATE UNIQUE INDEX IF NOT EXISTS idx_products_sku ON products(sku)",
    "CREATE TABLE IF NOT EXISTS product_lots (
        id INTEGER PRIMARY KEY,
        product_id INTEGER NOT NULL REFERENCES products(id) ON DELETE CASCADE,
        lot_number TEXT NOT NULL,
        quantity INTEGER NOT NULL,
        cost_price REAL NOT NULL,
        date_received TEXT,
        production_date TEXT,
        expiration_date TEXT,
        created_at TEXT NOT NULL
    )",
    "CREATE TABLE IF NOT EXISTS purchase_orders (
        id INTEGER PRIMARY KEY,
        supplier_id INTEGER NOT NULL REFERENCES suppliers(id),
        po_number TEXT,
        date TEXT NOT NULL,
        status TEXT NOT NULL,
        created_by TEXT,
        approved_by TEXT,
        vendor_reference TEXT,
        expected_date TEXT,
        currency TEXT NOT NULL,
        payment_terms TEXT,
        discount_amount REAL NOT NULL DEFAULT 0,
        shipping_cost REAL NOT NULL DEFAULT 0,
        tax_amount REAL NOT NULL DEFAULT 0,
        ship_to_address TEXT,
        shipping_method TEXT,
        incoterm TEXT,
        port_of_destination TEXT,
        consignee TEXT,
        notify_party TEXT,
        tc_party TEXT,
        notes TEXT
    )",
    "CREATE UNIQUE INDEX IF NOT EXISTS idx_purchase_orders_po_number
        ON purchase_orders(po_number)",
    "CREATE TABLE IF NOT EXISTS purchase_order_lines (
        id INTEGER PRIMARY KEY,
        purchase_order_id INTEGER NOT NULL
            REFERENCES purchase_orders(id) ON DELETE CASCADE,
        line_no INTEGER NOT NULL,
        product_id INTEGER NOT NULL REFERENCES products(id),
        description TEXT,
        qty INTEGER NOT NULL,
        unit TEXT,
        cost REAL NOT NULL,
        packing_structure TEXT,
        quantity_received INTEGER NOT NULL DEFAULT 0,
        received_date TEXT
    )",
    "CREATE TABLE IF NOT EXISTS customer_orders (
        id INTEGER PRIMARY KEY,
        customer_id INTEGER NOT NULL REFERENCES customers(id),
        invoice_number TEXT,
        po_number TEXT,
        date TEXT NOT NULL,
        status TEXT NOT NULL,
        credit REAL NOT NULL DEFAULT 0,
        discount REAL NOT NULL DEFAULT 0,
        amount_paid REAL NOT NULL DEFAULT 0,
        shipping REAL NOT NULL DEFAULT 0,
        tracking_terms TEXT,
        bill_to_address TEXT,
        ship_to_address TEXT,
        notes TEXT
    )",
    "CREATE UNIQUE INDEX IF NOT EXISTS idx_customer_orders_invoice_number
        ON customer_orders(invoice_number)",
    "CREATE TABLE IF NOT EXISTS customer_order_lines (
        id INTEGER PRIMARY KEY,
        customer_order_id INTEGER NOT NULL
            REFERENCES customer_orders(id) ON DELETE CASCADE,
        line_no INTEGER NOT NULL,
        product_id INTEGER NOT NULL REFERENCES products(id),
        description TEXT,
        qty INTEGER NOT NULL,
        unit TEXT,
        selling_price REAL NOT NULL,
        amount REAL NOT NULL
    )",
    "CREATE TABLE IF NOT EXISTS invoices (
        id INTEGER PRIMARY KEY,
        kind TEXT NOT NULL,
        date TEXT NOT NULL,
        customer_order_id INTEGER REFERENCES customer_orders(id)
    )",
    "CREATE TABLE IF NOT EXISTS invoice_lines (
        id INTEGER PRIMARY KEY,
        invoice_id INTEGER NOT NULL REFERENCES invoices(id) ON DELETE CASCADE,
        line_no INTEGER NOT NULL,
        description TEXT NOT NULL,
        qty INTEGER NOT NULL,
        unit_price REAL NOT NULL,
        total REAL NOT NULL
    )",
    "CREATE TABLE IF NOT EXISTS documents (
        id INTEGER PRIMARY KEY,
        owner_kind TEXT NOT NULL,
        owner_id INTEGER NOT NULL,
        file_path TEXT NOT NULL,
        description TEXT,
        uploaded_at TEXT NOT NULL
    )",
];

pub(crate) async fn migrate(pool: &SqlitePool) -> DomainResult<()> {
    for statement in SCHEMA {
        sqlx::query(statement)
            .execute(pool)
            .await
            .map_err(|e| map_sqlx_error("migrate", e))?;
    }
    Ok(())
}
