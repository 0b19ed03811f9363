//! `ledgerly-invoicing` — invoices and conversion from customer orders.

pub mod invoice;

pub use invoice::{
    Invoice, InvoiceDraft, InvoiceKind, InvoiceLine, NewInvoiceLine, draft_from_customer_order,
};
