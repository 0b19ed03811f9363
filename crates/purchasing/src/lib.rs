//! `ledgerly-purchasing` — purchase orders placed with suppliers.

pub mod order;

pub use order::{
    NewPurchaseOrderLine, PurchaseOrder, PurchaseOrderDraft, PurchaseOrderLine,
    PurchaseOrderStatus, PurchaseOrderUpdate,
};
