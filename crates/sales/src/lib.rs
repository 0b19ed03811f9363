//! `ledgerly-sales` — customer orders.

pub mod order;

pub use order::{
    CustomerOrder, CustomerOrderDraft, CustomerOrderLine, CustomerOrderStatus,
    CustomerOrderUpdate, NewCustomerOrderLine,
};
