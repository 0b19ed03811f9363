//! `ledgerly-inventory` — lot-based physical stock.
//!
//! Stock arrives in discrete, dated batches (lots). On-hand quantity and the
//! FIFO consumption order are derived from a product's lots; nothing in the
//! base design decrements stock on the sales side.

pub mod lot;
pub mod tracker;

pub use lot::{NewLot, ProductLot};
pub use tracker::{fifo_sequence, on_hand};
