//! `ledgerly-documents` — file attachments and the renderer hand-off contract.

pub mod document;
pub mod handoff;

pub use document::{Document, DocumentOwner, NewDocument};
pub use handoff::{
    DocumentRenderer, RenderError, RenderLine, RenderableCustomerOrder, RenderablePurchaseOrder,
};
