//! File attachments tied to an owning record.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use ledgerly_core::{
    CustomerOrderId, DocumentId, DomainError, DomainResult, Entity, InvoiceId, PurchaseOrderId,
};

/// The record a document is attached to.
///
/// A tagged union rather than a free-text kind plus raw id, so an attachment
/// can never point at a table that does not exist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DocumentOwner {
    PurchaseOrder(PurchaseOrderId),
    CustomerOrder(CustomerOrderId),
    Invoice(InvoiceId),
}

impl DocumentOwner {
    /// Decompose into the store's (kind, id) column pair.
    pub fn as_parts(&self) -> (&'static str, i64) {
        match self {
            DocumentOwner::PurchaseOrder(id) => ("purchase_order", id.get()),
            DocumentOwner::CustomerOrder(id) => ("customer_order", id.get()),
            DocumentOwner::Invoice(id) => ("invoice", id.get()),
        }
    }

    /// Recompose from the store's (kind, id) column pair.
    pub fn from_parts(kind: &str, id: i64) -> DomainResult<Self> {
        match kind {
            "purchase_order" => Ok(DocumentOwner::PurchaseOrder(PurchaseOrderId::new(id))),
            "customer_order" => Ok(DocumentOwner::CustomerOrder(CustomerOrderId::new(id))),
            "invoice" => Ok(DocumentOwner::Invoice(InvoiceId::new(id))),
            other => Err(DomainError::validation(format!(
                "unknown document owner kind: {other}"
            ))),
        }
    }
}

/// A stored file attachment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub id: DocumentId,
    pub owner: DocumentOwner,
    /// Path to the file on disk; the store does not manage the file itself.
    pub file_path: String,
    pub description: Option<String>,
    pub uploaded_at: DateTime<Utc>,
}

impl Document {
    pub fn from_new(id: DocumentId, new: NewDocument, uploaded_at: DateTime<Utc>) -> Self {
        Self {
            id,
            owner: new.owner,
            file_path: new.file_path,
            description: new.description,
            uploaded_at,
        }
    }
}

impl Entity for Document {
    type Id = DocumentId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

/// Input for attaching a document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewDocument {
    pub owner: DocumentOwner,
    pub file_path: String,
    pub description: Option<String>,
}

impl NewDocument {
    pub fn validate(&self) -> DomainResult<()> {
        if self.file_path.trim().is_empty() {
            return Err(DomainError::validation("document file path is required"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn owner_parts_round_trip() {
        for owner in [
            DocumentOwner::PurchaseOrder(PurchaseOrderId::new(3)),
            DocumentOwner::CustomerOrder(CustomerOrderId::new(7)),
            DocumentOwner::Invoice(InvoiceId::new(11)),
        ] {
            let (kind, id) = owner.as_parts();
            assert_eq!(DocumentOwner::from_parts(kind, id).unwrap(), owner);
        }
    }

    #[test]
    fn unknown_owner_kind_is_rejected() {
        let err = DocumentOwner::from_parts("shipment", 1).unwrap_err();
        match err {
            DomainError::Validation(_) => {}
            _ => panic!("Expected Validation error"),
        }
    }

    #[test]
    fn blank_file_path_is_rejected() {
        let new = NewDocument {
            owner: DocumentOwner::Invoice(InvoiceId::new(1)),
            file_path: "  ".to_string(),
            description: None,
        };
        assert!(new.validate().is_err());
    }
}
