//! Document attachment persistence.

use chrono::Utc;
use sqlx::Row;
use sqlx::sqlite::SqliteRow;
use tracing::instrument;

use ledgerly_core::{DocumentId, DomainError, DomainResult};
use ledgerly_documents::{Document, DocumentOwner, NewDocument};

use crate::error::map_sqlx_error;
use crate::store::Store;

fn document_from_row(row: &SqliteRow) -> Result<Document, sqlx::Error> {
    let owner_kind: String = row.try_get("owner_kind")?;
    let owner_id: i64 = row.try_get("owner_id")?;
    Ok(Document {
        id: DocumentId::new(row.try_get("id")?),
        owner: DocumentOwner::from_parts(&owner_kind, owner_id)
            .map_err(|e| sqlx::Error::Decode(Box::new(e)))?,
        file_path: row.try_get("file_path")?,
        description: row.try_get("description")?,
        uploaded_at: row.try_get("uploaded_at")?,
    })
}

impl Store {
    #[instrument(skip(self, new), err)]
    pub async fn attach_document(&self, new: NewDocument) -> DomainResult<Document> {
        new.validate()?;
        let uploaded_at = Utc::now();
        let (owner_kind, owner_id) = new.owner.as_parts();
        let result = sqlx::query(
            "INSERT INTO documents (owner_kind, owner_id, file_path, description, uploaded_at)
             VALUES (?, ?, ?, ?, ?)",
        )
        .bind(owner_kind)
        .bind(owner_id)
        .bind(&new.file_path)
        .bind(&new.description)
        .bind(uploaded_at)
        .execute(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("attach_document", e))?;
        Ok(Document::from_new(
            DocumentId::new(result.last_insert_rowid()),
            new,
            uploaded_at,
        ))
    }

    pub async fn documents_for(&self, owner: DocumentOwner) -> DomainResult<Vec<Document>> {
        let (owner_kind, owner_id) = owner.as_parts();
        let rows = sqlx::query(
            "SELECT * FROM documents WHERE owner_kind = ? AND owner_id = ? ORDER BY id",
        )
        .bind(owner_kind)
        .bind(owner_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("documents_for", e))?;
        rows.iter()
            .map(|row| document_from_row(row).map_err(|e| map_sqlx_error("documents_for", e)))
            .collect()
    }

    #[instrument(skip(self), fields(id = %id), err)]
    pub async fn delete_document(&self, id: DocumentId) -> DomainResult<()> {
        let result = sqlx::query("DELETE FROM documents WHERE id = ?")
            .bind(id.get())
            .execute(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("delete_document", e))?;
        if result.rows_affected() == 0 {
            return Err(DomainError::NotFound);
        }
        Ok(())
    }
}
