//! SQLx-to-domain error mapping.
//!
//! SQLite reports constraint failures through extended result codes:
//!
//! | Code   | Constraint        | DomainError            |
//! |--------|-------------------|------------------------|
//! | `2067` | UNIQUE (index)    | `DuplicateKey`         |
//! | `1555` | UNIQUE (pk)       | `DuplicateKey`         |
//! | `787`  | FOREIGN KEY       | `ReferentialIntegrity` |
//!
//! Everything else becomes `Storage`, tagged with the failing operation.

use ledgerly_core::DomainError;

pub(crate) fn map_sqlx_error(op: &str, e: sqlx::Error) -> DomainError {
    match e {
        sqlx::Error::RowNotFound => DomainError::NotFound,
        sqlx::Error::Database(db) => {
            let code = db.code().map(|c| c.into_owned()).unwrap_or_default();
            match code.as_str() {
                "2067" | "1555" => DomainError::duplicate_key(db.message().to_string()),
                "787" => DomainError::referenced(db.message().to_string()),
                _ => DomainError::storage(format!("{op}: {}", db.message())),
            }
        }
        other => DomainError::storage(format!("{op}: {other}")),
    }
}
