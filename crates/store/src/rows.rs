//! Row-to-record decoding helpers shared across the entity modules.

use sqlx::Row;
use sqlx::sqlite::SqliteRow;

use ledgerly_parties::Address;

/// Decode one flattened address column group (`{prefix}_line1` .. `_country`).
pub(crate) fn address_from_row(row: &SqliteRow, prefix: &str) -> Result<Address, sqlx::Error> {
    Ok(Address {
        line1: row.try_get(format!("{prefix}_line1").as_str())?,
        line2: row.try_get(format!("{prefix}_line2").as_str())?,
        city: row.try_get(format!("{prefix}_city").as_str())?,
        state: row.try_get(format!("{prefix}_state").as_str())?,
        zip: row.try_get(format!("{prefix}_zip").as_str())?,
        country: row.try_get(format!("{prefix}_country").as_str())?,
    })
}
