//! Read-only repository over the photo library tables.

use std::collections::HashMap;
use std::sync::Arc;

use diesel::dsl::sql;
use diesel::prelude::*;
use diesel::sql_types::BigInt;

use crate::db::{get_connection, DbPool};
use crate::errors::StorageError;
use crate::schema::{photo_sizes, photos, sizes};
use photofolio_core::errors::Result;
use photofolio_core::photos::PhotoReadStoreTrait;

/// Read-only view of the photo library.
///
/// The dispatch engine never writes these tables; they are owned by the
/// library's domain layer.
pub struct PhotoReadRepository {
    pool: Arc<DbPool>,
}

impl PhotoReadRepository {
    pub fn new(pool: Arc<DbPool>) -> Self {
        PhotoReadRepository { pool }
    }
}

impl PhotoReadStoreTrait for PhotoReadRepository {
    fn photo_count(&self) -> Result<i64> {
        let mut conn = get_connection(&self.pool)?;
        Ok(photos::table
            .count()
            .get_result(&mut conn)
            .map_err(StorageError::from)?)
    }

    fn size_count(&self) -> Result<i64> {
        let mut conn = get_connection(&self.pool)?;
        Ok(sizes::table
            .count()
            .get_result(&mut conn)
            .map_err(StorageError::from)?)
    }

    fn photo_size_counts(&self) -> Result<HashMap<String, i64>> {
        let mut conn = get_connection(&self.pool)?;
        let counts: Vec<(String, i64)> = photo_sizes::table
            .group_by(photo_sizes::photo_id)
            .select((photo_sizes::photo_id, sql::<BigInt>("COUNT(*)")))
            .load::<(String, i64)>(&mut conn)
            .map_err(StorageError::from)?;
        Ok(counts.into_iter().collect())
    }

    fn photo_asset(&self, photo_uuid: &str, size_slug: &str) -> Result<Option<Vec<u8>>> {
        let mut conn = get_connection(&self.pool)?;
        let file_path: Option<String> = photo_sizes::table
            .inner_join(sizes::table)
            .filter(photo_sizes::photo_id.eq(photo_uuid))
            .filter(sizes::slug.eq(size_slug))
            .select(photo_sizes::file_path)
            .first::<String>(&mut conn)
            .optional()
            .map_err(StorageError::from)?;

        match file_path {
            Some(path) => Ok(Some(std::fs::read(path)?)),
            None => Ok(None),
        }
    }
}
