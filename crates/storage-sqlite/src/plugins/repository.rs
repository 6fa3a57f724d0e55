use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use diesel::prelude::*;

use crate::db::{get_connection, DbPool, WriteHandle};
use crate::errors::StorageError;
use crate::schema::plugin_kv;
use photofolio_core::errors::Result;
use photofolio_core::plugins::PluginKvStoreTrait;

/// Row shape for the plugins' persistent key-value storage.
#[derive(Queryable, Insertable, Debug, Clone)]
#[diesel(table_name = crate::schema::plugin_kv)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
struct PluginKvDb {
    kv_key: String,
    kv_value: String,
    updated_at: String,
}

pub struct PluginKvRepository {
    pool: Arc<DbPool>,
    writer: WriteHandle,
}

impl PluginKvRepository {
    pub fn new(pool: Arc<DbPool>, writer: WriteHandle) -> Self {
        PluginKvRepository { pool, writer }
    }
}

#[async_trait]
impl PluginKvStoreTrait for PluginKvRepository {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let mut conn = get_connection(&self.pool)?;
        let value = plugin_kv::table
            .find(key)
            .select(plugin_kv::kv_value)
            .first::<String>(&mut conn)
            .optional()
            .map_err(StorageError::from)?;
        Ok(value)
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        let row = PluginKvDb {
            kv_key: key.to_string(),
            kv_value: value.to_string(),
            updated_at: Utc::now().to_rfc3339(),
        };
        self.writer
            .exec(move |conn| {
                diesel::replace_into(plugin_kv::table)
                    .values(&row)
                    .execute(conn)
                    .map_err(StorageError::from)?;
                Ok(())
            })
            .await
    }
}
