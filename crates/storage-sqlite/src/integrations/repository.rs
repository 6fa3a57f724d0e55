use std::sync::Arc;

use async_trait::async_trait;
use diesel::prelude::*;

use super::model::{ExclusionDb, IntegrationDb, PhotoParametersDb};
use crate::db::{get_connection, DbPool, WriteHandle};
use crate::errors::StorageError;
use crate::schema::{integrations, photo_exclusions, photo_parameters};
use photofolio_core::errors::Result;
use photofolio_core::integrations::{
    ExclusionRule, ExclusionStoreTrait, Integration, IntegrationKind, IntegrationStoreTrait,
    PhotoParameterStoreTrait, PhotoParameters,
};

pub struct IntegrationRepository {
    pool: Arc<DbPool>,
    writer: WriteHandle,
}

impl IntegrationRepository {
    pub fn new(pool: Arc<DbPool>, writer: WriteHandle) -> Self {
        IntegrationRepository { pool, writer }
    }
}

#[async_trait]
impl IntegrationStoreTrait for IntegrationRepository {
    fn get_all(&self) -> Result<Vec<Integration>> {
        let mut conn = get_connection(&self.pool)?;
        let rows = integrations::table
            .order(integrations::created_at.asc())
            .load::<IntegrationDb>(&mut conn)
            .map_err(StorageError::from)?;
        rows.into_iter().map(TryInto::try_into).collect()
    }

    fn get_active(&self) -> Result<Vec<Integration>> {
        let mut conn = get_connection(&self.pool)?;
        let rows = integrations::table
            .filter(integrations::active.eq(true))
            .order(integrations::created_at.asc())
            .load::<IntegrationDb>(&mut conn)
            .map_err(StorageError::from)?;
        rows.into_iter().map(TryInto::try_into).collect()
    }

    fn get_by_id(&self, id: &str) -> Result<Option<Integration>> {
        let mut conn = get_connection(&self.pool)?;
        let row = integrations::table
            .find(id)
            .first::<IntegrationDb>(&mut conn)
            .optional()
            .map_err(StorageError::from)?;
        row.map(TryInto::try_into).transpose()
    }

    fn get_plugin_modules(&self) -> Result<Vec<String>> {
        let mut conn = get_connection(&self.pool)?;
        Ok(integrations::table
            .filter(integrations::kind.eq(IntegrationKind::Plugin.as_str()))
            .filter(integrations::plugin_module.is_not_null())
            .select(integrations::plugin_module.assume_not_null())
            .load::<String>(&mut conn)
            .map_err(StorageError::from)?)
    }

    async fn insert(&self, integration: Integration) -> Result<Integration> {
        let row = IntegrationDb::from(integration);
        self.writer
            .exec(move |conn| {
                diesel::insert_into(integrations::table)
                    .values(&row)
                    .execute(conn)
                    .map_err(StorageError::from)?;

                let inserted = integrations::table
                    .find(&row.id)
                    .first::<IntegrationDb>(conn)
                    .map_err(StorageError::from)?;
                inserted.try_into()
            })
            .await
    }

    async fn update(&self, integration: Integration) -> Result<Integration> {
        let row = IntegrationDb::from(integration);
        self.writer
            .exec(move |conn| {
                diesel::update(integrations::table.find(&row.id))
                    .set(&row)
                    .execute(conn)
                    .map_err(StorageError::from)?;

                let updated = integrations::table
                    .find(&row.id)
                    .first::<IntegrationDb>(conn)
                    .map_err(StorageError::from)?;
                updated.try_into()
            })
            .await
    }

    async fn delete(&self, id: &str) -> Result<usize> {
        let id = id.to_string();
        self.writer
            .exec(move |conn| {
                // Per-photo overrides go with the integration; run history
                // deliberately stays.
                diesel::delete(
                    photo_exclusions::table.filter(photo_exclusions::integration_id.eq(&id)),
                )
                .execute(conn)
                .map_err(StorageError::from)?;
                diesel::delete(
                    photo_parameters::table.filter(photo_parameters::integration_id.eq(&id)),
                )
                .execute(conn)
                .map_err(StorageError::from)?;

                let deleted = diesel::delete(integrations::table.find(&id))
                    .execute(conn)
                    .map_err(StorageError::from)?;
                Ok(deleted)
            })
            .await
    }
}

pub struct ExclusionRepository {
    pool: Arc<DbPool>,
    writer: WriteHandle,
}

impl ExclusionRepository {
    pub fn new(pool: Arc<DbPool>, writer: WriteHandle) -> Self {
        ExclusionRepository { pool, writer }
    }
}

#[async_trait]
impl ExclusionStoreTrait for ExclusionRepository {
    fn excluded_integration_ids(&self, photo_id: &str) -> Result<Vec<String>> {
        let mut conn = get_connection(&self.pool)?;
        Ok(photo_exclusions::table
            .filter(photo_exclusions::photo_id.eq(photo_id))
            .select(photo_exclusions::integration_id)
            .load::<String>(&mut conn)
            .map_err(StorageError::from)?)
    }

    fn get_all(&self) -> Result<Vec<ExclusionRule>> {
        let mut conn = get_connection(&self.pool)?;
        let rows = photo_exclusions::table
            .load::<ExclusionDb>(&mut conn)
            .map_err(StorageError::from)?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn insert(&self, rule: ExclusionRule) -> Result<ExclusionRule> {
        let row = ExclusionDb::from(rule);
        self.writer
            .exec(move |conn| {
                diesel::insert_into(photo_exclusions::table)
                    .values(&row)
                    .execute(conn)
                    .map_err(StorageError::from)?;
                Ok(row.into())
            })
            .await
    }

    async fn delete(&self, photo_id: &str, integration_id: &str) -> Result<usize> {
        let photo_id = photo_id.to_string();
        let integration_id = integration_id.to_string();
        self.writer
            .exec(move |conn| {
                let deleted = diesel::delete(
                    photo_exclusions::table
                        .filter(photo_exclusions::photo_id.eq(&photo_id))
                        .filter(photo_exclusions::integration_id.eq(&integration_id)),
                )
                .execute(conn)
                .map_err(StorageError::from)?;
                Ok(deleted)
            })
            .await
    }
}

pub struct PhotoParameterRepository {
    pool: Arc<DbPool>,
    writer: WriteHandle,
}

impl PhotoParameterRepository {
    pub fn new(pool: Arc<DbPool>, writer: WriteHandle) -> Self {
        PhotoParameterRepository { pool, writer }
    }
}

#[async_trait]
impl PhotoParameterStoreTrait for PhotoParameterRepository {
    fn get(&self, integration_id: &str, photo_id: &str) -> Result<Option<PhotoParameters>> {
        let mut conn = get_connection(&self.pool)?;
        let row = photo_parameters::table
            .filter(photo_parameters::integration_id.eq(integration_id))
            .filter(photo_parameters::photo_id.eq(photo_id))
            .first::<PhotoParametersDb>(&mut conn)
            .optional()
            .map_err(StorageError::from)?;
        Ok(row.map(Into::into))
    }

    async fn upsert(&self, parameters: PhotoParameters) -> Result<PhotoParameters> {
        let row = PhotoParametersDb::from(parameters);
        self.writer
            .exec(move |conn| {
                diesel::replace_into(photo_parameters::table)
                    .values(&row)
                    .execute(conn)
                    .map_err(StorageError::from)?;
                Ok(row.into())
            })
            .await
    }

    async fn delete(&self, integration_id: &str, photo_id: &str) -> Result<usize> {
        let integration_id = integration_id.to_string();
        let photo_id = photo_id.to_string();
        self.writer
            .exec(move |conn| {
                let deleted = diesel::delete(
                    photo_parameters::table
                        .filter(photo_parameters::integration_id.eq(&integration_id))
                        .filter(photo_parameters::photo_id.eq(&photo_id)),
                )
                .execute(conn)
                .map_err(StorageError::from)?;
                Ok(deleted)
            })
            .await
    }
}
