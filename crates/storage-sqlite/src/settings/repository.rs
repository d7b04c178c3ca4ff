use async_trait::async_trait;
use diesel::prelude::*;
use std::sync::Arc;

use super::model::AppSettingDB;
use crate::db::{get_connection, DbPool, WriteHandle};
use crate::errors::StorageError;
use crate::schema::app_settings::dsl::*;
use fintrack_core::errors::{DatabaseError, Error, Result};
use fintrack_core::settings::SettingsRepositoryTrait;

pub struct SettingsRepository {
    pool: Arc<DbPool>,
    writer: WriteHandle,
}

impl SettingsRepository {
    pub fn new(pool: Arc<DbPool>, writer: WriteHandle) -> Self {
        SettingsRepository { pool, writer }
    }
}

#[async_trait]
impl SettingsRepositoryTrait for SettingsRepository {
    fn get_setting(&self, setting_key_param: &str) -> Result<String> {
        let mut conn = get_connection(&self.pool)?;
        let result = app_settings
            .filter(setting_key.eq(setting_key_param))
            .select(setting_value)
            .first::<String>(&mut conn);

        match result {
            Ok(value) => Ok(value),
            Err(diesel::result::Error::NotFound) => Err(Error::Database(DatabaseError::NotFound(
                format!("setting '{}'", setting_key_param),
            ))),
            Err(e) => Err(StorageError::from(e).into()),
        }
    }

    async fn update_setting(
        &self,
        setting_key_param: &str,
        setting_value_param: &str,
    ) -> Result<()> {
        let row = AppSettingDB {
            setting_key: setting_key_param.to_string(),
            setting_value: setting_value_param.to_string(),
        };

        self.writer
            .exec(move |conn| {
                diesel::replace_into(app_settings)
                    .values(&row)
                    .execute(conn)
                    .map_err(StorageError::from)?;
                Ok(())
            })
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{create_pool, run_migrations, spawn_writer};
    use fintrack_core::fx::Currency;
    use fintrack_core::settings::{SettingsService, SettingsServiceTrait, MAIN_CURRENCY_KEY};
    use tempfile::tempdir;

    async fn create_test_repository() -> (SettingsRepository, tempfile::TempDir) {
        let temp_dir = tempdir().expect("Failed to create temp directory");
        let db_path = temp_dir.path().join("test.db").to_string_lossy().to_string();

        let pool = create_pool(&db_path).expect("Failed to create pool");
        run_migrations(&pool).expect("Failed to run migrations");
        let writer = spawn_writer((*pool).clone()).expect("Failed to spawn writer");

        (SettingsRepository::new(pool, writer), temp_dir)
    }

    #[tokio::test]
    async fn test_absent_setting_is_not_found() {
        let (repo, _dir) = create_test_repository().await;
        let err = repo.get_setting("missing").unwrap_err();
        assert!(matches!(err, Error::Database(DatabaseError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_update_setting_overwrites() {
        let (repo, _dir) = create_test_repository().await;

        repo.update_setting("theme", "dark").await.unwrap();
        repo.update_setting("theme", "light").await.unwrap();

        assert_eq!(repo.get_setting("theme").unwrap(), "light");
    }

    #[tokio::test]
    async fn test_main_currency_through_service() {
        let (repo, _dir) = create_test_repository().await;
        let service = SettingsService::new(Arc::new(repo));

        assert_eq!(service.get_main_currency().unwrap(), Currency::Rub);
        service.set_main_currency(Currency::Usd).await.unwrap();
        assert_eq!(service.get_main_currency().unwrap(), Currency::Usd);
        assert_eq!(
            service.get_setting_value(MAIN_CURRENCY_KEY).unwrap(),
            Some("USD".to_string())
        );
    }
}
