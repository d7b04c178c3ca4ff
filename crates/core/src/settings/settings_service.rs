use super::SettingsRepositoryTrait;
use crate::errors::{DatabaseError, Error, Result};
use crate::fx::{Currency, FxError};
use async_trait::async_trait;
use log::{debug, info};
use std::sync::Arc;

/// Settings key holding the currency balances are reported in.
pub const MAIN_CURRENCY_KEY: &str = "main_currency";

/// Main currency used until the user picks one.
const DEFAULT_MAIN_CURRENCY: Currency = Currency::Rub;

#[async_trait]
pub trait SettingsServiceTrait: Send + Sync {
    fn get_main_currency(&self) -> Result<Currency>;

    async fn set_main_currency(&self, currency: Currency) -> Result<()>;

    /// Get a single setting value by key. Returns None if not found.
    fn get_setting_value(&self, key: &str) -> Result<Option<String>>;

    /// Set a single setting value by key.
    async fn set_setting_value(&self, key: &str, value: &str) -> Result<()>;
}

pub struct SettingsService {
    settings_repository: Arc<dyn SettingsRepositoryTrait>,
}

#[async_trait]
impl SettingsServiceTrait for SettingsService {
    fn get_main_currency(&self) -> Result<Currency> {
        match self.get_setting_value(MAIN_CURRENCY_KEY)? {
            Some(code) => code.parse().map_err(|e: FxError| {
                Error::Database(DatabaseError::CorruptRecord(format!(
                    "setting '{}': {}",
                    MAIN_CURRENCY_KEY, e
                )))
            }),
            None => {
                debug!("No main currency stored, using {}", DEFAULT_MAIN_CURRENCY);
                Ok(DEFAULT_MAIN_CURRENCY)
            }
        }
    }

    async fn set_main_currency(&self, currency: Currency) -> Result<()> {
        self.settings_repository
            .update_setting(MAIN_CURRENCY_KEY, currency.code())
            .await?;
        info!("Main currency set to {}", currency);
        Ok(())
    }

    fn get_setting_value(&self, key: &str) -> Result<Option<String>> {
        match self.settings_repository.get_setting(key) {
            Ok(value) => Ok(Some(value)),
            Err(Error::Database(DatabaseError::NotFound(_))) => Ok(None),
            Err(e) => Err(e),
        }
    }

    async fn set_setting_value(&self, key: &str, value: &str) -> Result<()> {
        self.settings_repository.update_setting(key, value).await
    }
}

impl SettingsService {
    pub fn new(settings_repository: Arc<dyn SettingsRepositoryTrait>) -> Self {
        SettingsService {
            settings_repository,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Mutex;

    #[derive(Default)]
    struct MockSettingsRepository {
        values: Mutex<HashMap<String, String>>,
        broken: bool,
    }

    #[async_trait]
    impl SettingsRepositoryTrait for MockSettingsRepository {
        fn get_setting(&self, setting_key: &str) -> Result<String> {
            if self.broken {
                return Err(Error::Database(DatabaseError::ConnectionFailed(
                    "pool timed out".to_string(),
                )));
            }
            self.values
                .lock()
                .unwrap()
                .get(setting_key)
                .cloned()
                .ok_or_else(|| Error::Database(DatabaseError::NotFound(setting_key.to_string())))
        }

        async fn update_setting(&self, setting_key: &str, setting_value: &str) -> Result<()> {
            self.values
                .lock()
                .unwrap()
                .insert(setting_key.to_string(), setting_value.to_string());
            Ok(())
        }
    }

    #[test]
    fn test_main_currency_defaults_to_rub() {
        let service = SettingsService::new(Arc::new(MockSettingsRepository::default()));
        assert_eq!(service.get_main_currency().unwrap(), Currency::Rub);
    }

    #[tokio::test]
    async fn test_set_then_get_main_currency() {
        let repo = Arc::new(MockSettingsRepository::default());
        let service = SettingsService::new(repo.clone());

        service.set_main_currency(Currency::Eur).await.unwrap();

        assert_eq!(service.get_main_currency().unwrap(), Currency::Eur);
        assert_eq!(
            repo.values.lock().unwrap().get(MAIN_CURRENCY_KEY).cloned(),
            Some("EUR".to_string())
        );
    }

    #[tokio::test]
    async fn test_unsupported_stored_currency_is_corrupt() {
        let service = SettingsService::new(Arc::new(MockSettingsRepository::default()));
        service
            .set_setting_value(MAIN_CURRENCY_KEY, "XYZ")
            .await
            .unwrap();

        let err = service.get_main_currency().unwrap_err();
        assert!(matches!(
            err,
            Error::Database(DatabaseError::CorruptRecord(_))
        ));
    }

    #[test]
    fn test_storage_failure_is_not_the_default() {
        let service = SettingsService::new(Arc::new(MockSettingsRepository {
            broken: true,
            ..Default::default()
        }));
        assert!(service.get_main_currency().unwrap_err().is_storage());
        assert!(service.get_setting_value("anything").is_err());
    }
}
