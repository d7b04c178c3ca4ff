pub mod settings_service;
pub mod settings_traits;

pub use settings_service::{SettingsService, SettingsServiceTrait, MAIN_CURRENCY_KEY};
pub use settings_traits::SettingsRepositoryTrait;
