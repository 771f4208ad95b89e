//! Configuration domain module

mod app_config;

pub use app_config::{
    app_config_dir, app_data_dir, default_recordings_dir, AppConfig, APP_DIR_NAME, HOME_ENV,
};
