pub mod sync_config;
