use dotenv::dotenv;
use tokio::sync::watch;

use crate::config::sync_config::SyncConfig;
use crate::logger::init_logger;
use crate::services::supabase_service::SupabaseService;
use crate::services::sync_service::SyncService;
use crate::services::tiny_service::TinyService;

mod config;
mod logger;
mod models;
mod normalize;
mod rate_limit;
mod services;
#[cfg(test)]
mod tests;

#[tokio::main]
async fn main() {
    dotenv().ok(); // Carregar .env no início
    init_logger();

    let config = SyncConfig::from_env();

    // Um único cliente HTTP compartilhado pelos dois lados.
    let http_client = reqwest::Client::new();
    let supabase = SupabaseService::new(config.clone(), http_client.clone());
    let tiny = TinyService::new(config.clone(), http_client);
    let sync = SyncService::new(config, supabase, tiny);

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let task = tokio::spawn(async move { sync.run(shutdown_rx).await });

    if let Err(e) = tokio::signal::ctrl_c().await {
        log::error!("Falha ao aguardar o sinal de desligamento: {:#}", e);
    }
    log::info!("Sinal recebido, encerrando a sincronização...");
    let _ = shutdown_tx.send(true);
    let _ = task.await;
}
