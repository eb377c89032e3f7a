//! services/tiny_service.rs
//! Consulta de um pedido na API v2 da Tiny.

use anyhow::{Context, Result};
use reqwest::Client;

use crate::config::sync_config::SyncConfig;
use crate::models::tiny_model::TinyResponse;

#[derive(Clone)]
pub struct TinyService {
    config: SyncConfig,
    http_client: Client,
}

impl TinyService {
    pub fn new(config: SyncConfig, http_client: Client) -> Self {
        TinyService {
            config,
            http_client,
        }
    }

    /// POST de formulário em `pedido.obter.php`. Sem retry interno:
    /// erro de transporte ou de decodificação sobe para o chamador.
    pub async fn get_order(&self, id: i64) -> Result<TinyResponse> {
        let id_str = id.to_string();
        let params = [
            ("token", self.config.tiny_token.as_str()),
            ("id", id_str.as_str()),
            ("formato", "json"),
        ];

        let resp = self
            .http_client
            .post(&self.config.tiny_api_url)
            .form(&params)
            .send()
            .await
            .with_context(|| format!("Falha na consulta do pedido {} à Tiny", id))?
            .error_for_status()
            .with_context(|| format!("Tiny respondeu erro HTTP para o pedido {}", id))?;

        resp.json::<TinyResponse>()
            .await
            .with_context(|| format!("Resposta inválida da Tiny para o pedido {}", id))
    }
}
