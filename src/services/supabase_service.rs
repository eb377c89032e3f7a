//! services/supabase_service.rs
//! Leitura e escrita da tabela `api_tiny_pedidos` via PostgREST.

use anyhow::{anyhow, Context, Result};
use reqwest::Client;

use crate::config::sync_config::SyncConfig;
use crate::models::pedido_model::{
    local_timestamp, OrderEnrichment, PendingOrder, ERROR_MARKER, SUCCESS_MARKER,
};

#[derive(Clone)]
pub struct SupabaseService {
    config: SyncConfig,
    http_client: Client,
}

impl SupabaseService {
    pub fn new(config: SyncConfig, http_client: Client) -> Self {
        SupabaseService {
            config,
            http_client,
        }
    }

    fn table_url(&self) -> String {
        format!(
            "{}/rest/v1/{}",
            self.config.supabase_url, self.config.table
        )
    }

    /// Busca uma página de pedidos pendentes: `log_api` nulo ou sem o
    /// marcador de sucesso, do ID mais alto para o mais baixo, no máximo
    /// `page_limit` linhas.
    pub async fn fetch_pending(&self) -> Result<Vec<PendingOrder>> {
        let filtro = format!(
            "(log_api.is.null,log_api.not.like.{}*)",
            SUCCESS_MARKER
        );
        let limite = self.config.page_limit.to_string();
        let resp = self
            .http_client
            .get(self.table_url())
            .query(&[
                ("select", "ID,log_api"),
                ("order", "ID.desc"),
                ("limit", limite.as_str()),
                ("or", filtro.as_str()),
            ])
            .header("apikey", &self.config.supabase_key)
            .bearer_auth(&self.config.supabase_key)
            .header("Content-Type", "application/json")
            .send()
            .await
            .context("Falha na requisição de pedidos pendentes ao Supabase")?;

        if !resp.status().is_success() {
            let status = resp.status();
            let corpo = resp.text().await.unwrap_or_default();
            return Err(anyhow!(
                "Supabase respondeu {} ao buscar pendentes: {}",
                status,
                corpo
            ));
        }

        resp.json::<Vec<PendingOrder>>()
            .await
            .context("Resposta inválida do Supabase ao buscar pendentes")
    }

    /// Grava as colunas de enriquecimento no pedido indicado.
    /// Não lê a linha de volta (`Prefer: return=minimal`).
    pub async fn apply_enrichment(&self, id: i64, enriquecimento: &OrderEnrichment) -> Result<()> {
        self.patch(id, enriquecimento).await.with_context(|| {
            format!("Falha ao gravar enriquecimento do pedido {}", id)
        })
    }

    /// Marca o pedido com `❌ {erro} ({horário})`. A linha continua
    /// elegível e será tentada de novo no próximo lote.
    pub async fn mark_error(&self, id: i64, erro: &str) -> Result<()> {
        let body = serde_json::json!({
            "log_api": format!("{} {} ({})", ERROR_MARKER, erro, local_timestamp()),
        });
        self.patch(id, &body)
            .await
            .with_context(|| format!("Falha ao marcar erro do pedido {}", id))
    }

    async fn patch<B: serde::Serialize>(&self, id: i64, body: &B) -> Result<()> {
        let resp = self
            .http_client
            .patch(self.table_url())
            .query(&[("ID", format!("eq.{}", id))])
            .header("apikey", &self.config.supabase_key)
            .bearer_auth(&self.config.supabase_key)
            .header("Prefer", "return=minimal")
            .json(body)
            .send()
            .await
            .context("Falha na requisição PATCH ao Supabase")?;

        if !resp.status().is_success() {
            let status = resp.status();
            let corpo = resp.text().await.unwrap_or_default();
            return Err(anyhow!("Supabase respondeu {}: {}", status, corpo));
        }
        Ok(())
    }
}
