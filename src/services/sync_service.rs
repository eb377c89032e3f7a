//! services/sync_service.rs
//! Processamento de lotes e o laço de reconciliação.

use std::time::Duration;

use anyhow::{anyhow, Result};
use tokio::sync::watch;

use crate::config::sync_config::SyncConfig;
use crate::models::pedido_model::OrderEnrichment;
use crate::rate_limit::CallBudget;
use crate::services::supabase_service::SupabaseService;
use crate::services::tiny_service::TinyService;

/// Reconhece no texto de erro da Tiny um bloqueio temporário (conta
/// bloqueada, limite de requisições excedido). A lista de palavras vem
/// da configuração; o mecanismo não muda.
#[derive(Debug, Clone)]
pub struct ThrottleClassifier {
    keywords: Vec<String>,
}

impl ThrottleClassifier {
    pub fn new(keywords: Vec<String>) -> Self {
        ThrottleClassifier { keywords }
    }

    pub fn is_throttle(&self, texto: &str) -> bool {
        self.keywords.iter().any(|k| texto.contains(k.as_str()))
    }
}

/// Resultado do tratamento de um pedido dentro do lote.
enum OrderOutcome {
    /// Consulta OK e colunas gravadas.
    Updated,
    /// A Tiny sinalizou bloqueio: esfriar e pular sem marcar erro.
    Throttled,
}

#[derive(Clone)]
pub struct SyncService {
    config: SyncConfig,
    supabase: SupabaseService,
    tiny: TinyService,
    classifier: ThrottleClassifier,
}

impl SyncService {
    pub fn new(config: SyncConfig, supabase: SupabaseService, tiny: TinyService) -> Self {
        let classifier = ThrottleClassifier::new(config.throttle_keywords.clone());
        SyncService {
            config,
            supabase,
            tiny,
            classifier,
        }
    }

    /// Laço de reconciliação: roda até o canal de desligamento sinalizar.
    /// Falha ao buscar um lote não derruba o laço; o próximo ciclo tenta
    /// de novo.
    pub async fn run(&self, mut shutdown: watch::Receiver<bool>) {
        let mut budget = CallBudget::new(
            self.config.max_calls_per_window,
            self.config.window_pause,
        );

        loop {
            if *shutdown.borrow() {
                break;
            }

            if let Err(e) = self.process_batch(&mut budget, &mut shutdown).await {
                log::error!("Falha ao processar lote: {:#}", e);
            }

            log::info!(
                "🕑 Aguardando {} minutos antes do próximo lote...",
                self.config.batch_pause.as_secs() / 60
            );
            if pause(self.config.batch_pause, &mut shutdown).await {
                break;
            }
        }

        log::info!("Sincronização encerrada.");
    }

    /// Processa uma página de pedidos pendentes. Retorna `Ok(false)`
    /// quando a página veio vazia (fila drenada no momento).
    pub async fn process_batch(
        &self,
        budget: &mut CallBudget,
        shutdown: &mut watch::Receiver<bool>,
    ) -> Result<bool> {
        log::info!("🔍 Buscando pedidos pendentes...");
        let pedidos = self.supabase.fetch_pending().await?;

        if pedidos.is_empty() {
            log::info!("🏁 Nenhum pedido restante. Aguardando próxima tentativa...");
            return Ok(false);
        }

        log::info!("📦 {} pedidos encontrados.", pedidos.len());

        for pedido in &pedidos {
            if *shutdown.borrow() {
                log::info!("Desligamento sinalizado, encerrando o lote.");
                break;
            }

            // Página pode estar defasada em relação ao estado da tabela.
            if !pedido.is_pending() {
                continue;
            }

            budget.wait_for_slot().await;

            match self.process_order(pedido.id).await {
                Ok(OrderOutcome::Updated) => {}
                Ok(OrderOutcome::Throttled) => {
                    log::warn!(
                        "🚫 API BLOQUEADA. Pausando por {} minutos...",
                        self.config.blocked_pause.as_secs() / 60
                    );
                    if pause(self.config.blocked_pause, shutdown).await {
                        break;
                    }
                    // Pedido continua elegível; não gasta orçamento
                    // nem espera o intervalo entre consultas.
                    continue;
                }
                Err(e) => {
                    let msg = format!("{:#}", e);
                    log::error!("❌ Erro no pedido {}: {}", pedido.id, msg);
                    // Marcação de erro é melhor esforço: se falhar, a
                    // linha fica elegível e volta no próximo lote.
                    if let Err(marc) = self.supabase.mark_error(pedido.id, &msg).await {
                        log::error!(
                            "Falha ao registrar erro do pedido {}: {:#}",
                            pedido.id,
                            marc
                        );
                    }
                }
            }

            budget.consume();
            if pause(self.config.call_interval, shutdown).await {
                break;
            }
        }

        Ok(true)
    }

    /// Consulta a Tiny e grava o resultado de um pedido. Erro de negócio
    /// (status != OK sem sinal de bloqueio) vira `Err` com o detalhe
    /// serializado.
    async fn process_order(&self, id: i64) -> Result<OrderOutcome> {
        let resposta = self.tiny.get_order(id).await?;

        if resposta.retorno.is_ok() {
            let dados = resposta.retorno.pedido.unwrap_or_default();
            let enriquecimento = OrderEnrichment::from_pedido(&dados);
            self.supabase.apply_enrichment(id, &enriquecimento).await?;
            log::info!("✅ Pedido {} atualizado", id);
            return Ok(OrderOutcome::Updated);
        }

        let msg = resposta.retorno.error_text();
        if self.classifier.is_throttle(&msg) {
            return Ok(OrderOutcome::Throttled);
        }
        Err(anyhow!(msg))
    }
}

/// Dorme `dur` ou até o canal de desligamento sinalizar.
/// Retorna `true` quando o desligamento interrompeu a espera.
async fn pause(dur: Duration, shutdown: &mut watch::Receiver<bool>) -> bool {
    if *shutdown.borrow() {
        return true;
    }
    tokio::select! {
        _ = tokio::time::sleep(dur) => false,
        // Canal fechado conta como desligamento.
        _ = shutdown.changed() => true,
    }
}
