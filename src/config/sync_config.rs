//! config/sync_config.rs
//! Configuração do daemon de sincronização (credenciais + ritmo de chamadas).

use std::time::Duration;

/// Configuração completa da sincronização. As credenciais vêm do ambiente;
/// o resto tem padrões que espelham os limites reais da API Tiny e só é
/// alterado em testes.
#[derive(Debug, Clone)]
pub struct SyncConfig {
    /// URL base do projeto Supabase (ex.: `https://xyz.supabase.co`).
    pub supabase_url: String,
    /// Chave de serviço do Supabase (vai em `apikey` e `Authorization`).
    pub supabase_key: String,
    /// Token da API v2 da Tiny.
    pub tiny_token: String,
    /// Endpoint de consulta de pedido da Tiny (sobrescrito nos testes).
    pub tiny_api_url: String,
    /// Tabela com os pedidos a enriquecer.
    pub table: String,
    /// Máximo de linhas buscadas por lote.
    pub page_limit: usize,
    /// Pausa entre consultas consecutivas à Tiny.
    pub call_interval: Duration,
    /// Limite de consultas por janela da API Tiny.
    pub max_calls_per_window: u32,
    /// Duração da janela do limite acima.
    pub window_pause: Duration,
    /// Pausa quando a API sinaliza bloqueio/limite excedido.
    pub blocked_pause: Duration,
    /// Pausa entre lotes.
    pub batch_pause: Duration,
    /// Palavras que identificam um bloqueio temporário no texto de erro
    /// da Tiny. Lista dependente do idioma da API; ajustável sem mexer
    /// no processamento.
    pub throttle_keywords: Vec<String>,
}

impl Default for SyncConfig {
    fn default() -> Self {
        SyncConfig {
            supabase_url: String::new(),
            supabase_key: String::new(),
            tiny_token: String::new(),
            tiny_api_url: "https://api.tiny.com.br/api2/pedido.obter.php".to_string(),
            table: "api_tiny_pedidos".to_string(),
            page_limit: 500,
            call_interval: Duration::from_millis(1500),
            max_calls_per_window: 40,
            window_pause: Duration::from_secs(60),
            blocked_pause: Duration::from_secs(5 * 60),
            batch_pause: Duration::from_secs(2 * 60),
            throttle_keywords: vec!["bloqueada".to_string(), "excedido".to_string()],
        }
    }
}

impl SyncConfig {
    /// Carrega as credenciais do ambiente (já com `.env` aplicado).
    ///
    /// Variável ausente vira string vazia: o daemon sobe mesmo assim e
    /// cada chamada falha pelo caminho normal de erro por registro.
    pub fn from_env() -> Self {
        let supabase_url = std::env::var("SUPABASE_URL").unwrap_or_default();
        let supabase_key = std::env::var("SUPABASE_KEY").unwrap_or_default();
        let tiny_token = std::env::var("TINY_TOKEN").unwrap_or_default();

        log::info!("✅ SUPABASE_URL carregada: {}", supabase_url);
        log::info!(
            "✅ SUPABASE_KEY carregada: {}",
            if supabase_key.is_empty() { "❌ VAZIA" } else { "✔️ OK" }
        );
        log::info!(
            "✅ TINY_TOKEN carregada: {}",
            if tiny_token.is_empty() { "❌ VAZIA" } else { "✔️ OK" }
        );

        SyncConfig {
            supabase_url,
            supabase_key,
            tiny_token,
            ..SyncConfig::default()
        }
    }
}
