//! models/pedido_model.rs
//! Linhas da tabela `api_tiny_pedidos` e o corpo de atualização (PATCH)
//! que gravamos de volta no Supabase.

use chrono::Utc;
use chrono_tz::America::Sao_Paulo;
use serde::{Deserialize, Serialize};

use crate::models::tiny_model::TinyPedido;
use crate::normalize::parse_float_safe;

/// Prefixo de `log_api` quando o pedido já foi enriquecido com sucesso.
pub const SUCCESS_MARKER: &str = "✅";
/// Prefixo de `log_api` quando a última tentativa falhou.
pub const ERROR_MARKER: &str = "❌";

/// Horário de Brasília no formato que gravamos em `log_api`.
pub fn local_timestamp() -> String {
    Utc::now()
        .with_timezone(&Sao_Paulo)
        .format("%d/%m/%Y, %H:%M:%S")
        .to_string()
}

/// Uma linha pendente retornada pela busca no Supabase.
#[derive(Debug, Clone, Deserialize)]
pub struct PendingOrder {
    #[serde(rename = "ID")]
    pub id: i64,
    #[serde(default)]
    pub log_api: Option<String>,
}

impl PendingOrder {
    /// Um pedido é elegível enquanto `log_api` não começar com o marcador
    /// de sucesso. Erro anterior (❌) continua elegível.
    pub fn is_pending(&self) -> bool {
        match &self.log_api {
            Some(log) => !log.starts_with(SUCCESS_MARKER),
            None => true,
        }
    }
}

/// Colunas gravadas no Supabase quando a consulta à Tiny dá certo.
/// Os nomes serializados são exatamente os nomes das colunas da tabela.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrderEnrichment {
    #[serde(rename = "Total do pedido")]
    pub total_pedido: f64,
    #[serde(rename = "Forma de Pagamento")]
    pub forma_pagamento: String,
    #[serde(rename = "Marcadores")]
    pub marcadores: String,
    #[serde(rename = "Forma de Envio")]
    pub forma_frete: String,
    pub log_api: String,
    #[serde(rename = "Cod. de Rastreio")]
    pub rastreio: Option<String>,
    #[serde(rename = "URL de Rastreio")]
    pub url_rastreio: Option<String>,
    #[serde(rename = "Total dos produtos")]
    pub total_produtos: f64,
    #[serde(rename = "N. de Itens")]
    pub total_itens: f64,
}

impl OrderEnrichment {
    /// Deriva as colunas a partir do payload da Tiny. Campos ausentes ou
    /// malformados nunca são erro: números viram 0, textos ganham rótulo
    /// padrão e listas ausentes contam como vazias.
    pub fn from_pedido(dados: &TinyPedido) -> Self {
        let marcadores = dados
            .marcadores
            .iter()
            .filter_map(|m| m.marcador.as_ref())
            .filter_map(|m| m.descricao.as_deref())
            .filter(|d| !d.is_empty())
            .collect::<Vec<_>>()
            .join(" | ");

        let total_itens: f64 = dados
            .itens
            .iter()
            .filter_map(|i| i.item.as_ref())
            .map(|i| parse_float_safe(&i.quantidade))
            .sum();

        OrderEnrichment {
            total_pedido: parse_float_safe(&dados.total_pedido),
            forma_pagamento: non_empty(&dados.forma_pagamento)
                .unwrap_or_else(|| "Não informado".to_string()),
            marcadores: if marcadores.is_empty() {
                "Nenhum".to_string()
            } else {
                marcadores
            },
            forma_frete: non_empty(&dados.forma_frete)
                .unwrap_or_else(|| "Não informado".to_string()),
            log_api: format!("{} Processado em {}", SUCCESS_MARKER, local_timestamp()),
            rastreio: non_empty(&dados.codigo_rastreamento),
            url_rastreio: non_empty(&dados.url_rastreamento),
            total_produtos: parse_float_safe(&dados.total_produtos),
            total_itens,
        }
    }
}

// String vazia da Tiny conta como campo ausente.
fn non_empty(valor: &Option<String>) -> Option<String> {
    valor.as_deref().filter(|s| !s.is_empty()).map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pedido_com_log(log: Option<&str>) -> PendingOrder {
        PendingOrder {
            id: 1,
            log_api: log.map(str::to_string),
        }
    }

    #[test]
    fn pedido_sem_log_e_elegivel() {
        assert!(pedido_com_log(None).is_pending());
        assert!(pedido_com_log(Some("")).is_pending());
    }

    #[test]
    fn pedido_com_erro_continua_elegivel() {
        assert!(pedido_com_log(Some("❌ token inválido (01/01/2025, 10:00:00)")).is_pending());
    }

    #[test]
    fn pedido_processado_nao_e_elegivel() {
        assert!(!pedido_com_log(Some("✅ Processado em 01/01/2025, 10:00:00")).is_pending());
    }

    #[test]
    fn enriquecimento_usa_rotulos_padrao() {
        let dados = TinyPedido::default();
        let enr = OrderEnrichment::from_pedido(&dados);

        assert_eq!(enr.total_pedido, 0.0);
        assert_eq!(enr.total_produtos, 0.0);
        assert_eq!(enr.forma_pagamento, "Não informado");
        assert_eq!(enr.forma_frete, "Não informado");
        assert_eq!(enr.marcadores, "Nenhum");
        assert_eq!(enr.rastreio, None);
        assert_eq!(enr.url_rastreio, None);
        assert_eq!(enr.total_itens, 0.0);
        assert!(enr.log_api.starts_with(SUCCESS_MARKER));
    }

    #[test]
    fn reprocessar_o_mesmo_payload_da_o_mesmo_resultado() {
        let raw = r#"{
            "total_pedido": "99,90",
            "forma_pagamento": "Boleto",
            "itens": [{"item": {"quantidade": 3}}]
        }"#;
        let dados: TinyPedido = serde_json::from_str(raw).unwrap();

        let primeira = OrderEnrichment::from_pedido(&dados);
        let segunda = OrderEnrichment::from_pedido(&dados);

        // Só o horário em log_api pode diferir entre as duas execuções.
        assert_eq!(primeira.total_pedido, segunda.total_pedido);
        assert_eq!(primeira.forma_pagamento, segunda.forma_pagamento);
        assert_eq!(primeira.marcadores, segunda.marcadores);
        assert_eq!(primeira.forma_frete, segunda.forma_frete);
        assert_eq!(primeira.rastreio, segunda.rastreio);
        assert_eq!(primeira.url_rastreio, segunda.url_rastreio);
        assert_eq!(primeira.total_produtos, segunda.total_produtos);
        assert_eq!(primeira.total_itens, segunda.total_itens);
        assert_eq!(primeira.total_itens, 3.0);
    }

    #[test]
    fn string_vazia_conta_como_ausente() {
        let mut dados = TinyPedido::default();
        dados.forma_pagamento = Some(String::new());
        dados.codigo_rastreamento = Some(String::new());

        let enr = OrderEnrichment::from_pedido(&dados);
        assert_eq!(enr.forma_pagamento, "Não informado");
        assert_eq!(enr.rastreio, None);
    }
}
