//! models/tiny_model.rs
//! Envelope de resposta da API v2 da Tiny (`pedido.obter.php`).
//!
//! A API devolve tudo dentro de `retorno`: `status == "OK"` com o pedido
//! em `retorno.pedido`, ou uma lista de erros de formato variável em
//! `retorno.erros`. Os campos numéricos chegam como string, número ou
//! nem chegam, então ficam como `serde_json::Value` até a normalização.

use serde::Deserialize;
use serde_json::Value;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TinyResponse {
    #[serde(default)]
    pub retorno: TinyRetorno,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TinyRetorno {
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub erros: Option<Value>,
    #[serde(default)]
    pub pedido: Option<TinyPedido>,
}

impl TinyRetorno {
    pub fn is_ok(&self) -> bool {
        self.status == "OK"
    }

    /// Detalhe de erro serializado, do jeito que vai parar em `log_api`.
    pub fn error_text(&self) -> String {
        match &self.erros {
            Some(erros) => serde_json::to_string(erros)
                .unwrap_or_else(|_| "\"Erro desconhecido\"".to_string()),
            None => "\"Erro desconhecido\"".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TinyPedido {
    #[serde(default)]
    pub total_pedido: Value,
    #[serde(default)]
    pub total_produtos: Value,
    #[serde(default)]
    pub forma_pagamento: Option<String>,
    #[serde(default)]
    pub forma_frete: Option<String>,
    #[serde(default)]
    pub marcadores: Vec<MarcadorWrapper>,
    #[serde(default)]
    pub codigo_rastreamento: Option<String>,
    #[serde(default)]
    pub url_rastreamento: Option<String>,
    #[serde(default)]
    pub itens: Vec<ItemWrapper>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct MarcadorWrapper {
    #[serde(default)]
    pub marcador: Option<Marcador>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Marcador {
    #[serde(default)]
    pub descricao: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ItemWrapper {
    #[serde(default)]
    pub item: Option<ItemPedido>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ItemPedido {
    #[serde(default)]
    pub quantidade: Value,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn envelope_ok_carrega_pedido() {
        let raw = r#"{
            "retorno": {
                "status": "OK",
                "pedido": {
                    "total_pedido": "150,00",
                    "forma_pagamento": "Pix",
                    "itens": [
                        {"item": {"quantidade": "2"}},
                        {"item": {"quantidade": "1,5"}}
                    ]
                }
            }
        }"#;

        let resp: TinyResponse = serde_json::from_str(raw).unwrap();
        assert!(resp.retorno.is_ok());
        let pedido = resp.retorno.pedido.unwrap();
        assert_eq!(pedido.forma_pagamento.as_deref(), Some("Pix"));
        assert_eq!(pedido.itens.len(), 2);
    }

    #[test]
    fn envelope_de_erro_serializa_detalhe() {
        let raw = r#"{
            "retorno": {
                "status": "Erro",
                "erros": [{"erro": "Token invalido"}]
            }
        }"#;

        let resp: TinyResponse = serde_json::from_str(raw).unwrap();
        assert!(!resp.retorno.is_ok());
        assert!(resp.retorno.error_text().contains("Token invalido"));
    }

    #[test]
    fn envelope_sem_erros_vira_erro_desconhecido() {
        let resp: TinyResponse = serde_json::from_str(r#"{"retorno": {"status": "Erro"}}"#).unwrap();
        assert_eq!(resp.retorno.error_text(), "\"Erro desconhecido\"");
    }

    #[test]
    fn envelope_vazio_nao_quebra() {
        let resp: TinyResponse = serde_json::from_str("{}").unwrap();
        assert!(!resp.retorno.is_ok());
        assert!(resp.retorno.pedido.is_none());
    }
}
