//! normalize.rs
//! Conversão tolerante de valores numéricos vindos da API Tiny.
//!
//! A API devolve números ora como string com vírgula decimal ("12,50"),
//! ora como número JSON, ora simplesmente omite o campo. Qualquer coisa
//! que não dê para interpretar vira 0.0 — nunca é erro.

use serde_json::Value;

/// Converte um valor JSON arbitrário em `f64`.
///
/// `null`/ausente → 0.0; vírgula decimal é trocada por ponto antes do
/// parse; string não-numérica → 0.0.
pub fn parse_float_safe(value: &Value) -> f64 {
    match value {
        Value::Null => 0.0,
        Value::Number(n) => n.as_f64().unwrap_or(0.0),
        Value::String(s) => s.replace(',', ".").trim().parse::<f64>().unwrap_or(0.0),
        _ => 0.0,
    }
}
