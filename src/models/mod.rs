//! models/mod.rs
//! Estruturas de dados trocadas com o Supabase e com a API Tiny.

pub mod pedido_model;
pub mod tiny_model;
