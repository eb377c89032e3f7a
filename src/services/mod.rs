//! services/mod.rs
//! Módulo que agrupa os clientes HTTP e a camada de sincronização.

pub mod supabase_service;
pub mod sync_service;
pub mod tiny_service;
