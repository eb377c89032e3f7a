//! tests/mod.rs
//! Testes de integração dos clientes HTTP e do processamento de lote,
//! todos contra um servidor httpmock.
