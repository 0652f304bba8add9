//! Brazilian synthetic personal data generator.
//!
//! Produces fake but plausible people (name, CPF, birth date, email, mobile
//! phone and a real address looked up from a random CEP) and exposes them
//! through an HTTP API and CSV/XLSX exports.
//!
//! # Modules
//!
//! - `api`: API definitions.
//! - `core`: Core generation logic.
//! - `integrations`: External service integrations.
//! - `address`: Random CEP resolution with bounded retries.
//! - `cep_client`: Address lookup capability and its HTTP implementation.
//! - `circuit_breaker`: Circuit breaker for CEP providers.
//! - `config`: Configuration management.
//! - `cpf`: CPF generation and validation.
//! - `errors`: Error handling types.
//! - `export`: CSV and XLSX serialization.
//! - `generator`: Per-field random generators.
//! - `handlers`: HTTP request handlers.
//! - `identity`: Record assembly and flattening.
//! - `models`: Core data models.

pub mod api;
pub mod core;
pub mod integrations;

pub mod address;
pub mod cep_client;
pub mod circuit_breaker;
pub mod config;
pub mod cpf;
pub mod errors;
pub mod export;
pub mod generator;
pub mod handlers;
pub mod identity;
pub mod models;
