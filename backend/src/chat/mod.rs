pub mod models;
pub mod ollama_service;
