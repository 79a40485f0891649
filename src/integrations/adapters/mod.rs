pub mod bookstack;
pub mod fider;
pub mod nocobase;
pub mod ollama;
