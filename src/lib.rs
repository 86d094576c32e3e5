//! fitness-plan-proxy: credential-guarding proxy for Gemini.
//!
//! Accepts `{"prompt": ...}` from clients, forwards it to the Gemini
//! `generateContent` API together with a fixed fitness-planner system
//! instruction, and returns only the generated text. The API key stays on
//! the server.

pub mod config;
pub mod error;
pub mod gemini;
pub mod server;
