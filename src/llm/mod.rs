//! LLM integration for codemender.
//!
//! This module provides an OpenAI-compatible chat-completions client for
//! the Groq API, used by the programmer agent to draft script bodies.
//!
//! The [`LlmProvider`] trait is the seam between agents and the concrete
//! HTTP client: agents hold an `Arc<dyn LlmProvider>` so tests can inject
//! scripted providers.
//!
//! ```ignore
//! use codemender::llm::{GenerationRequest, GroqClient, LlmProvider, Message};
//!
//! let client = GroqClient::from_env()?;
//! let request = GenerationRequest::new(
//!     "",
//!     vec![Message::system("You write Python."), Message::user("print hello")],
//! )
//! .with_temperature(0.0);
//! let response = client.generate(request).await?;
//! ```

pub mod groq;

pub use groq::{
    Choice, GenerationRequest, GenerationResponse, GroqClient, LlmProvider, Message, Usage,
};
