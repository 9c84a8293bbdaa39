//! Agents for the generate/execute/diagnose retry loop.

pub mod error;
pub mod orchestrator;
pub mod programmer;
pub mod researcher;
pub mod types;

pub use error::{AgentError, AgentResult};
pub use orchestrator::{LoopConfig, LoopController};
pub use programmer::{ProgrammerAgent, ProgrammerConfig};
pub use researcher::{ResearcherAgent, ResearcherConfig};
pub use types::{AttemptSession, FinalResult, LoopEvent, LoopOutcome, LoopStage};
