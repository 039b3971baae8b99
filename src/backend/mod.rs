//! Backend client module for REST communication with the form agent

mod client;
mod protocol;
mod traits;

pub use client::AgentClient;
pub use protocol::{
    StartSessionResponse, SubmitResponse, TemplateSummary, TurnResponse,
};
pub use traits::AgentBackend;

#[cfg(test)]
pub use traits::MockAgentBackend;
