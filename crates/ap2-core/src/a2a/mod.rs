//! Agent-to-agent wire shapes and message construction.

pub mod builder;
pub mod wire;

pub use builder::MessageBuilder;
pub use wire::{
    data_maps, text_segments, AgentCapabilities, AgentCard, AgentExtension, Artifact, Message,
    Part, Role, Task, TaskState, TaskStatus,
};
