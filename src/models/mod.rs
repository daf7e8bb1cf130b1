pub mod command;
pub mod content_unit;
pub mod generation;
pub mod location;

pub use command::{OperatorCommand, StartStopCommand};
pub use content_unit::{extract_status_id, ContentUnit, InsertedSubtree, NodeHandle, RawCandidate};
pub use generation::{
    ChatMessage, ChatRole, GenerationRequest, GenerationResponse, PersonaConfig,
};
pub use location::PageLocation;
