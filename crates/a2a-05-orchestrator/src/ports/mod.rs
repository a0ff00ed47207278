pub mod outbound;

pub use outbound::{ServiceDirectory, WorkflowTransport};
