pub mod handler;

pub use handler::{register_handlers, REPLY_TO_FIELD};
