pub mod handler;

pub use handler::{register_handlers, CALLBACK_FIELD, SESSION_FIELD};
