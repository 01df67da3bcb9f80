pub mod handlers;
pub mod placeholder;
