use teloxide::dispatching::dialogue::ErasedStorage;

pub mod callbacks;
pub mod commands;
pub mod context;
pub mod handlers;
pub mod render;
pub mod state;
pub mod throttle;

pub type HandlerResult = anyhow::Result<()>;
pub type DialogueStorage = ErasedStorage<state::ConversationState>;

pub use commands::Command;
pub use context::AppContext;
pub use handlers::build_schema;
