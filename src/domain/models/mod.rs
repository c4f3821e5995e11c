mod answer_service;
mod event;
mod exchange;
mod loading;
mod message;
mod role;
mod session;
mod slash_commands;
mod storage;
mod store_event;
mod textarea;

pub use answer_service::*;
pub use event::*;
pub use exchange::*;
pub use loading::*;
pub use message::*;
pub use role::*;
pub use session::*;
pub use slash_commands::*;
pub use storage::*;
pub use store_event::*;
pub use textarea::*;
