mod app_state;
mod chat_view;
mod conversation;
pub mod events;
mod loading_phrases;
mod persistence;
mod scroll;
mod session_store;

pub use app_state::*;
pub use chat_view::*;
pub use conversation::*;
pub use loading_phrases::*;
pub use persistence::*;
pub use scroll::*;
pub use session_store::*;
