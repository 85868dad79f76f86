pub mod chat;
pub mod deck;
pub mod timer;

pub use chat::{ChatMessage, ChatSession};
pub use deck::StudyDeck;
pub use timer::{DelayedEvent, Timers};
