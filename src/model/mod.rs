pub mod card;
pub mod category;
pub mod progress;
pub mod set;

pub use card::{Flashcard, VocabCard};
pub use category::Category;
pub use progress::{ProgressKey, ProgressMap};
pub use set::FlashcardSet;
