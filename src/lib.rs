//! Terminal flashcards for German vocabulary: generated sets studied card by
//! card, or bundled categories with known/unknown tracking and a tutor chat.

rust_i18n::i18n!("locales", fallback = "en");

pub mod app;
pub mod config;
pub mod event;
pub mod keymap;
pub mod model;
pub mod remote;
pub mod session;
pub mod store;
pub mod ui;
