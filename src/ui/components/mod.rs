pub mod card_view;
pub mod category_menu;
pub mod chat_panel;
pub mod history_list;
pub mod notice_popup;
pub mod progress_bar;
pub mod text_field;
