use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

/// Editable text with a cursor, used for the topic box, the chat input and
/// the credential field. Pasted newlines are kept as typed.
///
/// `cursor` is a byte offset that always sits on a char boundary.
#[derive(Clone, Debug, Default)]
pub struct LineInput {
    text: String,
    cursor: usize,
}

impl LineInput {
    pub fn new(text: &str) -> Self {
        Self {
            text: text.to_string(),
            cursor: text.len(),
        }
    }

    pub fn value(&self) -> &str {
        &self.text
    }

    pub fn set_value(&mut self, text: &str) {
        self.text = text.to_string();
        self.cursor = self.text.len();
    }

    pub fn clear(&mut self) {
        self.text.clear();
        self.cursor = 0;
    }

    pub fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }

    pub fn insert_str(&mut self, s: &str) {
        self.text.insert_str(self.cursor, s);
        self.cursor += s.len();
    }

    /// Text split around the cursor: before, the char under it, after.
    pub fn render_parts(&self) -> (&str, Option<char>, &str) {
        let (before, rest) = self.text.split_at(self.cursor);
        let mut chars = rest.chars();
        match chars.next() {
            Some(ch) => (before, Some(ch), chars.as_str()),
            None => (before, None, ""),
        }
    }

    pub fn masked(&self) -> String {
        "*".repeat(self.text.chars().count())
    }

    /// Apply an editing key. Returns false when the key is not an edit.
    pub fn handle(&mut self, key: KeyEvent) -> bool {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        let alt = key.modifiers.contains(KeyModifiers::ALT);
        match key.code {
            KeyCode::Left if ctrl || alt => self.cursor = self.word_start(),
            KeyCode::Right if ctrl || alt => self.cursor = self.word_end(),
            KeyCode::Left => self.cursor = self.prev_boundary(),
            KeyCode::Right => self.cursor = self.next_boundary(),
            KeyCode::Home => self.cursor = 0,
            KeyCode::End => self.cursor = self.text.len(),
            KeyCode::Backspace if ctrl || alt => self.cut(self.word_start(), self.cursor),
            KeyCode::Backspace => self.cut(self.prev_boundary(), self.cursor),
            KeyCode::Delete => self.cut(self.cursor, self.next_boundary()),
            KeyCode::Char(ch) if ctrl => match ch {
                'a' => self.cursor = 0,
                'e' => self.cursor = self.text.len(),
                'u' => self.cut(0, self.cursor),
                'k' => self.cut(self.cursor, self.text.len()),
                'w' => self.cut(self.word_start(), self.cursor),
                _ => return false,
            },
            KeyCode::Char(ch) => {
                self.text.insert(self.cursor, ch);
                self.cursor += ch.len_utf8();
            }
            _ => return false,
        }
        true
    }

    fn cut(&mut self, start: usize, end: usize) {
        self.text.replace_range(start..end, "");
        self.cursor = start;
    }

    fn prev_boundary(&self) -> usize {
        self.text[..self.cursor]
            .char_indices()
            .next_back()
            .map_or(0, |(i, _)| i)
    }

    fn next_boundary(&self) -> usize {
        self.text[self.cursor..]
            .chars()
            .next()
            .map_or(self.cursor, |ch| self.cursor + ch.len_utf8())
    }

    /// Start of the word left of the cursor, skipping whitespace first.
    fn word_start(&self) -> usize {
        let before = &self.text[..self.cursor];
        let trimmed = before.trim_end();
        trimmed
            .char_indices()
            .rev()
            .find(|(_, ch)| ch.is_whitespace())
            .map_or(0, |(i, ch)| i + ch.len_utf8())
    }

    fn word_end(&self) -> usize {
        let rest = &self.text[self.cursor..];
        let skipped = rest.len() - rest.trim_start().len();
        let word = &rest[skipped..];
        let len = word.find(char::is_whitespace).unwrap_or(word.len());
        self.cursor + skipped + len
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn press(input: &mut LineInput, code: KeyCode) {
        input.handle(KeyEvent::new(code, KeyModifiers::NONE));
    }

    fn ctrl(input: &mut LineInput, ch: char) {
        input.handle(KeyEvent::new(KeyCode::Char(ch), KeyModifiers::CONTROL));
    }

    #[test]
    fn typing_inserts_at_cursor() {
        let mut input = LineInput::new("Brt");
        press(&mut input, KeyCode::Left);
        press(&mut input, KeyCode::Char('o'));
        assert_eq!(input.value(), "Brot");
        assert_eq!(input.render_parts(), ("Bro", Some('t'), ""));

        press(&mut input, KeyCode::Left);
        press(&mut input, KeyCode::Left);
        press(&mut input, KeyCode::Char('x'));
        assert_eq!(input.value(), "Bxrot");
    }

    #[test]
    fn multibyte_text_edits_whole_chars() {
        let mut input = LineInput::new("Käse");
        press(&mut input, KeyCode::Home);
        press(&mut input, KeyCode::Right);
        press(&mut input, KeyCode::Delete);
        assert_eq!(input.value(), "Kse");
        let mut input = LineInput::new("еда");
        press(&mut input, KeyCode::Backspace);
        assert_eq!(input.value(), "ед");
    }

    #[test]
    fn edits_at_edges_are_noops() {
        let mut input = LineInput::new("");
        press(&mut input, KeyCode::Backspace);
        press(&mut input, KeyCode::Delete);
        press(&mut input, KeyCode::Left);
        assert_eq!(input.render_parts(), ("", None, ""));
    }

    #[test]
    fn word_motions_and_deletes() {
        let mut input = LineInput::new("der Hund  ");
        ctrl(&mut input, 'w');
        assert_eq!(input.value(), "der ");

        let mut input = LineInput::new("die Katze schläft");
        press(&mut input, KeyCode::Home);
        input.handle(KeyEvent::new(KeyCode::Right, KeyModifiers::ALT));
        assert_eq!(input.render_parts().0, "die");
        ctrl(&mut input, 'k');
        assert_eq!(input.value(), "die");
    }

    #[test]
    fn ctrl_u_cuts_to_line_start() {
        let mut input = LineInput::new("Reise nach Berlin");
        input.cursor = "Reise ".len();
        ctrl(&mut input, 'u');
        assert_eq!(input.value(), "nach Berlin");
        ctrl(&mut input, 'e');
        ctrl(&mut input, 'u');
        assert!(input.is_blank());
    }

    #[test]
    fn non_edit_keys_are_reported() {
        let mut input = LineInput::new("x");
        assert!(!input.handle(KeyEvent::new(KeyCode::Enter, KeyModifiers::NONE)));
        assert!(!input.handle(KeyEvent::new(KeyCode::Char('q'), KeyModifiers::CONTROL)));
        assert_eq!(input.value(), "x");
    }

    #[test]
    fn pasted_newlines_survive() {
        let mut input = LineInput::new("");
        input.insert_str("Ich gehe.\nDu gehst.");
        assert_eq!(input.value(), "Ich gehe.\nDu gehst.");
        assert_eq!(input.masked().chars().count(), 19);
    }
}
