use rand::Rng;
use rand::seq::SliceRandom;

use crate::model::Flashcard;

/// Cards under study plus the position, flip and animation-lock state.
///
/// `index` always stays within `0..cards.len()`; a deck is never empty.
#[derive(Clone, Debug)]
pub struct StudyDeck {
    cards: Vec<Flashcard>,
    ids: Vec<String>,
    index: usize,
    flipped: bool,
    animating: bool,
}

impl StudyDeck {
    /// Returns `None` for an empty card list. Ids default to the position.
    pub fn new(cards: Vec<Flashcard>) -> Option<Self> {
        let ids = (0..cards.len()).map(|i| i.to_string()).collect();
        Self::with_ids(cards, ids)
    }

    /// `ids` must be parallel to `cards`; they travel with their card on shuffle.
    pub fn with_ids(cards: Vec<Flashcard>, ids: Vec<String>) -> Option<Self> {
        if cards.is_empty() || cards.len() != ids.len() {
            return None;
        }
        Some(Self {
            cards,
            ids,
            index: 0,
            flipped: false,
            animating: false,
        })
    }

    pub fn cards(&self) -> &[Flashcard] {
        &self.cards
    }

    pub fn ids(&self) -> &[String] {
        &self.ids
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn current(&self) -> &Flashcard {
        &self.cards[self.index]
    }

    pub fn current_id(&self) -> &str {
        &self.ids[self.index]
    }

    pub fn is_flipped(&self) -> bool {
        self.flipped
    }

    pub fn is_animating(&self) -> bool {
        self.animating
    }

    fn target(&self, delta: isize) -> Option<usize> {
        self.index
            .checked_add_signed(delta)
            .filter(|&target| target < self.cards.len())
    }

    pub fn can_navigate(&self, delta: isize) -> bool {
        delta != 0 && !self.animating && self.target(delta).is_some()
    }

    /// Take the lock and hide the answer. The index moves in
    /// [`StudyDeck::finish_navigation`]. Returns false if rejected.
    pub fn begin_navigation(&mut self, delta: isize) -> bool {
        if !self.can_navigate(delta) {
            return false;
        }
        self.animating = true;
        self.flipped = false;
        true
    }

    /// Move the index and show the new card front side up.
    pub fn finish_navigation(&mut self, delta: isize) {
        if let Some(target) = self.target(delta) {
            self.index = target;
        }
        self.flipped = false;
        self.animating = false;
    }

    /// Flip under the animation lock. Returns false if a transition is running.
    pub fn begin_flip(&mut self) -> bool {
        if self.animating {
            return false;
        }
        self.flipped = !self.flipped;
        self.animating = true;
        true
    }

    pub fn flip(&mut self) {
        self.flipped = !self.flipped;
    }

    pub fn release(&mut self) {
        self.animating = false;
    }

    /// Move to the next card, wrapping from the last to the first.
    pub fn advance_wrapping(&mut self) {
        self.index = (self.index + 1) % self.cards.len();
        self.flipped = false;
    }

    pub fn shuffle<R: Rng>(&mut self, rng: &mut R) {
        let mut order: Vec<usize> = (0..self.cards.len()).collect();
        order.shuffle(rng);
        self.cards = order.iter().map(|&i| self.cards[i].clone()).collect();
        self.ids = order.iter().map(|&i| self.ids[i].clone()).collect();
        self.index = 0;
        self.flipped = false;
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    use super::*;

    fn deck(n: usize) -> StudyDeck {
        let cards = (0..n)
            .map(|i| Flashcard::new(format!("f{i}"), format!("b{i}")))
            .collect();
        StudyDeck::new(cards).unwrap()
    }

    #[test]
    fn empty_deck_is_rejected() {
        assert!(StudyDeck::new(Vec::new()).is_none());
        assert!(StudyDeck::with_ids(vec![Flashcard::new("a", "b")], Vec::new()).is_none());
    }

    #[test]
    fn navigation_is_two_phase() {
        let mut d = deck(3);
        d.flip();
        assert!(d.begin_navigation(1));
        assert!(d.is_animating());
        assert!(!d.is_flipped());
        assert_eq!(d.index(), 0);
        d.finish_navigation(1);
        assert_eq!(d.index(), 1);
        assert!(!d.is_animating());
    }

    #[test]
    fn flip_during_navigation_does_not_carry_over() {
        let mut d = deck(3);
        d.begin_navigation(1);
        d.flip();
        d.finish_navigation(1);
        assert_eq!(d.index(), 1);
        assert!(!d.is_flipped());
    }

    #[test]
    fn navigation_out_of_range_is_rejected() {
        let mut d = deck(2);
        assert!(!d.begin_navigation(-1));
        d.begin_navigation(1);
        d.finish_navigation(1);
        assert!(!d.begin_navigation(1));
        assert_eq!(d.index(), 1);
        assert!(!d.is_animating());
    }

    #[test]
    fn navigation_is_rejected_while_animating() {
        let mut d = deck(3);
        assert!(d.begin_flip());
        assert!(!d.begin_navigation(1));
        assert!(!d.begin_flip());
        d.release();
        assert!(d.begin_navigation(1));
    }

    #[test]
    fn advance_wraps_and_hides_answer() {
        let mut d = deck(2);
        d.advance_wrapping();
        assert_eq!(d.index(), 1);
        d.flip();
        d.advance_wrapping();
        assert_eq!(d.index(), 0);
        assert!(!d.is_flipped());
    }

    #[test]
    fn shuffle_keeps_ids_with_cards() {
        let mut d = deck(8);
        let mut rng = SmallRng::seed_from_u64(7);
        d.shuffle(&mut rng);
        for (card, id) in d.cards.iter().zip(&d.ids) {
            assert_eq!(card.front, format!("f{id}"));
        }
        assert_eq!(d.index(), 0);
    }
}
