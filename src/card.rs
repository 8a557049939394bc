// Copyright 2025 Fernando Borretti
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use serde::Deserialize;
use serde::Serialize;
use uuid::Uuid;

/// Opaque card identifier. Assigned once at creation, never changed.
#[derive(Clone, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CardId(String);

impl CardId {
    pub fn fresh() -> Self {
        CardId(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// A question/answer pair with a unique identifier.
#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
pub struct Card {
    pub id: CardId,
    pub question: String,
    pub answer: String,
}

impl Card {
    pub fn new(question: impl Into<String>, answer: impl Into<String>) -> Self {
        Card {
            id: CardId::fresh(),
            question: question.into(),
            answer: answer.into(),
        }
    }

    pub fn blank() -> Self {
        Card::new("", "")
    }
}

/// An ordered collection of cards. Insertion order is display order. No
/// uniqueness constraint on question/answer text, only on identifiers.
#[derive(Clone, PartialEq, Debug, Default)]
pub struct Deck {
    cards: Vec<Card>,
}

impl Deck {
    pub fn new(cards: Vec<Card>) -> Self {
        Deck { cards }
    }

    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Card> {
        self.cards.get(index)
    }

    /// Append a blank card and return its identifier.
    pub fn add_blank(&mut self) -> CardId {
        let card = Card::blank();
        let id = card.id.clone();
        self.cards.push(card);
        id
    }

    pub fn remove(&mut self, id: &str) {
        self.cards.retain(|card| card.id.as_str() != id);
    }

    pub fn set_question(&mut self, id: &str, value: impl Into<String>) {
        if let Some(card) = self.cards.iter_mut().find(|card| card.id.as_str() == id) {
            card.question = value.into();
        }
    }

    pub fn set_answer(&mut self, id: &str, value: impl Into<String>) {
        if let Some(card) = self.cards.iter_mut().find(|card| card.id.as_str() == id) {
            card.answer = value.into();
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn test_fresh_ids_are_unique_and_non_empty() {
        let cards: Vec<Card> = (0..100).map(|i| Card::new(format!("q{i}"), "a")).collect();
        let ids: HashSet<String> = cards.iter().map(|c| c.id.as_str().to_string()).collect();
        assert_eq!(ids.len(), 100);
        assert!(ids.iter().all(|id| !id.is_empty()));
    }

    #[test]
    fn test_edit_by_id_leaves_other_cards_alone() {
        let first = Card::new("q1", "a1");
        let second = Card::new("q2", "a2");
        let target = second.id.as_str().to_string();
        let mut deck = Deck::new(vec![first, second]);
        deck.set_question(&target, "edited");
        deck.set_answer(&target, "edited answer");
        assert_eq!(deck.get(0).unwrap().question, "q1");
        assert_eq!(deck.get(1).unwrap().question, "edited");
        assert_eq!(deck.get(1).unwrap().answer, "edited answer");
    }

    #[test]
    fn test_remove_preserves_order() {
        let a = Card::new("a", "");
        let b = Card::new("b", "");
        let c = Card::new("c", "");
        let middle = b.id.as_str().to_string();
        let mut deck = Deck::new(vec![a, b, c]);
        deck.remove(&middle);
        assert_eq!(deck.len(), 2);
        assert_eq!(deck.get(0).unwrap().question, "a");
        assert_eq!(deck.get(1).unwrap().question, "c");
    }

    #[test]
    fn test_add_blank_appends_at_end() {
        let mut deck = Deck::new(vec![Card::new("q", "a")]);
        let id = deck.add_blank();
        assert_eq!(deck.len(), 2);
        assert_eq!(deck.get(1).unwrap().id, id);
        assert!(deck.get(1).unwrap().question.is_empty());
    }

    #[test]
    fn test_deleting_every_card_leaves_an_empty_deck() {
        let mut deck = Deck::new(vec![Card::new("q", "a")]);
        let id = deck.get(0).unwrap().id.as_str().to_string();
        deck.remove(&id);
        assert!(deck.is_empty());
    }
}
