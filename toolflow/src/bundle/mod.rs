//! Result bundles.
//!
//! A run carries two bundles: one filled from files the stages just wrote and
//! one filled from the pre-existing reference files. They share the slot
//! vocabulary but are never merged, so fresh output can always be told apart
//! from reference content.

mod loader;
pub mod tokens;

pub use loader::load_slot;
pub use tokens::{TokenRow, TokenTable, TokenTableState};

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use std::fmt;

/// Identifies which view a piece of content feeds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResultSlot {
    /// Token table text.
    Tokens,
    /// Syntax tree text.
    Ast,
    /// Three-address code text.
    Tac,
    /// Graph description text.
    Dag,
}

impl fmt::Display for ResultSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Tokens => write!(f, "tokens"),
            Self::Ast => write!(f, "ast"),
            Self::Tac => write!(f, "tac"),
            Self::Dag => write!(f, "dag"),
        }
    }
}

/// Content of a populated slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", content = "value", rename_all = "snake_case")]
pub enum SlotValue {
    /// The file was read and decoded.
    Loaded(String),
    /// The file could not be loaded; `marker` is what a view should show.
    Unavailable {
        /// Placeholder text naming the file.
        marker: String,
    },
}

impl SlotValue {
    /// Returns the text a view should show for this value.
    #[must_use]
    pub fn display_text(&self) -> &str {
        match self {
            Self::Loaded(text) => text,
            Self::Unavailable { marker } => marker,
        }
    }

    /// Returns the loaded text, if any.
    #[must_use]
    pub fn as_loaded(&self) -> Option<&str> {
        match self {
            Self::Loaded(text) => Some(text),
            Self::Unavailable { .. } => None,
        }
    }
}

/// A mapping from slot to content. Slots never populated are absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultBundle {
    slots: BTreeMap<ResultSlot, SlotValue>,
}

impl ResultBundle {
    /// Creates an empty bundle.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores `value` under `slot`, replacing anything already there.
    pub fn insert(&mut self, slot: ResultSlot, value: SlotValue) {
        self.slots.insert(slot, value);
    }

    /// Returns the value stored under `slot`.
    #[must_use]
    pub fn get(&self, slot: ResultSlot) -> Option<&SlotValue> {
        self.slots.get(&slot)
    }

    /// Returns the loaded text under `slot`, ignoring unavailable markers.
    #[must_use]
    pub fn text(&self, slot: ResultSlot) -> Option<&str> {
        self.get(slot).and_then(SlotValue::as_loaded)
    }

    /// Returns true if `slot` holds loaded text.
    #[must_use]
    pub fn is_loaded(&self, slot: ResultSlot) -> bool {
        self.text(slot).is_some()
    }

    /// Returns true if no slot was populated.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Iterates populated slots in slot order.
    pub fn iter(&self) -> impl Iterator<Item = (ResultSlot, &SlotValue)> {
        self.slots.iter().map(|(slot, value)| (*slot, value))
    }

    /// Parses the token slot as a token table.
    #[must_use]
    pub fn tokens(&self) -> TokenTable {
        TokenTable::parse(self.text(ResultSlot::Tokens).unwrap_or_default())
    }

    /// SHA-256 digest over every slot and its content, hex encoded.
    ///
    /// Two bundles with equal fingerprints hold byte-identical content.
    #[must_use]
    pub fn fingerprint(&self) -> String {
        let mut hasher = Sha256::new();
        for (slot, value) in &self.slots {
            hasher.update(slot.to_string().as_bytes());
            hasher.update([0u8]);
            match value {
                SlotValue::Loaded(text) => {
                    hasher.update(b"loaded\0");
                    hasher.update(text.as_bytes());
                }
                SlotValue::Unavailable { marker } => {
                    hasher.update(b"unavailable\0");
                    hasher.update(marker.as_bytes());
                }
            }
            hasher.update([0u8]);
        }
        hex::encode(hasher.finalize())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_ignores_unavailable() {
        let mut bundle = ResultBundle::new();
        bundle.insert(ResultSlot::Ast, SlotValue::Loaded("Program".to_string()));
        bundle.insert(
            ResultSlot::Tac,
            SlotValue::Unavailable {
                marker: "ERROR READING 3ac_output1.txt".to_string(),
            },
        );

        assert_eq!(bundle.text(ResultSlot::Ast), Some("Program"));
        assert_eq!(bundle.text(ResultSlot::Tac), None);
        assert_eq!(
            bundle.get(ResultSlot::Tac).map(SlotValue::display_text),
            Some("ERROR READING 3ac_output1.txt")
        );
        assert!(bundle.get(ResultSlot::Dag).is_none());
    }

    #[test]
    fn test_fingerprint_tracks_content() {
        let mut a = ResultBundle::new();
        a.insert(ResultSlot::Tokens, SlotValue::Loaded("h\nh\n1 | ID | x".to_string()));
        let mut b = a.clone();
        assert_eq!(a.fingerprint(), b.fingerprint());

        b.insert(ResultSlot::Tokens, SlotValue::Loaded("h\nh\n1 | ID | y".to_string()));
        assert_ne!(a.fingerprint(), b.fingerprint());

        assert_ne!(ResultBundle::new().fingerprint(), a.fingerprint());
        assert_eq!(a.fingerprint().len(), 64);
    }

    #[test]
    fn test_iter_in_slot_order() {
        let mut bundle = ResultBundle::new();
        bundle.insert(ResultSlot::Dag, SlotValue::Loaded(String::new()));
        bundle.insert(ResultSlot::Tokens, SlotValue::Loaded(String::new()));

        let slots: Vec<ResultSlot> = bundle.iter().map(|(slot, _)| slot).collect();
        assert_eq!(slots, vec![ResultSlot::Tokens, ResultSlot::Dag]);
    }

    #[test]
    fn test_bundle_serializes_slot_states() {
        let mut bundle = ResultBundle::new();
        bundle.insert(ResultSlot::Ast, SlotValue::Loaded("tree".to_string()));
        let json = serde_json::to_value(&bundle).unwrap();
        assert_eq!(json["slots"]["ast"]["state"], "loaded");
        assert_eq!(json["slots"]["ast"]["value"], "tree");
    }
}
