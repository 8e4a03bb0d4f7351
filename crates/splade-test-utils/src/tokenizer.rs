//! Small WordLevel tokenizer with BERT special-token ids.
//!
//! Lowercases, splits on whitespace and punctuation, and wraps each input in
//! `[CLS] ... [SEP]`. Unknown words map to `[UNK]`.

use serde_json::{json, Map, Value};

pub const PAD_ID: u32 = 0;
pub const UNK_ID: u32 = 100;
pub const CLS_ID: u32 = 101;
pub const SEP_ID: u32 = 102;

/// Ids the bag-of-words runtime never scores.
pub const SPECIAL_IDS: [u32; 4] = [PAD_ID, UNK_ID, CLS_ID, SEP_ID];

/// Output width for models built on the fixture. Covers every fixture id.
pub const FIXTURE_VOCAB_SIZE: usize = 2048;

const FIRST_WORD_ID: u32 = 1000;

/// Fixture words, id `1000 + position`.
pub const FIXTURE_WORDS: &[&str] = &[
    "how", "does", "aging", "affect", "memory", "the", "brain", "changes", "with", "age",
    "declines", "stock", "market", "rose", "today", "and", "of", "a", "is", "in", "to", "sleep",
    "improves", "?", ".", ",", "!",
];

/// Id of `word` in the fixture vocabulary.
pub fn word_id(word: &str) -> Option<u32> {
    FIXTURE_WORDS
        .iter()
        .position(|w| *w == word)
        .map(|i| FIRST_WORD_ID + i as u32)
}

fn added_token(id: u32, content: &str) -> Value {
    json!({
        "id": id,
        "content": content,
        "single_word": false,
        "lstrip": false,
        "rstrip": false,
        "normalized": false,
        "special": true
    })
}

/// `tokenizer.json` contents for the fixture.
pub fn fixture_tokenizer_json() -> String {
    let specials = [
        (PAD_ID, "[PAD]"),
        (UNK_ID, "[UNK]"),
        (CLS_ID, "[CLS]"),
        (SEP_ID, "[SEP]"),
    ];

    let mut vocab = Map::new();
    for (id, token) in specials {
        vocab.insert(token.to_string(), json!(id));
    }
    for (i, word) in FIXTURE_WORDS.iter().enumerate() {
        vocab.insert((*word).to_string(), json!(FIRST_WORD_ID + i as u32));
    }

    let added_tokens: Vec<Value> = specials
        .iter()
        .map(|(id, token)| added_token(*id, token))
        .collect();

    json!({
        "version": "1.0",
        "truncation": null,
        "padding": null,
        "added_tokens": added_tokens,
        "normalizer": { "type": "Lowercase" },
        "pre_tokenizer": { "type": "Whitespace" },
        "post_processor": {
            "type": "BertProcessing",
            "sep": ["[SEP]", SEP_ID],
            "cls": ["[CLS]", CLS_ID]
        },
        "decoder": null,
        "model": {
            "type": "WordLevel",
            "vocab": vocab,
            "unk_token": "[UNK]"
        }
    })
    .to_string()
}
