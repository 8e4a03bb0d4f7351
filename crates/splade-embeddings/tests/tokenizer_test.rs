//! TokenizerAdapter against the fixture `tokenizer.json`.

use splade_embeddings::TokenizerAdapter;
use splade_test_utils::{fixture_model, fixture_tokenizer_json, word_id};

fn adapter(max_tokens: usize) -> TokenizerAdapter {
    TokenizerAdapter::from_bytes(fixture_tokenizer_json().as_bytes(), max_tokens)
        .expect("fixture tokenizer")
}

#[test]
fn test_special_tokens_wrap_input() {
    let encoding = adapter(512).encode("aging brain", true).expect("encode");
    let aging = word_id("aging").expect("fixture word");
    let brain = word_id("brain").expect("fixture word");

    assert_eq!(encoding.ids(), &[101, aging, brain, 102]);
    assert_eq!(encoding.attention_mask(), &[1, 1, 1, 1]);
}

#[test]
fn test_without_special_tokens() {
    let encoding = adapter(512).encode("aging brain", false).expect("encode");
    assert_eq!(encoding.len(), 2);
}

#[test]
fn test_unknown_word_maps_to_unk() {
    let encoding = adapter(512).encode("zebra", true).expect("encode");
    assert_eq!(encoding.ids(), &[101, 100, 102]);
}

#[test]
fn test_empty_text_has_only_special_tokens() {
    let encoding = adapter(512).encode("", true).expect("encode");
    assert_eq!(encoding.ids(), &[101, 102]);
}

#[test]
fn test_truncation_keeps_special_tokens() {
    let encoding = adapter(4)
        .encode("how does aging affect memory", true)
        .expect("encode");
    assert_eq!(encoding.len(), 4);
    assert_eq!(encoding.ids().first(), Some(&101));
    assert_eq!(encoding.ids().last(), Some(&102));
}

#[test]
fn test_batch_is_unpadded_and_ordered() {
    let encodings = adapter(512)
        .encode_batch(&["memory", "aging changes the brain"], true)
        .expect("encode");
    assert_eq!(encodings.len(), 2);
    assert_eq!(encodings[0].len(), 3);
    assert_eq!(encodings[1].len(), 6);
}

#[test]
fn test_decode_round_trip() {
    let (model, _) = fixture_model().expect("fixture model");
    let text = "How does aging affect memory?";

    let encoding = model.tokenizer().encode(text, true).expect("encode");
    let decoded = model.decode(encoding.ids(), true).expect("decode");
    assert_eq!(decoded, "how does aging affect memory ?");

    let with_specials = model.decode(encoding.ids(), false).expect("decode");
    assert!(with_specials.starts_with("[CLS]"));
}

#[test]
fn test_decode_without_special_tokens_in_encoding() {
    let (model, _) = fixture_model().expect("fixture model");
    let text = "How does aging affect memory?";

    let encoding = model.tokenizer().encode(text, false).expect("encode");
    assert_eq!(encoding.ids().first(), Some(&word_id("how").expect("fixture word")));

    let decoded = model.decode(encoding.ids(), true).expect("decode");
    assert_eq!(decoded, "how does aging affect memory ?");
}

#[test]
fn test_id_to_token() {
    let tokenizer = adapter(512);
    let id = word_id("memory").expect("fixture word");
    assert_eq!(tokenizer.id_to_token(id).as_deref(), Some("memory"));
    assert_eq!(tokenizer.id_to_token(101).as_deref(), Some("[CLS]"));
    assert!(tokenizer.id_to_token(1999).is_none());
}

#[test]
fn test_malformed_definition_rejected() {
    let result = TokenizerAdapter::from_bytes(b"{\"model\": 3}", 512);
    assert!(result.is_err());
}
