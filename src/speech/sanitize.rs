//! Text cleanup before speech
//!
//! Turns arbitrary UI text into something a synthesizer can read:
//! markup is dropped, symbols become words, decimals are read as
//! "point", whitespace is collapsed and the result is length capped.
//!
//! Substitutions are unconditional. Paths, fractions and code-like text get
//! mangled ("e-mail" reads as "e minus mail"); that is a known limitation.

use crate::error::{SpeechError, SpeechResult};
use log::warn;
use once_cell::sync::Lazy;
use regex::Regex;

/// Longest text handed to any backend, in characters
pub const MAX_SPEECH_CHARS: usize = 500;

const ELLIPSIS: &str = "...";

static MARKUP: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]*>").expect("valid markup regex"));
static DECIMAL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\d)\.(\d)").expect("valid decimal regex"));
static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("valid whitespace regex"));

/// Symbols read out as words, in replacement order
const SPOKEN_SYMBOLS: &[(char, &str)] = &[
    ('&', "and"),
    ('@', "at"),
    ('$', "dollars"),
    ('%', "percent"),
    ('=', "equals"),
    ('+', "plus"),
    ('-', "minus"),
    ('*', "times"),
    ('/', "divided by"),
];

/// Replace each spoken symbol with its word, padded with spaces
fn expand_symbols(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    for ch in text.chars() {
        match SPOKEN_SYMBOLS.iter().find(|(symbol, _)| *symbol == ch) {
            Some((_, word)) => {
                result.push(' ');
                result.push_str(word);
                result.push(' ');
            }
            None => result.push(ch),
        }
    }
    result
}

/// Normalize `raw` into a speakable string
///
/// Returns `SpeechError::EmptyInput` when nothing speakable remains; callers
/// must not start playback in that case.
pub fn sanitize(raw: &str) -> SpeechResult<String> {
    let text = MARKUP.replace_all(raw, "");
    let text = expand_symbols(&text);
    let text = DECIMAL.replace_all(&text, "${1} point ${2}");
    let text = WHITESPACE.replace_all(&text, " ");
    let text = text.trim();

    if text.is_empty() {
        return Err(SpeechError::EmptyInput);
    }

    if text.chars().count() > MAX_SPEECH_CHARS {
        warn!("Text truncated for speech");
        let mut truncated: String = text
            .chars()
            .take(MAX_SPEECH_CHARS - ELLIPSIS.len())
            .collect();
        truncated.push_str(ELLIPSIS);
        return Ok(truncated);
    }

    Ok(text.to_string())
}
