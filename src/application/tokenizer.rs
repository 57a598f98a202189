// Word tokenizer - BERT pre-tokenization rejoined into English words
use tokenizers::pre_tokenizers::bert::BertPreTokenizer;
use tokenizers::tokenizer::{OffsetReferential, OffsetType, PreTokenizedString, PreTokenizer};

const CLITICS: [&str; 6] = ["'s", "'re", "'ll", "'ve", "'d", "'m"];

#[derive(Debug, thiserror::Error)]
#[error("pre-tokenization failed: {0}")]
pub struct TokenizeError(String);

/// Slice of the input with its byte offsets
#[derive(Debug, Clone, Copy)]
struct Piece<'a> {
    text: &'a str,
    start: usize,
    end: usize,
}

#[derive(Debug, Clone, Default)]
pub struct WordTokenizer {
    keep_punctuation: bool,
}

impl WordTokenizer {
    pub fn new(keep_punctuation: bool) -> Self {
        Self { keep_punctuation }
    }

    /// Split `text` into word tokens in input order.
    ///
    /// The BERT pre-tokenizer splits on whitespace and isolates every
    /// punctuation mark. Marks inside a word (`don't`, `well-known`, `3.14`,
    /// `1,000`, `10:30`) are joined back, English clitics (`n't`, `'s`, ...)
    /// become their own tokens, and punctuation-only tokens are dropped unless
    /// the tokenizer keeps punctuation.
    pub fn tokenize(&self, text: &str) -> Result<Vec<String>, TokenizeError> {
        let pieces = pre_tokenize(text)?;

        let mut tokens = Vec::new();
        for chunk in adjacent_runs(&pieces) {
            tokens.extend(join_chunk(chunk));
        }
        tokens.retain(|token| self.keep_punctuation || !is_punctuation(token));
        Ok(tokens)
    }
}

pub fn is_punctuation(token: &str) -> bool {
    !token.is_empty() && !token.chars().any(char::is_alphanumeric)
}

fn pre_tokenize(text: &str) -> Result<Vec<Piece<'_>>, TokenizeError> {
    let mut pretokenized = PreTokenizedString::from(text);
    BertPreTokenizer
        .pre_tokenize(&mut pretokenized)
        .map_err(|e| TokenizeError(e.to_string()))?;

    Ok(pretokenized
        .get_splits(OffsetReferential::Original, OffsetType::Byte)
        .into_iter()
        .filter_map(|(_, (start, end), _)| {
            text.get(start..end).map(|text| Piece { text, start, end })
        })
        .filter(|piece| !piece.text.is_empty())
        .collect())
}

/// Group pieces that touch in the input, i.e. one whitespace-separated chunk
fn adjacent_runs<'p, 'a>(pieces: &'p [Piece<'a>]) -> Vec<&'p [Piece<'a>]> {
    let mut runs = Vec::new();
    let mut begin = 0;
    for i in 1..=pieces.len() {
        if i == pieces.len() || pieces[i - 1].end != pieces[i].start {
            if begin < i {
                runs.push(&pieces[begin..i]);
            }
            begin = i;
        }
    }
    runs
}

fn as_mark(piece: &str) -> Option<char> {
    let mut chars = piece.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) if !c.is_alphanumeric() => Some(c),
        _ => None,
    }
}

fn join_chunk(chunk: &[Piece<'_>]) -> Vec<String> {
    let mut tokens: Vec<String> = Vec::new();
    let mut word = String::new();

    for (i, piece) in chunk.iter().enumerate() {
        let Some(mark) = as_mark(piece.text) else {
            word.push_str(piece.text);
            continue;
        };

        let prev = word.chars().last();
        let next = chunk.get(i + 1).and_then(|p| p.text.chars().next());
        if joins_word(mark, prev, next) {
            word.push(mark);
            continue;
        }

        flush_word(&mut word, &mut tokens);
        // runs of the same mark stay together: "...", "!!"
        if i > 0 && chunk[i - 1].text == piece.text {
            if let Some(last) = tokens.last_mut() {
                last.push(mark);
                continue;
            }
        }
        tokens.push(mark.to_string());
    }
    flush_word(&mut word, &mut tokens);
    tokens
}

fn joins_word(mark: char, prev: Option<char>, next: Option<char>) -> bool {
    let (Some(p), Some(n)) = (prev, next) else {
        return false;
    };
    match mark {
        '\'' | '-' | '_' | '.' => p.is_alphanumeric() && n.is_alphanumeric(),
        ',' | ':' => p.is_ascii_digit() && n.is_ascii_digit(),
        _ => false,
    }
}

fn flush_word(word: &mut String, tokens: &mut Vec<String>) {
    if word.is_empty() {
        return;
    }
    let word = std::mem::take(word);
    tokens.extend(split_clitic(&word));
}

fn split_clitic(word: &str) -> Vec<String> {
    let lower = word.to_lowercase();
    if lower.len() > 3 && lower.ends_with("n't") {
        let cut = word.len() - 3;
        if word.is_char_boundary(cut) {
            return vec![word[..cut].to_string(), word[cut..].to_string()];
        }
    }
    for clitic in CLITICS {
        if lower.len() > clitic.len() && lower.ends_with(clitic) {
            let cut = word.len() - clitic.len();
            if word.is_char_boundary(cut) {
                return vec![word[..cut].to_string(), word[cut..].to_string()];
            }
        }
    }
    vec![word.to_string()]
}
