// Text analysis domain models
use serde::{Deserialize, Serialize};

/// A token paired with its part-of-speech tag; serializes as `[token, tag]`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaggedToken(pub String, pub String);

impl TaggedToken {
    pub fn new(token: impl Into<String>, tag: impl Into<String>) -> Self {
        Self(token.into(), tag.into())
    }

    pub fn token(&self) -> &str {
        &self.0
    }

    pub fn tag(&self) -> &str {
        &self.1
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TokenizationResult {
    pub sentence: String,
    pub tokens: Vec<String>,
    pub tagged: Vec<TaggedToken>,
}

impl TokenizationResult {
    pub fn new(sentence: String, tokens: Vec<String>, tagged: Vec<TaggedToken>) -> Self {
        Self {
            sentence,
            tokens,
            tagged,
        }
    }
}
