// Text analysis service - Tokenize a sentence and tag each token
use crate::application::tagger::PerceptronTagger;
use crate::application::tokenizer::{TokenizeError, WordTokenizer};
use crate::domain::text::TokenizationResult;
use std::sync::Arc;

#[derive(Clone)]
pub struct TextAnalysisService {
    tokenizer: WordTokenizer,
    tagger: Arc<PerceptronTagger>,
}

impl TextAnalysisService {
    pub fn new(tokenizer: WordTokenizer, tagger: Arc<PerceptronTagger>) -> Self {
        Self { tokenizer, tagger }
    }

    pub fn analyze(&self, sentence: &str) -> Result<TokenizationResult, TokenizeError> {
        let tokens = self.tokenizer.tokenize(sentence)?;
        let tagged = self.tagger.tag(tokens.as_slice());
        tracing::debug!("Tagged {} tokens", tagged.len());
        Ok(TokenizationResult::new(sentence.to_string(), tokens, tagged))
    }
}
