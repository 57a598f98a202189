// Part-of-speech tagger - Averaged perceptron over Penn Treebank tags
use crate::domain::text::TaggedToken;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::{BTreeSet, HashMap};

const START: [&str; 2] = ["-START-", "-START2-"];
const END: [&str; 2] = ["-END-", "-END2-"];

type Features = HashMap<String, f64>;

#[derive(Debug, thiserror::Error)]
pub enum TaggerError {
    #[error("line {line}: token '{token}' is not in word/TAG form")]
    MalformedToken { line: usize, token: String },
    #[error("training corpus is empty")]
    EmptyCorpus,
    #[error("tagger model is invalid: {0}")]
    InvalidModel(#[from] serde_json::Error),
}

/// Tag dictionary and training knobs
#[derive(Debug, Clone, Copy)]
pub struct TrainingOptions {
    pub iterations: usize,
    /// Words seen fewer times than this never enter the tag dictionary
    pub min_frequency: u32,
    /// Share of occurrences the dominant tag needs for dictionary entry
    pub ambiguity_threshold: f64,
}

impl Default for TrainingOptions {
    fn default() -> Self {
        Self {
            iterations: 5,
            min_frequency: 2,
            ambiguity_threshold: 0.97,
        }
    }
}

/// Serialized form of a trained tagger
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TaggerModel {
    pub weights: HashMap<String, HashMap<String, f64>>,
    pub tagdict: HashMap<String, String>,
    pub classes: Vec<String>,
}

pub type TaggedSentence = Vec<(String, String)>;

#[derive(Debug, Default)]
struct AveragedPerceptron {
    weights: HashMap<String, HashMap<String, f64>>,
    classes: BTreeSet<String>,
    totals: HashMap<(String, String), f64>,
    tstamps: HashMap<(String, String), u64>,
    instances: u64,
}

impl AveragedPerceptron {
    fn predict(&self, features: &Features) -> String {
        let mut scores: HashMap<&str, f64> = HashMap::new();
        for (feature, value) in features {
            if *value == 0.0 {
                continue;
            }
            if let Some(weights) = self.weights.get(feature) {
                for (label, weight) in weights {
                    *scores.entry(label.as_str()).or_default() += value * weight;
                }
            }
        }

        // ties resolve to the lexically greatest label
        self.classes
            .iter()
            .map(|label| (label, scores.get(label.as_str()).copied().unwrap_or(0.0)))
            .max_by(|a, b| {
                a.1.partial_cmp(&b.1)
                    .unwrap_or(Ordering::Equal)
                    .then_with(|| a.0.cmp(b.0))
            })
            .map(|(label, _)| label.clone())
            .unwrap_or_default()
    }

    fn update(&mut self, truth: &str, guess: &str, features: &Features) {
        self.instances += 1;
        if truth == guess {
            return;
        }
        for feature in features.keys() {
            self.update_feature(truth, feature, 1.0);
            self.update_feature(guess, feature, -1.0);
        }
    }

    fn update_feature(&mut self, class: &str, feature: &str, delta: f64) {
        let key = (feature.to_string(), class.to_string());
        let weight = self
            .weights
            .entry(feature.to_string())
            .or_default()
            .entry(class.to_string())
            .or_default();
        let since = self.instances - self.tstamps.get(&key).copied().unwrap_or(0);
        *self.totals.entry(key.clone()).or_default() += since as f64 * *weight;
        *weight += delta;
        self.tstamps.insert(key, self.instances);
    }

    fn average_weights(&mut self) {
        let instances = self.instances.max(1) as f64;
        for (feature, weights) in self.weights.iter_mut() {
            weights.retain(|class, weight| {
                let key = (feature.clone(), class.clone());
                let total = self.totals.get(&key).copied().unwrap_or(0.0)
                    + (self.instances - self.tstamps.get(&key).copied().unwrap_or(0)) as f64 * *weight;
                let averaged = (total / instances * 1000.0).round() / 1000.0;
                *weight = averaged;
                averaged != 0.0
            });
        }
        self.weights.retain(|_, weights| !weights.is_empty());
    }
}

/// Greedy left-to-right averaged perceptron tagger
#[derive(Debug, Default)]
pub struct PerceptronTagger {
    model: AveragedPerceptron,
    tagdict: HashMap<String, String>,
}

impl PerceptronTagger {
    pub fn from_model(model: TaggerModel) -> Self {
        Self {
            model: AveragedPerceptron {
                weights: model.weights,
                classes: model.classes.into_iter().collect(),
                ..Default::default()
            },
            tagdict: model.tagdict,
        }
    }

    pub fn to_model(&self) -> TaggerModel {
        TaggerModel {
            weights: self.model.weights.clone(),
            tagdict: self.tagdict.clone(),
            classes: self.model.classes.iter().cloned().collect(),
        }
    }

    /// Train a tagger from tagged sentences.
    ///
    /// Sentence order is rotated each iteration instead of shuffled, so the
    /// same corpus always produces the same weights.
    pub fn train(sentences: &[TaggedSentence], options: TrainingOptions) -> Result<Self, TaggerError> {
        if sentences.iter().all(|s| s.is_empty()) {
            return Err(TaggerError::EmptyCorpus);
        }

        let mut tagger = Self::default();
        tagger.build_tagdict(sentences, options);

        let count = sentences.len();
        for iteration in 0..options.iterations {
            let mut correct = 0usize;
            let mut total = 0usize;

            for offset in 0..count {
                let sentence = &sentences[(offset + iteration) % count];
                let words: Vec<&str> = sentence.iter().map(|(w, _)| w.as_str()).collect();
                let context = build_context(&words);

                let mut prev = START[0].to_string();
                let mut prev2 = START[1].to_string();
                for (i, (word, truth)) in sentence.iter().enumerate() {
                    let guess = match tagger.lookup(word) {
                        Some(tag) => tag.to_string(),
                        None => {
                            let features = extract_features(i + START.len(), word, &context, &prev, &prev2);
                            let guess = tagger.model.predict(&features);
                            tagger.model.update(truth, &guess, &features);
                            guess
                        }
                    };
                    if &guess == truth {
                        correct += 1;
                    }
                    total += 1;
                    prev2 = std::mem::replace(&mut prev, guess);
                }
            }

            tracing::debug!(
                "Tagger iteration {}: {}/{} correct",
                iteration + 1,
                correct,
                total
            );
        }

        tagger.model.average_weights();
        tagger.model.totals.clear();
        tagger.model.tstamps.clear();
        Ok(tagger)
    }

    pub fn tag<S: AsRef<str>>(&self, tokens: &[S]) -> Vec<TaggedToken> {
        let words: Vec<&str> = tokens.iter().map(|t| t.as_ref()).collect();
        let context = build_context(&words);

        let mut tagged = Vec::with_capacity(words.len());
        let mut prev = START[0].to_string();
        let mut prev2 = START[1].to_string();
        for (i, word) in words.iter().enumerate() {
            let tag = match self.lookup(word) {
                Some(tag) => tag.to_string(),
                None => {
                    let features = extract_features(i + START.len(), word, &context, &prev, &prev2);
                    self.model.predict(&features)
                }
            };
            tagged.push(TaggedToken::new(*word, tag.clone()));
            prev2 = std::mem::replace(&mut prev, tag);
        }
        tagged
    }

    pub fn classes(&self) -> impl Iterator<Item = &str> {
        self.model.classes.iter().map(String::as_str)
    }

    fn lookup(&self, word: &str) -> Option<&str> {
        self.tagdict
            .get(word)
            .or_else(|| self.tagdict.get(&word.to_lowercase()))
            .map(String::as_str)
    }

    fn build_tagdict(&mut self, sentences: &[TaggedSentence], options: TrainingOptions) {
        let mut counts: HashMap<&str, HashMap<&str, u32>> = HashMap::new();
        for (word, tag) in sentences.iter().flatten() {
            *counts.entry(word.as_str()).or_default().entry(tag.as_str()).or_default() += 1;
            self.model.classes.insert(tag.clone());
        }

        for (word, tag_freqs) in counts {
            let n: u32 = tag_freqs.values().sum();
            let Some((tag, mode)) = tag_freqs
                .into_iter()
                .max_by(|a, b| a.1.cmp(&b.1).then_with(|| b.0.cmp(&a.0)))
            else {
                continue;
            };
            if n >= options.min_frequency && f64::from(mode) / f64::from(n) >= options.ambiguity_threshold {
                self.tagdict.insert(word.to_string(), tag.to_string());
            }
        }
    }
}

/// Parse a corpus of one sentence per line, tokens written as `word/TAG`.
/// Blank lines and lines starting with `#` are skipped.
pub fn parse_tagged_corpus(text: &str) -> Result<Vec<TaggedSentence>, TaggerError> {
    let mut sentences = Vec::new();
    for (index, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let sentence = line
            .split_whitespace()
            .map(|token| match token.rsplit_once('/') {
                Some((word, tag)) if !word.is_empty() && !tag.is_empty() => {
                    Ok((word.to_string(), tag.to_string()))
                }
                _ => Err(TaggerError::MalformedToken {
                    line: index + 1,
                    token: token.to_string(),
                }),
            })
            .collect::<Result<TaggedSentence, _>>()?;
        sentences.push(sentence);
    }
    Ok(sentences)
}

fn normalize(word: &str) -> String {
    let first = word.chars().next();
    if word.contains('-') && first != Some('-') {
        "!HYPHEN".to_string()
    } else if word.chars().count() == 4 && word.chars().all(|c| c.is_ascii_digit()) {
        "!YEAR".to_string()
    } else if first.is_some_and(|c| c.is_ascii_digit()) {
        "!DIGITS".to_string()
    } else {
        word.to_lowercase()
    }
}

fn build_context(words: &[&str]) -> Vec<String> {
    START
        .iter()
        .map(|s| s.to_string())
        .chain(words.iter().map(|w| normalize(w)))
        .chain(END.iter().map(|s| s.to_string()))
        .collect()
}

fn suffix(word: &str, n: usize) -> &str {
    match word.char_indices().rev().nth(n.saturating_sub(1)) {
        Some((idx, _)) if n > 0 => &word[idx..],
        _ => word,
    }
}

fn extract_features(i: usize, word: &str, context: &[String], prev: &str, prev2: &str) -> Features {
    let mut features = Features::new();
    let mut add = |parts: &[&str]| {
        *features.entry(parts.join(" ")).or_default() += 1.0;
    };

    let first: String = word.chars().take(1).collect();
    add(&["bias"]);
    add(&["i suffix", suffix(word, 3)]);
    add(&["i pref1", first.as_str()]);
    add(&["i-1 tag", prev]);
    add(&["i-2 tag", prev2]);
    add(&["i tag+i-2 tag", prev, prev2]);
    add(&["i word", context[i].as_str()]);
    add(&["i-1 tag+i word", prev, context[i].as_str()]);
    add(&["i-1 word", context[i - 1].as_str()]);
    add(&["i-1 suffix", suffix(&context[i - 1], 3)]);
    add(&["i-2 word", context[i - 2].as_str()]);
    add(&["i+1 word", context[i + 1].as_str()]);
    add(&["i+1 suffix", suffix(&context[i + 1], 3)]);
    add(&["i+2 word", context[i + 2].as_str()]);
    features
}
