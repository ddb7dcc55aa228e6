//! Placeholder prose driven by the seeded sampler.
//!
//! Every word, sentence length and paragraph length is a sampler draw, so
//! the text is part of the reproducible stream.

use crate::sample::Sampler;

const WORDS: [&str; 64] = [
    "ad", "adipisicing", "aliqua", "aliquip", "amet", "anim", "aute", "cillum",
    "commodo", "consectetur", "consequat", "culpa", "cupidatat", "deserunt", "do", "dolor",
    "dolore", "duis", "ea", "eiusmod", "elit", "enim", "esse", "est",
    "et", "eu", "ex", "excepteur", "exercitation", "fugiat", "id", "in",
    "incididunt", "ipsum", "irure", "labore", "laboris", "laborum", "Lorem", "magna",
    "minim", "mollit", "nisi", "non", "nostrud", "nulla", "occaecat", "officia",
    "pariatur", "proident", "qui", "quis", "reprehenderit", "sint", "sit", "sunt",
    "tempor", "ullamco", "ut", "velit", "veniam", "voluptate", "voluptas", "labor",
];

/// Lorem-ipsum generator with fixed sentence and paragraph bounds.
#[derive(Debug, Clone, Copy)]
pub struct Lorem {
    /// Inclusive words-per-sentence range
    pub words_per_sentence: (usize, usize),

    /// Inclusive sentences-per-paragraph range
    pub sentences_per_paragraph: (usize, usize),
}

impl Default for Lorem {
    fn default() -> Self {
        Self {
            words_per_sentence: (4, 16),
            sentences_per_paragraph: (4, 8),
        }
    }
}

impl Lorem {
    /// Uniform integer in `[min, max]` (floor-based, unlike `Sampler::random_int`).
    fn between(sampler: &mut Sampler, (min, max): (usize, usize)) -> usize {
        let span = max.saturating_sub(min) + 1;
        min + ((sampler.random() * span as f64).floor() as usize).min(span - 1)
    }

    /// One word.
    pub fn word(&self, sampler: &mut Sampler) -> &'static str {
        let index = (sampler.random() * WORDS.len() as f64).floor() as usize;
        WORDS[index.min(WORDS.len() - 1)]
    }

    /// `count` words separated by spaces.
    pub fn words(&self, sampler: &mut Sampler, count: usize) -> String {
        (0..count)
            .map(|_| self.word(sampler))
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// A capitalized sentence ending in a period.
    pub fn sentence(&self, sampler: &mut Sampler) -> String {
        let count = Self::between(sampler, self.words_per_sentence);
        let words = self.words(sampler, count);
        let mut chars = words.chars();
        match chars.next() {
            Some(first) => format!("{}{}.", first.to_uppercase(), chars.as_str()),
            None => String::new(),
        }
    }

    /// `count` sentences separated by spaces.
    pub fn sentences(&self, sampler: &mut Sampler, count: usize) -> String {
        (0..count)
            .map(|_| self.sentence(sampler))
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// One paragraph.
    pub fn paragraph(&self, sampler: &mut Sampler) -> String {
        let count = Self::between(sampler, self.sentences_per_paragraph);
        self.sentences(sampler, count)
    }

    /// `count` paragraphs separated by newlines.
    pub fn paragraphs(&self, sampler: &mut Sampler, count: usize) -> String {
        (0..count)
            .map(|_| self.paragraph(sampler))
            .collect::<Vec<_>>()
            .join("\n")
    }
}
