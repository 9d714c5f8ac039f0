use crate::api::SentimentLabel;

mod lexicon;

/// Polarity above which a text is positive
const POSITIVE_POLARITY_THRESHOLD: f64 = 0.1;
/// Polarity below which a text is negative
const NEGATIVE_POLARITY_THRESHOLD: f64 = -0.1;
/// Score given to texts without a clear opinion
pub const NEUTRAL_SCORE: f64 = 0.5;
/// How many tokens back a negator still flips an opinion word
const NEGATION_WINDOW: usize = 3;
/// Negated opinions are flipped and weakened
const NEGATION_FACTOR: f64 = -0.5;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sentiment {
    pub label: SentimentLabel,
    /// Normalized score in [0, 1], 0.5 is neutral
    pub score: f64,
    /// Raw polarity, absent when there was no text to analyze
    pub polarity: Option<f64>,
}

impl Sentiment {
    pub fn neutral() -> Self {
        Self {
            label: SentimentLabel::Neutral,
            score: NEUTRAL_SCORE,
            polarity: None,
        }
    }
}

#[derive(thiserror::Error, Debug)]
pub enum SentimentError {
    #[error("Polarity {0} is not a finite number")]
    NonFinitePolarity(f64),
}

/// Turns text into a polarity in [-1, 1]
pub trait PolarityAnalyzer: Send + Sync {
    /// Polarity of the text in [-1, 1]
    fn polarity(&self, text: &str) -> Result<f64, SentimentError>;
}

/// Lexicon based analyzer.
///
/// Every opinion word contributes its polarity, scaled by the intensifiers right before it
/// and flipped by a negator in the preceding few tokens. The text polarity is the mean of
/// the contributions.
#[derive(Debug, Default, Clone, Copy)]
pub struct LexiconPolarityAnalyzer;

impl PolarityAnalyzer for LexiconPolarityAnalyzer {
    fn polarity(&self, text: &str) -> Result<f64, SentimentError> {
        let tokens = tokenize(text);
        let mut contributions = Vec::new();

        for (idx, token) in tokens.iter().enumerate() {
            let Some(polarity) = lexicon::polarity_of(token) else {
                continue;
            };

            let intensity: f64 = tokens[..idx]
                .iter()
                .rev()
                .map_while(|previous| lexicon::intensity_of(previous))
                .product();

            let negated = tokens[idx.saturating_sub(NEGATION_WINDOW)..idx]
                .iter()
                .any(|previous| lexicon::is_negator(previous));

            let mut contribution = polarity * intensity;
            if negated {
                contribution *= NEGATION_FACTOR;
            }
            contributions.push(contribution.clamp(-1.0, 1.0));
        }

        if contributions.is_empty() {
            return Ok(0.0);
        }

        let polarity = contributions.iter().sum::<f64>() / contributions.len() as f64;
        if polarity.is_finite() {
            Ok(polarity.clamp(-1.0, 1.0))
        } else {
            Err(SentimentError::NonFinitePolarity(polarity))
        }
    }
}

/// Lower-cased words, apostrophes are kept inside words so "didn't" stays one token
fn tokenize(text: &str) -> Vec<String> {
    text.to_lowercase()
        .replace('\u{2019}', "'")
        .split(|c: char| !c.is_alphanumeric() && c != '\'')
        .map(|token| token.trim_matches('\''))
        .filter(|token| !token.is_empty())
        .map(str::to_string)
        .collect()
}

/// Maps the analyzer polarity onto a label and a score in [0, 1]
pub struct SentimentScorer {
    analyzer: Box<dyn PolarityAnalyzer>,
}

impl Default for SentimentScorer {
    fn default() -> Self {
        Self::new(Box::new(LexiconPolarityAnalyzer))
    }
}

impl SentimentScorer {
    pub fn new(analyzer: Box<dyn PolarityAnalyzer>) -> Self {
        Self { analyzer }
    }

    /// Never fails, analyzer errors end up as neutral sentiment.
    /// Only missing or empty text skips the analyzer.
    pub fn analyze(&self, text: Option<&str>) -> Sentiment {
        let Some(text) = text.filter(|t| !t.is_empty()) else {
            return Sentiment::neutral();
        };

        match self.analyzer.polarity(text) {
            Ok(polarity) => sentiment_from_polarity(polarity),
            Err(err) => {
                tracing::error!("Sentiment analysis error: {}", err);
                Sentiment::neutral()
            }
        }
    }
}

pub fn sentiment_from_polarity(polarity: f64) -> Sentiment {
    if polarity > POSITIVE_POLARITY_THRESHOLD {
        Sentiment {
            label: SentimentLabel::Positive,
            score: (polarity + 1.0) / 2.0,
            polarity: Some(polarity),
        }
    } else if polarity < NEGATIVE_POLARITY_THRESHOLD {
        Sentiment {
            label: SentimentLabel::Negative,
            score: (polarity + 1.0) / 2.0,
            polarity: Some(polarity),
        }
    } else {
        Sentiment {
            label: SentimentLabel::Neutral,
            score: NEUTRAL_SCORE,
            polarity: Some(polarity),
        }
    }
}

#[cfg(test)]
mod sentiment_tests {
    use super::*;

    struct FailingAnalyzer;

    impl PolarityAnalyzer for FailingAnalyzer {
        fn polarity(&self, _text: &str) -> Result<f64, SentimentError> {
            Err(SentimentError::NonFinitePolarity(f64::NAN))
        }
    }

    struct FixedAnalyzer(f64);

    impl PolarityAnalyzer for FixedAnalyzer {
        fn polarity(&self, _text: &str) -> Result<f64, SentimentError> {
            Ok(self.0)
        }
    }

    #[test]
    fn empty_or_missing_text_is_neutral_without_polarity() {
        let scorer = SentimentScorer::default();
        assert_eq!(scorer.analyze(None), Sentiment::neutral());
        assert_eq!(scorer.analyze(Some("")), Sentiment::neutral());
    }

    #[test]
    fn whitespace_text_is_analyzed_as_neutral() {
        let sentiment = SentimentScorer::default().analyze(Some("   "));
        assert_eq!(sentiment.label, SentimentLabel::Neutral);
        assert_eq!(sentiment.score, NEUTRAL_SCORE);
        assert_eq!(sentiment.polarity, Some(0.0));
    }

    #[test]
    fn analyzer_failure_is_neutral() {
        let scorer = SentimentScorer::new(Box::new(FailingAnalyzer));
        assert_eq!(scorer.analyze(Some("great")), Sentiment::neutral());
    }

    #[test]
    fn polarity_maps_to_label_and_score() {
        for polarity in [0.11, 0.3, 0.75, 1.0] {
            let sentiment = sentiment_from_polarity(polarity);
            assert_eq!(sentiment.label, SentimentLabel::Positive);
            assert!(sentiment.score > 0.55 && sentiment.score <= 1.0);
            assert_eq!(sentiment.polarity, Some(polarity));
        }
        for polarity in [-0.11, -0.5, -1.0] {
            let sentiment = sentiment_from_polarity(polarity);
            assert_eq!(sentiment.label, SentimentLabel::Negative);
            assert!(sentiment.score >= 0.0 && sentiment.score < 0.45);
        }
        for polarity in [-0.1, 0.0, 0.1] {
            let sentiment = sentiment_from_polarity(polarity);
            assert_eq!(sentiment.label, SentimentLabel::Neutral);
            assert_eq!(sentiment.score, NEUTRAL_SCORE);
        }
    }

    #[test]
    fn scorer_uses_analyzer_polarity() {
        let scorer = SentimentScorer::new(Box::new(FixedAnalyzer(0.5)));
        let sentiment = scorer.analyze(Some("anything"));
        assert_eq!(sentiment.label, SentimentLabel::Positive);
        assert!((sentiment.score - 0.75).abs() < 1e-9);
    }

    #[test]
    fn lexicon_recognizes_opinions() {
        let analyzer = LexiconPolarityAnalyzer;

        let loved = analyzer
            .polarity("I loved this book, it was wonderful")
            .unwrap();
        assert!((loved - 0.85).abs() < 1e-9);

        assert!(analyzer.polarity("Terrible and boring.").unwrap() < -0.9);
        assert_eq!(analyzer.polarity("The book has 300 pages").unwrap(), 0.0);
    }

    #[test]
    fn lexicon_handles_negation_and_intensifiers() {
        let analyzer = LexiconPolarityAnalyzer;

        let good = analyzer.polarity("good").unwrap();
        let very_good = analyzer.polarity("very good").unwrap();
        let not_good = analyzer.polarity("not good").unwrap();
        let did_not_enjoy = analyzer.polarity("I didn\u{2019}t enjoy it").unwrap();

        assert!(very_good > good);
        assert!((not_good - (-0.35)).abs() < 1e-9);
        assert!(did_not_enjoy < 0.0);
        assert!(analyzer.polarity("not very good").unwrap() < 0.0);
        assert!(analyzer.polarity("absolutely perfect").unwrap() <= 1.0);
    }

    #[test]
    fn example_review_is_positive() {
        let sentiment =
            SentimentScorer::default().analyze(Some("I loved this book, it was wonderful"));
        assert_eq!(sentiment.label, SentimentLabel::Positive);
        assert!((sentiment.score - 0.925).abs() < 1e-9);
    }
}
