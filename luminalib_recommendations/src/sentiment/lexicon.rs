use std::collections::HashMap;

use once_cell::sync::Lazy;

/// Polarity of opinion words, in [-1, 1]
const POLARITIES: &[(&str, f64)] = &[
    // positive
    ("amazing", 0.6),
    ("awesome", 1.0),
    ("beautiful", 0.85),
    ("beautifully", 0.85),
    ("best", 1.0),
    ("better", 0.5),
    ("brilliant", 0.9),
    ("captivating", 0.6),
    ("charming", 0.5),
    ("clever", 0.5),
    ("compelling", 0.5),
    ("delightful", 0.7),
    ("elegant", 0.6),
    ("engaging", 0.5),
    ("enjoy", 0.4),
    ("enjoyable", 0.5),
    ("enjoyed", 0.4),
    ("entertaining", 0.5),
    ("excellent", 1.0),
    ("exciting", 0.3),
    ("fantastic", 0.4),
    ("fascinating", 0.6),
    ("favorite", 0.5),
    ("favourite", 0.5),
    ("fresh", 0.3),
    ("fun", 0.3),
    ("funny", 0.25),
    ("glad", 0.5),
    ("good", 0.7),
    ("great", 0.8),
    ("gripping", 0.5),
    ("happy", 0.8),
    ("heartwarming", 0.6),
    ("impressive", 1.0),
    ("incredible", 0.9),
    ("insightful", 0.6),
    ("inspiring", 0.6),
    ("interesting", 0.5),
    ("liked", 0.6),
    ("love", 0.5),
    ("loved", 0.7),
    ("lovely", 0.5),
    ("masterpiece", 0.8),
    ("memorable", 0.5),
    ("moving", 0.5),
    ("nice", 0.6),
    ("original", 0.4),
    ("outstanding", 0.5),
    ("perfect", 1.0),
    ("pleasant", 0.7),
    ("powerful", 0.3),
    ("recommend", 0.4),
    ("recommended", 0.4),
    ("rich", 0.375),
    ("riveting", 0.6),
    ("satisfying", 0.5),
    ("solid", 0.3),
    ("stunning", 0.5),
    ("superb", 1.0),
    ("thoughtful", 0.4),
    ("touching", 0.5),
    ("unique", 0.4),
    ("vivid", 0.5),
    ("wonderful", 1.0),
    ("wonderfully", 1.0),
    ("worth", 0.3),
    ("worthwhile", 0.5),
    // negative
    ("annoying", -0.8),
    ("awful", -1.0),
    ("bad", -0.7),
    ("bland", -0.5),
    ("boring", -1.0),
    ("clumsy", -0.3),
    ("confusing", -0.3),
    ("disappointed", -0.75),
    ("disappointing", -0.6),
    ("dislike", -0.6),
    ("disliked", -0.6),
    ("dreadful", -1.0),
    ("dull", -0.3),
    ("flat", -0.25),
    ("forgettable", -0.5),
    ("hate", -0.8),
    ("hated", -0.9),
    ("horrible", -1.0),
    ("lousy", -0.6),
    ("mediocre", -0.3),
    ("messy", -0.3),
    ("overrated", -0.4),
    ("painful", -0.7),
    ("pointless", -0.5),
    ("poor", -0.4),
    ("poorly", -0.4),
    ("predictable", -0.2),
    ("sad", -0.5),
    ("shallow", -0.25),
    ("silly", -0.5),
    ("slow", -0.3),
    ("stupid", -0.8),
    ("tedious", -0.5),
    ("terrible", -1.0),
    ("tiresome", -0.5),
    ("ugly", -0.7),
    ("unbearable", -0.8),
    ("unconvincing", -0.5),
    ("unreadable", -0.6),
    ("waste", -0.2),
    ("wasted", -0.2),
    ("weak", -0.375),
    ("worse", -0.4),
    ("worst", -1.0),
];

/// Multipliers applied to the opinion word that directly follows
const INTENSIFIERS: &[(&str, f64)] = &[
    ("absolutely", 1.5),
    ("barely", 0.5),
    ("extremely", 1.5),
    ("fairly", 0.8),
    ("highly", 1.3),
    ("incredibly", 1.5),
    ("quite", 1.1),
    ("rather", 0.8),
    ("really", 1.3),
    ("slightly", 0.5),
    ("somewhat", 0.7),
    ("super", 1.3),
    ("totally", 1.3),
    ("truly", 1.3),
    ("utterly", 1.5),
    ("very", 1.3),
];

const NEGATORS: &[&str] = &[
    "cannot", "hardly", "neither", "never", "no", "nor", "not", "nothing", "without",
];

static POLARITY_LEXICON: Lazy<HashMap<&'static str, f64>> =
    Lazy::new(|| POLARITIES.iter().cloned().collect());

static INTENSIFIER_LEXICON: Lazy<HashMap<&'static str, f64>> =
    Lazy::new(|| INTENSIFIERS.iter().cloned().collect());

pub(crate) fn polarity_of(word: &str) -> Option<f64> {
    POLARITY_LEXICON.get(word).copied()
}

pub(crate) fn intensity_of(word: &str) -> Option<f64> {
    INTENSIFIER_LEXICON.get(word).copied()
}

pub(crate) fn is_negator(word: &str) -> bool {
    NEGATORS.contains(&word) || word.ends_with("n't")
}
