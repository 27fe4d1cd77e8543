//! Lexical cue predicates over sentence tokens
//!
//! A `Lexicon` is built once per process and shared read-only (usually
//! behind an `Arc`) by every document being classified.

use regex_lite::Regex;
use std::collections::HashSet;

/// First token of a numbered section header, e.g. "3.2" or "4.1Results"
pub const HEADER_PATTERN: &str = r"^\d+\.\d+.*$";

const DETERMINERS: &[&str] = &[
    "this", "that", "these", "those", "such", "the", "their", "its", "his", "her",
    "our", "both", "each", "said",
];

const WORK_NOUNS: &[&str] = &[
    "work", "paper", "approach", "method", "model", "algorithm", "system", "technique",
    "framework", "study", "analysis", "tagger", "parser", "corpus", "experiment",
    "result", "implementation", "toolkit", "procedure", "formalism", "measure",
    "metric", "classifier", "strategy", "scheme", "methodology",
];

const THIRD_PERSON_PRONOUNS: &[&str] = &[
    "he", "she", "they", "them", "their", "his", "her", "hers", "theirs",
];

const CONNECTORS: &[&str] = &[
    "however", "moreover", "furthermore", "additionally", "also", "thus", "therefore",
    "hence", "consequently", "similarly", "likewise", "nevertheless", "nonetheless",
    "although", "though", "but", "instead", "then", "finally", "besides", "accordingly",
    "meanwhile", "specifically", "indeed",
];

/// Immutable word lists plus the predicates built on them
#[derive(Debug, Clone)]
pub struct Lexicon {
    determiners: HashSet<String>,
    work_nouns: HashSet<String>,
    third_person_pronouns: HashSet<String>,
    connectors: HashSet<String>,
    header: Regex,
}

impl Default for Lexicon {
    fn default() -> Self {
        Self::from_lists(DETERMINERS, WORK_NOUNS, THIRD_PERSON_PRONOUNS, CONNECTORS)
    }
}

impl Lexicon {
    /// Build a lexicon from caller-supplied word lists
    pub fn from_lists<S: AsRef<str>>(
        determiners: &[S],
        work_nouns: &[S],
        third_person_pronouns: &[S],
        connectors: &[S],
    ) -> Self {
        fn to_set<S: AsRef<str>>(words: &[S]) -> HashSet<String> {
            words.iter().map(|w| w.as_ref().trim().to_string()).filter(|w| !w.is_empty()).collect()
        }

        Self {
            determiners: to_set(determiners),
            work_nouns: to_set(work_nouns),
            third_person_pronouns: to_set(third_person_pronouns),
            connectors: to_set(connectors),
            header: Regex::new(HEADER_PATTERN).expect("header pattern is valid"),
        }
    }

    /// Plural-insensitive, case-insensitive list membership
    fn loose_contains(list: &HashSet<String>, word: &str) -> bool {
        let exact = |w: &str| list.contains(w) || list.contains(&w.to_lowercase());
        exact(word) || word.strip_suffix('s').is_some_and(exact)
    }

    pub fn is_determiner(&self, word: &str) -> bool {
        Self::loose_contains(&self.determiners, word)
    }

    pub fn is_work_noun(&self, word: &str) -> bool {
        Self::loose_contains(&self.work_nouns, word)
    }

    /// Any token mentions the author, directly or with diacritics folded away
    pub fn contains_main_author(&self, words: &[String], main_author: &str) -> bool {
        if main_author.is_empty() {
            return false;
        }
        let folded = fold_to_ascii(main_author);
        words.iter().any(|w| {
            w.contains(main_author) || (!folded.is_empty() && w.contains(folded.as_str()))
        })
    }

    pub fn contains_acronyms(&self, words: &[String], acronyms: &HashSet<String>) -> bool {
        words.iter().any(|w| {
            acronyms.iter().any(|a| !a.is_empty() && w.contains(a.as_str()))
        })
    }

    /// Hooks are matched against the raw sentence, ignoring case
    pub fn contains_lexical_hooks(&self, sentence: &str, hooks: &HashSet<String>) -> bool {
        let sentence = sentence.to_lowercase();
        hooks
            .iter()
            .any(|h| !h.is_empty() && sentence.contains(&h.to_lowercase()))
    }

    pub fn starts_with_section_header(&self, words: &[String]) -> bool {
        words.first().is_some_and(|w| self.header.is_match(w))
    }

    pub fn starts_with_connector(&self, words: &[String]) -> bool {
        words.first().is_some_and(|w| Self::loose_contains(&self.connectors, w))
    }

    /// A determiner immediately followed by a work noun, anywhere in the sentence
    pub fn contains_det_work(&self, words: &[String]) -> bool {
        words
            .windows(2)
            .any(|pair| self.is_determiner(&pair[0]) && self.is_work_noun(&pair[1]))
    }

    pub fn starts_with_det_work(&self, words: &[String]) -> bool {
        words.len() >= 2 && self.is_determiner(&words[0]) && self.is_work_noun(&words[1])
    }

    pub fn starts_with_third_person_pronoun(&self, words: &[String]) -> bool {
        words
            .first()
            .is_some_and(|w| Self::loose_contains(&self.third_person_pronouns, w))
    }

    pub fn starts_with_det(&self, words: &[String]) -> bool {
        words.first().is_some_and(|w| self.is_determiner(w))
    }

    /// Leading "It" as an anaphoric reference to the previous sentence
    pub fn starts_with_it(&self, words: &[String]) -> bool {
        words.first().is_some_and(|w| w == "It")
    }
}

/// Replace Latin diacritics and ligatures with their ASCII spelling and
/// drop any remaining non-ASCII characters
pub fn fold_to_ascii(text: &str) -> String {
    let mut folded = String::with_capacity(text.len());
    for c in text.chars() {
        if c.is_ascii() {
            folded.push(c);
            continue;
        }
        let replacement = match c {
            'à' | 'á' | 'â' | 'ã' | 'ä' | 'å' | 'ā' | 'ă' | 'ą' => "a",
            'À' | 'Á' | 'Â' | 'Ã' | 'Ä' | 'Å' | 'Ā' | 'Ă' | 'Ą' => "A",
            'æ' => "ae",
            'Æ' => "AE",
            'ç' | 'ć' | 'č' | 'ĉ' | 'ċ' => "c",
            'Ç' | 'Ć' | 'Č' | 'Ĉ' | 'Ċ' => "C",
            'ď' | 'đ' | 'ð' => "d",
            'Ď' | 'Đ' | 'Ð' => "D",
            'è' | 'é' | 'ê' | 'ë' | 'ē' | 'ė' | 'ę' | 'ě' | 'ĕ' => "e",
            'È' | 'É' | 'Ê' | 'Ë' | 'Ē' | 'Ė' | 'Ę' | 'Ě' | 'Ĕ' => "E",
            'ğ' | 'ģ' | 'ĝ' | 'ġ' => "g",
            'Ğ' | 'Ģ' | 'Ĝ' | 'Ġ' => "G",
            'ì' | 'í' | 'î' | 'ï' | 'ī' | 'į' | 'ı' => "i",
            'Ì' | 'Í' | 'Î' | 'Ï' | 'Ī' | 'Į' | 'İ' => "I",
            'ķ' => "k",
            'Ķ' => "K",
            'ł' | 'ľ' | 'ĺ' | 'ļ' => "l",
            'Ł' | 'Ľ' | 'Ĺ' | 'Ļ' => "L",
            'ñ' | 'ń' | 'ň' | 'ņ' => "n",
            'Ñ' | 'Ń' | 'Ň' | 'Ņ' => "N",
            'ò' | 'ó' | 'ô' | 'õ' | 'ö' | 'ō' | 'ő' | 'ø' => "o",
            'Ò' | 'Ó' | 'Ô' | 'Õ' | 'Ö' | 'Ō' | 'Ő' | 'Ø' => "O",
            'œ' => "oe",
            'Œ' => "OE",
            'ř' | 'ŕ' => "r",
            'Ř' | 'Ŕ' => "R",
            'š' | 'ś' | 'ş' | 'ș' => "s",
            'Š' | 'Ś' | 'Ş' | 'Ș' => "S",
            'ß' => "ss",
            'ť' | 'ţ' | 'ț' => "t",
            'Ť' | 'Ţ' | 'Ț' => "T",
            'þ' => "th",
            'Þ' => "Th",
            'ù' | 'ú' | 'û' | 'ü' | 'ū' | 'ů' | 'ű' | 'ų' => "u",
            'Ù' | 'Ú' | 'Û' | 'Ü' | 'Ū' | 'Ů' | 'Ű' | 'Ų' => "U",
            'ý' | 'ÿ' => "y",
            'Ý' | 'Ÿ' => "Y",
            'ž' | 'ź' | 'ż' => "z",
            'Ž' | 'Ź' | 'Ż' => "Z",
            _ => "",
        };
        folded.push_str(replacement);
    }
    folded
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::text::split_words;

    fn words(s: &str) -> Vec<String> {
        split_words(s)
    }

    #[test]
    fn test_loose_membership() {
        let lexicon = Lexicon::default();
        assert!(lexicon.is_work_noun("methods"));
        assert!(lexicon.is_work_noun("Method"));
        assert!(lexicon.is_determiner("These"));
        assert!(!lexicon.is_work_noun("banana"));
    }

    #[test]
    fn test_main_author_folding() {
        let lexicon = Lexicon::default();
        assert!(lexicon.contains_main_author(&words("as in Schutze (1998)"), "Schütze"));
        assert!(lexicon.contains_main_author(&words("Collins's parser"), "Collins"));
        assert!(!lexicon.contains_main_author(&words("no mention here"), "Collins"));
        assert!(!lexicon.contains_main_author(&words("anything"), ""));
        assert!(lexicon.contains_main_author(&words("as Sogaard shows"), "Søgaard"));
    }

    #[test]
    fn test_fold_to_ascii() {
        assert_eq!(fold_to_ascii("Schütze"), "Schutze");
        assert_eq!(fold_to_ascii("Søgaard"), "Sogaard");
        assert_eq!(fold_to_ascii("Weißenborn"), "Weissenborn");
        assert_eq!(fold_to_ascii("Sæbø"), "Saebo");
        assert_eq!(fold_to_ascii("Gaussier\u{2013}Smith"), "GaussierSmith");
    }

    #[test]
    fn test_acronyms_and_hooks() {
        let lexicon = Lexicon::default();
        let acronyms: HashSet<String> = ["CRF".to_string()].into_iter().collect();
        let hooks: HashSet<String> = ["Penn Treebank".to_string()].into_iter().collect();

        assert!(lexicon.contains_acronyms(&words("A linear-chain CRFs model"), &acronyms));
        assert!(!lexicon.contains_acronyms(&words("A linear-chain model"), &acronyms));
        assert!(lexicon.contains_lexical_hooks("trained on the penn treebank data", &hooks));
        assert!(!lexicon.contains_lexical_hooks("trained on news", &hooks));
    }

    #[test]
    fn test_section_header() {
        let lexicon = Lexicon::default();
        assert!(lexicon.starts_with_section_header(&words("3.2 Experimental Setup")));
        assert!(!lexicon.starts_with_section_header(&words("In 3.2 we show")));
        assert!(!lexicon.starts_with_section_header(&words("32 results")));
        assert!(!lexicon.starts_with_section_header(&[]));
    }

    #[test]
    fn test_opening_cues() {
        let lexicon = Lexicon::default();
        assert!(lexicon.starts_with_connector(&words("However, it fails on long inputs.")));
        assert!(lexicon.contains_det_work(&words("We extend this approach to trees.")));
        assert!(lexicon.starts_with_det_work(&words("This method is fast.")));
        assert!(lexicon.starts_with_third_person_pronoun(&words("They report gains.")));
        assert!(lexicon.starts_with_det(&words("Such results are rare.")));
        assert!(lexicon.starts_with_it(&words("It uses a lattice.")));
        assert!(!lexicon.starts_with_it(&words("it uses a lattice.")));
    }

    #[test]
    fn test_empty_tokens_never_match() {
        let lexicon = Lexicon::default();
        let empty: Vec<String> = Vec::new();
        assert!(!lexicon.starts_with_connector(&empty));
        assert!(!lexicon.contains_det_work(&empty));
        assert!(!lexicon.starts_with_third_person_pronoun(&empty));
        assert!(!lexicon.starts_with_det(&empty));
    }
}
