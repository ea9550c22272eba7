use tracing::debug;

use crate::lexicon::{Lexicon, LexiconCategory};
use crate::normalize::normalize;
use crate::verdict::ClassificationResult;

/// Classify raw ingredient tokens against the built-in lexicon.
///
/// See [`classify_with`] for the decision rules.
pub fn classify<I, S>(ingredients: I) -> ClassificationResult
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    classify_with(Lexicon::builtin(), ingredients)
}

/// Classify raw ingredient tokens against `lexicon`.
///
/// Every token is normalized before lookup. A forbidden match anywhere wins
/// immediately. Otherwise a possibly-derived match makes the result
/// indeterminate. An empty sequence is compliant: it means no ingredients were
/// provided, not that the product was verified.
pub fn classify_with<I, S>(lexicon: &Lexicon, ingredients: I) -> ClassificationResult
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut possibly_derived_seen = false;

    for raw in ingredients {
        let name = normalize(raw.as_ref());
        match lexicon.lookup(&name) {
            Some(LexiconCategory::Forbidden) => {
                debug!(ingredient = %name, "forbidden_ingredient");
                return ClassificationResult::NonCompliant;
            }
            Some(LexiconCategory::PossiblyDerived) => {
                // Keep scanning: a later token may still be forbidden.
                if !possibly_derived_seen {
                    debug!(ingredient = %name, "possibly_derived_ingredient");
                }
                possibly_derived_seen = true;
            }
            None => {}
        }
    }

    if possibly_derived_seen {
        ClassificationResult::Indeterminate
    } else {
        ClassificationResult::Compliant
    }
}

impl Lexicon {
    /// Shorthand for [`classify_with`] on this lexicon.
    pub fn classify<I, S>(&self, ingredients: I) -> ClassificationResult
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        classify_with(self, ingredients)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn forbidden_wins_in_any_position() {
        let base = ["water", "sugar", "lecithin", "salt"];
        for pos in 0..=base.len() {
            let mut tokens: Vec<&str> = base.to_vec();
            tokens.insert(pos, "Shellac");
            assert_eq!(
                classify(&tokens),
                ClassificationResult::NonCompliant,
                "forbidden at position {pos}"
            );
        }
    }

    #[test]
    fn forbidden_after_possibly_derived_still_wins() {
        let tokens = ["lecithin", "glycerol", "water", "(Gelatine)"];
        assert_eq!(classify(tokens), ClassificationResult::NonCompliant);
    }

    #[test]
    fn possibly_derived_without_forbidden_is_indeterminate() {
        assert_eq!(
            classify(["water", "sugar", "lecithin", "salt"]),
            ClassificationResult::Indeterminate
        );
        assert_eq!(
            classify(["MAGNESIUM STEARATE"]),
            ClassificationResult::Indeterminate
        );
    }

    #[test]
    fn no_matches_is_compliant() {
        assert_eq!(
            classify(["water", "sugar", "salt"]),
            ClassificationResult::Compliant
        );
        assert_eq!(
            classify(Vec::<String>::new()),
            ClassificationResult::Compliant
        );
        assert_eq!(classify([""]), ClassificationResult::Compliant);
    }

    #[test]
    fn case_and_parentheses_do_not_matter() {
        for token in ["Gelatin", "(gelatin)", "GELATIN", "(GeLaTiN)"] {
            assert_eq!(classify([token]), ClassificationResult::NonCompliant);
        }
    }

    #[test]
    fn substrings_and_padding_do_not_match() {
        assert_eq!(
            classify(["beef gelatin", " gelatin", "gelatin powder"]),
            ClassificationResult::Compliant
        );
    }

    #[test]
    fn custom_lexicon_is_used() {
        let lexicon = Lexicon::new(["lard"], ["whey"]).unwrap();
        assert_eq!(
            lexicon.classify(["flour", "Lard"]),
            ClassificationResult::NonCompliant
        );
        assert_eq!(
            lexicon.classify(["flour", "whey"]),
            ClassificationResult::Indeterminate
        );
        assert_eq!(
            lexicon.classify(["gelatin"]),
            ClassificationResult::Compliant
        );
    }
}
