//! Built-in ingredient lexicon and custom lexicon construction.
//!
//! Two disjoint sets of normalized names: ingredients that are forbidden
//! outright, and ingredients that may come from a forbidden source. Lookups
//! are exact string equality against normalized names. There is no stemming,
//! synonym handling, or substring matching.

use std::collections::HashSet;
use std::sync::Arc;

use once_cell::sync::Lazy;

use crate::error::LexiconError;
use crate::normalize::normalize;

/// Names that make a product non-compliant on their own.
const FORBIDDEN: &[&str] = &[
    "l cystine", "l cysteine", "cochineal", "carminic acid", "gelatine", "gelatine emulsifier",
    "gelatin", "shellac", "essentiale calcium phosphate", "bone phosphate", "tribasic",
];

/// Names whose source may be animal- or non-animal-derived.
///
/// Carries no blank entry, so an empty token never matches and classifies as
/// compliant.
const POSSIBLY_DERIVED: &[&str] = &[
    "wax esters", "magnesium stearate", "calcium stearate", "stearic acid",
    "stearic acid fatty acid", "sorbitan monostearate", "sorbitan tristearate",
    "sorbitan monolaurate", "sorbitan monooleate", "sorbitan monopalminate",
    "stearyl tartrate", "lactylated fatty acids esters of glycerol and propane",
    "glyceryl monostearate", "glyceryl distearate", "sucrose of fatty acids",
    "polyglycerol esters of fatty acids", "propylene gycol esters of fatty acids",
    "glycerol esters of wood rosins", "ammonium phosphatides", "polyoxyethene 8 stearate",
    "polyoxyethene 40 stearate", "polyoxyethene 20 stearate", "dodecyl gallate",
    "sodium erythorbate", "sodium erythorbin", "lecithin", "sodium lactate",
    "potassium lactate", "potassium lactate antioxidant", "calcium lactate",
    "magnesium lactate", "fatty acid of esters of ascorbic acid", "lactic acid",
    "lactic acid preservative", "potassium nitrate", "black 7984", "orange ggn",
    "citrus red 2", "ponceau sx", "scarlet gn", "ponceau 6r", "indanthrene blue rs",
    "emulsifiers", "emulsifier", "edible bone phosphate", "glycerol", "glycerin", "glycerine",
    "curcumin", "turmeric", "riboflavin", "vitamin b2", "ammonium phosphates",
    "monoammonium phosphate", "diammonium phosphate", "lecitin citrate", "magnesium citrate",
    "ammonium malate", "calcium glycerylphosphate", "isopropyl citrate",
    "disodium ethylene diamine", "oxystearin, thiodipropionic acid",
    "dilauryl thiodipropionate", "distearyl thiodipropionate", "phytic acid",
    "extracts of rosemary", "calcium lactobionate", "bakers yeast", "arabinogalactan",
    "oat gum thickener", "gum ghatti thickener", "curdlan", "dioctyl sodium sulphosuccinate",
    "stearyl citrate", "sodium stearoyl fumarate", "calcium stearoyl fumarate",
    "sodium laurylsulphate", "ethoxylated monoglycerides", "ethoxylated diglycerides",
    "methyl glucoside coconut oil", "sorbitan trioleate", "polyoxypropylene polyoxyethylene",
    "partial polyglycerol esters of polycondensed fatty acids of castor oil",
    "ferrous carbonate", "ferrous hexacyanomanganate", "sodium thiosulphate",
    "dicalcium diphosphate acidity regulator", "sepiolite", "sepiolitic clay",
    "natrolite phonolite", "magnesium gluconate", "4 hexylresorcinol",
    "synthetic calcium aluminates", "perlite", "inosinic acid", "disodium inosinate",
    "dipotassium inosinate", "calcium inosinate", "calcium 5 ribonucleotides",
    "disodium 5 ribonucleotides", "maltol", "ethyl maltol", "glycine and its sodium salt",
    "l leucine", "lysine hydrochloride", "zinc acetate", "bacitracin",
    "penicillin g benzathyne", "spiramycins", "virginiamicins", "flavophospholipol", "tylosin",
    "tetracyclines", "chlortetracycline", "oxytetracycline", "oleandomycin",
    "penicillin g potassium", "penicillin g sodium", "penicillin g procaine", "monensin",
    "avoparcin", "salinomycin", "avilamycin", "gum benzoic", "rice bran wax", "spermaceti wax",
    "methyl esters of fatty acids", "oxidized polyethylene wax", "calcium iodate",
    "potassium iodate", "nitrogen oxides", "nitrosyl chloride", "potassium persulphate",
    "ammonium persulphate", "potassium bromate", "acetone peroxide", "dichlorodifluoromethane",
    "propane", "chloropentafluoroethane", "octafluorocyclobutane", "sucralose", "alitame",
    "glycyrrhizin sweetener", "stevioside", "neotame", "aspartame acesulfame salt",
    "erythritol", "amylase", "protease", "papain", "bromelian", "ficin", "glucose oxidase",
    "lipases", "polyvinyl alcohol", "pullulan", "enzyme treated starch", "distarch glycerol",
    "acetylated distarch glycerol", "fast green fcf", "fd&c green 3", "distarch glycerine",
    "hydroxy propyl distarch glycerol", "acetylated oxidised starch",
    "starch aluminum octenyl", "ethanol", "glyceryl monoacetate", "benzyl alcohol",
    "polythylene glycol 8000", "hydroxyetheyl cellulose", "saffron", "sandalwood red",
    "tannin", "orcein", "orchil", "heptyl p hydroxybenzoate", "dehydroacetic acid",
    "sodium dehydroacetate", "ascorbyl stearate", "erythorbin acid",
    "tert butylhydroquinone tbhq", "tert butylhydroquinone", "tbhq", "anoxomer", "ethoxyquin",
    "ammonium lactate", "ammonium adipate", "ammonium fumarate", "soybean hemicellulose",
    "cassia gum", "peptones", "brominated", "succistearin", "beta cyclodexterin",
    "crosslinked sodium", "zinc silicate", "potassium silicate", "vermiculite",
];

static BUILTIN: Lazy<Arc<Lexicon>> = Lazy::new(|| {
    Arc::new(Lexicon {
        forbidden: FORBIDDEN.iter().map(|name| (*name).to_string()).collect(),
        possibly_derived: POSSIBLY_DERIVED
            .iter()
            .map(|name| (*name).to_string())
            .collect(),
    })
});

/// Which list a lexicon entry belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LexiconCategory {
    Forbidden,
    PossiblyDerived,
}

/// Immutable pair of disjoint ingredient-name sets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Lexicon {
    forbidden: HashSet<String>,
    possibly_derived: HashSet<String>,
}

impl Lexicon {
    /// The lexicon shipped with the crate. Built on first use and shared for
    /// the lifetime of the process.
    pub fn builtin() -> &'static Lexicon {
        BUILTIN.as_ref()
    }

    /// Shared handle to [`Lexicon::builtin`]. Every call returns the same
    /// allocation.
    pub fn shared_builtin() -> Arc<Lexicon> {
        Arc::clone(&BUILTIN)
    }

    /// Build a lexicon from custom lists. Entries are normalized before they
    /// are stored.
    pub fn new<F, P, S, T>(forbidden: F, possibly_derived: P) -> Result<Self, LexiconError>
    where
        F: IntoIterator<Item = S>,
        P: IntoIterator<Item = T>,
        S: AsRef<str>,
        T: AsRef<str>,
    {
        let lexicon = Self {
            forbidden: normalized_set(forbidden)?,
            possibly_derived: normalized_set(possibly_derived)?,
        };
        lexicon.check_disjoint()?;
        Ok(lexicon)
    }

    /// The built-in lexicon plus extra entries, e.g. from configuration.
    pub fn extended<F, P, S, T>(
        extra_forbidden: F,
        extra_possibly_derived: P,
    ) -> Result<Self, LexiconError>
    where
        F: IntoIterator<Item = S>,
        P: IntoIterator<Item = T>,
        S: AsRef<str>,
        T: AsRef<str>,
    {
        let mut lexicon = Self::builtin().clone();
        lexicon.forbidden.extend(normalized_set(extra_forbidden)?);
        lexicon
            .possibly_derived
            .extend(normalized_set(extra_possibly_derived)?);
        lexicon.check_disjoint()?;
        Ok(lexicon)
    }

    /// Look up an already-normalized ingredient name.
    pub fn lookup(&self, name: &str) -> Option<LexiconCategory> {
        if self.forbidden.contains(name) {
            Some(LexiconCategory::Forbidden)
        } else if self.possibly_derived.contains(name) {
            Some(LexiconCategory::PossiblyDerived)
        } else {
            None
        }
    }

    pub fn is_forbidden(&self, name: &str) -> bool {
        self.forbidden.contains(name)
    }

    pub fn is_possibly_derived(&self, name: &str) -> bool {
        self.possibly_derived.contains(name)
    }

    pub fn forbidden_len(&self) -> usize {
        self.forbidden.len()
    }

    pub fn possibly_derived_len(&self) -> usize {
        self.possibly_derived.len()
    }

    fn check_disjoint(&self) -> Result<(), LexiconError> {
        // Report the smallest overlapping name so the error is stable.
        match self
            .forbidden
            .intersection(&self.possibly_derived)
            .min()
        {
            Some(name) => Err(LexiconError::Overlap(name.clone())),
            None => Ok(()),
        }
    }
}

fn normalized_set<I, S>(names: I) -> Result<HashSet<String>, LexiconError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    names
        .into_iter()
        .map(|name| {
            let normalized = normalize(name.as_ref());
            if normalized.trim().is_empty() {
                Err(LexiconError::EmptyEntry)
            } else {
                Ok(normalized)
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_lists_are_disjoint() {
        let lexicon = Lexicon::builtin();
        assert!(lexicon.check_disjoint().is_ok());
        assert_eq!(lexicon.forbidden_len(), FORBIDDEN.len());
        assert_eq!(lexicon.possibly_derived_len(), POSSIBLY_DERIVED.len());
    }

    #[test]
    fn builtin_entries_are_already_normalized() {
        for name in FORBIDDEN.iter().chain(POSSIBLY_DERIVED.iter()) {
            assert_eq!(normalize(name), *name);
            assert!(!name.is_empty());
        }
    }

    #[test]
    fn shared_builtin_is_one_instance() {
        let a = Lexicon::shared_builtin();
        let b = Lexicon::shared_builtin();
        assert!(Arc::ptr_eq(&a, &b));
        assert!(std::ptr::eq(a.as_ref(), Lexicon::builtin()));
    }

    #[test]
    fn blank_token_is_not_an_entry() {
        assert_eq!(Lexicon::builtin().lookup(""), None);
        assert!(!POSSIBLY_DERIVED.contains(&""));
    }

    #[test]
    fn lookup_is_exact_match_only() {
        let lexicon = Lexicon::builtin();
        assert_eq!(lexicon.lookup("gelatin"), Some(LexiconCategory::Forbidden));
        assert_eq!(
            lexicon.lookup("lecithin"),
            Some(LexiconCategory::PossiblyDerived)
        );
        assert_eq!(lexicon.lookup("beef gelatin"), None);
        assert_eq!(lexicon.lookup("gelatin "), None);
        assert_eq!(lexicon.lookup("Gelatin"), None);
        assert_eq!(lexicon.lookup(""), None);
    }

    #[test]
    fn custom_lexicon_normalizes_entries() {
        let lexicon = Lexicon::new(["(Lard)"], ["Mono-Glycerides"]).unwrap();
        assert!(lexicon.is_forbidden("lard"));
        assert!(lexicon.is_possibly_derived("mono-glycerides"));
        assert!(!lexicon.is_forbidden("gelatin"));
    }

    #[test]
    fn overlapping_lists_rejected() {
        let err = Lexicon::new(["Pork Fat", "lard"], ["(pork fat)"]).unwrap_err();
        assert_eq!(err, LexiconError::Overlap("pork fat".into()));
    }

    #[test]
    fn empty_entries_rejected() {
        let err = Lexicon::new(["lard", "()"], Vec::<String>::new()).unwrap_err();
        assert_eq!(err, LexiconError::EmptyEntry);
    }

    #[test]
    fn extended_keeps_builtin_entries() {
        let lexicon = Lexicon::extended(["Lard"], ["carmine"]).unwrap();
        assert!(lexicon.is_forbidden("lard"));
        assert!(lexicon.is_forbidden("gelatin"));
        assert!(lexicon.is_possibly_derived("carmine"));
        assert!(lexicon.is_possibly_derived("lecithin"));
    }

    #[test]
    fn extended_cannot_move_builtin_entry_across_lists() {
        let err = Lexicon::extended(["Lecithin"], Vec::<String>::new()).unwrap_err();
        assert_eq!(err, LexiconError::Overlap("lecithin".into()));
    }
}
