//! Category/token classifier: decides whether a market name satisfies the
//! user's filter tokens.

pub mod rules;
pub mod tokens;

pub use rules::{CategoryRule, CategoryTable, SpecialRule};
pub use tokens::WordSeq;

struct CompiledRule {
    names: Vec<String>,
    aliases: Vec<WordSeq>,
    exclusions: Vec<WordSeq>,
    glyph: Option<(char, Vec<WordSeq>)>,
}

impl CompiledRule {
    fn compile(rule: &CategoryRule) -> Self {
        let phrases = |xs: &[String]| -> Vec<WordSeq> {
            xs.iter().map(|x| WordSeq::new(x)).filter(|w| !w.is_empty()).collect()
        };
        Self {
            names: rule.names.iter().map(|n| n.trim().to_lowercase()).collect(),
            aliases: phrases(&rule.aliases),
            exclusions: phrases(&rule.exclusions),
            glyph: rule.special.as_ref().map(|s| match s {
                SpecialRule::RarityGlyph { glyph, guarded } => (*glyph, phrases(guarded)),
            }),
        }
    }

    fn lists_phrase(&self, phrase: &WordSeq) -> bool {
        self.aliases.contains(phrase)
            || self.glyph.as_ref().is_some_and(|(_, guarded)| guarded.contains(phrase))
    }

    fn excludes(&self, kind: &WordSeq) -> bool {
        self.exclusions.iter().any(|x| kind.contains_phrase(x))
    }

    /// Category membership is decided on the item-kind segment only, so a
    /// finish such as "Case Hardened" never reads as a container.
    fn matches(&self, raw: &str, kind: &WordSeq) -> bool {
        let alias_hit = self.aliases.iter().any(|a| kind.contains_phrase(a));
        let glyph_hit = self.glyph.as_ref().is_some_and(|(glyph, guarded)| {
            raw.contains(*glyph) && guarded.iter().any(|g| kind.contains_phrase(g))
        });
        (alias_hit || glyph_hit) && !self.excludes(kind)
    }
}

/// Compiled form of a [`CategoryTable`]. Build once per run.
pub struct Classifier {
    rules: Vec<CompiledRule>,
}

impl Classifier {
    pub fn new(table: &CategoryTable) -> Self {
        Self {
            rules: table.rules.iter().map(CompiledRule::compile).collect(),
        }
    }

    /// OR across tokens. No tokens means every item passes.
    pub fn matches_any(&self, name: &str, tokens: &[String]) -> bool {
        if tokens.is_empty() {
            return true;
        }
        let words = WordSeq::new(name);
        let kind = WordSeq::new(kind_segment(name));
        tokens.iter().any(|t| self.matches_token(name, &words, &kind, t))
    }

    fn matches_token(&self, raw: &str, name: &WordSeq, kind: &WordSeq, token: &str) -> bool {
        let token = token.trim().to_lowercase();

        // A category name selects the whole rule, special predicate included.
        if let Some(rule) = self.rules.iter().find(|r| r.names.contains(&token)) {
            return rule.matches(raw, kind);
        }

        // Anything else is a literal phrase, vetoed by the exclusions of every
        // category that lists it.
        let phrase = WordSeq::new(&token);
        if !name.contains_phrase(&phrase) {
            return false;
        }
        !self
            .rules
            .iter()
            .filter(|r| r.lists_phrase(&phrase))
            .any(|r| r.excludes(kind))
    }
}

/// Text before the first `|`: the weapon, container or sticker kind. Names
/// without a `|` are all kind.
fn kind_segment(name: &str) -> &str {
    name.split('|').next().unwrap_or(name)
}
