//! Synthetic prompt generation.
//!
//! Prompts are built from templates with a fixed number of typed slots.
//! Picking a template and filling its slots are independent random draws,
//! so two prompts of the same length rarely share their text and the server
//! cannot answer a benchmark from its prefix cache alone.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Prompt length category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PromptLength {
    /// One-line question, a handful of tokens.
    Short,
    /// A paragraph-sized request.
    Medium,
    /// Multi-part analytical request.
    Long,
}

impl PromptLength {
    /// All categories in cycling order.
    pub const ALL: [Self; 3] = [Self::Short, Self::Medium, Self::Long];

    /// Category for the `index`-th request of a sequential series.
    #[must_use]
    pub const fn cycle(index: usize) -> Self {
        Self::ALL[index % Self::ALL.len()]
    }

    /// Uniformly random category.
    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self::ALL[rng.gen_range(0..Self::ALL.len())]
    }

    /// Lowercase name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Short => "short",
            Self::Medium => "medium",
            Self::Long => "long",
        }
    }
}

impl fmt::Display for PromptLength {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Used if a vocabulary ever comes up empty.
const DEFAULT_FILL: &str = "science";

const ENTITIES: &[&str] = &[
    "France", "Japan", "Brazil", "Kenya", "Canada", "Norway", "Egypt", "India",
    "Mount Everest", "the Amazon River", "the Sahara", "the Pacific Ocean",
    "Marie Curie", "Isaac Newton", "Ada Lovelace", "Nikola Tesla", "Leonardo da Vinci",
    "the Moon", "Jupiter", "oxygen", "carbon", "the Roman Empire", "the printing press",
];

const CONCEPTS: &[&str] = &[
    "machine learning", "blockchain", "photosynthesis", "inflation", "democracy",
    "quantum computing", "natural selection", "supply and demand", "entropy",
    "neural networks", "cryptography", "climate change", "game theory",
    "compound interest", "plate tectonics", "the immune system", "recursion",
];

const DOMAINS: &[&str] = &[
    "healthcare", "education", "agriculture", "finance", "transportation",
    "manufacturing", "journalism", "law", "energy", "retail", "entertainment",
    "scientific research", "public policy", "logistics",
];

/// Value domain of one template slot.
#[derive(Debug, Clone, Copy)]
enum Slot {
    /// Integer drawn from an inclusive range.
    Number(u32, u32),
    /// Place, person, or thing.
    Entity,
    /// Abstract idea.
    Concept,
    /// Industry or field of activity.
    Domain,
}

impl Slot {
    fn fill<R: Rng + ?Sized>(self, rng: &mut R) -> String {
        let pick = |words: &[&str], rng: &mut R| {
            words.choose(rng).copied().unwrap_or(DEFAULT_FILL).to_string()
        };
        match self {
            Self::Number(lo, hi) => rng.gen_range(lo..=hi).to_string(),
            Self::Entity => pick(ENTITIES, rng),
            Self::Concept => pick(CONCEPTS, rng),
            Self::Domain => pick(DOMAINS, rng),
        }
    }
}

/// A prompt template whose arity is part of its type.
#[derive(Clone, Copy)]
enum Template {
    One(Slot, fn(&str) -> String),
    Two([Slot; 2], fn(&str, &str) -> String),
    Three([Slot; 3], fn(&str, &str, &str) -> String),
}

impl fmt::Debug for Template {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Template").field(&self.arity()).finish()
    }
}

impl Template {
    fn arity(&self) -> usize {
        match self {
            Self::One(..) => 1,
            Self::Two(..) => 2,
            Self::Three(..) => 3,
        }
    }

    fn render<R: Rng + ?Sized>(&self, rng: &mut R) -> String {
        match self {
            Self::One(a, f) => f(&a.fill(rng)),
            Self::Two([a, b], f) => f(&a.fill(rng), &b.fill(rng)),
            Self::Three([a, b, c], f) => f(&a.fill(rng), &b.fill(rng), &c.fill(rng)),
        }
    }
}

const SHORT: &[Template] = &[
    Template::Two([Slot::Number(2, 999), Slot::Number(2, 999)], |a, b| {
        format!("What is {a} + {b}?")
    }),
    Template::Two([Slot::Number(2, 99), Slot::Number(2, 99)], |a, b| {
        format!("What is {a} times {b}? Reply with just the number.")
    }),
    Template::One(Slot::Entity, |e| format!("In one sentence, what is {e} known for?")),
    Template::One(Slot::Concept, |c| format!("Define {c} in ten words or fewer.")),
    Template::Two([Slot::Number(100, 9999), Slot::Number(2, 12)], |a, b| {
        format!("What is {a} divided by {b}, rounded to two decimals?")
    }),
];

const MEDIUM: &[Template] = &[
    Template::Two([Slot::Concept, Slot::Domain], |c, d| {
        format!(
            "Explain the concept of {c} in simple terms. \
             Include examples of how it is used in {d}."
        )
    }),
    Template::Two([Slot::Entity, Slot::Number(2, 6)], |e, n| {
        format!("Give {n} interesting facts about {e}, each in a short paragraph.")
    }),
    Template::Three([Slot::Concept, Slot::Concept, Slot::Number(3, 8)], |a, b, n| {
        format!(
            "Compare {a} and {b}. List {n} similarities or differences \
             and explain which one matters more in practice."
        )
    }),
    Template::Two([Slot::Domain, Slot::Number(2, 20)], |d, y| {
        format!(
            "Describe how {d} has changed over the last {y} years \
             and what drove those changes."
        )
    }),
];

const LONG: &[Template] = &[
    Template::Three([Slot::Concept, Slot::Domain, Slot::Domain], |c, a, b| {
        format!(
            "Write a detailed analysis of the impact of {c} on modern society. \
             Consider the following aspects: economic implications, job market \
             transformation, ethical considerations, privacy concerns, and changes \
             in {a} and {b}. Provide specific examples and discuss both positive and \
             negative impacts, then outline potential future scenarios."
        )
    }),
    Template::Three([Slot::Entity, Slot::Concept, Slot::Number(3, 7)], |e, c, n| {
        format!(
            "Write an essay of about {n} paragraphs on {e} and its relationship \
             to {c}. Cover the historical background, the key turning points, \
             the main controversies, and the lessons a modern reader can draw. \
             Support each paragraph with a concrete example and end with a \
             balanced conclusion."
        )
    }),
    Template::Three([Slot::Domain, Slot::Concept, Slot::Number(5, 25)], |d, c, y| {
        format!(
            "You are advising a government committee on {d}. Prepare a structured \
             briefing on how {c} could reshape the field over the next {y} years. \
             Include an executive summary, a risk assessment, a list of \
             stakeholders with their likely positions, three policy options with \
             trade-offs, and a recommended course of action with justification."
        )
    }),
];

fn templates(length: PromptLength) -> &'static [Template] {
    match length {
        PromptLength::Short => SHORT,
        PromptLength::Medium => MEDIUM,
        PromptLength::Long => LONG,
    }
}

/// Randomized prompt source.
#[derive(Debug, Clone)]
pub struct PromptGenerator {
    rng: StdRng,
}

impl Default for PromptGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl PromptGenerator {
    /// Generator seeded from OS entropy.
    #[must_use]
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }

    /// Deterministic generator for reproducible runs.
    #[must_use]
    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Seeded when `seed` is set, entropy otherwise.
    #[must_use]
    pub fn from_seed_option(seed: Option<u64>) -> Self {
        seed.map_or_else(Self::new, Self::with_seed)
    }

    /// Produce one prompt of the given length category.
    pub fn generate(&mut self, length: PromptLength) -> String {
        let pool = templates(length);
        match pool.choose(&mut self.rng) {
            Some(template) => template.render(&mut self.rng),
            None => format!("Tell me about {DEFAULT_FILL}."),
        }
    }

    /// Produce a prompt of a random length category.
    pub fn generate_random(&mut self) -> String {
        let length = PromptLength::random(&mut self.rng);
        self.generate(length)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_cycle_order() {
        let got: Vec<_> = (0..6).map(PromptLength::cycle).collect();
        assert_eq!(
            got,
            vec![
                PromptLength::Short,
                PromptLength::Medium,
                PromptLength::Long,
                PromptLength::Short,
                PromptLength::Medium,
                PromptLength::Long,
            ]
        );
    }

    #[test]
    fn test_short_prompts_are_varied() {
        let mut gen = PromptGenerator::new();
        let distinct: HashSet<String> =
            (0..50).map(|_| gen.generate(PromptLength::Short)).collect();
        assert!(distinct.len() >= 5, "only {} distinct prompts", distinct.len());
    }

    #[test]
    fn test_seeded_generators_agree() {
        let mut a = PromptGenerator::with_seed(7);
        let mut b = PromptGenerator::with_seed(7);
        for length in PromptLength::ALL {
            assert_eq!(a.generate(length), b.generate(length));
        }
    }

    #[test]
    fn test_length_categories_grow() {
        let mut gen = PromptGenerator::with_seed(1);
        let avg = |gen: &mut PromptGenerator, length| {
            (0..20).map(|_| gen.generate(length).len()).sum::<usize>() / 20
        };
        let short = avg(&mut gen, PromptLength::Short);
        let medium = avg(&mut gen, PromptLength::Medium);
        let long = avg(&mut gen, PromptLength::Long);
        assert!(short < medium);
        assert!(medium < long);
    }

    #[test]
    fn test_no_unfilled_slots() {
        let mut gen = PromptGenerator::with_seed(99);
        for _ in 0..100 {
            let prompt = gen.generate_random();
            assert!(!prompt.is_empty());
            assert!(!prompt.contains('{'));
        }
    }

    #[test]
    fn test_template_arity() {
        assert!(SHORT.iter().chain(MEDIUM).chain(LONG).all(|t| (1..=3).contains(&t.arity())));
    }

    #[test]
    fn test_number_slot_in_range() {
        let mut rng = StdRng::seed_from_u64(3);
        for _ in 0..200 {
            let n: u32 = Slot::Number(2, 9).fill(&mut rng).parse().unwrap();
            assert!((2..=9).contains(&n));
        }
    }

    #[test]
    fn test_length_serde_lowercase() {
        assert_eq!(serde_json::to_string(&PromptLength::Long).unwrap(), "\"long\"");
        assert_eq!(PromptLength::Medium.to_string(), "medium");
    }
}
