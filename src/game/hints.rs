//! Hint scheduling.
//!
//! Every round reveals facts about its creature one at a time. The facts come
//! from a fixed, ordered set of extractors ([`FactKind`]); each round draws a
//! fresh uniformly random permutation of that set with [`shuffle`], so two
//! rounds on the same creature reveal facts in different orders.

use derive_getters::Getters;
use derive_new::new;
use rand::Rng;
use serde::{Deserialize, Serialize};
use strum::{EnumCount, VariantArray};
use tracing::instrument;

use crate::catalog::{Creature, Locale};

/// A fact extractor: one kind of hint that can be derived from a creature.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    EnumCount,
    VariantArray,
    strum::Display,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum FactKind {
    /// First letter of the name in the guessing locale.
    FirstLetter,
    /// Type tags.
    Types,
    /// Number of letters in the name.
    NameLength,
    /// Base HP.
    Hp,
    /// Base attack.
    Attack,
    /// Base defense.
    Defense,
    /// Base special attack.
    SpecialAttack,
    /// Base special defense.
    SpecialDefense,
    /// Base speed.
    Speed,
    /// Catalog number.
    CatalogNumber,
}

/// Number of distinct facts a round can reveal.
pub const FACT_COUNT: usize = FactKind::COUNT;

impl FactKind {
    /// Returns the extractor at `index` in declaration order.
    pub fn from_index(index: usize) -> Option<Self> {
        Self::VARIANTS.get(index).copied()
    }

    /// Renders this fact about `creature`, using `locale` for name-based facts.
    pub fn extract(self, creature: &Creature, locale: Locale) -> String {
        let name = creature.name().get(locale);
        let base = creature.base();
        match self {
            Self::FirstLetter => {
                let letter = name
                    .chars()
                    .next()
                    .map(|c| c.to_uppercase().collect::<String>())
                    .unwrap_or_else(|| "?".to_string());
                format!("The first letter is \"{}\"", letter)
            }
            Self::Types => format!(
                "It has {} type(s): {}",
                creature.types().len(),
                creature.types().join(", ")
            ),
            Self::NameLength => format!("Its name has {} letters", name.chars().count()),
            Self::Hp => format!("Base HP: {}", base.hp()),
            Self::Attack => format!("Base Attack: {}", base.attack()),
            Self::Defense => format!("Base Defense: {}", base.defense()),
            Self::SpecialAttack => format!("Base Special Attack: {}", base.special_attack()),
            Self::SpecialDefense => format!("Base Special Defense: {}", base.special_defense()),
            Self::Speed => format!("Base Speed: {}", base.speed()),
            Self::CatalogNumber => format!("Its catalog number is #{}", creature.id()),
        }
    }
}

/// A revealed hint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Getters, new)]
pub struct Fact {
    kind: FactKind,
    text: String,
}

/// Returns a uniformly random permutation of `0..n`.
///
/// Fisher-Yates: walking `i` down from `n - 1` to 1, swap position `i` with a
/// position drawn uniformly from `0..=i`.
#[instrument(skip(rng))]
pub fn shuffle<R: Rng + ?Sized>(n: usize, rng: &mut R) -> Vec<usize> {
    let mut items: Vec<usize> = (0..n).collect();
    for i in (1..n).rev() {
        let j = rng.random_range(0..=i);
        items.swap(i, j);
    }
    items
}

/// Draws a fresh reveal order over every [`FactKind`].
#[instrument(skip(rng))]
pub fn reveal_order<R: Rng + ?Sized>(rng: &mut R) -> Vec<FactKind> {
    shuffle(FACT_COUNT, rng)
        .into_iter()
        .filter_map(FactKind::from_index)
        .collect()
}

/// Renders the first `count` facts of `order`.
pub fn render_facts(
    creature: &Creature,
    locale: Locale,
    order: &[FactKind],
    count: usize,
) -> Vec<Fact> {
    order
        .iter()
        .take(count)
        .map(|kind| Fact::new(*kind, kind.extract(creature, locale)))
        .collect()
}
