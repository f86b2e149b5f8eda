//! Tyre compounds and the usage set used to enforce the two-compound rule.

use crate::error::StrategyError;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Compound {
    Soft,
    Medium,
    Hard,
}

impl Compound {
    /// Every compound in enumeration order. Pit options are tried in this order.
    pub const ALL: [Compound; 3] = [Compound::Soft, Compound::Medium, Compound::Hard];

    pub fn name(self) -> &'static str {
        match self {
            Compound::Soft => "SOFT",
            Compound::Medium => "MEDIUM",
            Compound::Hard => "HARD",
        }
    }

    fn bit(self) -> u8 {
        1 << (self as u8)
    }
}

impl fmt::Display for Compound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Compound {
    type Err = StrategyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "SOFT" => Ok(Compound::Soft),
            "MEDIUM" => Ok(Compound::Medium),
            "HARD" => Ok(Compound::Hard),
            _ => Err(StrategyError::InvalidCompound(s.to_string())),
        }
    }
}

/// The set of compounds fitted so far on a strategy path.
///
/// Bit i is set when `Compound::ALL[i]` has been used, so membership, union
/// and cardinality are all O(1).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct CompoundSet(u8);

impl CompoundSet {
    pub const fn empty() -> Self {
        Self(0)
    }

    pub fn single(compound: Compound) -> Self {
        Self(compound.bit())
    }

    pub fn contains(self, compound: Compound) -> bool {
        self.0 & compound.bit() != 0
    }

    pub fn insert(&mut self, compound: Compound) {
        self.0 |= compound.bit();
    }

    /// Copy of this set with `compound` added.
    pub fn with(self, compound: Compound) -> Self {
        Self(self.0 | compound.bit())
    }

    pub fn union(self, other: CompoundSet) -> Self {
        Self(self.0 | other.0)
    }

    pub fn len(self) -> usize {
        self.0.count_ones() as usize
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub fn iter(self) -> impl Iterator<Item = Compound> {
        Compound::ALL.into_iter().filter(move |c| self.contains(*c))
    }
}

impl FromIterator<Compound> for CompoundSet {
    fn from_iter<I: IntoIterator<Item = Compound>>(iter: I) -> Self {
        let mut set = Self::empty();
        for compound in iter {
            set.insert(compound);
        }
        set
    }
}

impl fmt::Display for CompoundSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = self.iter().map(Compound::name).collect();
        write!(f, "{{{}}}", names.join(", "))
    }
}
