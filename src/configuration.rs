use std::{
    fmt::{Debug, Display},
    ops::{Add, Index},
};

use itertools::Itertools;

use crate::{error::Inapplicable, store::Store, symbol::Symbol};

/// A tuple of [`Store`]s, one for each store of a machine. Used both as the state of a running
/// machine and as a pattern that is matched against such a state.
#[derive(Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Configuration(Vec<Store>);

impl Configuration {
    /// Creates a configuration from the given stores.
    pub fn new<I: IntoIterator<Item = Store>>(stores: I) -> Self {
        Self(stores.into_iter().collect())
    }

    /// Creates a configuration of `arity` empty stores.
    pub fn empty(arity: usize) -> Self {
        Self(vec![Store::empty(); arity])
    }

    /// The number of stores.
    pub fn arity(&self) -> usize {
        self.0.len()
    }

    /// The stores of the configuration.
    pub fn stores(&self) -> &[Store] {
        &self.0
    }

    /// Returns an iterator over the stores.
    pub fn iter(&self) -> std::slice::Iter<'_, Store> {
        self.0.iter()
    }

    /// Returns the store with index `i`, if there is one.
    pub fn get(&self, i: usize) -> Option<&Store> {
        self.0.get(i)
    }

    /// Returns a copy of `self` in which store `i` is replaced by `store`.
    ///
    /// # Panics
    /// If `i` is not a store index of `self`.
    pub fn with_store(&self, i: usize, store: Store) -> Configuration {
        let mut stores = self.0.clone();
        stores[i] = store;
        Configuration(stores)
    }

    /// Returns the configuration made of the stores in `range`.
    pub fn slice(&self, range: std::ops::Range<usize>) -> Configuration {
        Configuration(self.0[range].to_vec())
    }

    /// Returns true iff `self`, read as a pattern, matches `other`. Every store of `self` has to
    /// match the corresponding store of `other` (see [`Store::matches`]).
    ///
    /// # Panics
    /// If the two configurations have different arities, which is a programming error.
    pub fn matches(&self, other: &Configuration) -> bool {
        assert_eq!(
            self.arity(),
            other.arity(),
            "cannot match configurations of different arity"
        );
        self.iter().zip(other.iter()).all(|(p, s)| p.matches(s))
    }
}

impl Index<usize> for Configuration {
    type Output = Store;
    fn index(&self, index: usize) -> &Self::Output {
        &self.0[index]
    }
}

impl FromIterator<Store> for Configuration {
    fn from_iter<T: IntoIterator<Item = Store>>(iter: T) -> Self {
        Self::new(iter)
    }
}

impl<'a> IntoIterator for &'a Configuration {
    type Item = &'a Store;
    type IntoIter = std::slice::Iter<'a, Store>;
    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl Add<&Configuration> for &Configuration {
    type Output = Configuration;
    fn add(self, rhs: &Configuration) -> Self::Output {
        self.iter().chain(rhs.iter()).cloned().collect()
    }
}

impl Display for Configuration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.iter().join(","))
    }
}

impl Debug for Configuration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({self})")
    }
}

/// A rewrite from one [`Configuration`] to another. The left-hand side is a pattern, the
/// right-hand side is spliced into the matched window of every store.
///
/// Transitions are plain values: two transitions with equal sides are the same transition.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Transition {
    lhs: Configuration,
    rhs: Configuration,
}

impl Transition {
    /// Creates a transition from `lhs` to `rhs`.
    pub fn new(lhs: Configuration, rhs: Configuration) -> Self {
        Self { lhs, rhs }
    }

    /// The left-hand side.
    pub fn lhs(&self) -> &Configuration {
        &self.lhs
    }

    /// The right-hand side.
    pub fn rhs(&self) -> &Configuration {
        &self.rhs
    }

    /// Decomposes the transition into its left- and right-hand side.
    pub fn into_parts(self) -> (Configuration, Configuration) {
        (self.lhs, self.rhs)
    }

    /// Returns true iff `self` can be applied to `config`.
    pub fn matches(&self, config: &Configuration) -> bool {
        self.lhs.matches(config)
    }

    /// Applies `self` to `config`. For each store, the left-hand side is aligned with the store's
    /// head, the matched window is replaced by the right-hand side and the head moves to the
    /// position of the right-hand side within the replaced window.
    ///
    /// Returns [`Inapplicable`] exactly when [`Transition::matches`] is false.
    ///
    /// # Panics
    /// If the arities of `self` and `config` differ.
    pub fn apply(&self, config: &Configuration) -> Result<Configuration, Inapplicable> {
        assert_eq!(
            (self.lhs.arity(), self.rhs.arity()),
            (config.arity(), config.arity()),
            "cannot apply a transition to a configuration of different arity"
        );
        self.lhs
            .iter()
            .zip(self.rhs.iter())
            .zip(config.iter())
            .map(|((x, y), store)| store.rewrite(x, y))
            .collect()
    }
}

impl Display for Transition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.rhs.arity() > 0 {
            write!(f, "{} → {}", self.lhs, self.rhs)
        } else {
            write!(f, "{}", self.lhs)
        }
    }
}

impl Debug for Transition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{self}")
    }
}

/// A transition as it is written down, split into one piece per store of a machine. The pieces
/// may have different numbers of stores on their two sides: a stream store has no right-hand
/// side, and a tape store has a write and a move (`L`, `S` or `R`).
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct AlignedTransition(Vec<Transition>);

impl AlignedTransition {
    /// Creates an aligned transition from one piece per store.
    pub fn new<I: IntoIterator<Item = Transition>>(pieces: I) -> Self {
        Self(pieces.into_iter().collect())
    }

    /// The pieces, one per store.
    pub fn pieces(&self) -> &[Transition] {
        &self.0
    }

    /// Number of pieces.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true if there are no pieces.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The left-hand sides of all pieces, concatenated.
    pub fn lhs(&self) -> Configuration {
        self.0.iter().flat_map(|t| t.lhs.iter().cloned()).collect()
    }

    /// The right-hand sides of all pieces, concatenated.
    pub fn rhs(&self) -> Configuration {
        self.0.iter().flat_map(|t| t.rhs.iter().cloned()).collect()
    }

    /// Flattens `self` into a single [`Transition`].
    pub fn flatten(&self) -> Transition {
        Transition::new(self.lhs(), self.rhs())
    }
}

impl Index<usize> for AlignedTransition {
    type Output = Transition;
    fn index(&self, index: usize) -> &Self::Output {
        &self.0[index]
    }
}

impl Add for AlignedTransition {
    type Output = AlignedTransition;
    fn add(mut self, rhs: Self) -> Self::Output {
        self.0.extend(rhs.0);
        self
    }
}

impl Display for AlignedTransition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.flatten())
    }
}

impl Debug for AlignedTransition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.0.iter()).finish()
    }
}

/// Builds the store holding just `symbol`, which is how states are written.
pub(crate) fn cell(symbol: Symbol) -> Store {
    Store::new([symbol])
}

#[cfg(test)]
mod tests {
    use crate::prelude::*;

    fn config(text: &str) -> Configuration {
        text.parse().unwrap()
    }

    fn at(text: &str, position: isize) -> Store {
        let values = text.parse::<Store>().unwrap().values().clone();
        Store::with_position(values, position).unwrap()
    }

    #[test]
    fn parse_and_display() {
        let (abc, de) = ("a b c".parse::<Store>().unwrap(), "d e".parse::<Store>().unwrap());
        assert_eq!(config("a b c"), Configuration::new([abc.clone()]));
        assert_eq!(config("&"), Configuration::new([Store::empty()]));
        assert_eq!(config("a b c, d e"), Configuration::new([abc, de]));
        assert_eq!(config("a b c").to_string(), "[a] b c");
        assert_eq!(config("a b c, d e").to_string(), "[a] b c,[d] e");
    }

    #[test]
    fn matching() {
        for (pattern, target, expected) in [
            (at("a a", 1), at("a a", 0), false),
            (at("a a", 0), at("a a", 0), true),
            (at("a a", 0), at("a b", 0), false),
            (at("a a", 0), at("a a", 1), false),
            (at("a _", 0), at("a a", 1), true),
            (at("a _", 0), at("a b", 1), false),
            (at("&", 0), at("&", 0), true),
            (at("&", 0), at("a b", 0), true),
        ] {
            let pattern = Configuration::new([pattern]);
            let target = Configuration::new([target]);
            assert_eq!(pattern.matches(&target), expected, "{pattern} vs {target}");
        }
    }

    #[test]
    #[should_panic]
    fn matching_different_arity_panics() {
        config("a, b").matches(&config("a"));
    }

    #[test]
    fn applying() {
        for (pattern, replacement, target, expected) in [
            (at("a a", 1), at("x y z", 0), at("a a", 0), None),
            (at("a a", 0), at("x y z", 0), at("a a", 0), Some(at("x y z", 0))),
            (at("a a", 0), at("x y z", 0), at("a b", 0), None),
            (at("a a", 0), at("x y z", 0), at("a a", 1), None),
            (at("a _", 0), at("x y z", 0), at("a a", 1), Some(at("a x y z", 1))),
            (at("a _", 0), at("x y z", 0), at("a b", 1), None),
            (at("&", 0), at("x y z", 0), at("&", 0), Some(at("x y z", 0))),
            (at("&", 0), at("x y z", 0), at("a b", 0), Some(at("x y z a b", 0))),
            (at("a", 0), at("b", 1), at("a", 0), Some(at("b _", 1))),
            (at("a", 0), at("&", 0), at("a", 0), Some(at("&", 0))),
        ] {
            let t = Transition::new(
                Configuration::new([pattern]),
                Configuration::new([replacement]),
            );
            let target = Configuration::new([target]);
            let result = t.apply(&target);
            assert_eq!(result.is_ok(), t.matches(&target));
            match expected {
                Some(store) => assert_eq!(result, Ok(Configuration::new([store]))),
                None => assert_eq!(result, Err(Inapplicable)),
            }
            // applying is a function of its inputs
            assert_eq!(t.apply(&target), result);
        }
    }

    #[test]
    fn transition_parsing() {
        let (abc, de) = (config("a b c"), config("d e"));
        assert_eq!(
            "a b c -> d e".parse::<Transition>().unwrap(),
            Transition::new(abc.clone(), de.clone())
        );
        assert_eq!(
            "a b c, d e → a b c, d e".parse::<Transition>().unwrap(),
            Transition::new(&abc + &de, &abc + &de)
        );
        assert_eq!(
            "a b c".parse::<Transition>().unwrap(),
            Transition::new(abc.clone(), Configuration::default())
        );
        assert_eq!(
            "a b c, d e".parse::<Transition>().unwrap().to_string(),
            "[a] b c,[d] e"
        );
        assert_eq!(
            "q, a -> r".parse::<Transition>().unwrap().to_string(),
            "q,a → r"
        );
    }

    #[test]
    fn aligned_transitions() {
        let t = AlignedTransition::new([
            "a, b -> c".parse::<Transition>().unwrap(),
            "d -> e, f".parse::<Transition>().unwrap(),
        ]);
        assert_eq!(t[0], "a, b -> c".parse().unwrap());
        assert_eq!(t[1], "d -> e, f".parse().unwrap());
        assert_eq!(t.lhs(), config("a, b, d"));
        assert_eq!(t.rhs(), config("c, e, f"));
        let doubled = t.clone() + t.clone();
        assert_eq!(doubled.len(), 4);
        assert_eq!(doubled[2], t[0]);
    }
}
