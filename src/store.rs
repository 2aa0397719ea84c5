use std::fmt::{Debug, Display};

use crate::{
    error::{Inapplicable, MachineError},
    symbol::{Symbol, Word},
};

/// A word together with a head position. A store either holds one component of a configuration
/// (the state, the remaining input, a stack, a tape) or acts as a pattern that is matched against
/// such a component.
///
/// The position lies in `-1..=len`. Positions `0..len` point at a symbol, `-1` means the head is
/// one to the left of the word and `len` means it is one past the end.
#[derive(Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Store {
    values: Word,
    position: isize,
}

impl Store {
    /// The empty store ε with its head at position 0.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Creates a store with the head on the first symbol (or at 0 for the empty store).
    pub fn new(values: impl Into<Word>) -> Self {
        Self {
            values: values.into(),
            position: 0,
        }
    }

    /// Creates a store with the head at `position`, which must lie in `-1..=len`.
    pub fn with_position(values: impl Into<Word>, position: isize) -> Result<Self, MachineError> {
        let values = values.into();
        if position < -1 || position > values.len() as isize {
            return Err(MachineError::InvalidPosition {
                position,
                len: values.len(),
            });
        }
        Ok(Self { values, position })
    }

    pub(crate) fn from_parts(values: Word, position: isize) -> Self {
        debug_assert!(-1 <= position && position <= values.len() as isize);
        Self { values, position }
    }

    /// The symbols held by the store.
    pub fn values(&self) -> &Word {
        &self.values
    }

    /// The head position.
    pub fn position(&self) -> isize {
        self.position
    }

    /// Number of symbols in the store.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns true if the store holds no symbols.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Returns true if the head is on one of the two boundary positions `-1` and `len`.
    pub fn at_boundary(&self) -> bool {
        self.position == -1 || self.position == self.len() as isize
    }

    /// Returns the only symbol of a store holding exactly one symbol, as states do.
    pub fn single(&self) -> Option<&Symbol> {
        match self.values.symbols() {
            [x] => Some(x),
            _ => None,
        }
    }

    /// Returns true iff `self`, read as a pattern, matches `target`. This is asymmetric: `target`
    /// may hold symbols that are not covered by `self`.
    ///
    /// The pattern is aligned with `target` by their head positions. Where the pattern reaches
    /// past the end of `target`, the target is virtually padded with blanks, so those pattern
    /// symbols must all be blank. A pattern that would reach past the left end never matches.
    pub fn matches(&self, target: &Store) -> bool {
        self.alignment(target).is_some()
    }

    /// The offset in `target` at which the window of the pattern `self` starts, if it matches.
    fn alignment(&self, target: &Store) -> Option<usize> {
        let offset = usize::try_from(target.position - self.position).ok()?;
        self.values
            .iter()
            .enumerate()
            .all(|(k, x)| match target.values.get(offset + k) {
                Some(y) => x == y,
                None => x.is_blank(),
            })
            .then_some(offset)
    }

    /// Rewrites `self` by replacing the window matched by `lhs` with `rhs`. The new head position
    /// is the start of the window plus the position of `rhs`, clamped at zero; the store is padded
    /// with blanks so that the head never points past its end (the empty store stays empty when
    /// the head ends up at 0).
    pub(crate) fn rewrite(&self, lhs: &Store, rhs: &Store) -> Result<Store, Inapplicable> {
        let offset = lhs.alignment(self).ok_or(Inapplicable)?;
        let end = offset + lhs.len();

        let mut values: Vec<Symbol> = self.values.to_vec();
        if values.len() < end {
            values.resize(end, Symbol::blank());
        }
        values.splice(offset..end, rhs.values.iter().cloned());

        let position = (offset as isize + rhs.position).max(0);
        while position > 0 && (values.len() as isize) <= position {
            values.push(Symbol::blank());
        }
        Ok(Store::from_parts(values.into(), position))
    }

    /// Removes the last symbol. For a stack, this is the bottom-most visible symbol.
    pub(crate) fn without_last(&self) -> Store {
        let mut values = self.values.to_vec();
        values.pop();
        let position = self.position.min(values.len() as isize);
        Store::from_parts(values.into(), position)
    }

    /// Appends `symbol` at the end. For a stack, this puts it beneath the visible symbols.
    pub(crate) fn with_last(&self, symbol: Symbol) -> Store {
        let mut values = self.values.to_vec();
        values.push(symbol);
        Store::from_parts(values.into(), self.position)
    }
}

impl Display for Store {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_empty() {
            return match self.position {
                -1 => write!(f, "^ ε"),
                _ => write!(f, "ε"),
            };
        }
        // states print as `q`, not `[q]`
        if let (Some(x), 0) = (self.single(), self.position) {
            return write!(f, "{x}");
        }

        let mut parts = Vec::with_capacity(self.len() + 1);
        if self.position == -1 {
            parts.push("^".to_string());
        }
        for (i, x) in self.values.iter().enumerate() {
            if i as isize == self.position {
                parts.push(format!("[{x}]"));
            } else {
                parts.push(x.to_string());
            }
        }
        if self.position == self.len() as isize {
            parts.push("^".to_string());
        }
        write!(f, "{}", parts.join(" "))
    }
}

impl Debug for Store {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{self}")
    }
}

#[cfg(test)]
mod tests {
    use crate::prelude::*;

    fn store(text: &str, position: isize) -> Store {
        Store::with_position(text.parse::<Store>().unwrap().values().clone(), position).unwrap()
    }

    #[test]
    fn positions_are_validated() {
        let ab = Word::from_iter(["a", "b"]);
        assert!(Store::with_position(ab.clone(), -1).is_ok());
        assert!(Store::with_position(ab.clone(), 2).is_ok());
        assert_eq!(
            Store::with_position(ab.clone(), 3),
            Err(MachineError::InvalidPosition {
                position: 3,
                len: 2
            })
        );
        assert!(Store::with_position(ab, -2).is_err());
        assert_eq!(Store::empty(), Store::with_position(Word::epsilon(), 0).unwrap());
        assert!(Store::empty().at_boundary());
        assert!(!store("a b", 1).at_boundary());
    }

    #[test]
    fn display() {
        for (s, expected) in [
            (store("&", -1), "^ ε"),
            (store("&", 0), "ε"),
            (store("a", -1), "^ a"),
            (store("a", 0), "a"),
            (store("a", 1), "a ^"),
            (store("a b", -1), "^ a b"),
            (store("a b", 0), "[a] b"),
            (store("a b", 1), "a [b]"),
            (store("a b", 2), "a b ^"),
        ] {
            assert_eq!(s.to_string(), expected);
        }
    }

    #[test]
    fn stores_hash_and_sort_structurally() {
        let set: math::Set<Store> = [
            store("a b", 0),
            store("a b", 1),
            store("a b c", 0),
            store("a b", 1),
        ]
        .into_iter()
        .collect();
        assert_eq!(set.len(), 3);

        let mut sorted = vec![
            store("a b", 0),
            store("a b", 1),
            store("a b c", 0),
            store("a b", 1),
        ];
        sorted.sort();
        for permutation in itertools::Itertools::permutations(sorted.iter().cloned(), 4) {
            let mut permutation = permutation;
            permutation.sort();
            assert_eq!(permutation, sorted);
        }
    }

    #[test]
    fn blank_padding_only_satisfies_trailing_blanks() {
        // the pattern may reach past the end of the target only with blanks
        assert!(store("a _", 0).matches(&store("a a", 1)));
        assert!(store("_ _", 0).matches(&store("a", 1)));
        assert!(!store("a _", 0).matches(&store("a b", 1)));
        assert!(!store("_ b", 0).matches(&store("a", 1)));
        // inside the target, blanks are compared like any other symbol
        assert!(!store("_", 0).matches(&store("a", 0)));
        // the pattern never reaches past the left end
        assert!(!store("a a", 1).matches(&store("a a", 0)));
    }

    #[test]
    fn rewrite_pads_and_clamps() {
        let moved = store("a", 0)
            .rewrite(&store("a", 0), &store("b", 1))
            .unwrap();
        assert_eq!(moved, store("b _", 1));

        let left = store("a", 0)
            .rewrite(&store("a", 0), &store("b", -1))
            .unwrap();
        assert_eq!(left, store("b", 0));

        let popped = store("a", 0)
            .rewrite(&store("a", 0), &Store::empty())
            .unwrap();
        assert_eq!(popped, Store::empty());

        assert_eq!(
            store("a b", 0).rewrite(&store("b", 0), &Store::empty()),
            Err(Inapplicable)
        );
    }

    #[test]
    fn stack_helpers() {
        let s = store("x y z", 0);
        assert_eq!(s.without_last(), store("x y", 0));
        assert_eq!(s.without_last().with_last(Symbol::new("z")), s);
        assert_eq!(Store::empty().without_last(), Store::empty());
    }
}
