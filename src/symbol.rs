use std::{
    fmt::{Debug, Display},
    ops::{Add, Bound, Deref, RangeBounds},
    sync::Arc,
};

use itertools::Itertools;

/// Name of the blank symbol, which pads stores on the right.
pub const BLANK: &str = "_";

/// An atomic token: a state name, an input or stack symbol, a tape symbol and so on.
///
/// Symbols are cheap to clone and compare structurally, ordering is the ordering of their names.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Symbol(Arc<str>);

impl Symbol {
    /// Creates a symbol with the given name.
    pub fn new(name: impl AsRef<str>) -> Self {
        Self(Arc::from(name.as_ref()))
    }

    /// The blank symbol `_`.
    pub fn blank() -> Self {
        Self::new(BLANK)
    }

    /// Returns true if `self` is the blank symbol.
    pub fn is_blank(&self) -> bool {
        &*self.0 == BLANK
    }

    /// The name of the symbol.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Creates a symbol naming a set of symbols, printed as `{q1,q2}`. The caller decides the
    /// order, so canonical names require sorted input.
    pub fn set<'a, I: IntoIterator<Item = &'a Symbol>>(members: I) -> Self {
        Self::new(format!("{{{}}}", members.into_iter().join(",")))
    }

    /// Creates a symbol naming a pair of symbols, printed as `(q1,q2)`.
    pub fn pair(left: &Symbol, right: &Symbol) -> Self {
        Self::new(format!("({left},{right})"))
    }
}

impl Display for Symbol {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Debug for Symbol {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for Symbol {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for Symbol {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

impl From<&Symbol> for Symbol {
    fn from(value: &Symbol) -> Self {
        value.clone()
    }
}

/// An immutable sequence of [`Symbol`]s. The empty word represents ε.
#[derive(Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Word(Vec<Symbol>);

impl Word {
    /// The empty word ε.
    pub fn epsilon() -> Self {
        Self(vec![])
    }

    /// Returns the symbols of the word.
    pub fn symbols(&self) -> &[Symbol] {
        &self.0
    }

    /// Returns the subword covering `range`.
    ///
    /// # Panics
    /// If `range` is out of bounds, just like slicing.
    pub fn slice<R: RangeBounds<usize>>(&self, range: R) -> Word {
        let bounds: (Bound<usize>, Bound<usize>) =
            (range.start_bound().cloned(), range.end_bound().cloned());
        Word(self.0[bounds].to_vec())
    }

    /// Returns the concatenation of `self` and `other`.
    pub fn concat(&self, other: &Word) -> Word {
        Word(self.0.iter().chain(other.0.iter()).cloned().collect())
    }
}

impl Deref for Word {
    type Target = [Symbol];
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl<S: Into<Symbol>> FromIterator<S> for Word {
    fn from_iter<T: IntoIterator<Item = S>>(iter: T) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}

impl From<Vec<Symbol>> for Word {
    fn from(value: Vec<Symbol>) -> Self {
        Self(value)
    }
}

impl From<&[Symbol]> for Word {
    fn from(value: &[Symbol]) -> Self {
        Self(value.to_vec())
    }
}

impl<const N: usize> From<[Symbol; N]> for Word {
    fn from(value: [Symbol; N]) -> Self {
        Self(value.to_vec())
    }
}

impl From<Word> for Vec<Symbol> {
    fn from(value: Word) -> Self {
        value.0
    }
}

impl IntoIterator for Word {
    type Item = Symbol;
    type IntoIter = std::vec::IntoIter<Symbol>;
    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a Word {
    type Item = &'a Symbol;
    type IntoIter = std::slice::Iter<'a, Symbol>;
    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl Add<&Word> for &Word {
    type Output = Word;
    fn add(self, rhs: &Word) -> Self::Output {
        self.concat(rhs)
    }
}

impl Display for Word {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_empty() {
            write!(f, "ε")
        } else {
            write!(f, "{}", self.0.iter().join(" "))
        }
    }
}

impl Debug for Word {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "\"{self}\"")
    }
}
