mod determinize;
pub use determinize::determinize;

mod equivalence;
pub use equivalence::equivalent;

mod intersect;
pub use intersect::intersect;

mod prefix;
pub use prefix::prefix;
