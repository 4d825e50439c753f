use std::fmt;

/// Expected number of invocations for a verification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Times {
    Never,
    Once,
    AtLeastOnce,
    AtLeast(usize),
    AtMost(usize),
    Exactly(usize),
    /// Inclusive on both ends
    Between(usize, usize),
}

impl Times {
    pub fn matches(&self, count: usize) -> bool {
        match *self {
            Times::Never => count == 0,
            Times::Once => count == 1,
            Times::AtLeastOnce => count >= 1,
            Times::AtLeast(n) => count >= n,
            Times::AtMost(n) => count <= n,
            Times::Exactly(n) => count == n,
            Times::Between(lo, hi) => lo <= count && count <= hi,
        }
    }
}

impl fmt::Display for Times {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Times::Never => write!(f, "never"),
            Times::Once => write!(f, "exactly once"),
            Times::AtLeastOnce => write!(f, "at least once"),
            Times::AtLeast(n) => write!(f, "at least {} times", n),
            Times::AtMost(n) => write!(f, "at most {} times", n),
            Times::Exactly(n) => write!(f, "exactly {} times", n),
            Times::Between(lo, hi) => write!(f, "between {} and {} times", lo, hi),
        }
    }
}
