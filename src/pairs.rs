use std::sync::Arc;

/// Capacity of a freshly created list, enough for a typical single record
pub const DEFAULT_PAIR_CAPACITY: usize = 200;

/// Multiplier applied to the capacity when a full list receives another pair
pub const GROWTH_FACTOR: f64 = 1.3;

/// Immutable sequence identifier, shared between all pairs of one record
pub type SequenceId = Arc<str>;

/// A minimizer hash and the identifier of the sequence it was found in
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MinimizerPair {
    pub hash: u64,
    pub id: SequenceId,
}

impl MinimizerPair {
    pub fn new(hash: u64, id: impl Into<SequenceId>) -> Self {
        Self {
            hash,
            id: id.into(),
        }
    }
}

/// Growable list of minimizer pairs in insertion order until sorted
///
/// Growth is by [`GROWTH_FACTOR`] rather than `Vec`'s doubling. Allocation
/// failure during growth aborts; there is no partial-failure mode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PairList {
    pairs: Vec<MinimizerPair>,
}

impl Default for PairList {
    fn default() -> Self {
        Self::new()
    }
}

impl PairList {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_PAIR_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            pairs: Vec::with_capacity(capacity),
        }
    }

    /// Append a pair at the end, growing the backing storage when full
    pub fn push(&mut self, pair: MinimizerPair) {
        if self.pairs.len() == self.pairs.capacity() {
            self.grow();
        }
        self.pairs.push(pair);
    }

    fn grow(&mut self) {
        let capacity = self.pairs.capacity();
        let target = ((capacity as f64) * GROWTH_FACTOR) as usize;
        let target = target.max(capacity + 1);
        self.pairs.reserve_exact(target - self.pairs.len());
    }

    /// Sort in place by hash; order among equal hashes is unspecified
    pub fn sort(&mut self) {
        self.pairs.sort_unstable_by_key(|pair| pair.hash);
    }

    pub fn is_sorted(&self) -> bool {
        self.pairs.windows(2).all(|w| w[0].hash <= w[1].hash)
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.pairs.capacity()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, MinimizerPair> {
        self.pairs.iter()
    }

    pub fn as_slice(&self) -> &[MinimizerPair] {
        &self.pairs
    }
}

impl<'a> IntoIterator for &'a PairList {
    type Item = &'a MinimizerPair;
    type IntoIter = std::slice::Iter<'a, MinimizerPair>;

    fn into_iter(self) -> Self::IntoIter {
        self.pairs.iter()
    }
}

impl IntoIterator for PairList {
    type Item = MinimizerPair;
    type IntoIter = std::vec::IntoIter<MinimizerPair>;

    fn into_iter(self) -> Self::IntoIter {
        self.pairs.into_iter()
    }
}

impl FromIterator<MinimizerPair> for PairList {
    fn from_iter<I: IntoIterator<Item = MinimizerPair>>(iter: I) -> Self {
        let mut list = PairList::new();
        list.extend(iter);
        list
    }
}

impl Extend<MinimizerPair> for PairList {
    fn extend<I: IntoIterator<Item = MinimizerPair>>(&mut self, iter: I) {
        for pair in iter {
            self.push(pair);
        }
    }
}
