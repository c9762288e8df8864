//! Sets of state indices.
//!
//! Labels, target sets and visited sets of a chain with `n` states are all
//! subsets of `0..n`, stored as a fixed-size bit vector.

/// A set of state indices over the universe `0..universe`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct BitSet {
    /// Storage: each u64 holds 64 bits
    words: Vec<u64>,
    /// Number of representable indices
    universe: usize,
    /// Number of set bits (cached for O(1) len())
    count: usize,
}

impl BitSet {
    /// Number of bits per word.
    const BITS_PER_WORD: usize = 64;

    /// Creates an empty set over `0..universe`.
    pub fn new(universe: usize) -> Self {
        let num_words = universe.div_ceil(Self::BITS_PER_WORD);
        Self {
            words: vec![0; num_words],
            universe,
            count: 0,
        }
    }

    /// Creates the set containing every index of `0..universe`.
    pub fn full(universe: usize) -> Self {
        Self::from_fn(universe, |_| true)
    }

    /// Creates the set of indices satisfying `pred`.
    pub fn from_fn(universe: usize, mut pred: impl FnMut(usize) -> bool) -> Self {
        let mut set = Self::new(universe);
        for index in 0..universe {
            if pred(index) {
                set.insert(index);
            }
        }
        set
    }

    /// Returns the number of set bits.
    #[inline]
    pub fn len(&self) -> usize {
        self.count
    }

    /// Returns true if no bits are set.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    #[inline]
    pub fn universe(&self) -> usize {
        self.universe
    }

    #[inline]
    fn word_and_bit(index: usize) -> (usize, u64) {
        (index / Self::BITS_PER_WORD, 1u64 << (index % Self::BITS_PER_WORD))
    }

    /// Returns true if the bit at the given index is set.
    #[inline]
    pub fn contains(&self, index: usize) -> bool {
        if index >= self.universe {
            return false;
        }
        let (word, mask) = Self::word_and_bit(index);
        self.words[word] & mask != 0
    }

    /// Sets the bit at the given index. Returns true if the bit was not previously set.
    ///
    /// # Panics
    ///
    /// Panics if `index` is outside the universe.
    #[inline]
    pub fn insert(&mut self, index: usize) -> bool {
        assert!(index < self.universe, "Index {} is outside of universe {}", index, self.universe);
        let (word, mask) = Self::word_and_bit(index);
        let was_clear = self.words[word] & mask == 0;
        if was_clear {
            self.words[word] |= mask;
            self.count += 1;
        }
        was_clear
    }

    /// Clears the bit at the given index. Returns true if the bit was previously set.
    #[inline]
    pub fn remove(&mut self, index: usize) -> bool {
        if index >= self.universe {
            return false;
        }
        let (word, mask) = Self::word_and_bit(index);
        let was_set = self.words[word] & mask != 0;
        if was_set {
            self.words[word] &= !mask;
            self.count -= 1;
        }
        was_set
    }

    fn recount(&mut self) {
        self.count = self.words.iter().map(|w| w.count_ones() as usize).sum();
    }

    fn zip_with(&self, other: &Self, op: impl Fn(u64, u64) -> u64) -> Self {
        assert_eq!(self.universe, other.universe, "Universe mismatch");
        let mut result = Self {
            words: self.words.iter().zip(&other.words).map(|(&a, &b)| op(a, b)).collect(),
            universe: self.universe,
            count: 0,
        };
        result.recount();
        result
    }

    pub fn union(&self, other: &Self) -> Self {
        self.zip_with(other, |a, b| a | b)
    }

    pub fn intersection(&self, other: &Self) -> Self {
        self.zip_with(other, |a, b| a & b)
    }

    /// Returns the indices of the universe that are not in the set.
    pub fn complement(&self) -> Self {
        let mut result = Self {
            words: self.words.iter().map(|w| !w).collect(),
            universe: self.universe,
            count: 0,
        };
        // Clear the padding bits past the universe.
        let tail = self.universe % Self::BITS_PER_WORD;
        if tail != 0 {
            if let Some(last) = result.words.last_mut() {
                *last &= (1u64 << tail) - 1;
            }
        }
        result.recount();
        result
    }

    /// Returns an iterator over all set bit indices, in increasing order.
    pub fn iter(&self) -> BitSetIter<'_> {
        BitSetIter {
            bitset: self,
            word_idx: 0,
            current_word: self.words.first().copied().unwrap_or(0),
        }
    }
}

/// Iterator over set bits in a BitSet.
pub struct BitSetIter<'a> {
    bitset: &'a BitSet,
    word_idx: usize,
    current_word: u64,
}

impl Iterator for BitSetIter<'_> {
    type Item = usize;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if self.current_word != 0 {
                let bit_idx = self.current_word.trailing_zeros() as usize;
                self.current_word &= self.current_word - 1; // Clear lowest set bit
                return Some(self.word_idx * BitSet::BITS_PER_WORD + bit_idx);
            }

            self.word_idx += 1;
            if self.word_idx >= self.bitset.words.len() {
                return None;
            }
            self.current_word = self.bitset.words[self.word_idx];
        }
    }
}
