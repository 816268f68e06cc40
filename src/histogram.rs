//! Joint (away runs, home runs) histogram.
//!
//! Cells are stored row-major by away score. Indices are clamped into the last row/column,
//! so extreme scores saturate instead of failing. The histogram either owns its cells or
//! wraps a caller-supplied buffer (the C ABI path); both are zeroed on construction.

use std::fmt;

use crate::config;
use crate::error::{Result, SimError};
use crate::game::Score;

enum Cells<'a> {
    Owned(Vec<u32>),
    Borrowed(&'a mut [u32]),
}

pub struct JointHistogram<'a> {
    cells: Cells<'a>,
    max_score: usize,
}

impl JointHistogram<'static> {
    /// Owned histogram sized by the process-wide [config::max_score].
    pub fn new() -> Self {
        Self::with_max_score(config::max_score())
    }

    pub fn with_max_score(max_score: usize) -> Self {
        let max_score = max_score.max(1);
        Self {
            cells: Cells::Owned(vec![0; max_score * max_score]),
            max_score,
        }
    }
}

impl Default for JointHistogram<'static> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a> JointHistogram<'a> {
    /// Wrap and zero the first `max_score * max_score` cells of `buffer`.
    pub fn from_buffer(buffer: &'a mut [u32], max_score: usize) -> Result<Self> {
        let max_score = max_score.max(1);
        let required = max_score * max_score;
        if buffer.len() < required {
            return Err(SimError::BufferTooSmall {
                len: buffer.len(),
                required,
            });
        }
        let cells = &mut buffer[..required];
        cells.fill(0);
        Ok(Self {
            cells: Cells::Borrowed(cells),
            max_score,
        })
    }

    pub fn max_score(&self) -> usize {
        self.max_score
    }

    pub fn as_slice(&self) -> &[u32] {
        match &self.cells {
            Cells::Owned(v) => v.as_slice(),
            Cells::Borrowed(s) => &s[..],
        }
    }

    fn as_mut_slice(&mut self) -> &mut [u32] {
        match &mut self.cells {
            Cells::Owned(v) => v.as_mut_slice(),
            Cells::Borrowed(s) => &mut s[..],
        }
    }

    fn index(&self, away: usize, home: usize) -> usize {
        let last = self.max_score - 1;
        away.min(last) * self.max_score + home.min(last)
    }

    pub fn get(&self, away: usize, home: usize) -> u32 {
        self.as_slice()[self.index(away, home)]
    }

    pub fn set(&mut self, away: usize, home: usize, count: u32) {
        let idx = self.index(away, home);
        self.as_mut_slice()[idx] = count;
    }

    pub fn increment(&mut self, away: usize, home: usize) {
        let idx = self.index(away, home);
        let cell = &mut self.as_mut_slice()[idx];
        *cell = cell.saturating_add(1);
    }

    /// Record one finished game.
    pub fn add_score(&mut self, score: &Score) {
        self.increment(score.away as usize, score.home as usize);
    }

    /// Cell-wise sum of `other` into `self`.
    pub fn merge(&mut self, other: &JointHistogram<'_>) -> Result<()> {
        if self.max_score != other.max_score {
            return Err(SimError::ShapeMismatch {
                left: self.max_score,
                right: other.max_score,
            });
        }
        for (cell, add) in self.as_mut_slice().iter_mut().zip(other.as_slice()) {
            *cell = cell.saturating_add(*add);
        }
        Ok(())
    }

    /// Number of games recorded.
    pub fn total(&self) -> u64 {
        self.as_slice().iter().map(|&c| u64::from(c)).sum()
    }

    /// Games per away score.
    pub fn away_marginal(&self) -> Vec<u64> {
        self.as_slice()
            .chunks_exact(self.max_score)
            .map(|row| row.iter().map(|&c| u64::from(c)).sum())
            .collect()
    }

    /// Games per home score.
    pub fn home_marginal(&self) -> Vec<u64> {
        let mut marginal = vec![0u64; self.max_score];
        for row in self.as_slice().chunks_exact(self.max_score) {
            for (acc, &c) in marginal.iter_mut().zip(row) {
                *acc += u64::from(c);
            }
        }
        marginal
    }

    /// `(away, home, count)` for every non-empty cell, in row-major order.
    pub fn iter_nonzero(&self) -> impl Iterator<Item = (usize, usize, u32)> + '_ {
        let n = self.max_score;
        self.as_slice()
            .iter()
            .enumerate()
            .filter(|&(_, &c)| c > 0)
            .map(move |(i, &c)| (i / n, i % n, c))
    }

    pub fn to_owned_histogram(&self) -> JointHistogram<'static> {
        JointHistogram {
            cells: Cells::Owned(self.as_slice().to_vec()),
            max_score: self.max_score,
        }
    }
}

impl PartialEq for JointHistogram<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.max_score == other.max_score && self.as_slice() == other.as_slice()
    }
}

impl fmt::Debug for JointHistogram<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JointHistogram")
            .field("max_score", &self.max_score)
            .field("borrowed", &matches!(self.cells, Cells::Borrowed(_)))
            .field("total", &self.total())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_empty() {
        let hist = JointHistogram::with_max_score(16);
        assert_eq!(hist.total(), 0);
        assert_eq!(hist.as_slice().len(), 256);
    }

    #[test]
    fn add_score_increments_one_cell() {
        let mut hist = JointHistogram::with_max_score(16);
        hist.add_score(&Score::new(3, 5));
        hist.add_score(&Score::new(3, 5));
        hist.add_score(&Score::new(5, 3));
        assert_eq!(hist.get(3, 5), 2);
        assert_eq!(hist.get(5, 3), 1);
        assert_eq!(hist.total(), 3);
    }

    #[test]
    fn scores_beyond_bound_clamp_to_last_cell() {
        let mut hist = JointHistogram::with_max_score(256);
        hist.add_score(&Score::new(300, 2));
        hist.add_score(&Score::new(2, 1_000));
        assert_eq!(hist.get(255, 2), 1);
        assert_eq!(hist.get(300, 2), 1);
        assert_eq!(hist.get(2, 255), 1);
        assert_eq!(hist.total(), 2);
    }

    #[test]
    fn set_uses_clamped_indices() {
        let mut hist = JointHistogram::with_max_score(4);
        hist.set(10, 10, 7);
        assert_eq!(hist.get(3, 3), 7);
    }

    #[test]
    fn borrowed_buffer_is_zeroed_and_written_through() {
        let mut buffer = vec![9u32; 20];
        {
            let mut hist = JointHistogram::from_buffer(&mut buffer, 4).expect("large enough");
            assert_eq!(hist.total(), 0);
            hist.add_score(&Score::new(1, 2));
        }
        assert_eq!(buffer[6], 1);
        assert_eq!(buffer[..16].iter().sum::<u32>(), 1);
        assert_eq!(&buffer[16..], &[9, 9, 9, 9]);
    }

    #[test]
    fn undersized_buffer_is_rejected() {
        let mut buffer = vec![0u32; 15];
        let err = JointHistogram::from_buffer(&mut buffer, 4).expect_err("too small");
        assert!(matches!(err, SimError::BufferTooSmall { len: 15, required: 16 }));
    }

    #[test]
    fn merge_adds_cellwise_and_checks_shape() {
        let mut a = JointHistogram::with_max_score(8);
        let mut b = JointHistogram::with_max_score(8);
        a.add_score(&Score::new(1, 0));
        b.add_score(&Score::new(1, 0));
        b.add_score(&Score::new(0, 4));
        a.merge(&b).expect("same shape");
        assert_eq!(a.get(1, 0), 2);
        assert_eq!(a.get(0, 4), 1);

        let c = JointHistogram::with_max_score(9);
        assert!(matches!(a.merge(&c), Err(SimError::ShapeMismatch { left: 8, right: 9 })));
    }

    #[test]
    fn marginals_sum_rows_and_columns() {
        let mut hist = JointHistogram::with_max_score(5);
        hist.add_score(&Score::new(1, 2));
        hist.add_score(&Score::new(1, 3));
        hist.add_score(&Score::new(4, 2));
        assert_eq!(hist.away_marginal(), vec![0, 2, 0, 0, 1]);
        assert_eq!(hist.home_marginal(), vec![0, 0, 2, 1, 0]);
    }

    #[test]
    fn iter_nonzero_lists_filled_cells() {
        let mut hist = JointHistogram::with_max_score(5);
        hist.add_score(&Score::new(4, 2));
        hist.add_score(&Score::new(1, 3));
        hist.add_score(&Score::new(1, 3));
        let cells: Vec<_> = hist.iter_nonzero().collect();
        assert_eq!(cells, vec![(1, 3, 2), (4, 2, 1)]);
    }
}
