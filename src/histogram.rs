use std::collections::TryReserveError;

use thiserror::Error;

/// Errors that could occur while building a [`StreamingHistogram`].
#[derive(Debug, Error)]
pub enum BuildError {
    /// The requested bin capacity was zero.
    ///
    /// A histogram with no bins can never retain a centroid, so the configuration is rejected
    /// outright rather than being treated as a degenerate counter.
    #[error("max_bins must be nonzero")]
    ZeroBins,

    /// Backing storage for the bins could not be allocated.
    #[error("failed to allocate bin storage: {0}")]
    Allocation(#[from] TryReserveError),
}

/// A weighted centroid.
///
/// Bins are the unit of approximation in a [`StreamingHistogram`]: a representative value plus
/// the number of observations that have been folded into it.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Bin {
    /// Representative value of all observations folded into this bin.
    pub centroid: f64,
    /// Number of observations folded into this bin.
    pub weight: u64,
}

/// A bounded-memory streaming histogram.
///
/// `StreamingHistogram` summarizes an unbounded stream of floating-point observations with a
/// fixed number of weighted centroids, in the style of the streaming histograms described by
/// [Ben-Haim & Tom-Tov][bht]. Observations are folded into a sorted centroid set one at a time:
/// a value that exactly matches an existing centroid increments that centroid's weight, a new
/// value below capacity becomes a centroid of its own, and once the histogram is full, inserting
/// a new value collapses the two closest centroids into their weighted mean.
///
/// Memory usage is fixed at construction: `max_bins + 1` slots of sixteen bytes each, with the
/// extra slot serving as working space while the histogram is momentarily over capacity. There
/// is no reallocation after construction, and `insert` never fails.
///
/// This type tracks the true minimum and maximum of the raw observations independently of the
/// centroids, so `min`/`max` are exact even though the distribution between them is
/// approximate. It makes no attempt to expose quantiles; callers wanting quantile estimates
/// should derive them from the [`bins`](StreamingHistogram::bins) snapshot.
///
/// [bht]: https://jmlr.org/papers/v11/ben-haim10a.html
#[derive(Clone, Debug)]
pub struct StreamingHistogram {
    bins: Box<[Bin]>,
    max_bins: usize,
    num_bins: usize,
    gap: usize,
    count: u64,
    min: f64,
    max: f64,
}

impl StreamingHistogram {
    /// Creates a new [`StreamingHistogram`] with the given bin capacity.
    ///
    /// Storage for `max_bins + 1` bins is allocated up front and never grows. Returns an error
    /// if `max_bins` is zero, or if the backing storage cannot be allocated.
    pub fn new(max_bins: usize) -> Result<StreamingHistogram, BuildError> {
        if max_bins == 0 {
            return Err(BuildError::ZeroBins);
        }

        // One slot past `max_bins` is working space: it briefly holds the extra bin while an
        // over-capacity insertion is being merged back down.
        let slots = max_bins.saturating_add(1);
        let mut bins = Vec::new();
        bins.try_reserve_exact(slots)?;
        bins.resize(slots, Bin::default());

        Ok(StreamingHistogram {
            bins: bins.into_boxed_slice(),
            max_bins,
            num_bins: 0,
            gap: 0,
            count: 0,
            min: f64::INFINITY,
            max: f64::NEG_INFINITY,
        })
    }

    /// Gets the configured bin capacity.
    pub fn max_bins(&self) -> usize {
        self.max_bins
    }

    /// Gets the number of live bins, which never exceeds the configured capacity.
    pub fn len(&self) -> usize {
        self.num_bins
    }

    /// Returns `true` if no observations have been folded into a bin yet.
    pub fn is_empty(&self) -> bool {
        self.num_bins == 0
    }

    /// Gets the total number of observations recorded.
    pub fn count(&self) -> u64 {
        self.count
    }

    /// Gets the minimum observation recorded so far, or `f64::INFINITY` if none have been.
    ///
    /// Extrema are tracked against the raw observations, so this is exact regardless of how
    /// much centroid merging has taken place.
    pub fn min(&self) -> f64 {
        self.min
    }

    /// Gets the maximum observation recorded so far, or `f64::NEG_INFINITY` if none have been.
    pub fn max(&self) -> f64 {
        self.max
    }

    /// Gets a snapshot of the live bins, in ascending centroid order.
    ///
    /// The snapshot has [`len`](StreamingHistogram::len) entries, and the sum of their weights
    /// equals [`count`](StreamingHistogram::count).
    pub fn bins(&self) -> Vec<Bin> {
        // Live bins sit in slots 0..=num_bins, minus the hole. Right after an at-capacity
        // merge the hole is interior, so the live range is not necessarily contiguous.
        let mut bins = Vec::with_capacity(self.num_bins);
        for slot in 0..=self.num_bins {
            if slot != self.gap {
                bins.push(self.bins[slot]);
            }
        }
        bins
    }

    /// Records a single observation.
    ///
    /// If the observation exactly equals an existing centroid, that centroid's weight is
    /// incremented. Otherwise it becomes a new bin, and if the histogram was already at
    /// capacity, the two closest centroids are immediately collapsed into their weighted mean
    /// to make room.
    ///
    /// NaN observations are dropped without being recorded; ordering comparisons against NaN
    /// are always false, which would corrupt the sorted centroid set.
    pub fn insert(&mut self, observation: f64) {
        if observation.is_nan() {
            return;
        }

        self.count += 1;
        if observation < self.min {
            self.min = observation;
        }
        if observation > self.max {
            self.max = observation;
        }

        // Walk the hole left over from the previous call to the observation's sorted position,
        // shifting neighbors across it. An exact centroid match along the way folds the
        // observation into that bin instead.
        loop {
            if self.gap > 0 {
                let left = self.bins[self.gap - 1];
                if left.centroid > observation {
                    self.bins[self.gap] = left;
                    self.gap -= 1;
                    continue;
                }
                if left.centroid == observation {
                    self.bins[self.gap - 1].weight += 1;
                    return;
                }
            }

            if self.gap < self.num_bins {
                let right = self.bins[self.gap + 1];
                if right.centroid < observation {
                    self.bins[self.gap] = right;
                    self.gap += 1;
                    continue;
                }
                if right.centroid == observation {
                    self.bins[self.gap + 1].weight += 1;
                    return;
                }
            }

            break;
        }

        self.bins[self.gap] = Bin { centroid: observation, weight: 1 };

        if self.num_bins < self.max_bins {
            self.num_bins += 1;
            self.gap = self.num_bins;
            return;
        }

        // All max_bins + 1 slots are live and contiguous at this point. Collapse the closest
        // adjacent pair into its weighted mean, stored in the pair's right slot; the left slot
        // becomes the hole for the next insertion. Ties go to the lowest index.
        self.gap = 0;
        let mut min_delta = self.bins[1].centroid - self.bins[0].centroid;
        for slot in 1..self.num_bins {
            let delta = self.bins[slot + 1].centroid - self.bins[slot].centroid;
            if delta < min_delta {
                min_delta = delta;
                self.gap = slot;
            }
        }

        let left = self.bins[self.gap];
        let right = self.bins[self.gap + 1];
        let weight = left.weight + right.weight;
        self.bins[self.gap + 1] = Bin {
            centroid: (left.centroid * left.weight as f64 + right.centroid * right.weight as f64)
                / weight as f64,
            weight,
        };
    }
}
