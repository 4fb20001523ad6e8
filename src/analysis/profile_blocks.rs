//! Piecewise representation of a projected scalar (temporal distance,
//! boarding count) as a function of departure time, and the statistics of
//! that function under the uniform-departure-time measure.

/// One half-open interval `[start_time, end_time)` over which the
/// projected distance is either constant (`distance_start ==
/// distance_end`) or linearly interpolated between the two endpoints.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProfileBlock {
    pub start_time: f64,
    pub end_time: f64,
    pub distance_start: f64,
    pub distance_end: f64,
}

impl ProfileBlock {
    pub fn flat(start_time: f64, end_time: f64, distance: f64) -> Self {
        Self {
            start_time,
            end_time,
            distance_start: distance,
            distance_end: distance,
        }
    }

    pub fn width(&self) -> f64 {
        self.end_time - self.start_time
    }

    pub fn is_flat(&self) -> bool {
        self.distance_start == self.distance_end
    }

    pub fn min_distance(&self) -> f64 {
        self.distance_start.min(self.distance_end)
    }

    pub fn max_distance(&self) -> f64 {
        self.distance_start.max(self.distance_end)
    }

    /// Time-integral of the distance over the block.
    pub fn area(&self) -> f64 {
        self.width() * (self.distance_start + self.distance_end) / 2.0
    }
}

/// Statistics over an ordered, non-overlapping, boundary-contiguous block
/// sequence covering one query window.
///
/// A departure instant drawn uniformly from the window lands in a block
/// with probability proportional to the block's width; within a slanted
/// block the distance value is uniform between the two endpoints, within a
/// flat block it is a point mass. Blocks with infinite distance carry
/// their width as mass at infinity.
#[derive(Debug, Clone)]
pub struct ProfileBlockAnalyzer {
    blocks: Vec<ProfileBlock>,
}

impl ProfileBlockAnalyzer {
    pub fn new(blocks: Vec<ProfileBlock>) -> Self {
        debug_assert!(
            blocks
                .windows(2)
                .all(|pair| pair[0].end_time == pair[1].start_time),
            "profile blocks must be contiguous"
        );
        debug_assert!(blocks.iter().all(|block| block.width() >= 0.0));
        Self { blocks }
    }

    pub fn blocks(&self) -> &[ProfileBlock] {
        &self.blocks
    }

    fn total_width(&self) -> f64 {
        self.blocks.iter().map(ProfileBlock::width).sum()
    }

    pub fn min(&self) -> f64 {
        self.blocks
            .iter()
            .map(ProfileBlock::min_distance)
            .fold(f64::INFINITY, f64::min)
    }

    pub fn max(&self) -> f64 {
        self.blocks
            .iter()
            .map(ProfileBlock::max_distance)
            .fold(f64::NEG_INFINITY, f64::max)
    }

    pub fn mean(&self) -> f64 {
        let total_width = self.total_width();
        if total_width == 0.0 {
            return f64::NAN;
        }
        self.blocks.iter().map(ProfileBlock::area).sum::<f64>() / total_width
    }

    /// Exact inversion of the distance CDF at one half of the total mass.
    /// Infinite when more than half of the window is unreachable.
    pub fn median(&self) -> f64 {
        let total_mass = self.total_width();
        if total_mass == 0.0 {
            return f64::NAN;
        }
        let target = 0.5 * total_mass;

        let (split_points, cdf) = self.distance_cdf_unnormalized();
        if split_points.is_empty() || cdf[cdf.len() - 1] < target {
            return f64::INFINITY;
        }

        let mut index = 0;
        while cdf[index] < target {
            index += 1;
        }
        if index == 0 {
            return split_points[0];
        }
        let continuous_mass = self.continuous_mass_between(split_points[index - 1], split_points[index]);
        let missing = target - cdf[index - 1];
        if missing >= continuous_mass {
            // the target falls inside the point mass carried at this split
            return split_points[index];
        }
        let dx = split_points[index] - split_points[index - 1];
        split_points[index - 1] + missing / continuous_mass * dx
    }

    /// CDF of the distance distribution: `cdf[i]` is the (unnormalized)
    /// mass of departure instants whose distance is `<= split_points[i]`.
    pub(crate) fn distance_cdf_unnormalized(&self) -> (Vec<f64>, Vec<f64>) {
        let mut split_points: Vec<f64> = self
            .blocks
            .iter()
            .flat_map(|block| [block.min_distance(), block.max_distance()])
            .filter(|distance| distance.is_finite())
            .collect();
        split_points.sort_by(|a, b| a.partial_cmp(b).unwrap());
        split_points.dedup();

        let cdf = split_points
            .iter()
            .map(|&x| {
                self.blocks
                    .iter()
                    .map(|block| block_mass_at_or_below(block, x))
                    .sum()
            })
            .collect();
        (split_points, cdf)
    }

    fn continuous_mass_between(&self, lo: f64, hi: f64) -> f64 {
        self.blocks
            .iter()
            .filter(|block| !block.is_flat())
            .map(|block| {
                let (dmin, dmax) = (block.min_distance(), block.max_distance());
                if !dmax.is_finite() {
                    return 0.0;
                }
                let overlap = (hi.min(dmax) - lo.max(dmin)).max(0.0);
                block.width() * overlap / (dmax - dmin)
            })
            .sum()
    }
}

fn block_mass_at_or_below(block: &ProfileBlock, x: f64) -> f64 {
    let (dmin, dmax) = (block.min_distance(), block.max_distance());
    if dmin > x {
        return 0.0;
    }
    if block.is_flat() {
        // point mass at the block's constant distance
        return block.width();
    }
    if !dmax.is_finite() {
        return 0.0;
    }
    let covered = (x.min(dmax) - dmin) / (dmax - dmin);
    block.width() * covered
}
