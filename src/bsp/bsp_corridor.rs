// src/bsp/bsp_corridor.rs
//! Straight corridor search between the shapes of two sibling subtrees.

use log::trace;
use rand::Rng;

use crate::bsp::Rect2D;
use crate::config::CorridorConfig;
use crate::error::SearchError;

/// How two shapes line up, and the shared span a corridor may use.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Overlap {
    /// The x ranges share `[lo, hi]`; a vertical corridor bridges the y gap.
    Vertical { lo: f64, hi: f64 },
    /// The y ranges share `[lo, hi]`; a horizontal corridor bridges the x gap.
    Horizontal { lo: f64, hi: f64 },
}

impl Overlap {
    pub fn span(&self) -> f64 {
        match *self {
            Overlap::Vertical { lo, hi } | Overlap::Horizontal { lo, hi } => hi - lo,
        }
    }
}

/// Indices of the pair (one from each slice) whose centers are closest.
/// Ties keep the first pair encountered.
pub fn closest_pair(first: &[Rect2D], second: &[Rect2D]) -> Option<(usize, usize)> {
    let mut best: Option<(f64, (usize, usize))> = None;
    for (i, a) in first.iter().enumerate() {
        let center = a.center();
        for (j, b) in second.iter().enumerate() {
            let distance = center.distance_to(&b.center());
            if best.map_or(true, |(d, _)| distance < d) {
                best = Some((distance, (i, j)));
            }
        }
    }
    best.map(|(_, pair)| pair)
}

fn within(value: f64, lo: f64, hi: f64) -> bool {
    value >= lo && value <= hi
}

/// Classify two shapes. The four cases are tested in a fixed order: first's
/// x start inside second, first's y start inside second, then the mirrored
/// checks. `None` means no straight corridor can join them.
pub fn classify(first: &Rect2D, second: &Rect2D) -> Option<Overlap> {
    if within(first.min_x(), second.min_x(), second.max_x()) {
        Some(Overlap::Vertical {
            lo: first.min_x(),
            hi: first.max_x().min(second.max_x()),
        })
    } else if within(first.min_y(), second.min_y(), second.max_y()) {
        Some(Overlap::Horizontal {
            lo: first.min_y(),
            hi: first.max_y().min(second.max_y()),
        })
    } else if within(second.min_x(), first.min_x(), first.max_x()) {
        Some(Overlap::Vertical {
            lo: second.min_x(),
            hi: first.max_x().min(second.max_x()),
        })
    } else if within(second.min_y(), first.min_y(), first.max_y()) {
        Some(Overlap::Horizontal {
            lo: second.min_y(),
            hi: first.max_y().min(second.max_y()),
        })
    } else {
        None
    }
}

/// Lay a corridor of thickness `size` between `first` and `second`, centered
/// at a random point of their shared span. The corridor runs from the nearer
/// edge of one shape to the nearer edge of the other.
pub fn build_corridor<R: Rng + ?Sized>(
    rng: &mut R,
    first: &Rect2D,
    second: &Rect2D,
    size: f64,
) -> Option<Rect2D> {
    let overlap = classify(first, second)?;
    if overlap.span() < size {
        return None;
    }
    let half = size / 2.0;
    let corridor = match overlap {
        Overlap::Vertical { lo, hi } => {
            let low = lo + half;
            let center = rng.random_range(low..=(hi - half).max(low));
            Rect2D::from_edges(
                center - half,
                first.max_y().min(second.max_y()),
                center + half,
                first.min_y().max(second.min_y()),
            )
        }
        Overlap::Horizontal { lo, hi } => {
            let low = lo + half;
            let center = rng.random_range(low..=(hi - half).max(low));
            Rect2D::from_edges(
                first.max_x().min(second.max_x()),
                center - half,
                first.min_x().max(second.min_x()),
                center + half,
            )
        }
    };
    Some(corridor)
}

/// Find a corridor joining some shape of `first` to some shape of `second`.
///
/// The closest-centered pair is tried first; every failure after that
/// switches to a uniformly random pair, up to `rules.max_attempts` tries.
pub fn find_corridor<R: Rng + ?Sized>(
    rng: &mut R,
    first: &[Rect2D],
    second: &[Rect2D],
    rules: &CorridorConfig,
) -> Result<Rect2D, SearchError> {
    let (mut i, mut j) = closest_pair(first, second).ok_or(SearchError::EmptyCandidates)?;

    for attempt in 1..=rules.max_attempts {
        if let Some(corridor) = build_corridor(rng, &first[i], &second[j], rules.size) {
            trace!("corridor {:?} found on attempt {}", corridor, attempt);
            return Ok(corridor);
        }
        trace!("pair ({}, {}) cannot be joined, attempt {}", i, j, attempt);
        i = rng.random_range(0..first.len());
        j = rng.random_range(0..second.len());
    }

    Err(SearchError::Exhausted {
        attempts: rules.max_attempts,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_approx_eq::assert_approx_eq;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn rng() -> ChaCha8Rng {
        ChaCha8Rng::seed_from_u64(11)
    }

    #[test]
    fn test_closest_pair() {
        let first = [Rect2D::new(0.0, 0.0, 10.0, 10.0), Rect2D::new(50.0, 0.0, 10.0, 10.0)];
        let second = [Rect2D::new(0.0, 80.0, 10.0, 10.0), Rect2D::new(52.0, 20.0, 10.0, 10.0)];
        assert_eq!(closest_pair(&first, &second), Some((1, 1)));
        assert_eq!(closest_pair(&first, &[]), None);
    }

    #[test]
    fn test_closest_pair_tie_keeps_first() {
        let first = [Rect2D::new(10.0, 0.0, 2.0, 2.0)];
        let second = [Rect2D::new(0.0, 0.0, 2.0, 2.0), Rect2D::new(20.0, 0.0, 2.0, 2.0)];
        assert_eq!(closest_pair(&first, &second), Some((0, 0)));
    }

    #[test]
    fn test_classify_cases() {
        let a = Rect2D::new(0.0, 0.0, 10.0, 10.0);
        let above = Rect2D::new(2.0, 20.0, 10.0, 10.0);
        let beside = Rect2D::new(15.0, 3.0, 10.0, 10.0);
        let diagonal = Rect2D::new(20.0, 20.0, 5.0, 5.0);

        assert_eq!(classify(&a, &above), Some(Overlap::Vertical { lo: 2.0, hi: 10.0 }));
        assert_eq!(classify(&above, &a), Some(Overlap::Vertical { lo: 2.0, hi: 10.0 }));
        assert_eq!(classify(&a, &beside), Some(Overlap::Horizontal { lo: 3.0, hi: 10.0 }));
        assert_eq!(classify(&a, &diagonal), None);
    }

    #[test]
    fn test_build_vertical_corridor() {
        let mut rng = rng();
        let a = Rect2D::new(0.0, 0.0, 10.0, 10.0);
        let above = Rect2D::new(2.0, 20.0, 10.0, 10.0);
        for _ in 0..50 {
            let corridor = build_corridor(&mut rng, &a, &above, 4.0).unwrap();
            assert_approx_eq!(corridor.width, 4.0);
            assert_approx_eq!(corridor.min_y(), 10.0);
            assert_approx_eq!(corridor.max_y(), 20.0);
            assert!(corridor.min_x() >= 2.0 - 1e-9 && corridor.max_x() <= 10.0 + 1e-9);
            assert!(corridor.touches(&a) && corridor.touches(&above));
        }
    }

    #[test]
    fn test_build_horizontal_corridor() {
        let mut rng = rng();
        let a = Rect2D::new(0.0, 0.0, 10.0, 10.0);
        let beside = Rect2D::new(15.0, 3.0, 10.0, 10.0);
        let corridor = build_corridor(&mut rng, &beside, &a, 4.0).unwrap();
        assert_approx_eq!(corridor.height, 4.0);
        assert_approx_eq!(corridor.min_x(), 10.0);
        assert_approx_eq!(corridor.width, 5.0);
        assert!(corridor.touches(&a) && corridor.touches(&beside));
    }

    #[test]
    fn test_exact_span_fits_corridor() {
        let mut rng = rng();
        let a = Rect2D::new(0.0, 0.0, 10.0, 10.0);
        let above = Rect2D::new(6.0, 30.0, 10.0, 10.0);
        let corridor = build_corridor(&mut rng, &a, &above, 4.0).unwrap();
        assert_approx_eq!(corridor.min_x(), 6.0);
    }

    #[test]
    fn test_narrow_span_rejected() {
        let mut rng = rng();
        let a = Rect2D::new(0.0, 0.0, 10.0, 10.0);
        let above = Rect2D::new(8.0, 20.0, 10.0, 10.0);
        assert_eq!(build_corridor(&mut rng, &a, &above, 4.0), None);
    }

    #[test]
    fn test_overlapping_shapes_yield_valid_corridor() {
        let mut rng = rng();
        let a = Rect2D::new(0.0, 0.0, 20.0, 20.0);
        let b = Rect2D::new(5.0, 10.0, 20.0, 20.0);
        let corridor = build_corridor(&mut rng, &a, &b, 4.0).unwrap();
        assert!(corridor.height >= 0.0 && corridor.width >= 0.0);
        assert!(corridor.touches(&a) && corridor.touches(&b));
    }

    #[test]
    fn test_random_fallback_finds_viable_pair() {
        let mut rng = rng();
        let first = [Rect2D::new(0.0, 0.0, 10.0, 10.0)];
        let second = [
            Rect2D::new(12.0, 12.0, 5.0, 5.0),
            Rect2D::new(0.0, 40.0, 10.0, 10.0),
        ];
        let corridor = find_corridor(&mut rng, &first, &second, &CorridorConfig::default()).unwrap();
        assert!(corridor.touches(&first[0]));
        assert!(corridor.touches(&second[1]));
    }

    #[test]
    fn test_search_exhausted() {
        let mut rng = rng();
        let first = [Rect2D::new(0.0, 0.0, 10.0, 10.0)];
        let second = [Rect2D::new(20.0, 20.0, 5.0, 5.0)];
        assert_eq!(
            find_corridor(&mut rng, &first, &second, &CorridorConfig::default()),
            Err(SearchError::Exhausted { attempts: 100 })
        );
        assert_eq!(
            find_corridor(&mut rng, &[], &second, &CorridorConfig::default()),
            Err(SearchError::EmptyCandidates)
        );
    }
}
