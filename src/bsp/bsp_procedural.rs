// src/bsp/bsp_procedural.rs

use std::time::Instant;

use log::{debug, info, warn};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use crate::bsp::{PartitionOutcome, PartitionTree, Rect2D};
use crate::config::{GeneratorConfig, PartitionMode};
use crate::error::{ConfigError, GenerationError, PassFailure, RoomError};

/// Drives partitioning, room placement and corridor connection.
///
/// One seeded RNG is shared by every stage, so a generator built from the
/// same config and seed always produces the same tree.
pub struct MapGenerator {
    config: GeneratorConfig,
    seed: u64,
    rng: ChaCha8Rng,
    stats: Option<GenerationStats>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GenerationStats {
    pub seed: u64,
    pub generation_time: f64,
    /// Fresh partitions made after the first one ran out of passes.
    pub restarts: u32,
    /// Room/connection passes used on the final partition.
    pub connection_passes: u32,
    pub leaf_count: usize,
    pub corridor_count: usize,
    pub max_depth: usize,
}

impl MapGenerator {
    pub fn new(config: GeneratorConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let seed = config.seed.unwrap_or_else(rand::random);
        Ok(MapGenerator {
            config,
            seed,
            rng: ChaCha8Rng::seed_from_u64(seed),
            stats: None,
        })
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    /// Statistics of the last successful [`generate`](Self::generate) call.
    pub fn stats(&self) -> Option<&GenerationStats> {
        self.stats.as_ref()
    }

    /// Generate a fully connected map covering `width` x `height`.
    ///
    /// A partition that runs out of connection passes is discarded and
    /// rebuilt, up to `max_restarts` times.
    pub fn generate(&mut self, width: f64, height: f64) -> Result<PartitionTree, GenerationError> {
        if !(width.is_finite() && height.is_finite() && width > 0.0 && height > 0.0) {
            return Err(GenerationError::InvalidDimensions { width, height });
        }
        let started = Instant::now();
        info!("generating {}x{} map with seed {}", width, height, self.seed);
        self.stats = None;

        let bounds = Rect2D::new(0.0, 0.0, width, height);
        let mut restarts = 0;
        loop {
            let mut tree = self.partition(bounds)?;
            match self.furnish(&mut tree) {
                Ok(passes) => {
                    let stats = GenerationStats {
                        seed: self.seed,
                        generation_time: started.elapsed().as_secs_f64(),
                        restarts,
                        connection_passes: passes,
                        leaf_count: tree.leaves().count(),
                        corridor_count: tree.corridors().count(),
                        max_depth: tree.max_depth(),
                    };
                    info!(
                        "map ready: {} rooms, {} corridors, {} passes, {} restarts",
                        stats.leaf_count, stats.corridor_count, passes, restarts
                    );
                    self.stats = Some(stats);
                    return Ok(tree);
                }
                Err(err @ GenerationError::PassesExhausted { .. }) => {
                    if restarts == self.config.max_restarts {
                        return Err(if restarts == 0 {
                            err
                        } else {
                            GenerationError::RestartsExhausted {
                                restarts,
                                last: Box::new(err),
                            }
                        });
                    }
                    restarts += 1;
                    warn!(
                        "{}; re-partitioning ({}/{})",
                        err, restarts, self.config.max_restarts
                    );
                }
                Err(err) => return Err(err),
            }
        }
    }

    /// Partition phase: split the root, then keep drawing random sibling-leaf
    /// pairs and splitting both cells while they exceed the area threshold.
    ///
    /// This is one global loop rather than a per-branch recursion, so how deep
    /// a branch goes depends on how often its pairs are drawn. See
    /// [`PartitionMode`] for when the loop stops.
    pub fn partition(&mut self, bounds: Rect2D) -> Result<PartitionTree, GenerationError> {
        let mut tree = PartitionTree::new(bounds);
        let min_node_area = self.config.min_node_area;
        let threshold = (self.config.min_partition_fraction * bounds.area()).max(min_node_area);

        let root = tree.root();
        let PartitionOutcome::Split([a, b]) = tree.partition(root, &mut self.rng, min_node_area)? else {
            debug!("root {:?} left whole", bounds);
            return Ok(tree);
        };

        let mut pair = (a, b);
        loop {
            let (chosen, other) = if self.rng.random_bool(0.5) {
                pair
            } else {
                (pair.1, pair.0)
            };
            for id in [chosen, other] {
                if tree.area(id)? > threshold {
                    tree.partition(id, &mut self.rng, min_node_area)?;
                }
            }

            let candidates = match self.config.partition_mode {
                PartitionMode::Sampled => {
                    let current = tree.area(chosen)?.min(tree.area(other)?);
                    if current <= threshold {
                        break;
                    }
                    tree.leaf_pairs()
                }
                PartitionMode::Exhaustive => {
                    let oversized = |id| tree.area(id).is_ok_and(|area| area > threshold);
                    tree.leaf_pairs()
                        .into_iter()
                        .filter(|&(a, b)| oversized(a) || oversized(b))
                        .collect()
                }
            };
            if candidates.is_empty() {
                break;
            }
            pair = candidates[self.rng.random_range(0..candidates.len())];
        }

        debug!(
            "partitioned into {} leaves, max depth {}",
            tree.leaves().count(),
            tree.max_depth()
        );
        Ok(tree)
    }

    /// Room + connect phase. Returns the number of passes used.
    ///
    /// Each pass starts from a clean layout, so a failed pass leaves nothing
    /// behind for the next one.
    fn furnish(&mut self, tree: &mut PartitionTree) -> Result<u32, GenerationError> {
        let passes = self.config.max_connection_passes;
        let mut last: Option<PassFailure> = None;
        for pass in 1..=passes {
            tree.reset_rooms();
            let failure = match tree.place_rooms(&mut self.rng, &self.config.room) {
                Err(err @ RoomError::CellTooSmall { .. }) => return Err(err.into()),
                Err(err) => PassFailure::from(err),
                Ok(()) => match tree.connect(&mut self.rng, &self.config.corridor) {
                    Ok(()) => {
                        debug!("layout connected on pass {}", pass);
                        return Ok(pass);
                    }
                    Err(err) => PassFailure::from(err),
                },
            };
            warn!("pass {}/{}: {}", pass, passes, failure);
            last = Some(failure);
        }
        tree.reset_rooms();
        match last {
            Some(last) => Err(GenerationError::PassesExhausted { passes, last }),
            None => Err(ConfigError::OutOfRange {
                field: "max_connection_passes",
                expected: "positive",
                value: 0.0,
            }
            .into()),
        }
    }
}

/// Generate a map with a throwaway [`MapGenerator`].
pub fn generate(
    width: f64,
    height: f64,
    config: &GeneratorConfig,
) -> Result<PartitionTree, GenerationError> {
    MapGenerator::new(config.clone())?.generate(width, height)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{CorridorConfig, RoomConfig};

    fn seeded(seed: u64) -> GeneratorConfig {
        GeneratorConfig::default().with_seed(seed)
    }

    fn layout(tree: &PartitionTree) -> (Vec<Rect2D>, Vec<Rect2D>) {
        (
            tree.rooms().map(|(_, room)| room).collect(),
            tree.corridors().map(|(_, corridor)| corridor).collect(),
        )
    }

    #[test]
    fn test_procedural_generation() {
        let mut generator = MapGenerator::new(seeded(2024)).unwrap();
        let tree = generator.generate(256.0, 256.0).unwrap();

        assert!(tree.is_complete());
        assert!(tree.leaves().count() >= 2);
        let stats = generator.stats().unwrap();
        assert_eq!(stats.seed, 2024);
        assert_eq!(stats.leaf_count, tree.leaves().count());
        assert_eq!(stats.corridor_count, tree.internal_nodes().count());
        assert!(stats.connection_passes >= 1 && stats.connection_passes <= 50);
    }

    #[test]
    fn test_same_seed_same_map() {
        let first = generate(256.0, 256.0, &seeded(77)).unwrap();
        let second = generate(256.0, 256.0, &seeded(77)).unwrap();
        assert_eq!(first.to_string(), second.to_string());
        assert_eq!(layout(&first), layout(&second));
    }

    #[test]
    fn test_sampled_partition_stops_at_small_pair() {
        let mut generator = MapGenerator::new(seeded(8)).unwrap();
        let bounds = Rect2D::new(0.0, 0.0, 256.0, 256.0);
        let tree = generator.partition(bounds).unwrap();
        let threshold = 2048.0;

        assert!(tree
            .leaf_pairs()
            .iter()
            .any(|&(a, _)| tree.area(a).unwrap() <= threshold));
        for id in tree.leaves() {
            let area = tree.area(id).unwrap();
            assert!(area > threshold / 2.0 && area < bounds.area());
        }
    }

    #[test]
    fn test_exhaustive_partition_bounds_every_leaf() {
        let config = GeneratorConfig {
            partition_mode: PartitionMode::Exhaustive,
            ..seeded(8)
        };
        let mut generator = MapGenerator::new(config).unwrap();
        let tree = generator.partition(Rect2D::new(0.0, 0.0, 256.0, 256.0)).unwrap();
        for id in tree.leaves() {
            let area = tree.area(id).unwrap();
            assert!(area <= 2048.0 && area > 1024.0);
        }
    }

    #[test]
    fn test_root_below_node_threshold_stays_whole() {
        let config = GeneratorConfig {
            min_node_area: 1000.0,
            ..seeded(1)
        };
        let mut generator = MapGenerator::new(config).unwrap();
        let tree = generator.generate(20.0, 20.0).unwrap();
        assert_eq!(tree.node_count(), 1);
        assert_eq!(tree.rooms().count(), 1);
        assert_eq!(tree.corridors().count(), 0);
        assert_eq!(generator.stats().unwrap().connection_passes, 1);
    }

    #[test]
    fn test_tiny_map_reports_small_cell() {
        let err = generate(8.0, 8.0, &seeded(1)).unwrap_err();
        assert!(matches!(err, GenerationError::Room(RoomError::CellTooSmall { .. })));
    }

    #[test]
    fn test_invalid_dimensions() {
        assert!(matches!(
            generate(0.0, 10.0, &seeded(1)),
            Err(GenerationError::InvalidDimensions { .. })
        ));
        assert!(matches!(
            generate(f64::NAN, 10.0, &seeded(1)),
            Err(GenerationError::InvalidDimensions { .. })
        ));
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = GeneratorConfig {
            max_connection_passes: 0,
            ..seeded(1)
        };
        assert!(matches!(
            generate(64.0, 64.0, &config),
            Err(GenerationError::Config(_))
        ));
    }

    #[test]
    fn test_passes_and_restarts_exhausted() {
        // Corridors wider than any room can never be laid.
        let impossible = GeneratorConfig {
            corridor: CorridorConfig {
                size: 500.0,
                max_attempts: 3,
            },
            max_connection_passes: 2,
            max_restarts: 0,
            ..seeded(4)
        };
        assert!(matches!(
            generate(128.0, 128.0, &impossible),
            Err(GenerationError::PassesExhausted {
                passes: 2,
                last: PassFailure::Connect(_),
            })
        ));

        let with_restarts = GeneratorConfig {
            max_restarts: 1,
            ..impossible
        };
        let mut generator = MapGenerator::new(with_restarts).unwrap();
        let err = generator.generate(128.0, 128.0).unwrap_err();
        assert!(matches!(err, GenerationError::RestartsExhausted { restarts: 1, .. }));
        assert!(generator.stats().is_none());
    }

    #[test]
    fn test_room_sampling_exhaustion_fails_the_pass() {
        // One sample per room almost never satisfies the constraints.
        let starved = GeneratorConfig {
            room: RoomConfig {
                max_attempts: 1,
                ..RoomConfig::default()
            },
            max_connection_passes: 3,
            max_restarts: 1,
            ..seeded(5)
        };
        let mut generator = MapGenerator::new(starved.clone()).unwrap();
        let err = generator.generate(256.0, 256.0).unwrap_err();
        match err {
            GenerationError::RestartsExhausted { restarts: 1, last } => assert!(matches!(
                *last,
                GenerationError::PassesExhausted {
                    passes: 3,
                    last: PassFailure::Room(RoomError::AttemptsExhausted { attempts: 1, .. }),
                }
            )),
            other => panic!("unexpected error: {other}"),
        }
        assert!(generator.stats().is_none());

        let single_pass = GeneratorConfig {
            max_connection_passes: 1,
            max_restarts: 0,
            ..starved
        };
        let err = generate(256.0, 256.0, &single_pass).unwrap_err();
        assert!(!matches!(err, GenerationError::Room(_)));
        assert!(matches!(
            err,
            GenerationError::PassesExhausted {
                passes: 1,
                last: PassFailure::Room(_),
            }
        ));
    }
}
