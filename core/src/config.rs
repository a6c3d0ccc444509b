const DEFAULT_MAX_CARDS: u64 = 10_000_000;
const DEFAULT_MAX_TAGS: usize = 10_000;
const DEFAULT_MAX_TAGS_PER_ZONE: usize = 100;
const DEFAULT_MAX_OPS_PER_PLAN: usize = 32;
const DEFAULT_CACHE_CAPACITY: usize = 1024;
const DEFAULT_START_WITH_ALL_CARDS: bool = true;
const DEFAULT_CANCELLATION_CHECK_INTERVAL: usize = 1;

// Group system configuration defaults
const DEFAULT_MAX_GROUP_DEPTH: usize = 8;
const DEFAULT_MAX_GROUP_SIZE: usize = 256;

// Per-card tag cap, enforced when attaching representations
const DEFAULT_MAX_TAGS_PER_CARD: usize = 1_000;

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone)]
pub struct Config {
    /// Registry build fails above this card count.
    pub max_cards: u64,
    /// Registry build fails above this distinct tag count.
    pub max_tags: usize,
    /// Drops that would push a zone past this size are rejected.
    pub max_tags_per_zone: usize,
    /// Plans with more operations than this are rejected.
    pub max_ops_per_plan: usize,
    /// Number of entries held by the filter result cache.
    pub cache_capacity: usize,
    /// Whether an empty plan yields the full card universe.
    pub start_with_all_cards: bool,
    /// Pipeline operations between cooperative cancellation checks.
    pub cancellation_check_interval: usize,

    // Group system configuration
    pub max_group_depth: usize,
    pub max_group_size: usize,

    pub max_tags_per_card: usize,
}

impl Config {
    pub fn new() -> Self {
        Config {
            max_cards: DEFAULT_MAX_CARDS,
            max_tags: DEFAULT_MAX_TAGS,
            max_tags_per_zone: DEFAULT_MAX_TAGS_PER_ZONE,
            max_ops_per_plan: DEFAULT_MAX_OPS_PER_PLAN,
            cache_capacity: DEFAULT_CACHE_CAPACITY,
            start_with_all_cards: DEFAULT_START_WITH_ALL_CARDS,
            cancellation_check_interval: DEFAULT_CANCELLATION_CHECK_INTERVAL,

            // Group system defaults
            max_group_depth: DEFAULT_MAX_GROUP_DEPTH,
            max_group_size: DEFAULT_MAX_GROUP_SIZE,

            max_tags_per_card: DEFAULT_MAX_TAGS_PER_CARD,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}
