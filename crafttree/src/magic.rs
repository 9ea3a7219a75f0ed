//! Well-known constants shared across the workspace.

/// Environment variable overriding the configuration file location.
pub const ENV_CONFIG_PATH: &str = "CRAFTTREE_CONFIG";

/// Recursion ceiling for tree construction; deeper nodes become error nodes.
pub const DEFAULT_MAX_DEPTH: u32 = 20;

/// Delay between two live-build ticks, in milliseconds.
pub const DEFAULT_TICK_DELAY_MS: u64 = 800;

/// Upper bound on expansions a single live session may perform.
pub const DEFAULT_MAX_TICKS_PER_SESSION: usize = 10_000;

/// Info attached to nodes cut off by the depth ceiling.
pub const DEPTH_LIMIT_INFO: &str = "Max depth reached";

/// Suffix appended to the display name of a cut-off node.
pub const DEPTH_LIMIT_SUFFIX: &str = "(depth limit)";

/// Name used when an element name is missing or empty.
pub const UNKNOWN_ELEMENT: &str = "Unknown";
