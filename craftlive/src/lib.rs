//! Craftlive: step-by-step reveal of crafting derivation trees.
//!
//! The [`LiveUpdateEngine`] keeps one build per visualised path and applies
//! one recipe step per tick; the [`TickScheduler`] paces those ticks on a
//! virtual clock.
//!
//! ```
//! use craftlive::{TickScheduler, LiveUpdateEngine};
//! use crafttree::prelude::*;
//!
//! let path = Path::new(vec![
//!     RecipeStep::new("Water", "Fire", "Steam"),
//!     RecipeStep::new("Steam", "Earth", "Geyser"),
//! ]);
//!
//! let mut scheduler = TickScheduler::new(LiveUpdateEngine::default());
//! scheduler.start(PathKey::Shortest, &path, "Geyser");
//! let fired = scheduler.run_until_idle();
//! assert_eq!(fired.len(), 2);
//!
//! let live = scheduler.engine().display_tree(&PathKey::Shortest).unwrap();
//! assert_eq!(**live, *TreeBuilder::default().build_tree(&path, "Geyser"));
//! ```

pub mod engine;
pub mod scheduler;
pub mod session;
pub mod state;

pub use engine::{LiveUpdateEngine, TickOutcome};
pub use scheduler::{FiredTick, TickScheduler};
pub use session::SessionId;
pub use state::{LivePhase, LiveUpdateState};
