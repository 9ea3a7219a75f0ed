//! Live reveal of derivation trees, one recipe step per tick.
//!
//! Each visualised path owns a [`LiveUpdateState`]. A build starts from the
//! bare target leaf and replays the path from the target down to the base
//! elements; every tick attaches one step to one node through the
//! [`ExpansionPolicy`]. Once every step is consumed, the live tree is the same
//! tree [`TreeBuilder::build_tree`](crafttree::builder::TreeBuilder::build_tree)
//! produces for the path.

use std::{collections::BTreeMap, sync::Arc};

use crafttree::{
    builder::TreeBuilder,
    config::{CraftConfig, LiveConfig},
    images::ImageTable,
    node::{NodeRef, TreeNode, TreeRoot},
    policy::ExpansionPolicy,
    recipe::Path,
    search::{PathKey, StaticViews},
    utils::error::{CraftError, CraftResult},
};
use log::{debug, info, warn};
use strum::EnumIs;

use crate::{
    session::SessionId,
    state::{LivePhase, LiveUpdateState},
};

/// What a call to [`LiveUpdateEngine::tick`] did.
#[derive(Debug, Clone, PartialEq, Eq, EnumIs)]
pub enum TickOutcome {
    /// The current step was attached to the node at `target`.
    Expanded {
        target: NodeRef,
        index: usize,
        complete: bool,
    },
    /// The current step had no target; the tree is unchanged.
    Skipped { index: usize, complete: bool },
    /// There was nothing left to apply; the build is now complete.
    Completed,
    /// The tick belongs to an unknown, replaced or finished build.
    Stale,
}

impl TickOutcome {
    /// Whether the build expects another tick after this one.
    pub fn wants_next_tick(&self) -> bool {
        match self {
            TickOutcome::Expanded { complete, .. } | TickOutcome::Skipped { complete, .. } => {
                !complete
            }
            TickOutcome::Completed | TickOutcome::Stale => false,
        }
    }

    /// Step index after the tick, for ticks that applied a step.
    pub fn index(&self) -> Option<usize> {
        match self {
            TickOutcome::Expanded { index, .. } | TickOutcome::Skipped { index, .. } => {
                Some(*index)
            }
            TickOutcome::Completed | TickOutcome::Stale => None,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct LiveUpdateEngine {
    policy: ExpansionPolicy,
    config: LiveConfig,
    states: BTreeMap<PathKey, LiveUpdateState>,
}

impl LiveUpdateEngine {
    pub fn new(policy: ExpansionPolicy, config: LiveConfig) -> Self {
        Self {
            policy,
            config,
            states: BTreeMap::new(),
        }
    }

    pub fn from_config(config: &CraftConfig, images: Arc<ImageTable>) -> Self {
        let builder = TreeBuilder::from_config(&config.tree, images);
        Self::new(ExpansionPolicy::new(builder), config.live.clone())
    }

    #[inline]
    pub fn policy(&self) -> &ExpansionPolicy {
        &self.policy
    }

    #[inline]
    pub fn config(&self) -> &LiveConfig {
        &self.config
    }

    /// Start (or restart) the live build of `path` under `key`.
    ///
    /// A base-element target or an empty path completes immediately with a
    /// single leaf. Any previous build under `key` is replaced and its
    /// outstanding ticks become stale.
    pub fn start(&mut self, key: PathKey, path: &Path, target: &str) -> SessionId {
        let builder = self.policy.builder();
        let leaf = builder.leaf(target);

        let state = if builder.is_base_element(target) || path.is_empty() {
            info!("Live build of `{target}` on {key}: nothing to replay");
            LiveUpdateState::complete(target, leaf)
        } else {
            info!(
                "Live build of `{target}` on {key}: replaying {} step(s)",
                path.len()
            );
            LiveUpdateState::building(path, target, leaf)
        };

        let session = state.session_id;
        if let Some(previous) = self.states.insert(key, state) {
            debug!("Session {} replaced by {session}", previous.session_id);
        }
        session
    }

    /// Start a live build for every view of `views`.
    pub fn start_views(&mut self, views: &StaticViews) -> Vec<(PathKey, SessionId)> {
        let Some(target) = views.target.as_ref() else {
            return Vec::new();
        };
        views
            .iter()
            .map(|(key, view)| {
                let session = self.start(key.clone(), &view.path, target);
                (key.clone(), session)
            })
            .collect()
    }

    /// Apply one step of the build under `key`.
    ///
    /// The step index only advances once the current step has no target left,
    /// so an element occurring several times is expanded everywhere before
    /// the next step is looked at. Past the last step, earlier steps that
    /// regained a target are applied again before the build completes.
    pub fn tick(&mut self, key: &PathKey, session: SessionId) -> TickOutcome {
        let Some(state) = self.states.get_mut(key) else {
            return TickOutcome::Stale;
        };
        if state.session_id != session || !state.building {
            debug!("Dropping stale tick for {key} (session {session})");
            return TickOutcome::Stale;
        }

        let index = state.current_step_index;
        let step_index = state.revisit.unwrap_or(index);
        let Some(step) = state.remaining_steps.get(step_index) else {
            state.finish();
            info!("Live build on {key} complete");
            return TickOutcome::Completed;
        };

        if state.ticks >= self.config.max_ticks_per_session {
            warn!(
                "Live build on {key} aborted after {} ticks at step #{step_index} `{step}`",
                state.ticks
            );
            state.aborted = true;
            state.finish();
            return TickOutcome::Completed;
        }
        state.ticks += 1;

        let superseded = state.superseded.get(step_index).copied().unwrap_or(false);
        let expansion = if superseded {
            debug!("Step #{step_index} `{step}` is superseded later in the path, skipping");
            None
        } else {
            let expansion = self.policy.expand(&state.display_tree, step);
            if !expansion.expanded() {
                debug!("Step #{step_index} `{step}` has no expansion target");
            }
            Some(expansion)
        };

        let (tree, target) = match expansion {
            Some(expansion) => (expansion.tree, expansion.target),
            None => (Arc::clone(&state.display_tree), None),
        };

        // The last step only completes the build once no retained step has a
        // target left; cycles spanning several steps keep unrolling until the
        // depth ceiling turns the next occurrence into an error node.
        let len = state.remaining_steps.len();
        let (next_index, revisit) =
            if !superseded && self.policy.needs_further_expansion(&tree, step) {
                (index, state.revisit)
            } else if index + 1 < len {
                (index + 1, None)
            } else {
                match first_pending_step(&self.policy, state, &tree) {
                    Some(pending) => {
                        debug!("Step #{pending} regained a target, revisiting it");
                        (index, Some(pending))
                    }
                    None => (len, None),
                }
            };

        state.display_tree = tree;
        state.current_step_index = next_index;
        state.revisit = revisit;
        state.complete = next_index >= len;
        state.building = !state.complete;
        if state.complete {
            info!("Live build on {key} complete after {} tick(s)", state.ticks);
        }

        let complete = state.complete;
        match target {
            Some(target) => {
                debug!("Step #{step_index} attached at {:?}", target.route.as_slice());
                TickOutcome::Expanded {
                    target,
                    index: next_index,
                    complete,
                }
            }
            None => TickOutcome::Skipped {
                index: next_index,
                complete,
            },
        }
    }

    /// Drive the build under `key` to completion without any delay.
    pub fn run_to_completion(&mut self, key: &PathKey) -> CraftResult<&TreeRoot> {
        let session = self.session(key)?;
        while self.tick(key, session).wants_next_tick() {}
        self.display_tree(key)
            .ok_or_else(|| CraftError::SessionNotFound(key.clone()))
    }

    /// Discard the build under `key`. Returns whether one existed.
    pub fn reset(&mut self, key: &PathKey) -> bool {
        let removed = self.states.remove(key).is_some();
        if removed {
            debug!("Live build on {key} reset");
        }
        removed
    }

    /// Current live tree of the build under `key`.
    pub fn display_tree(&self, key: &PathKey) -> Option<&TreeRoot> {
        self.states.get(key).map(|s| &s.display_tree)
    }

    pub fn state(&self, key: &PathKey) -> Option<&LiveUpdateState> {
        self.states.get(key)
    }

    pub fn phase(&self, key: &PathKey) -> LivePhase {
        self.states
            .get(key)
            .map_or(LivePhase::Idle, LiveUpdateState::phase)
    }

    /// Session currently owning `key`.
    pub fn session(&self, key: &PathKey) -> CraftResult<SessionId> {
        self.states
            .get(key)
            .map(|s| s.session_id)
            .ok_or_else(|| CraftError::SessionNotFound(key.clone()))
    }

    pub fn states(&self) -> impl Iterator<Item = (&PathKey, &LiveUpdateState)> {
        self.states.iter()
    }
}

/// First retained step of `state` that still has an expansion target in `tree`.
fn first_pending_step(
    policy: &ExpansionPolicy,
    state: &LiveUpdateState,
    tree: &TreeNode,
) -> Option<usize> {
    state
        .remaining_steps
        .iter()
        .zip(&state.superseded)
        .position(|(step, &superseded)| !superseded && policy.needs_further_expansion(tree, step))
}
