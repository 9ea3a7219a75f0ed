use crafttree::{
    element::ElementName,
    node::TreeRoot,
    recipe::{Path, RecipeIndex, RecipeStep},
};
use strum::{Display, EnumIs};

use crate::session::SessionId;

/// Lifecycle of the live build of one path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIs)]
pub enum LivePhase {
    /// No build has been started (or it was reset).
    Idle,
    /// Ticks are still being applied.
    Building,
    /// Every step has been consumed, or the build was aborted.
    Complete,
}

/// Progress of the live build of one path.
///
/// `display_tree` only ever moves forward: each tick replaces it with a new
/// snapshot derived from the previous one.
#[derive(Debug, Clone)]
pub struct LiveUpdateState {
    pub(crate) target: ElementName,
    pub(crate) display_tree: TreeRoot,
    pub(crate) remaining_steps: Vec<RecipeStep>,
    /// `superseded[i]` is set when another step of the path, later in the
    /// path, produces the same result as `remaining_steps[i]`.
    pub(crate) superseded: Vec<bool>,
    pub(crate) current_step_index: usize,
    /// Earlier step being applied again after the last step, when a cycle in
    /// the path gave it new targets.
    pub(crate) revisit: Option<usize>,
    pub(crate) building: bool,
    pub(crate) complete: bool,
    pub(crate) aborted: bool,
    pub(crate) session_id: SessionId,
    pub(crate) ticks: usize,
}

impl LiveUpdateState {
    /// State of a build that starts from `leaf` and replays `path` towards
    /// the base elements.
    pub(crate) fn building(path: &Path, target: &str, leaf: TreeRoot) -> Self {
        let index = RecipeIndex::new(path);
        let remaining_steps: Vec<RecipeStep> = path.replay_order(target).cloned().collect();
        let superseded = remaining_steps.iter().map(|s| !index.retains(s)).collect();
        Self {
            target: ElementName::new(target),
            display_tree: leaf,
            remaining_steps,
            superseded,
            current_step_index: 0,
            revisit: None,
            building: true,
            complete: false,
            aborted: false,
            session_id: SessionId::new(),
            ticks: 0,
        }
    }

    /// State of a build with nothing to replay.
    pub(crate) fn complete(target: &str, leaf: TreeRoot) -> Self {
        Self {
            target: ElementName::new(target),
            display_tree: leaf,
            remaining_steps: Vec::new(),
            superseded: Vec::new(),
            current_step_index: 0,
            revisit: None,
            building: false,
            complete: true,
            aborted: false,
            session_id: SessionId::new(),
            ticks: 0,
        }
    }

    pub(crate) fn finish(&mut self) {
        self.building = false;
        self.complete = true;
    }

    pub fn phase(&self) -> LivePhase {
        if self.complete {
            LivePhase::Complete
        } else if self.building {
            LivePhase::Building
        } else {
            LivePhase::Idle
        }
    }

    #[inline]
    pub fn target(&self) -> &ElementName {
        &self.target
    }

    #[inline]
    pub fn display_tree(&self) -> &TreeRoot {
        &self.display_tree
    }

    #[inline]
    pub fn remaining_steps(&self) -> &[RecipeStep] {
        &self.remaining_steps
    }

    /// Step the next tick will apply, if any.
    pub fn current_step(&self) -> Option<&RecipeStep> {
        self.remaining_steps
            .get(self.revisit.unwrap_or(self.current_step_index))
    }

    /// Index of the earlier step being applied again, if any.
    #[inline]
    pub fn revisited_step(&self) -> Option<usize> {
        self.revisit
    }

    #[inline]
    pub fn current_step_index(&self) -> usize {
        self.current_step_index
    }

    #[inline]
    pub fn is_building(&self) -> bool {
        self.building
    }

    #[inline]
    pub fn is_complete(&self) -> bool {
        self.complete
    }

    /// Whether the build was stopped by the tick ceiling before consuming
    /// every step.
    #[inline]
    pub fn is_aborted(&self) -> bool {
        self.aborted
    }

    #[inline]
    pub fn session_id(&self) -> SessionId {
        self.session_id
    }

    /// Ticks that applied (or skipped) a step so far.
    #[inline]
    pub fn ticks(&self) -> usize {
        self.ticks
    }
}
