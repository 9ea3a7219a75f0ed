//! Recipe steps and recipe paths as produced by the external solver.

use std::{collections::HashMap, fmt};

use either::Either;
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::element::ElementName;

/// Two ingredients combining into one result.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RecipeStep {
    pub ingredient1: ElementName,
    pub ingredient2: ElementName,
    pub result: ElementName,
}

impl RecipeStep {
    pub fn new(
        ingredient1: impl Into<ElementName>,
        ingredient2: impl Into<ElementName>,
        result: impl Into<ElementName>,
    ) -> Self {
        Self {
            ingredient1: ingredient1.into(),
            ingredient2: ingredient2.into(),
            result: result.into(),
        }
    }

    /// Whether this step combines exactly these two ingredients, in this order.
    #[inline]
    pub fn same_ingredients(&self, ingredient1: &str, ingredient2: &str) -> bool {
        self.ingredient1 == ingredient1 && self.ingredient2 == ingredient2
    }

    /// Label used for recipe nodes, e.g. `Fire + Earth`.
    pub fn label(&self) -> String {
        format!("{} + {}", self.ingredient1, self.ingredient2)
    }
}

impl fmt::Display for RecipeStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} + {} => {}", self.ingredient1, self.ingredient2, self.result)
    }
}

/// Why a raw solver entry could not be turned into a [`RecipeStep`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
pub enum MalformedStep {
    #[strum(to_string = "entry is not an object")]
    NotAnObject,
    #[strum(to_string = "missing `result`")]
    MissingResult,
    #[strum(to_string = "missing `ingredient1`")]
    MissingIngredient1,
    #[strum(to_string = "missing `ingredient2`")]
    MissingIngredient2,
}

impl RecipeStep {
    /// Structurally validate one raw solver entry.
    ///
    /// Only the presence of non-empty string fields is checked; whether the
    /// recipe exists in the game is the solver's business.
    pub fn from_json(value: &Value) -> Result<Self, MalformedStep> {
        let Value::Object(map) = value else {
            return Err(MalformedStep::NotAnObject);
        };

        let field = |name: &str| {
            map.get(name)
                .and_then(Value::as_str)
                .filter(|s| !s.is_empty())
                .map(ElementName::new)
        };

        let result = field("result").ok_or(MalformedStep::MissingResult)?;
        let ingredient1 = field("ingredient1").ok_or(MalformedStep::MissingIngredient1)?;
        let ingredient2 = field("ingredient2").ok_or(MalformedStep::MissingIngredient2)?;

        Ok(Self {
            ingredient1,
            ingredient2,
            result,
        })
    }
}

/// Ordered sequence of recipe steps deriving one target.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Path {
    steps: Vec<RecipeStep>,
}

impl Path {
    pub fn new(steps: Vec<RecipeStep>) -> Self {
        Self { steps }
    }

    /// Build a path from a raw solver array, skipping malformed entries.
    ///
    /// Returns `None` when `value` is not an array at all.
    pub fn from_json(value: &Value) -> Option<Self> {
        let entries = value.as_array()?;
        let mut steps = Vec::with_capacity(entries.len());
        for (index, entry) in entries.iter().enumerate() {
            match RecipeStep::from_json(entry) {
                Ok(step) => steps.push(step),
                Err(reason) => warn!("Skipping malformed recipe step #{index}: {reason}"),
            }
        }
        Some(Self { steps })
    }

    #[inline]
    pub fn steps(&self) -> &[RecipeStep] {
        &self.steps
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, RecipeStep> {
        self.steps.iter()
    }

    /// Steps in the order the live build replays them: the recipe producing
    /// `target` first, then towards the base elements.
    ///
    /// The solver emits paths in dependency order (the target is produced by
    /// the last step), which are reversed. A path whose first step already
    /// produces `target` is replayed as given.
    pub fn replay_order<'a>(
        &'a self,
        target: &str,
    ) -> impl Iterator<Item = &'a RecipeStep> + use<'a> {
        let first_is_target = self.steps.first().is_some_and(|s| s.result == target);
        let last_is_target = self.steps.last().is_some_and(|s| s.result == target);

        if first_is_target && !last_is_target {
            Either::Left(self.steps.iter())
        } else {
            Either::Right(self.steps.iter().rev())
        }
    }
}

impl From<Vec<RecipeStep>> for Path {
    fn from(steps: Vec<RecipeStep>) -> Self {
        Self::new(steps)
    }
}

impl FromIterator<RecipeStep> for Path {
    fn from_iter<T: IntoIterator<Item = RecipeStep>>(iter: T) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a Path {
    type Item = &'a RecipeStep;
    type IntoIter = std::slice::Iter<'a, RecipeStep>;

    fn into_iter(self) -> Self::IntoIter {
        self.steps.iter()
    }
}

/// Lookup from a result element to the step producing it.
///
/// When a path contains several steps with the same result, the one appearing
/// last in the path wins.
#[derive(Debug, Clone, Default)]
pub struct RecipeIndex<'a> {
    by_result: HashMap<&'a str, &'a RecipeStep>,
}

impl<'a> RecipeIndex<'a> {
    pub fn new(path: &'a Path) -> Self {
        let mut by_result = HashMap::with_capacity(path.len());
        for step in path {
            if let Some(previous) = by_result.insert(step.result.as_str(), step) {
                if previous != step {
                    debug!("Recipe `{previous}` superseded by `{step}` (last write wins)");
                }
            }
        }
        Self { by_result }
    }

    #[inline]
    pub fn get(&self, result: &str) -> Option<&'a RecipeStep> {
        self.by_result.get(result).copied()
    }

    /// Whether `step` is the one this index retains for its result.
    pub fn retains(&self, step: &RecipeStep) -> bool {
        self.get(&step.result) == Some(step)
    }

    pub fn len(&self) -> usize {
        self.by_result.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_result.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn malformed_entries_are_skipped() {
        let raw = json!([
            { "ingredient1": "Fire", "ingredient2": "Earth", "result": "Lava" },
            { "ingredient1": "Water", "ingredient2": "Fire" },
            "garbage",
            { "ingredient1": "", "ingredient2": "Air", "result": "Dust" },
            { "ingredient1": "Water", "ingredient2": "Fire", "result": "Steam" },
        ]);
        let path = Path::from_json(&raw).unwrap();
        assert_eq!(
            path.steps(),
            &[
                RecipeStep::new("Fire", "Earth", "Lava"),
                RecipeStep::new("Water", "Fire", "Steam"),
            ]
        );
    }

    #[test]
    fn non_array_path_is_rejected() {
        assert!(Path::from_json(&json!({ "result": "Lava" })).is_none());
        assert!(Path::from_json(&json!(null)).is_none());
    }

    #[test]
    fn malformed_step_reports_first_missing_field() {
        assert_eq!(
            RecipeStep::from_json(&json!({ "ingredient1": "A" })),
            Err(MalformedStep::MissingResult)
        );
        assert_eq!(
            RecipeStep::from_json(&json!({ "result": "C", "ingredient2": "B" })),
            Err(MalformedStep::MissingIngredient1)
        );
        assert_eq!(
            RecipeStep::from_json(&json!(3)),
            Err(MalformedStep::NotAnObject)
        );
    }

    #[test]
    fn index_keeps_last_step_per_result() {
        let path = Path::new(vec![
            RecipeStep::new("Air", "Water", "Cloud"),
            RecipeStep::new("Water", "Fire", "Steam"),
            RecipeStep::new("Steam", "Air", "Cloud"),
        ]);
        let index = RecipeIndex::new(&path);
        assert_eq!(index.len(), 2);
        assert_eq!(index.get("Cloud"), Some(&path.steps()[2]));
        assert!(!index.retains(&path.steps()[0]));
        assert!(index.retains(&path.steps()[1]));
    }

    #[test]
    fn replay_order_is_target_first() {
        let dependency_order = Path::new(vec![
            RecipeStep::new("Water", "Fire", "Steam"),
            RecipeStep::new("Steam", "Earth", "Geyser"),
        ]);
        let replay: Vec<_> = dependency_order.replay_order("Geyser").collect();
        assert_eq!(replay[0].result, "Geyser");
        assert_eq!(replay[1].result, "Steam");

        let target_first = Path::new(vec![
            RecipeStep::new("Steam", "Earth", "Geyser"),
            RecipeStep::new("Water", "Fire", "Steam"),
        ]);
        let replay: Vec<_> = target_first.replay_order("Geyser").collect();
        assert_eq!(replay[0].result, "Geyser");
        assert_eq!(replay[1].result, "Steam");
    }

    #[test]
    fn display_formats_recipe() {
        let step = RecipeStep::new("Fire", "Earth", "Lava");
        assert_eq!(step.to_string(), "Fire + Earth => Lava");
        assert_eq!(step.label(), "Fire + Earth");
    }
}
