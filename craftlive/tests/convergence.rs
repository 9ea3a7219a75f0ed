use craftlive::{LiveUpdateEngine, TickOutcome};
use crafttree::prelude::*;

fn replay(engine: &mut LiveUpdateEngine, key: &PathKey) -> Vec<TickOutcome> {
    let session = engine.session(key).unwrap();
    let mut outcomes = Vec::new();
    loop {
        let outcome = engine.tick(key, session);
        let more = outcome.wants_next_tick();
        outcomes.push(outcome);
        if !more {
            break;
        }
    }
    outcomes
}

fn assert_converges(path: &Path, target: &str) {
    let mut engine = LiveUpdateEngine::default();
    let key = PathKey::Shortest;
    engine.start(key.clone(), path, target);
    if engine.phase(&key).is_building() {
        replay(&mut engine, &key);
    }

    let state = engine.state(&key).unwrap();
    assert!(state.is_complete());
    assert!(!state.is_aborted());
    assert_eq!(state.current_step_index(), state.remaining_steps().len());

    let live = engine.display_tree(&key).unwrap();
    let static_tree = engine.policy().builder().build_tree(path, target);
    assert_eq!(**live, *static_tree, "live and static trees differ for `{target}`");
}

#[test]
fn single_step_converges() {
    assert_converges(
        &Path::new(vec![RecipeStep::new("Fire", "Earth", "Lava")]),
        "Lava",
    );
}

#[test]
fn chain_in_dependency_order_converges() {
    let path = Path::new(vec![
        RecipeStep::new("Water", "Fire", "Steam"),
        RecipeStep::new("Steam", "Air", "Cloud"),
        RecipeStep::new("Cloud", "Water", "Rain"),
    ]);
    assert_converges(&path, "Rain");
}

#[test]
fn target_first_path_converges() {
    let path = Path::new(vec![
        RecipeStep::new("Cloud", "Water", "Rain"),
        RecipeStep::new("Steam", "Air", "Cloud"),
        RecipeStep::new("Water", "Fire", "Steam"),
    ]);
    assert_converges(&path, "Rain");
}

#[test]
fn shared_sub_ingredient_converges() {
    let path = Path::new(vec![
        RecipeStep::new("Water", "Fire", "Steam"),
        RecipeStep::new("Steam", "Air", "Cloud"),
        RecipeStep::new("Cloud", "Steam", "Storm"),
    ]);
    assert_converges(&path, "Storm");
}

#[test]
fn duplicate_results_converge_on_last_write() {
    let path = Path::new(vec![
        RecipeStep::new("Water", "Fire", "Steam"),
        RecipeStep::new("Air", "Fire", "Steam"),
        RecipeStep::new("Steam", "Earth", "Geyser"),
    ]);
    assert_converges(&path, "Geyser");

    let tree = TreeBuilder::default().build_tree(&path, "Geyser");
    let steam = &tree.children[0].children[0];
    assert_eq!(steam.children[0].name, "Air + Fire");
}

#[test]
fn cyclic_path_converges_at_the_ceiling() {
    let path = Path::new(vec![RecipeStep::new("Ouroboros", "Fire", "Ouroboros")]);
    assert_converges(&path, "Ouroboros");
}

#[test]
fn two_step_cycle_unrolls_to_the_ceiling() {
    let path = Path::new(vec![
        RecipeStep::new("Target", "Fire", "A"),
        RecipeStep::new("A", "Water", "Target"),
    ]);
    assert_converges(&path, "Target");

    let mut engine = LiveUpdateEngine::default();
    let key = PathKey::Shortest;
    engine.start(key.clone(), &path, "Target");
    let tree = engine.run_to_completion(&key).unwrap();
    assert_eq!(tree.count(), 34);
    assert_eq!(tree.max_depth(), 22);
}

#[test]
fn three_step_cycle_converges() {
    let path = Path::new(vec![
        RecipeStep::new("Gear", "Earth", "Engine"),
        RecipeStep::new("Engine", "Fire", "Forge"),
        RecipeStep::new("Forge", "Water", "Gear"),
    ]);
    assert_converges(&path, "Gear");
}

#[test]
fn cycle_with_smaller_ceiling_converges() {
    let path = Path::new(vec![
        RecipeStep::new("Egg", "Fire", "Chicken"),
        RecipeStep::new("Chicken", "Water", "Egg"),
    ]);
    let builder = TreeBuilder::default().with_max_depth(7);
    let mut engine = LiveUpdateEngine::new(ExpansionPolicy::new(builder.clone()), Default::default());
    let key = PathKey::Multiple(1);
    engine.start(key.clone(), &path, "Egg");
    let live = engine.run_to_completion(&key).unwrap();
    assert_eq!(**live, *builder.build_tree(&path, "Egg"));
}

#[test]
fn unrelated_steps_are_skipped() {
    let path = Path::new(vec![
        RecipeStep::new("Earth", "Water", "Mud"),
        RecipeStep::new("Fire", "Earth", "Lava"),
    ]);
    assert_converges(&path, "Lava");
}

#[test]
fn repeated_ingredient_is_expanded_everywhere_before_advancing() {
    let path = Path::new(vec![
        RecipeStep::new("Water", "Fire", "Steam"),
        RecipeStep::new("Steam", "Steam", "Cloud"),
    ]);
    let mut engine = LiveUpdateEngine::default();
    let key = PathKey::Shortest;
    engine.start(key.clone(), &path, "Cloud");

    let outcomes = replay(&mut engine, &key);
    let indices: Vec<_> = outcomes.iter().filter_map(TickOutcome::index).collect();
    assert_eq!(indices, [1, 1, 2]);

    let routes: Vec<Vec<u8>> = outcomes
        .iter()
        .filter_map(|o| match o {
            TickOutcome::Expanded { target, .. } => Some(target.route.to_vec()),
            _ => None,
        })
        .collect();
    assert_eq!(routes, [vec![], vec![0, 0], vec![0, 1]]);
}

#[test]
fn target_first_multi_occurrence_path() {
    // Step 0 produces the target and names `A` as its first ingredient.
    let path = Path::new(vec![
        RecipeStep::new("A", "B", "Target"),
        RecipeStep::new("C", "D", "A"),
    ]);
    let mut engine = LiveUpdateEngine::default();
    let key = PathKey::Multiple(0);
    engine.start(key.clone(), &path, "Target");
    let outcomes = replay(&mut engine, &key);
    assert_eq!(outcomes.len(), 2);
    assert!(outcomes.iter().all(TickOutcome::is_expanded));

    let tree = engine.display_tree(&key).unwrap();
    let a = &tree.children[0].children[0];
    assert_eq!(a.name, "A");
    assert_eq!(a.children[0].name, "C + D");
}

#[test]
fn progress_is_monotonic() {
    let path = Path::new(vec![
        RecipeStep::new("Water", "Fire", "Steam"),
        RecipeStep::new("Steam", "Steam", "Cloud"),
        RecipeStep::new("Cloud", "Earth", "Rain"),
    ]);
    let mut engine = LiveUpdateEngine::default();
    let key = PathKey::Shortest;
    let session = engine.start(key.clone(), &path, "Rain");

    let mut last_index = 0;
    let mut last_count = engine.display_tree(&key).unwrap().count();
    loop {
        let outcome = engine.tick(&key, session);
        let state = engine.state(&key).unwrap();
        assert!(state.current_step_index() >= last_index);
        assert_eq!(
            state.is_complete(),
            state.current_step_index() == state.remaining_steps().len()
        );
        let count = state.display_tree().count();
        assert!(count >= last_count);
        last_index = state.current_step_index();
        last_count = count;
        if !outcome.wants_next_tick() {
            break;
        }
    }
    assert!(engine.phase(&key).is_complete());
}

#[test]
fn views_start_one_build_per_path() {
    let result = SearchResult::from_json_str(
        r#"{
            "searchTarget": "Lava",
            "mode": "multiple",
            "pathFound": true,
            "paths": [
                [{ "ingredient1": "Fire", "ingredient2": "Earth", "result": "Lava" }],
                [{ "ingredient1": "Earth", "ingredient2": "Fire", "result": "Lava" }]
            ]
        }"#,
    )
    .unwrap();
    let views = StaticViews::from_search_result(&result, &TreeBuilder::default());

    let mut engine = LiveUpdateEngine::default();
    let sessions = engine.start_views(&views);
    assert_eq!(sessions.len(), 2);
    for (key, view) in views.iter() {
        let tree = engine.run_to_completion(key).unwrap();
        assert_eq!(**tree, *view.tree);
    }
}
