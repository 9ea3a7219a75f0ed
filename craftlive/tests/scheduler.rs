use std::time::Duration;

use craftlive::{LiveUpdateEngine, TickOutcome, TickScheduler};
use crafttree::prelude::*;

const DELAY: Duration = Duration::from_millis(800);

fn geyser() -> Path {
    Path::new(vec![
        RecipeStep::new("Water", "Fire", "Steam"),
        RecipeStep::new("Steam", "Earth", "Geyser"),
    ])
}

#[test]
fn ticks_fire_in_deadline_order() {
    let mut scheduler = TickScheduler::default();
    scheduler.start(PathKey::Multiple(0), &geyser(), "Geyser");
    scheduler.advance_by(DELAY / 2);
    scheduler.start(PathKey::Multiple(1), &geyser(), "Geyser");

    let fired = scheduler.run_until_idle();
    let order: Vec<_> = fired.iter().map(|t| (t.at, t.key.clone())).collect();
    assert_eq!(
        order,
        [
            (DELAY, PathKey::Multiple(0)),
            (DELAY + DELAY / 2, PathKey::Multiple(1)),
            (DELAY * 2, PathKey::Multiple(0)),
            (DELAY * 2 + DELAY / 2, PathKey::Multiple(1)),
        ]
    );
    assert!(fired.iter().all(|t| t.outcome.is_expanded()));
    assert_eq!(scheduler.pending(), 0);
}

#[test]
fn at_most_one_tick_in_flight_per_session() {
    let mut scheduler = TickScheduler::default();
    scheduler.start(PathKey::Shortest, &geyser(), "Geyser");
    scheduler.start(PathKey::Multiple(0), &geyser(), "Geyser");
    assert_eq!(scheduler.pending(), 2);

    // A long jump still fires each build one tick per delay.
    let fired = scheduler.advance_by(DELAY * 10);
    assert_eq!(fired.len(), 4);
    assert_eq!(scheduler.pending(), 0);
    for key in [PathKey::Shortest, PathKey::Multiple(0)] {
        let times: Vec<_> = fired
            .iter()
            .filter(|t| t.key == key)
            .map(|t| t.at)
            .collect();
        assert_eq!(times, [DELAY, DELAY * 2]);
    }
}

#[test]
fn restart_drops_outstanding_ticks() {
    let mut scheduler = TickScheduler::default();
    let old = scheduler.start(PathKey::Shortest, &geyser(), "Geyser");
    scheduler.advance_by(DELAY);
    assert_eq!(
        scheduler
            .engine()
            .state(&PathKey::Shortest)
            .unwrap()
            .current_step_index(),
        1
    );

    let new = scheduler.start(PathKey::Shortest, &geyser(), "Geyser");
    assert_ne!(old, new);
    assert_eq!(scheduler.pending(), 1);
    assert!(
        scheduler
            .engine()
            .display_tree(&PathKey::Shortest)
            .unwrap()
            .is_leaf()
    );

    let fired = scheduler.run_until_idle();
    assert_eq!(fired.len(), 2);
    assert_eq!(fired[0].at, DELAY * 2);
    let live = scheduler.engine().display_tree(&PathKey::Shortest).unwrap();
    assert_eq!(**live, *TreeBuilder::default().build_tree(&geyser(), "Geyser"));
}

#[test]
fn custom_delay_from_config() {
    let config = CraftConfig::from_toml_str("[live]\ntick_delay_ms = 50", "<inline>").unwrap();
    let engine = LiveUpdateEngine::from_config(&config, Default::default());
    let mut scheduler = TickScheduler::new(engine);
    scheduler.start(PathKey::Shortest, &geyser(), "Geyser");
    assert_eq!(scheduler.next_deadline(), Some(Duration::from_millis(50)));

    let fired = scheduler.run_until_idle();
    assert_eq!(
        fired.last().map(|t| (t.at, t.outcome.clone())),
        Some((
            Duration::from_millis(100),
            TickOutcome::Expanded {
                target: NodeRef::root().child(0, 1).child(0, 2),
                index: 2,
                complete: true,
            }
        ))
    );
}
