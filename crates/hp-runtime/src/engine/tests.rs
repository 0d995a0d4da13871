use std::collections::BTreeMap;
use std::time::{Duration, Instant};

use hp_core::{HpValue, Path};

use super::*;
use crate::model::ControlHandle;
use crate::testing::ScriptedBoundary;

const ROOT: &str = "game.state";
const TICK: Duration = Duration::from_millis(1000);

fn snapshot(hp: f64, name: &str) -> HpValue {
    HpValue::Map(BTreeMap::from([
        ("hp".to_string(), HpValue::Number(hp)),
        ("name".to_string(), HpValue::String(name.to_string())),
        (
            "stats".to_string(),
            HpValue::Array(vec![HpValue::Number(1.0), HpValue::Number(2.0)]),
        ),
    ]))
}

fn engine() -> SyncEngine<ScriptedBoundary> {
    SyncEngine::new(ScriptedBoundary::default(), SyncOptions::default())
}

fn discovered(now: Instant) -> SyncEngine<ScriptedBoundary> {
    let mut engine = engine();
    engine.initialize(&[RootCandidate::new("test", ROOT)]);
    let id = engine
        .boundary()
        .find("try{game.state}catch(e){null}")
        .expect("discovery probe submitted");
    engine.complete(id, Ok(snapshot(10.0, "Ann")), now);
    engine.drain_events();
    engine
}

fn hp() -> Path {
    Path::parse(".hp")
}

fn name() -> Path {
    Path::parse(".name")
}

/// Fires the timer and answers the resulting poll with `observed`.
fn tick(engine: &mut SyncEngine<ScriptedBoundary>, now: Instant, observed: HpValue) {
    assert!(engine.advance(now), "poll timer should be due");
    let id = engine.boundary().find(ROOT).expect("poll submitted");
    engine.complete(id, Ok(observed), now);
}

fn changed_events(events: &[EngineEvent]) -> Vec<&Path> {
    events
        .iter()
        .filter_map(|event| match event {
            EngineEvent::FieldChanged { path, .. } => Some(path),
            _ => None,
        })
        .collect()
}

fn error_codes(events: &[EngineEvent]) -> Vec<&str> {
    events
        .iter()
        .filter_map(|event| match event {
            EngineEvent::Error(error) => Some(error.code.as_str()),
            _ => None,
        })
        .collect()
}

#[test]
fn discovery_builds_the_model_and_arms_polling() {
    let now = Instant::now();
    let mut engine = engine();
    engine.initialize(&[
        RootCandidate::new("missing", "nothing.here"),
        RootCandidate::new("test", ROOT),
    ]);
    assert_eq!(engine.pending_len(), 2);

    let id = engine
        .boundary()
        .find("try{game.state}catch(e){null}")
        .expect("probe");
    engine.complete(id, Ok(snapshot(10.0, "Ann")), now);

    assert_eq!(engine.root_expression(), ROOT);
    assert_eq!(
        engine.model().paths(),
        vec![
            Path::parse(".hp"),
            Path::parse(".name"),
            Path::parse(".stats.0"),
            Path::parse(".stats.1")
        ]
    );
    assert_eq!(engine.poll_state(), PollState::Armed { due: now + TICK });
    assert_eq!(
        engine.drain_events(),
        vec![EngineEvent::Discovered {
            name: "test".to_string(),
            expression: ROOT.to_string()
        }]
    );

    // The losing probe failing afterwards is not a discovery failure.
    let missing = engine
        .boundary()
        .find("try{nothing.here}catch(e){null}")
        .expect("probe");
    engine.complete(missing, Err("ReferenceError".to_string()), now);
    assert!(error_codes(&engine.drain_events()).is_empty());
}

#[test]
fn discovery_failure_is_reported_once_after_every_candidate_missed() {
    let now = Instant::now();
    let mut engine = engine();
    engine.initialize(&[
        RootCandidate::new("a", "a.vars"),
        RootCandidate::new("b", "b.vars"),
        RootCandidate::new("c", "c.vars"),
    ]);
    let requests = engine.boundary_mut().take_requests();
    engine.complete(requests[0].id, Err("not defined".to_string()), now);
    engine.complete(requests[1].id, Ok(HpValue::Null), now);
    assert!(error_codes(&engine.drain_events()).is_empty());
    engine.complete(requests[2].id, Ok(HpValue::Integer(3)), now);

    assert_eq!(error_codes(&engine.drain_events()), ["DISCOVERY_FAILED"]);
    assert!(engine.root_expression().is_empty());
    assert!(engine.model().is_empty());
    assert_eq!(engine.poll_state(), PollState::Idle);
}

#[test]
fn initialize_without_candidates_is_undetected() {
    let mut engine = engine();
    engine.initialize(&[]);
    assert_eq!(error_codes(&engine.drain_events()), ["DISCOVERY_FAILED"]);
}

#[test]
fn first_container_wins_and_later_successes_are_ignored() {
    let now = Instant::now();
    let mut engine = engine();
    engine.initialize(&[
        RootCandidate::new("first", "one"),
        RootCandidate::new("second", "two"),
    ]);
    let requests = engine.boundary_mut().take_requests();
    engine.complete(requests[1].id, Ok(snapshot(1.0, "second")), now);
    engine.complete(requests[0].id, Ok(snapshot(2.0, "first")), now);
    assert_eq!(engine.root_expression(), "two");
    assert_eq!(
        engine.model().entry(&name()).expect("name").value(),
        &HpValue::String("second".to_string())
    );
}

#[test]
fn title_expression_is_resolved_alongside_discovery() {
    let now = Instant::now();
    let mut engine = SyncEngine::new(
        ScriptedBoundary::default(),
        SyncOptions {
            title_expression: Some("window.document.title".to_string()),
            ..SyncOptions::default()
        },
    );
    engine.initialize(&[RootCandidate::new("test", ROOT)]);
    let id = engine
        .boundary()
        .find("window.document.title")
        .expect("title probe");
    engine.complete(id, Ok(HpValue::String("My Story".to_string())), now);
    assert_eq!(engine.title(), Some("My Story"));
}

#[test]
fn poll_raises_changed_signal_only_for_differences() {
    let t0 = Instant::now();
    let mut engine = discovered(t0);

    tick(&mut engine, t0 + TICK, snapshot(10.0, "Ann"));
    assert!(changed_events(&engine.drain_events()).is_empty());
    assert!(engine.model().entries().all(|entry| !entry.changed()));

    tick(&mut engine, t0 + TICK * 2, snapshot(7.0, "Ann"));
    let events = engine.drain_events();
    assert_eq!(changed_events(&events), [&hp()]);
    assert_eq!(
        events[0],
        EngineEvent::FieldChanged {
            path: hp(),
            editor_text: "7".to_string(),
            boolean_view: false,
        }
    );
    let entry = engine.model().entry(&hp()).expect("hp");
    assert!(entry.changed());
    assert_eq!(entry.value(), &HpValue::Number(7.0));
    assert_eq!(
        engine.poll_state(),
        PollState::Armed {
            due: t0 + TICK * 3
        }
    );
}

#[test]
fn missing_intermediate_segment_resolves_to_absent() {
    let t0 = Instant::now();
    let mut engine = discovered(t0);
    let mut observed = snapshot(10.0, "Ann");
    if let HpValue::Map(entries) = &mut observed {
        entries.remove("stats");
    }
    tick(&mut engine, t0 + TICK, observed);
    assert!(error_codes(&engine.drain_events()).is_empty());
    assert_eq!(
        engine
            .model()
            .entry(&Path::parse(".stats.0"))
            .expect("entry survives")
            .value(),
        &HpValue::Null
    );
}

#[test]
fn locked_value_wins_over_external_value_and_is_written_back() {
    let t0 = Instant::now();
    let mut engine = discovered(t0);

    engine.on_lock(&hp(), true, "99").expect("lock");
    assert_eq!(
        engine.boundary().count("game.state['hp'] = 99.0;"),
        1,
        "locking at a different value forces a write immediately"
    );

    tick(&mut engine, t0 + TICK, snapshot(5.0, "Ann"));
    assert_eq!(engine.boundary().count("game.state['hp'] = 99.0;"), 2);
    assert_eq!(
        engine.model().entry(&hp()).expect("hp").value(),
        &HpValue::Number(99.0)
    );
}

#[test]
fn lock_holds_across_many_ticks() {
    let t0 = Instant::now();
    let mut engine = discovered(t0);
    engine.on_lock(&hp(), true, "99").expect("lock");
    for (round, reported) in [5.0, 120.0, 0.0, 99.0].into_iter().enumerate() {
        tick(&mut engine, t0 + TICK * (round as u32 + 1), snapshot(reported, "Ann"));
        assert_eq!(
            engine.model().entry(&hp()).expect("hp").value(),
            &HpValue::Number(99.0)
        );
    }
    assert!(engine.model().is_locked(&hp()).expect("hp"));
}

#[test]
fn locking_at_the_current_value_issues_no_write() {
    let t0 = Instant::now();
    let mut engine = discovered(t0);
    engine.on_lock(&hp(), true, "10").expect("lock");
    assert_eq!(engine.boundary().count("game.state['hp'] = 10.0;"), 0);
}

#[test]
fn edit_updates_stored_value_only_after_write_succeeds() {
    let t0 = Instant::now();
    let mut engine = discovered(t0);

    engine.on_edit(&name(), "Bob").expect("edit");
    let write = engine
        .boundary()
        .find("game.state['name'] = 'Bob';")
        .expect("write submitted");
    assert_eq!(
        engine.model().entry(&name()).expect("name").value(),
        &HpValue::String("Ann".to_string())
    );

    engine.complete(write, Ok(HpValue::Null), t0);
    let entry = engine.model().entry(&name()).expect("name");
    assert_eq!(entry.value(), &HpValue::String("Bob".to_string()));
    assert!(!entry.changed());
    assert!(engine
        .drain_events()
        .contains(&EngineEvent::FieldWritten { path: name() }));
}

#[test]
fn failed_edit_write_leaves_value_and_reports() {
    let t0 = Instant::now();
    let mut engine = discovered(t0);

    engine.on_edit(&name(), "Bob").expect("edit");
    let write = engine
        .boundary()
        .find("game.state['name'] = 'Bob';")
        .expect("write submitted");
    engine.complete(write, Err("read-only".to_string()), t0);

    assert_eq!(
        engine.model().entry(&name()).expect("name").value(),
        &HpValue::String("Ann".to_string())
    );
    let events = engine.drain_events();
    let Some(EngineEvent::Error(error)) = events.last() else {
        panic!("expected an error event, got {:?}", events);
    };
    assert_eq!(error.code, "EVAL_FAILED");
    assert!(error.message.contains("game.state['name'] = 'Bob';"));
    assert!(error.message.contains("read-only"));
}

#[test]
fn editing_to_the_stored_value_writes_nothing() {
    let t0 = Instant::now();
    let mut engine = discovered(t0);
    let before = engine.boundary().requests().len();
    engine.on_edit(&hp(), "10").expect("edit");
    assert_eq!(engine.boundary().requests().len(), before);
}

#[test]
fn edit_while_locked_moves_the_locked_value() {
    let t0 = Instant::now();
    let mut engine = discovered(t0);
    engine.on_lock(&hp(), true, "10").expect("lock");
    engine.on_edit(&hp(), "42").expect("edit");
    assert_eq!(
        engine.model().locked_value(&hp()),
        Ok(&HpValue::Number(42.0))
    );

    tick(&mut engine, t0 + TICK, snapshot(10.0, "Ann"));
    assert_eq!(
        engine.model().entry(&hp()).expect("hp").value(),
        &HpValue::Number(42.0)
    );
}

#[test]
fn late_forced_write_does_not_undo_a_newer_locked_edit() {
    let t0 = Instant::now();
    let mut engine = discovered(t0);
    engine.on_lock(&hp(), true, "50").expect("lock");
    let first = engine
        .boundary()
        .find("game.state['hp'] = 50.0;")
        .expect("lock write");
    engine.complete(first, Ok(HpValue::Null), t0);

    // The next poll re-asserts 50, then the user moves the lock to 60.
    tick(&mut engine, t0 + TICK, snapshot(7.0, "Ann"));
    let enforced = engine
        .boundary()
        .find("game.state['hp'] = 50.0;")
        .expect("forced write");
    assert_ne!(enforced, first);
    engine.on_edit(&hp(), "60").expect("edit");
    let edited = engine
        .boundary()
        .find("game.state['hp'] = 60.0;")
        .expect("edit write");

    engine.complete(edited, Ok(HpValue::Null), t0 + TICK);
    engine.complete(enforced, Ok(HpValue::Null), t0 + TICK);

    let entry = engine.model().entry(&hp()).expect("hp");
    assert!(entry.locked());
    assert_eq!(entry.locked_value(), &HpValue::Number(60.0));
    assert_eq!(entry.value(), &HpValue::Number(60.0));
}

#[test]
fn edit_while_locked_updates_the_stored_value_at_once() {
    let t0 = Instant::now();
    let mut engine = discovered(t0);
    engine.on_lock(&hp(), true, "10").expect("lock");
    engine.on_edit(&hp(), "42").expect("edit");
    let entry = engine.model().entry(&hp()).expect("hp");
    assert_eq!(entry.value(), entry.locked_value());
    assert_eq!(engine.boundary().count("game.state['hp'] = 42.0;"), 1);
}

#[test]
fn older_write_finishing_last_is_ignored() {
    let t0 = Instant::now();
    let mut engine = discovered(t0);
    engine.on_edit(&name(), "Bob").expect("first edit");
    let older = engine
        .boundary()
        .find("game.state['name'] = 'Bob';")
        .expect("first write");
    engine.on_edit(&name(), "Cid").expect("second edit");
    let newer = engine
        .boundary()
        .find("game.state['name'] = 'Cid';")
        .expect("second write");

    engine.complete(newer, Ok(HpValue::Null), t0);
    engine.complete(older, Ok(HpValue::Null), t0);

    assert_eq!(
        engine.model().entry(&name()).expect("name").value(),
        &HpValue::String("Cid".to_string())
    );
}

#[test]
fn invalid_editor_text_and_unknown_paths_are_rejected() {
    let t0 = Instant::now();
    let mut engine = discovered(t0);
    let before = engine.boundary().requests().len();

    let error = engine.on_edit(&hp(), "lots").expect_err("not a number");
    assert_eq!(error.code, "COERCE_INVALID_TEXT");
    let error = engine
        .on_edit(&Path::parse(".mana"), "1")
        .expect_err("unknown path");
    assert_eq!(error.code, "UNKNOWN_PATH");
    let error = engine
        .on_lock(&Path::parse(".mana"), true, "1")
        .expect_err("unknown path");
    assert_eq!(error.code, "UNKNOWN_PATH");

    assert_eq!(engine.boundary().requests().len(), before);
}

#[test]
fn failed_poll_stops_the_loop_until_a_write_succeeds() {
    let t0 = Instant::now();
    let mut engine = discovered(t0);

    assert!(engine.advance(t0 + TICK));
    let poll = engine.boundary().find(ROOT).expect("poll");
    engine.complete(poll, Err("game crashed".to_string()), t0 + TICK);
    assert_eq!(error_codes(&engine.drain_events()), ["EVAL_FAILED"]);
    assert_eq!(engine.poll_state(), PollState::Idle);
    assert_eq!(engine.model().len(), 4, "model survives a failed tick");

    engine.on_edit(&name(), "Bob").expect("edit");
    let write = engine
        .boundary()
        .find("game.state['name'] = 'Bob';")
        .expect("write");
    let later = t0 + TICK * 3;
    engine.complete(write, Ok(HpValue::Null), later);
    assert_eq!(engine.poll_state(), PollState::Armed { due: later + TICK });
}

#[test]
fn disabling_automatic_mid_tick_stops_rearming() {
    let t0 = Instant::now();
    let mut engine = discovered(t0);

    assert!(engine.advance(t0 + TICK));
    engine.set_automatic(false, t0 + TICK);
    let poll = engine.boundary().find(ROOT).expect("poll");
    engine.complete(poll, Ok(snapshot(10.0, "Ann")), t0 + TICK);
    assert_eq!(engine.poll_state(), PollState::Idle);

    engine.set_automatic(true, t0 + TICK * 5);
    assert_eq!(
        engine.poll_state(),
        PollState::Armed {
            due: t0 + TICK * 6
        }
    );
}

#[test]
fn timer_firing_with_automatic_off_submits_nothing() {
    let t0 = Instant::now();
    let mut engine = discovered(t0);
    engine.set_automatic(false, t0);
    let before = engine.boundary().requests().len();
    assert!(engine.advance(t0 + TICK));
    assert_eq!(engine.boundary().requests().len(), before);
    assert_eq!(engine.poll_state(), PollState::Idle);
    assert!(!engine.advance(t0 + TICK * 2));
}

#[test]
fn completions_are_applied_as_of_completion_time() {
    let t0 = Instant::now();
    let mut engine = discovered(t0);

    // The poll goes out first and still sees the old name.
    assert!(engine.advance(t0 + TICK));
    let poll = engine.boundary().find(ROOT).expect("poll");
    engine.on_edit(&name(), "Bob").expect("edit");
    let write = engine
        .boundary()
        .find("game.state['name'] = 'Bob';")
        .expect("write");

    engine.complete(write, Ok(HpValue::Null), t0 + TICK);
    engine.complete(poll, Ok(snapshot(10.0, "Ann")), t0 + TICK);

    // The stale poll wins for this tick and is flagged; the next tick repairs it.
    let entry = engine.model().entry(&name()).expect("name");
    assert_eq!(entry.value(), &HpValue::String("Ann".to_string()));
    assert!(entry.changed());

    tick(&mut engine, t0 + TICK * 2, snapshot(10.0, "Bob"));
    assert_eq!(
        engine.model().entry(&name()).expect("name").value(),
        &HpValue::String("Bob".to_string())
    );
}

#[test]
fn teardown_clears_state_and_ignores_late_completions() {
    let t0 = Instant::now();
    let mut engine = discovered(t0);
    assert!(engine.advance(t0 + TICK));
    let poll = engine.boundary().find(ROOT).expect("poll");

    engine.teardown();
    assert!(engine.root_expression().is_empty());
    assert!(engine.model().is_empty());
    assert_eq!(engine.poll_state(), PollState::Idle);

    engine.complete(poll, Ok(snapshot(3.0, "Zed")), t0 + TICK);
    assert!(engine.drain_events().is_empty());
    assert!(engine.model().is_empty());
}

#[test]
fn refresh_field_reconciles_one_path_and_clears_its_signal() {
    let t0 = Instant::now();
    let mut engine = discovered(t0);
    tick(&mut engine, t0 + TICK, snapshot(3.0, "Ann"));
    assert!(engine.model().entry(&hp()).expect("hp").changed());

    engine.refresh_field(&hp()).expect("refresh");
    let id = engine
        .boundary()
        .find("game.state['hp']")
        .expect("field read");
    engine.complete(id, Ok(HpValue::Integer(4)), t0 + TICK);

    let entry = engine.model().entry(&hp()).expect("hp");
    assert_eq!(entry.value(), &HpValue::Number(4.0));
    assert!(!entry.changed());
}

#[test]
fn clear_all_changed_resets_every_signal() {
    let t0 = Instant::now();
    let mut engine = discovered(t0);
    tick(&mut engine, t0 + TICK, snapshot(3.0, "Zed"));
    assert_eq!(
        engine
            .model()
            .entries()
            .filter(|entry| entry.changed())
            .count(),
        2
    );
    engine.clear_all_changed();
    assert!(engine.model().entries().all(|entry| !entry.changed()));
}

#[test]
fn controls_attach_once_per_entry() {
    let t0 = Instant::now();
    let mut engine = discovered(t0);
    engine
        .attach_control(&hp(), ControlHandle(1))
        .expect("attach");
    assert_eq!(
        engine.model().entry(&hp()).expect("hp").control().get(),
        Ok(ControlHandle(1))
    );
    let error = engine
        .attach_control(&hp(), ControlHandle(2))
        .expect_err("already attached");
    assert_eq!(error.code, "CONTROL_REASSIGNED");
}

#[test]
fn filter_through_the_engine_uses_path_identifiers() {
    let t0 = Instant::now();
    let mut engine = discovered(t0);
    engine.filter_some("hp");
    let visible = engine
        .model()
        .entries()
        .filter(|entry| engine.view().is_visible(entry.path()))
        .map(|entry| entry.path().as_str().to_string())
        .collect::<Vec<_>>();
    assert_eq!(visible, [".hp"]);

    engine.filter_some("");
    assert!(engine
        .model()
        .entries()
        .all(|entry| engine.view().is_visible(entry.path())));
}
