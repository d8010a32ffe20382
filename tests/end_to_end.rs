//! End-to-end tests: adapter and controller joined by a live transport.

mod common;

use std::{collections::HashMap, thread};

use pursuit::{
    AdapterAgent, AgentController, ChannelMessenger, DecisionAgent, Direction, FallbackPolicy,
    Policy, PositionNoise, Simulation, SimulationConfig, learning_lineup,
};

use common::{FixtureState, RecorderAgent, SuggestingAgent};

fn spawn_controller(agent: Box<dyn DecisionAgent>) -> (ChannelMessenger, thread::JoinHandle<()>) {
    let (client, server) = ChannelMessenger::pair();
    let handle = thread::spawn(move || {
        AgentController::new(Box::new(server), agent)
            .run()
            .expect("controller run failed");
    });
    (client, handle)
}

/// Scenario A: an illegal suggestion resolves to one of the legal actions,
/// each with roughly equal frequency.
#[test]
fn illegal_suggestion_splits_evenly_over_legal_actions() {
    let (client, handle) = spawn_controller(Box::new(SuggestingAgent::new(Direction::East, 21)));

    let mut state = FixtureState::new(7, 7, 1);
    state.set_legal(0, vec![Direction::North, Direction::Stop]);

    let mut adapter = AdapterAgent::hunted(Box::new(client), PositionNoise::seeded(0, 1));
    adapter.start_game(state.layout()).unwrap();

    let trials = 600;
    let mut counts: HashMap<Direction, usize> = HashMap::new();
    for _ in 0..trials {
        let action = adapter.get_action(&state).unwrap();
        assert!(action == Direction::North || action == Direction::Stop);
        *counts.entry(action).or_default() += 1;
    }

    let north = counts[&Direction::North] as f64 / trials as f64;
    assert!((north - 0.5).abs() < 0.08, "north fraction {north}");

    drop(adapter);
    handle.join().unwrap();
}

/// Scenario B: one score transition, two reward signs.
#[test]
fn reward_signs_differ_by_role() {
    let hunted_recorder = RecorderAgent::new(Direction::Stop);
    let hunted_log = hunted_recorder.reward_log();
    let hunter_recorder = RecorderAgent::new(Direction::North);
    let hunter_log = hunter_recorder.reward_log();

    let (hunted_client, hunted_handle) = spawn_controller(Box::new(hunted_recorder));
    let (hunter_client, hunter_handle) = spawn_controller(Box::new(hunter_recorder));

    let mut state = FixtureState::new(7, 7, 2);
    let mut hunted = AdapterAgent::hunted(Box::new(hunted_client), PositionNoise::seeded(0, 1));
    let mut hunter = AdapterAgent::hunter(1, Box::new(hunter_client), PositionNoise::seeded(0, 2));

    hunted.start_game(state.layout()).unwrap();
    hunter.start_game(state.layout()).unwrap();

    state.set_score(6.0);
    hunted.get_action(&state).unwrap();
    hunter.get_action(&state).unwrap();

    state.set_score(10.0);
    hunted.get_action(&state).unwrap();
    hunter.get_action(&state).unwrap();

    drop(hunted);
    drop(hunter);
    hunted_handle.join().unwrap();
    hunter_handle.join().unwrap();

    assert_eq!(*hunted_log.lock().unwrap(), vec![6.0, 4.0]);
    assert_eq!(*hunter_log.lock().unwrap(), vec![-6.0, -4.0]);
}

/// Observe-only updates refresh the score bookkeeping exactly as action
/// exchanges do.
#[test]
fn update_refreshes_previous_score() {
    let recorder = RecorderAgent::new(Direction::Stop);
    let log = recorder.reward_log();
    let (client, handle) = spawn_controller(Box::new(recorder));

    let mut state = FixtureState::new(7, 7, 1);
    let mut adapter = AdapterAgent::hunted(Box::new(client), PositionNoise::seeded(0, 1));
    adapter.start_game(state.layout()).unwrap();

    state.set_score(6.0);
    adapter.get_action(&state).unwrap();
    state.set_score(8.0);
    adapter.update(&state).unwrap();
    state.set_score(10.0);
    adapter.get_action(&state).unwrap();

    drop(adapter);
    handle.join().unwrap();

    assert_eq!(*log.lock().unwrap(), vec![6.0, 2.0, 2.0]);
}

/// The test-mode flag crosses the wire and reaches the decision agent.
#[test]
fn mode_toggle_is_carried_per_message() {
    let recorder = RecorderAgent::new(Direction::Stop);
    let modes = recorder.mode_log();
    let (client, handle) = spawn_controller(Box::new(recorder));

    let state = FixtureState::new(7, 7, 1);
    let mut adapter = AdapterAgent::hunted(Box::new(client), PositionNoise::seeded(0, 1));
    adapter.start_game(state.layout()).unwrap();

    adapter.get_action(&state).unwrap();
    adapter.enable_test_mode();
    adapter.get_action(&state).unwrap();
    adapter.enable_learn_mode();
    adapter.get_action(&state).unwrap();

    drop(adapter);
    handle.join().unwrap();

    assert_eq!(*modes.lock().unwrap(), vec![false, true, false]);
}

/// An illegal reply is substituted by the proxy, per its fallback policy.
#[test]
fn proxy_substitutes_illegal_replies() {
    // The recorder always replies North; the fixture only allows East/Stop.
    let (client, handle) = spawn_controller(Box::new(RecorderAgent::new(Direction::North)));

    let mut state = FixtureState::new(7, 7, 1);
    state.set_legal(0, vec![Direction::East, Direction::Stop]);

    let mut adapter = AdapterAgent::hunted(Box::new(client), PositionNoise::seeded(0, 1));
    adapter.start_game(state.layout()).unwrap();

    let action = adapter.get_action(&state).unwrap();
    assert_eq!(action, Direction::Stop);
    assert!(adapter.last_reply_was_invalid());

    drop(adapter);
    handle.join().unwrap();
}

/// Hunters configured with the random fallback get a legal action instead.
#[test]
fn random_fallback_keeps_hunters_moving() {
    let (client, handle) = spawn_controller(Box::new(RecorderAgent::new(Direction::South)));

    let mut state = FixtureState::new(7, 7, 2);
    state.set_legal(1, vec![Direction::East, Direction::West]);

    let mut adapter = AdapterAgent::hunter(1, Box::new(client), PositionNoise::seeded(0, 2))
        .with_fallback(FallbackPolicy::RandomLegal)
        .with_seed(8);
    adapter.start_game(state.layout()).unwrap();

    for _ in 0..20 {
        let action = adapter.get_action(&state).unwrap();
        assert!(action == Direction::East || action == Direction::West);
    }

    drop(adapter);
    handle.join().unwrap();
}

/// Full loop: train on the arena, persist policies, reload them, and verify
/// evaluation leaves them bit-for-bit unchanged.
#[test]
fn train_persist_evaluate_roundtrip() {
    let train_config = SimulationConfig {
        episodes: 4,
        max_steps: 60,
        width: 7,
        height: 7,
        hunters: 2,
        noise_bound: 1,
        test_mode: false,
        hunter_fallback: FallbackPolicy::Stop,
        seed: Some(13),
        progress: false,
    };
    let summary = Simulation::new(train_config)
        .run(learning_lineup(2, Some(13)).unwrap())
        .unwrap();
    assert_eq!(summary.episodes.len(), 4);

    // Persist every trained policy and read it back.
    let dir = tempfile::tempdir().unwrap();
    let mut reloaded = Vec::new();
    for (agent_id, policy) in summary.policies.iter().enumerate() {
        let policy = policy.as_ref().expect("learner exports a policy");
        let path = dir.path().join(format!("agent-{agent_id}.json"));
        policy.save(&path).unwrap();
        reloaded.push(Policy::load(&path).unwrap());
        assert_eq!(&reloaded[agent_id], policy);
    }

    // Seed a fresh line-up with the trained weights and evaluate.
    let mut agents = learning_lineup(2, Some(13)).unwrap();
    for (agent, policy) in agents.iter_mut().zip(&reloaded) {
        agent.set_policy(policy).unwrap();
    }
    let eval_config = SimulationConfig {
        episodes: 2,
        max_steps: 60,
        width: 7,
        height: 7,
        hunters: 2,
        noise_bound: 0,
        test_mode: true,
        hunter_fallback: FallbackPolicy::Stop,
        seed: Some(14),
        progress: false,
    };
    let eval = Simulation::new(eval_config).run(agents).unwrap();

    // Evaluation never mutates the weight vectors.
    for (after, before) in eval.policies.iter().zip(&reloaded) {
        assert_eq!(after.as_ref().unwrap(), before);
    }
}
