//! QA tests for the turn-processing flow.
//!
//! Scripted end-to-end scenarios driven through the mock DM: the raw
//! model replies run through the real narrative/delta path, so these
//! cover fence extraction, deep merge, and log ordering together.

use dungeon_core::testing::{assert_hp, assert_inventory, TestHarness};
use dungeon_core::{LogRole, TurnWarning};
use serde_json::json;

// =============================================================================
// NARRATIVE + DELTA SEPARATION
// =============================================================================

#[test]
fn test_attack_turn_merges_delta_and_logs_in_order() {
    let mut harness = TestHarness::new();
    harness.expect_reply(
        "You swing and hit!\n```json\n{\"current_location\": {\"npcs\": []}}\n```",
    );

    let log_before = harness.log_len();
    let outcome = harness.input("I attack the shadow");

    assert_eq!(outcome.narrative, "You swing and hit!");
    assert!(outcome.state_changed);
    assert!(outcome.warnings.is_empty());
    assert!(harness.state.current_location.npcs.is_empty());

    // Two new entries: player first, then dm.
    assert_eq!(harness.log_len(), log_before + 2);
    let log = &harness.state.game_log;
    assert_eq!(log[log.len() - 2].role, LogRole::Player);
    assert_eq!(log[log.len() - 2].content, "I attack the shadow");
    assert_eq!(log[log.len() - 1].role, LogRole::Dm);
    assert_eq!(log[log.len() - 1].content, "You swing and hit!");
}

#[test]
fn test_reply_without_delta_changes_nothing() {
    let mut harness = TestHarness::new();
    harness.expect_reply("The whisper grows louder, but nothing stirs.");

    let player_before = harness.state.player.clone();
    let outcome = harness.input("I listen carefully");

    assert!(!outcome.state_changed);
    assert_eq!(harness.state.player, player_before);
    assert_eq!(
        harness.last_log(),
        Some("The whisper grows louder, but nothing stirs.")
    );
}

#[test]
fn test_malformed_delta_keeps_narrative_and_state() {
    let mut harness = TestHarness::new();
    harness.expect_reply("The spell fizzles.\n```json\n{\"player\": {\"hp\":}\n```");

    let player_before = harness.state.player.clone();
    let location_before = harness.state.current_location.clone();
    let outcome = harness.input("I cast a spell");

    assert_eq!(outcome.narrative, "The spell fizzles.");
    assert!(!outcome.state_changed);
    assert!(matches!(
        outcome.warnings.as_slice(),
        [TurnWarning::MalformedDelta(_)]
    ));

    assert_eq!(harness.state.player, player_before);
    assert_eq!(harness.state.current_location, location_before);
    assert_eq!(harness.last_log(), Some("The spell fizzles."));
}

// =============================================================================
// MERGE SEMANTICS OVER FULL TURNS
// =============================================================================

#[test]
fn test_damage_then_heal_across_turns() {
    let mut harness = TestHarness::new();
    harness
        .expect_reply("The shadow claws you!\n```json\n{\"player\": {\"hp\": 12}}\n```")
        .expect_reply(
            "You drink the potion.\n```json\n{\"player\": {\"hp\": 20, \
             \"inventory\": [\"a rusty sword\"]}}\n```",
        );

    harness.input("I charge in");
    assert_hp(&harness, 12, 20);
    assert_inventory(&harness, &["a rusty sword", "a healing potion"]);

    harness.input("I drink my healing potion");
    assert_hp(&harness, 20, 20);
    assert_inventory(&harness, &["a rusty sword"]);
}

#[test]
fn test_location_change_replaces_npcs_wholesale() {
    let mut harness = TestHarness::new();
    harness
        .expect_reply(
            "A goblin blocks your path.\n```json\n{\"current_location\": \
             {\"npcs\": [{\"name\": \"Griznak\", \"description\": \"a wiry goblin\"}]}}\n```",
        )
        .expect_reply(
            "You slip past into an empty chamber.\n```json\n{\"current_location\": \
             {\"name\": \"The Hollow Chamber\", \"npcs\": []}}\n```",
        );

    harness.input("I press on");
    assert_eq!(harness.state.current_location.npcs.len(), 1);
    assert_eq!(harness.state.current_location.npcs[0].name, "Griznak");

    harness.input("I sneak around the goblin");
    assert!(harness.state.current_location.npcs.is_empty());
    assert_eq!(harness.state.current_location.name, "The Hollow Chamber");
    // Unmentioned sibling keys survive the merge.
    assert!(!harness.state.current_location.description.is_empty());
}

#[test]
fn test_delta_hp_is_clamped_to_bounds() {
    let mut harness = TestHarness::new();
    harness
        .expect_reply("A crushing blow!\n```json\n{\"player\": {\"hp\": -15}}\n```")
        .expect_reply("A surge of vitality!\n```json\n{\"player\": {\"hp\": 50}}\n```");

    harness.input("I take the hit");
    assert_hp(&harness, 0, 20);

    harness.input("I touch the glowing altar");
    assert_hp(&harness, 20, 20);
}

// =============================================================================
// TOOL ROUNDS
// =============================================================================

#[test]
fn test_dice_roll_feeds_followup_and_delta() {
    let mut harness = TestHarness::new();
    harness.expect_tool_call(
        "roll_dice",
        json!({"sides": 1, "count": 2}),
        "Both blades bite deep!\n```json\n{\"player\": {\"hp\": 18}}\n```",
    );

    let outcome = harness.input("I strike twice");

    assert_eq!(outcome.narrative, "Both blades bite deep!");
    assert!(outcome.state_changed);
    assert!(outcome.warnings.is_empty());
    assert_hp(&harness, 18, 20);

    // The registry really rolled: 2d1 can only total 2.
    assert_eq!(
        harness.dm.last_tool_response().unwrap()["result"],
        "The dice land on: 2 (1 + 1)."
    );
    assert_eq!(harness.last_log(), Some("Both blades bite deep!"));
}

#[test]
fn test_unknown_tool_call_warns_and_turn_completes() {
    let mut harness = TestHarness::new();
    harness.expect_tool_call("summon_dragon", json!({}), "unused");

    let log_before = harness.log_len();
    let player_before = harness.state.player.clone();
    let outcome = harness.input("I call for aid");

    assert_eq!(
        outcome.warnings,
        vec![TurnWarning::UnknownTool("summon_dragon".to_string())]
    );
    assert!(!outcome.state_changed);
    assert_eq!(harness.state.player, player_before);

    // The turn still logs both sides, with nothing to narrate.
    assert_eq!(harness.log_len(), log_before + 2);
    assert_eq!(outcome.narrative, "");
}

#[test]
fn test_rejected_dice_call_warns_and_turn_completes() {
    let mut harness = TestHarness::new();
    harness.expect_tool_call("roll_dice", json!({"sides": 0}), "unused");

    let outcome = harness.input("I roll the impossible die");

    assert!(matches!(
        outcome.warnings.as_slice(),
        [TurnWarning::ToolFailed { name, .. }] if name == "roll_dice"
    ));
    assert!(!outcome.state_changed);
    assert!(harness.dm.last_tool_response().is_none());
}

// =============================================================================
// MULTI-TURN LOG GROWTH
// =============================================================================

#[test]
fn test_log_grows_two_entries_per_turn() {
    let mut harness = TestHarness::new();
    harness
        .expect_reply("First.")
        .expect_reply("Second.\n```json\n{\"player\": {\"hp\": 19}}\n```")
        .expect_reply("Third.");

    let start = harness.log_len();
    harness.input("one");
    harness.input("two");
    harness.input("three");

    assert_eq!(harness.log_len(), start + 6);
    let roles: Vec<LogRole> = harness.state.game_log[start..]
        .iter()
        .map(|e| e.role)
        .collect();
    assert_eq!(
        roles,
        vec![
            LogRole::Player,
            LogRole::Dm,
            LogRole::Player,
            LogRole::Dm,
            LogRole::Player,
            LogRole::Dm,
        ]
    );
}
