//! Scenario replay tests
//!
//! Replays the sample sessions under `scenarios/` and checks the frame
//! stream they produce.

use std::path::PathBuf;

use dockline::config::DockConfig;
use dockline::error::DockError;
use dockline::items::ItemId;
use dockline::scenario::{Scenario, ScenarioReport};

fn scenario_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("scenarios")
        .join(name)
}

fn replay(name: &str) -> (ScenarioReport, Vec<serde_json::Value>) {
    let scenario = Scenario::load(&scenario_path(name)).expect("scenario loads");
    let mut out = Vec::new();
    let report = scenario
        .run(&DockConfig::default(), &mut out)
        .expect("scenario replays");

    let text = String::from_utf8(out).expect("utf8 output");
    let frames = text
        .lines()
        .map(|line| serde_json::from_str(line).expect("frame is json"))
        .collect();
    (report, frames)
}

fn item_ids(report: &ScenarioReport) -> Vec<u64> {
    report.last_frame.items.iter().map(|draw| draw.id.0).collect()
}

// ========================================================================
// Sample Scenario Tests
// ========================================================================

#[test]
fn test_intellihide_scenario_reveals_then_hides() {
    let (report, frames) = replay("intellihide.yaml");

    assert_eq!(report.steps, 4);
    assert_eq!(report.frames, frames.len());
    assert!(!report.quit);
    assert!(report.hidden);
    assert!(report.last_frame.hidden);
    assert_eq!(report.last_frame.hovered, None);

    let revealed = frames.iter().any(|frame| {
        frame["t_ms"].as_u64().is_some_and(|t| (1000..2000).contains(&t)) && frame["frame"]["hidden"] == false
    });
    assert!(revealed, "dock never revealed at the screen edge");
}

#[test]
fn test_reorder_scenario_keeps_dropped_order() {
    let (report, frames) = replay("reorder.yaml");

    assert!(!report.hidden);
    assert_eq!(item_ids(&report), vec![2, 1, 4]);
    assert!(report.last_frame.removing.is_empty());
    assert_eq!(report.last_frame.hovered, None);

    // Timestamps never go backwards
    let times: Vec<u64> = frames.iter().filter_map(|f| f["t_ms"].as_u64()).collect();
    assert_eq!(times.len(), frames.len());
    assert!(times.windows(2).all(|pair| pair[0] <= pair[1]));
}

#[test]
fn test_frames_carry_item_geometry() {
    let (_, frames) = replay("reorder.yaml");
    let last = frames.last().expect("at least one frame");
    let items = last["frame"]["items"].as_array().expect("items array");
    assert_eq!(items.len(), 3);
    for item in items {
        assert!(item["value"]["center"]["x"].is_number());
        assert!(item["value"]["zoom"].as_f64().is_some_and(|zoom| zoom >= 1.0));
    }
}

// ========================================================================
// Inline Scenario Tests
// ========================================================================

#[test]
fn test_quit_stops_replay_early() {
    let source = r#"
screen: { x: 0, y: 0, width: 1000, height: 800 }
providers:
  - name: launchers
    items: [ { id: 1 }, { id: 2 } ]
steps:
  - { at_ms: 0, action: startup_complete }
  - { at_ms: 100, action: quit }
  - { at_ms: 200, action: pointer, x: 500, y: 790 }
"#;
    let scenario = Scenario::from_yaml(source).expect("valid scenario");
    let mut out = Vec::new();
    let report = scenario.run(&DockConfig::default(), &mut out).expect("replay");

    assert!(report.quit);
    assert_eq!(report.last_frame.hovered, None);
}

#[test]
fn test_scenario_config_overrides_base() {
    let source = r#"
screen: { x: 0, y: 0, width: 1000, height: 800 }
config:
  autohide: autohide
providers:
  - name: launchers
    items: [ { id: 1 } ]
steps:
  - { at_ms: 0, action: startup_complete }
"#;
    let scenario = Scenario::from_yaml(source).expect("valid scenario");
    let mut out = Vec::new();
    let report = scenario.run(&DockConfig::default(), &mut out).expect("replay");
    assert!(report.hidden);
}

#[test]
fn test_unknown_provider_is_an_error() {
    let source = r#"
screen: { x: 0, y: 0, width: 1000, height: 800 }
providers:
  - name: launchers
steps:
  - { at_ms: 0, action: add_item, provider: trash, item: { id: 9 } }
"#;
    let scenario = Scenario::from_yaml(source).expect("parses");
    let mut out = Vec::new();
    let err = scenario
        .run(&DockConfig::default(), &mut out)
        .expect_err("unknown provider");
    assert!(matches!(err, DockError::Scenario(_)));
    assert!(err.to_string().contains("trash"));
}

#[test]
fn test_empty_screen_is_rejected() {
    let source = "screen: { x: 0, y: 0, width: 0, height: 800 }\n";
    assert!(matches!(Scenario::from_yaml(source), Err(DockError::Scenario(_))));
}

#[test]
fn test_unknown_action_is_rejected() {
    let source = r#"
screen: { x: 0, y: 0, width: 100, height: 100 }
steps:
  - { at_ms: 0, action: teleport }
"#;
    assert!(Scenario::from_yaml(source).is_err());
    assert!(Scenario::load(&scenario_path("missing.yaml")).is_err());
}

#[test]
fn test_hovered_item_in_last_frame() {
    let source = r#"
screen: { x: 0, y: 0, width: 1000, height: 800 }
config:
  autohide: none
providers:
  - name: launchers
    items: [ { id: 1 }, { id: 2 }, { id: 3 } ]
steps:
  - { at_ms: 0, action: startup_complete }
  - { at_ms: 500, action: pointer, x: 440, y: 790 }
"#;
    let scenario = Scenario::from_yaml(source).expect("valid scenario");
    let mut out = Vec::new();
    let report = scenario.run(&DockConfig::default(), &mut out).expect("replay");
    assert_eq!(report.last_frame.hovered, Some(ItemId(1)));
}
