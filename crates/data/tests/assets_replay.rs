use caseroll_core::{CaseEngine, CaseError, Event, EventBus, Request, ResolveAction};
use caseroll_data::{
    apply_step, load_catalog, load_catalog_file, load_engine_config, load_script, save_script,
    ReplayScript, ReplayStep,
};
use std::fs;
use std::path::{Path, PathBuf};

fn assets_root() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join("..")
        .join("assets")
}

fn scratch_file(name: &str) -> PathBuf {
    std::env::temp_dir().join(format!("caseroll-{}-{name}", std::process::id()))
}

fn replay(script: &ReplayScript) -> (CaseEngine, EventBus, Vec<CaseError>) {
    let mut config = load_engine_config(&assets_root().join("engine.json")).expect("config");
    if script.seed.is_some() {
        config.seed = script.seed;
    }
    let mut engine = CaseEngine::new(config);
    let mut bus = EventBus::default();
    let catalog = load_catalog_file(&assets_root().join("catalog.json")).expect("catalog");
    engine
        .apply(catalog.into_inbound(), &mut bus)
        .expect("apply catalog");
    let rejected = script
        .steps
        .iter()
        .filter_map(|step| apply_step(&mut engine, step, &mut bus).err())
        .collect();
    (engine, bus, rejected)
}

#[test]
fn bundled_assets_load() {
    let catalog = load_catalog(&assets_root().join("catalog.json")).expect("catalog");
    assert_eq!(catalog.len(), 3);
    let gold = catalog.get("gold").expect("gold");
    assert_eq!(gold.total_weight(), 1000);
    let config = load_engine_config(&assets_root().join("engine.json")).expect("config");
    assert_eq!(config.progression.base_xp, 1000);
    assert_eq!(config.reel.stop_index(), 20);
    assert_eq!(config.seed, Some(0xC0FFEE));
}

#[test]
fn demo_script_replays_one_full_session() {
    let script = load_script(&assets_root().join("scripts").join("demo.json")).expect("script");
    let (engine, bus, rejected) = replay(&script);

    assert_eq!(
        rejected,
        vec![CaseError::CaseOnCooldown {
            remaining_seconds: 5
        }]
    );
    let names: Vec<&str> = bus
        .requests()
        .iter()
        .map(|request| match request {
            Request::RequestOpen { .. } => "requestOpen",
            Request::CollectReward { .. } => "collectReward",
            Request::ResolvePending { .. } => "resolvePending",
            Request::QueryPendingItems => "queryPendingItems",
            Request::QueryPlayerStats => "queryPlayerStats",
            Request::CloseUi => "closeUi",
        })
        .collect();
    assert_eq!(
        names,
        vec![
            "requestOpen",
            "collectReward",
            "resolvePending",
            "queryPendingItems",
            "queryPlayerStats",
            "closeUi"
        ]
    );
    assert!(bus.requests().contains(&Request::ResolvePending {
        item_id: "17".to_string(),
        action: ResolveAction::Sell,
    }));
    assert!(bus.events().contains(&Event::LevelUp {
        old_level: 3,
        new_level: 4
    }));
    assert!(bus.events().contains(&Event::CasesAvailable));
    assert_eq!(engine.player().money, 1100);
    assert_eq!(engine.player().level, 4);
}

#[test]
fn missing_config_falls_back_to_defaults() {
    let config = load_engine_config(Path::new("/nonexistent/caseroll/engine.json")).expect("defaults");
    assert_eq!(config, caseroll_core::EngineConfig::default());
}

#[test]
fn malformed_files_report_their_path() {
    let path = scratch_file("bad-config.json");
    fs::write(&path, r#"{"progression":{"base_xp":0}}"#).expect("write");
    let err = load_engine_config(&path).expect_err("zero base");
    assert!(err.to_string().contains("base_xp"));

    fs::write(&path, "{ not json").expect("write");
    let err = load_engine_config(&path).expect_err("parse");
    assert!(err.to_string().contains(&path.display().to_string()));
    let _ = fs::remove_file(&path);

    let empty = scratch_file("empty-catalog.json");
    fs::write(&empty, r#"{"cases":[]}"#).expect("write");
    assert!(load_catalog(&empty).is_err());
    let _ = fs::remove_file(&empty);
}

#[test]
fn scripts_survive_save_and_reject_other_versions() {
    let path = scratch_file("script.json");
    let mut script = ReplayScript::new(vec![
        ReplayStep::Open {
            case_id: "bronze".to_string(),
        },
        ReplayStep::Reset {
            reason: "closed".to_string(),
        },
    ]);
    script.seed = Some(7);
    save_script(&script, &path).expect("save");
    assert_eq!(load_script(&path).expect("load"), script);

    let (engine, bus, rejected) = replay(&script);
    assert!(rejected.is_empty());
    assert_eq!(engine.phase(), caseroll_core::Phase::Idle);
    assert!(bus.events().contains(&Event::SessionReset {
        reason: "closed".to_string(),
        was_active: true,
    }));

    script.version = 2;
    save_script(&script, &path).expect("save");
    let err = load_script(&path).expect_err("version");
    assert!(err.to_string().contains("unsupported script version 2"));
    let _ = fs::remove_file(&path);
}
