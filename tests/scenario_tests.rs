//! End-to-end runs of small scripts through the script runner

use pgn::config::EngineConfig;
use pgn::host::{
    Host, MemoryEndingStore, MemoryFileViewer, MemoryPluginHost, ScriptedPresentation,
};
use pgn::runtime::{RunOutcome, ScriptRunner, StartMode};
use pgn::types::{Interrupt, Script};
use pgn::ScriptError;

struct Run {
    outcome: RunOutcome,
    presentation: ScriptedPresentation,
    endings: MemoryEndingStore,
    plugins: MemoryPluginHost,
}

fn run_with(
    source: &str,
    mut presentation: ScriptedPresentation,
    mut plugins: MemoryPluginHost,
    mut endings: MemoryEndingStore,
) -> Run {
    let script = Script::from_source("Novel/demo/demo.pgn", source);
    let mut viewer = MemoryFileViewer::new();
    let config = EngineConfig::default().with_seed(7);

    let outcome = {
        let host = Host::new(&mut presentation, &mut plugins, &mut viewer, &mut endings);
        ScriptRunner::new(&config, host)
            .run_script(&script, StartMode::Fresh)
            .expect("in-memory run should not fail")
    };

    Run {
        outcome,
        presentation,
        endings,
        plugins,
    }
}

fn run(source: &str, presentation: ScriptedPresentation) -> Run {
    run_with(
        source,
        presentation,
        MemoryPluginHost::new(),
        MemoryEndingStore::new(),
    )
}

#[test]
fn if_jumps_over_the_losing_branch() {
    let result = run(
        "set hp = 10\nif hp > 5 win\nsay lose\nwin:\nsay win",
        ScriptedPresentation::new(),
    );

    assert_eq!(result.outcome, RunOutcome::Finished);
    assert_eq!(result.presentation.texts(), ["win"]);
    assert_eq!(result.presentation.acknowledged, ["Script finished"]);
}

#[test]
fn choose_follows_the_picked_label() {
    let source = "\
choose 2 a:Yes b:No
a:
say \"picked yes\"
end
b:
say \"picked no\"";
    let result = run(source, ScriptedPresentation::new().with_choices([0]));

    assert_eq!(result.outcome, RunOutcome::Exited);
    assert_eq!(result.presentation.texts(), ["picked yes"]);
    assert_eq!(result.presentation.offered, [vec!["Yes", "No"]]);
}

#[test]
fn and_or_combine_left_to_right() {
    let source = "\
set a = 1
set b = 0
set c = 1
if a && b || c yes
say \"no\"
end
yes:
say \"yes\"";
    let result = run(source, ScriptedPresentation::new());
    assert_eq!(result.presentation.texts(), ["yes"]);
}

#[test]
fn nested_parentheses() {
    let source = "\
set a = 0
set b = 1
set c = 1
if ((a || b) && c) hit
say \"miss\"
end
hit:
say \"hit\"";
    let result = run(source, ScriptedPresentation::new());
    assert_eq!(result.presentation.texts(), ["hit"]);
}

#[test]
fn authoring_mistakes_do_not_stop_the_story() {
    let source = "\
say \"start\"
fly away
jump nowhere
say \"unterminated
set x ^= 1
say \"still here\"";
    let result = run(source, ScriptedPresentation::new());

    assert_eq!(result.outcome, RunOutcome::Finished);
    assert_eq!(result.presentation.texts(), ["start", "still here"]);

    let lines: Vec<usize> = result.presentation.diagnostics.iter().map(|d| d.line).collect();
    assert_eq!(lines, [2, 3, 4, 5]);
    assert!(matches!(
        result.presentation.diagnostics[2].error,
        ScriptError::MissingQuote { column: 5, .. }
    ));
}

#[test]
fn endings_are_registered_and_collected() {
    let source = "\
say \"the end is near\"
endname Good End
end
endname Bad End";
    let result = run_with(
        source,
        ScriptedPresentation::new(),
        MemoryPluginHost::new(),
        MemoryEndingStore::with_endings(["Bad End"]),
    );

    assert_eq!(result.outcome, RunOutcome::Exited);
    assert_eq!(result.endings.endings, ["Bad End", "Good End"]);
    assert_eq!(
        result.presentation.acknowledged,
        ["Ending reached: Good End\nEndings collected: 2/2", "The End"]
    );
}

#[test]
fn save_exit_from_pause_menu() {
    let dir = tempfile::TempDir::new().unwrap();
    let path = dir.path().join("demo.pgn");
    std::fs::write(&path, "say \"one\"\nsay \"two\"\nsay \"three\"").unwrap();

    let mut presentation =
        ScriptedPresentation::new().with_interrupts([Interrupt::None, Interrupt::SaveExit]);
    let mut plugins = MemoryPluginHost::new();
    let mut viewer = MemoryFileViewer::new();
    let mut endings = MemoryEndingStore::new();
    let host = Host::new(&mut presentation, &mut plugins, &mut viewer, &mut endings);

    let outcome = ScriptRunner::new(&EngineConfig::default(), host)
        .run_file(&path, StartMode::Fresh)
        .unwrap();

    let saved = dir.path().join("saves").join("autosave.sav");
    assert_eq!(outcome, RunOutcome::Saved(saved.clone()));
    assert_eq!(pgn::storage::load(&saved).unwrap().cursor, 1);
    assert_eq!(presentation.texts(), ["one", "two"]);
}

#[test]
fn debug_console_can_jump_and_edit_state() {
    let source = "\
say \"first\"
say \"skipped\"
say \"gold ${gold}\"";
    let presentation = ScriptedPresentation::new().with_console(["set gold 99", "goto 3"]);
    let result = run(source, presentation);

    assert_eq!(result.presentation.texts(), ["first", "gold 99"]);
    assert_eq!(result.presentation.console_output, ["gold = 99"]);
}

#[test]
fn use_without_plugins_returns_to_menu() {
    let result = run_with(
        "use painter 1.0\nsay \"never\"",
        ScriptedPresentation::new(),
        MemoryPluginHost::unavailable(),
        MemoryEndingStore::new(),
    );
    assert_eq!(result.outcome, RunOutcome::ReturnToMenu);
    assert!(result.presentation.transcript.is_empty());
}

#[test]
fn plugin_run_continues_the_story() {
    let result = run_with(
        "use painter 1\nplugin painter \"${hp} $log\"\nsay \"after\"",
        ScriptedPresentation::new(),
        MemoryPluginHost::new().with_plugin("painter", Some("1.4"), 0),
        MemoryEndingStore::new(),
    );

    assert_eq!(result.outcome, RunOutcome::Finished);
    assert_eq!(
        result.plugins.runs,
        [("painter".to_string(), vec!["0".to_string(), String::new()])]
    );
    assert_eq!(result.presentation.texts(), ["after"]);
}

#[test]
fn input_feeds_placeholders() {
    let result = run(
        "input \"Name?\" hero\nsay \"Welcome, ${hero}!\"",
        ScriptedPresentation::new().with_inputs(["Mika"]),
    );
    assert_eq!(result.presentation.texts(), ["Welcome, Mika!"]);
}
