//! Saving mid-run, resuming from disk and the ending registry

use pgn::config::EngineConfig;
use pgn::host::{Host, MemoryFileViewer, MemoryPluginHost, ScriptedPresentation};
use pgn::runtime::{RunOutcome, ScriptRunner, StartMode};
use pgn::storage::{self, endings::FileEndingStore};
use pgn::types::Interrupt;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

const STORY: &str = "\
set gold = 5
input \"Name?\" hero
say \"Hello ${hero}\"
set gold += 10
say \"You have ${gold} gold\"
choose 2 good:Help bad:Leave
good:
endname Kind Heart
end
bad:
endname Cold Shoulder
end";

fn write_story(dir: &Path) -> PathBuf {
    let folder = dir.join("Novel").join("story");
    std::fs::create_dir_all(&folder).unwrap();
    let script = folder.join("story.pgn");
    std::fs::write(&script, STORY).unwrap();
    script
}

fn play(
    script: &Path,
    presentation: &mut ScriptedPresentation,
    start: impl FnOnce(&mut ScriptRunner<'_>) -> RunOutcome,
) -> RunOutcome {
    let folder = script.parent().unwrap();
    let mut plugins = MemoryPluginHost::new();
    let mut viewer = MemoryFileViewer::new();
    let mut endings = FileEndingStore::new(folder);
    let host = Host::new(presentation, &mut plugins, &mut viewer, &mut endings);
    let mut runner = ScriptRunner::new(&EngineConfig::default(), host);
    start(&mut runner)
}

#[test]
fn save_and_resume_keeps_state_and_position() {
    let dir = TempDir::new().unwrap();
    let script = write_story(dir.path());

    let mut first = ScriptedPresentation::new()
        .with_inputs(["Aki"])
        .with_interrupts([Interrupt::None, Interrupt::SaveExit]);
    let outcome = play(&script, &mut first, |runner| {
        runner.run_file(&script, StartMode::Fresh).unwrap()
    });

    let save = storage::save_path(&script, "autosave");
    assert_eq!(outcome, RunOutcome::Saved(save.clone()));
    assert_eq!(first.texts(), ["Hello Aki", "You have 15 gold"]);

    let record = storage::load(&save).unwrap();
    assert_eq!(record.cursor, 4);
    assert_eq!(record.state.get_int("gold"), 15);
    assert_eq!(record.state.get_string("hero"), Some("Aki"));

    let mut second = ScriptedPresentation::new().with_choices([0]);
    let outcome = play(&script, &mut second, |runner| runner.resume(&save).unwrap());

    assert_eq!(outcome, RunOutcome::Exited);
    assert_eq!(second.texts(), ["You have 15 gold"]);
    assert_eq!(
        second.acknowledged,
        ["Ending reached: Kind Heart\nEndings collected: 1/2", "The End"]
    );

    let data = std::fs::read_to_string(script.parent().unwrap().join("data.inf")).unwrap();
    assert_eq!(data, "[ENDINGS]\nKind Heart\n");
    assert_eq!(
        storage::endings::ending_stats(script.parent().unwrap()),
        (1, 2)
    );
}

#[test]
fn fresh_start_picks_up_collected_endings() {
    let dir = TempDir::new().unwrap();
    let script = write_story(dir.path());
    std::fs::write(
        script.parent().unwrap().join("data.inf"),
        "[ENDINGS]\nKind Heart\n",
    )
    .unwrap();

    let mut presentation = ScriptedPresentation::new().with_choices([1]);
    let outcome = play(&script, &mut presentation, |runner| {
        runner.run_file(&script, StartMode::Fresh).unwrap()
    });

    assert_eq!(outcome, RunOutcome::Exited);
    assert_eq!(
        presentation.acknowledged[0],
        "Ending reached: Cold Shoulder\nEndings collected: 2/2"
    );
    let data = std::fs::read_to_string(script.parent().unwrap().join("data.inf")).unwrap();
    assert_eq!(data, "[ENDINGS]\nKind Heart\nCold Shoulder\n");
}

#[test]
fn resume_with_bad_line_number_starts_over() {
    let dir = TempDir::new().unwrap();
    let script = write_story(dir.path());
    let save = storage::save_path(&script, "autosave");
    std::fs::create_dir_all(save.parent().unwrap()).unwrap();
    std::fs::write(
        &save,
        format!(
            "[SAVE_INFO]\nscript_path={}\ncurrent_line=abc\n\n[VARIABLES]\ngold=1\n",
            script.display()
        ),
    )
    .unwrap();

    let mut presentation = ScriptedPresentation::new().with_inputs(["Rin"]);
    play(&script, &mut presentation, |runner| runner.resume(&save).unwrap());

    assert_eq!(presentation.prompts, ["Name?"]);
    assert_eq!(presentation.texts()[1], "You have 15 gold");
}

#[test]
fn missing_script_is_an_error() {
    let dir = TempDir::new().unwrap();
    let mut presentation = ScriptedPresentation::new();
    let missing = dir.path().join("nope.pgn");
    let mut plugins = MemoryPluginHost::new();
    let mut viewer = MemoryFileViewer::new();
    let mut endings = FileEndingStore::new(dir.path());
    let host = Host::new(&mut presentation, &mut plugins, &mut viewer, &mut endings);

    let result = ScriptRunner::new(&EngineConfig::default(), host).run_file(&missing, StartMode::Fresh);
    assert!(matches!(result, Err(pgn::EngineError::ScriptRead { .. })));
}
