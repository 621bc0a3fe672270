use assert_cmd::Command;
use predicates::prelude::*;

const SAMPLE_VTT: &str = "WEBVTT\n\
    Kind: captions\n\
    Language: en\n\
    \n\
    00:00:02.000 --> 00:00:04.500\n\
    first we sear the chicken thighs\n\
    \n\
    00:00:30.000 --> 00:00:33.000\n\
    now simmer the sauce until thick\n\
    \n\
    00:01:00.000 --> 00:01:03.000\n\
    finally plate it up with parsley\n";

const SAMPLE_RECIPE: &str = r#"{
    "title": "Chicken in Sauce",
    "instructions": [
        {
            "step": 1,
            "text": "Sear the chicken thighs.",
            "keywords": { "ingredients": ["chicken"], "techniques": ["sear"], "equipment": [] }
        },
        {
            "step": 2,
            "text": "Simmer the sauce.",
            "keywords": { "ingredients": ["sauce"], "techniques": ["simmer"], "equipment": [] }
        }
    ]
}"#;

/// Command with config/cache/cwd isolated to a temp home.
fn stepscribe(home: &std::path::Path) -> Command {
    let mut cmd = Command::cargo_bin("stepscribe").unwrap();
    cmd.current_dir(home)
        .env("HOME", home)
        .env("XDG_CONFIG_HOME", home.join(".config"))
        .env("XDG_CACHE_HOME", home.join(".cache"));
    cmd
}

#[test]
fn help_lists_subcommands() {
    let home = tempfile::tempdir().unwrap();
    stepscribe(home.path())
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("extract"))
        .stdout(predicate::str::contains("align"))
        .stdout(predicate::str::contains("batch"));
}

#[test]
fn extract_from_local_vtt_prints_transcript() {
    let home = tempfile::tempdir().unwrap();
    let vtt = home.path().join("sample.vtt");
    fs_err::write(&vtt, SAMPLE_VTT).unwrap();

    stepscribe(home.path())
        .args(["extract", vtt.to_str().unwrap()])
        .assert()
        .success()
        .stdout(predicate::str::contains("first we sear the chicken thighs"))
        .stdout(predicate::str::contains("plate it up with parsley"));
}

#[test]
fn extract_with_timestamps_prefixes_segments() {
    let home = tempfile::tempdir().unwrap();
    let vtt = home.path().join("sample.vtt");
    fs_err::write(&vtt, SAMPLE_VTT).unwrap();

    stepscribe(home.path())
        .args(["extract", vtt.to_str().unwrap(), "--timestamps", "--skip-cache"])
        .assert()
        .success()
        .stdout(predicate::str::contains("[00:30] now simmer the sauce until thick"));
}

#[test]
fn align_with_recipe_file_predicts_step_times() {
    let home = tempfile::tempdir().unwrap();
    let vtt = home.path().join("sample.vtt");
    let recipe = home.path().join("recipe.json");
    fs_err::write(&vtt, SAMPLE_VTT).unwrap();
    fs_err::write(&recipe, SAMPLE_RECIPE).unwrap();

    stepscribe(home.path())
        .args([
            "align",
            vtt.to_str().unwrap(),
            "--recipe",
            recipe.to_str().unwrap(),
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"video_references\""))
        .stdout(predicate::str::contains("\"predicted_time\""))
        .stdout(predicate::str::contains("\"keyword\": \"sear\""));
}

#[test]
fn extract_rejects_non_caption_file() {
    let home = tempfile::tempdir().unwrap();
    let bogus = home.path().join("notes.vtt");
    fs_err::write(&bogus, "no cues in here at all").unwrap();

    stepscribe(home.path())
        .args(["extract", bogus.to_str().unwrap()])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unsupported caption format"));
}
