//! End-to-end pipeline tests with fake collaborators: resumability, skip
//! semantics, and failure isolation.

use std::fs;

use camino::Utf8Path;
use tankobon_core::{
    process_folder, process_root, Error, PipelineEvent, PipelineOptions, Stage, StageOutcome,
    Status, OUTPUT_DIR, STATUS_FILE,
};

mod common;
use common::{
    entry_names, test_metadata, utf8_tempdir, write_chapter, CountingConverter, FakeProvider,
};

fn options(chapters_per_part: usize) -> PipelineOptions {
    PipelineOptions {
        chapters_per_part,
        dry_run: false,
    }
}

fn seed_folder(folder: &Utf8Path, chapters: usize) {
    for n in 1..=chapters {
        write_chapter(
            folder,
            &format!("Test Series Chapter {n}.cbz"),
            &[&format!("{n}-1.png"), &format!("{n}-2.png")],
        );
    }
}

fn stage_outcomes(events: &[PipelineEvent], stage: Stage) -> Vec<StageOutcome> {
    events
        .iter()
        .filter_map(|event| match event {
            PipelineEvent::StageFinished {
                stage: s, outcome, ..
            } if *s == stage => Some(outcome.clone()),
            _ => None,
        })
        .collect()
}

fn run(
    folder: &Utf8Path,
    options: &PipelineOptions,
    provider: &FakeProvider,
    converter: &CountingConverter,
) -> Vec<PipelineEvent> {
    let mut events = Vec::new();
    process_folder(folder, options, provider, converter, &mut |event| {
        events.push(event);
    })
    .unwrap();
    events
}

#[test]
fn processes_every_part_and_records_completion() {
    let (_dir, folder) = utf8_tempdir();
    seed_folder(&folder, 4);
    let provider = FakeProvider::found(test_metadata());
    let converter = CountingConverter::working();

    let events = run(&folder, &options(2), &provider, &converter);

    assert_eq!(
        stage_outcomes(&events, Stage::Combine),
        vec![StageOutcome::Completed, StageOutcome::Completed]
    );
    assert_eq!(
        stage_outcomes(&events, Stage::Convert),
        vec![StageOutcome::Completed, StageOutcome::Completed]
    );
    assert_eq!(converter.calls.get(), 2);
    assert_eq!(provider.lookups.get(), 1);

    let status = Status::load(&folder);
    assert!(status.is_combined("1 - 2"));
    assert!(status.is_combined("3 - 4"));
    assert!(status.is_converted("1 - 2"));
    assert!(status.is_converted("3 - 4"));

    // Combined archives land in the output directory under the series name.
    assert!(folder.join(OUTPUT_DIR).join("Test Series 1 - 2.cbz").exists());
    assert!(folder.join(OUTPUT_DIR).join("Test Series 3 - 4.cbz").exists());
}

#[test]
fn second_run_skips_all_work() {
    let (_dir, folder) = utf8_tempdir();
    seed_folder(&folder, 4);
    let provider = FakeProvider::found(test_metadata());
    let converter = CountingConverter::working();

    run(&folder, &options(2), &provider, &converter);
    let events = run(&folder, &options(2), &provider, &converter);

    assert_eq!(
        stage_outcomes(&events, Stage::Combine),
        vec![StageOutcome::AlreadyDone, StageOutcome::AlreadyDone]
    );
    assert_eq!(
        stage_outcomes(&events, Stage::Convert),
        vec![StageOutcome::AlreadyDone, StageOutcome::AlreadyDone]
    );
    // No further converter invocations on the second run.
    assert_eq!(converter.calls.get(), 2);
}

#[test]
fn converter_failure_is_isolated_per_part() {
    let (_dir, folder) = utf8_tempdir();
    seed_folder(&folder, 4);
    let provider = FakeProvider::found(test_metadata());
    let failing = CountingConverter::failing();

    let events = run(&folder, &options(2), &provider, &failing);

    // Both parts still combined, both conversions attempted and failed.
    assert_eq!(
        stage_outcomes(&events, Stage::Combine),
        vec![StageOutcome::Completed, StageOutcome::Completed]
    );
    assert!(stage_outcomes(&events, Stage::Convert)
        .iter()
        .all(|outcome| matches!(outcome, StageOutcome::Failed(_))));
    assert_eq!(failing.calls.get(), 2);

    let status = Status::load(&folder);
    assert!(status.is_combined("1 - 2"));
    assert!(!status.is_converted("1 - 2"));

    // A later run with a working converter converts without re-combining.
    let working = CountingConverter::working();
    let events = run(&folder, &options(2), &provider, &working);
    assert_eq!(
        stage_outcomes(&events, Stage::Combine),
        vec![StageOutcome::AlreadyDone, StageOutcome::AlreadyDone]
    );
    assert_eq!(
        stage_outcomes(&events, Stage::Convert),
        vec![StageOutcome::Completed, StageOutcome::Completed]
    );
    assert_eq!(working.calls.get(), 2);
}

#[test]
fn missing_combined_archive_is_rebuilt_despite_the_mark() {
    let (_dir, folder) = utf8_tempdir();
    seed_folder(&folder, 4);
    let provider = FakeProvider::found(test_metadata());
    let converter = CountingConverter::working();

    run(&folder, &options(2), &provider, &converter);

    // Someone deletes one combined archive; the mark alone must not be trusted.
    fs::remove_file(folder.join(OUTPUT_DIR).join("Test Series 1 - 2.cbz")).unwrap();

    let events = run(&folder, &options(2), &provider, &converter);
    assert_eq!(
        stage_outcomes(&events, Stage::Combine),
        vec![StageOutcome::Completed, StageOutcome::AlreadyDone]
    );
    assert!(folder.join(OUTPUT_DIR).join("Test Series 1 - 2.cbz").exists());
}

#[test]
fn dry_run_touches_nothing() {
    let (_dir, folder) = utf8_tempdir();
    seed_folder(&folder, 4);
    let provider = FakeProvider::found(test_metadata());
    let converter = CountingConverter::working();

    let dry = PipelineOptions {
        chapters_per_part: 2,
        dry_run: true,
    };
    let events = run(&folder, &dry, &provider, &converter);

    // The initial lookup still happens, nothing else does.
    assert_eq!(provider.lookups.get(), 1);
    assert_eq!(converter.calls.get(), 0);
    assert!(stage_outcomes(&events, Stage::Combine).is_empty());
    assert!(!folder.join(OUTPUT_DIR).exists());
    assert!(!folder.join(STATUS_FILE).exists());
}

#[test]
fn folder_without_archives_is_fatal() {
    let (_dir, folder) = utf8_tempdir();
    let provider = FakeProvider::found(test_metadata());
    let converter = CountingConverter::working();

    let result = process_folder(
        &folder,
        &options(2),
        &provider,
        &converter,
        &mut |_event| {},
    );

    assert!(matches!(result, Err(Error::NoArchives(_))));
}

#[test]
fn metadata_miss_is_fatal_to_the_folder() {
    let (_dir, folder) = utf8_tempdir();
    seed_folder(&folder, 2);
    let provider = FakeProvider::not_found();
    let converter = CountingConverter::working();

    let result = process_folder(
        &folder,
        &options(2),
        &provider,
        &converter,
        &mut |_event| {},
    );

    assert!(matches!(result, Err(Error::MetadataNotFound(_))));
    assert_eq!(converter.calls.get(), 0);
}

#[test]
fn batch_run_continues_past_failing_folders() {
    let (_dir, root) = utf8_tempdir();

    // Sorted first, so its metadata miss must not stop the batch.
    let failing = root.join("Aaa Series");
    fs::create_dir(&failing).unwrap();
    write_chapter(&failing, "Aaa Series Chapter 1.cbz", &["p1.png"]);

    let good = root.join("Beta Series");
    fs::create_dir(&good).unwrap();
    for n in 1..=2 {
        write_chapter(&good, &format!("Beta Series Chapter {n}.cbz"), &["p1.png"]);
    }

    fs::create_dir(root.join("No Archives Here")).unwrap();

    let provider = FakeProvider::found_only_for("Beta Series", test_metadata());
    let converter = CountingConverter::working();

    let mut events = Vec::new();
    process_root(&root, &options(10), &provider, &converter, &mut |event| {
        events.push(event);
    })
    .unwrap();

    // Only the folder with a metadata match gets past the lookup.
    let started = events
        .iter()
        .filter_map(|event| match event {
            PipelineEvent::FolderStarted { folder, .. } => Some(folder.clone()),
            _ => None,
        })
        .collect::<Vec<_>>();
    assert_eq!(started, vec![good.clone()]);

    assert_eq!(converter.calls.get(), 1);
    assert!(good.join(OUTPUT_DIR).join("Beta Series 1 - 2.cbz").exists());
    assert!(!failing.join(OUTPUT_DIR).exists());
    // The archive-less folder is skipped before any lookup happens.
    assert_eq!(provider.lookups.get(), 2);
}

#[test]
fn batch_run_scans_bracketed_folder_names() {
    let (_dir, root) = utf8_tempdir();
    let folder = root.join("Gamma Series [2020]");
    fs::create_dir(&folder).unwrap();
    write_chapter(&folder, "Gamma Series Chapter 1.cbz", &["p1.png"]);

    let provider = FakeProvider::found_only_for("Gamma Series", test_metadata());
    let converter = CountingConverter::working();

    process_root(&root, &options(10), &provider, &converter, &mut |_event| {})
        .unwrap();

    assert_eq!(converter.calls.get(), 1);
    assert!(folder
        .join(OUTPUT_DIR)
        .join("Gamma Series 1 - 1.cbz")
        .exists());
}

#[test]
fn fallback_cover_leads_each_combined_archive() {
    let (_dir, folder) = utf8_tempdir();
    seed_folder(&folder, 2);
    // No cover url, so the first image of the first chapter is the cover.
    let provider = FakeProvider::found(test_metadata());
    let converter = CountingConverter::working();

    run(&folder, &options(2), &provider, &converter);

    let names = entry_names(&folder.join(OUTPUT_DIR).join("Test Series 1 - 2.cbz"));
    assert!(names[0].starts_with("00001_cover."));
}

#[test]
fn descriptor_is_appended_to_the_archive() {
    let (_dir, folder) = utf8_tempdir();
    let archive = write_chapter(&folder, "Test Series Chapter 1.cbz", &["p1.png"]);

    tankobon_core::embed_comic_info(&archive, &test_metadata()).unwrap();

    let names = entry_names(&archive);
    assert_eq!(names, vec!["p1.png", "ComicInfo.xml"]);
}
