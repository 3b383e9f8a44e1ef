#![deny(clippy::all)]
#![deny(clippy::pedantic)]

use anyhow::{bail, Result};
use clap::Parser;
use cli_table::{print_stdout, WithTitle};
use indicatif::{ProgressBar, ProgressStyle};
use tankobon_core::{
    process_folder, process_root, JikanClient, KccConverter, PipelineEvent, PipelineOptions,
    Stage, StageOutcome,
};
use tracing::{error, info, warn};

use crate::args::Args;
use crate::types::MetadataRow;

mod args;
mod types;

fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let args = Args::parse();

    let converter = KccConverter::new(args.kcc_path.clone());
    if !args.dry_run && !converter.is_available() {
        bail!(
            "'{}' is not installed or not on PATH, install KCC first",
            args.kcc_path
        );
    }

    let provider = JikanClient::new();
    let options = PipelineOptions {
        chapters_per_part: args.chapters_per_part,
        dry_run: args.dry_run,
    };

    let style = ProgressStyle::with_template("[{elapsed_precise}] [{wide_bar}] {pos}/{len} {msg}")?;
    let mut bar: Option<ProgressBar> = None;

    let mut on_event = |event: PipelineEvent| match event {
        PipelineEvent::FolderStarted {
            folder,
            series,
            metadata,
            parts,
        } => {
            info!("processing '{series}' in '{folder}' ({parts} parts)");
            if let Err(err) = print_stdout(MetadataRow::rows(&metadata).with_title()) {
                warn!("failed to display metadata table: {err}");
            }
            let progress = ProgressBar::new(parts as u64);
            progress.set_style(style.clone());
            bar = Some(progress);
        }
        PipelineEvent::PartStarted { range, .. } => {
            if let Some(bar) = &bar {
                bar.set_message(format!("chapters {range}"));
            }
        }
        PipelineEvent::StageFinished {
            range,
            stage,
            outcome,
        } => {
            if let StageOutcome::Failed(reason) = outcome {
                let stage = match stage {
                    Stage::Combine => "combining",
                    Stage::Convert => "conversion",
                };
                error!("{stage} failed for chapters {range}: {reason}");
            }
        }
        PipelineEvent::PartFinished { .. } => {
            if let Some(bar) = &bar {
                bar.inc(1);
            }
        }
        PipelineEvent::FolderFinished { .. } => {
            if let Some(bar) = bar.take() {
                bar.finish_and_clear();
            }
        }
    };

    if args.all {
        process_root(&args.folder, &options, &provider, &converter, &mut on_event)?;
    } else {
        process_folder(&args.folder, &options, &provider, &converter, &mut on_event)?;
    }

    Ok(())
}
