use camino::Utf8PathBuf;
use clap::Parser;

#[derive(Parser, Debug)]
#[clap(about, author, version)]
pub struct Args {
    /// Folder containing the chapter archives, defaults to the current directory
    #[clap(default_value = ".")]
    pub folder: Utf8PathBuf,
    /// Process every child folder that contains cbz archives instead of the folder itself
    #[clap(short, long)]
    pub all: bool,
    /// Simulate processing without making any changes
    #[clap(long)]
    pub dry_run: bool,
    /// How many chapters go into one combined archive
    #[clap(short, long, default_value = "10")]
    pub chapters_per_part: usize,
    /// Path to the kcc executable
    #[clap(long, default_value = "kcc")]
    pub kcc_path: Utf8PathBuf,
}
