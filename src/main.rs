//! # file-organizer CLI
//!
//! Command-line interface for the smart file organizer.
//!
//! ## Usage
//! ```bash
//! file-organizer organize ~/Downloads --mode time --granularity month
//! file-organizer undo ~/Downloads
//! ```

mod cli;

use smart_file_organizer::Result;

fn main() -> Result<()> {
    let cli = cli::parse();

    let log_file = cli
        .log_file()
        .map(|path| path.to_path_buf())
        .unwrap_or_else(smart_file_organizer::default_log_path);
    if let Err(e) = smart_file_organizer::init_logging(&log_file) {
        eprintln!("Logging disabled ({}): {}", log_file.display(), e);
    }

    cli::run(cli)
}
