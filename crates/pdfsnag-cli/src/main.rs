use pdfsnag_core::logging;

mod cli;

use crate::cli::Cli;

fn main() {
    // Initialize logging as early as possible; stderr if the state dir is unusable.
    let log_file = logging::default_log_path().ok();
    logging::init_logging(log_file.as_deref());

    if let Err(err) = Cli::run_from_args() {
        // Narration (failure included) goes to stdout; the log keeps the detail.
        println!("{}", cli::format_failure(&err));
        tracing::error!("{:#}", err);
        std::process::exit(1);
    }
}
