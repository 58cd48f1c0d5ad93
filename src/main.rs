use clap::Parser;
use simplelog::{ConfigBuilder, LevelFilter, WriteLogger};
use std::fs::File;
use std::str::FromStr;

use trainer_term::core::{config, diagnostics};
use trainer_term::tui;

#[derive(Parser)]
#[command(name = "trainer", about = "Terminal client for the Linux trainer")]
struct Args {
    /// Backend API base URL (overrides TRAINER_BACKEND_URL and the config file)
    #[arg(long)]
    backend_url: Option<String>,

    /// Lesson to resume or start on launch
    #[arg(short, long)]
    lesson: Option<String>,
}

#[tokio::main]
async fn main() -> std::io::Result<()> {
    let args = Args::parse();
    dotenv::dotenv().ok();

    let file_config = match config::load_config() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("{e}, using defaults");
            config::TrainerConfig::default()
        }
    };
    let resolved = config::resolve(
        &file_config,
        args.backend_url.as_deref(),
        args.lesson.as_deref(),
    );

    // File logger: the terminal belongs to the session
    let log_config = ConfigBuilder::new().set_time_format_rfc3339().build();
    let level = LevelFilter::from_str(&resolved.log_level).unwrap_or(LevelFilter::Debug);
    if let Ok(log_file) = File::create(&resolved.log_file) {
        let _ = WriteLogger::init(level, log_config, log_file);
    }

    log::info!("Trainer starting up with backend {}", resolved.backend_url);

    let default_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        tui::restore_terminal();
        let backtrace = std::backtrace::Backtrace::force_capture();
        let report = diagnostics::panic_report(&info.to_string(), &backtrace);
        eprintln!("{}", report.line());
        default_hook(info);
    }));

    tui::run(resolved)
}
