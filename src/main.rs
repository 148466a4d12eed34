use ratewatch::{
    arguments::{get_config_path_override, patterns, print_help},
    config::load_config,
    logger::{self as logger, LogTag},
    run::{run_pipeline, RunOptions},
};

/// Main entry point for RateWatch
///
/// One invocation = one pipeline run; scheduling is left to cron/systemd.
/// Exit code 0 on success, 1 on any fatal error (including a held lock).
#[tokio::main]
async fn main() {
    // Logger needs the logs directory to create its file
    if let Err(e) = ratewatch::paths::ensure_all_directories() {
        eprintln!("❌ Failed to create required directories: {}", e);
        std::process::exit(1);
    }

    logger::init();

    if patterns::is_help_requested() {
        print_help();
        std::process::exit(0);
    }

    let config_path = get_config_path_override();
    if let Err(e) = load_config(config_path.as_deref()) {
        logger::log_fatal(&e);
        logger::flush();
        std::process::exit(1);
    }

    let options = RunOptions::from_args();
    logger::debug(LogTag::System, &format!("Run options: {:?}", options));

    let code = match run_pipeline(options).await {
        Ok(summary) => {
            logger::info(
                LogTag::System,
                &format!(
                    "price={:.4} delivered={} pruned={}",
                    summary.price,
                    summary
                        .notify
                        .outcome
                        .as_ref()
                        .map(|o| o.is_delivered())
                        .unwrap_or(false),
                    summary.pruned
                ),
            );
            0
        }
        Err(e) => {
            logger::log_fatal(&format!("[{}] {}", e.kind(), e));
            1
        }
    };

    logger::flush();
    std::process::exit(code);
}
