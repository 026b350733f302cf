use cfn_vpc_template::build_template;
use cfn_vpc_template::config::Settings;
use cfn_vpc_template::logging::init_logging;
use cfn_vpc_template::output::write_document;
use colored::Colorize;
use std::fmt::Display;
use std::process::exit;

/// Report a failure that happened before logging was set up.
fn fail_early(e: impl Display) -> ! {
    eprintln!("{} {e}", "failed".on_red());
    exit(1)
}

fn main() {
    // Do as little as possible in main.rs as it can't contain any tests
    dotenv::dotenv().ok();
    let settings = Settings::from_env().unwrap_or_else(|e| fail_early(e));
    init_logging(&settings.log_config).unwrap_or_else(|e| fail_early(e));
    log::info!("#Start main()");

    let result = build_template(&settings)
        .and_then(|doc| write_document(&doc, &mut std::io::stdout().lock(), settings.pretty));
    if let Err(e) = result {
        log::error!("{} {e}", "failed".on_red());
        exit(1);
    }

    log::info!("#End main()");
}
