use log::LevelFilter;
use std::panic;
use techpal::{app::App, logging, settings::Settings};

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;

    let settings = Settings::from_env();
    let level = if settings.debug_mode {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    let log_path = logging::init(&logging::default_log_dir()?, level)?;

    // Set up panic hook
    let default_hook = panic::take_hook();
    panic::set_hook(Box::new(move |panic_info| {
        if let Some(location) = panic_info.location() {
            log::error!(
                "Panic occurred in file '{}' at line {}",
                location.file(),
                location.line(),
            );
        }
        default_hook(panic_info);
    }));

    log::info!(
        "TechPal start: {} (logging to {})",
        chrono::Local::now(),
        log_path.display()
    );

    let mut app = App::new(settings);
    app.run().await
}
