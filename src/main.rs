use genfe::app::StudioApp;
use genfe::{cli, i18n, logger};

use eframe::egui;

fn main() -> Result<(), eframe::Error> {
    // -- CLI / headless mode ---------------------------------------------
    if cli::CliArgs::is_cli_mode() {
        use clap::Parser;
        i18n::init();
        let args = cli::CliArgs::parse();
        std::process::exit(cli::run(args));
    }

    // -- GUI mode --------------------------------------------------------

    // Session log is truncated on each launch
    logger::init();
    i18n::init();

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 800.0])
            .with_title("GenFE"),
        ..Default::default()
    };

    eframe::run_native(
        "GenFE",
        options,
        Box::new(|cc| Box::new(StudioApp::new(cc))),
    )
}
