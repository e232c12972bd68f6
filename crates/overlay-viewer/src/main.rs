use clap::Parser;
use eframe::egui;
use overlay_viewer::app::OverlayViewerApp;
use overlay_viewer::loader::{DocumentKey, LoaderConfig};
use overlay_viewer::widget::OverlayViewerWidget;
use simplelog::{ColorChoice, Config, LevelFilter, TermLogger, TerminalMode};

#[derive(Parser)]
#[command(
    name = "overlay-viewer",
    about = "Document overlay viewer for review evidence"
)]
struct Args {
    /// Portal API base URL, e.g. https://portal.example/api
    #[arg(long)]
    base_url: String,

    /// Bearer token for the portal API.
    #[arg(long)]
    token: String,

    #[arg(long)]
    review_id: String,

    #[arg(long)]
    citation_id: String,

    #[arg(short, long)]
    verbose: bool,
}

fn main() -> eframe::Result<()> {
    let args = Args::parse();

    let level = if args.verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    TermLogger::init(
        level,
        Config::default(),
        TerminalMode::Mixed,
        ColorChoice::Auto,
    )
    .expect("logger init");

    let options = eframe::NativeOptions {
        vsync: true,
        renderer: eframe::Renderer::Glow,
        viewport: egui::ViewportBuilder::default()
            .with_maximized(true)
            .with_title("Document Overlay Viewer"),
        ..Default::default()
    };

    eframe::run_native(
        "Document Overlay Viewer",
        options,
        Box::new(move |_cc| {
            let mut widget = OverlayViewerWidget::new(LoaderConfig {
                base_url: args.base_url,
                auth_token: args.token,
            });
            widget.open(DocumentKey {
                review_id: args.review_id,
                citation_id: args.citation_id,
            });
            Ok(Box::new(OverlayViewerApp::new(widget)))
        }),
    )
}
