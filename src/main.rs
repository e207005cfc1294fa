use stockflow::app::App;
use stockflow::config::{ensure_webview_data_dir, project_dirs, AppConfig};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = match AppConfig::load() {
        Ok(config) => config,
        Err(err) => {
            error!("failed to load configuration: {err:#}");
            std::process::exit(1);
        }
    };
    info!(
        db_path = %config.db_path.display(),
        items_per_page = config.items_per_page,
        "starting stockflow"
    );

    let mut desktop = dioxus::desktop::Config::new()
        .with_window(dioxus::desktop::WindowBuilder::new().with_title("StockFlow"));
    match project_dirs().and_then(|dirs| ensure_webview_data_dir(dirs.data_local_dir())) {
        Ok(dir) => desktop = desktop.with_data_directory(dir),
        Err(err) => warn!("using default webview data directory: {err:#}"),
    }

    dioxus::LaunchBuilder::desktop()
        .with_cfg(desktop)
        .with_context(config)
        .launch(App);
}
