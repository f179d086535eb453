mod app;

use app::IceqApp;
use iceq_app::api::{HttpApiClient, QuizApi};
use iceq_app::config::Config;
use iceq_app::database::{LocalStatsStore, LocalStore, StatsStore, db};
use std::sync::Arc;

fn main() -> eframe::Result<()> {
    dotenvy::dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = Config::from_env();
    log::info!("Backend at {}", config.api_url);

    let conn = match db::init_database(&config.db_path) {
        Ok(conn) => conn,
        Err(e) => {
            log::warn!(
                "Cannot open {}: {}. Data will not be kept after exit",
                config.db_path.display(),
                e
            );
            db::init_in_memory().map_err(|e| eframe::Error::AppCreation(Box::new(e)))?
        }
    };
    let store = LocalStore::new(conn);
    let stats: Arc<dyn StatsStore> = Arc::new(LocalStatsStore::new(store.clone()));
    let api: Arc<dyn QuizApi> = Arc::new(
        HttpApiClient::new(&config).map_err(|e| eframe::Error::AppCreation(Box::new(e)))?,
    );

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([960.0, 720.0])
            .with_min_inner_size([640.0, 480.0]),
        ..Default::default()
    };
    eframe::run_native(
        "ICEQ",
        options,
        Box::new(move |cc| {
            Ok(Box::new(IceqApp::new(
                &cc.egui_ctx,
                config,
                store,
                stats,
                api,
            )))
        }),
    )
}
