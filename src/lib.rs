mod config;
mod game;
pub mod policy;

pub use config::*;
pub use game::*;

#[doc(inline)]
pub use corelib::*;

/// Runs the demo on the native window and renderer
pub fn run(config: GameConfig) -> RunReport {
    #[cfg(feature = "logs")]
    corelib::app::init_logs(config.logs.clone());

    log::info!(
        "Starting '{}' {}x{}",
        config.window.title,
        config.window.size.x,
        config.window.size.y
    );

    Game::new(WinitBackend::new(), config).run()
}
