use gfxdemo::GameConfig;

fn main() {
    let report = gfxdemo::run(GameConfig::default());
    log::debug!("{report:?}");
}
