use rustc_hash::FxHashMap;
use std::path::PathBuf;

/// Configure the logs output
/// Logs show a UTC timestamp with format `[year]-[month]-[day] [hour]:[minutes]:[seconds]`.
/// Errors go to stderr, everything else to stdout.
#[derive(Clone, Debug)]
pub struct LogConfig {
    level: log::LevelFilter,
    levels_for: FxHashMap<String, log::LevelFilter>,
    colored: bool,
    verbose: bool,
    file_path: Option<PathBuf>,
}

impl Default for LogConfig {
    fn default() -> Self {
        let level = if cfg!(debug_assertions) {
            log::LevelFilter::Debug
        } else {
            log::LevelFilter::Warn
        };

        Self {
            level,
            levels_for: Default::default(),
            colored: cfg!(debug_assertions),
            verbose: false,
            file_path: None,
        }
    }
}

impl LogConfig {
    /// Creates a new configuration using the given level filter
    pub fn new(level: log::LevelFilter) -> Self {
        Self {
            level,
            ..Default::default()
        }
    }

    pub fn trace() -> Self {
        Self::new(log::LevelFilter::Trace)
    }

    pub fn debug() -> Self {
        Self::new(log::LevelFilter::Debug)
    }

    pub fn info() -> Self {
        Self::new(log::LevelFilter::Info)
    }

    pub fn warn() -> Self {
        Self::new(log::LevelFilter::Warn)
    }

    pub fn error() -> Self {
        Self::new(log::LevelFilter::Error)
    }

    /// Changes the level filter
    pub fn level(mut self, level: log::LevelFilter) -> Self {
        self.level = level;
        self
    }

    /// Change the filter level for one dependency
    pub fn level_for(mut self, id: &str, level: log::LevelFilter) -> Self {
        self.levels_for.insert(id.to_string(), level);
        self
    }

    /// Enable colored text (Defaults to true on debug mode)
    pub fn use_colors(mut self, value: bool) -> Self {
        self.colored = value;
        self
    }

    /// Log everything including wgpu and winit internals
    pub fn verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// Save logs to a file instead of the terminal
    pub fn to_file<P>(mut self, path: P) -> Self
    where
        P: Into<PathBuf>,
    {
        self.file_path = Some(path.into());
        self
    }

    /// Level used for `target` once the noisy dependencies are capped
    pub fn level_of(&self, target: &str) -> log::LevelFilter {
        self.levels_for
            .iter()
            .filter(|(id, _)| target.starts_with(id.as_str()))
            .max_by_key(|(id, _)| id.len())
            .map_or(self.level, |(_, lvl)| *lvl)
    }

    fn cap_dependencies(&mut self) {
        if self.verbose {
            return;
        }

        ["wgpu_core", "wgpu_hal", "naga", "winit"]
            .iter()
            .for_each(|id| {
                self.levels_for
                    .entry(id.to_string())
                    .or_insert(log::LevelFilter::Warn);
            });
    }
}

fn get_time() -> String {
    let format =
        time::macros::format_description!("[year]-[month]-[day] [hour]:[minute]:[second]");
    time::OffsetDateTime::now_utc()
        .format(&format)
        .unwrap_or_else(|_| "????-??-?? ??:??:??".to_string())
}

fn print_apply_error(e: &str) {
    eprintln!("Error initializing logs: {e}");
}

fn set_panic_hook() {
    use std::panic::{self, PanicHookInfo};

    let default_hook = panic::take_hook();
    panic::set_hook(Box::new(move |info: &PanicHookInfo| {
        panic_to_log_error_hook(info);
        default_hook(info);
    }));
}

fn panic_to_log_error_hook(info: &std::panic::PanicHookInfo) {
    let payload = if let Some(payload) = info.payload().downcast_ref::<&str>() {
        payload
    } else if let Some(payload) = info.payload().downcast_ref::<String>() {
        payload.as_str()
    } else {
        "Unknown"
    };

    match info.location() {
        Some(location) => log::error!(
            "Panic at '{}:{}': {payload}",
            location.file(),
            location.line()
        ),
        None => log::error!("Panic: {payload}"),
    }
}

fn chain_terminal(dispatch: fern::Dispatch) -> fern::Dispatch {
    let errors = fern::Dispatch::new()
        .filter(|meta| meta.level() == log::Level::Error)
        .chain(std::io::stderr());

    let rest = fern::Dispatch::new()
        .filter(|meta| meta.level() != log::Level::Error)
        .chain(std::io::stdout());

    dispatch.chain(errors).chain(rest)
}

fn chain_file(dispatch: fern::Dispatch, path: &PathBuf) -> fern::Dispatch {
    use std::io::Write;
    use std::sync::mpsc::channel;

    let file = std::fs::OpenOptions::new()
        .append(true)
        .create(true)
        .open(path);

    let mut file = match file {
        Ok(file) => file,
        Err(e) => {
            print_apply_error(&format!("'{}': {e}", path.display()));
            return chain_terminal(dispatch);
        }
    };

    // writing happens on its own thread so the frame loop never waits on the disk
    let (tx, rx) = channel::<String>();
    std::thread::spawn(move || {
        for ln in rx {
            if let Err(e) = write!(file, "{ln}") {
                eprintln!("Log write line error: {e}")
            }
        }
    });

    dispatch.chain(tx)
}

/// Installs the global logger and a panic hook that logs the panic.
/// Calling it twice keeps the first logger.
pub fn init_logs(mut config: LogConfig) {
    set_panic_hook();
    config.cap_dependencies();

    let mut dispatch = fern::Dispatch::new().level(config.level);
    for (id, lvl) in config.levels_for.iter() {
        dispatch = dispatch.level_for(id.clone(), *lvl);
    }

    let use_colors = config.file_path.is_none() && config.colored;
    if use_colors {
        use fern::colors::{Color, ColoredLevelConfig};

        let color_level = ColoredLevelConfig::new()
            .error(Color::BrightRed)
            .warn(Color::BrightYellow)
            .info(Color::BrightGreen)
            .debug(Color::BrightCyan)
            .trace(Color::BrightBlack);

        dispatch = dispatch.format(move |out, message, record| {
            out.finish(format_args!(
                "\x1b[0m{date} [{target}] {level}: {message}",
                date = get_time(),
                target = record.target(),
                level = format_args!(
                    "{}\x1b[{}m",
                    color_level.color(record.level()),
                    Color::White.to_fg_str()
                ),
                message = message,
            ))
        });
    } else {
        dispatch = dispatch.format(move |out, message, record| {
            out.finish(format_args!(
                "{date} [{target}] {level}: {message}",
                date = get_time(),
                target = record.target(),
                level = record.level(),
                message = message,
            ))
        });
    }

    dispatch = match &config.file_path {
        Some(path) => chain_file(dispatch, path),
        None => chain_terminal(dispatch),
    };

    if let Err(e) = dispatch.apply() {
        print_apply_error(&e.to_string());
    }
}
