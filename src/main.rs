//! CloseUp entry point for native builds.
//!
//! Opens a comparison window for two images, or with `--output` renders one
//! settled frame headlessly and writes it to disk.

#[cfg(not(target_arch = "wasm32"))]
mod cli {
    use std::fmt;
    use std::path::PathBuf;
    use std::process::ExitCode;
    use std::str::FromStr;

    use clap::Parser;
    use closeup::config::{AppConfig, LogLevel};
    use closeup::geometry::Size;
    use closeup::loader::{load_pair, IMAGE_EXTENSIONS};
    use closeup::modes::ModeKind;
    use closeup::native::{self, NativeOptions};
    use closeup::snapshot::save_snapshot;
    use closeup::viewport::ViewportOptions;

    /// Pixel dimensions given as `WIDTHxHEIGHT`.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct Dimensions {
        pub width: u32,
        pub height: u32,
    }

    impl FromStr for Dimensions {
        type Err = String;

        fn from_str(s: &str) -> Result<Self, Self::Err> {
            let (w, h) = s
                .split_once(['x', 'X'])
                .ok_or_else(|| format!("expected WIDTHxHEIGHT, got '{}'", s))?;
            let width: u32 = w.trim().parse().map_err(|_| format!("invalid width '{}'", w))?;
            let height: u32 = h.trim().parse().map_err(|_| format!("invalid height '{}'", h))?;
            if width == 0 || height == 0 {
                return Err(format!("size must be non-zero, got {}x{}", width, height));
            }
            Ok(Self { width, height })
        }
    }

    impl fmt::Display for Dimensions {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "{}x{}", self.width, self.height)
        }
    }

    #[derive(Parser, Debug)]
    #[command(name = "closeup", about = "Compare two images side by side, by slider, by blend or by difference")]
    #[command(version)]
    pub struct Args {
        /// First image (A). A file dialog opens when omitted.
        pub image_a: Option<PathBuf>,

        /// Second image (B)
        pub image_b: Option<PathBuf>,

        /// Comparison mode to start in: two-up, slide, overlay or diff
        #[arg(short, long)]
        pub mode: Option<ModeKind>,

        /// Render one frame to this file instead of opening a window
        #[arg(short, long)]
        pub output: Option<PathBuf>,

        /// Window or snapshot size, e.g. 1280x800
        #[arg(long)]
        pub size: Option<Dimensions>,

        /// Configuration file (defaults to the platform config directory)
        #[arg(long)]
        pub config: Option<PathBuf>,

        /// Log level: error, warn, info, debug or trace
        #[arg(long)]
        pub log_level: Option<LogLevel>,

        /// Write the effective configuration to the config path and continue
        #[arg(long)]
        pub save_config: bool,
    }

    fn init_logging(level: LogLevel) {
        env_logger::Builder::new()
            .filter_level(level.to_level_filter())
            .parse_default_env()
            .init();
    }

    /// Ask for the two images when they were not given on the command line.
    fn pick_images() -> Option<(PathBuf, PathBuf)> {
        let files = rfd::FileDialog::new()
            .set_title("Choose two images to compare")
            .add_filter("Images", IMAGE_EXTENSIONS)
            .pick_files()?;
        match exactly_two(files) {
            Ok(pair) => Some(pair),
            Err(count) => {
                log::error!("Select exactly two images ({} selected)", count);
                None
            }
        }
    }

    /// The two paths of a two-file selection, or how many were selected.
    fn exactly_two(files: Vec<PathBuf>) -> Result<(PathBuf, PathBuf), usize> {
        let count = files.len();
        let mut files = files.into_iter();
        match (files.next(), files.next(), files.next()) {
            (Some(a), Some(b), None) => Ok((a, b)),
            _ => Err(count),
        }
    }

    /// Apply command-line overrides on top of the loaded configuration.
    fn effective_config(args: &Args) -> AppConfig {
        let mut config = AppConfig::load_or_default(args.config.as_deref());
        if let Some(level) = args.log_level {
            config.preferences.log_level = level;
        }
        if let Some(mode) = args.mode {
            config.preferences.initial_mode = mode;
        }
        if let Some(size) = args.size {
            config.preferences.window_size = [size.width, size.height];
        }
        config
    }

    pub fn main() -> ExitCode {
        let args = Args::parse();
        let config = effective_config(&args);
        init_logging(config.preferences.log_level);

        for (key, action) in config.keybindings.entries() {
            if let Some(other) = config.keybindings.key_conflict(key, Some(action)) {
                log::warn!("{} is bound to both {} and {}", key.label(), action.description(), other);
            }
        }

        if args.save_config {
            match args.config.clone().or_else(AppConfig::default_path) {
                Some(path) => {
                    if let Err(e) = config.save(&path) {
                        log::error!("Could not save configuration: {}", e);
                    }
                }
                None => log::warn!("No configuration directory available, not saving"),
            }
        }

        let (image_a, image_b) = match (args.image_a.clone(), args.image_b.clone()) {
            (Some(a), Some(b)) => (a, b),
            (Some(_), None) | (None, Some(_)) => {
                log::error!("Two images are required");
                return ExitCode::FAILURE;
            }
            (None, None) => match pick_images() {
                Some(pair) => pair,
                None => return ExitCode::FAILURE,
            },
        };

        let viewport = ViewportOptions::from_config(&config);
        let [width, height] = config.preferences.window_size;

        if let Some(output) = &args.output {
            let pair = match load_pair(&image_a, &image_b) {
                Ok(pair) => pair,
                Err(e) => {
                    log::error!("{}", e);
                    return ExitCode::FAILURE;
                }
            };
            let size = Size::from_pixels(width, height);
            return match save_snapshot(output, pair, size, viewport) {
                Ok(()) => ExitCode::SUCCESS,
                Err(e) => {
                    log::error!("{}", e);
                    ExitCode::FAILURE
                }
            };
        }

        let options = NativeOptions {
            image_a,
            image_b,
            viewport,
            window_size: [width, height],
            wheel_line_pixels: config.preferences.wheel_line_pixels,
        };
        match native::run(options) {
            Ok(()) => ExitCode::SUCCESS,
            Err(e) => {
                log::error!("Application error: {}", e);
                ExitCode::FAILURE
            }
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[test]
        fn test_dimensions_parse() {
            assert_eq!(
                "1280x800".parse::<Dimensions>(),
                Ok(Dimensions {
                    width: 1280,
                    height: 800
                })
            );
            assert_eq!("64X48".parse::<Dimensions>().map(|d| d.to_string()), Ok("64x48".to_string()));
            assert!("0x10".parse::<Dimensions>().is_err());
            assert!("1280".parse::<Dimensions>().is_err());
            assert!("wide x tall".parse::<Dimensions>().is_err());
        }

        #[test]
        fn test_args_parse_overrides() {
            let args = Args::try_parse_from([
                "closeup", "a.png", "b.png", "--mode", "overlay", "--size", "300x200",
            ])
            .unwrap();
            assert_eq!(args.mode, Some(ModeKind::Overlay));
            assert_eq!(
                args.size,
                Some(Dimensions {
                    width: 300,
                    height: 200
                })
            );
            assert!(args.output.is_none());
        }

        #[test]
        fn test_picker_selection_must_be_two_files() {
            let paths = |n: usize| (0..n).map(|i| PathBuf::from(format!("{}.png", i))).collect::<Vec<_>>();
            assert_eq!(
                exactly_two(paths(2)),
                Ok((PathBuf::from("0.png"), PathBuf::from("1.png")))
            );
            assert_eq!(exactly_two(paths(1)), Err(1));
            assert_eq!(exactly_two(paths(3)), Err(3));
            assert_eq!(exactly_two(Vec::new()), Err(0));
        }

        #[test]
        fn test_args_reject_unknown_mode() {
            assert!(Args::try_parse_from(["closeup", "a.png", "b.png", "--mode", "onion"]).is_err());
        }
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() -> std::process::ExitCode {
    cli::main()
}

#[cfg(target_arch = "wasm32")]
fn main() {}
