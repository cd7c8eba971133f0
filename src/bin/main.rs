use anyhow::{Context as _, Result};
use std::os::raw::c_int;
use std::path::PathBuf;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use x11::xlib;
use xlisten::prelude::*;

/// Prints window lifecycle events and how long each took to handle. Map and
/// configure requests are granted unchanged so clients keep working while
/// the redirect right is held.
struct Watcher;

impl EventListener for Watcher {
    type Display = XlibDisplay;

    handlers! {
        fn on_map_notify(&mut self, cx: &Context<XlibDisplay>, event: &xlib::XMapEvent) {
            println!("Mapped    : 0x{:x}", event.window);
            info!("on_map_notify took {}ms to process", cx.time());
        }

        fn on_destroy_notify(&mut self, cx: &Context<XlibDisplay>, event: &xlib::XDestroyWindowEvent) {
            println!("Destroyed : 0x{:x}", event.window);
            info!("on_destroy_notify took {}ms to process", cx.time());
        }

        fn on_reparent_notify(&mut self, cx: &Context<XlibDisplay>, event: &xlib::XReparentEvent) {
            println!("Reparented: 0x{:x} to 0x{:x}", event.window, event.parent);
            info!("on_reparent_notify took {}ms to process", cx.time());
        }

        fn on_map_request(&mut self, cx: &Context<XlibDisplay>, event: &xlib::XMapRequestEvent) {
            unsafe { xlib::XMapWindow(cx.display().raw(), event.window) };
        }

        fn on_configure_request(
            &mut self,
            cx: &Context<XlibDisplay>,
            event: &xlib::XConfigureRequestEvent,
        ) {
            let mut changes = xlib::XWindowChanges {
                x: event.x,
                y: event.y,
                width: event.width,
                height: event.height,
                border_width: event.border_width,
                sibling: event.above,
                stack_mode: event.detail,
            };
            unsafe {
                xlib::XConfigureWindow(
                    cx.display().raw(),
                    event.window,
                    event.value_mask as u32,
                    &mut changes,
                );
            }
        }
    }

    fn on_error(&mut self, _cx: &Context<XlibDisplay>, error: &ProtocolError) -> c_int {
        error!("X Error: {}", error);
        0
    }

    fn pre_loop(&mut self, cx: &Context<XlibDisplay>) {
        info!(
            "watching root window 0x{:x} with mask {:?}",
            cx.root(),
            cx.event_mask()
        );
    }
}

struct Options {
    config_path: Option<PathBuf>,
    display: Option<String>,
    watch: bool,
    debug: bool,
}

fn main() -> Result<()> {
    let args: Vec<String> = std::env::args().collect();

    let mut options = Options {
        config_path: None,
        display: None,
        watch: false,
        debug: false,
    };

    let mut remaining = args.iter().skip(1);
    while let Some(arg) = remaining.next() {
        match arg.as_str() {
            "--version" => {
                println!("xlisten {}", env!("CARGO_PKG_VERSION"));
                return Ok(());
            }
            "--help" => {
                print_help();
                return Ok(());
            }
            "--init" => {
                init_config()?;
                return Ok(());
            }
            "--config" => {
                let Some(path) = remaining.next() else {
                    eprintln!("Error: --config requires a path argument");
                    std::process::exit(1);
                };
                options.config_path = Some(PathBuf::from(path));
            }
            "--display" => {
                let Some(name) = remaining.next() else {
                    eprintln!("Error: --display requires a display name");
                    std::process::exit(1);
                };
                options.display = Some(name.clone());
            }
            "--watch" => options.watch = true,
            "--debug" => options.debug = true,
            other => {
                eprintln!("Error: unknown option '{}'", other);
                print_help();
                std::process::exit(1);
            }
        }
    }

    let mut config = load_config(options.config_path)?;
    if options.watch {
        config.event_mask = EventMask::SUBSTRUCTURE_NOTIFY;
    }
    config.debug |= options.debug;

    init_logging(config.debug);

    let display = XlibDisplay::open(options.display.as_deref())?;
    let mut event_loop = EventLoop::new(display, Watcher, &config)?;

    let stop = event_loop.stop_handle();
    ctrlc::set_handler(move || stop.stop()).context("Failed to install signal handler")?;

    if !event_loop.run()? {
        std::process::exit(1);
    }

    Ok(())
}

fn init_logging(debug: bool) {
    let default_filter = if debug { "xlisten=debug,info" } else { "info" };
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| default_filter.into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();
}

fn load_config(custom_path: Option<PathBuf>) -> Result<Config> {
    let config_path = match custom_path {
        Some(path) => path,
        None => match xlisten::config::default_config_path() {
            Some(path) if path.exists() => path,
            _ => return Ok(Config::default()),
        },
    };

    let config_str = std::fs::read_to_string(&config_path)
        .with_context(|| format!("Failed to read config file {:?}", config_path))?;

    xlisten::config::parse_config(&config_str)
        .with_context(|| format!("Failed to parse config file {:?}", config_path))
}

fn init_config() -> Result<()> {
    let config_path = xlisten::config::default_config_path()
        .context("Could not find config directory")?;
    if let Some(config_dir) = config_path.parent() {
        std::fs::create_dir_all(config_dir)?;
    }

    let config_template = include_str!("../../templates/config.ron");
    std::fs::write(&config_path, config_template)?;

    println!("✓ Config created at {:?}", config_path);

    Ok(())
}

fn print_help() {
    println!("xlisten - watch and route X11 window manager events\n");
    println!("USAGE:");
    println!("    xlisten [OPTIONS]\n");
    println!("OPTIONS:");
    println!("    --init              Create default config in ~/.config/xlisten/config.ron");
    println!("    --config <PATH>     Use custom config file");
    println!("    --display <NAME>    Connect to NAME instead of $DISPLAY");
    println!("    --watch             Only watch; do not claim the window manager role");
    println!("    --debug             Log every dispatched event");
    println!("    --version           Print version information");
    println!("    --help              Print this help message\n");
    println!("Exits with status 1 if another window manager is already running.");
    println!("Ctrl-C stops the loop once the next event arrives.");
}
