// Copyright (c) 2026 rezky_nightky

mod canvas;
mod cell;
mod color;
mod config;
mod error;
mod frame;
mod overlay;
mod palette;
mod particle;
mod preset;
mod runtime;
mod schedule;
mod scratchpad;
mod spawn;
mod stepper;
mod store;
mod surface;
mod terminal;
mod throttle;

use std::env;
use std::fs::File;
use std::path::Path;
use std::sync::Mutex;
use std::time::{Duration, Instant};

#[cfg(unix)]
use std::thread;

use clap::builder::styling::{AnsiColor as ClapAnsiColor, Color as ClapColor};
use clap::builder::styling::{Effects as ClapEffects, Style as ClapStyle};
use clap::builder::Styles as ClapStyles;
use clap::{CommandFactory, FromArgMatches};
use crossterm::event::{Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseEventKind};
use rand::{rngs::StdRng, SeedableRng};
use tracing_subscriber::EnvFilter;

#[cfg(unix)]
use signal_hook::consts::{SIGHUP, SIGINT, SIGTERM};
#[cfg(unix)]
use signal_hook::iterator::Signals;

use crate::canvas::{Canvas, CellMetrics};
use crate::color::resolve_color;
use crate::config::{
    color_enabled_stdout, default_params_usage_for_help, print_list_colors, print_list_presets,
    Args, ColorBg, DEFAULT_DEMO_TEXT,
};
use crate::error::{Error, Result};
use crate::frame::Frame;
use crate::overlay::Overlay;
use crate::palette::Palette;
use crate::particle::Rgb;
use crate::runtime::ColorMode;
use crate::schedule::FrameLoop;
use crate::scratchpad::{Edit, Scratchpad, Typist};
use crate::spawn::SpawnController;
use crate::terminal::{restore_terminal_best_effort, Terminal};

const HELP_TEMPLATE_PLAIN: &str = "\
{before-help}{about-with-newline}
USAGE:
  {usage}

{all-args}{after-help}";

const HELP_TEMPLATE_COLOR: &str = "\
{before-help}{about-with-newline}
\x1b[1;36mUSAGE:\x1b[0m
  {usage}

{all-args}{after-help}";

const STATUS_ROWS: u16 = 1;
const DEMO_KEY_INTERVAL: Duration = Duration::from_millis(90);
const STATUS_FG: Rgb = Rgb::new(200, 200, 200);

fn build_info() -> String {
    let sha = env!("BLOODRIP_GIT_SHA");
    if sha.is_empty() {
        env!("BLOODRIP_BUILD").to_string()
    } else {
        format!("{} ({})", env!("BLOODRIP_BUILD"), sha)
    }
}

fn clap_styles() -> ClapStyles {
    ClapStyles::styled()
        .header(
            ClapStyle::new()
                .effects(ClapEffects::BOLD)
                .fg_color(Some(ClapColor::Ansi(ClapAnsiColor::Cyan))),
        )
        .usage(
            ClapStyle::new()
                .effects(ClapEffects::BOLD)
                .fg_color(Some(ClapColor::Ansi(ClapAnsiColor::Red))),
        )
        .literal(ClapStyle::new().fg_color(Some(ClapColor::Ansi(ClapAnsiColor::Yellow))))
        .placeholder(ClapStyle::new().fg_color(Some(ClapColor::Ansi(ClapAnsiColor::Magenta))))
}

fn require_f64_range(name: &'static str, v: f64, min: f64, max: f64) -> Result<f64> {
    if !v.is_finite() {
        return Err(Error::NotFinite {
            name,
            value: v.to_string(),
        });
    }
    if v < min || v > max {
        return Err(Error::OutOfRange {
            name,
            value: v.to_string(),
            min: min.to_string(),
            max: max.to_string(),
        });
    }
    Ok(v)
}

fn detect_color_mode_auto() -> ColorMode {
    let colorterm = env::var("COLORTERM")
        .unwrap_or_default()
        .to_ascii_lowercase();
    if colorterm.contains("truecolor") || colorterm.contains("24bit") {
        return ColorMode::TrueColor;
    }

    let term = env::var("TERM").unwrap_or_default().to_ascii_lowercase();
    if term == "dumb" {
        return ColorMode::Mono;
    }

    ColorMode::Color256
}

fn detect_color_mode(args: &Args) -> Result<ColorMode> {
    match args.colormode {
        None => Ok(detect_color_mode_auto()),
        Some(0) => Ok(ColorMode::Mono),
        Some(16) => Ok(ColorMode::Color16),
        Some(8) | Some(256) => Ok(ColorMode::Color256),
        Some(24) | Some(32) => Ok(ColorMode::TrueColor),
        Some(m) => Err(Error::OutOfRange {
            name: "--colormode",
            value: m.to_string(),
            min: "0".to_string(),
            max: "32 (allowed: 0,16,8,256,24,32)".to_string(),
        }),
    }
}

/// Logs go to a file because the terminal itself is busy with the overlay.
fn init_logging(path: Option<&Path>) -> Result<()> {
    let Some(path) = path else {
        return Ok(());
    };
    let file = File::create(path).map_err(|source| Error::LogFile {
        path: path.to_path_buf(),
        source,
    })?;
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_ansi(false)
        .with_writer(Mutex::new(file))
        .try_init();
    Ok(())
}

fn key_to_edit(k: &KeyEvent) -> Option<Edit> {
    match (k.code, k.modifiers) {
        (KeyCode::Char('l'), KeyModifiers::CONTROL) => Some(Edit::Clear),
        (KeyCode::Char(_), m) if m.contains(KeyModifiers::CONTROL) => None,
        (KeyCode::Char(c), _) => Some(Edit::Insert(c)),
        (KeyCode::Tab, _) => Some(Edit::Insert(' ')),
        (KeyCode::Enter, _) => Some(Edit::Newline),
        (KeyCode::Backspace, _) => Some(Edit::Backspace),
        (KeyCode::Left, _) => Some(Edit::Left),
        (KeyCode::Right, _) => Some(Edit::Right),
        (KeyCode::Up, _) => Some(Edit::Up),
        (KeyCode::Down, _) => Some(Edit::Down),
        (KeyCode::Home, _) => Some(Edit::Home),
        (KeyCode::End, _) => Some(Edit::End),
        _ => None,
    }
}

fn is_quit_key(k: &KeyEvent) -> bool {
    matches!(
        (k.code, k.modifiers),
        (KeyCode::Esc, _) | (KeyCode::Char('c'), KeyModifiers::CONTROL)
    )
}

#[derive(Default)]
struct PerfStats {
    frames: u64,
    drawn_frames: u64,
    work_sum_s: f64,
    work_max_s: f64,
}

fn main() {
    std::panic::set_hook(Box::new(|info| {
        restore_terminal_best_effort();
        eprintln!("{}", info);
    }));

    #[cfg(unix)]
    {
        if let Ok(mut signals) = Signals::new([SIGINT, SIGTERM, SIGHUP]) {
            thread::spawn(move || {
                if let Some(sig) = signals.forever().next() {
                    restore_terminal_best_effort();
                    std::process::exit(128 + sig);
                }
            });
        }
    }

    #[cfg(windows)]
    {
        if let Err(e) = ctrlc::set_handler(|| {
            restore_terminal_best_effort();
            std::process::exit(130);
        }) {
            eprintln!("failed to install Ctrl-C handler: {}", e);
        }
    }

    let mut cmd = Args::command();
    cmd = cmd.styles(clap_styles());
    cmd = cmd.before_help(default_params_usage_for_help());
    let help_template = if color_enabled_stdout() {
        HELP_TEMPLATE_COLOR
    } else {
        HELP_TEMPLATE_PLAIN
    };
    cmd = cmd.help_template(help_template);
    cmd.build();

    if cmd.get_arguments().any(|a| a.get_id().as_str() == "help") {
        cmd = cmd.mut_arg("help", |a| a.help_heading("HELP"));
    }

    let matches = cmd.get_matches();
    let args = Args::from_arg_matches(&matches).unwrap_or_else(|e| e.exit());

    if let Err(e) = run(&args) {
        tracing::error!(error = %e, "bloodrip failed");
        eprintln!("{}", e);
        std::process::exit(1);
    }
}

fn run(args: &Args) -> Result<()> {
    if args.list_presets {
        print_list_presets();
        return Ok(());
    }

    if args.list_colors {
        print_list_colors();
        return Ok(());
    }

    if args.check_bitcolor {
        let colorterm = env::var("COLORTERM").unwrap_or_default();
        let term = env::var("TERM").unwrap_or_default();
        let auto = detect_color_mode_auto();
        let effective = detect_color_mode(args)?;

        println!("BITCOLOR CHECK:");
        println!(
            "  COLORTERM: {}",
            if colorterm.is_empty() {
                "(unset)"
            } else {
                &colorterm
            }
        );
        println!(
            "  TERM: {}",
            if term.is_empty() { "(unset)" } else { &term }
        );
        println!("  auto_detected: {}", auto.label());
        if args.colormode.is_some() {
            println!("  forced: {}", effective.label());
        }
        println!("  effective: {}", effective.label());
        return Ok(());
    }

    if args.version {
        println!("{} {}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"));
        return Ok(());
    }

    if args.info {
        println!("Version: v{}", env!("CARGO_PKG_VERSION"));
        println!("Build: {}", build_info());
        println!("Copyright: (c) 2026 {}", env!("CARGO_PKG_AUTHORS"));
        println!("License: {}", env!("CARGO_PKG_LICENSE"));
        println!("Source: {}", env!("CARGO_PKG_REPOSITORY"));
        return Ok(());
    }

    init_logging(args.log_file.as_deref())?;

    let color_mode = detect_color_mode(args)?;
    let target_fps = require_f64_range("--fps", args.fps, 1.0, 240.0)?;
    let end_after = match args.duration {
        Some(s) if s.is_finite() && s <= 0.0 => None,
        Some(s) => Some(Duration::from_secs_f64(require_f64_range(
            "--duration",
            s,
            0.1,
            86400.0,
        )?)),
        None => None,
    };
    let drop_color = resolve_color(&args.color)?;

    let mut cfg = args.preset.config();
    cfg.pool = !args.no_pool;

    let mt = match args.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    };

    let palette = Palette::new(
        color_mode,
        matches!(
            args.color_bg,
            ColorBg::DefaultBackground | ColorBg::Transparent
        ),
    );
    let status_fg = palette.term_color(STATUS_FG);

    tracing::info!(
        preset = args.preset.name(),
        pool = cfg.pool,
        color = %args.color,
        color_mode = color_mode.label(),
        fps = target_fps,
        "starting"
    );

    let mut term = Terminal::new(args.mouse)?;
    let (w, h) = term.size()?;
    let metrics = CellMetrics::detect(w, h);
    tracing::debug!(
        cell_w = metrics.width,
        cell_h = metrics.height,
        "cell metrics"
    );

    let start_time = Instant::now();
    let end_time = end_after.map(|d| start_time + d);

    let mut pad = Scratchpad::new(w, h, STATUS_ROWS);
    let mut frame = Frame::new(w, h, palette.bg);
    let mut typist = args.demo.then(|| {
        Typist::new(
            args.text.as_deref().unwrap_or(DEFAULT_DEMO_TEXT),
            DEMO_KEY_INTERVAL,
            start_time,
        )
    });

    let spawner = SpawnController::new(&cfg, drop_color, mt);
    let mut overlay = Overlay::new(cfg, spawner, FrameLoop::from_fps(target_fps));
    overlay.mount(Canvas::new(w, h, metrics), start_time);

    let mut running = true;
    let mut last_cursor = None;
    let mut perf = PerfStats::default();

    while running {
        if end_time.is_some_and(|end| Instant::now() >= end) {
            break;
        }
        let mut pending_resize: Option<(u16, u16)> = None;
        let mut edits: Vec<Edit> = Vec::new();

        loop {
            while Terminal::poll_event(Duration::from_millis(0))? {
                match Terminal::read_event()? {
                    Event::Resize(nw, nh) => pending_resize = Some((nw, nh)),
                    Event::Key(k) if k.kind == KeyEventKind::Press => {
                        if is_quit_key(&k) {
                            running = false;
                        } else if let Some(edit) = key_to_edit(&k) {
                            edits.push(edit);
                        }
                    }
                    Event::Mouse(me)
                        if matches!(me.kind, MouseEventKind::Moved | MouseEventKind::Drag(_)) =>
                    {
                        overlay.on_cursor_event(
                            (me.column as f32 + 0.5) * metrics.width,
                            (me.row as f32 + 0.5) * metrics.height,
                        );
                    }
                    _ => {}
                }
            }

            let now = Instant::now();
            if let Some(t) = typist.as_mut() {
                if let Some(edit) = t.poll(now, &pad) {
                    edits.push(edit);
                }
            }
            for edit in edits.drain(..) {
                if let Some(cell) = pad.apply(edit) {
                    let (x, y) = cell.origin(metrics);
                    overlay.on_cursor_event(x, y);
                }
            }

            if !running || pending_resize.is_some() || overlay.frame_due(now) {
                break;
            }

            let mut timeout = overlay
                .time_until_frame(now)
                .unwrap_or(Duration::from_millis(100));
            if let Some(t) = typist.as_ref() {
                timeout = timeout.min(t.time_until_key(now));
            }
            if let Some(end) = end_time {
                if now >= end {
                    break;
                }
                timeout = timeout.min(end - now);
            }
            let _ = Terminal::poll_event(timeout)?;
        }

        if !running {
            break;
        }

        if let Some((nw, nh)) = pending_resize {
            overlay.resize(metrics.viewport(nw, nh));
            pad.resize(nw, nh);
            frame = Frame::new(nw, nh, palette.bg);
        }

        let work_start = Instant::now();
        if !overlay.tick(work_start) {
            continue;
        }

        let status = format!(
            " bloodrip | {} | drops {:>3} | Esc quits",
            args.preset.name(),
            overlay.population()
        );
        pad.draw(&mut frame, &status, status_fg);
        if let Some(canvas) = overlay.surface() {
            for y in 0..frame.height {
                for x in 0..frame.width {
                    let Some(&base) = frame.get(x, y) else {
                        continue;
                    };
                    let painted = canvas.paint_cell(x, y, base, &palette);
                    if painted != base {
                        frame.set(x, y, painted);
                    }
                }
            }
        }

        let cursor = pad.cursor();
        let cursor_at = Some((cursor.col, cursor.row));
        let did_draw = frame.has_changes() || cursor_at != last_cursor;
        if did_draw {
            term.draw(&mut frame, cursor_at)?;
            last_cursor = cursor_at;
        }

        if args.perf_stats {
            let work_s = work_start.elapsed().as_secs_f64();
            perf.frames += 1;
            if did_draw {
                perf.drawn_frames += 1;
            }
            perf.work_sum_s += work_s;
            perf.work_max_s = perf.work_max_s.max(work_s);
        }
    }

    overlay.teardown();
    drop(term);

    if args.perf_stats {
        let elapsed_s = start_time.elapsed().as_secs_f64().max(0.000_001);
        let frames = perf.frames.max(1) as f64;

        println!("PERF STATS:");
        println!("  elapsed_s: {:.3}", elapsed_s);
        println!("  target_fps: {:.3}", target_fps);
        println!("  avg_fps: {:.3}", perf.frames as f64 / elapsed_s);
        println!("  frames: {}", perf.frames);
        println!(
            "  drawn_frames: {} ({:.1}%)",
            perf.drawn_frames,
            perf.drawn_frames as f64 / frames * 100.0
        );
        println!("  avg_work_ms: {:.3}", perf.work_sum_s / frames * 1000.0);
        println!("  max_work_ms: {:.3}", perf.work_max_s * 1000.0);
        println!("  peak_drops: {}", overlay.peak_population());
    }

    Ok(())
}
