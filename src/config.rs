// Copyright (c) 2026 rezky_nightky

use std::io::IsTerminal;
use std::path::PathBuf;

use clap::Parser;

use crate::color::named_colors;
use crate::preset::Preset;

pub const DEFAULT_PARAMS_USAGE: &str = "DEFAULT PARAMS USAGE:\n  bloodrip --preset drip --color red --color-bg black --fps 60";

pub const DEFAULT_DEMO_TEXT: &str = "it was a dark and stormy night; the cursor bled on every key. ";

pub fn color_enabled_stdout() -> bool {
    if std::env::var_os("NO_COLOR").is_some() {
        return false;
    }
    if matches!(std::env::var("CLICOLOR").ok().as_deref(), Some("0")) {
        return false;
    }
    std::io::stdout().is_terminal()
}

fn colorize_heading(line: &str) -> String {
    if color_enabled_stdout() {
        format!("\x1b[1;36m{}\x1b[0m", line)
    } else {
        line.to_string()
    }
}

pub fn default_params_usage_for_help() -> String {
    let mut out = String::new();
    for (i, line) in DEFAULT_PARAMS_USAGE.lines().enumerate() {
        if i > 0 {
            out.push('\n');
        }
        if i == 0 {
            out.push_str(&colorize_heading(line));
        } else {
            out.push_str(line);
        }
    }
    out
}

#[derive(clap::ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorBg {
    #[value(name = "black")]
    Black,
    #[value(name = "default-background")]
    DefaultBackground,
    #[value(name = "transparent")]
    Transparent,
}

#[derive(Parser, Debug, Clone)]
#[command(name = "bloodrip", version, disable_version_flag = true)]
pub struct Args {
    #[arg(
        short = 'p',
        long = "preset",
        default_value_t = Preset::Drip,
        value_enum,
        help_heading = "GENERAL",
        help = "Effect preset (see --list-presets)"
    )]
    pub preset: Preset,

    #[arg(
        long = "no-pool",
        help_heading = "GENERAL",
        help = "Drops fade while falling instead of pooling at the bottom"
    )]
    pub no_pool: bool,

    #[arg(
        short = 'D',
        long = "demo",
        help_heading = "GENERAL",
        help = "Type a phrase automatically so the effect runs hands-free"
    )]
    pub demo: bool,

    #[arg(
        short = 't',
        long = "text",
        help_heading = "GENERAL",
        help = "Phrase typed in demo mode"
    )]
    pub text: Option<String>,

    #[arg(
        short = 'm',
        long = "mouse",
        help_heading = "GENERAL",
        help = "Also bleed from the mouse pointer"
    )]
    pub mouse: bool,

    #[arg(
        long = "duration",
        help_heading = "GENERAL",
        help = "Stop after N seconds (min 0.1 max 86400; <=0 disables)"
    )]
    pub duration: Option<f64>,

    #[arg(
        long = "seed",
        help_heading = "GENERAL",
        help = "Seed the random generator for a repeatable run"
    )]
    pub seed: Option<u64>,

    #[arg(
        short = 'c',
        long = "color",
        default_value = "red",
        help_heading = "APPEARANCE",
        help = "Drop color: CSS name or #rgb/#rrggbb (see --list-colors)"
    )]
    pub color: String,

    #[arg(
        long = "color-bg",
        default_value_t = ColorBg::Black,
        value_enum,
        help_heading = "APPEARANCE",
        help = "Background mode (black, default-background, transparent)"
    )]
    pub color_bg: ColorBg,

    #[arg(
        long = "colormode",
        help_heading = "APPEARANCE",
        help = "Force color mode (allowed: 0,16,8/256,24/32). Default: 24-bit if supported (COLORTERM), else 8-bit"
    )]
    pub colormode: Option<u16>,

    #[arg(
        short = 'f',
        long = "fps",
        default_value_t = 60.0,
        help_heading = "PERFORMANCE",
        help = "Target FPS (min 1 max 240)"
    )]
    pub fps: f64,

    #[arg(
        long = "perf-stats",
        help_heading = "PERFORMANCE",
        help = "Print performance statistics summary on exit"
    )]
    pub perf_stats: bool,

    #[arg(
        long = "log-file",
        help_heading = "LOGGING",
        help = "Write logs to this file (filter with RUST_LOG, default info)"
    )]
    pub log_file: Option<PathBuf>,

    #[arg(
        long = "check-bitcolor",
        help_heading = "HELP",
        help = "Print detected terminal color capability and exit"
    )]
    pub check_bitcolor: bool,

    #[arg(
        long = "list-presets",
        help_heading = "HELP",
        help = "List effect presets and exit"
    )]
    pub list_presets: bool,

    #[arg(
        long = "list-colors",
        help_heading = "HELP",
        help = "List accepted color names and exit"
    )]
    pub list_colors: bool,

    #[arg(
        long = "info",
        short = 'i',
        help_heading = "HELP",
        help = "Print version info and exit"
    )]
    pub info: bool,

    #[arg(
        long = "version",
        short = 'v',
        help_heading = "HELP",
        help = "Print version and exit"
    )]
    pub version: bool,
}

pub fn print_list_presets() {
    println!("{}", colorize_heading("AVAILABLE PRESETS:"));
    println!();
    println!("VALUE    MAX  POOL DECAY  BIG DROP  BLEED CHANCE");
    for preset in Preset::ALL {
        let cfg = preset.config();
        println!(
            "{:<8} {:<4} {:<11} {:<9} {}",
            preset.name(),
            cfg.max_particles,
            cfg.pool_decay,
            if cfg.big_drop_size.is_some() { "yes" } else { "no" },
            cfg.spawn_chance
                .map(|c| format!("{:.0}%", c * 100.0))
                .unwrap_or_else(|| "every move".to_string()),
        );
    }
}

pub fn print_list_colors() {
    println!("{}", colorize_heading("ACCEPTED COLOR NAMES:"));
    println!("Any CSS color name, or a hex literal such as #b00 or #8b0000.");
    println!();
    let names: Vec<&str> = named_colors().map(|(n, _)| n).collect();
    for row in names.chunks(4) {
        let line: Vec<String> = row.iter().map(|n| format!("{:<22}", n)).collect();
        println!("{}", line.join("").trim_end());
    }
}
