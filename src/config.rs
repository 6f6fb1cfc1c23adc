/// External configuration loader.
///
/// Reads `config.toml` from the executable's directory, the CWD, or
/// `~/.config/scramble-memory/`. Missing file or missing keys fall back to
/// defaults. Problems are returned as warnings rather than printed, because
/// the logger is not up yet when the config is read.
///
/// ```toml
/// [timing]
/// memorize_secs_per_item = 1.0   # 0..=60
/// scramble_delay_ms = 700        # at most 10000
/// frame_ms = 33
///
/// [layout]
/// padding = 1
/// gap = 2
/// max_tries = 200
/// item_width = 7
/// item_height = 3
///
/// [general]
/// default_count = 5
/// seed = 42            # optional, fixes the shuffle
/// log_file = "scramble-memory.log"
/// log_level = "info"
///
/// [gamepad]
/// confirm = ["A"]
/// cancel = ["Select"]
/// go = ["Start"]
/// ```

use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

use crate::domain::geometry::Size;
use crate::domain::layout::{LayoutSettings, MAX_PLACEMENT_TRIES};
use crate::sim::round::{MAX_ITEMS, MIN_ITEMS};
use crate::sim::session::SessionTiming;

// ── Public Config Struct ──

#[derive(Clone, Debug)]
pub struct GameConfig {
    pub timing: TimingConfig,
    pub layout: LayoutConfig,
    pub general: GeneralConfig,
    pub gamepad: GamepadConfig,
}

#[derive(Clone, Debug)]
pub struct TimingConfig {
    pub memorize_secs_per_item: f64,
    pub scramble_delay_ms: u64,
    pub frame_ms: u64,
}

#[derive(Clone, Debug)]
pub struct LayoutConfig {
    pub padding: i32,
    pub gap: i32,
    pub max_tries: u32,
    pub item_width: i32,
    pub item_height: i32,
}

#[derive(Clone, Debug)]
pub struct GeneralConfig {
    pub default_count: usize,
    pub seed: Option<u64>,
    /// Empty disables logging.
    pub log_file: String,
    pub log_level: String,
}

#[derive(Clone, Debug)]
pub struct GamepadConfig {
    pub confirm: Vec<String>,
    pub cancel: Vec<String>,
    pub go: Vec<String>,
}

// ── TOML Schema (with serde defaults) ──

#[derive(Deserialize, Debug, Default)]
struct TomlConfig {
    #[serde(default)]
    timing: TomlTiming,
    #[serde(default)]
    layout: TomlLayout,
    #[serde(default)]
    general: TomlGeneral,
    #[serde(default)]
    gamepad: TomlGamepad,
}

#[derive(Deserialize, Debug)]
struct TomlTiming {
    #[serde(default = "default_memorize_secs")]
    memorize_secs_per_item: f64,
    #[serde(default = "default_scramble_delay")]
    scramble_delay_ms: u64,
    #[serde(default = "default_frame_ms")]
    frame_ms: u64,
}

#[derive(Deserialize, Debug)]
struct TomlLayout {
    #[serde(default = "default_padding")]
    padding: i32,
    #[serde(default = "default_gap")]
    gap: i32,
    #[serde(default = "default_max_tries")]
    max_tries: u32,
    #[serde(default = "default_item_width")]
    item_width: i32,
    #[serde(default = "default_item_height")]
    item_height: i32,
}

#[derive(Deserialize, Debug)]
struct TomlGeneral {
    #[serde(default = "default_count")]
    default_count: usize,
    #[serde(default)]
    seed: Option<u64>,
    #[serde(default = "default_log_file")]
    log_file: String,
    #[serde(default = "default_log_level")]
    log_level: String,
}

#[derive(Deserialize, Debug)]
struct TomlGamepad {
    #[serde(default = "default_confirm")]
    confirm: Vec<String>,
    #[serde(default = "default_cancel")]
    cancel: Vec<String>,
    #[serde(default = "default_go")]
    go: Vec<String>,
}

// ── Defaults ──

fn default_memorize_secs() -> f64 { 1.0 }
fn default_scramble_delay() -> u64 { 700 }

const MAX_MEMORIZE_SECS: f64 = 60.0;
const MAX_SCRAMBLE_DELAY_MS: u64 = 10_000;
fn default_frame_ms() -> u64 { 33 }
fn default_padding() -> i32 { 1 }
fn default_gap() -> i32 { 2 }
fn default_max_tries() -> u32 { MAX_PLACEMENT_TRIES }
fn default_item_width() -> i32 { 7 }
fn default_item_height() -> i32 { 3 }
fn default_count() -> usize { 5 }
fn default_log_file() -> String { "scramble-memory.log".into() }
fn default_log_level() -> String { "info".into() }
fn default_confirm() -> Vec<String> { vec!["A".into()] }
fn default_cancel() -> Vec<String> { vec!["Select".into()] }
fn default_go() -> Vec<String> { vec!["Start".into()] }

impl Default for TomlTiming {
    fn default() -> Self {
        TomlTiming {
            memorize_secs_per_item: default_memorize_secs(),
            scramble_delay_ms: default_scramble_delay(),
            frame_ms: default_frame_ms(),
        }
    }
}

impl Default for TomlLayout {
    fn default() -> Self {
        TomlLayout {
            padding: default_padding(),
            gap: default_gap(),
            max_tries: default_max_tries(),
            item_width: default_item_width(),
            item_height: default_item_height(),
        }
    }
}

impl Default for TomlGeneral {
    fn default() -> Self {
        TomlGeneral {
            default_count: default_count(),
            seed: None,
            log_file: default_log_file(),
            log_level: default_log_level(),
        }
    }
}

impl Default for TomlGamepad {
    fn default() -> Self {
        TomlGamepad {
            confirm: default_confirm(),
            cancel: default_cancel(),
            go: default_go(),
        }
    }
}

impl Default for GameConfig {
    fn default() -> Self {
        GameConfig::from_toml(TomlConfig::default(), &mut Vec::new())
    }
}

// ── Loading ──

impl GameConfig {
    /// Load config from `config.toml`, returning it with any warnings.
    pub fn load() -> (Self, Vec<String>) {
        let mut warnings = Vec::new();
        let toml_cfg = load_toml(&candidate_dirs(), &mut warnings);
        let cfg = GameConfig::from_toml(toml_cfg, &mut warnings);
        (cfg, warnings)
    }

    /// Parse config text. A parse error falls back to all defaults.
    pub fn from_toml_str(text: &str) -> (Self, Vec<String>) {
        let mut warnings = Vec::new();
        let toml_cfg = match toml::from_str::<TomlConfig>(text) {
            Ok(cfg) => cfg,
            Err(e) => {
                warnings.push(format!("config parse error, using defaults: {e}"));
                TomlConfig::default()
            }
        };
        let cfg = GameConfig::from_toml(toml_cfg, &mut warnings);
        (cfg, warnings)
    }

    /// Clamp out-of-range values back to something playable.
    fn from_toml(t: TomlConfig, warnings: &mut Vec<String>) -> Self {
        let mut timing = t.timing;
        if !(0.0..=MAX_MEMORIZE_SECS).contains(&timing.memorize_secs_per_item) {
            warnings.push(format!(
                "timing.memorize_secs_per_item = {} is invalid, using {}",
                timing.memorize_secs_per_item,
                default_memorize_secs()
            ));
            timing.memorize_secs_per_item = default_memorize_secs();
        }
        if timing.scramble_delay_ms > MAX_SCRAMBLE_DELAY_MS {
            warnings.push(format!(
                "timing.scramble_delay_ms = {} exceeds {MAX_SCRAMBLE_DELAY_MS}, using {}",
                timing.scramble_delay_ms,
                default_scramble_delay()
            ));
            timing.scramble_delay_ms = default_scramble_delay();
        }
        if timing.frame_ms == 0 {
            warnings.push("timing.frame_ms must be positive, using default".into());
            timing.frame_ms = default_frame_ms();
        }

        let mut layout = t.layout;
        if layout.padding < 0 || layout.gap < 0 {
            warnings.push("layout.padding and layout.gap must not be negative, using defaults".into());
            layout.padding = default_padding();
            layout.gap = default_gap();
        }
        if layout.item_width < 1 || layout.item_height < 1 {
            warnings.push("layout item size must be at least 1x1, using defaults".into());
            layout.item_width = default_item_width();
            layout.item_height = default_item_height();
        }

        let mut general = t.general;
        if !(MIN_ITEMS..=MAX_ITEMS).contains(&general.default_count) {
            warnings.push(format!(
                "general.default_count = {} is outside {MIN_ITEMS}..={MAX_ITEMS}, using {}",
                general.default_count,
                default_count()
            ));
            general.default_count = default_count();
        }

        GameConfig {
            timing: TimingConfig {
                memorize_secs_per_item: timing.memorize_secs_per_item,
                scramble_delay_ms: timing.scramble_delay_ms,
                frame_ms: timing.frame_ms,
            },
            layout: LayoutConfig {
                padding: layout.padding,
                gap: layout.gap,
                max_tries: layout.max_tries,
                item_width: layout.item_width,
                item_height: layout.item_height,
            },
            general: GeneralConfig {
                default_count: general.default_count,
                seed: general.seed,
                log_file: general.log_file,
                log_level: general.log_level,
            },
            gamepad: GamepadConfig {
                confirm: t.gamepad.confirm,
                cancel: t.gamepad.cancel,
                go: t.gamepad.go,
            },
        }
    }

    pub fn layout_settings(&self) -> LayoutSettings {
        LayoutSettings {
            max_tries: self.layout.max_tries,
            ..LayoutSettings::new(self.layout.padding, self.layout.gap)
        }
    }

    pub fn session_timing(&self) -> SessionTiming {
        SessionTiming {
            memorize_per_item: Duration::from_secs_f64(self.timing.memorize_secs_per_item),
            scramble_delay: Duration::from_millis(self.timing.scramble_delay_ms),
        }
    }

    pub fn item_size(&self) -> Size {
        Size::new(self.layout.item_width, self.layout.item_height)
    }

    pub fn frame_duration(&self) -> Duration {
        Duration::from_millis(self.timing.frame_ms)
    }
}

/// Candidate directories to search: exe dir, CWD, then the user config dir.
fn candidate_dirs() -> Vec<PathBuf> {
    let mut dirs = vec![];

    if let Ok(exe) = std::env::current_exe() {
        let resolved = exe.canonicalize().unwrap_or(exe);
        if let Some(parent) = resolved.parent() {
            dirs.push(parent.to_path_buf());
        }
    }

    if let Ok(cwd) = std::env::current_dir() {
        if !dirs.iter().any(|d| d == &cwd) {
            dirs.push(cwd);
        }
    }

    if let Ok(home) = std::env::var("HOME") {
        let user = PathBuf::from(&home).join(".config/scramble-memory");
        if user.is_dir() && !dirs.iter().any(|d| d == &user) {
            dirs.push(user);
        }
    }

    if dirs.is_empty() {
        dirs.push(PathBuf::from("."));
    }

    dirs
}

/// First readable config.toml wins.
fn load_toml(search_dirs: &[PathBuf], warnings: &mut Vec<String>) -> TomlConfig {
    for dir in search_dirs {
        let path = dir.join("config.toml");
        if !path.exists() {
            continue;
        }
        match std::fs::read_to_string(&path) {
            Ok(text) => match toml::from_str::<TomlConfig>(&text) {
                Ok(cfg) => return cfg,
                Err(e) => {
                    warnings.push(format!("{} parse error, using defaults: {e}", path.display()));
                    return TomlConfig::default();
                }
            },
            Err(e) => warnings.push(format!("could not read {}: {e}", path.display())),
        }
    }
    TomlConfig::default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_gives_defaults() {
        let (cfg, warnings) = GameConfig::from_toml_str("");
        assert!(warnings.is_empty());
        assert_eq!(cfg.layout_settings(), LayoutSettings::new(1, 2));
        assert_eq!(cfg.session_timing(), SessionTiming::default());
        assert_eq!(cfg.item_size(), Size::new(7, 3));
        assert_eq!(cfg.general.default_count, 5);
        assert_eq!(cfg.general.seed, None);
        assert_eq!(cfg.gamepad.go, vec!["Start".to_string()]);
    }

    #[test]
    fn partial_sections_keep_other_defaults() {
        let text = r#"
            [timing]
            scramble_delay_ms = 250

            [general]
            seed = 7
        "#;
        let (cfg, warnings) = GameConfig::from_toml_str(text);
        assert!(warnings.is_empty());
        assert_eq!(cfg.session_timing().scramble_delay, Duration::from_millis(250));
        assert_eq!(cfg.session_timing().memorize_per_item, Duration::from_secs(1));
        assert_eq!(cfg.general.seed, Some(7));
        assert_eq!(cfg.layout.gap, 2);
    }

    #[test]
    fn parse_error_falls_back_with_warning() {
        let (cfg, warnings) = GameConfig::from_toml_str("[timing\nframe_ms = ");
        assert_eq!(warnings.len(), 1);
        assert_eq!(cfg.timing.frame_ms, 33);
    }

    #[test]
    fn out_of_range_values_are_replaced() {
        let text = r#"
            [timing]
            memorize_secs_per_item = -2.0
            frame_ms = 0

            [layout]
            padding = -1
            item_width = 0

            [general]
            default_count = 12
        "#;
        let (cfg, warnings) = GameConfig::from_toml_str(text);
        assert_eq!(warnings.len(), 5);
        assert_eq!(cfg.timing.memorize_secs_per_item, 1.0);
        assert_eq!(cfg.timing.frame_ms, 33);
        assert_eq!(cfg.layout.padding, 1);
        assert_eq!(cfg.item_size(), Size::new(7, 3));
        assert_eq!(cfg.general.default_count, 5);
    }

    #[test]
    fn huge_timings_fall_back_to_defaults() {
        let text = r#"
            [timing]
            memorize_secs_per_item = 1e30
            scramble_delay_ms = 9223372036854775807
        "#;
        let (cfg, warnings) = GameConfig::from_toml_str(text);
        assert_eq!(warnings.len(), 2);
        let timing = cfg.session_timing();
        assert_eq!(timing.memorize_per_item, Duration::from_secs(1));
        assert_eq!(timing.scramble_delay, Duration::from_millis(700));
    }

    #[test]
    fn memorize_upper_bound_is_inclusive() {
        let (cfg, warnings) = GameConfig::from_toml_str("[timing]\nmemorize_secs_per_item = 60.0\n");
        assert!(warnings.is_empty());
        assert_eq!(cfg.session_timing().memorize_per_item, Duration::from_secs(60));
    }

    #[test]
    fn max_tries_flows_into_layout_settings() {
        let (cfg, _) = GameConfig::from_toml_str("[layout]\nmax_tries = 10\n");
        assert_eq!(cfg.layout_settings().max_tries, 10);
    }
}
