use eframe::egui::Color32;

use crate::canvas::layer::TextStyle;

/// Pan/zoom tunables.
#[derive(Clone, Debug)]
pub struct ViewConfig {
    pub min_scale: f32,
    pub max_scale: f32,
    pub overflow_margin: f32,
    pub gesture_sensitivity: f32,
    pub wheel_intensity: f32,
    pub wheel_intensity_ctrl: f32,
    pub zoom_step: f32,
}

impl Default for ViewConfig {
    fn default() -> Self {
        Self {
            min_scale: 0.35,
            max_scale: 4.0,
            overflow_margin: 120.0,
            gesture_sensitivity: 1.35,
            wheel_intensity: 0.0022,
            wheel_intensity_ctrl: 0.004,
            zoom_step: 1.15,
        }
    }
}

/// Selection sizes. Handle radius and margin are screen pixels, the rest world units.
#[derive(Clone, Debug)]
pub struct SelectionConfig {
    pub min_size: f32,
    pub handle_radius: f32,
    pub handle_margin: f32,
    pub resize_floor: f32,
}

impl Default for SelectionConfig {
    fn default() -> Self {
        Self {
            min_size: 3.0,
            handle_radius: 8.0,
            handle_margin: 6.0,
            resize_floor: 4.0,
        }
    }
}

#[derive(Clone, Debug)]
pub struct HistoryConfig {
    pub min_entries: usize,
    pub max_entries: usize,
    pub budget_bytes: usize,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            min_entries: 5,
            max_entries: 30,
            budget_bytes: 256 * 1024 * 1024,
        }
    }
}

/// Everything a session needs to start.
#[derive(Clone, Debug)]
pub struct EditorConfig {
    pub world_width: usize,
    pub world_height: usize,
    pub view: ViewConfig,
    pub selection: SelectionConfig,
    pub history: HistoryConfig,
    pub brush_size: f32,
    pub color: Color32,
    pub text_style: TextStyle,
    pub max_notices: usize,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            world_width: 1280,
            world_height: 800,
            view: ViewConfig::default(),
            selection: SelectionConfig::default(),
            history: HistoryConfig::default(),
            brush_size: 6.0,
            color: Color32::BLACK,
            text_style: TextStyle::default(),
            max_notices: 4,
        }
    }
}

/// Command line overrides.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct LaunchOptions {
    pub world: Option<(usize, usize)>,
    pub history: Option<usize>,
    pub max_scale: Option<f32>,
}

impl LaunchOptions {
    pub fn apply(&self, config: &mut EditorConfig) {
        if let Some((w, h)) = self.world {
            config.world_width = w;
            config.world_height = h;
        }
        if let Some(n) = self.history {
            config.history.max_entries = n.max(1);
            config.history.min_entries = config.history.min_entries.min(config.history.max_entries);
        }
        if let Some(s) = self.max_scale {
            config.view.max_scale = s;
        }
    }
}

fn parse_world(value: &str) -> Option<(usize, usize)> {
    let (w, h) = value.split_once(['x', 'X'])?;
    let w = w.trim().parse().ok().filter(|v: &usize| *v > 0)?;
    let h = h.trim().parse().ok().filter(|v: &usize| *v > 0)?;
    Some((w, h))
}

/// Parse `--world WxH`, `--history N` and `--max-scale S` (also in `--flag=value` form).
pub fn parse_launch_args<I>(args: I) -> LaunchOptions
where
    I: IntoIterator<Item = String>,
{
    let mut options = LaunchOptions::default();
    let mut args = args.into_iter();
    while let Some(arg) = args.next() {
        let (flag, inline) = match arg.split_once('=') {
            Some((f, v)) => (f.to_string(), Some(v.to_string())),
            None => (arg.clone(), None),
        };
        if !matches!(flag.as_str(), "--world" | "--history" | "--max-scale") {
            continue;
        }
        let Some(value) = inline.or_else(|| args.next()) else {
            log::warn!("Missing value for {flag}");
            continue;
        };
        match flag.as_str() {
            "--world" => match parse_world(&value) {
                Some(size) => options.world = Some(size),
                None => log::warn!("Ignoring invalid world size {value:?}"),
            },
            "--history" => match value.parse::<usize>() {
                Ok(n) if n > 0 => options.history = Some(n),
                _ => log::warn!("Ignoring invalid history depth {value:?}"),
            },
            _ => match value.parse::<f32>() {
                Ok(s) if s.is_finite() && s > 0.0 => options.max_scale = Some(s),
                _ => log::warn!("Ignoring invalid max scale {value:?}"),
            },
        }
    }
    options
}

/// Launch options from the process arguments.
pub fn parse_launch_env() -> LaunchOptions {
    parse_launch_args(std::env::args().skip(1))
}
