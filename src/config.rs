use anyhow::{anyhow, Context, Result};

use crate::geometry::{grid_spans, MAX_GRID_LINES};
use crate::input::{parse_key_script, KeyStroke};

pub const DEFAULT_WIDTH: u32 = 800;
pub const DEFAULT_HEIGHT: u32 = 600;
pub const DEFAULT_GRID_EXTENT: f32 = 10.0;
pub const DEFAULT_GRID_STEP: f32 = 1.0;

/// Which of the two demo programs is running.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Variant {
    /// Rotation keys spin the mesh continuously while held.
    Continuous,
    /// Reference grid plus single-step rotation.
    Grid,
}

impl Variant {
    pub fn name(self) -> &'static str {
        match self {
            Variant::Continuous => "continuous",
            Variant::Grid => "grid",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            Variant::Continuous => "Hourglass",
            Variant::Grid => "Hourglass - reference grid",
        }
    }

    fn binary(self) -> &'static str {
        match self {
            Variant::Continuous => "hourglass",
            Variant::Grid => "hourglass-grid",
        }
    }
}

/// Settings shared by both binaries.
#[derive(Debug, Clone, PartialEq)]
pub struct DemoConfig {
    pub variant: Variant,
    pub width: u32,
    pub height: u32,
    pub grid_extent: f32,
    pub grid_step: f32,
    pub summary_only: bool,
    pub keys: Vec<KeyStroke>,
}

impl DemoConfig {
    pub fn new(variant: Variant) -> Self {
        Self {
            variant,
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
            grid_extent: DEFAULT_GRID_EXTENT,
            grid_step: DEFAULT_GRID_STEP,
            summary_only: false,
            keys: Vec::new(),
        }
    }

    pub fn has_grid(&self) -> bool {
        self.variant == Variant::Grid
    }
}

/// Outcome of command line parsing.
#[derive(Debug, Clone, PartialEq)]
pub enum CliCommand {
    Run(DemoConfig),
    Help(String),
}

pub fn usage(variant: Variant) -> String {
    format!(
        "Usage: {} [--width <px>] [--height <px>] [--grid-extent <f>] [--grid-step <f>] [--summary-only] [--keys <script>]",
        variant.binary()
    )
}

/// Parses the arguments that follow the program name.
pub fn parse_args<I>(variant: Variant, args: I) -> Result<CliCommand>
where
    I: IntoIterator<Item = String>,
{
    let mut config = DemoConfig::new(variant);
    let mut args = args.into_iter();
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "-h" | "--help" => return Ok(CliCommand::Help(usage(variant))),
            "--summary-only" => config.summary_only = true,
            "--width" => config.width = parse_dimension(&arg, args.next())?,
            "--height" => config.height = parse_dimension(&arg, args.next())?,
            "--grid-extent" => config.grid_extent = parse_positive(&arg, args.next())?,
            "--grid-step" => config.grid_step = parse_positive(&arg, args.next())?,
            "--keys" => {
                let script = required(&arg, args.next())?;
                config.keys = parse_key_script(&script)
                    .with_context(|| format!("invalid key script {script:?}"))?;
            }
            other => {
                return Err(anyhow!("Unknown argument: {other}. {}", usage(variant)));
            }
        }
    }
    if grid_spans(config.grid_extent, config.grid_step) >= MAX_GRID_LINES as f64 {
        return Err(anyhow!(
            "--grid-extent {} with --grid-step {} needs more than {MAX_GRID_LINES} grid lines",
            config.grid_extent,
            config.grid_step
        ));
    }
    Ok(CliCommand::Run(config))
}

fn required(flag: &str, value: Option<String>) -> Result<String> {
    value.ok_or_else(|| anyhow!("{flag} expects a value"))
}

fn parse_dimension(flag: &str, value: Option<String>) -> Result<u32> {
    let value = required(flag, value)?;
    let parsed = value
        .parse::<u32>()
        .with_context(|| format!("{flag} expects a pixel count, got {value:?}"))?;
    if parsed == 0 {
        return Err(anyhow!("{flag} must be non-zero"));
    }
    Ok(parsed)
}

fn parse_positive(flag: &str, value: Option<String>) -> Result<f32> {
    let value = required(flag, value)?;
    let parsed = value
        .parse::<f32>()
        .with_context(|| format!("{flag} expects a number, got {value:?}"))?;
    if !(parsed.is_finite() && parsed > 0.0) {
        return Err(anyhow!("{flag} must be a positive number"));
    }
    Ok(parsed)
}
