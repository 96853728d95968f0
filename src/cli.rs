use clap::Parser;
use std::path::PathBuf;

use crate::state::AudioSource;

#[derive(Parser, Debug)]
#[command(name = "spectro", about = "Real-time audio spectrum visualizer")]
pub struct Cli {
    /// Settings file (defaults to spectro.toml or the platform config dir)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// List capture devices and exit
    #[arg(long)]
    pub list_devices: bool,

    /// Emit the device listing as JSON (with --list-devices)
    #[arg(long)]
    pub json: bool,

    /// Capture from the first input device whose name contains this string,
    /// bypassing source classification
    #[arg(short, long)]
    pub device: Option<String>,

    /// Initial audio source
    #[arg(long, value_enum)]
    pub source: Option<AudioSource>,

    /// Number of spectrum bars
    #[arg(long, default_value_t = 64)]
    pub bars: usize,

    /// Samples per capture frame (FFT size)
    #[arg(long, default_value_t = 1024)]
    pub chunk_size: usize,

    /// Frames of history in the temporal smoother
    #[arg(long, default_value_t = 20)]
    pub history: usize,

    /// Window width in pixels
    #[arg(long)]
    pub width: Option<u32>,

    /// Window height in pixels
    #[arg(long)]
    pub height: Option<u32>,

    /// Magnitude sensitivity (0.1 - 10.0)
    #[arg(long)]
    pub sensitivity: Option<f32>,

    /// Initial palette index
    #[arg(long)]
    pub palette: Option<usize>,
}
