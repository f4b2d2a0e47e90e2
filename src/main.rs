use std::error::Error;
use std::fmt::Display;
use std::io::{stdout, Write};
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use bpaf::Bpaf;
use stu540::abi::CHUNK_SIZE;
use stu_sync_core::{HotplugEvent, HotplugWatcher, Pad};

use crate::detection::{pad_kind, PadKind};
use crate::media::encode_image;

mod detection;
mod media;

/// Utility for easily parsing hex colors from bpaf
#[derive(Debug, Clone, Hash)]
struct Color(pub [u8; 3]);
impl Display for Color {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let [r, g, b] = self.0;
        f.write_str(&format!("#{r:02x}{g:02x}{b:02x}"))
    }
}
impl FromStr for Color {
    type Err = String;
    fn from_str(code: &str) -> Result<Self, Self::Err> {
        // parse hex string into rgb
        let mut hex = (*code).trim_start_matches('#').to_string();
        match hex.len() {
            3 => {
                // Extend 3 character hex colors
                hex = hex.chars().flat_map(|a| [a, a]).collect();
            },
            6 => {},
            l => return Err(format!("Invalid hex length for {code}: {l}")),
        }
        if let Ok(channel_bytes) = u32::from_str_radix(&hex, 16) {
            let r = ((channel_bytes >> 16) & 0xFF) as u8;
            let g = ((channel_bytes >> 8) & 0xFF) as u8;
            let b = (channel_bytes & 0xFF) as u8;
            Ok(Self([r, g, b]))
        } else {
            Err(format!("Invalid hex color: {code}"))
        }
    }
}

/// On/off switch argument
#[derive(Debug, Clone, Copy)]
struct Switch(bool);
impl FromStr for Switch {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "on" | "true" | "1" => Ok(Self(true)),
            "off" | "false" | "0" => Ok(Self(false)),
            _ => Err(format!("expected on or off, got {s}")),
        }
    }
}

#[derive(Clone, Debug, Bpaf)]
enum Command {
    /// Print negotiated device capabilities
    #[bpaf(command)]
    Info,
    /// Stream decoded pen samples to stdout
    #[bpaf(command)]
    Pen {
        /// Request timing reports (adds timestamp and sequence counter)
        #[bpaf(short, long)]
        timing: bool,
    },
    /// Set pen ink color and width
    #[bpaf(command)]
    Color {
        /// Ink color (hex: #RRGGBB or #RGB)
        #[bpaf(short, long, fallback(Color([0; 3])), display_fallback)]
        color: Color,
        /// Pen width, 0-5
        #[bpaf(short, long, fallback(1u8))]
        width: u8,
    },
    /// Set backlight intensity
    #[bpaf(command)]
    Backlight {
        /// Intensity, 0-3
        #[bpaf(positional("LEVEL"))]
        level: u8,
    },
    /// Set background color. Takes effect on the next clear.
    #[bpaf(command)]
    Background {
        /// Background color (hex: #RRGGBB or #RGB)
        #[bpaf(positional("COLOR"))]
        color: Color,
    },
    /// Restrict the writing area (tablet units, left-top / right-bottom)
    #[bpaf(command)]
    Area {
        #[bpaf(positional("X1"))]
        x1: u16,
        #[bpaf(positional("Y1"))]
        y1: u16,
        #[bpaf(positional("X2"))]
        x2: u16,
        #[bpaf(positional("Y2"))]
        y2: u16,
    },
    /// Enable or disable inking the screen
    #[bpaf(command)]
    Ink {
        #[bpaf(positional("ON|OFF"))]
        state: Switch,
    },
    /// Clear the screen to the background color
    #[bpaf(command)]
    Clear,
    /// Upload an image to the pad screen
    #[bpaf(command, fallback_to_usage)]
    Image {
        /// Use nearest neighbor interpolation when resizing, otherwise uses gaussian
        #[bpaf(short('n'), long("nearest"))]
        nearest: bool,
        /// Optional background color for transparent images
        #[bpaf(short, long, fallback(Color([255; 3])), display_fallback)]
        bg: Color,
        /// Path to image to re-encode and upload
        #[bpaf(positional("PATH"), guard(|p| p.exists(), "file not found"))]
        path: PathBuf,
    },
}

#[derive(Clone, Debug, Bpaf)]
#[bpaf(options, version, descr(env!("CARGO_PKG_DESCRIPTION")))]
enum Cli {
    /// Watch for pad attach/detach events, without opening a pad
    #[bpaf(command)]
    Watch,
    Run {
        #[bpaf(external(pad_kind))]
        pad: PadKind,
        #[bpaf(external(command))]
        command: Command,
    },
}

fn main() -> Result<(), Box<dyn Error>> {
    match cli().run() {
        Cli::Watch => {
            let mut watcher = HotplugWatcher::new(stu540::consts::IDENTITY);
            println!("watching for pad events (ctrl-c to stop)");
            loop {
                match watcher.poll()? {
                    Some(HotplugEvent::Attached) => println!("pad attached"),
                    Some(HotplugEvent::Detached) => println!("pad detached"),
                    None => {},
                }
                std::thread::sleep(Duration::from_millis(500));
            }
        },
        Cli::Run { pad, command } => {
            let mut pad = pad.as_pad()?;
            run(&mut *pad, command)
        },
    }
}

fn run(pad: &mut dyn Pad, command: Command) -> Result<(), Box<dyn Error>> {
    match command {
        Command::Info => {
            println!("{}:", pad.info().name);
            for (label, value) in pad.describe() {
                println!("  {label}: {value}");
            }
        },
        Command::Pen { timing } => {
            let pen = pad.as_pen_input().ok_or("pad does not support pen input")?;
            pen.set_writing_mode(timing)?;
            println!("streaming pen samples (ctrl-c to stop)");
            loop {
                let Some(s) = pen.poll(500)? else { continue };
                print!(
                    "x={} y={} pressure={:.4} proximity={} contact={}",
                    s.display_x, s.display_y, s.pressure, s.proximity, s.contact
                );
                if let (Some(time), Some(seq)) = (s.timestamp, s.sequence) {
                    print!(" time={time} seq={seq}");
                }
                println!();
            }
        },
        Command::Color { color, width } => {
            pad.as_ink()
                .ok_or("pad does not support ink control")?
                .set_pen(color.0, width)?;
            println!("set pen: color={color}, width={width}");
        },
        Command::Backlight { level } => {
            pad.as_backlight()
                .ok_or("pad does not support backlight control")?
                .set_backlight(level)?;
            println!("set backlight: {level}");
        },
        Command::Background { color } => {
            pad.as_ink()
                .ok_or("pad does not support ink control")?
                .set_background(color.0)?;
            println!("set background: {color} (clear to apply)");
        },
        Command::Area { x1, y1, x2, y2 } => {
            pad.as_pen_input()
                .ok_or("pad does not support pen input")?
                .set_writing_area(x1, y1, x2, y2)?;
            println!("set writing area: ({x1},{y1})-({x2},{y2})");
        },
        Command::Ink { state } => {
            pad.as_ink()
                .ok_or("pad does not support ink control")?
                .set_inking(state.0)?;
            println!("inking {}", if state.0 { "enabled" } else { "disabled" });
        },
        Command::Clear => {
            pad.as_ink()
                .ok_or("pad does not support ink control")?
                .clear_screen()?;
            println!("cleared screen");
        },
        Command::Image { nearest, bg, path } => {
            let (width, height) = pad
                .as_screen_size()
                .ok_or("pad does not support images")?;
            let image = image::open(path)?;
            // re-encode and upload to the pad
            let encoded = encode_image(image, bg.0, nearest, width, height);
            let len = encoded.len();
            let total = len.div_ceil(CHUNK_SIZE);
            let fmt_width = total.to_string().len();
            pad.as_image()
                .ok_or("pad does not support images")?
                .upload_image(&encoded, &mut |i| {
                    print!("\ruploading {len} bytes ({i:fmt_width$}/{total}) ... ");
                    stdout().flush().unwrap();
                })?;
            println!("done");
        },
    }
    Ok(())
}
