//! Command-line front end (spec section 6): `--gif`, `--content`, `--bmp`,
//! `--password`. Presence of `--bmp` selects encode; its absence selects
//! decode. Exit code 0 on success (including "no content matches this
//! password"), `-1` on any failure.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

use steganogif::carrier;
use steganogif::codec;
use steganogif::color::Rgb8;
use steganogif::container;
use steganogif::envelope::DecodedEnvelope;
use steganogif::frame::Frame;

#[derive(Parser, Debug)]
#[command(name = "steganogif", about = "Hide or recover a payload in a password-protected animated GIF")]
struct Cli {
  /// Output container path (encode) or input container path (decode).
  #[arg(long)]
  gif: PathBuf,

  /// Payload file path (encode input) or destination path (decode output).
  #[arg(long)]
  content: PathBuf,

  /// Carrier still-image path. Presence selects encode; absence selects decode.
  #[arg(long)]
  bmp: Option<PathBuf>,

  /// Password. If absent, read interactively without echo.
  #[arg(long)]
  password: Option<String>,
}

fn resolve_password(password: Option<String>) -> Result<String> {
  match password {
    Some(p) => Ok(p),
    None => rpassword::prompt_password("Password: ").context("failed to read password"),
  }
}

fn run_encode(cli: &Cli, password: &str, bmp_path: &PathBuf) -> Result<()> {
  let carrier = carrier::read_still(bmp_path).context("failed to read BMP carrier")?;
  let pixels: Vec<_> = carrier.pixels.iter().map(|&p| p.rgb()).collect();
  let payload = std::fs::read(&cli.content).context("failed to read payload file")?;

  log::info!("encoding {} byte(s) into a {}x{} carrier", payload.len(), carrier.width, carrier.height);

  // spec section 4.3: palette reduction applies only when the carrier has
  // more than 8 bits per pixel. An already-paletted carrier's own palette
  // and index plane are reused directly instead.
  let native_colors: Vec<Rgb8>;
  let native_palette = if carrier.bits_per_pixel <= 8 {
    let palette = carrier.palette.as_deref().context("<=8bpp BMP carrier is missing its color table")?;
    let indices = carrier.indices.as_deref().context("<=8bpp BMP carrier is missing its index plane")?;
    native_colors = palette.iter().map(|&c| c.rgb()).collect();
    Some((native_colors.as_slice(), indices))
  } else {
    None
  };

  let frames = codec::encode(password, carrier.width, carrier.height, &pixels, carrier.bits_per_pixel, native_palette, &payload)?;
  let bytes = container::encode_animation(&frames)?;
  std::fs::write(&cli.gif, bytes).context("failed to write GIF container")?;
  Ok(())
}

fn run_decode(cli: &Cli, password: &str) -> Result<()> {
  let bytes = std::fs::read(&cli.gif).context("failed to read GIF container")?;
  let frames: Vec<Frame> = container::decode_animation(&bytes)?;
  log::info!("decoding {} frame(s)", frames.len());

  match codec::decode(password, frames)? {
    DecodedEnvelope::Payload(payload) => {
      std::fs::write(&cli.content, payload).context("failed to write recovered payload")?;
    }
    DecodedEnvelope::NoContent => {
      println!("no content matches this password");
    }
  }
  Ok(())
}

fn main() {
  env_logger::init();
  let cli = Cli::parse();

  let result = (|| -> Result<()> {
    let password = resolve_password(cli.password.clone())?;
    match &cli.bmp {
      Some(bmp_path) => run_encode(&cli, &password, bmp_path),
      None => run_decode(&cli, &password),
    }
  })();

  if let Err(err) = result {
    eprintln!("error: {err:#}");
    std::process::exit(-1);
  }
}
