// SPDX-License-Identifier: MPL-2.0
use lens_edit::app::Viewer;
use lens_edit::config;
use lens_edit::domain::geometry::{NormalizedPoint, PixelRect};
use std::path::PathBuf;
use std::process::ExitCode;

const HELP: &str = "\
Apply edits to an image and save the result

USAGE:
  lens_edit <IMAGE> [OPTIONS]

OPTIONS:
  --rotate DEG            Rotate by a multiple of 90 degrees (clockwise)
  --crop X,Y,W,H          Crop, in pixels of the rotated image
  --stroke X,Y;X,Y;...    Freehand stroke in normalized coordinates (repeatable)
  --text X,Y,CONTENT      Text anchored at a normalized point (repeatable)
  --out PATH              Save to PATH instead of overwriting IMAGE
  --copy                  Save a copy next to IMAGE, keeping rotation pending
  --config PATH           Settings file to use instead of the default one
  -h, --help              Print this help
";

struct Args {
    image: PathBuf,
    rotate: Option<i32>,
    crop: Option<PixelRect>,
    strokes: Vec<Vec<NormalizedPoint>>,
    texts: Vec<(NormalizedPoint, String)>,
    out: Option<PathBuf>,
    copy: bool,
    config: Option<PathBuf>,
}

fn parse_args() -> Result<Option<Args>, pico_args::Error> {
    let mut args = pico_args::Arguments::from_env();
    if args.contains(["-h", "--help"]) {
        return Ok(None);
    }
    let parsed = Args {
        rotate: args.opt_value_from_str("--rotate")?,
        crop: args.opt_value_from_fn("--crop", parse_crop)?,
        strokes: args.values_from_fn("--stroke", parse_stroke)?,
        texts: args.values_from_fn("--text", parse_text)?,
        out: args.opt_value_from_str("--out")?,
        copy: args.contains("--copy"),
        config: args.opt_value_from_str("--config")?,
        image: args.free_from_str()?,
    };
    let rest = args.finish();
    if !rest.is_empty() {
        log::warn!("Ignoring unused arguments: {rest:?}");
    }
    Ok(Some(parsed))
}

fn parse_numbers<T: std::str::FromStr>(value: &str, count: usize) -> Result<Vec<T>, String> {
    let numbers = value
        .split(',')
        .map(|part| part.trim().parse::<T>())
        .collect::<Result<Vec<_>, _>>()
        .map_err(|_| format!("invalid number in '{value}'"))?;
    if numbers.len() == count {
        Ok(numbers)
    } else {
        Err(format!("expected {count} comma-separated values, got '{value}'"))
    }
}

fn parse_crop(value: &str) -> Result<PixelRect, String> {
    let n = parse_numbers::<u32>(value, 4)?;
    Ok(PixelRect::new(n[0], n[1], n[2], n[3]))
}

fn parse_point(value: &str) -> Result<NormalizedPoint, String> {
    let n = parse_numbers::<f32>(value, 2)?;
    Ok(NormalizedPoint::new(n[0], n[1]))
}

fn parse_stroke(value: &str) -> Result<Vec<NormalizedPoint>, String> {
    value.split(';').map(parse_point).collect()
}

fn parse_text(value: &str) -> Result<(NormalizedPoint, String), String> {
    let mut parts = value.splitn(3, ',');
    match (parts.next(), parts.next(), parts.next()) {
        (Some(x), Some(y), Some(content)) => {
            Ok((parse_point(&format!("{x},{y}"))?, content.to_string()))
        }
        _ => Err(format!("expected X,Y,CONTENT, got '{value}'")),
    }
}

fn run(args: Args) -> Result<(), Box<dyn std::error::Error>> {
    let settings = match &args.config {
        Some(path) => config::load_from_path(path)?,
        None => config::load()?,
    };
    let mut viewer = Viewer::new(settings);
    viewer.open(&args.image)?;

    let session = viewer
        .session_mut()
        .ok_or_else(|| format!("could not open {}", args.image.display()))?;
    if let Some(degrees) = args.rotate {
        if !session.apply_rotation(degrees) {
            log::warn!("Rotation by {degrees} degrees ignored: not a non-zero multiple of 90");
        }
    }
    if let Some(rect) = args.crop {
        if !session.apply_crop_pixels(rect) {
            return Err(format!(
                "crop {},{},{},{} does not fit the {}x{} image",
                rect.x,
                rect.y,
                rect.width,
                rect.height,
                session.frame_size().0,
                session.frame_size().1
            )
            .into());
        }
    }
    for stroke in &args.strokes {
        if !session.add_stroke(stroke) {
            log::warn!("Stroke with fewer than two points ignored");
        }
    }
    for (anchor, content) in &args.texts {
        session.add_text(*anchor, content);
    }
    if !viewer.has_pending_edits() {
        log::info!("No edits to save");
        return Ok(());
    }

    let saved = if args.copy {
        viewer.save_as_copy()?
    } else if let Some(out) = &args.out {
        viewer.save_as(out)?;
        out.clone()
    } else {
        viewer.save()?
    };
    println!("{}", saved.display());
    Ok(())
}

fn main() -> ExitCode {
    env_logger::init();

    let args = match parse_args() {
        Ok(Some(args)) => args,
        Ok(None) => {
            print!("{HELP}");
            return ExitCode::SUCCESS;
        }
        Err(err) => {
            eprintln!("lens_edit: {err}\n\n{HELP}");
            return ExitCode::FAILURE;
        }
    };

    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            log::error!("{err}");
            eprintln!("lens_edit: {err}");
            ExitCode::FAILURE
        }
    }
}
