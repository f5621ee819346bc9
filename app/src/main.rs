// Batch driver: load .terrain files, write height-map PNGs and
// flood-progression GIFs. A file that fails to load or encode is
// reported and skipped so the rest of the batch still runs.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result, bail};
use engine::{count_flooded2, render_frame2};
use io::{GifOptions, load_terrain, save_gif, save_png};

const USAGE: &str = "\
usage: app [OPTIONS] <terrain-file>...

options:
    --heightmap        write <name>_height_map.png at the baseline level (default)
    --gif              write <name>_flood.gif over the flood level range
    --step <f32>       water level increment between frames (default 5)
    --delay <ms>       per-frame GIF delay in milliseconds (default 10)
    --min-level <f32>  first water level (default: the terrain's baseline)
    --max-level <f32>  last water level (default: the highest elevation)
    --out <dir>        output directory (default: out)";

struct Args {
    files: Vec<PathBuf>,
    heightmap: bool,
    gif: bool,
    step: f32,
    delay_ms: u32,
    min_level: Option<f32>,
    max_level: Option<f32>,
    out_dir: PathBuf,
}

fn parse_args(mut argv: impl Iterator<Item = String>) -> Result<Args> {
    let mut args = Args {
        files: Vec::new(),
        heightmap: false,
        gif: false,
        step: 5.0,
        delay_ms: 10,
        min_level: None,
        max_level: None,
        out_dir: PathBuf::from("out"),
    };

    fn value(argv: &mut impl Iterator<Item = String>, flag: &str) -> Result<String> {
        match argv.next() {
            Some(v) => Ok(v),
            None => bail!("{flag} needs a value"),
        }
    }

    while let Some(arg) = argv.next() {
        match arg.as_str() {
            "--heightmap" => args.heightmap = true,
            "--gif" => args.gif = true,
            "--step" => {
                let v = value(&mut argv, "--step")?;
                args.step = v.parse().with_context(|| format!("bad --step value {v:?}"))?;
            }
            "--delay" => {
                let v = value(&mut argv, "--delay")?;
                args.delay_ms = v.parse().with_context(|| format!("bad --delay value {v:?}"))?;
            }
            "--min-level" => {
                let v = value(&mut argv, "--min-level")?;
                args.min_level =
                    Some(v.parse().with_context(|| format!("bad --min-level value {v:?}"))?);
            }
            "--max-level" => {
                let v = value(&mut argv, "--max-level")?;
                args.max_level =
                    Some(v.parse().with_context(|| format!("bad --max-level value {v:?}"))?);
            }
            "--out" => args.out_dir = PathBuf::from(value(&mut argv, "--out")?),
            flag if flag.starts_with("--") => bail!("unknown option {flag}"),
            _ => args.files.push(PathBuf::from(arg)),
        }
    }

    if args.files.is_empty() {
        bail!("no terrain files given");
    }
    // with no mode flags, behave like the height-map batch run
    if !args.heightmap && !args.gif {
        args.heightmap = true;
    }
    if args.step <= 0.0 {
        bail!("--step must be positive");
    }
    Ok(args)
}

fn process_file(path: &Path, args: &Args) -> Result<()> {
    let terrain =
        load_terrain(path).with_context(|| format!("loading {}", path.display()))?;
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "terrain".to_string());
    log::info!("{stem}: {terrain}");

    if args.heightmap {
        // with no usable source the baseline falls back to the lowest elevation
        let level = terrain
            .baseline_level()
            .unwrap_or_else(|| terrain.min_elevation());
        let mask = terrain.flood(level);
        log::info!(
            "{stem}: {} cells flooded at level {level:.1}",
            count_flooded2(&mask)
        );
        let frame = render_frame2(
            terrain.grid(),
            &mask,
            terrain.min_elevation(),
            terrain.max_elevation(),
            level,
        );
        let out = args.out_dir.join(format!("{stem}_height_map.png"));
        save_png(&frame, &out).with_context(|| format!("writing {}", out.display()))?;
        log::info!("wrote {}", out.display());
    }

    if args.gif {
        let out = args.out_dir.join(format!("{stem}_flood.gif"));
        let opts = GifOptions {
            delay_ms: args.delay_ms,
            loop_forever: true,
        };
        let series = terrain
            .render_series(args.min_level, args.max_level, args.step)
            .map(|(level, frame)| {
                log::info!("{stem}: rendered level {level:.1}");
                frame
            });
        let frames = save_gif(series, &out, &opts)
            .with_context(|| format!("writing {}", out.display()))?;
        log::info!("wrote {} ({frames} frames)", out.display());
    }

    Ok(())
}

fn main() -> ExitCode {
    env_logger::init();

    let args = match parse_args(std::env::args().skip(1)) {
        Ok(args) => args,
        Err(err) => {
            eprintln!("error: {err}\n\n{USAGE}");
            return ExitCode::from(2);
        }
    };

    if let Err(err) = fs::create_dir_all(&args.out_dir) {
        eprintln!("error: cannot create {}: {err}", args.out_dir.display());
        return ExitCode::FAILURE;
    }

    // one bad dataset must not sink the rest of the batch
    let mut failures = 0;
    for file in &args.files {
        if let Err(err) = process_file(file, &args) {
            log::error!("{}: {err:#}", file.display());
            failures += 1;
        }
    }

    if failures == args.files.len() {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}
