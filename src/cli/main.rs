use anyhow::Result;
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::{Path, PathBuf};

use exif_forge::codec::{Quality, TargetFormat};
use exif_forge::fetch::{HttpFetcher, ImageInput};
use exif_forge::pipeline::{self, Pipeline, PipelineVariant, ProcessRequest, Reencoded};
use exif_forge::profile::{MetadataProfile, ProfileMode, ThreadRngPicker};
use exif_forge::{config, exif};

mod table;

use table::{Table, Tone};

#[derive(Parser, Debug)]
#[command(
    name = "exif-forge",
    version,
    about = "Re-encode images to JPEG or WebP with synthetic camera, location and authorship EXIF"
)]
struct Cli {
    /// Path to config file (default: config.json next to binary)
    #[arg(short, long, value_name = "FILE", global = true)]
    config: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Convert images, embedding a generated metadata profile
    Convert(ConvertArgs),
    /// Display the EXIF metadata of image files
    Inspect {
        /// Image files or directories
        #[arg(value_name = "PATH", required = true)]
        paths: Vec<PathBuf>,
    },
    /// Write a default config.json and exit
    Init,
}

#[derive(Args, Debug)]
struct ConvertArgs {
    /// Image files, directories, URLs or remote:<id> identifiers
    #[arg(value_name = "INPUT", required = true)]
    inputs: Vec<String>,

    /// Output directory (default: next to each input, or the current directory for remote inputs)
    #[arg(short, long, value_name = "DIR")]
    out: Option<PathBuf>,

    /// Output format for the direct variant [default: jpeg]
    #[arg(short, long)]
    format: Option<TargetFormat>,

    /// Pipeline shape
    #[arg(long, value_enum, default_value_t = VariantArg::Direct)]
    variant: VariantArg,

    /// Which metadata profile to generate
    #[arg(short, long, value_enum, default_value_t = ModeArg::Camera)]
    mode: ModeArg,

    /// ImageDescription text (authorship mode)
    #[arg(long)]
    description: Option<String>,

    /// XPKeywords text (authorship mode)
    #[arg(long)]
    keywords: Option<String>,

    /// Compression quality 1-100 (default from config)
    #[arg(short, long)]
    quality: Option<u8>,

    /// Output results as JSON
    #[arg(long)]
    json: bool,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum VariantArg {
    Direct,
    JpegThenWebp,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum ModeArg {
    None,
    Camera,
    Authorship,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set up logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level))
        .format_timestamp(None)
        .init();

    match cli.command {
        Command::Init => {
            let config = config::Config::default();
            let path = cli.config.as_deref();
            config.save(path)?;
            let save_path = match path {
                Some(p) => p.to_path_buf(),
                None => config::Config::config_path()?,
            };
            println!("Default config written to {}", save_path.display());
            Ok(())
        }
        Command::Inspect { paths } => {
            let images = pipeline::collect_images(&paths);
            if images.is_empty() {
                anyhow::bail!("No supported image files found in the specified paths.");
            }
            for image_path in &images {
                print_full_exif(image_path)?;
            }
            Ok(())
        }
        Command::Convert(args) => convert(cli.config.as_deref(), args).await,
    }
}

async fn convert(config_path: Option<&Path>, args: ConvertArgs) -> Result<()> {
    let config = config::Config::load(config_path)?;
    let fetcher = HttpFetcher::new(&config.fetch)?;
    let pipeline = Pipeline::new(config)?;

    for warning in ignored_flags(&args) {
        log::warn!("{warning}");
    }

    let request = ProcessRequest {
        variant: match args.variant {
            VariantArg::Direct => PipelineVariant::Direct(args.format.unwrap_or(TargetFormat::Jpeg)),
            VariantArg::JpegThenWebp => PipelineVariant::JpegThenWebp,
        },
        metadata: match args.mode {
            ModeArg::None => None,
            ModeArg::Camera => Some(ProfileMode::Camera),
            ModeArg::Authorship => Some(ProfileMode::Authorship {
                description: args.description.clone(),
                keywords: args.keywords.clone(),
            }),
        },
        quality: args.quality.map(Quality::new).transpose()?,
    };
    let inputs = expand_inputs(&args.inputs);
    if inputs.is_empty() {
        anyhow::bail!("No supported image inputs found.");
    }
    log::info!("Found {} input(s) to convert", inputs.len());

    let mut results = Vec::new();
    let total = inputs.len();

    for (i, input) in inputs.into_iter().enumerate() {
        let label = input.label();
        log::info!("[{}/{}] Converting: {}", i + 1, total, label);

        let target = destination(&input, args.out.as_deref(), request.variant.output_format());
        let outcome = match input.load(&fetcher).await {
            Ok(bytes) => pipeline.process(&bytes, &request, &mut ThreadRngPicker),
            Err(e) => Err(e),
        };

        let result = match outcome {
            Ok(output) => match std::fs::write(&target, &output.bytes) {
                Ok(()) => {
                    log::info!("  Wrote {} ({} bytes)", target.display(), output.bytes.len());
                    if !args.json {
                        if let Some(ref profile) = output.profile {
                            print_profile(profile);
                        }
                    }
                    success_json(&label, &target, &output)
                }
                Err(e) => {
                    log::error!("  Failed to write {}: {e}", target.display());
                    error_json(&label, &exif_forge::error::Error::from(e))
                }
            },
            Err(e) => {
                log::error!("  Error: {e}");
                error_json(&label, &e)
            }
        };
        results.push(result);
    }

    // JSON output
    if args.json {
        println!("{}", serde_json::to_string_pretty(&results)?);
    }

    // Summary
    let failed = results.iter().filter(|r| r.get("error").is_some()).count();
    let success = total - failed;
    log::info!("Done: {success} succeeded, {failed} failed out of {total} inputs");

    Ok(())
}

/// Flags that were given but have no effect with the chosen mode or variant.
fn ignored_flags(args: &ConvertArgs) -> Vec<&'static str> {
    let mut ignored = Vec::new();
    if args.mode != ModeArg::Authorship && (args.description.is_some() || args.keywords.is_some()) {
        ignored.push("--description and --keywords only apply to --mode authorship");
    }
    if args.variant == VariantArg::JpegThenWebp && args.format.is_some() {
        ignored.push("--format is ignored with --variant jpeg-then-webp; the output is always WebP");
    }
    ignored
}

/// Turn command-line arguments into inputs, walking local directories.
fn expand_inputs(args: &[String]) -> Vec<ImageInput> {
    let mut inputs = Vec::new();
    for arg in args {
        match ImageInput::from_arg(arg) {
            ImageInput::Path(path) => inputs.extend(
                pipeline::collect_images(&[path])
                    .into_iter()
                    .map(ImageInput::Path),
            ),
            other => inputs.push(other),
        }
    }
    inputs
}

/// Output file for an input.
fn destination(input: &ImageInput, out_dir: Option<&Path>, format: TargetFormat) -> PathBuf {
    match input {
        ImageInput::Path(path) => pipeline::output_path(path, out_dir, format),
        ImageInput::Remote(id) => {
            let name = id
                .rsplit('/')
                .find(|s| !s.is_empty())
                .unwrap_or("remote");
            let dir = out_dir.unwrap_or(Path::new("."));
            pipeline::output_path(&dir.join(name), Some(dir), format)
        }
        ImageInput::Bytes(_) => pipeline::output_path(Path::new("image"), out_dir, format),
    }
}

fn success_json(label: &str, target: &Path, output: &Reencoded) -> serde_json::Value {
    let capture = output.profile.as_ref().map(|p| p.capture());
    serde_json::json!({
        "input": label,
        "output": target.display().to_string(),
        "content_type": output.format.mime_type(),
        "bytes": output.bytes.len(),
        "exif": format!("{:?}", output.exif),
        "make": capture.map(|c| c.make.clone()),
        "model": capture.map(|c| c.model.clone()),
        "timestamp": capture.map(|c| c.timestamp.clone()),
    })
}

fn error_json(label: &str, err: &exif_forge::error::Error) -> serde_json::Value {
    let mut body = err.json_body();
    body["input"] = serde_json::Value::from(label);
    body
}

/// Print the profile that was embedded, as a green table.
fn print_profile(profile: &MetadataProfile) {
    let capture = profile.capture();
    let mut table = Table::new(Tone::Generated);
    table.blank().heading("Embedded profile:");
    table
        .row("Make", &capture.make)
        .row("Model", &capture.model)
        .row("Software", &capture.software)
        .row("DateTime", &capture.timestamp)
        .row("ImageSize", &format!("{} x {}", capture.width, capture.height));

    if let Some(gps) = profile.gps() {
        for (tag, coord) in [("GPSLatitude", &gps.latitude), ("GPSLongitude", &gps.longitude)] {
            let [d, m, s] = coord.dms;
            table.row(tag, &format!("{d}° {m}' {s}\" {}", coord.reference));
        }
    }
    if let MetadataProfile::Authorship(authorship) = profile {
        table
            .row("Artist", &authorship.artist)
            .row("Copyright", &authorship.copyright);
        if let Some(ref description) = authorship.description {
            table.row("ImageDescription", description);
        }
    }
    if let Some(keywords) = profile.keywords() {
        table.row("XPKeywords", keywords);
    }

    table.rule().blank();
    println!("{}", table.render());
}

/// Print EXIF metadata for a file, organized by section.
fn print_full_exif(path: &Path) -> Result<()> {
    let bytes = std::fs::read(path)?;
    let data = exif::read_exif(&bytes)?;

    let mut table = Table::new(Tone::Plain);
    table.blank().banner("File:", &path.display().to_string());

    if data.is_empty() {
        table.note("(no EXIF metadata found)").blank();
        println!("{}", table.render());
        return Ok(());
    }

    let size = match (data.pixel_width, data.pixel_height) {
        (Some(w), Some(h)) => Some(format!("{w} x {h}")),
        _ => None,
    };
    table
        .section(
            "Camera / Device",
            &[
                ("Make", data.make.clone()),
                ("Model", data.model.clone()),
                ("Software", data.software.clone()),
            ],
        )
        .section(
            "Capture",
            &[
                ("DateTime", data.date_time.clone()),
                ("DateTimeOriginal", data.date_time_original.clone()),
                ("PixelDimensions", size),
            ],
        );
    if data.has_gps {
        table.section(
            "GPS",
            &[
                ("GPSLatitude", data.gps_latitude.map(|v| format!("{v:.6}"))),
                ("GPSLongitude", data.gps_longitude.map(|v| format!("{v:.6}"))),
            ],
        );
    }
    table.section(
        "Authorship",
        &[
            ("Artist", data.artist.clone()),
            ("Copyright", data.copyright.clone()),
            ("ImageDescription", data.description.clone()),
        ],
    );

    println!("{}", table.render());
    Ok(())
}
