// ============================================================================
// GenFE CLI — headless generation via command-line arguments
// ============================================================================
//
// Usage examples:
//   genfe --prompt "a lighthouse at dusk" --output out.png
//   genfe --prompt "a red fox" --aspect 16:9 --negative "blurry, text"
//   genfe --prompt "studio portrait" --image face.jpg --image style.png
//
// No GUI is opened in CLI mode. The API call runs synchronously on the
// current thread and the result is written to --output (or a generated
// file name in the current directory).

use std::path::PathBuf;
use std::time::Instant;

use clap::Parser;

use crate::api::GeminiClient;
use crate::api::types::AspectRatio;
use crate::io;

// ============================================================================
// CLI argument definition (clap Derive)
// ============================================================================

/// GenFE headless image generator.
///
/// Generate an image from a text prompt without opening the GUI. Requires
/// the GEMINI_API_KEY environment variable.
#[derive(Parser, Debug)]
#[command(
    name = "genfe",
    about = "GenFE headless image generator",
    long_about = "Generate an image from a text prompt without opening the GUI.\n\
                  Requires the GEMINI_API_KEY environment variable.\n\n\
                  Example:\n  \
                  genfe --prompt \"a lighthouse at dusk\" --output out.png\n  \
                  genfe --prompt \"a red fox\" --aspect 16:9 --negative \"blurry, text\""
)]
pub struct CliArgs {
    /// Text prompt to generate from.
    #[arg(short, long, required = true)]
    pub prompt: String,

    /// Aspect ratio: 1:1, 16:9, or 9:16 (default 9:16).
    /// Ignored when reference images are supplied.
    #[arg(short, long, value_name = "RATIO")]
    pub aspect: Option<String>,

    /// Negative prompt: things to exclude from the result.
    /// Ignored when reference images are supplied.
    #[arg(short, long, value_name = "TEXT")]
    pub negative: Option<String>,

    /// Reference image(s): a style image and up to two subject images,
    /// in that order. PNG, JPEG, WEBP, and BMP are accepted.
    #[arg(short, long, value_name = "FILE", num_args = 1..)]
    pub image: Vec<PathBuf>,

    /// Output file path. When omitted, a timestamped name is written to
    /// the current directory.
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Print timing information.
    #[arg(short, long)]
    pub verbose: bool,
}

impl CliArgs {
    /// Returns `true` when the CLI-mode flag is present in the real process
    /// arguments. Used by `main()` to route before creating an eframe window.
    pub fn is_cli_mode() -> bool {
        std::env::args().any(|a| a == "--prompt" || a == "-p")
    }
}

// ============================================================================
// Public entry point
// ============================================================================

/// Run the headless generation and return an OS exit code.
/// `0` = success, `1` = failure.
pub fn run(args: CliArgs) -> i32 {
    match run_inner(args) {
        Ok(path) => {
            println!("wrote {}", path.display());
            0
        }
        Err(msg) => {
            eprintln!("error: {msg}");
            1
        }
    }
}

fn run_inner(args: CliArgs) -> Result<PathBuf, String> {
    let aspect = match args.aspect.as_deref() {
        None => AspectRatio::default(),
        Some(s) => AspectRatio::ALL
            .into_iter()
            .find(|a| a.as_str() == s)
            .ok_or_else(|| format!("unknown aspect ratio '{s}' (expected 1:1, 16:9, or 9:16)"))?,
    };

    let mut images = Vec::new();
    for path in &args.image {
        let source = io::load_source_image(path)
            .map_err(|e| format!("could not load {}: {e}", path.display()))?;
        images.push(source.encoded);
    }

    // reference images put the model in editing mode; the aspect clause and
    // negative prompt do not apply there
    let negative = if images.is_empty() {
        args.negative.as_deref().filter(|n| !n.trim().is_empty())
    } else {
        None
    };

    let client = GeminiClient::from_env().map_err(|e| e.user_message())?;
    let started = Instant::now();
    let inline = client
        .generate(&args.prompt, &images, aspect, negative)
        .map_err(|e| e.user_message())?;
    if args.verbose {
        eprintln!("generation took {:.1}s", started.elapsed().as_secs_f32());
    }

    let path = args
        .output
        .unwrap_or_else(|| PathBuf::from(io::download_file_name(&inline.mime_type)));
    io::save_inline_to(&path, &inline)?;
    Ok(path)
}
