// ABOUTME: CLI binary for the Iris post extractor.
// ABOUTME: Extracts canonical posts from saved payloads, lists post links, or decodes short ids.

use std::fs;
use std::io::{self, Read};
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use digests_iris::shortcode::decode_to_string;
use digests_iris::{
    canonicalize, extract_post_links, CanonicalPost, Extractor, Payload, PayloadShapes,
};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "iris")]
#[command(about = "Extract canonical post records from saved page payloads")]
struct Args {
    /// Page URL used to recover the short id (single target only)
    #[arg(long = "url")]
    url: Option<String>,

    /// JSON file replacing the built-in payload shape tables
    #[arg(long = "shapes")]
    shapes: Option<PathBuf>,

    /// Nesting bound for key searches
    #[arg(long = "max-depth")]
    max_depth: Option<usize>,

    /// Treat targets as free text and print canonical post links
    #[arg(long = "links", conflicts_with = "media_id")]
    links: bool,

    /// Treat targets as short ids or post links and print numeric media ids
    #[arg(long = "media-id")]
    media_id: bool,

    /// Print JSON on a single line
    #[arg(long = "compact")]
    compact: bool,

    /// Output file path (default: stdout)
    #[arg(short = 'o', long = "output")]
    output: Option<PathBuf>,

    /// Log strategy decisions to stderr
    #[arg(short = 'v', long = "verbose")]
    verbose: bool,

    /// Payload files to read, or - for stdin
    #[arg()]
    targets: Vec<String>,
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn read_target(target: &str) -> anyhow::Result<Vec<u8>> {
    if target == "-" {
        let mut buf = Vec::new();
        io::stdin()
            .read_to_end(&mut buf)
            .context("reading stdin")?;
        return Ok(buf);
    }
    fs::read(target).with_context(|| format!("reading {}", target))
}

fn build_extractor(args: &Args) -> anyhow::Result<Extractor> {
    let mut builder = Extractor::builder();
    if let Some(path) = &args.shapes {
        let json = fs::read_to_string(path)
            .with_context(|| format!("reading shapes {}", path.display()))?;
        builder = builder.shapes(PayloadShapes::from_json(&json)?);
    }
    if let Some(depth) = args.max_depth {
        builder = builder.max_search_depth(depth);
    }
    Ok(builder.build())
}

fn extract_target(
    extractor: &Extractor,
    target: &str,
    url: Option<&str>,
) -> anyhow::Result<CanonicalPost> {
    let bytes = read_target(target)?;
    let payload = Payload::from_bytes(&bytes, None)?;
    Ok(extractor.extract(&payload, url)?)
}

fn media_id_for(target: &str) -> anyhow::Result<String> {
    let short_id = match canonicalize(target) {
        Ok(link) => link.short_id,
        Err(_) => target.trim().to_string(),
    };
    Ok(decode_to_string(&short_id)?)
}

fn format_posts(posts: &[CanonicalPost], compact: bool) -> anyhow::Result<String> {
    let out = match (posts, compact) {
        ([post], true) => serde_json::to_string(post)?,
        ([post], false) => serde_json::to_string_pretty(post)?,
        (_, true) => serde_json::to_string(posts)?,
        (_, false) => serde_json::to_string_pretty(posts)?,
    };
    Ok(out)
}

fn main() -> ExitCode {
    let args = Args::parse();
    init_tracing(args.verbose);

    if args.targets.is_empty() {
        eprintln!("error: at least one target is required");
        return ExitCode::from(1);
    }
    if args.url.is_some() && args.targets.len() > 1 {
        eprintln!("error: --url applies to a single target");
        return ExitCode::from(1);
    }

    let mut had_error = false;
    let mut lines: Vec<String> = Vec::new();

    if args.media_id {
        for target in &args.targets {
            match media_id_for(target) {
                Ok(id) => lines.push(id),
                Err(e) => {
                    eprintln!("error decoding {}: {:#}", target, e);
                    had_error = true;
                }
            }
        }
    } else if args.links {
        for target in &args.targets {
            match read_target(target) {
                Ok(bytes) => {
                    let text = String::from_utf8_lossy(&bytes);
                    lines.extend(extract_post_links(&text).into_iter().map(|l| l.canonical_url));
                }
                Err(e) => {
                    eprintln!("error: {:#}", e);
                    had_error = true;
                }
            }
        }
    } else {
        let extractor = match build_extractor(&args) {
            Ok(extractor) => extractor,
            Err(e) => {
                eprintln!("error: {:#}", e);
                return ExitCode::from(1);
            }
        };

        let mut posts = Vec::new();
        for target in &args.targets {
            match extract_target(&extractor, target, args.url.as_deref()) {
                Ok(post) => posts.push(post),
                Err(e) => {
                    eprintln!("error extracting {}: {:#}", target, e);
                    had_error = true;
                }
            }
        }
        if !posts.is_empty() {
            match format_posts(&posts, args.compact) {
                Ok(out) => lines.push(out),
                Err(e) => {
                    eprintln!("error: {:#}", e);
                    had_error = true;
                }
            }
        }
    }

    if !lines.is_empty() {
        let output = lines.join("\n");
        if let Some(path) = &args.output {
            if let Err(e) = fs::write(path, format!("{}\n", output)) {
                eprintln!("error writing to {:?}: {}", path, e);
                had_error = true;
            }
        } else {
            println!("{}", output);
        }
    }

    if had_error {
        ExitCode::from(1)
    } else {
        ExitCode::SUCCESS
    }
}
