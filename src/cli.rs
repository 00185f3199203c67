// ============================================================================
// Screen2FE CLI: headless batch processing via command-line arguments
// ============================================================================
//
// Usage examples:
//   screen2fe --script title.rhai --output title.s2e          (blank screen)
//   screen2fe -i title.s2e -o title.bmp                       (format from ext)
//   screen2fe -i "shots/*.png" --output-dir fixed/ --format s2e
//   screen2fe -i title.s2e --check                            (lint only)
//
// Everything runs synchronously on the current thread.

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Instant;

use clap::Parser;

use crate::canvas::is_valid_color;
use crate::io::{SaveFormat, open_project, save_project};
use crate::ops::scripting::execute_script_sync;
use crate::project::Project;
use crate::settings::AppSettings;

// ============================================================================
// CLI argument definition (clap Derive)
// ============================================================================

/// Screen2FE headless screen processor.
///
/// Draw on MSX SCREEN 2 images with Rhai scripts and convert between formats.
#[derive(Parser, Debug)]
#[command(
    name = "screen2fe",
    about = "Screen2FE headless SCREEN 2 processor",
    long_about = "Run Rhai scripts on 256x192 MSX SCREEN 2 screens and convert between\n\
                  PNG, BMP and S2E snapshots. Imported images are mapped to the MSX\n\
                  palette and repaired to two colours per 8-pixel segment.\n\n\
                  Example:\n  \
                  screen2fe --script title.rhai --output title.s2e\n  \
                  screen2fe -i \"*.png\" --output-dir out/ --format s2e"
)]
pub struct CliArgs {
    /// Input file(s). Glob patterns accepted (e.g. "*.png", "screens/*.s2e").
    /// Without input a blank screen is processed.
    #[arg(short, long, num_args = 1..)]
    pub input: Vec<String>,

    /// Rhai script file to execute on each screen.
    #[arg(short, long, value_name = "SCRIPT.rhai")]
    pub script: Option<PathBuf>,

    /// Output file path. Only valid for single-file input.
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Output directory for batch processing.
    #[arg(long, value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Output format: png, bmp, s2e.
    /// When omitted, the format is inferred from --output's extension, defaulting to png.
    #[arg(short, long, value_name = "FORMAT")]
    pub format: Option<String>,

    /// Colour index (0-15) a blank screen is cleared to.
    #[arg(long, value_name = "0-15")]
    pub background: Option<u8>,

    /// Fail when a result still holds colour-clash violations.
    #[arg(long)]
    pub check: bool,

    /// Print script console output and per-file timing information.
    #[arg(short, long)]
    pub verbose: bool,
}

/// What one job produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobReport {
    pub output: Option<PathBuf>,
    pub violations: usize,
    pub console_output: Vec<String>,
}

// ============================================================================
// Public entry point
// ============================================================================

/// Run all CLI processing and return an OS exit code.
/// `0` = all screens succeeded, `1` = one or more failed.
pub fn run(args: CliArgs) -> ExitCode {
    let mut settings = AppSettings::load();
    if let Some(bg) = args.background {
        if !is_valid_color(bg) {
            eprintln!("error: --background must be a colour index 0-15, got {}.", bg);
            return ExitCode::FAILURE;
        }
        settings.background_color = bg;
    }
    crate::logger::write_section("Settings", &settings.log_entries());

    // Resolve glob patterns / literal paths. `None` stands for the blank screen.
    let inputs: Vec<Option<PathBuf>> = if args.input.is_empty() {
        vec![None]
    } else {
        let resolved = resolve_inputs(&args.input);
        if resolved.is_empty() {
            eprintln!("error: no input files matched the given pattern(s).");
            return ExitCode::FAILURE;
        }
        resolved.into_iter().map(Some).collect()
    };

    if inputs.len() > 1 && args.output.is_some() && args.output_dir.is_none() {
        eprintln!(
            "error: {} input files given but --output only accepts a single file path.\n\
             Use --output-dir to specify a destination directory for batch processing.",
            inputs.len()
        );
        return ExitCode::FAILURE;
    }

    let save_format = match parse_format(args.format.as_deref(), args.output.as_deref()) {
        Ok(f) => f,
        Err(e) => {
            eprintln!("error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let script_source: Option<String> = match &args.script {
        Some(path) => match std::fs::read_to_string(path) {
            Ok(src) => Some(src),
            Err(e) => {
                eprintln!("error: could not read script '{}': {}", path.display(), e);
                return ExitCode::FAILURE;
            }
        },
        None => None,
    };

    if let Some(dir) = &args.output_dir
        && let Err(e) = std::fs::create_dir_all(dir)
    {
        eprintln!(
            "error: could not create output directory '{}': {}",
            dir.display(),
            e
        );
        return ExitCode::FAILURE;
    }

    // A pure lint run (--check on existing files, nothing else) writes nothing.
    let lint_only = args.check
        && script_source.is_none()
        && args.output.is_none()
        && args.output_dir.is_none()
        && args.format.is_none()
        && !args.input.is_empty();

    let total = inputs.len();
    let multi = total > 1;
    let mut any_failure = false;

    for (idx, input) in inputs.iter().enumerate() {
        let label = input
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "<blank>".to_string());
        if multi || args.verbose {
            println!("[{}/{}] {}", idx + 1, total, label);
        }
        let file_start = Instant::now();

        let output_path = if lint_only {
            None
        } else {
            match build_output_path(
                input.as_deref(),
                args.output.as_deref(),
                args.output_dir.as_deref(),
                save_format,
            ) {
                Some(p) => Some(p),
                None => {
                    eprintln!("  error: cannot determine output path for '{}'.", label);
                    any_failure = true;
                    continue;
                }
            }
        };

        match run_one(
            input.as_deref(),
            output_path.as_deref(),
            script_source.as_deref(),
            save_format,
            &settings,
        ) {
            Ok(report) => {
                if args.verbose {
                    for line in &report.console_output {
                        println!("  [script] {}", line);
                    }
                }
                if report.violations > 0 {
                    let msg = format!("{} colour-clash violations remain", report.violations);
                    if args.check {
                        eprintln!("  error: {}", msg);
                        any_failure = true;
                    } else if args.verbose {
                        println!("  warning: {}", msg);
                    }
                }
                if let Some(out) = &report.output
                    && (args.verbose || multi)
                {
                    println!(
                        "  -> {} ({:.0}ms)",
                        out.display(),
                        file_start.elapsed().as_secs_f64() * 1000.0
                    );
                }
            }
            Err(e) => {
                log_err!("{}: {}", label, e);
                eprintln!("  error: {}", e);
                any_failure = true;
            }
        }
    }

    if any_failure { ExitCode::FAILURE } else { ExitCode::SUCCESS }
}

// ============================================================================
// Per-screen processing pipeline
// ============================================================================

/// Load (or create), script, and save one screen.
pub fn run_one(
    input:    Option<&Path>,
    output:   Option<&Path>,
    script:   Option<&str>,
    format:   SaveFormat,
    settings: &AppSettings,
) -> Result<JobReport, String> {
    // -- Step 1: Load ----------------------------------------------------
    let mut project = match input {
        Some(path) => open_project(path, settings.new_controller())
            .map_err(|e| format!("load failed: {}", e))?,
        None => Project::new_untitled(1, settings.background_color, settings.new_controller()),
    };

    // -- Step 2: Apply script (optional) ---------------------------------
    let mut console_output = Vec::new();
    if let Some(src) = script {
        let (scripted, output_lines) = execute_script_sync(src, project)
            .map_err(|e| format!("script error: {}", e.friendly_message()))?;
        project = scripted;
        console_output = output_lines;
    }

    let violations = project.buffer().violations().len();

    // -- Step 3: Save ----------------------------------------------------
    if let Some(out) = output {
        save_project(&mut project, out, format).map_err(|e| format!("save failed: {}", e))?;
    }

    Ok(JobReport {
        output: output.map(Path::to_path_buf),
        violations,
        console_output,
    })
}

// ============================================================================
// Helpers
// ============================================================================

/// Expand glob patterns and literal paths into a deduplicated, ordered list.
fn resolve_inputs(patterns: &[String]) -> Vec<PathBuf> {
    let mut result: Vec<PathBuf> = Vec::new();

    for pattern in patterns {
        let as_path = Path::new(pattern);

        if as_path.exists() {
            if !result.iter().any(|p| p.as_path() == as_path) {
                result.push(as_path.to_path_buf());
            }
            continue;
        }

        match glob::glob(pattern) {
            Ok(entries) => {
                let mut matched = false;
                for entry in entries.flatten() {
                    if !result.contains(&entry) {
                        result.push(entry);
                    }
                    matched = true;
                }
                if !matched {
                    eprintln!("warning: pattern '{}' matched no files.", pattern);
                }
            }
            Err(e) => {
                eprintln!("warning: invalid glob '{}': {}", pattern, e);
            }
        }
    }

    result
}

/// Choose the [`SaveFormat`] from the `--format` string or infer it from the
/// output file extension. Defaults to PNG when no output extension is known.
fn parse_format(format_arg: Option<&str>, output: Option<&Path>) -> Result<SaveFormat, String> {
    if let Some(f) = format_arg {
        return SaveFormat::from_name(f)
            .ok_or_else(|| format!("unknown format '{}' (expected png, bmp or s2e)", f));
    }
    Ok(output
        .and_then(SaveFormat::from_path)
        .unwrap_or(SaveFormat::Png))
}

/// Compute the output path for one screen.
///
/// Priority:
/// 1. `--output` (explicit path, used for single-file input)
/// 2. `--output-dir` (batch directory, derives filename from input stem)
/// 3. Fallback: same directory as input, same stem, new extension
///    (appends `_out` to stem if it would collide with the input path)
///
/// A blank screen is named `untitled`.
fn build_output_path(
    input:      Option<&Path>,
    output:     Option<&Path>,
    output_dir: Option<&Path>,
    format:     SaveFormat,
) -> Option<PathBuf> {
    if let Some(out) = output {
        return Some(out.to_path_buf());
    }

    let ext = format.extension();
    let stem = match input {
        Some(path) => path.file_stem()?.to_string_lossy().into_owned(),
        None => "untitled".to_string(),
    };

    if let Some(dir) = output_dir {
        return Some(dir.join(format!("{}.{}", stem, ext)));
    }

    let parent = input
        .and_then(Path::parent)
        .unwrap_or(Path::new("."));
    let candidate = parent.join(format!("{}.{}", stem, ext));

    // Avoid silent overwrite of the input
    if Some(candidate.as_path()) == input {
        Some(parent.join(format!("{}_out.{}", stem, ext)))
    } else {
        Some(candidate)
    }
}
