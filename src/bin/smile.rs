//! Smile CLI - Command-line interface for Smile Flux
//!
//! Commands:
//! - score: Score recorded frames (batch mode)
//! - run: Score frames streamed on stdin (streaming mode)
//! - validate: Validate frame records
//! - doctor: Diagnose configuration and environment
//! - schema: Describe input and output formats

use clap::{Parser, Subcommand, ValueEnum};
use log::{debug, info};
use std::fs;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use smile_flux::source::{parse_array, parse_ndjson, FaceLandmarkSource, NdjsonFrameSource};
use smile_flux::types::{FrameRecord, ScoredFrame};
use smile_flux::{
    ComputeError, CoordinateTransform, ScorerConfig, SmileProcessor, PRODUCER_NAME,
    SCHEMA_VERSION, SMILE_FLUX_VERSION,
};

/// Smile - score smiles from facial lip landmarks
#[derive(Parser)]
#[command(name = "smile")]
#[command(version = SMILE_FLUX_VERSION)]
#[command(about = "Score smiles from lip-contour landmark frames", long_about = None)]
struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Options shared by the scoring commands
#[derive(clap::Args)]
struct ScorerArgs {
    /// Scorer configuration file (JSON)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Coordinate transform (rotated_quarter_turn, identity, mirrored_quarter_turn)
    #[arg(long)]
    transform: Option<String>,

    /// Open-mouth smile threshold
    #[arg(long)]
    threshold: Option<f64>,
}

#[derive(Subcommand)]
enum Commands {
    /// Score recorded frames (batch mode)
    Score {
        /// Input file path (use - for stdin)
        #[arg(short, long)]
        input: PathBuf,

        /// Output file path (use - for stdout)
        #[arg(short, long)]
        output: PathBuf,

        /// Input format
        #[arg(long, default_value = "ndjson")]
        input_format: InputFormat,

        /// Output format
        #[arg(long, default_value = "ndjson")]
        output_format: OutputFormat,

        /// Write a session report to this file
        #[arg(long)]
        report: Option<PathBuf>,

        #[command(flatten)]
        scorer: ScorerArgs,
    },

    /// Score frames streamed on stdin (streaming mode)
    Run {
        /// Write a session report to this file on exit (stderr if omitted)
        #[arg(long)]
        report: Option<PathBuf>,

        /// Flush output after each record (pass `--flush false` to buffer)
        #[arg(long, action = clap::ArgAction::Set, default_value_t = true)]
        flush: bool,

        #[command(flatten)]
        scorer: ScorerArgs,
    },

    /// Validate frame records
    Validate {
        /// Input file path (use - for stdin)
        #[arg(short, long)]
        input: PathBuf,

        /// Input format
        #[arg(long, default_value = "ndjson")]
        input_format: InputFormat,

        /// Output validation report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Diagnose configuration and environment
    Doctor {
        /// Check a scorer configuration file
        #[arg(long)]
        config: Option<PathBuf>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print schema information
    Schema {
        /// Schema to print (input or output)
        #[arg(value_enum)]
        schema_type: SchemaType,

        /// Output as JSON schema
        #[arg(long)]
        json_schema: bool,
    },
}

#[derive(Clone, ValueEnum)]
enum InputFormat {
    /// Newline-delimited JSON (one frame per line)
    Ndjson,
    /// JSON array of frames
    Json,
}

#[derive(Clone, ValueEnum)]
enum OutputFormat {
    /// Newline-delimited JSON (one scored frame per line)
    Ndjson,
    /// JSON array of scored frames
    Json,
    /// Pretty-printed JSON
    JsonPretty,
}

#[derive(Clone, ValueEnum)]
enum SchemaType {
    /// Input schema (smile.frame.v1)
    Input,
    /// Output schema (scored frame)
    Output,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let default_filter = if cli.verbose { "debug" } else { "warn" };
    env_logger::init_from_env(env_logger::Env::new().default_filter_or(default_filter));

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!(
                "{}",
                serde_json::to_string(&CliError::from(e))
                    .unwrap_or_else(|_| "Unknown error".to_string())
            );
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), SmileCliError> {
    match cli.command {
        Commands::Score {
            input,
            output,
            input_format,
            output_format,
            report,
            scorer,
        } => cmd_score(
            &input,
            &output,
            input_format,
            output_format,
            report.as_deref(),
            &scorer,
        ),

        Commands::Run {
            report,
            flush,
            scorer,
        } => cmd_run(report.as_deref(), flush, &scorer),

        Commands::Validate {
            input,
            input_format,
            json,
        } => cmd_validate(&input, input_format, json),

        Commands::Doctor { config, json } => cmd_doctor(config.as_deref(), json),

        Commands::Schema {
            schema_type,
            json_schema,
        } => cmd_schema(schema_type, json_schema),
    }
}

/// Resolve the scorer config: file first, then flag overrides
fn build_config(args: &ScorerArgs) -> Result<ScorerConfig, SmileCliError> {
    let mut config = match &args.config {
        Some(path) => {
            debug!("Loading scorer config from {}", path.display());
            ScorerConfig::from_file(path)?
        }
        None => ScorerConfig::default(),
    };

    if let Some(name) = &args.transform {
        config = config.with_transform(CoordinateTransform::from_name(name)?);
    }
    if let Some(threshold) = args.threshold {
        config = config.with_threshold(threshold);
    }

    config.validate()?;
    Ok(config)
}

fn read_input(input: &Path) -> Result<String, SmileCliError> {
    if input.to_string_lossy() == "-" {
        let mut buffer = String::new();
        io::stdin().read_to_string(&mut buffer)?;
        Ok(buffer)
    } else {
        Ok(fs::read_to_string(input)?)
    }
}

fn parse_frames(data: &str, format: &InputFormat) -> Result<Vec<FrameRecord>, SmileCliError> {
    let frames = match format {
        InputFormat::Ndjson => parse_ndjson(data)?,
        InputFormat::Json => parse_array(data)?,
    };
    Ok(frames)
}

fn cmd_score(
    input: &Path,
    output: &Path,
    input_format: InputFormat,
    output_format: OutputFormat,
    report: Option<&Path>,
    scorer_args: &ScorerArgs,
) -> Result<(), SmileCliError> {
    let config = build_config(scorer_args)?;
    let mut processor = SmileProcessor::with_config(config)?;

    let frames = parse_frames(&read_input(input)?, &input_format)?;
    if frames.is_empty() {
        return Err(SmileCliError::NoFrames);
    }

    let mut scored = Vec::with_capacity(frames.len());
    for frame in frames {
        scored.push(processor.process_frame(frame)?);
    }
    info!("Scored {} frames", scored.len());

    let output_data = format_output(&scored, &output_format)?;
    if output.to_string_lossy() == "-" {
        print!("{}", output_data);
    } else {
        fs::write(output, output_data)?;
    }

    if let Some(report_path) = report {
        fs::write(report_path, processor.report_json()?)?;
    }

    Ok(())
}

fn cmd_run(
    report: Option<&Path>,
    flush: bool,
    scorer_args: &ScorerArgs,
) -> Result<(), SmileCliError> {
    let config = build_config(scorer_args)?;
    let mut processor = SmileProcessor::with_config(config)?;

    let stdin = io::stdin();
    let mut source = NdjsonFrameSource::new(stdin.lock());
    let mut stdout = io::stdout();

    while let Some(frame) = source.next_frame() {
        let scored = processor.process_frame(frame?)?;

        writeln!(stdout, "{}", serde_json::to_string(&scored)?)?;
        if flush {
            stdout.flush()?;
        }
    }
    stdout.flush()?;

    let report_json = processor.report_json()?;
    match report {
        Some(path) => fs::write(path, report_json)?,
        None => eprintln!("{}", report_json),
    }

    Ok(())
}

fn cmd_validate(input: &Path, input_format: InputFormat, json: bool) -> Result<(), SmileCliError> {
    let frames = parse_frames(&read_input(input)?, &input_format)?;

    let errors: Vec<ValidationErrorDetail> = frames
        .iter()
        .enumerate()
        .filter_map(|(index, frame)| {
            frame.validate().err().map(|e| ValidationErrorDetail {
                index,
                frame_index: frame.frame_index,
                error: e.to_string(),
            })
        })
        .collect();

    let report = ValidationReport {
        total_frames: frames.len(),
        valid_frames: frames.len() - errors.len(),
        invalid_frames: errors.len(),
        errors,
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("Validation Report");
        println!("=================");
        println!("Total frames:   {}", report.total_frames);
        println!("Valid frames:   {}", report.valid_frames);
        println!("Invalid frames: {}", report.invalid_frames);

        if !report.errors.is_empty() {
            println!("\nErrors:");
            for err in &report.errors {
                let frame = err
                    .frame_index
                    .map(|i| i.to_string())
                    .unwrap_or_else(|| "unknown".to_string());
                println!("  - Frame {} (index {}): {}", frame, err.index, err.error);
            }
        }
    }

    if report.invalid_frames > 0 {
        Err(SmileCliError::ValidationFailed(report.invalid_frames))
    } else {
        Ok(())
    }
}

fn cmd_doctor(config: Option<&Path>, json: bool) -> Result<(), SmileCliError> {
    let mut checks: Vec<DoctorCheck> = vec![
        DoctorCheck {
            name: "version".to_string(),
            status: CheckStatus::Ok,
            message: format!("smile-flux version {}", SMILE_FLUX_VERSION),
        },
        DoctorCheck {
            name: "schema_version".to_string(),
            status: CheckStatus::Ok,
            message: format!("Input schema: {}", SCHEMA_VERSION),
        },
    ];

    if let Some(config_path) = config {
        let check = if !config_path.exists() {
            DoctorCheck {
                name: "config".to_string(),
                status: CheckStatus::Warning,
                message: "Config file does not exist".to_string(),
            }
        } else {
            match ScorerConfig::from_file(config_path) {
                Ok(cfg) => DoctorCheck {
                    name: "config".to_string(),
                    status: CheckStatus::Ok,
                    message: format!(
                        "Config valid (transform {}, threshold {}, needs {} lip points)",
                        cfg.transform.name(),
                        cfg.smile_threshold,
                        cfg.min_points()
                    ),
                },
                Err(e) => DoctorCheck {
                    name: "config".to_string(),
                    status: CheckStatus::Error,
                    message: format!("Invalid config: {}", e),
                },
            }
        };
        checks.push(check);
    }

    let stdin_message = if atty::is(atty::Stream::Stdin) {
        "stdin is a TTY (interactive mode)"
    } else {
        "stdin is a pipe (streaming mode ready)"
    };
    checks.push(DoctorCheck {
        name: "stdin".to_string(),
        status: CheckStatus::Ok,
        message: stdin_message.to_string(),
    });

    let report = DoctorReport {
        producer: PRODUCER_NAME.to_string(),
        version: SMILE_FLUX_VERSION.to_string(),
        checks,
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("Smile Doctor Report");
        println!("===================");
        println!("Producer: {}", report.producer);
        println!("Version:  {}", report.version);
        println!("\nChecks:");

        for check in &report.checks {
            let status_icon = match check.status {
                CheckStatus::Ok => "[OK]",
                CheckStatus::Warning => "[WARN]",
                CheckStatus::Error => "[ERR]",
            };
            println!("  {} {}: {}", status_icon, check.name, check.message);
        }
    }

    let has_errors = report
        .checks
        .iter()
        .any(|c| matches!(c.status, CheckStatus::Error));
    if has_errors {
        Err(SmileCliError::DoctorFailed)
    } else {
        Ok(())
    }
}

fn cmd_schema(schema_type: SchemaType, json_schema: bool) -> Result<(), SmileCliError> {
    match schema_type {
        SchemaType::Input => {
            if json_schema {
                println!("{}", get_input_json_schema());
            } else {
                println!("Input Schema: {}", SCHEMA_VERSION);
                println!();
                println!("One record per video frame:");
                println!("- schema_version: \"{}\" (optional)", SCHEMA_VERSION);
                println!("- frame_index: integer (optional, assigned sequentially if absent)");
                println!("- timestamp: RFC 3339 (optional)");
                println!("- sample: omitted when no face was detected, otherwise");
                println!("  - points: outer-lip contour, normalized {{ x, y }} in 0-1");
                println!("  - face_bounding_box: {{ x, y, width, height }} in preview space");
                println!();
                println!("The default landmark layout reads contour points 3 (top), 7 (right");
                println!("corner), 10 (bottom) and 13 (left corner); shorter contours are skipped.");
            }
        }
        SchemaType::Output => {
            if json_schema {
                println!("{}", get_output_json_schema());
            } else {
                println!("Output: one scored frame per input frame");
                println!();
                println!("- frame_index, timestamp");
                println!("- result: {{ is_smiling, score (0-100, only while smiling) }} or null");
                println!("- skipped: no_face | insufficient_landmarks | degenerate_geometry");
                println!("- geometry: {{ average_y, height, difference, ratio }}");
                println!();
                println!("A null result means the display should keep what it shows.");
            }
        }
    }

    Ok(())
}

// Helper functions

fn format_output(scored: &[ScoredFrame], format: &OutputFormat) -> Result<String, SmileCliError> {
    match format {
        OutputFormat::Ndjson => {
            let mut lines: Vec<String> = Vec::with_capacity(scored.len());
            for frame in scored {
                lines.push(serde_json::to_string(frame)?);
            }
            Ok(lines.join("\n") + "\n")
        }
        OutputFormat::Json => Ok(serde_json::to_string(scored)?),
        OutputFormat::JsonPretty => Ok(serde_json::to_string_pretty(scored)?),
    }
}

fn get_input_json_schema() -> String {
    let point = serde_json::json!({
        "type": "object",
        "required": ["x", "y"],
        "properties": {
            "x": { "type": "number" },
            "y": { "type": "number" }
        }
    });

    serde_json::json!({
        "$schema": "https://json-schema.org/draft/2020-12/schema",
        "title": SCHEMA_VERSION,
        "description": "One video frame of outer-lip landmarks",
        "type": "object",
        "properties": {
            "schema_version": { "type": "string", "const": SCHEMA_VERSION },
            "frame_index": { "type": "integer", "minimum": 0 },
            "timestamp": { "type": "string", "format": "date-time" },
            "sample": {
                "type": "object",
                "required": ["points", "face_bounding_box"],
                "properties": {
                    "points": { "type": "array", "items": point },
                    "face_bounding_box": {
                        "type": "object",
                        "required": ["x", "y", "width", "height"],
                        "properties": {
                            "x": { "type": "number" },
                            "y": { "type": "number" },
                            "width": { "type": "number", "exclusiveMinimum": 0 },
                            "height": { "type": "number", "exclusiveMinimum": 0 }
                        }
                    }
                }
            }
        }
    })
    .to_string()
}

fn get_output_json_schema() -> String {
    serde_json::json!({
        "$schema": "https://json-schema.org/draft/2020-12/schema",
        "title": "smile.scored_frame.v1",
        "type": "object",
        "required": ["frame_index", "result"],
        "properties": {
            "frame_index": { "type": "integer" },
            "timestamp": { "type": "string", "format": "date-time" },
            "result": {
                "type": ["object", "null"],
                "required": ["is_smiling"],
                "properties": {
                    "is_smiling": { "type": "boolean" },
                    "score": { "type": "integer", "minimum": 0, "maximum": 100 }
                }
            },
            "skipped": {
                "type": "string",
                "enum": ["no_face", "insufficient_landmarks", "degenerate_geometry"]
            },
            "geometry": {
                "type": "object",
                "properties": {
                    "average_y": { "type": "number" },
                    "height": { "type": "number" },
                    "difference": { "type": "number" },
                    "ratio": { "type": "number" }
                }
            }
        }
    })
    .to_string()
}

// Error types

#[derive(Debug)]
enum SmileCliError {
    Io(io::Error),
    Compute(ComputeError),
    Json(serde_json::Error),
    NoFrames,
    ValidationFailed(usize),
    DoctorFailed,
}

impl From<io::Error> for SmileCliError {
    fn from(e: io::Error) -> Self {
        SmileCliError::Io(e)
    }
}

impl From<ComputeError> for SmileCliError {
    fn from(e: ComputeError) -> Self {
        SmileCliError::Compute(e)
    }
}

impl From<serde_json::Error> for SmileCliError {
    fn from(e: serde_json::Error) -> Self {
        SmileCliError::Json(e)
    }
}

#[derive(serde::Serialize)]
struct CliError {
    code: String,
    message: String,
    hint: Option<String>,
}

impl From<SmileCliError> for CliError {
    fn from(e: SmileCliError) -> Self {
        match e {
            SmileCliError::Io(e) => CliError {
                code: "IO_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Check file paths and permissions".to_string()),
            },
            SmileCliError::Compute(ComputeError::InvalidConfig(msg)) => CliError {
                code: "CONFIG_ERROR".to_string(),
                message: msg,
                hint: Some("Run 'smile doctor --config <file>' for details".to_string()),
            },
            SmileCliError::Compute(ComputeError::InvalidFrame(e)) => CliError {
                code: "VALIDATION_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Run 'smile validate' for details".to_string()),
            },
            SmileCliError::Compute(e) => CliError {
                code: "PARSE_ERROR".to_string(),
                message: e.to_string(),
                hint: Some(format!("Ensure input matches the {} schema", SCHEMA_VERSION)),
            },
            SmileCliError::Json(e) => CliError {
                code: "JSON_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Check JSON syntax".to_string()),
            },
            SmileCliError::NoFrames => CliError {
                code: "NO_FRAMES".to_string(),
                message: "No frames found in input".to_string(),
                hint: Some("Ensure input file is not empty".to_string()),
            },
            SmileCliError::ValidationFailed(count) => CliError {
                code: "VALIDATION_FAILED".to_string(),
                message: format!("{} frames failed validation", count),
                hint: Some("Fix validation errors and retry".to_string()),
            },
            SmileCliError::DoctorFailed => CliError {
                code: "DOCTOR_FAILED".to_string(),
                message: "One or more health checks failed".to_string(),
                hint: Some("Review the doctor report for details".to_string()),
            },
        }
    }
}

// Report types

#[derive(serde::Serialize)]
struct ValidationReport {
    total_frames: usize,
    valid_frames: usize,
    invalid_frames: usize,
    errors: Vec<ValidationErrorDetail>,
}

#[derive(serde::Serialize)]
struct ValidationErrorDetail {
    index: usize,
    frame_index: Option<u64>,
    error: String,
}

#[derive(serde::Serialize)]
struct DoctorReport {
    producer: String,
    version: String,
    checks: Vec<DoctorCheck>,
}

#[derive(serde::Serialize)]
struct DoctorCheck {
    name: String,
    status: CheckStatus,
    message: String,
}

#[derive(serde::Serialize)]
enum CheckStatus {
    Ok,
    Warning,
    Error,
}
