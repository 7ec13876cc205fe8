//! microexpr CLI - Command-line interface for microexpr
//!
//! Commands:
//! - analyze: Process landmark frames into analysis records (batch mode)
//! - run: Process streaming frames from stdin (streaming mode)
//! - validate: Validate landmark frame schema
//! - doctor: Diagnose configuration and session files
//! - schema: Print input/output contracts

use clap::{Parser, Subcommand, ValueEnum};
use log::{debug, info};
use std::fs;
use std::io::{self, BufRead, Read, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use microexpr::schema::{FrameAdapter, FrameRecord, SCHEMA_VERSION};
use microexpr::types::AnalysisRecord;
use microexpr::{AnalyzerConfig, AnalyzerError, SessionContext, StressProcessor};
use microexpr::{PRODUCER_NAME, VERSION};

/// microexpr - Facial micro-expression stress analyzer
#[derive(Parser)]
#[command(name = "microexpr")]
#[command(version = VERSION)]
#[command(about = "Turn face landmark streams into a stress indicator", long_about = None)]
struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze landmark frames (batch mode)
    Analyze {
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

        /// Analyzer configuration file (JSON)
        #[arg(long)]
        config: Option<PathBuf>,

        /// Resume a session saved with --save-session
        #[arg(long)]
        load_session: Option<PathBuf>,

        /// Save session state to file after processing
        #[arg(long)]
        save_session: Option<PathBuf>,
    },

    /// Analyze frames streamed on stdin, one per line (streaming mode)
    Run {
        /// Output format
        #[arg(long, default_value = "ndjson")]
        output_format: OutputFormat,

        /// Analyzer configuration file (JSON)
        #[arg(long)]
        config: Option<PathBuf>,

        /// Resume a session saved with --save-session
        #[arg(long)]
        load_session: Option<PathBuf>,

        /// Save session state to file on exit
        #[arg(long)]
        save_session: Option<PathBuf>,

        /// Flush output after each record
        #[arg(long, default_value = "true")]
        flush: bool,
    },

    /// Validate landmark frame schema
    Validate {
        /// Input file path (use - for stdin)
        #[arg(short, long)]
        input: PathBuf,

        /// Input format
        #[arg(long, default_value = "ndjson")]
        input_format: InputFormat,

        /// Analyzer configuration file, for a non-default topology
        #[arg(long)]
        config: Option<PathBuf>,

        /// Output validation report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Diagnose configuration and session files
    Doctor {
        /// Check a configuration file
        #[arg(long)]
        config: Option<PathBuf>,

        /// Check a saved session file
        #[arg(long)]
        session: Option<PathBuf>,

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
    /// Newline-delimited JSON (one record per line)
    Ndjson,
    /// JSON array of records
    Json,
    /// Pretty-printed JSON
    JsonPretty,
    /// Human-readable dashboard lines
    Text,
}

#[derive(Clone, ValueEnum)]
enum SchemaType {
    /// Input schema (face.landmark_frame.v1)
    Input,
    /// Output schema (analysis record)
    Output,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let level = if cli.verbose { "debug" } else { "info" };
    env_logger::init_from_env(env_logger::Env::new().default_filter_or(level));

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

fn run(cli: Cli) -> Result<(), MicroexprCliError> {
    let verbose = cli.verbose;
    match cli.command {
        Commands::Analyze {
            input,
            output,
            input_format,
            output_format,
            config,
            load_session,
            save_session,
        } => cmd_analyze(
            &input,
            &output,
            input_format,
            output_format,
            config.as_deref(),
            load_session.as_deref(),
            save_session.as_deref(),
            verbose,
        ),

        Commands::Run {
            output_format,
            config,
            load_session,
            save_session,
            flush,
        } => cmd_run(
            output_format,
            config.as_deref(),
            load_session.as_deref(),
            save_session.as_deref(),
            flush,
            verbose,
        ),

        Commands::Validate {
            input,
            input_format,
            config,
            json,
        } => cmd_validate(&input, input_format, config.as_deref(), json),

        Commands::Doctor {
            config,
            session,
            json,
        } => cmd_doctor(config.as_deref(), session.as_deref(), json),

        Commands::Schema {
            schema_type,
            json_schema,
        } => cmd_schema(schema_type, json_schema),
    }
}

#[allow(clippy::too_many_arguments)]
fn cmd_analyze(
    input: &Path,
    output: &Path,
    input_format: InputFormat,
    output_format: OutputFormat,
    config: Option<&Path>,
    load_session: Option<&Path>,
    save_session: Option<&Path>,
    verbose: bool,
) -> Result<(), MicroexprCliError> {
    let input_data = read_input(input)?;
    let frames = parse_frames(&input_data, &input_format)?;

    if frames.is_empty() {
        return Err(MicroexprCliError::NoFrames);
    }

    let mut processor = build_processor(config, load_session)?;
    info!(
        "analyzing {} frames in session {}",
        frames.len(),
        processor.session_id()
    );

    let mut records: Vec<AnalysisRecord> = Vec::with_capacity(frames.len());
    for frame in frames {
        records.push(processor.process_record(frame)?);
    }

    if let Some(session_path) = save_session {
        fs::write(session_path, processor.save_session()?)?;
        debug!("session saved to {}", session_path.display());
    }

    let output_data = format_output(&records, &output_format, verbose)?;

    if output.to_string_lossy() == "-" {
        print!("{}", output_data);
    } else {
        fs::write(output, output_data)?;
    }

    Ok(())
}

fn cmd_run(
    output_format: OutputFormat,
    config: Option<&Path>,
    load_session: Option<&Path>,
    save_session: Option<&Path>,
    flush: bool,
    verbose: bool,
) -> Result<(), MicroexprCliError> {
    let mut processor = build_processor(config, load_session)?;
    info!("streaming session {}", processor.session_id());

    let stdin = io::stdin();
    let mut stdout = io::stdout();

    for line in stdin.lock().lines() {
        let line = line?;
        let trimmed = line.trim();

        if trimmed.is_empty() {
            continue;
        }

        let frame: FrameRecord = serde_json::from_str(trimmed).map_err(|e| {
            MicroexprCliError::ParseError(format!("Failed to parse frame: {}", e))
        })?;

        let record = processor.process_record(frame)?;

        // Streaming JSON arrays are emitted one element per line
        let line_format = match output_format {
            OutputFormat::Text => OutputFormat::Text,
            _ => OutputFormat::Ndjson,
        };
        write!(
            stdout,
            "{}",
            format_output(std::slice::from_ref(&record), &line_format, verbose)?
        )?;
        if flush {
            stdout.flush()?;
        }
    }
    stdout.flush()?;

    info!(
        "stream closed after {} frames",
        processor.session().frames_processed()
    );

    if let Some(session_path) = save_session {
        fs::write(session_path, processor.save_session()?)?;
    }

    Ok(())
}

fn cmd_validate(
    input: &Path,
    input_format: InputFormat,
    config: Option<&Path>,
    json: bool,
) -> Result<(), MicroexprCliError> {
    let input_data = read_input(input)?;
    let frames = parse_frames(&input_data, &input_format)?;

    let config = match config {
        Some(path) => AnalyzerConfig::from_file(path)?,
        None => AnalyzerConfig::default(),
    };

    let results = FrameAdapter::validate_frames(&frames, &config.extractor.topology);

    let report = ValidationReport {
        total_frames: frames.len(),
        valid_frames: frames.len() - results.len(),
        invalid_frames: results.len(),
        errors: results
            .iter()
            .map(|r| ValidationErrorDetail {
                index: r.index,
                frame_id: r.frame_id,
                error: r.error.to_string(),
            })
            .collect(),
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
                let id = err
                    .frame_id
                    .map(|id| id.to_string())
                    .unwrap_or_else(|| "unknown".to_string());
                println!("  - Frame {} (index {}): {}", id, err.index, err.error);
            }
        }
    }

    if report.invalid_frames > 0 {
        Err(MicroexprCliError::ValidationFailed(report.invalid_frames))
    } else {
        Ok(())
    }
}

fn cmd_doctor(
    config: Option<&Path>,
    session: Option<&Path>,
    json: bool,
) -> Result<(), MicroexprCliError> {
    let mut checks: Vec<DoctorCheck> = Vec::new();

    checks.push(DoctorCheck {
        name: "version".to_string(),
        status: CheckStatus::Ok,
        message: format!("{} version {}", PRODUCER_NAME, VERSION),
    });

    checks.push(DoctorCheck {
        name: "schema_version".to_string(),
        status: CheckStatus::Ok,
        message: format!("Input schema: {}", SCHEMA_VERSION),
    });

    if let Some(config_path) = config {
        checks.push(check_file(config_path, "config", |content| {
            let config = AnalyzerConfig::from_json(content)?;
            Ok(format!(
                "Configuration valid (topology {}, {} landmarks required)",
                config.extractor.topology.name,
                config.extractor.topology.required_landmarks()
            ))
        }));
    }

    if let Some(session_path) = session {
        checks.push(check_file(session_path, "session", |content| {
            let session = SessionContext::from_json(content)?;
            Ok(format!(
                "Session file valid ({} frames, {} blinks in window)",
                session.frames_processed(),
                session.blink_tracker().blink_count()
            ))
        }));
    }

    let stdin_check = if atty::is(atty::Stream::Stdin) {
        DoctorCheck {
            name: "stdin".to_string(),
            status: CheckStatus::Ok,
            message: "stdin is a TTY (interactive mode)".to_string(),
        }
    } else {
        DoctorCheck {
            name: "stdin".to_string(),
            status: CheckStatus::Ok,
            message: "stdin is a pipe (streaming mode ready)".to_string(),
        }
    };
    checks.push(stdin_check);

    let report = DoctorReport {
        producer: PRODUCER_NAME.to_string(),
        version: VERSION.to_string(),
        checks,
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("microexpr Doctor Report");
        println!("=======================");
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
        Err(MicroexprCliError::DoctorFailed)
    } else {
        Ok(())
    }
}

fn cmd_schema(schema_type: SchemaType, json_schema: bool) -> Result<(), MicroexprCliError> {
    match schema_type {
        SchemaType::Input => {
            if json_schema {
                println!("{}", get_input_json_schema());
            } else {
                println!("Input Schema: {}", SCHEMA_VERSION);
                println!();
                println!("One JSON object per frame:");
                println!();
                println!("- schema_version: \"{}\" (optional)", SCHEMA_VERSION);
                println!("- frame_id: sequence number (optional)");
                println!("- timestamp: capture time in seconds, non-decreasing");
                println!("- landmarks: normalized points as [x, y], [x, y, z] or {{x, y, z}}");
                println!();
                println!("The default topology is MediaPipe Face Mesh (468 points, at least 455 required).");
            }
        }
        SchemaType::Output => {
            if json_schema {
                println!("{}", get_output_json_schema());
            } else {
                println!("Output Schema: analysis record");
                println!();
                println!("One flat record per frame:");
                println!();
                println!("- session_id, frame_id, timestamp");
                println!("- eyebrow_raise, lip_tension, head_nod_intensity, symmetry_delta: smoothed metrics");
                println!("- blink_rate: blinks per minute over the trailing window");
                println!("- stress_score: weighted score in [0, 1.5]");
                println!("- stress_level: calm | mild | high, with label and icon");
                println!("- computed_at_utc: RFC 3339 timestamp");
            }
        }
    }

    Ok(())
}

// Helper functions

fn read_input(input: &Path) -> Result<String, MicroexprCliError> {
    if input.to_string_lossy() == "-" {
        let mut buffer = String::new();
        io::stdin().read_to_string(&mut buffer)?;
        Ok(buffer)
    } else {
        Ok(fs::read_to_string(input)?)
    }
}

fn parse_frames(data: &str, format: &InputFormat) -> Result<Vec<FrameRecord>, MicroexprCliError> {
    let frames = match format {
        InputFormat::Ndjson => FrameAdapter::parse_ndjson(data)?,
        InputFormat::Json => FrameAdapter::parse_array(data)?,
    };
    Ok(frames)
}

fn build_processor(
    config: Option<&Path>,
    load_session: Option<&Path>,
) -> Result<StressProcessor, MicroexprCliError> {
    let config = match config {
        Some(path) => AnalyzerConfig::from_file(path)?,
        None => AnalyzerConfig::default(),
    };
    let mut processor = StressProcessor::with_config(&config)?;

    if let Some(session_path) = load_session {
        let session_json = fs::read_to_string(session_path)?;
        processor.load_session(&session_json)?;
        info!(
            "resumed session with {} frames of history",
            processor.session().frames_processed()
        );
    }

    Ok(processor)
}

fn check_file<F>(path: &Path, name: &str, check: F) -> DoctorCheck
where
    F: FnOnce(&str) -> Result<String, MicroexprCliError>,
{
    if !path.exists() {
        return DoctorCheck {
            name: name.to_string(),
            status: CheckStatus::Warning,
            message: format!("{} file does not exist", name),
        };
    }

    let outcome = fs::read_to_string(path)
        .map_err(MicroexprCliError::from)
        .and_then(|content| check(&content));

    match outcome {
        Ok(message) => DoctorCheck {
            name: name.to_string(),
            status: CheckStatus::Ok,
            message,
        },
        Err(e) => DoctorCheck {
            name: name.to_string(),
            status: CheckStatus::Error,
            message: CliError::from(e).message,
        },
    }
}

fn format_output(
    records: &[AnalysisRecord],
    format: &OutputFormat,
    verbose: bool,
) -> Result<String, MicroexprCliError> {
    match format {
        OutputFormat::Ndjson => {
            let mut lines: Vec<String> = Vec::new();
            for record in records {
                lines.push(serde_json::to_string(record)?);
            }
            Ok(lines.join("\n") + "\n")
        }
        OutputFormat::Json => Ok(serde_json::to_string(records)?),
        OutputFormat::JsonPretty => Ok(serde_json::to_string_pretty(records)?),
        OutputFormat::Text => {
            let mut out = String::new();
            for record in records {
                out.push_str(&format_dashboard(record, verbose));
            }
            Ok(out)
        }
    }
}

fn format_dashboard(record: &AnalysisRecord, verbose: bool) -> String {
    let mut out = format!(
        "[{:>9.3}s] {} {} ({:.2})\n",
        record.timestamp, record.icon, record.label, record.stress_score
    );
    if verbose {
        let metrics = [
            ("Eyebrow Raise", record.eyebrow_raise),
            ("Lip Tension", record.lip_tension),
            ("Head Nod", record.head_nod_intensity),
            ("Symmetry", record.symmetry_delta),
            ("Blink Rate /min", record.blink_rate),
        ];
        for (label, value) in metrics {
            out.push_str(&format!("    {:<16} {:>8.3}\n", label, value));
        }
    }
    out
}

fn get_input_json_schema() -> String {
    serde_json::json!({
        "$schema": "https://json-schema.org/draft/2020-12/schema",
        "title": SCHEMA_VERSION,
        "description": "Face landmark frame",
        "type": "object",
        "required": ["timestamp", "landmarks"],
        "properties": {
            "schema_version": { "type": "string", "const": SCHEMA_VERSION },
            "frame_id": { "type": "integer", "minimum": 0 },
            "timestamp": { "type": "number" },
            "landmarks": {
                "type": "array",
                "items": {
                    "oneOf": [
                        { "type": "array", "items": { "type": "number" }, "minItems": 2, "maxItems": 3 },
                        {
                            "type": "object",
                            "required": ["x", "y"],
                            "properties": {
                                "x": { "type": "number" },
                                "y": { "type": "number" },
                                "z": { "type": "number" }
                            }
                        }
                    ]
                }
            }
        }
    })
    .to_string()
}

fn get_output_json_schema() -> String {
    serde_json::json!({
        "$schema": "https://json-schema.org/draft/2020-12/schema",
        "title": "microexpr analysis record",
        "type": "object",
        "required": [
            "session_id", "timestamp", "eyebrow_raise", "lip_tension",
            "head_nod_intensity", "symmetry_delta", "blink_rate",
            "stress_score", "stress_level", "label", "icon", "computed_at_utc"
        ],
        "properties": {
            "session_id": { "type": "string" },
            "frame_id": { "type": "integer" },
            "timestamp": { "type": "number" },
            "eyebrow_raise": { "type": "number" },
            "lip_tension": { "type": "number", "minimum": 0, "maximum": 1 },
            "head_nod_intensity": { "type": "number" },
            "symmetry_delta": { "type": "number" },
            "blink_rate": { "type": "number" },
            "stress_score": { "type": "number", "minimum": 0, "maximum": 1.5 },
            "stress_level": { "type": "string", "enum": ["calm", "mild", "high"] },
            "label": { "type": "string" },
            "icon": { "type": "string" },
            "computed_at_utc": { "type": "string", "format": "date-time" }
        }
    })
    .to_string()
}

// Error types

#[derive(Debug)]
enum MicroexprCliError {
    Io(io::Error),
    Analyzer(AnalyzerError),
    Json(serde_json::Error),
    NoFrames,
    ValidationFailed(usize),
    DoctorFailed,
    ParseError(String),
}

impl From<io::Error> for MicroexprCliError {
    fn from(e: io::Error) -> Self {
        MicroexprCliError::Io(e)
    }
}

impl From<AnalyzerError> for MicroexprCliError {
    fn from(e: AnalyzerError) -> Self {
        MicroexprCliError::Analyzer(e)
    }
}

impl From<serde_json::Error> for MicroexprCliError {
    fn from(e: serde_json::Error) -> Self {
        MicroexprCliError::Json(e)
    }
}

#[derive(serde::Serialize)]
struct CliError {
    code: String,
    message: String,
    hint: Option<String>,
}

impl From<MicroexprCliError> for CliError {
    fn from(e: MicroexprCliError) -> Self {
        match e {
            MicroexprCliError::Io(e) => CliError {
                code: "IO_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Check file paths and permissions".to_string()),
            },
            MicroexprCliError::Analyzer(AnalyzerError::Configuration(msg)) => CliError {
                code: "CONFIG_ERROR".to_string(),
                message: msg,
                hint: Some("Run 'microexpr doctor --config <file>' for details".to_string()),
            },
            MicroexprCliError::Analyzer(e) if e.is_precondition_violation() => CliError {
                code: "LANDMARK_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Check that frames match the configured face topology".to_string()),
            },
            MicroexprCliError::Analyzer(e) => CliError {
                code: "ANALYZER_ERROR".to_string(),
                message: e.to_string(),
                hint: Some(format!("Ensure input matches {} schema", SCHEMA_VERSION)),
            },
            MicroexprCliError::Json(e) => CliError {
                code: "JSON_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Check JSON syntax".to_string()),
            },
            MicroexprCliError::NoFrames => CliError {
                code: "NO_FRAMES".to_string(),
                message: "No frames found in input".to_string(),
                hint: Some("Ensure input file is not empty".to_string()),
            },
            MicroexprCliError::ValidationFailed(count) => CliError {
                code: "VALIDATION_FAILED".to_string(),
                message: format!("{} frames failed validation", count),
                hint: Some("Fix validation errors and retry".to_string()),
            },
            MicroexprCliError::DoctorFailed => CliError {
                code: "DOCTOR_FAILED".to_string(),
                message: "One or more health checks failed".to_string(),
                hint: Some("Review the doctor report for details".to_string()),
            },
            MicroexprCliError::ParseError(msg) => CliError {
                code: "PARSE_ERROR".to_string(),
                message: msg,
                hint: Some("Check input format".to_string()),
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
    frame_id: Option<u64>,
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
