//! Planning and running per-file streams.

use crate::utils::{confirm_overwrite, create_bytes_bar, create_progress_bar, format_bytes};
use filetime::FileTime;
use flowpress_codec::{
    FlowError, Format, StreamConfig, StreamSummary, compress_stream_with, decompress_stream_with,
};
use flowpress_core::Mode;
use indicatif::ProgressBar;
use rayon::prelude::*;
use serde::Serialize;
use std::fs::File;
use std::io::{self, BufRead, BufReader, Read, Write};
use std::path::{Path, PathBuf};

/// Where a stream reads from.
#[derive(Debug, Clone)]
pub enum Input {
    Stdin,
    File(PathBuf),
}

/// Where a stream writes to.
#[derive(Debug, Clone)]
pub enum Output {
    Stdout,
    /// Output is checked and thrown away.
    Discard,
    File(PathBuf),
}

impl Input {
    /// Interpret a command-line argument; `-` is standard input.
    pub fn from_arg(path: &Path) -> Self {
        if path == Path::new("-") {
            Input::Stdin
        } else {
            Input::File(path.to_path_buf())
        }
    }

    fn open(&self) -> flowpress_codec::Result<Box<dyn Read + Send>> {
        Ok(match self {
            Input::Stdin => Box::new(io::stdin()),
            Input::File(path) => Box::new(File::open(path).map_err(FlowError::SourceRead)?),
        })
    }

    fn len(&self) -> u64 {
        match self {
            Input::Stdin => 0,
            Input::File(path) => std::fs::metadata(path).map(|m| m.len()).unwrap_or(0),
        }
    }

    fn name(&self) -> String {
        match self {
            Input::Stdin => "<stdin>".to_string(),
            Input::File(path) => path.display().to_string(),
        }
    }
}

impl Output {
    fn open(&self) -> flowpress_codec::Result<Box<dyn Write + Send>> {
        Ok(match self {
            Output::Stdout => Box::new(io::stdout()),
            Output::Discard => Box::new(io::sink()),
            Output::File(path) => Box::new(File::create(path).map_err(FlowError::SinkWrite)?),
        })
    }

    fn name(&self) -> Option<String> {
        match self {
            Output::Stdout => Some("<stdout>".to_string()),
            Output::Discard => None,
            Output::File(path) => Some(path.display().to_string()),
        }
    }
}

/// One source-to-sink stream.
#[derive(Debug, Clone)]
pub struct Job {
    pub mode: Mode,
    pub input: Input,
    pub output: Output,
    /// Decompression detects the format from the stream header when unset.
    pub format: Option<Format>,
    pub config: StreamConfig,
}

/// JSON serializable result of one job.
#[derive(Debug, Serialize)]
pub struct JobReport {
    pub input: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<Format>,
    #[serde(flatten)]
    pub summary: Option<StreamSummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl JobReport {
    pub fn succeeded(&self) -> bool {
        self.error.is_none()
    }
}

/// Resolve where the output for `input` goes, asking before overwriting.
///
/// Returns `None` when the user declined to overwrite an existing file.
pub fn resolve_output(
    candidate: PathBuf,
    force: bool,
) -> Result<Option<Output>, Box<dyn std::error::Error>> {
    if confirm_overwrite(&candidate, force)? {
        Ok(Some(Output::File(candidate)))
    } else {
        Ok(None)
    }
}

fn detect_format<R: BufRead>(source: &mut R) -> flowpress_codec::Result<Format> {
    let header = source.fill_buf().map_err(FlowError::SourceRead)?;
    Format::detect(header)
        .ok_or_else(|| FlowError::corrupted(0, "unrecognized stream header"))
}

fn preserve_mtime(input: &Path, output: &Path) {
    let result = std::fs::metadata(input).and_then(|meta| {
        let mtime = FileTime::from_last_modification_time(&meta);
        filetime::set_file_mtime(output, mtime)
    });
    if let Err(e) = result {
        log::warn!("could not copy modification time to {}: {}", output.display(), e);
    }
}

fn execute(
    job: &Job,
    bar: &ProgressBar,
    format: &mut Option<Format>,
) -> flowpress_codec::Result<StreamSummary> {
    let mut source = BufReader::new(bar.wrap_read(job.input.open()?));
    let resolved = match *format {
        Some(f) => f,
        None => detect_format(&mut source)?,
    };
    *format = Some(resolved);
    log::debug!(
        "{} {} as {} ({:?})",
        job.mode,
        job.input.name(),
        resolved,
        job.config
    );

    let sink = job.output.open()?;
    let result = match job.mode {
        Mode::Compress => compress_stream_with(source, sink, resolved, &job.config),
        Mode::Decompress => decompress_stream_with(source, sink, resolved, &job.config),
    };

    if let (Err(_), Output::File(path)) = (&result, &job.output) {
        log::debug!("removing partial output {}", path.display());
        let _ = std::fs::remove_file(path);
    }
    result
}

/// Run a job to completion. Partial output files are removed on failure.
pub fn run_job(job: &Job, bar: &ProgressBar) -> JobReport {
    let mut format = job.format;
    let result = execute(job, bar, &mut format);

    if let (Ok(_), Input::File(input), Output::File(output)) = (&result, &job.input, &job.output) {
        preserve_mtime(input, output);
    }

    let (summary, error) = match result {
        Ok(summary) => (Some(summary), None),
        Err(e) => (None, Some(e.to_string())),
    };
    JobReport {
        input: job.input.name(),
        output: job.output.name(),
        format,
        summary,
        error,
    }
}

/// Run all jobs, in parallel when there is more than one.
pub fn run_jobs(jobs: &[Job], progress: bool) -> Vec<JobReport> {
    if let [job] = jobs {
        let enable = progress && !matches!(job.input, Input::Stdin);
        let bar = create_bytes_bar(job.input.len(), enable);
        bar.set_message(job.input.name());
        let report = run_job(job, &bar);
        bar.finish_and_clear();
        return vec![report];
    }

    let bar = create_progress_bar(jobs.len() as u64, progress);
    bar.set_message("files");
    let reports = jobs
        .par_iter()
        .map(|job| {
            let report = run_job(job, &ProgressBar::hidden());
            bar.inc(1);
            report
        })
        .collect();
    bar.finish_and_clear();
    reports
}

/// Print reports and turn failures into an error.
///
/// Human-readable output goes to stderr when stream data is on stdout.
pub fn finish_reports(
    jobs: &[Job],
    reports: &[JobReport],
    json: bool,
    verbose: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let data_on_stdout = jobs.iter().any(|j| matches!(j.output, Output::Stdout));
    let emit = |line: String| {
        if data_on_stdout {
            eprintln!("{}", line);
        } else {
            println!("{}", line);
        }
    };

    if json {
        emit(serde_json::to_string_pretty(reports)?);
    } else {
        for r in reports {
            match (&r.summary, &r.error) {
                (_, Some(error)) => eprintln!("flowpress: {}: {}", r.input, error),
                (Some(summary), None) if verbose || !data_on_stdout => {
                    let target = r
                        .output
                        .as_deref()
                        .map(|o| format!(" -> {}", o))
                        .unwrap_or_default();
                    emit(format!(
                        "{}{}: {} -> {} ({:.1}% saved)",
                        r.input,
                        target,
                        format_bytes(summary.bytes_in),
                        format_bytes(summary.bytes_out),
                        summary.space_savings()
                    ));
                }
                _ => {}
            }
        }
    }

    let failed = reports.iter().filter(|r| !r.succeeded()).count();
    if failed > 0 {
        return Err(format!("{} of {} stream(s) failed", failed, reports.len()).into());
    }
    Ok(())
}
