//! Command implementations for FlowPress CLI.

pub mod compress;
pub mod decompress;
pub mod info;
pub mod job;

pub use compress::cmd_compress;
pub use decompress::cmd_decompress;
pub use info::cmd_info;
pub use test::cmd_test;

use crate::utils::load_config;
use flowpress_codec::{CompressionLevel, Format, StreamConfig};
use flowpress_core::Mode;
use job::{Input, Job, Output, finish_reports, resolve_output, run_jobs};
use std::io::IsTerminal;
use std::path::{Path, PathBuf};

/// Options shared by `compress` and `decompress`.
pub struct StreamOptions<'a> {
    pub format: Option<Format>,
    pub level: Option<u8>,
    pub chunk_size: Option<usize>,
    pub config: Option<&'a Path>,
    pub output: Option<&'a Path>,
    pub stdout: bool,
    pub force: bool,
    pub json: bool,
    pub progress: bool,
    pub verbose: bool,
}

impl StreamOptions<'_> {
    /// Build the stream configuration: the config file (if any), then flags.
    pub fn stream_config(
        &self,
        default_level: CompressionLevel,
    ) -> Result<StreamConfig, Box<dyn std::error::Error>> {
        let mut config = match self.config {
            Some(path) => load_config(path)?,
            None => StreamConfig::new().with_level(default_level),
        };
        if let Some(level) = self.level {
            config = config.with_level(level);
        }
        if let Some(size) = self.chunk_size {
            config = config.with_capacity(size);
        }
        config.validate()?;
        Ok(config)
    }

    fn plan(
        &self,
        files: &[PathBuf],
        mode: Mode,
        format: Option<Format>,
        config: StreamConfig,
        name_output: impl Fn(&Path) -> PathBuf,
    ) -> Result<(Vec<Job>, usize), Box<dyn std::error::Error>> {
        if files.len() > 1 && (self.stdout || self.output.is_some()) {
            return Err("--stdout and --output need a single input".into());
        }

        let mut jobs = Vec::with_capacity(files.len());
        let mut skipped = 0;

        for file in files {
            let input = Input::from_arg(file);
            let candidate = match (&input, self.output) {
                _ if self.stdout => None,
                (_, Some(path)) if path != Path::new("-") => Some(path.to_path_buf()),
                (_, Some(_)) | (Input::Stdin, None) => None,
                (Input::File(path), None) => Some(name_output(path)),
            };

            let output = match candidate {
                None => {
                    if mode == Mode::Compress && !self.force && std::io::stdout().is_terminal() {
                        return Err(
                            "refusing to write compressed data to a terminal (use --force)".into(),
                        );
                    }
                    Output::Stdout
                }
                Some(path) => {
                    if matches!(&input, Input::File(src) if *src == path) {
                        let message = format!("{} would overwrite its own input", path.display());
                        return Err(message.into());
                    }
                    match resolve_output(path.clone(), self.force)? {
                        Some(output) => output,
                        None => {
                            eprintln!(
                                "flowpress: {}: already exists, skipped (use --force to overwrite)",
                                path.display()
                            );
                            skipped += 1;
                            continue;
                        }
                    }
                }
            };

            jobs.push(Job {
                mode,
                input,
                output,
                format,
                config,
            });
        }

        Ok((jobs, skipped))
    }

    /// Plan, run and report one stream per input file.
    ///
    /// An empty file list means standard input.
    pub fn execute(
        &self,
        files: &[PathBuf],
        mode: Mode,
        format: Option<Format>,
        config: StreamConfig,
        name_output: impl Fn(&Path) -> PathBuf,
    ) -> Result<(), Box<dyn std::error::Error>> {
        let stdin = [PathBuf::from("-")];
        let files = if files.is_empty() { &stdin[..] } else { files };

        let (jobs, skipped) = self.plan(files, mode, format, config, name_output)?;
        let reports = run_jobs(&jobs, self.progress);
        finish_reports(&jobs, &reports, self.json, self.verbose)?;

        if skipped > 0 {
            return Err(format!("{} file(s) skipped", skipped).into());
        }
        Ok(())
    }
}
