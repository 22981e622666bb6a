mod input;

use input::*;
use log::*;
use rand::SeedableRng;
use rand_pcg::Pcg64;
use reg::{
    consensus::Arrsac,
    estimate::{AffineLandmarkEstimator, LandmarkRegistration},
    geom::lines_intersection,
    iterative::{IterativeSettings, PointToLineRegistration, PointToPlaneRegistration},
    AlignmentMode, Consensus, PointMatch, Registration, RegistrationError,
};
use serde::{de::DeserializeOwned, Serialize};
use std::{fs::File, io, path::PathBuf};
use structopt::StructOpt;
use thiserror::Error;

#[derive(StructOpt, Clone)]
#[structopt(name = "reg-cli", about = "A tool for running 3d registrations")]
struct Opt {
    /// File to write the JSON report to instead of stdout.
    #[structopt(short, long, global = true)]
    output: Option<PathBuf>,
    #[structopt(subcommand)]
    command: Command,
}

#[derive(StructOpt, Clone)]
enum Command {
    /// Closed-form registration of paired points.
    ///
    /// Input: `{"sources": [[x, y, z], ...], "targets": [[x, y, z], ...]}`
    Landmark {
        #[structopt(parse(from_os_str))]
        input: PathBuf,
        /// One of `rigid`, `similarity` or `affine`.
        #[structopt(short, long, default_value = "rigid")]
        mode: AlignmentMode,
        /// Reject outliers with ARRSAC using this inlier distance before solving.
        #[structopt(long)]
        consensus: Option<f64>,
    },
    /// Similarity registration of points to lines.
    ///
    /// Input: `{"sources": [...], "lines": [{"origin": [...], "direction": [...]}, ...]}`
    PointToLine {
        #[structopt(parse(from_os_str))]
        input: PathBuf,
        #[structopt(flatten)]
        convergence: Convergence,
    },
    /// Rigid registration of points to planes.
    ///
    /// Input: `{"sources": [...], "planes": [{"origin": [...], "normal": [...]}, ...]}`
    PointToPlane {
        #[structopt(parse(from_os_str))]
        input: PathBuf,
        #[structopt(flatten)]
        convergence: Convergence,
    },
    /// Least-squares intersection of lines.
    ///
    /// Input: `{"lines": [{"origin": [...], "direction": [...]}, ...]}`
    Intersect {
        #[structopt(parse(from_os_str))]
        input: PathBuf,
    },
}

#[derive(StructOpt, Clone)]
struct Convergence {
    /// The file where settings are specified.
    ///
    /// This is in the format of `reg_iterative::IterativeSettings`.
    #[structopt(short, long, default_value = "registration-settings.json")]
    settings: PathBuf,
    /// Overrides the tolerance from the settings.
    #[structopt(long)]
    tolerance: Option<f64>,
    /// Overrides the iteration cap from the settings.
    #[structopt(long)]
    max_iterations: Option<usize>,
}

#[derive(Debug, Error)]
enum CliError {
    #[error("unable to access {path}: {source}")]
    Io { path: PathBuf, source: io::Error },
    #[error("invalid JSON in {path}: {source}")]
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("unable to write report: {0}")]
    Report(serde_json::Error),
    #[error(transparent)]
    Registration(#[from] RegistrationError),
    #[error("consensus found no transform")]
    NoConsensus,
}

fn main() {
    pretty_env_logger::init_timed();
    let opt = Opt::from_args();
    if let Err(e) = run(opt) {
        error!("{}", e);
        std::process::exit(1);
    }
}

fn run(opt: Opt) -> Result<(), CliError> {
    match opt.command {
        Command::Landmark {
            input,
            mode,
            consensus,
        } => {
            let input: LandmarkInput = read_json(&input)?;
            let (sources, targets) = (points(&input.sources), points(&input.targets));
            let solver = LandmarkRegistration::new().mode(mode);
            let report = match consensus {
                Some(threshold) => landmark_consensus(solver, threshold, &sources, &targets)?,
                None => solver.solve(&sources, &targets)?.into(),
            };
            write_report(opt.output, &report)
        }
        Command::PointToLine { input, convergence } => {
            let input: PointToLineInput = read_json(&input)?;
            let mut registration = PointToLineRegistration::with_settings(convergence.settings());
            check_counts(input.sources.len(), input.lines.len())?;
            for (source, line) in points(&input.sources).into_iter().zip(input.lines) {
                registration.add_correspondence(source, line.into())?;
            }
            let report: RegistrationReport = registration.compute()?.into();
            write_report(opt.output, &report)
        }
        Command::PointToPlane { input, convergence } => {
            let input: PointToPlaneInput = read_json(&input)?;
            let mut registration = PointToPlaneRegistration::with_settings(convergence.settings());
            check_counts(input.sources.len(), input.planes.len())?;
            for (source, plane) in points(&input.sources).into_iter().zip(input.planes) {
                registration.add_correspondence(source, plane.into())?;
            }
            let report: RegistrationReport = registration.compute()?.into();
            write_report(opt.output, &report)
        }
        Command::Intersect { input } => {
            let input: IntersectInput = read_json(&input)?;
            let lines = input.lines.into_iter().map(Into::into).collect::<Vec<_>>();
            let report: IntersectionReport = lines_intersection(&lines)?.into();
            write_report(opt.output, &report)
        }
    }
}

impl Convergence {
    fn settings(&self) -> IterativeSettings {
        let settings = File::open(&self.settings)
            .ok()
            .and_then(|file| serde_json::from_reader(file).ok());
        if settings.is_some() {
            info!("loaded settings from {}", self.settings.display());
        } else {
            info!("used default settings");
        }
        let mut settings: IterativeSettings = settings.unwrap_or_default();
        if let Some(tolerance) = self.tolerance {
            settings.tolerance = tolerance;
        }
        if let Some(max_iterations) = self.max_iterations {
            settings.max_iterations = max_iterations;
        }
        settings
    }
}

/// Finds the inliers with ARRSAC, then solves over the inliers only.
fn landmark_consensus(
    solver: LandmarkRegistration,
    threshold: f64,
    sources: &[reg::nalgebra::Point3<f64>],
    targets: &[reg::nalgebra::Point3<f64>],
) -> Result<RegistrationReport, CliError> {
    check_counts(sources.len(), targets.len())?;
    let matches = PointMatch::zip(sources, targets).collect::<Vec<_>>();
    let mut arrsac = Arrsac::new(threshold, Pcg64::from_seed([5; 32]));
    let found = match solver.alignment_mode() {
        AlignmentMode::Affine => {
            arrsac.model_inliers(&AffineLandmarkEstimator(solver), matches.iter().copied())
        }
        AlignmentMode::Rigid | AlignmentMode::Similarity => {
            arrsac.model_inliers(&solver, matches.iter().copied())
        }
    };
    let (_, inliers) = found.ok_or(CliError::NoConsensus)?;
    info!("consensus kept {} of {} correspondences", inliers.len(), matches.len());

    let (inlier_sources, inlier_targets): (Vec<_>, Vec<_>) = inliers
        .iter()
        .map(|&ix| (sources[ix], targets[ix]))
        .unzip();
    let registration: Registration = solver.solve(&inlier_sources, &inlier_targets)?;
    Ok(RegistrationReport {
        inliers: Some(inliers),
        ..RegistrationReport::from(registration)
    })
}

/// The input lists are zipped, which would silently drop the unpaired tail.
fn check_counts(sources: usize, targets: usize) -> Result<(), RegistrationError> {
    if sources != targets {
        return Err(RegistrationError::MismatchedCorrespondences { sources, targets });
    }
    Ok(())
}

fn read_json<T: DeserializeOwned>(path: &PathBuf) -> Result<T, CliError> {
    let file = File::open(path).map_err(|source| CliError::Io {
        path: path.clone(),
        source,
    })?;
    serde_json::from_reader(io::BufReader::new(file)).map_err(|source| CliError::Json {
        path: path.clone(),
        source,
    })
}

fn write_report<T: Serialize>(output: Option<PathBuf>, report: &T) -> Result<(), CliError> {
    match output {
        Some(path) => {
            let file = File::create(&path).map_err(|source| CliError::Io {
                path: path.clone(),
                source,
            })?;
            serde_json::to_writer_pretty(file, report).map_err(CliError::Report)?;
            info!("wrote report to {}", path.display());
        }
        None => {
            serde_json::to_writer_pretty(io::stdout().lock(), report).map_err(CliError::Report)?;
            println!();
        }
    }
    Ok(())
}
