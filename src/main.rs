use std::env;
use std::error::Error;
use std::path::PathBuf;
use std::process;

use log::{info, warn, LevelFilter};
use spectral_cocluster::io::load_matrix;
use spectral_cocluster::{CoclusterConfig, SpectralCoclusterer};

const USAGE: &str = "usage: spectral_cocluster <matrix file> [n_clusters] [max_iter] [seed]";

struct CliArgs {
    matrix_path: PathBuf,
    config: CoclusterConfig,
}

impl CliArgs {
    /// Parse `<matrix file> [n_clusters] [max_iter] [seed]`; omitted
    /// trailing arguments keep their defaults.
    fn parse(mut args: impl Iterator<Item = String>) -> Result<CliArgs, Box<dyn Error>> {
        args.next(); // program name

        let matrix_path = PathBuf::from(args.next().ok_or(USAGE)?);

        let mut config = CoclusterConfig::default();
        if let Some(raw) = args.next() {
            config.n_clusters = raw.parse()?;
        }
        if let Some(raw) = args.next() {
            config.max_iter = raw.parse()?;
        }
        if let Some(raw) = args.next() {
            config.seed = raw.parse()?;
        }

        Ok(CliArgs {
            matrix_path,
            config,
        })
    }
}

fn main() {
    simple_logger::SimpleLogger::new()
        .with_level(LevelFilter::Info)
        .init()
        .expect("failed to initialize logger");

    if let Err(err) = run() {
        eprintln!("error: {}", err);
        process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn Error>> {
    let args = CliArgs::parse(env::args())?;

    let source = load_matrix(&args.matrix_path)?;
    info!(
        "loaded {}x{} matrix from {}",
        source.data.nrows(),
        source.data.ncols(),
        args.matrix_path.display()
    );

    let result = SpectralCoclusterer::new(args.config.clone()).fit(&source.data)?;

    if !result.diagnostics.kmeans_converged {
        warn!(
            "k-means did not stabilize within {} iterations; labels come from the last pass",
            args.config.max_iter
        );
    }
    if result.diagnostics.degenerate_rows > 0 || result.diagnostics.degenerate_cols > 0 {
        warn!(
            "{} rows and {} columns had zero degree and were embedded at the origin",
            result.diagnostics.degenerate_rows, result.diagnostics.degenerate_cols
        );
    }

    print_assignments(
        "row",
        &result.row_labels,
        &source.row_names,
        args.config.n_clusters,
    );
    print_assignments(
        "column",
        &result.col_labels,
        &source.col_names,
        args.config.n_clusters,
    );

    Ok(())
}

/// Print each cluster's members on one line, falling back to indices when
/// the source file carried no names.
fn print_assignments(kind: &str, labels: &[usize], names: &[String], n_clusters: usize) {
    for cluster in 0..n_clusters {
        let members: Vec<String> = labels
            .iter()
            .enumerate()
            .filter(|(_, &label)| label == cluster)
            .map(|(idx, _)| names.get(idx).cloned().unwrap_or_else(|| idx.to_string()))
            .collect();
        println!("{} cluster {}: {}", kind, cluster, members.join(", "));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn string_args(args: &[&str]) -> impl Iterator<Item = String> {
        args.iter()
            .map(|s| s.to_string())
            .collect::<Vec<_>>()
            .into_iter()
    }

    #[test]
    fn test_parse_full_argument_list() {
        let args = CliArgs::parse(string_args(&[
            "spectral_cocluster",
            "matrix.tsv",
            "4",
            "250",
            "9",
        ]))
        .unwrap();

        assert_eq!(args.matrix_path, PathBuf::from("matrix.tsv"));
        assert_eq!(args.config.n_clusters, 4);
        assert_eq!(args.config.max_iter, 250);
        assert_eq!(args.config.seed, 9);
    }

    #[test]
    fn test_parse_defaults_for_trailing_arguments() {
        let args = CliArgs::parse(string_args(&["spectral_cocluster", "matrix.npy"])).unwrap();

        assert_eq!(args.config, CoclusterConfig::default());
    }

    #[test]
    fn test_parse_requires_matrix_path() {
        assert!(CliArgs::parse(string_args(&["spectral_cocluster"])).is_err());
    }

    #[test]
    fn test_parse_rejects_garbage_numbers() {
        let result = CliArgs::parse(string_args(&["spectral_cocluster", "m.tsv", "two"]));
        assert!(result.is_err());
    }
}
