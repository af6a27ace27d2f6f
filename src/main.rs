use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing::{debug, info};

use sweven_data::{
    CleaningReport, Cleaner, ColumnSummary, Dataset, TableReader, describe, engineer_features,
    make_classification, make_regression, make_tabular, train_test_split,
};
use sweven_io::{RegressionPlot, ResultWriter, RunConfig, TrainingMetrics, write_table_csv};
use sweven_linear::{LinearRegression, mean_squared_error, r2_score};
use sweven_rf::{
    ClassificationReport, ConfusionMatrix, CrossValidation, RandomForestConfig, RankedFeature,
};

#[derive(Parser)]
#[command(name = "sweven")]
#[command(about = "Synthetic-data lab: regression experiment, data processing, forest training")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// RNG seed for reproducibility
    #[arg(long, default_value_t = 42, global = true)]
    seed: u64,

    /// Enable verbose (debug-level) logging
    #[arg(long, global = true)]
    verbose: bool,

    /// Suppress all output except errors
    #[arg(long, global = true)]
    quiet: bool,

    /// Number of threads for parallel computation (defaults to all cores)
    #[arg(long, global = true)]
    threads: Option<usize>,
}

#[derive(Subcommand)]
enum Command {
    /// Fit a line to noisy synthetic data and plot the fit
    Regress {
        /// Number of generated points
        #[arg(long, default_value_t = 100)]
        n_samples: usize,

        /// Standard deviation of the Gaussian noise added to the target
        #[arg(long, default_value_t = 5.0)]
        noise: f64,

        /// Fraction of rows held out for evaluation
        #[arg(long, default_value_t = 0.2)]
        test_size: f64,

        /// Where to write the PNG plot
        #[arg(long, default_value = "experiments/example_regression_results.png")]
        plot: PathBuf,
    },

    /// Generate, clean and feature-engineer a table, then write it as CSV
    Process {
        /// Number of generated rows
        #[arg(long, default_value_t = 1000)]
        n_samples: usize,

        /// Where to write the processed CSV
        #[arg(long, default_value = "data/processed/processed_data.csv")]
        output: PathBuf,
    },

    /// Train and evaluate a random forest, then save model, metrics and config
    Train {
        /// Data path recorded in config.json (read only with --load-csv)
        #[arg(long, default_value = "data/processed/processed_data.csv")]
        data: PathBuf,

        /// Read the table at --data and use its `target` column as the label
        #[arg(long, default_value_t = false)]
        load_csv: bool,

        /// Number of generated rows when not loading a CSV
        #[arg(long, default_value_t = 1000)]
        n_samples: usize,

        /// Number of trees in the forest
        #[arg(long, default_value_t = 100)]
        n_estimators: usize,

        /// Maximum tree depth
        #[arg(long, default_value_t = 10)]
        max_depth: usize,

        /// Number of cross-validation folds
        #[arg(long, default_value_t = 5)]
        cv_folds: usize,

        /// Fraction of rows held out for evaluation
        #[arg(long, default_value_t = 0.2)]
        test_size: f64,

        /// Output directory for model.bin, metrics.json and config.json
        #[arg(long, default_value = "models/example_model")]
        output_dir: PathBuf,
    },
}

#[derive(Serialize)]
struct RegressOutput {
    n_train: usize,
    n_test: usize,
    coefficients: Vec<f64>,
    intercept: f64,
    mse: f64,
    r2: f64,
    plot: PathBuf,
}

#[derive(Serialize)]
struct ProcessOutput {
    output: PathBuf,
    n_columns: usize,
    cleaning: CleaningReport,
    summary: Vec<ColumnSummary>,
}

#[derive(Serialize)]
struct TrainOutput {
    output_dir: PathBuf,
    train_samples: usize,
    test_samples: usize,
    cv_scores: Vec<f64>,
    mean_cv_score: f64,
    std_cv_score: f64,
    test_accuracy: f64,
    report: ClassificationReport,
    importances: Vec<RankedFeature>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = match (cli.verbose, cli.quiet) {
        (true, _) => "debug",
        (_, true) => "error",
        _ => "info",
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    if let Some(threads) = cli.threads {
        rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build_global()
            .context("failed to configure thread pool")?;
        info!(threads, "thread pool configured");
    }

    match cli.command {
        Command::Regress {
            n_samples,
            noise,
            test_size,
            plot,
        } => {
            let data = make_regression(n_samples, noise, cli.seed)
                .context("failed to generate regression data")?;
            let split = train_test_split(&data, test_size, cli.seed).context("failed to split data")?;

            let model = LinearRegression::new()
                .fit(split.train.features(), split.train.targets())
                .context("linear regression fit failed")?;
            let predicted = model
                .predict(split.test.features())
                .context("prediction failed")?;
            let mse = mean_squared_error(split.test.targets(), &predicted)?;
            let r2 = r2_score(split.test.targets(), &predicted)?;
            info!(
                coefficients = ?model.coefficients(),
                intercept = model.intercept(),
                mse,
                r2,
                "regression evaluated"
            );

            let x: Vec<f64> = split.test.features().iter().map(|row| row[0]).collect();
            RegressionPlot::default()
                .save(&plot, &x, split.test.targets(), &predicted)
                .context("failed to write plot")?;

            let output = RegressOutput {
                n_train: split.train.n_samples(),
                n_test: split.test.n_samples(),
                coefficients: model.coefficients().to_vec(),
                intercept: model.intercept(),
                mse,
                r2,
                plot,
            };
            println!("{}", serde_json::to_string_pretty(&output)?);
        }

        Command::Process { n_samples, output } => {
            let raw = make_tabular(n_samples, cli.seed).context("failed to generate table")?;
            let cleaned = Cleaner::new().clean(&raw).context("cleaning failed")?;
            info!(
                n_input = cleaned.report.n_input,
                n_output = cleaned.report.n_output,
                "table cleaned"
            );
            let processed = engineer_features(&cleaned.table).context("feature engineering failed")?;
            write_table_csv(&output, &processed).context("failed to write processed CSV")?;

            let result = ProcessOutput {
                output,
                n_columns: processed.n_columns(),
                cleaning: cleaned.report,
                summary: describe(&processed),
            };
            println!("{}", serde_json::to_string_pretty(&result)?);
        }

        Command::Train {
            data,
            load_csv,
            n_samples,
            n_estimators,
            max_depth,
            cv_folds,
            test_size,
            output_dir,
        } => {
            let dataset: Dataset<usize> = if load_csv {
                TableReader::new(&data)
                    .read()
                    .context("failed to read training CSV")?
                    .into_dataset("target")
                    .context("training CSV has no usable target column")?
            } else {
                make_classification(n_samples, 5, 2, cli.seed)
                    .context("failed to generate classification data")?
            };
            info!(n_samples = dataset.n_samples(), n_features = dataset.n_features(), "dataset ready");

            let split = train_test_split(&dataset, test_size, cli.seed).context("failed to split data")?;
            let rf_config = RandomForestConfig::new(n_estimators)?
                .with_max_depth(Some(max_depth))
                .with_seed(cli.seed);

            let cv_result = CrossValidation::new(cv_folds)?
                .with_seed(cli.seed)
                .evaluate(
                    &rf_config,
                    split.train.features(),
                    split.train.targets(),
                    split.train.feature_names(),
                )
                .context("cross-validation failed")?;

            let fit = rf_config
                .fit(
                    split.train.features(),
                    split.train.targets(),
                    split.train.feature_names(),
                )
                .context("final model training failed")?;
            let forest = fit.forest();
            let predicted = forest
                .predict_batch(split.test.features())
                .context("prediction failed")?;
            // The test split may hold a class the training split never saw.
            let n_classes = split
                .test
                .targets()
                .iter()
                .fold(forest.n_classes(), |k, &t| k.max(t + 1));
            let confusion = ConfusionMatrix::from_labels(split.test.targets(), &predicted, n_classes)?;
            let report = confusion.report();
            info!(test_accuracy = report.accuracy, "held-out evaluation complete");
            debug!("classification report:\n{report}");

            let writer = ResultWriter::new(&output_dir)?;
            forest
                .save(writer.model_path())
                .context("failed to save model")?;
            writer.write_metrics(&TrainingMetrics {
                cv_scores: cv_result.fold_scores.clone(),
                mean_cv_score: cv_result.mean_score,
                std_cv_score: cv_result.std_score,
                test_accuracy: report.accuracy,
            })?;
            writer.write_config(&RunConfig {
                timestamp: chrono::Utc::now().to_rfc3339(),
                data_path: data.display().to_string(),
                n_estimators,
                max_depth: Some(max_depth),
                train_samples: split.train.n_samples(),
                test_samples: split.test.n_samples(),
                seed: cli.seed,
            })?;

            let output = TrainOutput {
                output_dir,
                train_samples: split.train.n_samples(),
                test_samples: split.test.n_samples(),
                cv_scores: cv_result.fold_scores,
                mean_cv_score: cv_result.mean_score,
                std_cv_score: cv_result.std_score,
                test_accuracy: report.accuracy,
                importances: fit.importances().to_vec(),
                report,
            };
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
    }

    Ok(())
}
