use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;

use digit_mlp::{
    evaluate, train_epoch, Adam, Device, ExportDocument, Mnist, Network, Normalization,
    TrainConfig, IMAGE_PIXELS, NUM_CLASSES,
};

/// Trains an MLP digit classifier on MNIST and exports its weights as a
/// versioned JSON document for visualization.
#[derive(Parser, Debug)]
#[command(name = "digit-mlp", version, about)]
struct Cli {
    /// Number of training epochs
    #[arg(long, default_value_t = 5)]
    epochs: usize,

    /// Samples per mini-batch
    #[arg(long, default_value_t = 128)]
    batch_size: usize,

    /// Adam learning rate
    #[arg(long, default_value_t = 0.001)]
    lr: f32,

    /// Hidden layer widths; pass no values for a single-layer linear classifier
    #[arg(long, num_args = 0.., default_values_t = [64usize, 32])]
    hidden_dims: Vec<usize>,

    /// Compute device: auto or cpu
    #[arg(long, default_value = "auto")]
    device: String,

    /// Where to write the exported weight document
    #[arg(long, default_value = "exports/mlp_weights.json")]
    export_path: PathBuf,

    /// Directory containing the MNIST IDX files (.gz accepted)
    #[arg(long, default_value = "data")]
    data_dir: PathBuf,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("digit_mlp=info".parse()?),
        )
        .init();

    let cli = Cli::parse();
    let config = TrainConfig {
        epochs: cli.epochs,
        batch_size: cli.batch_size,
        learning_rate: cli.lr,
        hidden_dims: cli.hidden_dims,
        device: Device::resolve(&cli.device)?,
        export_path: cli.export_path,
    };
    run(&config, &cli.data_dir)
}

fn run(config: &TrainConfig, data_dir: &Path) -> Result<()> {
    let normalization = Normalization::MNIST;

    let train_set = Mnist::load_training(data_dir, normalization)
        .context("loading the MNIST training split")?;
    let test_set =
        Mnist::load_test(data_dir, normalization).context("loading the MNIST test split")?;
    info!(
        train_samples = train_set.len(),
        test_samples = test_set.len(),
        device = ?config.device,
        "dataset loaded"
    );

    let mut network = Network::new(IMAGE_PIXELS, &config.hidden_dims, NUM_CLASSES);
    info!(
        architecture = ?network.architecture(),
        parameters = network.parameter_count(),
        "model built"
    );

    let mut optimizer = Adam::new(config.learning_rate);
    let mut best_accuracy = 0.0f64;

    for epoch in 1..=config.epochs {
        let train = train_epoch(&mut network, &train_set, &mut optimizer, config.batch_size)?;
        let test = evaluate(&network, &test_set, config.batch_size);

        info!(
            epoch,
            total_epochs = config.epochs,
            train_loss = train.mean_loss,
            train_accuracy = train.accuracy,
            test_loss = test.mean_loss,
            test_accuracy = test.accuracy,
            "epoch complete"
        );

        if test.accuracy > best_accuracy {
            best_accuracy = test.accuracy;
            info!(accuracy = best_accuracy, "new best test accuracy");
        }
    }

    let document = ExportDocument::from_network(&network, normalization);
    document
        .write(&config.export_path)
        .context("writing the export document")?;
    info!(
        path = %config.export_path.display(),
        layers = document.network.layers.len(),
        best_accuracy,
        "weights exported"
    );

    Ok(())
}
