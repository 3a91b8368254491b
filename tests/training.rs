use std::path::PathBuf;
use std::sync::mpsc;

use digit_dash::data::{ImageShape, Sample};
use digit_dash::train::{run_training_epoch, run_validation_epoch, OptimizerKind};
use digit_dash::{
    snapshot_channel, BatchStream, ConvNet, CrossEntropyLoss, DefaultSession, DriverState,
    HarnessError, Matrix, MetricSnapshot, Model, ModelConfig, Result, Sgd, TrainConfig,
    TrainingDriver, TrainingSession,
};

fn tiny_model() -> ModelConfig {
    ModelConfig {
        image_shape: ImageShape { height: 4, width: 4 },
        filters: 2,
        kernel_size: 3,
        hidden: 8,
        num_classes: 3,
        dropout: 0.0,
    }
}

fn samples(n: usize) -> Vec<Sample> {
    (0..n)
        .map(|i| Sample {
            image: (0..16).map(|p| ((i * 13 + p * 7) % 17) as f64 / 17.0).collect(),
            label: i % 3,
        })
        .collect()
}

fn parameter_bits(model: &impl Model) -> Vec<u64> {
    model
        .parameters()
        .iter()
        .flat_map(|m| m.data.iter().flatten().map(|v| v.to_bits()))
        .collect()
}

fn write_dataset(tag: &str, rows: usize) -> PathBuf {
    let path = std::env::temp_dir().join(format!("digit-dash-{}-{}.csv", tag, std::process::id()));
    let mut text = String::from("label");
    for p in 0..16 {
        text.push_str(&format!(",p{}", p));
    }
    for i in 0..rows {
        text.push_str(&format!("\n{}", i % 3));
        for p in 0..16 {
            text.push_str(&format!(",{}", (i * 31 + p * 11) % 256));
        }
    }
    text.push('\n');
    std::fs::write(&path, text).unwrap();
    path
}

fn small_config(data_path: PathBuf) -> TrainConfig {
    TrainConfig {
        data_path,
        epochs: 3,
        validation_count: 2,
        learning_rate: 0.01,
        batch_size: 1,
        optimizer: OptimizerKind::Sgd,
        model: tiny_model(),
        ..TrainConfig::default()
    }
}

#[test]
fn full_batch_sgd_loss_never_increases() {
    // One batch per epoch, so each reported loss is the loss before that
    // epoch's single small step.
    let mut stream = BatchStream::new(samples(4), 4, 1).unwrap();
    let mut model = ConvNet::new(tiny_model(), 7).unwrap();
    let mut sgd = Sgd::new(0.01);

    let losses: Vec<f64> = (0..25)
        .map(|_| run_training_epoch(&mut stream, &mut model, &CrossEntropyLoss, &mut sgd).unwrap().loss)
        .collect();

    for pair in losses.windows(2) {
        assert!(pair[1] <= pair[0] + 1e-9, "loss went up: {:?}", losses);
    }
    assert!(losses[losses.len() - 1] < losses[0]);
}

#[test]
fn training_changes_parameters_and_validation_does_not() {
    let mut train = BatchStream::new(samples(6), 2, 1).unwrap();
    let mut validation = BatchStream::new(samples(5), 2, 2).unwrap();
    let mut model = ConvNet::new(tiny_model(), 3).unwrap();

    let initial = parameter_bits(&model);
    run_training_epoch(&mut train, &mut model, &CrossEntropyLoss, &mut Sgd::new(0.1)).unwrap();
    let trained = parameter_bits(&model);
    assert_ne!(initial, trained);

    let first = run_validation_epoch(&mut validation, &model, &CrossEntropyLoss).unwrap();
    assert_eq!(parameter_bits(&model), trained);

    // Reshuffled order, same rows, same parameters: same accuracy.
    let second = run_validation_epoch(&mut validation, &model, &CrossEntropyLoss).unwrap();
    assert_eq!(first.accuracy, second.accuracy);
}

#[test]
fn observer_sees_one_growing_snapshot_per_epoch() {
    let path = write_dataset("e2e", 10);
    let session = DefaultSession::from_config(&small_config(path.clone())).unwrap();
    let _ = std::fs::remove_file(&path);

    let (tx, rx) = mpsc::channel();
    let mut driver = TrainingDriver::new(session, 3);
    assert_eq!(driver.state(), DriverState::Idle);
    driver.attach(tx);

    let last = driver.run().unwrap();
    assert_eq!(driver.state(), DriverState::Finished);

    let snapshots: Vec<MetricSnapshot> = rx.try_iter().collect();
    let epochs: Vec<Vec<usize>> = snapshots.iter().map(|s| s.epochs()).collect();
    assert_eq!(epochs, vec![vec![1], vec![1, 2], vec![1, 2, 3]]);

    // Published entries are never rewritten.
    assert_eq!(snapshots[2].records()[0], snapshots[0].records()[0]);
    assert_eq!(&snapshots[2].records()[..2], snapshots[1].records());
    assert_eq!(last, snapshots[2]);

    for record in last.records() {
        assert!((0.0..=1.0).contains(&record.train_accuracy));
        assert!((0.0..=1.0).contains(&record.validation_accuracy));
        assert!(record.train_loss.is_finite() && record.validation_loss.is_finite());
        assert_eq!(record.sample.pixels.len(), 16);
        assert!(record.sample.label < 3 && record.sample.prediction < 3);
    }
}

#[test]
fn headless_run_records_every_epoch() {
    let path = write_dataset("headless", 8);
    let session = DefaultSession::from_config(&small_config(path.clone())).unwrap();
    let _ = std::fs::remove_file(&path);

    let mut driver = TrainingDriver::new(session, 3);
    let snapshot = driver.run().unwrap();
    assert_eq!(snapshot.len(), 3);
    assert_eq!(driver.history().len(), 3);

    // No restart once finished.
    assert!(driver.run().is_err());
}

#[test]
fn training_continues_after_the_observer_goes_away() {
    let path = write_dataset("detach", 8);
    let session = DefaultSession::from_config(&small_config(path.clone())).unwrap();
    let _ = std::fs::remove_file(&path);

    let (tx, rx) = mpsc::channel::<MetricSnapshot>();
    let watcher = std::thread::spawn(move || {
        let first = rx.recv().map(|s| s.len());
        drop(rx);
        first
    });

    let mut driver = TrainingDriver::new(session, 3);
    driver.attach(tx);
    let snapshot = driver.run().unwrap();

    assert_eq!(snapshot.epochs(), vec![1, 2, 3]);
    assert_eq!(driver.state(), DriverState::Finished);
    assert_eq!(watcher.join().unwrap(), Ok(1));
}

#[test]
fn missing_dataset_fails_before_training() {
    let config = small_config(PathBuf::from("/definitely/not/here.csv"));
    assert!(DefaultSession::from_config(&config).is_err());
}

/// Delegates to a `ConvNet` but rejects the `fail_on`-th training batch.
struct FailingModel {
    inner: ConvNet,
    calls: usize,
    fail_on: usize,
}

impl Model for FailingModel {
    fn input_len(&self) -> usize {
        self.inner.input_len()
    }

    fn num_classes(&self) -> usize {
        self.inner.num_classes()
    }

    fn predict(&self, images: &Matrix, training_mode: bool) -> Result<Matrix> {
        self.inner.predict(images, training_mode)
    }

    fn forward_train(&mut self, images: &Matrix) -> Result<Matrix> {
        self.calls += 1;
        if self.calls == self.fail_on {
            return Err(HarnessError::shape_mismatch("a good batch", "a bad batch"));
        }
        self.inner.forward_train(images)
    }

    fn backward(&mut self, output_grad: &Matrix) -> Result<Vec<Matrix>> {
        self.inner.backward(output_grad)
    }

    fn parameters(&self) -> Vec<&Matrix> {
        self.inner.parameters()
    }

    fn parameters_mut(&mut self) -> Vec<&mut Matrix> {
        self.inner.parameters_mut()
    }
}

#[test]
fn failed_epoch_stops_the_run_and_keeps_the_last_snapshot() {
    // Two training batches per epoch: the third batch belongs to epoch 2.
    let model = FailingModel { inner: ConvNet::new(tiny_model(), 5).unwrap(), calls: 0, fail_on: 3 };
    let session = TrainingSession::new(
        model,
        CrossEntropyLoss,
        Sgd::new(0.01),
        BatchStream::new(samples(6), 3, 1).unwrap(),
        BatchStream::new(samples(3), 3, 2).unwrap(),
        ImageShape { height: 4, width: 4 },
        255.0,
    );

    let (tx, mut observer) = snapshot_channel();
    let mut driver = TrainingDriver::new(session, 5);
    driver.attach(tx);

    let err = driver.run().unwrap_err();
    assert!(matches!(err, HarnessError::ShapeMismatch { .. }));
    assert_eq!(driver.state(), DriverState::Running { epoch: 2 });
    assert_eq!(driver.history().len(), 1);

    // Nothing was published for epoch 2.
    assert_eq!(observer.poll().epochs(), vec![1]);
    assert!(!observer.is_finished());

    drop(driver);
    assert_eq!(observer.poll().epochs(), vec![1]);
    assert!(observer.is_finished());
}
