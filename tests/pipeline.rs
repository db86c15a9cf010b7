use std::path::PathBuf;

use house_price_ml::artifacts::ArtifactPaths;
use house_price_ml::{slider_bounds, FeatureVector, InferencePipeline, MlError};
use rand::Rng;

fn shipped_artifacts() -> ArtifactPaths {
    let root = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("artifacts");
    ArtifactPaths {
        scaler: root.join("scaler.json"),
        model: root.join("model.json"),
    }
}

fn pipeline() -> InferencePipeline {
    InferencePipeline::from_artifacts(&shipped_artifacts()).expect("shipped artifacts must load")
}

fn scratch_dir(tag: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("house-price-ml-{}-{}", tag, std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    dir
}

#[test]
fn default_slider_values_give_a_finite_price() {
    let price = pipeline().estimate_features(&FeatureVector::defaults()).unwrap();
    assert!(price.value().is_finite());
    assert!((price.value() - 1_009_595.30).abs() < 1.0, "got {}", price.value());
}

#[test]
fn maximum_slider_values_still_give_a_finite_price() {
    let price = pipeline().estimate(&[200_000.0, 100.0, 20.0, 10.0, 200_000.0]).unwrap();
    assert!(price.value().is_finite());
}

#[test]
fn predictions_are_not_clamped() {
    // Все слайдеры на минимуме: модель экстраполирует ниже нуля
    let price = pipeline().estimate(&[50_000.0, 0.0, 1.0, 1.0, 1_000.0]).unwrap();
    assert!(price.value() < 0.0);
    assert!(price.formatted().starts_with("-$"));
}

#[test]
fn random_in_bounds_inputs_are_finite_and_repeatable() {
    let p = pipeline();
    let bounds = slider_bounds();
    let mut rng = rand::thread_rng();

    for _ in 0..500 {
        let input: Vec<f64> = bounds
            .iter()
            .map(|b| {
                let steps = ((b.max - b.min) / b.step) as u64;
                b.min + rng.gen_range(0..=steps) as f64 * b.step
            })
            .collect();

        let first = p.estimate(&input).unwrap();
        let second = p.estimate(&input).unwrap();
        assert!(first.value().is_finite(), "non-finite for {:?}", input);
        assert_eq!(first.value().to_bits(), second.value().to_bits());
    }
}

#[test]
fn wrong_length_never_truncates_or_pads() {
    let p = pipeline();
    for input in [vec![], vec![70_000.0, 5.0, 7.0, 4.0], vec![70_000.0, 5.0, 7.0, 4.0, 30_000.0, 1.0]] {
        match p.estimate(&input) {
            Err(MlError::ShapeMismatch { expected: 5, actual }) => assert_eq!(actual, input.len()),
            other => panic!("expected ShapeMismatch for {:?}, got {:?}", input, other),
        }
    }
}

#[test]
fn shared_pipeline_serves_concurrent_calls() {
    let p = std::sync::Arc::new(pipeline());
    let expected = p.estimate_features(&FeatureVector::defaults()).unwrap();

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let p = p.clone();
            std::thread::spawn(move || p.estimate_features(&FeatureVector::defaults()).unwrap())
        })
        .collect();

    for h in handles {
        assert_eq!(h.join().unwrap(), expected);
    }
}

#[test]
fn missing_model_fails_at_load() {
    let paths = ArtifactPaths {
        scaler: shipped_artifacts().scaler,
        model: scratch_dir("missing").join("house_prediction.json"),
    };
    match InferencePipeline::from_artifacts(&paths) {
        Err(MlError::ArtifactLoad { path, .. }) => assert_eq!(path, paths.model),
        Err(other) => panic!("expected ArtifactLoad, got {:?}", other),
        Ok(_) => panic!("pipeline built without a model"),
    }
}

#[test]
fn missing_scaler_fails_at_load() {
    let paths = ArtifactPaths {
        scaler: scratch_dir("missing").join("sc_house.json"),
        model: shipped_artifacts().model,
    };
    assert!(matches!(
        InferencePipeline::from_artifacts(&paths),
        Err(MlError::ArtifactLoad { .. })
    ));
}

#[test]
fn corrupt_artifact_fails_at_load() {
    let dir = scratch_dir("corrupt");
    let model = dir.join("model.json");
    std::fs::write(&model, b"\x89HDF\r\n\x1a\n not json").unwrap();

    let paths = ArtifactPaths {
        scaler: shipped_artifacts().scaler,
        model,
    };
    assert!(matches!(
        InferencePipeline::from_artifacts(&paths),
        Err(MlError::ArtifactLoad { .. })
    ));
}
