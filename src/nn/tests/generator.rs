use ndarray::{Array1, Array2};

use super::{DATA_DIM, HIDDEN_SIZE, NOISE_DIM, fixed_noise, small_networks};
use crate::assert_err;
use crate::errors::GanError;
use crate::nn::{Dense, GeneratorNetwork, Init, Module};
use crate::random::{NoiseDistribution, RandomSource};

#[test]
fn test_generator_new() {
    let mut rng = RandomSource::new(0);
    let generator = GeneratorNetwork::new(64, 128, 784, &Init::Xavier, &mut rng).unwrap();

    assert_eq!(generator.noise_dim(), 64);
    assert_eq!(generator.hidden_size(), 128);
    assert_eq!(generator.output_dim(), 784);
    assert_eq!(generator.hidden_weights().dim(), (128, 64));
    assert_eq!(generator.output_weights().dim(), (784, 128));
    assert!(generator.hidden_bias().iter().all(|&b| b == 0.0));
    assert!(generator.output_bias().iter().all(|&b| b == 0.0));
    assert_eq!(generator.num_params(), 128 * 64 + 128 + 784 * 128 + 784);
}

#[test]
fn test_generator_new_rejects_zero_sizes() {
    let mut rng = RandomSource::new(0);
    assert_err!(
        GeneratorNetwork::new(4, 0, 4, &Init::Xavier, &mut rng),
        GanError::ValueMustSatisfyComparison { value_name, .. } if value_name == "generator_hidden_size"
    );
    assert_err!(
        GeneratorNetwork::new(0, 3, 4, &Init::Xavier, &mut rng),
        GanError::ValueMustSatisfyComparison { value_name, .. } if value_name == "noise_dim"
    );
    assert_err!(
        GeneratorNetwork::new(4, 3, 4, &Init::Normal { mean: 0.0, std: -1.0 }, &mut rng),
        GanError::InvalidConfig(_)
    );
}

/// 输出长度等于数据维度，且每个分量都严格落在 (0, 1) 内
#[test]
fn test_generate_output_range() {
    let (generator, _) = small_networks(11);
    let mut rng = RandomSource::new(5);
    let dist = NoiseDistribution::Uniform {
        low: -5.0,
        high: 5.0,
    };
    for _ in 0..200 {
        let noise = rng.noise_vector(NOISE_DIM, &dist);
        let sample = generator.generate(noise.view()).unwrap();
        assert_eq!(sample.len(), DATA_DIM);
        assert!(sample.iter().all(|&v| v > 0.0 && v < 1.0), "{sample}");
    }
}

/// 参数不变时，相同噪声必须得到逐位相同的输出
#[test]
fn test_generate_is_deterministic() {
    let (generator, _) = small_networks(11);
    let noise = fixed_noise();
    let first = generator.generate(noise.view()).unwrap();
    let second = generator.generate(noise.view()).unwrap();
    assert_eq!(first, second);

    let trace = generator.forward_trace(noise.view()).unwrap();
    assert_eq!(trace.output, first);
    assert_eq!(trace.hidden.len(), HIDDEN_SIZE);
}

#[test]
fn test_generate_wrong_noise_length() {
    let (generator, _) = small_networks(11);
    let noise = Array1::<f64>::zeros(NOISE_DIM - 1);
    assert_err!(generator.generate(noise.view()), GanError::InputShape(4, 3));

    let noise = Array1::<f64>::zeros(NOISE_DIM + 2);
    assert_err!(
        generator.forward_trace(noise.view()),
        GanError::InputShape { what, expected: 4, got: 6 } if what == "噪声向量"
    );
}

#[test]
fn test_generator_from_layers() {
    let hidden = Dense::from_parts(Array2::zeros((3, 2)), Array1::zeros(3)).unwrap();
    let output = Dense::from_parts(Array2::zeros((5, 3)), Array1::zeros(5)).unwrap();
    let generator = GeneratorNetwork::from_layers(hidden.clone(), output).unwrap();
    assert_eq!(generator.noise_dim(), 2);
    assert_eq!(generator.output_dim(), 5);

    // 零参数时所有输出都是 sigmoid(0)
    let sample = generator.generate(Array1::ones(2).view()).unwrap();
    assert!(sample.iter().all(|&v| v == 0.5));

    let bad_output = Dense::from_parts(Array2::zeros((5, 4)), Array1::zeros(5)).unwrap();
    assert_err!(
        GeneratorNetwork::from_layers(hidden, bad_output),
        GanError::DimensionMismatch(3, 4)
    );
}
