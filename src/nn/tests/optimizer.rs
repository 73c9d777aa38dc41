use approx::assert_relative_eq;
use ndarray::{Array1, Array2};

use super::{fixed_noise, real_sample, small_networks};
use crate::assert_err;
use crate::errors::{GanError, TrainingStage};
use crate::nn::loss::{discriminator_gradients, generator_gradients};
use crate::nn::{DenseGradient, Module, NetworkGradients, Sgd};

#[test]
fn test_sgd_new() {
    let sgd = Sgd::new(0.1, TrainingStage::Discriminator).unwrap();
    assert_eq!(sgd.learning_rate(), 0.1);

    assert_err!(
        Sgd::new(0.0, TrainingStage::Generator),
        GanError::ValueMustSatisfyComparison { value_name, .. } if value_name == "learning_rate"
    );
    assert_err!(Sgd::new(-0.5, TrainingStage::Generator));
    assert_err!(Sgd::new(f64::INFINITY, TrainingStage::Generator));
}

#[test]
fn test_sgd_set_learning_rate() {
    let mut sgd = Sgd::new(0.1, TrainingStage::Generator).unwrap();
    sgd.set_learning_rate(0.05).unwrap();
    assert_eq!(sgd.learning_rate(), 0.05);

    assert_err!(sgd.set_learning_rate(f64::NAN));
    assert_eq!(sgd.learning_rate(), 0.05);
}

/// θ = θ - α * ∇θ
#[test]
fn test_sgd_step_updates_parameters() {
    let (_, mut discriminator) = small_networks(41);
    let before = discriminator.clone();
    let real = real_sample();
    let fake = fixed_noise().mapv(|v| v.abs());

    let step = discriminator_gradients(&discriminator, real.view(), fake.view()).unwrap();
    let sgd = Sgd::new(0.1, TrainingStage::Discriminator).unwrap();
    sgd.step(&mut discriminator, &step.gradients).unwrap();

    let expected = before.hidden_weights() - &(&step.gradients.hidden.weights * 0.1);
    for (actual, expected) in discriminator.hidden_weights().iter().zip(expected.iter()) {
        assert_relative_eq!(*actual, *expected, epsilon = 1e-15);
    }
    let expected = before.output_bias()[0] - 0.1 * step.gradients.output.bias[0];
    assert_relative_eq!(discriminator.output_bias()[0], expected, epsilon = 1e-15);
    assert_ne!(discriminator, before);
}

/// 小学习率下沿负梯度走一步，损失应下降
#[test]
fn test_sgd_step_decreases_losses() {
    let (mut generator, mut discriminator) = small_networks(42);
    let real = real_sample();
    let noise = fixed_noise();
    let fake = generator.generate(noise.view()).unwrap();

    let d_step = discriminator_gradients(&discriminator, real.view(), fake.view()).unwrap();
    Sgd::new(1e-3, TrainingStage::Discriminator)
        .unwrap()
        .step(&mut discriminator, &d_step.gradients)
        .unwrap();
    let after = discriminator_gradients(&discriminator, real.view(), fake.view()).unwrap();
    assert!(after.loss < d_step.loss, "{} >= {}", after.loss, d_step.loss);

    let g_step = generator_gradients(&generator, &discriminator, noise.view()).unwrap();
    Sgd::new(1e-3, TrainingStage::Generator)
        .unwrap()
        .step(&mut generator, &g_step.gradients)
        .unwrap();
    let after = generator_gradients(&generator, &discriminator, noise.view()).unwrap();
    assert!(after.loss < g_step.loss, "{} >= {}", after.loss, g_step.loss);
}

/// 梯度中出现 NaN/Inf 时报错，且参数保持原样
#[test]
fn test_sgd_step_skips_non_finite() {
    let (mut generator, _) = small_networks(43);
    let before = generator.clone();
    let [hidden, output] = generator.layers();
    let mut gradients = NetworkGradients {
        hidden: DenseGradient::zeros_like(hidden),
        output: DenseGradient::zeros_like(output),
    };
    gradients.hidden.bias[0] = 1.0;
    gradients.output.weights[[0, 0]] = f64::NAN;

    let sgd = Sgd::new(0.1, TrainingStage::Generator).unwrap();
    assert_err!(
        sgd.step(&mut generator, &gradients),
        GanError::NumericInstability { stage } if *stage == TrainingStage::Generator
    );
    assert_eq!(generator, before);

    gradients.output.weights[[0, 0]] = f64::INFINITY;
    assert_err!(sgd.step(&mut generator, &gradients));
    assert_eq!(generator, before);
}

#[test]
fn test_sgd_step_shape_mismatch() {
    let (mut generator, discriminator) = small_networks(44);
    let before = generator.clone();
    let [hidden, output] = discriminator.layers();
    // 判别器的梯度不能用于生成器
    let gradients = NetworkGradients {
        hidden: DenseGradient::zeros_like(hidden),
        output: DenseGradient::zeros_like(output),
    };
    let sgd = Sgd::new(0.1, TrainingStage::Generator).unwrap();
    assert_err!(sgd.step(&mut generator, &gradients), GanError::DimensionMismatch { .. });
    assert_eq!(generator, before);

    let gradients = NetworkGradients {
        hidden: DenseGradient {
            weights: Array2::zeros((3, 4)),
            bias: Array1::zeros(2),
        },
        output: DenseGradient::zeros_like(generator.output_layer()),
    };
    assert_err!(sgd.step(&mut generator, &gradients), GanError::DimensionMismatch(15, 14));
}

/// 生成器冻结时，反复更新判别器应把真实样本和固定的假样本分开
#[test]
fn test_discriminator_learns_to_separate() {
    use crate::nn::{DiscriminatorNetwork, Init};
    use crate::random::RandomSource;

    let mut rng = RandomSource::new(7);
    let mut discriminator = DiscriminatorNetwork::new(4, 3, &Init::Xavier, &mut rng).unwrap();
    let real = Array1::from_elem(4, 0.9);
    let fake = Array1::from_elem(4, 0.5);
    let p_real_before = discriminator.discriminate(real.view()).unwrap();
    let p_fake_before = discriminator.discriminate(fake.view()).unwrap();

    let sgd = Sgd::new(0.1, TrainingStage::Discriminator).unwrap();
    for _ in 0..1000 {
        let step = discriminator_gradients(&discriminator, real.view(), fake.view()).unwrap();
        sgd.step(&mut discriminator, &step.gradients).unwrap();
    }

    let p_real = discriminator.discriminate(real.view()).unwrap();
    let p_fake = discriminator.discriminate(fake.view()).unwrap();
    assert!(p_real > p_real_before, "D(real): {p_real_before} -> {p_real}");
    assert!(p_fake < p_fake_before, "D(fake): {p_fake_before} -> {p_fake}");
    assert!(p_real - p_fake > 0.5);
}
