mod generator;
mod optimizer;

use ndarray::{Array1, array};

use super::{DiscriminatorNetwork, GeneratorNetwork, Init, Module};
use crate::random::RandomSource;

pub(super) const DATA_DIM: usize = 4;
pub(super) const NOISE_DIM: usize = 4;
pub(super) const HIDDEN_SIZE: usize = 3;

/// 构建一对小网络，偏置也随机化，保证每个参数的梯度都不为平凡值
pub(super) fn small_networks(seed: u64) -> (GeneratorNetwork, DiscriminatorNetwork) {
    let mut rng = RandomSource::new(seed);
    let init = Init::Uniform {
        low: -0.8,
        high: 0.8,
    };
    let mut generator =
        GeneratorNetwork::new(NOISE_DIM, HIDDEN_SIZE, DATA_DIM, &init, &mut rng).unwrap();
    let mut discriminator =
        DiscriminatorNetwork::new(DATA_DIM, HIDDEN_SIZE, &init, &mut rng).unwrap();

    for layer in generator
        .layers_mut()
        .into_iter()
        .chain(discriminator.layers_mut())
    {
        for b in layer.bias_mut().iter_mut() {
            *b = rng.uniform(-0.3, 0.3);
        }
    }
    (generator, discriminator)
}

pub(super) fn real_sample() -> Array1<f64> {
    array![0.9, 0.1, 0.7, 0.3]
}

pub(super) fn fixed_noise() -> Array1<f64> {
    array![0.5, -0.25, 0.75, -1.0]
}
