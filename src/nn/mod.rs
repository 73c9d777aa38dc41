/*
 * @Description  : 负责神经网络（neural network）的构建：两个单隐藏层网络、对抗损失与梯度下降
 */

pub mod activation;
mod dense;
mod discriminator;
mod generator;
mod init;
pub mod loss;
mod module;
pub mod optimizer;

pub use dense::{Dense, DenseGradient, NetworkGradients};
pub use discriminator::{DiscriminatorNetwork, DiscriminatorTrace};
pub use generator::{GeneratorNetwork, GeneratorTrace};
pub use init::Init;
pub use loss::{DiscriminatorStep, GeneratorStep, LOG_EPSILON};
pub use module::Module;
pub use optimizer::Sgd;

#[cfg(test)]
mod tests;
