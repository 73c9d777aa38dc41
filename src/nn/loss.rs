/*
 * @Description  : 对抗损失（二元交叉熵）及其对两个网络参数的梯度
 *
 * 判别器：L_D = -[ln D(real) + ln(1 - D(fake))]
 * 生成器（非饱和形式）：L_G = -ln D(G(z))
 *
 * 所有对数都先把自变量截断到 LOG_EPSILON 以上，返回的梯度是截断后损失的精确导数。
 * NaN 概率不参与截断，损失与梯度都保持 NaN，交由训练循环判定为数值不稳定。
 */

use ndarray::{Array1, ArrayView1};

use super::dense::NetworkGradients;
use super::discriminator::DiscriminatorNetwork;
use super::generator::GeneratorNetwork;
use crate::errors::GanError;

/// 对数自变量的下限
pub const LOG_EPSILON: f64 = 1e-12;

/// ln(max(x, ε))，NaN 原样传出
pub fn safe_ln(x: f64) -> f64 {
    if x.is_nan() {
        return f64::NAN;
    }
    x.max(LOG_EPSILON).ln()
}

pub fn discriminator_loss(real_probability: f64, fake_probability: f64) -> f64 {
    -(safe_ln(real_probability) + safe_ln(1.0 - fake_probability))
}

pub fn generator_loss(fake_probability: f64) -> f64 {
    -safe_ln(fake_probability)
}

/// 标签为 1 时 -ln(max(p, ε)) 对 logit 的梯度
///
/// -1/p · p(1-p) 化简为 -(1-p)；截断区内损失为常数，梯度为 0。NaN 概率得到 NaN 梯度。
fn real_label_grad(probability: f64) -> f64 {
    if probability.is_nan() || probability > LOG_EPSILON {
        -(1.0 - probability)
    } else {
        0.0
    }
}

/// 标签为 0 时 -ln(max(1-p, ε)) 对 logit 的梯度
fn fake_label_grad(probability: f64) -> f64 {
    if probability.is_nan() || 1.0 - probability > LOG_EPSILON {
        probability
    } else {
        0.0
    }
}

/// 判别器一步的损失与梯度
#[derive(Debug, Clone)]
pub struct DiscriminatorStep {
    pub loss: f64,
    /// D(real)
    pub real_probability: f64,
    /// D(fake)
    pub fake_probability: f64,
    pub gradients: NetworkGradients,
}

/// 生成器一步的损失与梯度
#[derive(Debug, Clone)]
pub struct GeneratorStep {
    pub loss: f64,
    /// D(G(z))，判别器为本步更新后、保持不变的参数
    pub fake_probability: f64,
    pub fake: Array1<f64>,
    pub gradients: NetworkGradients,
}

/// 计算 L_D 及其对判别器全部参数的梯度
///
/// 真实样本和生成样本各做一次反向传播，两份梯度相加。
pub fn discriminator_gradients(
    discriminator: &DiscriminatorNetwork,
    real: ArrayView1<f64>,
    fake: ArrayView1<f64>,
) -> Result<DiscriminatorStep, GanError> {
    let real_trace = discriminator.forward_trace(real)?;
    let fake_trace = discriminator.forward_trace(fake)?;

    let (mut gradients, _) =
        discriminator.backward(&real_trace, real_label_grad(real_trace.probability));
    let (fake_gradients, _) =
        discriminator.backward(&fake_trace, fake_label_grad(fake_trace.probability));
    gradients.accumulate(&fake_gradients);

    Ok(DiscriminatorStep {
        loss: discriminator_loss(real_trace.probability, fake_trace.probability),
        real_probability: real_trace.probability,
        fake_probability: fake_trace.probability,
        gradients,
    })
}

/// 计算 L_G 及其对生成器全部参数的梯度
///
/// 梯度经过判别器传回生成器；判别器只参与计算，不会被修改。
pub fn generator_gradients(
    generator: &GeneratorNetwork,
    discriminator: &DiscriminatorNetwork,
    noise: ArrayView1<f64>,
) -> Result<GeneratorStep, GanError> {
    let generator_trace = generator.forward_trace(noise)?;
    let discriminator_trace = discriminator.forward_trace(generator_trace.output.view())?;
    let probability = discriminator_trace.probability;

    let (_, grad_fake) = discriminator.backward(&discriminator_trace, real_label_grad(probability));
    let gradients = generator.backward(&generator_trace, grad_fake.view());

    Ok(GeneratorStep {
        loss: generator_loss(probability),
        fake_probability: probability,
        fake: generator_trace.output,
        gradients,
    })
}
