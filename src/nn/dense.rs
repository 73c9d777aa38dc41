/*
 * @Description  : 全连接层：参数存储、前向计算与反向传播
 *
 * 生成器与判别器都由两个 Dense 层组成（隐藏层 + 输出层），
 * 参数各自独占，不在网络之间共享。
 */

use ndarray::{Array1, Array2, ArrayView1, Axis};

use super::activation::sigmoid_array;
use super::init::Init;
use crate::errors::GanError;
use crate::random::RandomSource;

/// 全连接层：`logits = weights · x + bias`
#[derive(Debug, Clone, PartialEq)]
pub struct Dense {
    /// 形状为`[output_dim, input_dim]`
    weights: Array2<f64>,
    /// 长度为`output_dim`
    bias: Array1<f64>,
}

impl Dense {
    /// 创建新层：权重按`init`初始化，偏置全 0
    pub fn new(input_dim: usize, output_dim: usize, init: &Init, rng: &mut RandomSource) -> Self {
        Self {
            weights: init.generate(output_dim, input_dim, rng),
            bias: Array1::zeros(output_dim),
        }
    }

    /// 由已有参数构建，要求偏置长度与权重行数一致
    pub fn from_parts(weights: Array2<f64>, bias: Array1<f64>) -> Result<Self, GanError> {
        if weights.nrows() != bias.len() {
            return Err(GanError::DimensionMismatch {
                expected: weights.nrows(),
                got: bias.len(),
                message: "偏置长度须等于权重矩阵的行数".to_string(),
            });
        }
        Ok(Self { weights, bias })
    }

    pub fn input_dim(&self) -> usize {
        self.weights.ncols()
    }

    pub fn output_dim(&self) -> usize {
        self.weights.nrows()
    }

    pub fn weights(&self) -> &Array2<f64> {
        &self.weights
    }

    pub fn bias(&self) -> &Array1<f64> {
        &self.bias
    }

    pub(crate) fn weights_mut(&mut self) -> &mut Array2<f64> {
        &mut self.weights
    }

    pub(crate) fn bias_mut(&mut self) -> &mut Array1<f64> {
        &mut self.bias
    }

    pub fn parameter_count(&self) -> usize {
        self.weights.len() + self.bias.len()
    }

    /// 仿射变换（未激活）
    pub fn logits(&self, x: ArrayView1<f64>) -> Array1<f64> {
        self.weights.dot(&x) + &self.bias
    }

    /// 仿射变换后接 sigmoid
    pub fn forward(&self, x: ArrayView1<f64>) -> Array1<f64> {
        sigmoid_array(self.logits(x).view())
    }

    /// 反向传播
    ///
    /// `delta`是损失对本层 logits 的梯度，`input`是前向时的输入。
    /// 返回本层参数的梯度以及损失对输入的梯度。
    pub fn backward(
        &self,
        input: ArrayView1<f64>,
        delta: ArrayView1<f64>,
    ) -> (DenseGradient, Array1<f64>) {
        // dL/dW = delta ⊗ input（外积）
        let weights = delta
            .insert_axis(Axis(1))
            .dot(&input.insert_axis(Axis(0)));
        let grad_input = self.weights.t().dot(&delta);
        (
            DenseGradient {
                weights,
                bias: delta.to_owned(),
            },
            grad_input,
        )
    }

    /// θ = θ - α * ∇θ
    pub(crate) fn apply_gradient(&mut self, gradient: &DenseGradient, learning_rate: f64) {
        self.weights.scaled_add(-learning_rate, &gradient.weights);
        self.bias.scaled_add(-learning_rate, &gradient.bias);
    }
}

/// 单个 Dense 层的参数梯度
#[derive(Debug, Clone, PartialEq)]
pub struct DenseGradient {
    pub weights: Array2<f64>,
    pub bias: Array1<f64>,
}

impl DenseGradient {
    pub fn zeros_like(layer: &Dense) -> Self {
        Self {
            weights: Array2::zeros(layer.weights.raw_dim()),
            bias: Array1::zeros(layer.bias.raw_dim()),
        }
    }

    /// 形状是否与`layer`的参数一致
    pub fn matches(&self, layer: &Dense) -> bool {
        self.weights.dim() == layer.weights.dim() && self.bias.len() == layer.bias.len()
    }

    pub fn accumulate(&mut self, other: &DenseGradient) {
        self.weights += &other.weights;
        self.bias += &other.bias;
    }

    pub fn scale(&mut self, factor: f64) {
        self.weights *= factor;
        self.bias *= factor;
    }

    pub fn is_finite(&self) -> bool {
        self.weights.iter().chain(self.bias.iter()).all(|g| g.is_finite())
    }

    pub fn squared_norm(&self) -> f64 {
        self.weights
            .iter()
            .chain(self.bias.iter())
            .map(|g| g * g)
            .sum()
    }
}

/// 整个网络（隐藏层 + 输出层）的参数梯度
#[derive(Debug, Clone, PartialEq)]
pub struct NetworkGradients {
    pub hidden: DenseGradient,
    pub output: DenseGradient,
}

impl NetworkGradients {
    /// 逐样本累加后再求平均，保证一次只写一份参数
    pub fn average(mut samples: Vec<NetworkGradients>) -> Option<NetworkGradients> {
        let count = samples.len();
        let mut total = samples.pop()?;
        for sample in &samples {
            total.accumulate(sample);
        }
        total.scale(1.0 / count as f64);
        Some(total)
    }

    pub fn accumulate(&mut self, other: &NetworkGradients) {
        self.hidden.accumulate(&other.hidden);
        self.output.accumulate(&other.output);
    }

    pub fn scale(&mut self, factor: f64) {
        self.hidden.scale(factor);
        self.output.scale(factor);
    }

    pub fn is_finite(&self) -> bool {
        self.hidden.is_finite() && self.output.is_finite()
    }

    /// 全部参数梯度的 L2 范数（训练步的 debug 日志中输出）
    pub fn norm(&self) -> f64 {
        (self.hidden.squared_norm() + self.output.squared_norm()).sqrt()
    }
}
