/*
 * @Description  : 生成器：噪声 -> 隐藏层(Sigmoid) -> 输出层(Sigmoid) -> 合成样本
 */

use ndarray::{Array1, ArrayView1};

use super::activation::sigmoid_derivative_array;
use super::dense::{Dense, NetworkGradients};
use super::init::Init;
use super::module::Module;
use crate::errors::{GanError, ensure_positive};
use crate::random::RandomSource;

/// 生成器网络
///
/// 输出维度与真实数据维度一致，每个分量都落在 (0, 1) 内，
/// 与归一化后的像素强度同一量纲。
#[derive(Debug, Clone, PartialEq)]
pub struct GeneratorNetwork {
    hidden: Dense,
    output: Dense,
}

/// 一次前向传播保留下来的中间值，供反向传播使用
#[derive(Debug, Clone)]
pub struct GeneratorTrace {
    pub noise: Array1<f64>,
    pub hidden: Array1<f64>,
    pub output: Array1<f64>,
}

impl GeneratorNetwork {
    pub fn new(
        noise_dim: usize,
        hidden_size: usize,
        output_dim: usize,
        init: &Init,
        rng: &mut RandomSource,
    ) -> Result<Self, GanError> {
        ensure_positive("noise_dim", noise_dim)?;
        ensure_positive("generator_hidden_size", hidden_size)?;
        ensure_positive("data_dim", output_dim)?;
        init.validate()?;

        Ok(Self {
            hidden: Dense::new(noise_dim, hidden_size, init, rng),
            output: Dense::new(hidden_size, output_dim, init, rng),
        })
    }

    /// 由已有的两层参数构建，要求隐藏层输出维度等于输出层输入维度
    pub fn from_layers(hidden: Dense, output: Dense) -> Result<Self, GanError> {
        if hidden.output_dim() != output.input_dim() {
            return Err(GanError::DimensionMismatch {
                expected: hidden.output_dim(),
                got: output.input_dim(),
                message: "生成器输出层的输入维度须等于隐藏层大小".to_string(),
            });
        }
        Ok(Self { hidden, output })
    }

    pub fn noise_dim(&self) -> usize {
        self.hidden.input_dim()
    }

    pub fn hidden_size(&self) -> usize {
        self.hidden.output_dim()
    }

    pub fn output_dim(&self) -> usize {
        self.output.output_dim()
    }

    pub fn hidden_layer(&self) -> &Dense {
        &self.hidden
    }

    pub fn output_layer(&self) -> &Dense {
        &self.output
    }

    /// 由噪声生成一条合成样本
    ///
    /// 各分量落在 (0, 1) 内；输出层 logit 极大（约 > 36.7）时对应分量舍入为 1.0，
    /// 见[`sigmoid`](super::activation::sigmoid)。
    pub fn generate(&self, noise: ArrayView1<f64>) -> Result<Array1<f64>, GanError> {
        Ok(self.forward_trace(noise)?.output)
    }

    pub fn forward_trace(&self, noise: ArrayView1<f64>) -> Result<GeneratorTrace, GanError> {
        if noise.len() != self.noise_dim() {
            return Err(GanError::input_shape("噪声向量", self.noise_dim(), noise.len()));
        }
        let hidden = self.hidden.forward(noise);
        let output = self.output.forward(hidden.view());
        Ok(GeneratorTrace {
            noise: noise.to_owned(),
            hidden,
            output,
        })
    }

    /// 反向传播：`grad_output`是损失对生成样本（sigmoid 之后）的梯度
    pub fn backward(&self, trace: &GeneratorTrace, grad_output: ArrayView1<f64>) -> NetworkGradients {
        let output_delta = &grad_output * &sigmoid_derivative_array(trace.output.view());
        let (output_grad, grad_hidden) = self.output.backward(trace.hidden.view(), output_delta.view());

        let hidden_delta = grad_hidden * sigmoid_derivative_array(trace.hidden.view());
        let (hidden_grad, _) = self.hidden.backward(trace.noise.view(), hidden_delta.view());

        NetworkGradients {
            hidden: hidden_grad,
            output: output_grad,
        }
    }
}

impl Module for GeneratorNetwork {
    fn layers(&self) -> [&Dense; 2] {
        [&self.hidden, &self.output]
    }

    fn layers_mut(&mut self) -> [&mut Dense; 2] {
        [&mut self.hidden, &mut self.output]
    }
}
