/*
 * @Description  : 判别器：样本 -> 隐藏层(Sigmoid) -> 单输出单元(Sigmoid) -> 为真概率
 */

use ndarray::{Array1, ArrayView1, array};

use super::activation::{sigmoid, sigmoid_derivative_array};
use super::dense::{Dense, NetworkGradients};
use super::init::Init;
use super::module::Module;
use crate::errors::{GanError, ensure_positive};
use crate::random::RandomSource;

/// 判别器网络
#[derive(Debug, Clone, PartialEq)]
pub struct DiscriminatorNetwork {
    hidden: Dense,
    /// 只有 1 个输出单元
    output: Dense,
}

#[derive(Debug, Clone)]
pub struct DiscriminatorTrace {
    pub input: Array1<f64>,
    pub hidden: Array1<f64>,
    pub logit: f64,
    pub probability: f64,
}

impl DiscriminatorNetwork {
    pub fn new(
        input_dim: usize,
        hidden_size: usize,
        init: &Init,
        rng: &mut RandomSource,
    ) -> Result<Self, GanError> {
        ensure_positive("data_dim", input_dim)?;
        ensure_positive("discriminator_hidden_size", hidden_size)?;
        init.validate()?;

        Ok(Self {
            hidden: Dense::new(input_dim, hidden_size, init, rng),
            output: Dense::new(hidden_size, 1, init, rng),
        })
    }

    pub fn from_layers(hidden: Dense, output: Dense) -> Result<Self, GanError> {
        if hidden.output_dim() != output.input_dim() {
            return Err(GanError::DimensionMismatch {
                expected: hidden.output_dim(),
                got: output.input_dim(),
                message: "判别器输出层的输入维度须等于隐藏层大小".to_string(),
            });
        }
        if output.output_dim() != 1 {
            return Err(GanError::DimensionMismatch {
                expected: 1,
                got: output.output_dim(),
                message: "判别器输出层只能有1个单元".to_string(),
            });
        }
        Ok(Self { hidden, output })
    }

    pub fn input_dim(&self) -> usize {
        self.hidden.input_dim()
    }

    pub fn hidden_size(&self) -> usize {
        self.hidden.output_dim()
    }

    pub fn hidden_layer(&self) -> &Dense {
        &self.hidden
    }

    pub fn output_layer(&self) -> &Dense {
        &self.output
    }

    /// 估计`data`为真实样本的概率，结果在 (0, 1) 内
    ///
    /// logit 饱和时会舍入为恰好 0.0 或 1.0（见[`sigmoid`]），损失中的对数截断保证此时仍是有限值。
    pub fn discriminate(&self, data: ArrayView1<f64>) -> Result<f64, GanError> {
        Ok(self.forward_trace(data)?.probability)
    }

    pub fn forward_trace(&self, data: ArrayView1<f64>) -> Result<DiscriminatorTrace, GanError> {
        if data.len() != self.input_dim() {
            return Err(GanError::input_shape("判别器输入向量", self.input_dim(), data.len()));
        }
        let hidden = self.hidden.forward(data);
        let logit = self.output.logits(hidden.view())[0];
        Ok(DiscriminatorTrace {
            input: data.to_owned(),
            hidden,
            logit,
            probability: sigmoid(logit),
        })
    }

    /// 反向传播
    ///
    /// `grad_logit`是损失对输出 logit 的梯度。返回参数梯度和损失对输入样本的梯度；
    /// 后者在生成器更新时用于把梯度传回生成器，此时判别器参数保持不变。
    pub fn backward(
        &self,
        trace: &DiscriminatorTrace,
        grad_logit: f64,
    ) -> (NetworkGradients, Array1<f64>) {
        let output_delta = array![grad_logit];
        let (output_grad, grad_hidden) = self.output.backward(trace.hidden.view(), output_delta.view());

        let hidden_delta = grad_hidden * sigmoid_derivative_array(trace.hidden.view());
        let (hidden_grad, grad_input) = self.hidden.backward(trace.input.view(), hidden_delta.view());

        (
            NetworkGradients {
                hidden: hidden_grad,
                output: output_grad,
            },
            grad_input,
        )
    }
}

impl Module for DiscriminatorNetwork {
    fn layers(&self) -> [&Dense; 2] {
        [&self.hidden, &self.output]
    }

    fn layers_mut(&mut self) -> [&mut Dense; 2] {
        [&mut self.hidden, &mut self.output]
    }
}
