/*
 * @Description  : 梯度下降优化器实现
 */

use super::dense::NetworkGradients;
use super::module::Module;
use crate::errors::{GanError, TrainingStage};

/// SGD (随机梯度下降) 优化器
///
/// 生成器和判别器各持有一个实例，分别只更新各自的参数。
#[derive(Debug, Clone, PartialEq)]
pub struct Sgd {
    learning_rate: f64,
    /// 用于报错时标明是哪个网络
    stage: TrainingStage,
}

impl Sgd {
    /// 创建新的SGD优化器，学习率须为正的有限值
    pub fn new(learning_rate: f64, stage: TrainingStage) -> Result<Self, GanError> {
        validate_learning_rate(learning_rate)?;
        Ok(Self {
            learning_rate,
            stage,
        })
    }

    /// 获取学习率
    pub fn learning_rate(&self) -> f64 {
        self.learning_rate
    }

    /// 设置学习率
    pub fn set_learning_rate(&mut self, learning_rate: f64) -> Result<(), GanError> {
        validate_learning_rate(learning_rate)?;
        self.learning_rate = learning_rate;
        Ok(())
    }

    /// 更新参数：θ = θ - α * ∇θ
    ///
    /// 先整体检查梯度的形状与有限性，全部通过后才写参数；
    /// 任何一项不通过都不会改动`module`。
    pub fn step(&self, module: &mut impl Module, gradients: &NetworkGradients) -> Result<(), GanError> {
        let [hidden, output] = module.layers();
        for (layer, gradient) in [(hidden, &gradients.hidden), (output, &gradients.output)] {
            if !gradient.matches(layer) {
                return Err(GanError::DimensionMismatch {
                    expected: layer.parameter_count(),
                    got: gradient.weights.len() + gradient.bias.len(),
                    message: format!("{}梯度的形状与参数不一致", self.stage),
                });
            }
        }
        if !gradients.is_finite() {
            return Err(GanError::NumericInstability { stage: self.stage });
        }

        let [hidden, output] = module.layers_mut();
        hidden.apply_gradient(&gradients.hidden, self.learning_rate);
        output.apply_gradient(&gradients.output, self.learning_rate);
        Ok(())
    }
}

fn validate_learning_rate(learning_rate: f64) -> Result<(), GanError> {
    if !(learning_rate.is_finite() && learning_rate > 0.0) {
        return Err(GanError::must_be_greater_than("learning_rate", 0.0));
    }
    Ok(())
}
