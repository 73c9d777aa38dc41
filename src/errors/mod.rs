use thiserror::Error;
mod ops;
pub use self::ops::*;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum GanError {
    // 配置数值校验（尺寸、学习率、轮数等）
    #[error("{value_name}须{operator}{threshold}")]
    ValueMustSatisfyComparison {
        value_name: String,
        operator: ComparisonOperator,
        threshold: f64,
    },
    // 网络之间或层之间的维度不一致
    #[error("维度不一致：{message}（预期{expected}，实际{got}）")]
    DimensionMismatch {
        expected: usize,
        got: usize,
        message: String,
    },
    #[error("配置无效：{0}")]
    InvalidConfig(String),

    // 单次调用的输入向量长度错误
    #[error("输入形状错误：{what}的长度应为{expected}，实际为{got}")]
    InputShape {
        what: String,
        expected: usize,
        got: usize,
    },

    #[error("数值不稳定：{stage}的损失或梯度出现非有限值（NaN/Inf），本次更新已跳过")]
    NumericInstability { stage: TrainingStage },

    #[error("训练已结束（共{total_steps}步），无法继续执行训练步")]
    TrainingFinished { total_steps: usize },
    #[error("真实数据源已耗尽")]
    DataExhausted,
}

impl GanError {
    /// 构造“`value_name`须大于`threshold`”的配置错误
    pub(crate) fn must_be_greater_than(value_name: &str, threshold: f64) -> Self {
        Self::ValueMustSatisfyComparison {
            value_name: value_name.to_string(),
            operator: ComparisonOperator::GreaterThan,
            threshold,
        }
    }

    pub(crate) fn input_shape(what: &str, expected: usize, got: usize) -> Self {
        Self::InputShape {
            what: what.to_string(),
            expected,
            got,
        }
    }
}

/// 校验`value`严格为正，否则返回配置错误
pub(crate) fn ensure_positive(value_name: &str, value: usize) -> Result<(), GanError> {
    if value == 0 {
        return Err(GanError::must_be_greater_than(value_name, 0.0));
    }
    Ok(())
}
