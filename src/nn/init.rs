/*
 * @Description  : 参数初始化策略
 */

use ndarray::Array2;
use serde::{Deserialize, Serialize};

use crate::errors::GanError;
use crate::random::RandomSource;

/// 权重初始化策略（偏置始终初始化为 0）
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Init {
    /// 常数初始化
    Constant { value: f64 },
    /// 全零
    Zeros,
    /// `[low, high)`上的均匀分布
    Uniform { low: f64, high: f64 },
    /// 正态分布
    Normal { mean: f64, std: f64 },
    /// Xavier/Glorot 初始化（适用于 Sigmoid/Tanh）
    #[default]
    Xavier,
}

impl Init {
    /// 生成形状为`[fan_out, fan_in]`的权重矩阵
    pub fn generate(&self, fan_out: usize, fan_in: usize, rng: &mut RandomSource) -> Array2<f64> {
        match *self {
            Self::Constant { value } => Array2::from_elem((fan_out, fan_in), value),
            Self::Zeros => Array2::zeros((fan_out, fan_in)),
            Self::Uniform { low, high } => rng.matrix_with(fan_out, fan_in, |r| r.uniform(low, high)),
            Self::Normal { mean, std } => rng.matrix_with(fan_out, fan_in, |r| r.normal(mean, std)),
            Self::Xavier => {
                let std = (2.0 / (fan_in + fan_out) as f64).sqrt();
                rng.matrix_with(fan_out, fan_in, |r| r.normal(0.0, std))
            }
        }
    }

    pub fn validate(&self) -> Result<(), GanError> {
        match *self {
            Self::Constant { value } if !value.is_finite() => Err(GanError::InvalidConfig(
                format!("常数初始化值须为有限值，实际为{value}"),
            )),
            Self::Uniform { low, high } if !(low.is_finite() && high.is_finite() && low < high) => {
                Err(GanError::InvalidConfig(format!(
                    "均匀初始化须满足low<high且均为有限值，实际为[{low}, {high})"
                )))
            }
            Self::Normal { mean, std } if !(mean.is_finite() && std.is_finite() && std > 0.0) => {
                Err(GanError::InvalidConfig(format!(
                    "正态初始化须满足std>0且均为有限值，实际为mean={mean}, std={std}"
                )))
            }
            _ => Ok(()),
        }
    }
}
