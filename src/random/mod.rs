/*
 * @Description  : 随机数源：权重初始化与噪声采样共用的可注入随机数生成器
 */

use ndarray::{Array1, Array2};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::errors::GanError;


/// 噪声分布
///
/// 未缩放的大数值噪声会让生成器隐藏层的 sigmoid 直接饱和，
/// 因此默认使用`[-1, 1)`上的均匀分布。
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum NoiseDistribution {
    /// `[low, high)`上的均匀分布
    Uniform { low: f64, high: f64 },
    /// 正态分布
    Normal { mean: f64, std: f64 },
}

impl Default for NoiseDistribution {
    fn default() -> Self {
        Self::Uniform {
            low: -1.0,
            high: 1.0,
        }
    }
}

impl NoiseDistribution {
    pub fn validate(&self) -> Result<(), GanError> {
        match *self {
            Self::Uniform { low, high } => {
                if !(low.is_finite() && high.is_finite() && low < high) {
                    return Err(GanError::InvalidConfig(format!(
                        "均匀噪声须满足low<high且均为有限值，实际为[{low}, {high})"
                    )));
                }
            }
            Self::Normal { mean, std } => {
                if !(mean.is_finite() && std.is_finite() && std > 0.0) {
                    return Err(GanError::InvalidConfig(format!(
                        "正态噪声须满足std>0且均为有限值，实际为mean={mean}, std={std}"
                    )));
                }
            }
        }
        Ok(())
    }
}

/// 可注入的伪随机数源
///
/// 由训练循环独占持有，测试中通过固定种子获得可复现的结果。
#[derive(Debug, Clone)]
pub struct RandomSource {
    rng: StdRng,
}

impl RandomSource {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// `[low, high)`上的均匀采样，调用方需保证`low < high`
    pub fn uniform(&mut self, low: f64, high: f64) -> f64 {
        self.rng.gen_range(low..high)
    }

    /// Box-Muller 变换生成正态分布样本
    pub fn normal(&mut self, mean: f64, std: f64) -> f64 {
        // u1 取开区间下界，避免 ln(0)
        let u1: f64 = self.rng.gen_range(f64::MIN_POSITIVE..1.0);
        let u2: f64 = self.rng.gen_range(0.0..1.0);
        let z0 = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
        mean + std * z0
    }

    pub fn sample(&mut self, distribution: &NoiseDistribution) -> f64 {
        match *distribution {
            NoiseDistribution::Uniform { low, high } => self.uniform(low, high),
            NoiseDistribution::Normal { mean, std } => self.normal(mean, std),
        }
    }

    /// 采样一条长度为`dim`的噪声向量，各分量独立同分布
    pub fn noise_vector(&mut self, dim: usize, distribution: &NoiseDistribution) -> Array1<f64> {
        Array1::from_shape_simple_fn(dim, || self.sample(distribution))
    }

    pub fn matrix_with(
        &mut self,
        rows: usize,
        cols: usize,
        mut f: impl FnMut(&mut Self) -> f64,
    ) -> Array2<f64> {
        Array2::from_shape_simple_fn((rows, cols), || f(self))
    }
}
