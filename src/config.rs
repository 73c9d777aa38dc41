/*
 * @Description  : 训练配置：网络尺寸、学习率、训练轮数与随机种子
 */

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::errors::{ComparisonOperator, GanError, ensure_positive};
use crate::nn::Init;
use crate::random::NoiseDistribution;

/// GAN 训练配置
///
/// 可直接从 JSON 读取，缺省字段取`Default`中的值：
/// ```ignore
/// let config = GanConfig::from_json_str(r#"{"data_dim": 4, "noise_dim": 4}"#)?;
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GanConfig {
    /// 真实数据向量的维度（即生成器输出维度、判别器输入维度）
    pub data_dim: usize,
    /// 噪声向量的维度
    pub noise_dim: usize,
    pub generator_hidden_size: usize,
    pub discriminator_hidden_size: usize,
    pub learning_rate: f64,
    /// 每个 epoch 结束后学习率乘以该系数，取值 (0, 1]，1 表示不衰减
    pub learning_rate_decay: f64,
    pub num_epochs: usize,
    pub num_batches: usize,
    /// 每个训练步使用的真实样本数，逐样本梯度取平均后只更新一次
    pub batch_size: usize,
    pub seed: u64,
    pub noise: NoiseDistribution,
    pub weight_init: Init,
    /// 连续出现多少次数值不稳定后中止训练
    pub max_consecutive_failures: usize,
    /// 每隔多少个 epoch 输出一次 info 日志
    pub log_every: usize,
}

impl Default for GanConfig {
    fn default() -> Self {
        Self {
            data_dim: 64,
            noise_dim: 64,
            generator_hidden_size: 128,
            discriminator_hidden_size: 128,
            learning_rate: 0.1,
            learning_rate_decay: 1.0,
            num_epochs: 100,
            num_batches: 100,
            batch_size: 1,
            seed: 42,
            noise: NoiseDistribution::default(),
            weight_init: Init::default(),
            max_consecutive_failures: 10,
            log_every: 10,
        }
    }
}

impl GanConfig {
    pub fn from_json_str(json: &str) -> Result<Self, GanError> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| GanError::InvalidConfig(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, GanError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|e| {
            GanError::InvalidConfig(format!("无法读取配置文件{}：{e}", path.display()))
        })?;
        Self::from_json_str(&json)
    }

    pub fn to_json_string(&self) -> Result<String, GanError> {
        serde_json::to_string_pretty(self).map_err(|e| GanError::InvalidConfig(e.to_string()))
    }

    /// 总训练步数 = num_epochs × num_batches
    pub fn total_steps(&self) -> usize {
        self.num_epochs * self.num_batches
    }

    /// 校验配置，任何一项不合法都会使网络构建失败
    pub fn validate(&self) -> Result<(), GanError> {
        ensure_positive("data_dim", self.data_dim)?;
        ensure_positive("noise_dim", self.noise_dim)?;
        ensure_positive("generator_hidden_size", self.generator_hidden_size)?;
        ensure_positive("discriminator_hidden_size", self.discriminator_hidden_size)?;
        ensure_positive("num_epochs", self.num_epochs)?;
        ensure_positive("num_batches", self.num_batches)?;
        ensure_positive("batch_size", self.batch_size)?;
        ensure_positive("max_consecutive_failures", self.max_consecutive_failures)?;
        ensure_positive("log_every", self.log_every)?;

        if !(self.learning_rate.is_finite() && self.learning_rate > 0.0) {
            return Err(GanError::must_be_greater_than("learning_rate", 0.0));
        }
        if !(self.learning_rate_decay.is_finite() && self.learning_rate_decay > 0.0) {
            return Err(GanError::must_be_greater_than("learning_rate_decay", 0.0));
        }
        if self.learning_rate_decay > 1.0 {
            return Err(GanError::ValueMustSatisfyComparison {
                value_name: "learning_rate_decay".to_string(),
                operator: ComparisonOperator::LessOrEqual,
                threshold: 1.0,
            });
        }

        self.noise.validate()?;
        self.weight_init.validate()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::GanConfig;
    use crate::assert_err;
    use crate::errors::{ComparisonOperator, GanError};
    use crate::nn::Init;
    use crate::random::NoiseDistribution;

    #[test]
    fn test_default_config_is_valid() {
        let config = GanConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.total_steps(), 100 * 100);
    }

    #[test]
    fn test_from_json_with_defaults() {
        let config = GanConfig::from_json_str(
            r#"{
                "data_dim": 4,
                "noise_dim": 4,
                "generator_hidden_size": 3,
                "discriminator_hidden_size": 3,
                "noise": {"kind": "normal", "mean": 0.0, "std": 0.5},
                "weight_init": {"kind": "uniform", "low": -0.1, "high": 0.1}
            }"#,
        )
        .unwrap();

        assert_eq!(config.data_dim, 4);
        assert_eq!(config.generator_hidden_size, 3);
        assert_eq!(config.noise, NoiseDistribution::Normal { mean: 0.0, std: 0.5 });
        assert_eq!(config.weight_init, Init::Uniform { low: -0.1, high: 0.1 });
        // 未给出的字段取默认值
        assert_eq!(config.num_epochs, GanConfig::default().num_epochs);
        assert_eq!(config.seed, 42);
    }

    #[test]
    fn test_json_round_trip() {
        let config = GanConfig {
            seed: 7,
            learning_rate_decay: 0.5,
            ..GanConfig::default()
        };
        let json = config.to_json_string().unwrap();
        assert_eq!(GanConfig::from_json_str(&json).unwrap(), config);
    }

    #[test]
    fn test_malformed_json() {
        let result = GanConfig::from_json_str("{ data_dim: ");
        assert_err!(result, GanError::InvalidConfig(_));

        let result = GanConfig::from_json_str(r#"{"noise": {"kind": "cauchy"}}"#);
        assert_err!(result, GanError::InvalidConfig(_));
    }

    #[test]
    fn test_missing_file() {
        let result = GanConfig::from_json_file("definitely/not/here.json");
        assert_err!(result, GanError::InvalidConfig(msg) if msg.contains("not/here.json"));
    }

    #[test]
    fn test_validate_rejects_non_positive_values() {
        let cases = [
            ("data_dim", GanConfig { data_dim: 0, ..GanConfig::default() }),
            ("noise_dim", GanConfig { noise_dim: 0, ..GanConfig::default() }),
            (
                "generator_hidden_size",
                GanConfig { generator_hidden_size: 0, ..GanConfig::default() },
            ),
            (
                "discriminator_hidden_size",
                GanConfig { discriminator_hidden_size: 0, ..GanConfig::default() },
            ),
            ("num_epochs", GanConfig { num_epochs: 0, ..GanConfig::default() }),
            ("num_batches", GanConfig { num_batches: 0, ..GanConfig::default() }),
            ("batch_size", GanConfig { batch_size: 0, ..GanConfig::default() }),
            ("learning_rate", GanConfig { learning_rate: 0.0, ..GanConfig::default() }),
            ("learning_rate", GanConfig { learning_rate: -0.1, ..GanConfig::default() }),
            ("learning_rate", GanConfig { learning_rate: f64::NAN, ..GanConfig::default() }),
        ];
        for (name, config) in cases {
            assert_err!(
                config.validate(),
                GanError::ValueMustSatisfyComparison { value_name, operator, .. }
                    if value_name == name && *operator == ComparisonOperator::GreaterThan
            );
        }
    }

    #[test]
    fn test_validate_decay_range() {
        let config = GanConfig {
            learning_rate_decay: 1.5,
            ..GanConfig::default()
        };
        assert_err!(
            config.validate(),
            GanError::ValueMustSatisfyComparison { operator: ComparisonOperator::LessOrEqual, .. }
        );
        assert_eq!(
            config.validate().unwrap_err().to_string(),
            "learning_rate_decay须≤1"
        );
    }

    #[test]
    fn test_validate_distributions() {
        let config = GanConfig {
            noise: NoiseDistribution::Uniform { low: 1.0, high: -1.0 },
            ..GanConfig::default()
        };
        assert_err!(config.validate(), GanError::InvalidConfig(_));

        let config = GanConfig {
            weight_init: Init::Normal { mean: 0.0, std: 0.0 },
            ..GanConfig::default()
        };
        assert_err!(config.validate(), GanError::InvalidConfig(_));
    }
}
