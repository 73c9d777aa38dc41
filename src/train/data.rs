/*
 * @Description  : 真实数据源接口
 *
 * 数据集读取、图像展平与归一化属于外部协作者，这里只约定“按需给出下一条真实样本”。
 */

use ndarray::Array1;

use crate::errors::{GanError, ensure_positive};

/// 真实样本来源
pub trait RealDataSource {
    /// 每条样本的长度
    fn data_dim(&self) -> usize;

    /// 取下一条样本；返回`None`表示数据已耗尽
    fn next_sample(&mut self) -> Option<Array1<f64>>;
}

/// 按顺序循环给出一组固定样本
#[derive(Debug, Clone)]
pub struct CyclicSamples {
    samples: Vec<Array1<f64>>,
    cursor: usize,
}

impl CyclicSamples {
    /// 样本列表不能为空，且所有样本长度一致
    pub fn new(samples: Vec<Array1<f64>>) -> Result<Self, GanError> {
        let data_dim = samples.first().map_or(0, |s| s.len());
        ensure_positive("samples.len()", samples.len())?;
        ensure_positive("data_dim", data_dim)?;
        if let Some(bad) = samples.iter().find(|s| s.len() != data_dim) {
            return Err(GanError::input_shape("真实数据向量", data_dim, bad.len()));
        }
        Ok(Self { samples, cursor: 0 })
    }

    /// 同一条样本重复出现（如常量目标任务）
    pub fn constant(sample: Array1<f64>) -> Result<Self, GanError> {
        Self::new(vec![sample])
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}

impl RealDataSource for CyclicSamples {
    fn data_dim(&self) -> usize {
        self.samples[0].len()
    }

    fn next_sample(&mut self) -> Option<Array1<f64>> {
        let sample = self.samples[self.cursor].clone();
        self.cursor = (self.cursor + 1) % self.samples.len();
        Some(sample)
    }
}

/// 由闭包提供样本，便于接入外部的数据加载器
pub struct FromFn<F> {
    data_dim: usize,
    f: F,
}

impl<F> FromFn<F>
where
    F: FnMut() -> Option<Array1<f64>>,
{
    pub fn new(data_dim: usize, f: F) -> Self {
        Self { data_dim, f }
    }
}

impl<F> RealDataSource for FromFn<F>
where
    F: FnMut() -> Option<Array1<f64>>,
{
    fn data_dim(&self) -> usize {
        self.data_dim
    }

    fn next_sample(&mut self) -> Option<Array1<f64>> {
        (self.f)()
    }
}
