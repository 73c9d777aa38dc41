/*
 * @Description  : Module trait 定义
 */

use ndarray::{Array1, Array2};

use super::dense::Dense;

/// 模块 trait
///
/// # 设计原则
/// - `forward()` **不是** trait 方法（生成器与判别器签名各异）
/// - 两个网络都固定为“隐藏层 + 输出层”两层结构，`layers()` 按此顺序返回
/// - 优化器只通过本 trait 读写参数
pub trait Module {
    /// 按`[隐藏层, 输出层]`顺序返回各层
    fn layers(&self) -> [&Dense; 2];

    fn layers_mut(&mut self) -> [&mut Dense; 2];

    /// 获取参数数量
    fn num_params(&self) -> usize {
        self.layers().iter().map(|layer| layer.parameter_count()).sum()
    }

    fn hidden_weights(&self) -> &Array2<f64> {
        let [hidden, _] = self.layers();
        hidden.weights()
    }

    fn hidden_bias(&self) -> &Array1<f64> {
        let [hidden, _] = self.layers();
        hidden.bias()
    }

    fn output_weights(&self) -> &Array2<f64> {
        let [_, output] = self.layers();
        output.weights()
    }

    fn output_bias(&self) -> &Array1<f64> {
        let [_, output] = self.layers();
        output.bias()
    }
}
