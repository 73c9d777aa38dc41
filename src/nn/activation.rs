//! 激活函数：数值稳定的 sigmoid 及其导数

use ndarray::{Array1, ArrayView1};

/// sigmoid(x) = 1 / (1 + e^(-x))
///
/// 按符号分支计算，`e^(-x)`只在`x ≥ 0`时求值，对大幅负值的 logit 也不会溢出。
///
/// 结果受 f64 精度限制：`x`约大于 36.7 时舍入为`1.0`，约小于 -745 时下溢为`0.0`；
/// 在此区间内严格落在 (0, 1) 中。
pub fn sigmoid(x: f64) -> f64 {
    if x >= 0.0 {
        1.0 / (1.0 + (-x).exp())
    } else {
        let e = x.exp();
        e / (1.0 + e)
    }
}

/// 以 sigmoid 的输出`s`表示的导数：s * (1 - s)
pub fn sigmoid_derivative_from_output(s: f64) -> f64 {
    s * (1.0 - s)
}

pub fn sigmoid_array(x: ArrayView1<f64>) -> Array1<f64> {
    x.mapv(sigmoid)
}

pub fn sigmoid_derivative_array(output: ArrayView1<f64>) -> Array1<f64> {
    output.mapv(sigmoid_derivative_from_output)
}
