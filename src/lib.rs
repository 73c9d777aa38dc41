//! # Mini GAN
//!
//! `mini_gan`用纯rust实现一个极简的生成对抗网络（GAN）训练器：
//! 生成器与判别器都是单隐藏层的全连接网络，作用于展平后的定长数值向量，
//! 通过交替的梯度下降进行对抗训练。
//!
//! 数据集读取、图像编解码与可视化不在本crate范围内，由调用方提供归一化后的真实样本。
//!

pub mod config;
pub mod errors;
pub mod nn;
pub mod random;
pub mod train;
pub mod utils;
