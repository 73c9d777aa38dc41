/*
 * 常量目标 GAN 训练示例
 *
 * 真实数据恒为 [0.9; 4]，观察生成器输出如何向 0.9 靠拢。
 *
 * # 运行
 * ```bash
 * cargo run --example constant_target
 * # 使用自定义配置（JSON），日志级别通过 RUST_LOG 控制
 * RUST_LOG=debug cargo run --example constant_target -- my_config.json
 * ```
 */

use std::time::Instant;

use log::info;
use mini_gan::config::GanConfig;
use mini_gan::errors::GanError;
use mini_gan::train::{CyclicSamples, TrainingLoop};
use ndarray::Array1;

const TARGET: f64 = 0.9;

fn default_config() -> GanConfig {
    GanConfig {
        data_dim: 4,
        noise_dim: 4,
        generator_hidden_size: 3,
        discriminator_hidden_size: 3,
        learning_rate: 0.1,
        num_epochs: 50,
        num_batches: 100,
        log_every: 5,
        ..GanConfig::default()
    }
}

fn main() -> Result<(), GanError> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    println!("=== 常量目标 GAN 训练示例 ===\n");

    // 1. 配置
    let config = match std::env::args().nth(1) {
        Some(path) => GanConfig::from_json_file(path)?,
        None => default_config(),
    };
    println!("[1/3] 训练配置：");
    println!("  数据维度: {}，噪声维度: {}", config.data_dim, config.noise_dim);
    println!(
        "  Generator: {} -> {} -> {}",
        config.noise_dim, config.generator_hidden_size, config.data_dim
    );
    println!(
        "  Discriminator: {} -> {} -> 1",
        config.data_dim, config.discriminator_hidden_size
    );
    println!(
        "  学习率: {}，共 {} × {} 步",
        config.learning_rate, config.num_epochs, config.num_batches
    );

    // 2. 训练
    println!("\n[2/3] 开始训练...\n");
    let train_start = Instant::now();
    let mut source = CyclicSamples::constant(Array1::from_elem(config.data_dim, TARGET))?;
    let mut trainer = TrainingLoop::new(config)?;

    let before = mean_output(&mut trainer, 20)?;
    let summary = trainer.run(&mut source, |_| {})?;
    info!(
        "训练完成：{} 步（失败 {} 步），用时 {:.2}s",
        summary.completed_steps,
        summary.failed_steps,
        train_start.elapsed().as_secs_f32()
    );

    if let Some(report) = summary.last_report {
        println!(
            "  最后一步: D_loss={:.4}, G_loss={:.4}, D(real)={:.3}, D(fake)={:.3}",
            report.discriminator_loss,
            report.generator_loss,
            report.real_probability,
            report.fake_probability
        );
    }

    // 3. 推理
    println!("\n[3/3] 生成样本...");
    let noise = trainer.sample_noise();
    let sample = trainer.generator().generate(noise.view())?;
    let probability = trainer.discriminator().discriminate(sample.view())?;
    let after = mean_output(&mut trainer, 20)?;

    println!("  生成样本: {sample:.4}");
    println!("  D(G(z)) = {probability:.4}");
    println!("  生成输出均值: {before:.4} -> {after:.4}（目标 {TARGET}）");

    Ok(())
}

/// 用`n`条新噪声生成样本，返回全部分量的均值
fn mean_output(trainer: &mut TrainingLoop, n: usize) -> Result<f64, GanError> {
    let mut total = 0.0;
    for _ in 0..n {
        total += trainer.generate_sample()?.mean().unwrap_or(0.0);
    }
    Ok(total / n as f64)
}
