/*
 * @Description  : 对抗训练循环：先更新判别器，再更新生成器，按 epoch × batch 依次推进
 */

mod data;

pub use data::{CyclicSamples, FromFn, RealDataSource};

use log::{debug, info, warn};
use ndarray::{Array1, ArrayView1};

use crate::config::GanConfig;
use crate::errors::{GanError, TrainingStage};
use crate::nn::loss::{self, DiscriminatorStep, GeneratorStep};
use crate::nn::{DiscriminatorNetwork, GeneratorNetwork, NetworkGradients, Sgd};
use crate::random::RandomSource;


/// 单个训练步对外可见的结果
///
/// 某个阶段因数值不稳定被跳过时，`failed_stage`标明该阶段；
/// 未能算出的量保持为 NaN，已算出的量（如生成器阶段失败时的 L_D）照常给出。
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StepReport {
    pub epoch: usize,
    pub batch: usize,
    /// L_D（批内平均）
    pub discriminator_loss: f64,
    /// L_G（批内平均）
    pub generator_loss: f64,
    /// 判别器更新前的 D(real)
    pub real_probability: f64,
    /// 生成器更新前、判别器更新后的 D(G(z))
    pub fake_probability: f64,
    pub failed_stage: Option<TrainingStage>,
}

impl StepReport {
    fn pending(epoch: usize, batch: usize) -> Self {
        Self {
            epoch,
            batch,
            discriminator_loss: f64::NAN,
            generator_loss: f64::NAN,
            real_probability: f64::NAN,
            fake_probability: f64::NAN,
            failed_stage: None,
        }
    }

    pub fn is_finite(&self) -> bool {
        self.discriminator_loss.is_finite() && self.generator_loss.is_finite()
    }

    /// 两个网络都完成了更新
    pub fn is_successful(&self) -> bool {
        self.failed_stage.is_none()
    }
}

/// 单个 epoch 的平均损失
///
/// 每种损失只对本 epoch 内算出有限值的步取平均；一步都没有时为 NaN。
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EpochLosses {
    pub epoch: usize,
    pub discriminator_loss: f64,
    pub generator_loss: f64,
    /// 本 epoch 内成功完成（未因数值问题跳过）的步数
    pub successful_steps: usize,
}

/// `TrainingLoop::run`的汇总结果
#[derive(Debug, Clone, Default)]
pub struct TrainingSummary {
    pub completed_steps: usize,
    pub failed_steps: usize,
    pub epochs: Vec<EpochLosses>,
    /// 最后一次交给`on_step`的结果（可能来自失败的步）
    pub last_report: Option<StepReport>,
}

/// 训练循环
///
/// 独占持有两个网络、随机数源和两份优化器，是参数唯一的修改者。
/// 每次`step`都是完整的顺序流水线，前一步的参数更新全部完成后才开始下一步。
///
/// # 使用示例
/// ```ignore
/// let mut trainer = TrainingLoop::new(config)?;
/// while !trainer.is_finished() {
///     let report = trainer.step(real.view())?;
///     println!("D={:.4} G={:.4}", report.discriminator_loss, report.generator_loss);
/// }
/// let sample = trainer.generate_sample()?;
/// ```
#[derive(Debug)]
pub struct TrainingLoop {
    config: GanConfig,
    generator: GeneratorNetwork,
    discriminator: DiscriminatorNetwork,
    rng: RandomSource,
    generator_optimizer: Sgd,
    discriminator_optimizer: Sgd,
    epoch: usize,
    batch: usize,
    consecutive_failures: usize,
    last_report: Option<StepReport>,
}

impl TrainingLoop {
    /// 按配置构建两个网络（同一个种子化的随机数源依次初始化生成器、判别器）
    pub fn new(config: GanConfig) -> Result<Self, GanError> {
        config.validate()?;
        let mut rng = RandomSource::new(config.seed);
        let generator = GeneratorNetwork::new(
            config.noise_dim,
            config.generator_hidden_size,
            config.data_dim,
            &config.weight_init,
            &mut rng,
        )?;
        let discriminator = DiscriminatorNetwork::new(
            config.data_dim,
            config.discriminator_hidden_size,
            &config.weight_init,
            &mut rng,
        )?;
        Self::from_parts(config, generator, discriminator, rng)
    }

    /// 使用外部构建的网络和随机数源
    pub fn from_parts(
        config: GanConfig,
        generator: GeneratorNetwork,
        discriminator: DiscriminatorNetwork,
        rng: RandomSource,
    ) -> Result<Self, GanError> {
        config.validate()?;
        if generator.output_dim() != discriminator.input_dim() {
            return Err(GanError::DimensionMismatch {
                expected: discriminator.input_dim(),
                got: generator.output_dim(),
                message: "生成器输出维度须等于判别器输入维度".to_string(),
            });
        }
        if discriminator.input_dim() != config.data_dim {
            return Err(GanError::DimensionMismatch {
                expected: config.data_dim,
                got: discriminator.input_dim(),
                message: "判别器输入维度须等于配置中的data_dim".to_string(),
            });
        }
        if generator.noise_dim() != config.noise_dim {
            return Err(GanError::DimensionMismatch {
                expected: config.noise_dim,
                got: generator.noise_dim(),
                message: "生成器噪声维度须等于配置中的noise_dim".to_string(),
            });
        }

        let discriminator_optimizer = Sgd::new(config.learning_rate, TrainingStage::Discriminator)?;
        let generator_optimizer = Sgd::new(config.learning_rate, TrainingStage::Generator)?;

        info!(
            "Generator: {} -> {} -> {}，Discriminator: {} -> {} -> 1，学习率={}，共{}步",
            generator.noise_dim(),
            generator.hidden_size(),
            generator.output_dim(),
            discriminator.input_dim(),
            discriminator.hidden_size(),
            config.learning_rate,
            config.total_steps()
        );

        Ok(Self {
            config,
            generator,
            discriminator,
            rng,
            generator_optimizer,
            discriminator_optimizer,
            epoch: 0,
            batch: 0,
            consecutive_failures: 0,
            last_report: None,
        })
    }

    pub fn config(&self) -> &GanConfig {
        &self.config
    }

    pub fn generator(&self) -> &GeneratorNetwork {
        &self.generator
    }

    pub fn discriminator(&self) -> &DiscriminatorNetwork {
        &self.discriminator
    }

    pub fn into_networks(self) -> (GeneratorNetwork, DiscriminatorNetwork) {
        (self.generator, self.discriminator)
    }

    pub fn epoch(&self) -> usize {
        self.epoch
    }

    pub fn batch(&self) -> usize {
        self.batch
    }

    /// 已推进的步数（含因数值问题跳过更新的步）
    pub fn completed_steps(&self) -> usize {
        self.epoch * self.config.num_batches + self.batch
    }

    pub fn total_steps(&self) -> usize {
        self.config.total_steps()
    }

    pub fn is_finished(&self) -> bool {
        self.epoch >= self.config.num_epochs
    }

    /// 当前学习率（两个网络始终一致）
    pub fn learning_rate(&self) -> f64 {
        self.discriminator_optimizer.learning_rate()
    }

    pub fn consecutive_failures(&self) -> usize {
        self.consecutive_failures
    }

    /// 最近一个已推进的训练步的结果，包括因数值不稳定而失败的步
    pub fn last_report(&self) -> Option<&StepReport> {
        self.last_report.as_ref()
    }

    /// 按配置的噪声分布采样一条噪声向量
    pub fn sample_noise(&mut self) -> Array1<f64> {
        self.rng.noise_vector(self.config.noise_dim, &self.config.noise)
    }

    /// 用新采样的噪声生成一条样本（训练结束后的推理入口）
    pub fn generate_sample(&mut self) -> Result<Array1<f64>, GanError> {
        let noise = self.sample_noise();
        self.generator.generate(noise.view())
    }

    /// 用一条真实样本执行一个训练步
    pub fn step(&mut self, real: ArrayView1<f64>) -> Result<StepReport, GanError> {
        self.train_on(&[real])
    }

    /// 用一批真实样本执行一个训练步：逐样本计算梯度，取平均后各网络只更新一次
    pub fn step_batch(&mut self, reals: &[Array1<f64>]) -> Result<StepReport, GanError> {
        let views: Vec<ArrayView1<f64>> = reals.iter().map(|real| real.view()).collect();
        self.train_on(&views)
    }

    /// 从数据源取样并一直训练到终止状态
    ///
    /// 每步结束后以`StepReport`回调`on_step`，失败的步也会回调（见`StepReport::failed_stage`）。
    /// 单步的数值不稳定只会跳过该步更新，连续失败达到`max_consecutive_failures`次才中止并返回错误。
    pub fn run<S, F>(&mut self, source: &mut S, mut on_step: F) -> Result<TrainingSummary, GanError>
    where
        S: RealDataSource + ?Sized,
        F: FnMut(&StepReport),
    {
        if source.data_dim() != self.config.data_dim {
            return Err(GanError::DimensionMismatch {
                expected: self.config.data_dim,
                got: source.data_dim(),
                message: "数据源的样本维度须等于配置中的data_dim".to_string(),
            });
        }

        let mut summary = TrainingSummary::default();
        let mut epoch_losses = EpochAccumulator::default();

        while !self.is_finished() {
            let epoch = self.epoch;
            let reals = (0..self.config.batch_size)
                .map(|_| source.next_sample().ok_or(GanError::DataExhausted))
                .collect::<Result<Vec<_>, _>>()?;

            match self.step_batch(&reals) {
                Ok(report) => {
                    on_step(&report);
                    epoch_losses.record(&report);
                    summary.completed_steps += 1;
                    summary.last_report = Some(report);
                }
                Err(e @ GanError::NumericInstability { .. }) => {
                    if let Some(report) = self.last_report {
                        on_step(&report);
                        epoch_losses.record(&report);
                        summary.last_report = Some(report);
                    }
                    summary.completed_steps += 1;
                    summary.failed_steps += 1;
                    if self.consecutive_failures >= self.config.max_consecutive_failures {
                        warn!("连续{}步出现数值不稳定，中止训练", self.consecutive_failures);
                        return Err(e);
                    }
                }
                Err(e) => return Err(e),
            }

            if self.epoch != epoch {
                let losses = epoch_losses.finish(epoch);
                if (epoch + 1) % self.config.log_every == 0 || self.is_finished() {
                    info!(
                        "Epoch {}/{}: D_loss={:.4}, G_loss={:.4}, 成功步数={}",
                        epoch + 1,
                        self.config.num_epochs,
                        losses.discriminator_loss,
                        losses.generator_loss,
                        losses.successful_steps
                    );
                }
                summary.epochs.push(losses);
            }
        }

        Ok(summary)
    }

    fn train_on(&mut self, reals: &[ArrayView1<f64>]) -> Result<StepReport, GanError> {
        if self.is_finished() {
            return Err(GanError::TrainingFinished {
                total_steps: self.total_steps(),
            });
        }
        if reals.is_empty() {
            return Err(GanError::must_be_greater_than("reals.len()", 0.0));
        }
        for real in reals {
            if real.len() != self.config.data_dim {
                return Err(GanError::input_shape("真实数据向量", self.config.data_dim, real.len()));
            }
        }

        let mut report = StepReport::pending(self.epoch, self.batch);
        let outcome = self.update_networks(reals, &mut report);
        if let Err(GanError::NumericInstability { stage }) = &outcome {
            report.failed_stage = Some(*stage);
        }
        self.last_report = Some(report);
        self.advance();

        match outcome {
            Ok(()) => {
                self.consecutive_failures = 0;
                debug!(
                    "epoch={} batch={}: D_loss={:.6}, G_loss={:.6}, D(real)={:.4}, D(fake)={:.4}",
                    report.epoch,
                    report.batch,
                    report.discriminator_loss,
                    report.generator_loss,
                    report.real_probability,
                    report.fake_probability
                );
                Ok(report)
            }
            Err(e) => {
                self.consecutive_failures += 1;
                warn!("第{}步更新失败：{e}", self.completed_steps());
                Err(e)
            }
        }
    }

    /// 判别器一步 + 生成器一步
    ///
    /// 边算边填写`report`，出错返回时已算出的量仍保留在其中。
    fn update_networks(
        &mut self,
        reals: &[ArrayView1<f64>],
        report: &mut StepReport,
    ) -> Result<(), GanError> {
        let count = reals.len() as f64;

        // 1. 判别器：生成器冻结，只用来产出假样本
        let mut discriminator_steps: Vec<DiscriminatorStep> = Vec::with_capacity(reals.len());
        for real in reals {
            let noise = self.sample_noise();
            let fake = self.generator.generate(noise.view())?;
            discriminator_steps.push(loss::discriminator_gradients(
                &self.discriminator,
                *real,
                fake.view(),
            )?);
        }
        report.discriminator_loss =
            discriminator_steps.iter().map(|s| s.loss).sum::<f64>() / count;
        report.real_probability =
            discriminator_steps.iter().map(|s| s.real_probability).sum::<f64>() / count;
        if !report.discriminator_loss.is_finite() {
            debug!("判别器损失为非有限值：{}", report.discriminator_loss);
            return Err(GanError::NumericInstability {
                stage: TrainingStage::Discriminator,
            });
        }
        let gradients = average_gradients(discriminator_steps.into_iter().map(|s| s.gradients))?;
        debug!("判别器梯度范数={:.6}", gradients.norm());
        self.discriminator_optimizer.step(&mut self.discriminator, &gradients)?;

        // 2. 生成器：重新采样噪声，判别器使用刚更新过的参数且保持不变
        let mut generator_steps: Vec<GeneratorStep> = Vec::with_capacity(reals.len());
        for _ in reals {
            let noise = self.sample_noise();
            generator_steps.push(loss::generator_gradients(
                &self.generator,
                &self.discriminator,
                noise.view(),
            )?);
        }
        report.generator_loss = generator_steps.iter().map(|s| s.loss).sum::<f64>() / count;
        report.fake_probability =
            generator_steps.iter().map(|s| s.fake_probability).sum::<f64>() / count;
        if !report.generator_loss.is_finite() {
            debug!("生成器损失为非有限值：{}", report.generator_loss);
            return Err(GanError::NumericInstability {
                stage: TrainingStage::Generator,
            });
        }
        let gradients = average_gradients(generator_steps.into_iter().map(|s| s.gradients))?;
        debug!("生成器梯度范数={:.6}", gradients.norm());
        self.generator_optimizer.step(&mut self.generator, &gradients)
    }

    /// 推进 batch/epoch 计数；每个 epoch 结束时衰减学习率
    fn advance(&mut self) {
        self.batch += 1;
        if self.batch == self.config.num_batches {
            self.batch = 0;
            self.epoch += 1;
            if !self.is_finished() {
                self.decay_learning_rate();
            }
        }
    }

    fn decay_learning_rate(&mut self) {
        let decay = self.config.learning_rate_decay;
        if decay >= 1.0 {
            return;
        }
        for optimizer in [&mut self.discriminator_optimizer, &mut self.generator_optimizer] {
            let decayed = optimizer.learning_rate() * decay;
            if let Err(e) = optimizer.set_learning_rate(decayed) {
                warn!("学习率衰减后不再合法，保持{}：{e}", optimizer.learning_rate());
            }
        }
    }
}

fn average_gradients(
    gradients: impl Iterator<Item = NetworkGradients>,
) -> Result<NetworkGradients, GanError> {
    NetworkGradients::average(gradients.collect())
        .ok_or_else(|| GanError::must_be_greater_than("reals.len()", 0.0))
}

/// 累计一个 epoch 内的损失，非有限值不计入平均
#[derive(Debug, Default)]
struct EpochAccumulator {
    discriminator_loss: RunningMean,
    generator_loss: RunningMean,
    successful_steps: usize,
}

impl EpochAccumulator {
    fn record(&mut self, report: &StepReport) {
        self.discriminator_loss.push(report.discriminator_loss);
        self.generator_loss.push(report.generator_loss);
        if report.is_successful() {
            self.successful_steps += 1;
        }
    }

    /// 输出本 epoch 的平均值并清零
    fn finish(&mut self, epoch: usize) -> EpochLosses {
        let losses = EpochLosses {
            epoch,
            discriminator_loss: self.discriminator_loss.mean(),
            generator_loss: self.generator_loss.mean(),
            successful_steps: self.successful_steps,
        };
        *self = Self::default();
        losses
    }
}

#[derive(Debug, Default)]
struct RunningMean {
    sum: f64,
    count: usize,
}

impl RunningMean {
    fn push(&mut self, value: f64) {
        if value.is_finite() {
            self.sum += value;
            self.count += 1;
        }
    }

    fn mean(&self) -> f64 {
        if self.count == 0 {
            return f64::NAN;
        }
        self.sum / self.count as f64
    }
}
