//! 下游流程 - 业务能力层
//!
//! 下游语义处理是外部程序，这里只负责调用它并拿到最终产物的位置

use std::path::Path;

use tokio::process::Command;
use tracing::{info, warn};

use crate::error::{AppResult, PipelineError};

/// 下游流程能力：输入数据集路径，返回最终产物位置
#[allow(async_fn_in_trait)]
pub trait DownstreamPipeline {
    async fn run(&self, dataset: &Path) -> AppResult<String>;
}

/// 调用外部命令，数据集路径作为最后一个参数
///
/// 命令标准输出的最后一个非空行即为最终产物位置
#[derive(Debug, Clone)]
pub struct CommandPipeline {
    program: String,
    args: Vec<String>,
}

impl CommandPipeline {
    /// 按空白切分命令行，空命令返回 `None`
    pub fn from_command_line(command: &str) -> Option<Self> {
        let mut parts = command.split_whitespace().map(str::to_string);
        let program = parts.next()?;
        Some(Self {
            program,
            args: parts.collect(),
        })
    }
}

impl DownstreamPipeline for CommandPipeline {
    async fn run(&self, dataset: &Path) -> AppResult<String> {
        info!("🧠 运行下游流程: {} {}", self.program, dataset.display());

        let output = Command::new(&self.program)
            .args(&self.args)
            .arg(dataset)
            .output()
            .await
            .map_err(|e| PipelineError::LaunchFailed {
                program: self.program.clone(),
                source: e,
            })?;

        if !output.status.success() {
            return Err(PipelineError::Failed {
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            }
            .into());
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        let location = stdout
            .lines()
            .rev()
            .map(str::trim)
            .find(|line| !line.is_empty())
            .ok_or(PipelineError::NoOutput)?;

        info!("✅ 下游流程完成: {}", location);
        Ok(location.to_string())
    }
}

/// 按配置选择的下游流程
#[derive(Debug, Clone)]
pub enum ConfiguredPipeline {
    Command(CommandPipeline),
    /// 未配置命令时直接返回数据集路径
    Passthrough,
}

impl ConfiguredPipeline {
    pub fn from_config(command: Option<&str>) -> Self {
        command
            .and_then(CommandPipeline::from_command_line)
            .map(ConfiguredPipeline::Command)
            .unwrap_or(ConfiguredPipeline::Passthrough)
    }
}

impl DownstreamPipeline for ConfiguredPipeline {
    async fn run(&self, dataset: &Path) -> AppResult<String> {
        match self {
            ConfiguredPipeline::Command(cmd) => cmd.run(dataset).await,
            ConfiguredPipeline::Passthrough => {
                warn!("⚠️ 未配置 PIPELINE_COMMAND，跳过下游流程");
                Ok(dataset.display().to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;

    #[test]
    fn test_blank_command_is_passthrough() {
        assert!(matches!(
            ConfiguredPipeline::from_config(Some("   ")),
            ConfiguredPipeline::Passthrough
        ));
        let result = tokio_test::block_on(
            ConfiguredPipeline::Passthrough.run(Path::new("/tmp/merged.csv")),
        );
        assert_eq!(result.unwrap(), "/tmp/merged.csv");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_command_last_line_is_output() {
        let pipeline = CommandPipeline::from_command_line("echo final:").unwrap();
        let location = pipeline.run(Path::new("data.csv")).await.unwrap();
        assert_eq!(location, "final: data.csv");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_failing_command() {
        let pipeline = CommandPipeline::from_command_line("false").unwrap();
        let err = pipeline.run(Path::new("data.csv")).await.unwrap_err();
        assert!(matches!(err, AppError::Pipeline(PipelineError::Failed { .. })));
    }
}
