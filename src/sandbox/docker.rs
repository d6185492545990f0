//! Docker-backed executor for user submissions
//!
//! Each run gets a fresh container: the submission is staged in a temp
//! directory, bind-mounted read-only at `/workspace`, and the language's
//! run command executes under the configured memory/CPU/network limits.
//! Containers are force-removed on every path, including failures.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use bollard::container::{
    Config, CreateContainerOptions, LogOutput, LogsOptions, RemoveContainerOptions,
    StartContainerOptions, WaitContainerOptions,
};
use bollard::image::CreateImageOptions;
use bollard::models::{HostConfig, Mount, MountTypeEnum};
use bollard::Docker;
use futures::StreamExt;
use tokio::time::timeout;
use tracing::{debug, info, warn};

use crate::config::SandboxConfig;
use crate::error::SandboxError;

use super::{CodeExecutor, ExecutionOutcome, Language};

pub struct DockerSandbox {
    docker: Docker,
    config: SandboxConfig,
}

impl DockerSandbox {
    /// Connect to the local Docker daemon and verify it responds.
    pub async fn new(config: SandboxConfig) -> Result<Self, SandboxError> {
        let docker = Docker::connect_with_local_defaults()?;
        docker.ping().await?;

        info!("Connected to Docker daemon");
        Ok(Self { docker, config })
    }

    /// Pull an image if not present.
    async fn ensure_image(&self, image: &str) -> Result<(), SandboxError> {
        if self.docker.inspect_image(image).await.is_ok() {
            debug!("Image {} already exists", image);
            return Ok(());
        }

        info!("Pulling image: {}", image);
        let options = CreateImageOptions {
            from_image: image,
            ..Default::default()
        };

        let mut stream = self.docker.create_image(Some(options), None, None);
        while let Some(result) = stream.next().await {
            result?;
        }

        info!("Image {} pulled successfully", image);
        Ok(())
    }

    async fn run_to_completion(
        &self,
        container_id: &str,
        language: Language,
    ) -> Result<ExecutionOutcome, SandboxError> {
        let start = Instant::now();

        self.docker
            .start_container(container_id, None::<StartContainerOptions<String>>)
            .await?;

        let wait_options = WaitContainerOptions {
            condition: "not-running",
        };
        let run_timeout = Duration::from_secs(self.config.timeout_secs);

        let waited = timeout(run_timeout, async {
            let mut stream = self.docker.wait_container(container_id, Some(wait_options));
            match stream.next().await {
                Some(Ok(response)) => Ok(response.status_code),
                // A nonzero exit is a normal outcome for user code, not a fault.
                Some(Err(bollard::errors::Error::DockerContainerWaitError { code, .. })) => Ok(code),
                Some(Err(e)) => Err(SandboxError::from(e)),
                None => Ok(0),
            }
        })
        .await;

        let (exit_code, timed_out) = match waited {
            Ok(code) => (code?, false),
            Err(_) => {
                warn!(
                    "{} submission timed out after {}s",
                    language, self.config.timeout_secs
                );
                if let Err(e) = self.docker.stop_container(container_id, None).await {
                    warn!("Failed to stop timed-out container: {}", e);
                }
                (-1, true)
            }
        };

        let (stdout, stderr) = self.collect_logs(container_id).await;

        Ok(ExecutionOutcome {
            stdout,
            stderr,
            exit_code,
            duration_ms: start.elapsed().as_millis() as u64,
            timed_out,
        })
    }

    async fn collect_logs(&self, container_id: &str) -> (String, String) {
        let options = LogsOptions::<String> {
            stdout: true,
            stderr: true,
            timestamps: false,
            ..Default::default()
        };

        let mut stdout = String::new();
        let mut stderr = String::new();
        let mut stream = self.docker.logs(container_id, Some(options));

        while let Some(result) = stream.next().await {
            match result {
                Ok(LogOutput::StdOut { message }) => {
                    stdout.push_str(&String::from_utf8_lossy(&message));
                }
                Ok(LogOutput::StdErr { message }) => {
                    stderr.push_str(&String::from_utf8_lossy(&message));
                }
                Ok(_) => {}
                Err(e) => {
                    warn!("Error reading container logs: {}", e);
                    break;
                }
            }
        }

        (stdout, stderr)
    }
}

#[async_trait]
impl CodeExecutor for DockerSandbox {
    async fn execute(
        &self,
        language: Language,
        code: &str,
    ) -> Result<ExecutionOutcome, SandboxError> {
        self.ensure_image(language.image()).await?;

        let staging = tempfile::tempdir()?;
        tokio::fs::write(staging.path().join(language.source_file()), code).await?;

        let container_name = format!(
            "practice-run-{}",
            &uuid::Uuid::new_v4().to_string()[..8]
        );
        let memory = parse_memory_limit(&self.config.memory_limit)?;
        let nano_cpus = (self.config.cpu_limit * 1_000_000_000.0) as i64;

        let mounts = vec![Mount {
            target: Some("/workspace".to_string()),
            source: Some(staging.path().to_string_lossy().to_string()),
            typ: Some(MountTypeEnum::BIND),
            read_only: Some(true),
            ..Default::default()
        }];

        let container_config = Config {
            image: Some(language.image().to_string()),
            cmd: Some(language.run_command()),
            working_dir: Some("/workspace".to_string()),
            host_config: Some(HostConfig {
                memory: Some(memory),
                nano_cpus: Some(nano_cpus),
                network_mode: Some(self.config.network_mode.clone()),
                mounts: Some(mounts),
                auto_remove: Some(false),
                ..Default::default()
            }),
            ..Default::default()
        };

        let options = CreateContainerOptions {
            name: &container_name,
            platform: None,
        };
        let created = self
            .docker
            .create_container(Some(options), container_config)
            .await?;

        debug!("Created container {} for {}", container_name, language);

        let result = self.run_to_completion(&created.id, language).await;

        let remove = RemoveContainerOptions {
            force: true,
            ..Default::default()
        };
        if let Err(e) = self.docker.remove_container(&created.id, Some(remove)).await {
            warn!("Failed to remove container {}: {}", container_name, e);
        }

        result
    }
}

/// Parse a memory limit string (e.g., "512m", "2g") to bytes.
fn parse_memory_limit(limit: &str) -> Result<i64, SandboxError> {
    let limit = limit.to_lowercase();
    let invalid = || SandboxError::InvalidConfig(format!("invalid memory limit: {limit}"));

    if let Some(num) = limit.strip_suffix('g') {
        let n: i64 = num.parse().map_err(|_| invalid())?;
        Ok(n * 1024 * 1024 * 1024)
    } else if let Some(num) = limit.strip_suffix('m') {
        let n: i64 = num.parse().map_err(|_| invalid())?;
        Ok(n * 1024 * 1024)
    } else if let Some(num) = limit.strip_suffix('k') {
        let n: i64 = num.parse().map_err(|_| invalid())?;
        Ok(n * 1024)
    } else {
        limit.parse().map_err(|_| invalid())
    }
}
