//! Docker エンジン（bollard）によるドライバとイメージ在庫

use crate::args::flatten_args;
use crate::context::{ContextBuilder, INJECTED_DOCKERFILE};
use crate::driver::{BuildDriver, DEFAULT_DRIVER, DriverFactory, DriverOptions, DriverRegistry};
use crate::error::{BuildError, BuildResult};
use crate::inventory::{ImageInventory, ImagePresence};
use crate::progress::{ProgressEvent, ProgressSink};
use crate::reference::split_image_tag;
use crate::request::{BuildBatch, BuildInputs, BuildRequest, DockerfileSource};
use async_trait::async_trait;
use bollard::Docker;
use bytes::Bytes;
use futures_util::stream::StreamExt;
use http_body_util::{Either, Full};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// `inspect_image` による在庫確認
pub struct DockerInventory {
    docker: Docker,
}

impl DockerInventory {
    pub fn new(docker: Docker) -> Self {
        Self { docker }
    }
}

#[async_trait]
impl ImageInventory for DockerInventory {
    async fn exists(&self, image: &str) -> BuildResult<ImagePresence> {
        match self.docker.inspect_image(image).await {
            Ok(_) => Ok(ImagePresence::Found),
            Err(bollard::errors::Error::DockerResponseServerError {
                status_code: 404, ..
            }) => Ok(ImagePresence::NotFound),
            Err(e) => Err(BuildError::DockerConnection(e)),
        }
    }
}

/// ローカルの Docker デーモンでバッチを処理するドライバ
///
/// リクエストはバッチの順に1件ずつ処理され、最初の失敗で中断します。
pub struct DockerDriver {
    docker: Docker,
    working_dir: PathBuf,
}

impl DockerDriver {
    pub fn new(docker: Docker, working_dir: PathBuf) -> Self {
        Self {
            docker,
            working_dir,
        }
    }

    async fn build_one(
        &self,
        key: &str,
        request: &BuildRequest,
        progress: &dyn ProgressSink,
    ) -> BuildResult<()> {
        let tag = request
            .tags
            .first()
            .cloned()
            .unwrap_or_else(|| key.to_string());
        tracing::info!("Building image: {}", tag);

        let BuildInputs {
            context_path,
            dockerfile,
        } = anchor_inputs(&self.working_dir, &request.inputs);
        let context_data = tokio::task::spawn_blocking(move || {
            ContextBuilder::create_context(&context_path, &dockerfile)
        })
        .await
        .map_err(|e| BuildError::InvalidConfig(format!("context task failed: {}", e)))??;

        let build_args = flatten_args(&request.build_args);
        let build_args_refs: HashMap<&str, &str> = build_args
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
            .collect();

        #[allow(deprecated)]
        let options = bollard::image::BuildImageOptions {
            dockerfile: INJECTED_DOCKERFILE,
            t: tag.as_str(),
            buildargs: build_args_refs,
            pull: request.pull,
            rm: true,
            forcerm: true,
            ..Default::default()
        };

        tracing::debug!("Build options: {:?}", options);

        let body = Full::new(Bytes::from(context_data));
        let mut stream = self
            .docker
            .build_image(options, None, Some(Either::Left(body)));

        while let Some(msg) = stream.next().await {
            let output = msg.map_err(|e| {
                BuildError::Dispatch(format!("failed to build {}: {}", tag, e))
            })?;

            if let Some(line) = output.stream {
                let line = line.trim_end();
                if !line.is_empty() {
                    progress.event(ProgressEvent::Output {
                        target: key.to_string(),
                        line: line.to_string(),
                    });
                }
            }

            if let Some(error) = output.error {
                return Err(BuildError::Dispatch(format!(
                    "failed to build {}: {}",
                    tag, error
                )));
            }

            if let Some(error_detail) = output.error_detail {
                let message = error_detail
                    .message
                    .unwrap_or_else(|| "Unknown build error".to_string());
                return Err(BuildError::Dispatch(format!(
                    "failed to build {}: {}",
                    tag, message
                )));
            }

            if let Some(status) = output.status {
                progress.event(ProgressEvent::Status {
                    target: key.to_string(),
                    status,
                    progress: None,
                });
            }
        }

        for extra in request.tags.iter().skip(1) {
            self.tag(&tag, extra).await?;
        }

        tracing::info!("Successfully built: {}", tag);
        Ok(())
    }

    async fn pull_one(
        &self,
        key: &str,
        request: &BuildRequest,
        progress: &dyn ProgressSink,
    ) -> BuildResult<()> {
        let Some(image) = request.tags.first() else {
            return Err(BuildError::InvalidConfig(format!(
                "pull request {} has no image tag",
                key
            )));
        };
        tracing::info!("Pulling image: {}", image);

        let (image_name, tag) = split_image_tag(image);

        #[allow(deprecated)]
        let options = bollard::image::CreateImageOptions {
            from_image: image_name.as_str(),
            tag: tag.as_str(),
            ..Default::default()
        };

        #[allow(deprecated)]
        let mut stream = self.docker.create_image(Some(options), None, None);

        while let Some(info) = stream.next().await {
            let info = info.map_err(|e| {
                BuildError::Dispatch(format!("failed to pull {}: {}", image, e))
            })?;

            if let Some(error) = info.error {
                return Err(BuildError::Dispatch(format!(
                    "failed to pull {}: {}",
                    image, error
                )));
            }

            if let Some(status) = info.status {
                progress.event(ProgressEvent::Status {
                    target: key.to_string(),
                    status,
                    progress: info.progress,
                });
            }
        }

        for extra in request.tags.iter().skip(1) {
            self.tag(image, extra).await?;
        }

        Ok(())
    }

    /// 既存イメージに追加のタグを付与
    async fn tag(&self, source: &str, target: &str) -> BuildResult<()> {
        let (repo, tag) = split_image_tag(target);
        tracing::debug!("Tagging {} as {}", source, target);

        #[allow(deprecated)]
        let options = bollard::image::TagImageOptions {
            repo: repo.as_str(),
            tag: tag.as_str(),
        };

        self.docker
            .tag_image(source, Some(options))
            .await
            .map_err(|e| BuildError::Dispatch(format!("failed to tag {}: {}", target, e)))
    }
}

#[async_trait]
impl BuildDriver for DockerDriver {
    fn name(&self) -> &str {
        DEFAULT_DRIVER
    }

    async fn build(&self, batch: &BuildBatch, progress: &dyn ProgressSink) -> BuildResult<()> {
        for (key, request) in batch.iter() {
            let pull_only = request.is_pull_only();
            progress.event(ProgressEvent::Started {
                target: key.to_string(),
                pull_only,
            });

            let result = if pull_only {
                self.pull_one(key, request, progress).await
            } else {
                self.build_one(key, request, progress).await
            };

            match result {
                Ok(()) => progress.event(ProgressEvent::Completed {
                    target: key.to_string(),
                }),
                Err(e) => {
                    progress.event(ProgressEvent::Failed {
                        target: key.to_string(),
                        message: e.to_string(),
                    });
                    return Err(e);
                }
            }
        }
        Ok(())
    }
}

/// 相対パスの入力をプロジェクトの作業ディレクトリ基準に解決
fn anchor_inputs(working_dir: &Path, inputs: &BuildInputs) -> BuildInputs {
    let anchor = |path: &Path| {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            working_dir.join(path)
        }
    };

    BuildInputs {
        context_path: anchor(&inputs.context_path),
        dockerfile: match &inputs.dockerfile {
            DockerfileSource::Path(path) => DockerfileSource::Path(anchor(path)),
            DockerfileSource::Inline(content) => DockerfileSource::Inline(content.clone()),
        },
    }
}

/// 接続済みの `Docker` を共有して `DockerDriver` を生成する
#[derive(Clone)]
pub struct DockerDriverFactory {
    docker: Docker,
}

impl DockerDriverFactory {
    pub fn new(docker: Docker) -> Self {
        Self { docker }
    }
}

impl DriverFactory for DockerDriverFactory {
    fn create(&self, options: &DriverOptions) -> BuildResult<Box<dyn BuildDriver>> {
        Ok(Box::new(DockerDriver::new(
            self.docker.clone(),
            options.working_dir.clone(),
        )))
    }
}

impl DriverRegistry {
    /// Docker エンジンを `"default"` として登録
    pub fn with_docker(self, docker: Docker) -> Self {
        self.with(DEFAULT_DRIVER, DockerDriverFactory::new(docker))
    }
}

/// Docker エンジンだけを登録したレジストリ
pub fn docker_registry(docker: Docker) -> DriverRegistry {
    DriverRegistry::new().with_docker(docker)
}
