//! イメージ準備のエントリーポイント
//!
//! 判定 → バッチ組み立て → ディスパッチ をまとめて実行します。

use crate::args::ArgOverrides;
use crate::dispatcher::Dispatcher;
use crate::error::BuildResult;
use crate::inventory::ImageInventory;
use crate::request::BuildBatch;
use crate::resolver::{Resolution, build_batch, resolve};
use dockyard_core::Project;
use std::future::Future;
use std::sync::Arc;
use tracing::{info, instrument};

pub struct ImageService {
    inventory: Arc<dyn ImageInventory>,
    dispatcher: Dispatcher,
    overrides: ArgOverrides,
}

impl ImageService {
    pub fn new(inventory: Arc<dyn ImageInventory>, dispatcher: Dispatcher) -> Self {
        Self {
            inventory,
            dispatcher,
            overrides: ArgOverrides::new(),
        }
    }

    /// ビルド引数の上書き（`--build-arg`）を設定
    pub fn with_build_args(mut self, overrides: ArgOverrides) -> Self {
        self.overrides = overrides;
        self
    }

    /// 判定のみ行う（ドライバは呼ばない）
    pub async fn plan(&self, project: &Project) -> BuildResult<Vec<Resolution>> {
        resolve(project, self.inventory.as_ref()).await
    }

    /// 必要なイメージをすべてビルド / pull する
    ///
    /// ディスパッチしたバッチを返します。すべて揃っていれば空のバッチです。
    #[instrument(skip_all, fields(project = %project.name))]
    pub async fn ensure_images_exist<C>(
        &self,
        project: &Project,
        cancel: C,
    ) -> BuildResult<BuildBatch>
    where
        C: Future<Output = ()> + Send,
    {
        let resolutions = self.plan(project).await?;
        let batch = build_batch(project, &resolutions, &self.overrides)?;

        if batch.is_empty() {
            info!("All images are present");
        } else {
            info!(requests = batch.len(), "Dispatching image requests");
        }

        self.dispatcher
            .dispatch(&batch, &project.working_dir, cancel)
            .await?;
        Ok(batch)
    }
}
