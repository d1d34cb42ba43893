//! バッチのディスパッチ
//!
//! バッチ全体を1回の呼び出しでドライバに渡します。リトライや部分成功はありません。

use crate::driver::{DEFAULT_DRIVER, DriverOptions, DriverRegistry};
use crate::error::{BuildError, BuildResult};
use crate::progress::{ProgressMode, ProgressPrinter};
use crate::request::BuildBatch;
use std::future::Future;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

pub struct Dispatcher {
    registry: Arc<DriverRegistry>,
    driver_name: String,
    progress_mode: ProgressMode,
}

impl Dispatcher {
    /// `"default"` ドライバを使うディスパッチャを作成
    pub fn new(registry: Arc<DriverRegistry>) -> Self {
        Self {
            registry,
            driver_name: DEFAULT_DRIVER.to_string(),
            progress_mode: ProgressMode::Auto,
        }
    }

    pub fn with_progress_mode(mut self, mode: ProgressMode) -> Self {
        self.progress_mode = mode;
        self
    }

    pub fn driver_name(&self) -> &str {
        &self.driver_name
    }

    /// バッチをドライバに渡す
    ///
    /// 空のバッチは何もせず成功します（ドライバも生成しない）。
    /// `cancel` が先に完了した場合、実行中のドライバ処理を破棄して
    /// `BuildError::Cancelled` を返します。
    #[instrument(skip_all, fields(requests = batch.len()))]
    pub async fn dispatch<C>(
        &self,
        batch: &BuildBatch,
        working_dir: &Path,
        cancel: C,
    ) -> BuildResult<()>
    where
        C: Future<Output = ()> + Send,
    {
        if batch.is_empty() {
            debug!("Nothing to build");
            return Ok(());
        }

        let factory = self.registry.get(&self.driver_name)?;
        let driver = factory.create(&DriverOptions {
            name: self.driver_name.clone(),
            working_dir: working_dir.to_path_buf(),
        })?;
        let printer = ProgressPrinter::stdout(self.progress_mode);

        info!(driver = %driver.name(), "Dispatching build batch");
        tokio::select! {
            result = driver.build(batch, &printer) => result,
            _ = cancel => {
                warn!("Build cancelled");
                Err(BuildError::Cancelled)
            }
        }
    }
}
