//! dockyard のイメージ準備機能
//!
//! プロジェクトの各サービスについて「スキップ / pull のみ / ビルド」を判定し、
//! 必要なリクエストをひとつのバッチにまとめてビルドドライバへ渡します。
//! レイヤー構築やキャッシュ管理はドライバ（Docker エンジン）側の責務です。

pub mod args;
pub mod context;
pub mod dispatcher;
pub mod docker;
pub mod driver;
pub mod error;
pub mod inventory;
pub mod options;
pub mod progress;
pub mod reference;
pub mod request;
pub mod resolver;
pub mod service;

pub use args::{ArgOverrides, flatten_args, merge_args};
pub use context::ContextBuilder;
pub use dispatcher::Dispatcher;
pub use docker::{DockerDriver, DockerDriverFactory, DockerInventory, docker_registry};
pub use driver::{BuildDriver, DEFAULT_DRIVER, DriverFactory, DriverOptions, DriverRegistry};
pub use error::{BuildError, BuildResult};
pub use inventory::{ImageInventory, ImagePresence};
pub use options::{image_name, pull_request, to_build_request};
pub use progress::{ProgressEvent, ProgressMode, ProgressPrinter, ProgressSink};
pub use reference::split_image_tag;
pub use request::{BuildBatch, BuildInputs, BuildRequest, DockerfileSource};
pub use resolver::{ImageAction, Resolution, build_batch, classify, resolve};
pub use service::ImageService;
