//! サービスごとの判定（スキップ / pull のみ / ビルド）

use crate::args::ArgOverrides;
use crate::error::{BuildError, BuildResult};
use crate::inventory::{ImageInventory, ImagePresence};
use crate::options::{image_name, pull_request, to_build_request};
use crate::request::BuildBatch;
use dockyard_core::{Project, Service};
use futures_util::future::join_all;
use tracing::{debug, info, instrument, warn};

/// サービスに必要なアクション
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageAction {
    /// イメージが既に存在する
    Skip,
    /// リモートから取得してタグ付けする
    Pull,
    /// ソースからビルドする
    Build,
}

/// 判定結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub service: String,
    pub action: ImageAction,
}

/// 在庫確認の対象となるイメージ（image が指定されていれば常に確認する）
fn needs_lookup(service: &Service) -> Option<&str> {
    service.image.as_deref()
}

/// 1サービス分の判定
///
/// `presence` はサービスの image に対する在庫確認の結果。
/// 確認していない場合は `None` で、image のみのサービスでは pull 扱いになります。
/// build が指定されていれば在庫に関係なく常にビルドします。
pub fn classify(service: &Service, presence: Option<ImagePresence>) -> BuildResult<ImageAction> {
    match (&service.image, &service.build) {
        (None, None) => Err(BuildError::Configuration {
            service: service.name.clone(),
        }),
        (_, Some(_)) => Ok(ImageAction::Build),
        (Some(_), None) => match presence {
            Some(ImagePresence::Found) => Ok(ImageAction::Skip),
            Some(ImagePresence::NotFound) | None => Ok(ImageAction::Pull),
        },
    }
}

/// プロジェクト全体の判定
///
/// 1. 設定の検証（image も build もないサービスがあれば即エラー）
/// 2. 在庫確認（並行実行）
/// 3. サービス名順に判定
///
/// 在庫確認が複数失敗した場合は、サービス名順で最初のものを返します。
#[instrument(skip_all, fields(project = %project.name))]
pub async fn resolve(
    project: &Project,
    inventory: &dyn ImageInventory,
) -> BuildResult<Vec<Resolution>> {
    let services: Vec<&Service> = project.services.values().collect();

    if let Some(invalid) = services.iter().find(|s| !s.is_resolvable()) {
        return Err(BuildError::Configuration {
            service: invalid.name.clone(),
        });
    }

    let lookups = join_all(services.iter().map(|service| async move {
        match needs_lookup(service) {
            Some(image) => Some(inventory.exists(image).await),
            None => None,
        }
    }))
    .await;

    let mut resolutions = Vec::with_capacity(services.len());
    for (service, lookup) in services.into_iter().zip(lookups) {
        let presence = match lookup {
            Some(Ok(presence)) => Some(presence),
            Some(Err(e)) => {
                return Err(BuildError::InventoryLookup {
                    service: service.name.clone(),
                    image: service.image.clone().unwrap_or_default(),
                    message: e.to_string(),
                });
            }
            None => None,
        };

        let action = classify(service, presence)?;
        debug!(service = %service.name, ?action, "Resolved service");
        resolutions.push(Resolution {
            service: service.name.clone(),
            action,
        });
    }

    info!(
        build = resolutions.iter().filter(|r| r.action == ImageAction::Build).count(),
        pull = resolutions.iter().filter(|r| r.action == ImageAction::Pull).count(),
        skip = resolutions.iter().filter(|r| r.action == ImageAction::Skip).count(),
        "Resolution complete"
    );
    Ok(resolutions)
}

/// 判定結果からバッチを組み立てる
///
/// ビルドはイメージ名（`image_name`）、pull のみはサービス名をキーにします。
pub fn build_batch(
    project: &Project,
    resolutions: &[Resolution],
    overrides: &ArgOverrides,
) -> BuildResult<BuildBatch> {
    let mut batch = BuildBatch::new();

    for resolution in resolutions {
        let service = project.service(&resolution.service).ok_or_else(|| {
            BuildError::InvalidConfig(format!("unknown service: {}", resolution.service))
        })?;

        let (key, request) = match (&resolution.action, &service.build, &service.image) {
            (ImageAction::Skip, _, _) => continue,
            (ImageAction::Build, Some(build), _) => (
                image_name(project, service),
                to_build_request(service, build, &project.working_dir, overrides),
            ),
            (ImageAction::Pull, _, Some(image)) => (service.name.clone(), pull_request(image)),
            _ => {
                return Err(BuildError::Configuration {
                    service: service.name.clone(),
                });
            }
        };

        if batch.insert(key.clone(), request).is_some() {
            warn!(key = %key, service = %service.name, "Duplicate image key, previous request replaced");
        }
    }

    Ok(batch)
}
