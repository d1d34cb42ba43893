//! サービス定義からビルドリクエストへの変換
//!
//! ここの関数はすべて副作用を持ちません。

use crate::args::{ArgOverrides, merge_args};
use crate::request::{BuildInputs, BuildRequest, DockerfileSource};
use dockyard_core::{BuildConfig, Project, Service};
use std::path::{Component, Path, PathBuf};

/// サービスのイメージ名
///
/// 明示的な image があればそれを、なければ `<project>_<service>` を返します。
pub fn image_name(project: &Project, service: &Service) -> String {
    match &service.image {
        Some(image) => image.clone(),
        None => format!("{}_{}", project.name, service.name),
    }
}

/// ビルド設定を持つサービスのリクエストを生成
///
/// コンテキストは `working_dir/context`、Dockerfile は
/// `working_dir/context/dockerfile`（未指定なら `Dockerfile`）に解決されます。
pub fn to_build_request(
    service: &Service,
    build: &BuildConfig,
    working_dir: &Path,
    overrides: &ArgOverrides,
) -> BuildRequest {
    let tags = service.image.iter().cloned().collect();

    let context_path = clean_join(working_dir, &build.context);
    let dockerfile_path = clean_join(&context_path, &build.dockerfile_or_default());

    BuildRequest {
        tags,
        inputs: BuildInputs {
            context_path,
            dockerfile: DockerfileSource::Path(dockerfile_path),
        },
        build_args: merge_args(build.args.clone(), overrides),
        pull: false,
    }
}

/// 既存イメージを取得してタグ付けするだけのリクエストを生成
///
/// 入力は `FROM <image>` の1行だけの Dockerfile です。
pub fn pull_request(image: &str) -> BuildRequest {
    BuildRequest {
        tags: vec![image.to_string()],
        inputs: BuildInputs {
            context_path: PathBuf::from("."),
            dockerfile: DockerfileSource::Inline(format!("FROM {}", image)),
        },
        build_args: Default::default(),
        pull: true,
    }
}

/// パスを結合し、`.` と `..` を字句的に畳み込む
fn clean_join(base: &Path, relative: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in base.join(relative).components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if matches!(out.components().next_back(), Some(Component::Normal(_))) {
                    out.pop();
                } else if !out.has_root() {
                    out.push("..");
                }
            }
            other => out.push(other.as_os_str()),
        }
    }
    if out.as_os_str().is_empty() {
        out.push(".");
    }
    out
}
