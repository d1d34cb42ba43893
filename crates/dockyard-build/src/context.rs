use crate::error::{BuildError, BuildResult};
use crate::request::DockerfileSource;
use flate2::Compression;
use flate2::write::GzEncoder;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tar::Builder;

/// アーカイブ内に注入する Dockerfile の名前
///
/// コンテキスト内の既存ファイルと衝突しないよう専用の名前を使う。
pub const INJECTED_DOCKERFILE: &str = ".dockyard.Dockerfile";

pub struct ContextBuilder;

impl ContextBuilder {
    /// ビルドコンテキストをtar.gzアーカイブとして作成
    ///
    /// Dockerfile は `INJECTED_DOCKERFILE` としてアーカイブに追加されます。
    /// インライン Dockerfile でコンテキストディレクトリが存在しない場合は、
    /// Dockerfile だけのアーカイブになります。
    pub fn create_context(
        context_path: &Path,
        dockerfile: &DockerfileSource,
    ) -> BuildResult<Vec<u8>> {
        tracing::debug!("Creating build context from: {}", context_path.display());

        let include_dir = match dockerfile {
            DockerfileSource::Path(_) => {
                if !context_path.is_dir() {
                    return Err(BuildError::ContextNotFound(context_path.to_path_buf()));
                }
                true
            }
            DockerfileSource::Inline(_) => context_path.is_dir(),
        };

        let dockerfile_content = match dockerfile {
            DockerfileSource::Path(path) => {
                if !path.is_file() {
                    return Err(BuildError::DockerfileNotFound(path.clone()));
                }
                let mut file = File::open(path)?;
                let mut content = Vec::new();
                file.read_to_end(&mut content)?;
                content
            }
            DockerfileSource::Inline(content) => content.clone().into_bytes(),
        };

        let mut archive_data = Vec::new();
        {
            let encoder = GzEncoder::new(&mut archive_data, Compression::default());
            let mut tar = Builder::new(encoder);

            if include_dir {
                tar.append_dir_all(".", context_path)
                    .map_err(BuildError::Io)?;
            }

            let mut header = tar::Header::new_gnu();
            header.set_path(INJECTED_DOCKERFILE).map_err(|e| {
                BuildError::InvalidConfig(format!("Failed to set Dockerfile path: {}", e))
            })?;
            header.set_size(dockerfile_content.len() as u64);
            header.set_mode(0o644);
            header.set_cksum();

            tar.append(&header, &dockerfile_content[..])
                .map_err(BuildError::Io)?;

            let encoder = tar.into_inner().map_err(BuildError::Io)?;
            encoder.finish().map_err(BuildError::Io)?;
        }

        tracing::debug!("Build context created: {} bytes", archive_data.len());

        Self::check_context_size(archive_data.len());

        Ok(archive_data)
    }

    fn check_context_size(size: usize) {
        const MAX_CONTEXT_SIZE: usize = 500 * 1024 * 1024; // 500MB

        if size > MAX_CONTEXT_SIZE {
            tracing::warn!(
                "警告: ビルドコンテキストが大きすぎます（{}MB）\n\
                 .dockerignoreファイルで不要なファイルを除外することを推奨します。",
                size / 1024 / 1024
            );
        }
    }
}
