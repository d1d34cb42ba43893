mod commands;
mod docker;
mod project;

use clap::{Parser, Subcommand};
use colored::Colorize;
use dockyard_build::ProgressMode;
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "dockyard")]
#[command(about = "compose プロジェクトに必要なイメージを、まとめて用意する。", long_about = None)]
struct Cli {
    /// プロジェクトファイルのパス（省略時はカレントディレクトリから上方向に探索）
    #[arg(short = 'f', long = "file", env = "DOCKYARD_FILE", global = true)]
    file: Option<PathBuf>,

    /// プロジェクト名（省略時はファイルの name、なければディレクトリ名）
    #[arg(
        short = 'p',
        long = "project-name",
        env = "DOCKYARD_PROJECT_NAME",
        global = true
    )]
    project_name: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// 不足しているイメージをビルド / pull する
    Build {
        /// ビルド引数の上書き（KEY=VALUE、KEY のみなら環境変数から取得）
        #[arg(long = "build-arg", value_name = "KEY=VALUE")]
        build_args: Vec<String>,
        /// 進捗表示のモード (auto, tty, plain)
        #[arg(long, env = "DOCKYARD_PROGRESS", default_value = "auto")]
        progress: ProgressMode,
    },
    /// 各サービスの判定結果を表示（ビルドは行わない）
    Plan,
    /// 読み込んだプロジェクト設定を表示
    Config,
    /// バージョン情報を表示
    Version,
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();

    // ログは stderr に出力（stdout は進捗表示に使う）
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    if matches!(cli.command, Commands::Version) {
        println!("dockyard {}", env!("CARGO_PKG_VERSION"));
        return Ok(ExitCode::SUCCESS);
    }

    let project = project::load(cli.file.as_deref(), cli.project_name.as_deref())?;

    let result = match cli.command {
        Commands::Build {
            build_args,
            progress,
        } => commands::build::handle(&project, &build_args, progress).await,
        Commands::Plan => commands::plan::handle(&project).await,
        Commands::Config => commands::config::handle(&project),
        Commands::Version => Ok(()),
    };

    // BuildError は案内付きで表示済みなので、anyhow に再表示させない
    match result {
        Err(e) if report_build_error(&e) => Ok(ExitCode::FAILURE),
        other => other.map(|()| ExitCode::SUCCESS),
    }
}

/// `BuildError` なら `user_message()` を表示して true を返す
fn report_build_error(e: &anyhow::Error) -> bool {
    match e.downcast_ref::<dockyard_build::BuildError>() {
        Some(build_err) => {
            eprintln!();
            eprintln!("{}", "✗ エラー".red().bold());
            eprintln!("{}", build_err.user_message());
            true
        }
        None => false,
    }
}
