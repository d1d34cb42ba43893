//! ビルド進捗の表示
//!
//! ドライバはバッチ処理中のイベントを `ProgressSink` に送ります。
//! `ProgressPrinter` は標準出力に書き出す実装で、端末ならスピナー、
//! そうでなければ1行ずつのプレーン出力になります。

use colored::Colorize;
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use std::collections::HashMap;
use std::fmt;
use std::io::{IsTerminal, Write};
use std::str::FromStr;
use std::sync::Mutex;
use std::time::Duration;

/// ドライバから送られる進捗イベント
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProgressEvent {
    Started { target: String, pull_only: bool },
    /// ビルドログの1行
    Output { target: String, line: String },
    /// pull 等のステータス
    Status {
        target: String,
        status: String,
        progress: Option<String>,
    },
    Completed { target: String },
    Failed { target: String, message: String },
}

pub trait ProgressSink: Send + Sync {
    fn event(&self, event: ProgressEvent);
}

/// 出力モード
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ProgressMode {
    /// 標準出力が端末なら `Tty`、そうでなければ `Plain`
    #[default]
    Auto,
    Tty,
    Plain,
}

impl ProgressMode {
    /// `Auto` を実際のモードに確定させる
    pub fn resolve(self, is_terminal: bool) -> Self {
        match self {
            ProgressMode::Auto if is_terminal => ProgressMode::Tty,
            ProgressMode::Auto => ProgressMode::Plain,
            other => other,
        }
    }
}

impl FromStr for ProgressMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "auto" => Ok(Self::Auto),
            "tty" => Ok(Self::Tty),
            "plain" => Ok(Self::Plain),
            other => Err(format!(
                "invalid progress mode '{}' (expected auto, tty or plain)",
                other
            )),
        }
    }
}

impl fmt::Display for ProgressMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Auto => write!(f, "auto"),
            Self::Tty => write!(f, "tty"),
            Self::Plain => write!(f, "plain"),
        }
    }
}

/// 標準出力向けの進捗表示
pub struct ProgressPrinter {
    mode: ProgressMode,
    bars: Mutex<HashMap<String, ProgressBar>>,
    out: Mutex<Box<dyn Write + Send>>,
}

impl ProgressPrinter {
    /// 標準出力に書き出す。`Auto` は端末判定で確定させる
    pub fn stdout(mode: ProgressMode) -> Self {
        let mode = mode.resolve(std::io::stdout().is_terminal());
        Self::with_writer(mode, Box::new(std::io::stdout()))
    }

    /// 任意の出力先に書き出す（`Tty` のスピナーは常に標準出力に描画される）
    pub fn with_writer(mode: ProgressMode, out: Box<dyn Write + Send>) -> Self {
        Self {
            mode: mode.resolve(false),
            bars: Mutex::new(HashMap::new()),
            out: Mutex::new(out),
        }
    }

    pub fn mode(&self) -> ProgressMode {
        self.mode
    }

    fn plain(&self, line: String) {
        if let Ok(mut out) = self.out.lock() {
            let _ = writeln!(out, "{}", line);
            let _ = out.flush();
        }
    }

    fn spinner(target: &str, pull_only: bool) -> ProgressBar {
        let pb = ProgressBar::with_draw_target(None, ProgressDrawTarget::stdout());
        pb.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.green} [{elapsed_precise}] {prefix:.bold} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        pb.set_prefix(target.to_string());
        pb.set_message(if pull_only {
            "Pulling...".to_string()
        } else {
            "Building...".to_string()
        });
        pb.enable_steady_tick(Duration::from_millis(120));
        pb
    }

    fn tty(&self, event: ProgressEvent) {
        let Ok(mut bars) = self.bars.lock() else {
            return;
        };

        match event {
            ProgressEvent::Started { target, pull_only } => {
                let pb = Self::spinner(&target, pull_only);
                bars.insert(target, pb);
            }
            ProgressEvent::Output { target, line } => {
                if let Some(pb) = bars.get(&target) {
                    pb.set_message(line);
                }
            }
            ProgressEvent::Status {
                target,
                status,
                progress,
            } => {
                if let Some(pb) = bars.get(&target) {
                    match progress {
                        Some(progress) => pb.set_message(format!("{} {}", status, progress)),
                        None => pb.set_message(status),
                    }
                }
            }
            ProgressEvent::Completed { target } => {
                if let Some(pb) = bars.remove(&target) {
                    pb.finish_with_message(format!("{}", "Done ✓".green()));
                }
            }
            ProgressEvent::Failed { target, message } => {
                if let Some(pb) = bars.remove(&target) {
                    pb.finish_with_message(format!("{} {}", "Failed:".red().bold(), message));
                }
            }
        }
    }
}

impl ProgressSink for ProgressPrinter {
    fn event(&self, event: ProgressEvent) {
        match self.mode {
            ProgressMode::Tty => self.tty(event),
            _ => match event {
                ProgressEvent::Started { target, pull_only } => {
                    let verb = if pull_only { "pulling" } else { "building" };
                    self.plain(format!("#{} {}", target, verb));
                }
                ProgressEvent::Output { target, line } => {
                    self.plain(format!("#{} {}", target, line));
                }
                ProgressEvent::Status {
                    target,
                    status,
                    progress,
                } => match progress {
                    Some(progress) => self.plain(format!("#{} {} {}", target, status, progress)),
                    None => self.plain(format!("#{} {}", target, status)),
                },
                ProgressEvent::Completed { target } => {
                    self.plain(format!("#{} DONE", target));
                }
                ProgressEvent::Failed { target, message } => {
                    self.plain(format!("#{} ERROR: {}", target, message));
                }
            },
        }
    }
}
