//! # 存储层数据根目录
//!
//! `alerts.db` 与 `surveillance.db` 两个 SQLite 文件均落在同一根目录下。
//! 根目录在进程启动时设置一次，之后对所有存储实例生效。

use std::path::PathBuf;
use std::sync::OnceLock;

static ROOT_DIR: OnceLock<PathBuf> = OnceLock::new();

/// 设置数据库文件所在的根目录。
///
/// # Logic
/// 1. 首次调用时写入全局静态变量，目录随后由各存储的 `new()` 创建。
/// 2. 重复设置被忽略：已打开的连接池仍指向旧目录，中途切换没有意义。
///
/// # Arguments
/// * `path` - 存放 `alerts.db` / `surveillance.db` 的目录。
pub fn set_root_dir(path: PathBuf) {
    let _ = ROOT_DIR.set(path);
}

/// 当前数据根目录；未设置时落到默认的 "data"。
pub(crate) fn get_root_dir() -> PathBuf {
    ROOT_DIR
        .get()
        .cloned()
        .unwrap_or_else(|| PathBuf::from("data"))
}
