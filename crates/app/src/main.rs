use std::path::PathBuf;
use std::sync::Arc;

use tracing::info;
use tracing_subscriber::EnvFilter;

use vigil_api::server::{AppState, start_server};
use vigil_core::alert::policy::PermissivePolicy;
use vigil_core::config::AppConfig;
use vigil_engine::factory::default_detectors;
use vigil_manager::detection::DetectionManager;
use vigil_manager::review::ReviewService;
use vigil_store::alert::SqliteAlertStore;
use vigil_store::data::SqliteTradeDataStore;
use vigil_store::rules::MemoryRuleStore;

/// # Summary
/// 分层加载应用配置：内置默认值 < `config/app.toml` < `VIGIL_*` 环境变量。
fn load_config() -> Result<AppConfig, config::ConfigError> {
    let defaults = AppConfig::default();
    let settings = config::Config::builder()
        .add_source(config::Config::try_from(&defaults)?)
        .add_source(config::File::with_name("config/app").required(false))
        .add_source(config::Environment::with_prefix("VIGIL").separator("__"))
        .build()?;
    settings.try_deserialize()
}

/// # Summary
/// 应用启动入口，纯粹的 DI 容器。
/// 负责实例化所有具体实现组件并通过 Arc<dyn Trait> 注入到服务层。
///
/// # Logic
/// 1. 初始化全局日志。
/// 2. 加载配置并设置数据根目录。
/// 3. 实例化基础设施层（各 Store）。
/// 4. 构造应用服务层（DetectionManager / ReviewService）。
/// 5. 启动 HTTP 服务并阻塞至进程退出。
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 1. 初始化日志
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();
    info!("Vigil surveillance backend starting...");

    // 2. 加载配置并设置数据根目录
    let app_config = load_config()?;
    vigil_store::config::set_root_dir(PathBuf::from(&app_config.database.data_dir));

    // 3. 实例化基础设施层
    let rule_store = Arc::new(MemoryRuleStore::new());
    let data_store = Arc::new(SqliteTradeDataStore::new().await?);
    let alert_store = Arc::new(SqliteAlertStore::new().await?);

    // 4. 构造应用服务层（注入 Core Trait 抽象）
    let detection = DetectionManager::new(
        rule_store.clone(),
        data_store.clone(),
        alert_store.clone(),
        default_detectors(),
    );
    let review = ReviewService::new(alert_store, data_store, Arc::new(PermissivePolicy));

    let state = AppState {
        detection,
        review,
        rules: rule_store,
    };

    // 5. 启动 HTTP 服务
    let bind_addr = format!("{}:{}", app_config.server.host, app_config.server.port);
    start_server(state, &bind_addr).await?;

    Ok(())
}
