// 引入 actix-web 框架组件：
// `middleware::Logger`: HTTP 请求日志中间件。
// `web`: 路由配置和数据提取。
use actix_web::{middleware::Logger, web, App, HttpServer};

// 引入领域层配置、遥测和存储错误。
use fitlog_domain::config::{ApiConfig, ConfigError, ListenTarget};
use fitlog_domain::services::telemetry::{init_telemetry, TelemetryConfig, TelemetryError};
use fitlog_domain::storage::StorageError;
use fitlog_storage::SeaOrmStorage;
use thiserror::Error;
use tracing::info;

use crate::{handlers::metrics_handler, routes, state::AppState};

// 把 HttpServer 绑定到监听目标上，公共和内部服务器共用。
// UDS 绑定前先清理遗留的 socket 文件；非 Unix 平台直接报错。
macro_rules! bind_listener {
    ($server:expr, $target:expr) => {{
        let listener: &ListenTarget = $target;
        let bound = match listener {
            ListenTarget::Tcp(addr) => $server.bind(addr.as_str()),
            #[cfg(unix)]
            ListenTarget::Unix(path) => {
                cleanup_socket(path)?;
                $server.bind_uds(path.as_str())
            }
            #[cfg(not(unix))]
            ListenTarget::Unix(path) => Err(std::io::Error::other(format!(
                "unix socket '{path}' requested but this platform does not support it"
            ))),
        };
        info!(%listener, "listener bound");
        bound?
    }};
}

pub async fn run() -> Result<(), BootstrapError> {
    // 1. 加载配置
    let config = ApiConfig::load_from_env()?;

    // 2. 初始化遥测，过滤器来自 API_LOG_FILTER。
    let telemetry = init_telemetry(&TelemetryConfig::from_env("API")?)?;

    // 3. 连接数据库（启动时自动建表）
    let storage = SeaOrmStorage::connect(config.database_url()).await?;

    // 4. 构建应用状态
    let state = AppState::new(storage, telemetry);

    // 有内部监听器时，/metrics 只在内部暴露。
    let metrics_on_public = config.internal_listener().is_none();
    let json_limit = config.json_limit();

    // 5. 公共服务器：资源路由 + 清单。
    let public_state = state.clone();
    let public_server = HttpServer::new(move || {
        let app = App::new()
            .app_data(web::Data::new(public_state.clone()))
            .wrap(Logger::default())
            .configure(|cfg| routes::configure(cfg, json_limit));
        if metrics_on_public {
            app.route("/metrics", web::get().to(metrics_handler))
        } else {
            app
        }
    });
    let public_server = bind_listener!(public_server, config.public_listener()).run();

    // 6. 可选的内部服务器，只提供 /metrics。
    let internal_server = match config.internal_listener() {
        Some(target) => {
            let internal_state = state.clone();
            let server = HttpServer::new(move || {
                App::new()
                    .app_data(web::Data::new(internal_state.clone()))
                    .wrap(Logger::default())
                    .route("/metrics", web::get().to(metrics_handler))
            });
            Some(bind_listener!(server, target).run())
        }
        None => None,
    };

    // 7. 并发运行，任何一个出错都会导致整体退出。
    match internal_server {
        Some(internal) => {
            tokio::try_join!(public_server, internal)?;
        }
        None => public_server.await?,
    }

    Ok(())
}

#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
    #[error("telemetry error: {0}")]
    Telemetry(#[from] TelemetryError),
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

// 上次非正常退出可能留下 socket 文件，bind 前删除。
#[cfg(unix)]
fn cleanup_socket(path: &str) -> std::io::Result<()> {
    match std::fs::remove_file(path) {
        Err(err) if err.kind() != std::io::ErrorKind::NotFound => Err(err),
        _ => Ok(()),
    }
}
