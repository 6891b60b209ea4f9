// 声明模块结构：
// `application`: 应用启动逻辑。
// `handlers`: 各资源的请求处理与错误转换。
// `routes`: 路由注册。
// `state`: 应用共享状态。
mod application;
mod handlers;
mod routes;
mod state;


use std::io;

#[actix_web::main]
async fn main() -> io::Result<()> {
    // 启动失败时打印错误并以非零状态码退出。
    if let Err(err) = application::run().await {
        eprintln!("[api] bootstrap failed: {err}");
        return Err(io::Error::other(err.to_string()));
    }

    Ok(())
}
