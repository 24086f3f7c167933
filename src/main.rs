use actix_web::{App, HttpServer, middleware, web};

use eventlink::auth::{self, rate_limit::RateLimiter};
use eventlink::config::AppConfig;
use eventlink::{db, routes};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = AppConfig::from_env().map_err(std::io::Error::other)?;

    let store = db::init_store(&config).await.map_err(std::io::Error::other)?;
    db::seed_admin(&store, &config)
        .await
        .map_err(|e| std::io::Error::other(e.to_string()))?;

    let secret_key = config.cookie_key();
    let limiter = RateLimiter::new(config.login_limits);
    db::spawn_session_sweeper(store.clone(), limiter.clone());
    let limiter = web::Data::new(limiter);
    let bind_addr = config.bind_addr.clone();
    let cookie_secure = config.cookie_secure;
    let store = web::Data::new(store);
    let config = web::Data::new(config);

    log::info!("Starting server at http://{bind_addr}");

    HttpServer::new(move || {
        App::new()
            .wrap(auth::session_middleware(secret_key.clone(), cookie_secure))
            .wrap(middleware::Logger::default())
            .app_data(store.clone())
            .app_data(config.clone())
            .app_data(limiter.clone())
            .configure(routes::configure)
            // Default 404 handler (must be registered last)
            .default_service(web::to(routes::not_found))
    })
    .bind(bind_addr)?
    .run()
    .await
}
