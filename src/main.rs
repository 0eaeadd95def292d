use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;

use identity_backend::{
    AppState,
    auth::JwtTokenIssuer,
    cache::RedisCacheStore,
    config::{Config, LogFormat},
    database::PgUserRepository,
    routes,
    services::IdentityService,
    utils::PasswordCodec,
};
use sqlx::Executor;
use sqlx::postgres::PgPoolOptions;
#[cfg(debug_assertions)]
use tower_http::cors::CorsLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn init_tracing(format: LogFormat) {
    let filter = tracing_subscriber::EnvFilter::new(
        std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
    );
    let registry = tracing_subscriber::registry().with(filter);
    match format {
        LogFormat::Json => registry
            .with(tracing_subscriber::fmt::layer().json().with_current_span(true))
            .init(),
        LogFormat::Pretty => registry.with(tracing_subscriber::fmt::layer()).init(),
    }
}

#[tokio::main]
async fn main() {
    // 加载配置
    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    // 初始化日志
    init_tracing(config.log_format);

    #[cfg(debug_assertions)]
    tracing::info!("Running in debug mode with CORS enabled");

    #[cfg(not(debug_assertions))]
    tracing::info!("Running in production mode with CORS disabled");

    // 设置数据库连接池
    let pool = PgPoolOptions::new()
        .max_connections(config.database_max_connections)
        .after_connect(|conn, _meta| {
            Box::pin(async move {
                conn.execute("SET application_name = 'identity_backend';")
                    .await?;
                Ok(())
            })
        })
        .connect(&config.database_url)
        .await
        .expect("Failed to connect to Postgres");

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("Failed to run database migrations");
    tracing::info!("Database connected and migrated");

    // 设置 Redis 连接
    let redis_client =
        redis::Client::open(config.redis_url.clone()).expect("Failed to create Redis client");
    let cache = Arc::new(
        RedisCacheStore::connect(redis_client)
            .await
            .expect("Failed to connect to Redis"),
    );
    tracing::info!("Redis connected");

    // 组装身份服务
    let tokens = Arc::new(JwtTokenIssuer::new(
        config.jwt_secret.as_bytes(),
        config.jwt_expiration(),
    ));
    let identity = IdentityService::new(
        Arc::new(PgUserRepository::new(pool)),
        cache.clone(),
        tokens,
        PasswordCodec::new(config.bcrypt_cost),
    )
    .with_cache_ttls(config.user_cache_ttl(), config.session_cache_ttl());

    // 设置应用状态
    let state = AppState {
        identity: Arc::new(identity),
        cache,
        config: Arc::new(config.clone()),
    };

    let router = routes::router(state);

    // 根据编译模式决定是否添加CORS
    #[cfg(debug_assertions)]
    let router = {
        tracing::debug!("Adding CORS layer for development mode");
        router.layer(CorsLayer::permissive())
    };

    // 启动服务器
    let addr = SocketAddr::new(
        config.server_host.parse().unwrap_or_else(|_| {
            tracing::warn!("Invalid server_host, falling back to dual-stack default");
            IpAddr::V6(std::net::Ipv6Addr::UNSPECIFIED)
        }),
        config.server_port,
    );
    tracing::info!("Server listening on {}", addr);
    axum::serve(
        tokio::net::TcpListener::bind(&addr)
            .await
            .expect("Failed to bind"),
        router.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await
    .expect("Failed to start server");
}
