use dotenvy::dotenv;
use std::sync::Arc;

mod application;
mod data;
mod domain;
mod infrastructure;
mod presentation;

use application::{
    auth_service::AuthService, blog_service::BlogService, comment_service::CommentService,
};
use data::{
    category_repository::PostgresCategoryRepository,
    comment_repository::PostgresCommentRepository, post_repository::PostgresPostRepository,
    user_repository::PostgresUserRepository,
};
use infrastructure::{
    database::{create_pool, run_migrations},
    jwt::JwtService,
    logging::init_logging,
};
use presentation::{http_handlers, middleware::jwt_middleware, pages};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenv().ok();

    // Initialize logging
    init_logging();

    // Get configuration from environment
    let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");
    let jwt_secret = std::env::var("JWT_SECRET").expect("JWT_SECRET must be set");
    let http_port = std::env::var("HTTP_PORT").unwrap_or_else(|_| "3000".to_string());

    // Разрешенные CORS домены из .env
    let cors_allowed_origins = std::env::var("CORS_ALLOWED_ORIGINS")
        .unwrap_or_else(|_| "http://localhost:8000,http://127.0.0.1:8000".to_string());

    let http_addr = format!("0.0.0.0:{}", http_port);

    tracing::info!("Starting blogicum server...");
    tracing::info!("HTTP server will listen on {}", http_addr);
    tracing::info!("CORS allowed origins: {}", cors_allowed_origins);

    // Initialize database connection pool
    tracing::info!("Connecting to database...");
    let pool = create_pool(&database_url).await?;

    // Run database migrations
    tracing::info!("Running database migrations...");
    run_migrations(&pool).await?;
    tracing::info!("Migrations completed successfully");

    // Initialize services
    tracing::info!("Initializing services...");

    let jwt_service = Arc::new(JwtService::new(&jwt_secret)?);

    // Repositories
    let user_repo = Arc::new(PostgresUserRepository::new(pool.clone()));
    let post_repo = Arc::new(PostgresPostRepository::new(pool.clone()));
    let category_repo = Arc::new(PostgresCategoryRepository::new(pool.clone()));
    let comment_repo = Arc::new(PostgresCommentRepository::new(pool.clone()));

    // Application services
    let auth_service = Arc::new(AuthService::new(user_repo.clone(), jwt_service.clone()));
    let blog_service = Arc::new(BlogService::new(
        post_repo.clone(),
        user_repo.clone(),
        category_repo.clone(),
        comment_repo.clone(),
    ));
    let comment_service = Arc::new(CommentService::new(comment_repo.clone(), post_repo.clone()));

    tracing::info!("Services initialized successfully");

    run_http_server(
        http_addr,
        auth_service,
        blog_service,
        comment_service,
        jwt_service,
        cors_allowed_origins,
    )
    .await?;

    tracing::info!("Shutting down...");
    Ok(())
}

/// Configure CORS for the HTTP server with allowed origins from .env
fn configure_cors(allowed_origins: &str) -> actix_cors::Cors {
    use actix_cors::Cors;
    use actix_web::http::header;

    let origins: Vec<&str> = allowed_origins.split(',').map(|s| s.trim()).collect();

    let mut cors = Cors::default()
        .allowed_methods(vec!["GET", "POST", "OPTIONS"])
        .allowed_headers(vec![
            header::AUTHORIZATION,
            header::ACCEPT,
            header::CONTENT_TYPE,
        ])
        .expose_headers(vec![header::AUTHORIZATION, header::LOCATION])
        .max_age(3600);

    for origin in origins {
        if !origin.is_empty() {
            cors = cors.allowed_origin(origin);
            tracing::debug!("Added allowed CORS origin: {}", origin);
        }
    }

    cors
}

async fn run_http_server(
    addr: String,
    auth_service: Arc<AuthService>,
    blog_service: Arc<BlogService>,
    comment_service: Arc<CommentService>,
    jwt_service: Arc<JwtService>,
    cors_allowed_origins: String,
) -> anyhow::Result<()> {
    use actix_web::{middleware::Logger, web, App, HttpServer};
    use actix_web_httpauth::middleware::HttpAuthentication;

    tracing::info!("Configuring HTTP server...");

    let server = HttpServer::new(move || {
        let auth = HttpAuthentication::bearer(jwt_middleware);

        App::new()
            .wrap(Logger::default())
            .wrap(configure_cors(&cors_allowed_origins))
            .app_data(web::Data::new(auth_service.clone()))
            .app_data(web::Data::new(blog_service.clone()))
            .app_data(web::Data::new(comment_service.clone()))
            .app_data(web::Data::new(jwt_service.clone()))
            // Public routes - authentication
            .service(
                web::scope("/auth")
                    .route("/register", web::post().to(http_handlers::register))
                    .route("/login", web::post().to(http_handlers::login)),
            )
            // Public routes - static pages
            .service(
                web::scope("/pages")
                    .route("/about/", web::get().to(pages::about))
                    .route("/rules/", web::get().to(pages::rules)),
            )
            // Public routes - listings and detail
            .route("/", web::get().to(http_handlers::index))
            .route(
                "/category/{slug}/",
                web::get().to(http_handlers::category_posts),
            )
            .route(
                "/profile/{username}/",
                web::get().to(http_handlers::profile),
            )
            // Protected routes - profile
            .service(
                web::resource("/edit_profile/")
                    .wrap(auth.clone())
                    .route(web::get().to(http_handlers::edit_profile_form))
                    .route(web::post().to(http_handlers::update_profile)),
            )
            // Protected routes - posts (registered before "/posts/{post_id}/")
            .service(
                web::resource("/posts/create/")
                    .wrap(auth.clone())
                    .route(web::get().to(http_handlers::post_create_form))
                    .route(web::post().to(http_handlers::create_post)),
            )
            .route(
                "/posts/{post_id}/",
                web::get().to(http_handlers::post_detail),
            )
            .service(
                web::resource("/posts/{post_id}/edit/")
                    .wrap(auth.clone())
                    .route(web::get().to(http_handlers::edit_post_form))
                    .route(web::post().to(http_handlers::update_post)),
            )
            .service(
                web::resource("/posts/{post_id}/delete/")
                    .wrap(auth.clone())
                    .route(web::get().to(http_handlers::delete_post_form))
                    .route(web::post().to(http_handlers::delete_post)),
            )
            // Protected routes - comments
            .service(
                web::resource("/posts/{post_id}/comment/")
                    .wrap(auth.clone())
                    .route(web::post().to(http_handlers::add_comment)),
            )
            .service(
                web::resource("/posts/{post_id}/comment/{comment_id}/edit/")
                    .wrap(auth.clone())
                    .route(web::get().to(http_handlers::edit_comment_form))
                    .route(web::post().to(http_handlers::update_comment)),
            )
            .service(
                web::resource("/posts/{post_id}/comment/{comment_id}/delete/")
                    .wrap(auth.clone())
                    .route(web::get().to(http_handlers::delete_comment_form))
                    .route(web::post().to(http_handlers::delete_comment)),
            )
            // Всё остальное - кастомная страница 404
            .default_service(web::route().to(pages::not_found))
    })
    .bind(&addr)?
    .run();

    tracing::info!("HTTP server running on {}", addr);

    server.await?;

    Ok(())
}
