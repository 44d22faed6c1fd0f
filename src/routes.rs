use crate::{
    api::{attendance, employee, scan},
    auth::{handlers, middleware::auth_middleware},
    config::Config,
};
use actix_governor::{
    governor::middleware::NoOpMiddleware, Governor, GovernorConfigBuilder, PeerIpKeyExtractor,
};
use actix_web::{middleware::from_fn, web};

pub fn configure(cfg: &mut web::ServiceConfig, config: Config) {
    // Helper to build per-route limiter
    fn build_limiter(requests_per_min: u32) -> Governor<PeerIpKeyExtractor, NoOpMiddleware> {
        let per_ms = if requests_per_min == 0 {
            1
        } else {
            60_000 / requests_per_min as u64
        };
        let cfg = GovernorConfigBuilder::default()
            .per_millisecond(per_ms)
            .burst_size(requests_per_min)
            .key_extractor(PeerIpKeyExtractor)
            .finish()
            .unwrap();
        Governor::new(&cfg)
    }

    // Public routes
    cfg.service(
        web::scope("/auth")
            .service(
                web::resource("/login")
                    .wrap(build_limiter(config.rate_login_per_min))
                    .route(web::post().to(handlers::login)),
            )
            .service(
                web::resource("/refresh")
                    .wrap(build_limiter(config.rate_refresh_per_min))
                    .route(web::post().to(handlers::refresh_token)),
            )
            .service(
                web::resource("/logout")
                    .wrap(build_limiter(config.rate_login_per_min))
                    .route(web::post().to(handlers::logout)),
            )
            .service(
                web::resource("/recover")
                    .wrap(build_limiter(config.rate_recover_per_min))
                    .route(web::post().to(handlers::recover)),
            )
            .service(
                web::resource("/reset")
                    .wrap(build_limiter(config.rate_recover_per_min))
                    .route(web::post().to(handlers::reset_password)),
            ),
    );

    // Protected routes
    cfg.service(
        web::scope(&config.api_prefix)
            .wrap(from_fn(auth_middleware)) // authentication
            .wrap(build_limiter(config.rate_protected_per_min)) // rate limiting
            .service(
                web::scope("/scan")
                    .service(web::resource("").route(web::post().to(scan::scan)))
                    .service(web::resource("/frame").route(web::post().to(scan::scan_frame))),
            )
            .service(
                web::scope("/attendance")
                    .service(web::resource("/history").route(web::get().to(attendance::history)))
                    .service(web::resource("/today").route(web::get().to(attendance::today))),
            )
            .service(web::resource("/employees").route(web::get().to(employee::list_employees))),
    );
}
