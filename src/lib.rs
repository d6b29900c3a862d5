pub mod config;
pub mod domain {
    pub mod booking;
    pub mod payment;
    pub mod principal;
    pub mod provider_log;
    pub mod webhook;
}
pub mod error;
pub mod gateways;
pub mod http {
    pub mod handlers {
        pub mod ops;
        pub mod payments;
    }
    pub mod middleware {
        pub mod principal_auth;
        pub mod rate_limit;
    }
    pub mod routes;
}
pub mod repo;
pub mod service {
    pub mod booking_locks;
    pub mod payment_service;
}

#[derive(Clone)]
pub struct AppState {
    pub payment_service: service::payment_service::PaymentService,
    pub verifier: gateways::signature::SignatureVerifier,
    pub pool: sqlx::PgPool,
    pub redis_client: redis::Client,
}
