pub mod config;
pub mod envelope;
pub mod error;
pub mod state;
pub mod db;
pub mod qr;
pub mod routes;
pub mod repositories;

pub mod crypto {
    pub mod session_token;
    pub mod yappy_hash;
}

pub mod models {
    pub mod collection;
    pub mod movement;
    pub mod payment;
    pub mod session;
}

pub mod services {
    pub mod checkout;
    pub mod collection;
    pub mod movement;
    pub mod session;
    pub mod transaction;
}

pub mod handlers {
    pub mod collection;
    pub mod internal;
    pub mod movement;
    pub mod session;
    pub mod transaction;
}

pub mod middleware_layer {
    pub mod internal;
    pub mod merchant;
    pub mod session;
}

pub mod validation {
    pub mod dates;
    pub mod payment;
}
