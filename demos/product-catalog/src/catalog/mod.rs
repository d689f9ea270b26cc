pub mod model;
pub mod services;
pub mod use_case;
