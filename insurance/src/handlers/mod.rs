pub mod email;
pub mod health;
pub mod insurance;
pub mod logs;
