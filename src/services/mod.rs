pub mod backend;
pub mod dispatch;
pub mod export;
pub mod selection;
pub mod session;
