pub mod handler;

pub use handler::{login, logout, me, register};
