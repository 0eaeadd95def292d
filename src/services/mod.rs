// 业务服务模块

pub mod identity;

pub use identity::{IdentityService, NewAccount, UserChanges};
