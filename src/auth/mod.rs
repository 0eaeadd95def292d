// 令牌签发与校验

pub mod token;

pub use token::{Claims, IssuedToken, JwtTokenIssuer, TokenError, TokenIssuer};
