pub mod extractor;
pub mod jwt;
pub mod password;

pub use extractor::CurrentUser;
pub use jwt::{Claims, JwtManager};
