mod resolver;

pub use resolver::{ApiKeyIdentityResolver, AuthError, IdentityResolver, UserId};
