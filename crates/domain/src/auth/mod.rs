//! Authentication domain types

mod types;

pub use types::{
    ADMIN_ROLE, Credentials, RefreshRequest, Role, TokenPair, TokenResponse, UserRead, bearer,
    token_preview,
};
