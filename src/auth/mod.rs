mod cookie;
mod log_in;
mod log_out;
mod middleware;
mod password;
mod register;
mod token;
mod user;

pub use cookie::{DEFAULT_COOKIE_DURATION, invalidate_auth_cookie, set_auth_cookie};
pub use log_in::{AccountState, post_log_in};
pub use log_out::post_log_out;
pub use middleware::{AuthState, CurrentUser, auth_gateway};
pub use password::{PasswordHash, ValidatedPassword};
pub use register::register_user;
pub(super) use token::Token;
pub use user::{
    Gender, NewUser, User, UserID, count_users, create_user, create_user_table, get_user_by_id,
    get_user_by_username, profile_picture_url,
};

#[cfg(test)]
pub(crate) use cookie::COOKIE_TOKEN;

#[cfg(test)]
pub(crate) use user::new_test_user;
