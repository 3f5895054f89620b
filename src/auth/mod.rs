/// Authentication module
///
/// Token lifecycle (issue, verify, refresh), the clock it runs on,
/// and password hashing for administrator logins.

mod claims;
mod clock;
mod password;
mod token;

pub use claims::Claims;
pub use clock::{Clock, ManualClock, SystemClock};
pub use password::{hash_password, verify_password};
pub use token::TokenService;
