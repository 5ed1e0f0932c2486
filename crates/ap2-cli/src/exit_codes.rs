//! Exit codes for the `ap2` binary.

use ap2_core::Ap2Error;

pub const SUCCESS: i32 = 0;
pub const FAILURE: i32 = 1; // Flow ended without completing, or bad input
pub const CONFIG_ERROR: i32 = 2;

/// Exit code for an error reaching `main`.
pub fn for_error(err: &anyhow::Error) -> i32 {
    err.downcast_ref::<Ap2Error>()
        .map(Ap2Error::exit_code)
        .unwrap_or(CONFIG_ERROR)
}
