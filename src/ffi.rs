//! C ABI: fill a caller-owned `MAXSCORE x MAXSCORE` buffer with a joint score histogram.

use std::ffi::{c_char, c_int, CStr};
use std::slice;

use crate::config::{self, Config};
use crate::error::{Result, SimError};
use crate::simulation;

/// Zero `data_buffer` and fill it with the joint (away, home) histogram of `sims_n` games.
///
/// Returns 0.0 on success or a negative [SimError::status_code]. A negative `sims_n` plays no
/// games. The seed is `BALLGAME_SEED` when set, otherwise OS entropy.
///
/// # Safety
/// `data_buffer` must point to at least [buffer_size] writable `u32` cells. `away_path` and
/// `home_path` must be valid NUL-terminated strings. None of them may be mutated by another
/// thread during the call.
#[no_mangle]
pub unsafe extern "C" fn run_simulations(
    data_buffer: *mut u32,
    away_path: *const c_char,
    home_path: *const c_char,
    sims_n: c_int,
) -> f64 {
    match run_simulations_raw(data_buffer, away_path, home_path, sims_n) {
        Ok(()) => 0.0,
        Err(err) => {
            tracing::error!("run_simulations failed: {err}");
            err.status_code()
        }
    }
}

unsafe fn run_simulations_raw(
    data_buffer: *mut u32,
    away_path: *const c_char,
    home_path: *const c_char,
    sims_n: c_int,
) -> Result<()> {
    if data_buffer.is_null() {
        return Err(SimError::InvalidArgument("null histogram buffer".to_string()));
    }
    let away = path_arg(away_path, "away_path")?;
    let home = path_arg(home_path, "home_path")?;

    let max = config::max_score();
    let buffer = slice::from_raw_parts_mut(data_buffer, max * max);
    let games = u64::try_from(sims_n).unwrap_or(0);
    simulation::run_simulations(buffer, max, away, home, games, Config::from_env().seed)
}

unsafe fn path_arg<'a>(ptr: *const c_char, name: &str) -> Result<&'a str> {
    if ptr.is_null() {
        return Err(SimError::InvalidArgument(format!("{name} is null")));
    }
    CStr::from_ptr(ptr)
        .to_str()
        .map_err(|_| SimError::InvalidArgument(format!("{name} is not valid UTF-8")))
}

/// Histogram bound per axis.
#[no_mangle]
pub extern "C" fn max_score() -> usize {
    config::max_score()
}

/// Cells the caller must allocate for [run_simulations].
#[no_mangle]
pub extern "C" fn buffer_size() -> usize {
    config::buffer_size()
}
