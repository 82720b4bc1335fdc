//! Reading settings from environment variables.

use std::{env, str::FromStr, fmt::Display};

use anyhow::{anyhow, bail, Result};

/// Parse the env var `varname` if it is set.
pub fn opt_get_env<T: FromStr>(varname: &str) -> Result<Option<T>>
    where T::Err: Display
{
    match env::var(varname) {
        Ok(s) => {
            Ok(Some(s.parse().map_err(
                |e| anyhow!("could not parse {varname:?} env var with contents {s:?}: {e}"))?))
        },
        Err(e) => match e {
            env::VarError::NotPresent => Ok(None),
            env::VarError::NotUnicode(_) => bail!("could not decode {varname:?} env var: {e}")
        }
    }
}

fn parse_bool(s: &str) -> Option<bool> {
    match s {
        "1" | "true" | "on" | "yes" => Some(true),
        "0" | "" | "false" | "off" | "no" => Some(false),
        _ => None
    }
}

/// Unset counts as false. Accepts 1/0, true/false, on/off, yes/no.
pub fn get_env_bool(varname: &str) -> Result<bool> {
    match opt_get_env::<String>(varname)? {
        Some(s) => parse_bool(&s).ok_or_else(
            || anyhow!("invalid boolean in {varname:?} env var: {s:?}")),
        None => Ok(false)
    }
}
