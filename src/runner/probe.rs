//! Connectivity probes for the system being migrated.
//!
//! Before each upgrade step the runner asks a [`ConnectivityProbe`] whether
//! the target (typically a database) is reachable. The probe reports only
//! success or failure; the retry policy belongs to the runner.

use std::collections::HashMap;
use std::fmt;
use std::net::{TcpStream, ToSocketAddrs};
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{anyhow, bail, Context};

use crate::config::{ProbeConfig, Settings};
use crate::shell::{self, CommandOptions};

/// Checks whether the external target can be reached.
pub trait ConnectivityProbe {
    /// Succeeds when the target is reachable.
    fn probe(&self) -> anyhow::Result<()>;
}

impl<P: ConnectivityProbe + ?Sized> ConnectivityProbe for Box<P> {
    fn probe(&self) -> anyhow::Result<()> {
        (**self).probe()
    }
}

/// A probe that always succeeds, for targets with nothing to check.
#[derive(Debug, Clone, Copy, Default)]
pub struct AlwaysReachable;

impl ConnectivityProbe for AlwaysReachable {
    fn probe(&self) -> anyhow::Result<()> {
        Ok(())
    }
}

/// Reachable when a shell command exits 0.
#[derive(Debug, Clone)]
pub struct CommandProbe {
    command: String,
    cwd: Option<PathBuf>,
    env: HashMap<String, String>,
}

impl CommandProbe {
    /// Create a probe for `command`.
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            cwd: None,
            env: HashMap::new(),
        }
    }

    /// Run the command in `cwd`.
    pub fn with_cwd(mut self, cwd: impl Into<PathBuf>) -> Self {
        self.cwd = Some(cwd.into());
        self
    }

    /// Extra environment for the command.
    pub fn with_env(mut self, env: HashMap<String, String>) -> Self {
        self.env = env;
        self
    }
}

impl ConnectivityProbe for CommandProbe {
    fn probe(&self) -> anyhow::Result<()> {
        let options = CommandOptions {
            cwd: self.cwd.clone(),
            env: self.env.clone(),
            capture_stdout: true,
            capture_stderr: true,
            ..Default::default()
        };
        let result = shell::execute(&self.command, &options)?;
        if result.success {
            return Ok(());
        }

        let stderr = result.stderr.trim();
        match result.exit_code {
            Some(code) if stderr.is_empty() => {
                bail!("probe `{}` exited with code {}", self.command, code)
            }
            Some(code) => bail!("probe `{}` exited with code {}: {}", self.command, code, stderr),
            None => bail!("probe `{}` was terminated by a signal", self.command),
        }
    }
}

/// Reachable when a TCP connection to `address` succeeds within the timeout.
#[derive(Debug, Clone)]
pub struct TcpProbe {
    address: String,
    timeout: Duration,
}

impl TcpProbe {
    /// Create a probe for a `host:port` address.
    pub fn new(address: impl Into<String>, timeout: Duration) -> Self {
        Self {
            address: address.into(),
            timeout,
        }
    }
}

impl ConnectivityProbe for TcpProbe {
    fn probe(&self) -> anyhow::Result<()> {
        let addrs = self
            .address
            .to_socket_addrs()
            .with_context(|| format!("cannot resolve '{}'", self.address))?;

        let mut last_error = None;
        for addr in addrs {
            match TcpStream::connect_timeout(&addr, self.timeout) {
                Ok(_) => return Ok(()),
                Err(e) => last_error = Some(e),
            }
        }

        Err(match last_error {
            Some(e) => anyhow!("cannot connect to {}: {}", self.address, e),
            None => anyhow!("'{}' resolved to no addresses", self.address),
        })
    }
}

/// A probe backed by a closure.
pub struct FnProbe<F>(F);

impl<F> FnProbe<F>
where
    F: Fn() -> anyhow::Result<()>,
{
    /// Wrap a closure.
    pub fn new(f: F) -> Self {
        Self(f)
    }
}

impl<F> ConnectivityProbe for FnProbe<F>
where
    F: Fn() -> anyhow::Result<()>,
{
    fn probe(&self) -> anyhow::Result<()> {
        (self.0)()
    }
}

impl<F> fmt::Debug for FnProbe<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnProbe").finish_non_exhaustive()
    }
}

/// Build the probe described by the manifest.
///
/// No `probe` section means the target is assumed reachable.
pub fn from_config(
    probe: Option<&ProbeConfig>,
    settings: &Settings,
    cwd: PathBuf,
) -> Box<dyn ConnectivityProbe> {
    let Some(config) = probe else {
        return Box::new(AlwaysReachable);
    };

    if let Some(command) = &config.command {
        Box::new(
            CommandProbe::new(command.clone())
                .with_cwd(cwd)
                .with_env(settings.env.clone()),
        )
    } else if let Some(address) = &config.tcp {
        Box::new(TcpProbe::new(
            address.clone(),
            Duration::from_secs(config.timeout_secs),
        ))
    } else {
        Box::new(AlwaysReachable)
    }
}
