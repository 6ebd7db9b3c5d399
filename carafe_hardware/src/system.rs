//! Host operations behind the Hostname and Shutdown/Restart menu entries.
use carafe_traits::{BoxError, PowerAction, SystemControl};
use std::process::Command;
use std::sync::{Arc, Mutex};

use crate::error::HwError;

/// Runs the real commands on the host.
///
/// Power actions only go through when `allow_power` is set; otherwise they
/// are logged and reported as done.
#[derive(Debug, Clone, Default)]
pub struct ShellSystem {
    allow_power: bool,
}

impl ShellSystem {
    pub fn new(allow_power: bool) -> Self {
        Self { allow_power }
    }
}

fn power_args(action: PowerAction) -> [&'static str; 3] {
    match action {
        PowerAction::Halt => ["shutdown", "-h", "now"],
        PowerAction::Reboot => ["shutdown", "-r", "now"],
    }
}

impl SystemControl for ShellSystem {
    fn host_addresses(&self) -> Result<String, BoxError> {
        let out = Command::new("hostname").arg("-I").output().map_err(HwError::Io)?;
        if !out.status.success() {
            return Err(format!("hostname -I exited with {}", out.status).into());
        }
        Ok(String::from_utf8_lossy(&out.stdout).trim().to_string())
    }

    fn power(&self, action: PowerAction) -> Result<(), BoxError> {
        let args = power_args(action);
        if !self.allow_power {
            tracing::warn!(?action, "power actions disabled (system.allow_power = false)");
            return Ok(());
        }
        tracing::info!(?action, "issuing power action");
        let status = Command::new("sudo").args(args).status().map_err(HwError::Io)?;
        if status.success() {
            Ok(())
        } else {
            Err(format!("sudo {} exited with {status}", args.join(" ")).into())
        }
    }
}

/// Simulation stand-in: fixed addresses, power actions only recorded.
#[derive(Debug, Clone)]
pub struct DryRunSystem {
    addresses: String,
    issued: Arc<Mutex<Vec<PowerAction>>>,
}

impl Default for DryRunSystem {
    fn default() -> Self {
        Self::new("127.0.0.1")
    }
}

impl DryRunSystem {
    pub fn new(addresses: impl Into<String>) -> Self {
        Self {
            addresses: addresses.into(),
            issued: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn issued(&self) -> Vec<PowerAction> {
        self.issued.lock().map(|v| v.clone()).unwrap_or_default()
    }
}

impl SystemControl for DryRunSystem {
    fn host_addresses(&self) -> Result<String, BoxError> {
        Ok(self.addresses.clone())
    }

    fn power(&self, action: PowerAction) -> Result<(), BoxError> {
        tracing::info!(?action, "dry run: power action not executed");
        self.issued
            .lock()
            .map_err(|_| "dry-run system lock poisoned")?
            .push(action);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dry_run_records_actions() {
        let sys = DryRunSystem::new("10.0.0.7");
        assert_eq!(sys.host_addresses().unwrap(), "10.0.0.7");
        sys.power(PowerAction::Reboot).unwrap();
        sys.power(PowerAction::Halt).unwrap();
        assert_eq!(sys.issued(), vec![PowerAction::Reboot, PowerAction::Halt]);
    }

    #[test]
    fn disallowed_power_is_a_no_op() {
        assert!(ShellSystem::new(false).power(PowerAction::Halt).is_ok());
    }

    #[test]
    fn power_commands() {
        assert_eq!(power_args(PowerAction::Halt), ["shutdown", "-h", "now"]);
        assert_eq!(power_args(PowerAction::Reboot), ["shutdown", "-r", "now"]);
    }
}
