use crate::error::{Error, Result};

/// Compute target for all tensor math. Every matrix participating in a
/// run lives on the same target; CPU is the only supported one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Device {
    Cpu,
}

impl Device {
    /// Resolves a requested target name. "auto" and "cpu" map to `Cpu`;
    /// anything else fails loudly instead of substituting a different
    /// target than the one asked for.
    pub fn resolve(requested: &str) -> Result<Device> {
        match requested {
            "auto" | "cpu" => Ok(Device::Cpu),
            other => Err(Error::UnsupportedDevice {
                requested: other.to_owned(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn auto_and_cpu_resolve() {
        assert_eq!(Device::resolve("auto").unwrap(), Device::Cpu);
        assert_eq!(Device::resolve("cpu").unwrap(), Device::Cpu);
    }

    #[test]
    fn unknown_targets_fail_loudly() {
        let err = Device::resolve("cuda").unwrap_err();
        assert!(matches!(err, Error::UnsupportedDevice { requested } if requested == "cuda"));
    }
}
