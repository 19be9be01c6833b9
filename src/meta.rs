use std::fmt::Display;
use std::str::FromStr;

/// Every ABI cargo-ndk can build, in the order targets are always emitted.
pub const KNOWN_TARGETS: [Target; 4] = [
    Target::Arm64V8a,
    Target::ArmeabiV7a,
    Target::X86_64,
    Target::X86,
];

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Target {
    Arm64V8a,
    ArmeabiV7a,
    X86_64,
    X86,
}

impl Display for Target {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.abi())
    }
}

impl FromStr for Target {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            // match android style architectures
            "arm64-v8a" => Target::Arm64V8a,
            "armeabi-v7a" => Target::ArmeabiV7a,
            "x86_64" => Target::X86_64,
            "x86" => Target::X86,
            // match rust triple architectures
            "aarch64-linux-android" => Target::Arm64V8a,
            "armv7-linux-androideabi" => Target::ArmeabiV7a,
            "x86_64-linux-android" => Target::X86_64,
            "i686-linux-android" => Target::X86,
            _ => return Err(format!("Unsupported target: '{s}'")),
        })
    }
}

impl Target {
    /// Android style architecture name, as used in `abiFilters` and `jniLibs`.
    pub fn abi(&self) -> &'static str {
        match self {
            Target::Arm64V8a => "arm64-v8a",
            Target::ArmeabiV7a => "armeabi-v7a",
            Target::X86_64 => "x86_64",
            Target::X86 => "x86",
        }
    }

    /// Rust target triple.
    pub fn triple(&self) -> &'static str {
        match self {
            Target::Arm64V8a => "aarch64-linux-android",
            Target::ArmeabiV7a => "armv7-linux-androideabi",
            Target::X86_64 => "x86_64-linux-android",
            Target::X86 => "i686-linux-android",
        }
    }
}

/// Selects the targets named by `abi_filter`.
///
/// An empty filter selects every known target. Names that are not a known ABI
/// are dropped without error. The result always follows [`KNOWN_TARGETS`]
/// order, regardless of the order of the filter.
pub fn resolve_targets<S: AsRef<str>>(abi_filter: &[S]) -> Vec<Target> {
    if abi_filter.is_empty() {
        return KNOWN_TARGETS.to_vec();
    }

    KNOWN_TARGETS
        .iter()
        .copied()
        .filter(|target| abi_filter.iter().any(|abi| abi.as_ref() == target.abi()))
        .collect()
}
