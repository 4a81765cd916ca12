//! # devrun-platform - Native Toolchain Runners
//!
//! Builds, installs and launches the app on iOS simulators and Android devices
//! by driving `xcodebuild`, `xcrun simctl`, `gradlew` and `adb`.
//!
//! ## Public API
//!
//! ### Runners
//! - [`PlatformRunner`] - One platform's build → install → launch workflow
//! - [`NativeRunner`] - Enum over [`IosRunner`] and [`AndroidRunner`]
//! - [`PlatformContext`] - Per-run inputs, including packager readiness
//!
//! ### Discovery
//! - [`list_ios_simulators`], [`resolve_targets`] - Simulator listing and selection
//! - [`list_android_devices`] - `adb devices -l`
//! - [`ToolAvailability`] - Locates `xcrun`, `xcodebuild` and `adb`

pub mod android;
pub mod commands;
pub mod devices;
pub mod ios;
pub mod runner;
pub mod simulators;
pub mod tool_availability;

pub use android::{AndroidProject, AndroidRunner};
pub use commands::{run_tool, ToolOutput};
pub use devices::{list_android_devices, parse_adb_devices, AndroidDevice};
pub use ios::{IosProject, IosRunner, XcodeTarget};
pub use runner::{LocalPlatformRunner, NativeRunner, PlatformContext, PlatformRunner};
pub use simulators::{
    boot_simulator, list_ios_simulators, parse_simctl_output, resolve_targets, IosSimulator,
    SimulatorState,
};
pub use tool_availability::ToolAvailability;
