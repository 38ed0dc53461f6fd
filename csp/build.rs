// Build-time configuration, generated the way the teacher crate generates
// `kconfig.rs`: a handful of constants derived from the environment, written
// to `OUT_DIR` and `include!`-d from the crate proper.

use std::env;
use std::fs;
use std::path::PathBuf;

fn main() {
    println!("cargo:rerun-if-env-changed=CSP_TICK_RATE_HZ");

    let tick_rate: u64 = env::var("CSP_TICK_RATE_HZ")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(1000);

    let out_dir = PathBuf::from(env::var("OUT_DIR").expect("OUT_DIR not set by cargo"));
    let dest = out_dir.join("build_config.rs");

    let contents = format!(
        "/// Default kernel tick rate, in Hz, used by [`Time::to_default_ticks`] \
         when the caller does not know the target's configured rate.\n\
         ///\n\
         /// Overridable at build time via the `CSP_TICK_RATE_HZ` environment variable.\n\
         pub const DEFAULT_TICK_RATE_HZ: u64 = {tick_rate};\n"
    );

    fs::write(&dest, contents).expect("failed to write build_config.rs");
}
