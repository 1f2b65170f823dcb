use std::env;

fn main() {
    // Version can be pinned by the firmware build driving this tool
    let version =
        env::var("ROMPACK_VERSION").unwrap_or_else(|_| env!("CARGO_PKG_VERSION").to_string());

    println!("cargo:rustc-env=ROMPACK_VERSION={}", version);
    println!("cargo:rerun-if-env-changed=ROMPACK_VERSION");
}
