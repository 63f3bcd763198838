fn main() {
    // Host builds (`--no-default-features`) have no ESP-IDF toolchain to
    // propagate, so the sysenv hand-off only runs for firmware builds.
    #[cfg(feature = "espidf")]
    embuild::espidf::sysenv::output();
}
