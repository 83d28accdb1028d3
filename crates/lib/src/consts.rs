pub const APP_NAME: &str = "wasmpub";

/// Name of the configuration file discovered by walking upward.
pub const CONFIG_FILENAME: &str = "wasmpub.toml";

/// Compiler target platform used when a target does not name one.
pub const DEFAULT_PLATFORM: &str = "wasm32-unknown-unknown";

/// Binding generator target environment.
pub const DEFAULT_BINDGEN_ENV: &str = "web";

/// Suffix `wasm-bindgen` appends to the generated module's file name.
pub const DEFAULT_MODULE_SUFFIX: &str = "_bg";

/// Suffix of the lock file placed beside a published directory.
pub const LOCK_SUFFIX: &str = ".wasmpub.lock";
