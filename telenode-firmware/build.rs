//! Build script for telenode-firmware
//!
//! - Sets up linker search paths for memory.x
//! - Validates node.toml at compile time
//! - Checks the WiFi credentials and radio firmware are available

use std::env;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Keys accepted in each section, with their inclusive range
const SCHEMA: &[(&str, &[(&str, i64, i64)])] = &[
    (
        "loop",
        &[
            ("debounce_ms", 0, u32::MAX as i64),
            ("update_interval_ms", 1, u32::MAX as i64),
            ("link_retry_ms", 0, u32::MAX as i64),
        ],
    ),
    ("graph", &[("top", 16, 63), ("height", 1, 47)]),
    ("display", &[("i2c_address", 0x08, 0x77)]),
    ("server", &[("port", 1, u16::MAX as i64)]),
];

/// Radio blobs expected in `TELENODE_CYW43_FIRMWARE`
const RADIO_BLOBS: &[&str] = &["43439A0.bin", "43439A0_clm.bin"];

fn main() {
    setup_linker();
    validate_config();
    check_environment();
}

/// Set up linker search paths for memory.x
fn setup_linker() {
    let out_dir = PathBuf::from(env::var("OUT_DIR").unwrap());

    // Copy memory.x to the output directory
    let memory_x = include_bytes!("memory.x");
    let mut f = File::create(out_dir.join("memory.x")).unwrap();
    f.write_all(memory_x).unwrap();

    // Tell rustc where to find memory.x
    println!("cargo:rustc-link-search={}", out_dir.display());

    println!("cargo:rustc-link-arg-bins=--nmagic");
    println!("cargo:rustc-link-arg-bins=-Tlink.x");
    println!("cargo:rustc-link-arg-bins=-Tlink-rp.x");
    println!("cargo:rustc-link-arg-bins=-Tdefmt.x");

    // Re-run if memory.x changes
    println!("cargo:rerun-if-changed=memory.x");
    println!("cargo:rerun-if-changed=build.rs");
}

/// Validate node.toml configuration at compile time
fn validate_config() {
    println!("cargo:rerun-if-changed=node.toml");

    let config_path = Path::new("node.toml");

    let config_content = match fs::read_to_string(config_path) {
        Ok(content) => content,
        Err(e) => fail(
            "Failed to read node.toml",
            &[
                format!("Error: {}", e),
                "The firmware embeds node.toml from the crate directory.".to_string(),
            ],
        ),
    };

    let config: toml::Value = match toml::from_str(&config_content) {
        Ok(value) => value,
        Err(e) => fail(
            "Invalid TOML syntax in node.toml",
            &e.to_string().lines().map(str::to_string).collect::<Vec<_>>(),
        ),
    };

    let errors = schema_errors(&config);
    if !errors.is_empty() {
        fail("Invalid configuration in node.toml", &errors);
    }

    if let Some(error) = geometry_error(&config) {
        fail("Invalid graph geometry in node.toml", &[error]);
    }

    println!("cargo:warning=node.toml validated successfully");
}

/// Check every section and key against [`SCHEMA`]
fn schema_errors(config: &toml::Value) -> Vec<String> {
    let mut errors = Vec::new();

    let Some(root) = config.as_table() else {
        return vec!["node.toml must be a table".to_string()];
    };

    for (section, value) in root {
        let Some((_, keys)) = SCHEMA.iter().find(|(name, _)| *name == section.as_str()) else {
            errors.push(format!("Unknown section [{}]", section));
            continue;
        };

        let Some(table) = value.as_table() else {
            errors.push(format!("[{}] must be a table", section));
            continue;
        };

        for (key, value) in table {
            let Some((_, min, max)) = keys.iter().find(|(name, _, _)| *name == key.as_str()) else {
                errors.push(format!("[{}] unknown key '{}'", section, key));
                continue;
            };

            match value.as_integer() {
                Some(v) if v >= *min && v <= *max => {}
                Some(_) => errors.push(format!(
                    "[{}] {} must be {}-{}",
                    section, key, min, max
                )),
                None => errors.push(format!("[{}] {} must be an integer", section, key)),
            }
        }
    }

    errors
}

/// The plot band must end above the last panel row
fn geometry_error(config: &toml::Value) -> Option<String> {
    let graph = config.get("graph")?;
    let top = graph.get("top").and_then(|v| v.as_integer()).unwrap_or(20);
    let height = graph.get("height").and_then(|v| v.as_integer()).unwrap_or(40);

    if top + height >= 64 {
        Some(format!("top + height = {} must be below 64", top + height))
    } else {
        None
    }
}

/// WiFi credentials and radio firmware are compiled in from the environment
fn check_environment() {
    println!("cargo:rerun-if-env-changed=TELENODE_WIFI_SSID");
    println!("cargo:rerun-if-env-changed=TELENODE_WIFI_PASSWORD");
    println!("cargo:rerun-if-env-changed=TELENODE_CYW43_FIRMWARE");

    let mut errors = Vec::new();

    for var in ["TELENODE_WIFI_SSID", "TELENODE_WIFI_PASSWORD"] {
        if env::var(var).map(|v| v.is_empty()).unwrap_or(true) {
            errors.push(format!("{} is not set", var));
        }
    }

    match env::var("TELENODE_CYW43_FIRMWARE") {
        Ok(dir) => {
            for blob in RADIO_BLOBS {
                let path = Path::new(&dir).join(blob);
                if !path.exists() {
                    errors.push(format!("Missing {}", path.display()));
                }
                println!("cargo:rerun-if-changed={}", path.display());
            }
        }
        Err(_) => errors.push(
            "TELENODE_CYW43_FIRMWARE is not set (directory with 43439A0*.bin)".to_string(),
        ),
    }

    if !errors.is_empty() {
        fail("Build environment incomplete", &errors);
    }
}

/// Abort the build with a boxed error message
fn fail(title: &str, lines: &[String]) -> ! {
    let body = lines
        .iter()
        .map(|line| {
            let truncated = if line.chars().count() > 62 {
                format!("{}...", line.chars().take(59).collect::<String>())
            } else {
                line.clone()
            };
            format!("║  • {:<62} ║", truncated)
        })
        .collect::<Vec<_>>()
        .join("\n");

    panic!(
        "\n\
        ╔══════════════════════════════════════════════════════════════════╗\n\
        ║  ERROR: {:<56} ║\n\
        ╠══════════════════════════════════════════════════════════════════╣\n\
        {}\n\
        ╚══════════════════════════════════════════════════════════════════╝\n",
        title, body
    );
}
