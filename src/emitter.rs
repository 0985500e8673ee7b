// src/emitter.rs

//! Build-metadata emission
//!
//! Renders a resolved dependency set into the CMake-style list fragment the
//! external compiler invocation consumes. The output syntax is a stable,
//! versioned contract: `set(<target>_<KEY> "v1;v2;...")` lines in a fixed
//! section order, values in ResolvedSet priority order. Byte-identical for
//! identical input; no I/O, the caller persists the text.

use crate::resolver::ResolvedSet;

/// Render the build-description fragment for `target_name`. Pure function.
pub fn render(resolved: &ResolvedSet, target_name: &str) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "# Dependency metadata for {} (generated by nativedep; do not edit)\n",
        target_name
    ));

    let found = || resolved.packages.iter().filter(|p| p.found);

    push_list(
        &mut out,
        target_name,
        "DEPENDENCIES",
        found().map(|p| p.name.clone()).collect(),
    );
    push_list(
        &mut out,
        target_name,
        "INCLUDE_DIRS",
        resolved
            .include_dirs
            .iter()
            .map(|p| p.display().to_string())
            .collect(),
    );
    push_list(
        &mut out,
        target_name,
        "LIBRARY_DIRS",
        resolved
            .library_dirs
            .iter()
            .map(|p| p.display().to_string())
            .collect(),
    );
    push_list(
        &mut out,
        target_name,
        "LIBRARIES",
        resolved.link_names.clone(),
    );
    push_list(
        &mut out,
        target_name,
        "CFLAGS",
        resolved.extra_cflags.clone(),
    );
    push_list(
        &mut out,
        target_name,
        "LDFLAGS",
        resolved.extra_ldflags.clone(),
    );

    let mut defines = Vec::new();
    for package in found() {
        for (key, value) in package.defines() {
            match value {
                Some(value) => defines.push(format!("{}={}", key, value)),
                None => defines.push(key),
            }
        }
    }
    push_list(&mut out, target_name, "DEFINES", defines);

    out
}

fn push_list(out: &mut String, target: &str, key: &str, values: Vec<String>) {
    // Values may carry quotes (string-valued defines); escape them so the
    // quoted CMake argument stays one token
    let escaped: Vec<String> = values.iter().map(|v| v.replace('"', "\\\"")).collect();
    out.push_str(&format!(
        "set({}_{} \"{}\")\n",
        target,
        key,
        escaped.join(";")
    ));
}
