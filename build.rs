fn main() {
    println!("cargo:rerun-if-changed=VERSION");

    // VERSION holds a single `major.minor.patch` token. Anything else is
    // ignored and the binary reports "dev".
    let version = std::fs::read_to_string("VERSION")
        .ok()
        .map(|s| s.trim().to_string())
        .filter(|v| is_semver(v));

    if let Some(version) = version {
        println!("cargo:rustc-env=PIXBATCH_VERSION={version}");
    }
}

fn is_semver(token: &str) -> bool {
    let parts: Vec<&str> = token.split('.').collect();
    parts.len() == 3
        && parts
            .iter()
            .all(|p| !p.is_empty() && p.chars().all(|c| c.is_ascii_digit()))
}
