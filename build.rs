use std::process::Command;

fn main() {
    // VISAFLOW_VERSION from the environment (CI), then the git tag, then "dev".
    let version = std::env::var("VISAFLOW_VERSION")
        .ok()
        .filter(|s| !s.is_empty() && s != "dev")
        .or_else(git_describe)
        .unwrap_or_else(|| env!("CARGO_PKG_VERSION").to_string());

    println!("cargo:rustc-env=VISAFLOW_VERSION={version}");
    println!("cargo:rerun-if-env-changed=VISAFLOW_VERSION");
}

fn git_describe() -> Option<String> {
    let out = Command::new("git")
        .args(["describe", "--tags", "--always", "--dirty"])
        .output()
        .ok()
        .filter(|o| o.status.success())?;
    let text = String::from_utf8(out.stdout).ok()?;
    Some(text.trim().to_string()).filter(|s| !s.is_empty())
}
