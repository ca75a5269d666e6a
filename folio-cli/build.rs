use std::path::Path;
use std::process::Command;

/// Short commit of the workspace, or None outside a git checkout
fn git_sha(workspace: &Path) -> Option<String> {
    let out = Command::new("git")
        .arg("-C")
        .arg(workspace)
        .args(["rev-parse", "--short", "HEAD"])
        .output()
        .ok()?;
    let sha = String::from_utf8_lossy(&out.stdout).trim().to_string();
    (out.status.success() && !sha.is_empty()).then_some(sha)
}

fn main() {
    println!("cargo:rerun-if-env-changed=FOLIO_BUILD_SHA");

    // Packagers building from a tarball pass the commit in explicitly
    let sha = std::env::var("FOLIO_BUILD_SHA").ok().filter(|s| !s.is_empty()).or_else(|| {
        let manifest_dir = std::env::var("CARGO_MANIFEST_DIR").unwrap_or_else(|_| ".".to_string());
        let workspace = Path::new(&manifest_dir).join("..");
        println!("cargo:rerun-if-changed={}", workspace.join(".git/HEAD").display());
        git_sha(&workspace)
    });

    println!("cargo:rustc-env=FOLIO_BUILD_SHA={}", sha.as_deref().unwrap_or("unknown"));
}
