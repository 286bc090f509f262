//! End-to-end tests driving the `hexavalent-helper` binary against real git
//! repositories.

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn helper() -> Command {
    Command::cargo_bin("hexavalent-helper").unwrap()
}

/// Run git in `dir`, panicking on failure.
fn git(dir: &Path, args: &[&str]) -> String {
    let output = std::process::Command::new("git")
        .arg("-C")
        .arg(dir)
        .args(args)
        .output()
        .expect("failed to run git");
    assert!(
        output.status.success(),
        "git {:?} failed: {}",
        args,
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8(output.stdout).unwrap()
}

fn configure_identity(dir: &Path) {
    git(dir, &["config", "user.email", "dev@hexavalent.test"]);
    git(dir, &["config", "user.name", "Hexavalent Dev"]);
    git(dir, &["config", "commit.gpgsign", "false"]);
}

/// An upstream repository, a clone standing in for the Chromium checkout,
/// and a Hexavalent source directory holding patches exported from upstream.
struct Fixture {
    _root: TempDir,
    upstream: std::path::PathBuf,
    chromium: std::path::PathBuf,
    hexavalent: std::path::PathBuf,
}

impl Fixture {
    fn new() -> Self {
        let root = TempDir::new().unwrap();
        let upstream = root.path().join("upstream");
        let chromium = root.path().join("chromium");
        let hexavalent = root.path().join("hexavalent");
        fs::create_dir_all(&upstream).unwrap();
        fs::create_dir_all(&hexavalent).unwrap();

        git(&upstream, &["init", "-q"]);
        configure_identity(&upstream);
        fs::write(upstream.join("product.txt"), "name = chromium\n").unwrap();
        git(&upstream, &["add", "product.txt"]);
        git(&upstream, &["commit", "-q", "-m", "Initial"]);

        let status = std::process::Command::new("git")
            .args(["clone", "-q"])
            .arg(&upstream)
            .arg(&chromium)
            .status()
            .unwrap();
        assert!(status.success());
        configure_identity(&chromium);

        Self {
            _root: root,
            upstream,
            chromium,
            hexavalent,
        }
    }

    /// Commit `content` to `product.txt` upstream and export it as a patch
    /// into `patch_dir` under the Hexavalent directory.
    fn export_patch(&self, content: &str, message: &str, patch_dir: &str) {
        fs::write(self.upstream.join("product.txt"), content).unwrap();
        git(&self.upstream, &["commit", "-q", "-am", message]);
        let out = self.hexavalent.join(patch_dir);
        git(&self.upstream, &["format-patch", "-q", "-1", "-o", out.to_str().unwrap()]);
    }

    fn product(&self) -> String {
        fs::read_to_string(self.chromium.join("product.txt")).unwrap()
    }

    fn subjects(&self) -> Vec<String> {
        git(&self.chromium, &["log", "--format=%s"])
            .lines()
            .map(str::to_string)
            .collect()
    }

    fn command(&self) -> Command {
        let mut cmd = helper();
        cmd.arg("-x").arg(&self.hexavalent).arg(&self.chromium);
        cmd
    }
}

#[test]
fn common_and_unknown_targets_are_rejected() {
    let dir = TempDir::new().unwrap();
    for target in ["common", "COMMON", "beos"] {
        helper()
            .args(["--no-patch", "-t", target])
            .arg(dir.path())
            .assert()
            .failure()
            .stderr(predicate::str::contains("invalid target OS"));
    }
}

#[test]
fn configured_targets_succeed_without_patches() {
    let dir = TempDir::new().unwrap();
    for target in ["linux", "windows", "Windows"] {
        helper()
            .args(["--no-patch", "--target", target])
            .arg(dir.path())
            .assert()
            .success();
    }
}

#[test]
fn common_then_os_patches_are_applied() {
    let fixture = Fixture::new();
    fixture.export_patch("name = hexavalent\n", "Rename product", "patches");
    fixture.export_patch("name = hexavalent\nos = windows\n", "Add windows", "patches/windows");

    fixture.command().args(["-t", "windows"]).assert().success();

    assert_eq!(fixture.product(), "name = hexavalent\nos = windows\n");
    assert_eq!(fixture.subjects(), ["Add windows", "Rename product", "Initial"]);
}

#[test]
fn missing_os_patches_only_warn() {
    let fixture = Fixture::new();
    fixture.export_patch("name = hexavalent\n", "Rename product", "patches");

    fixture
        .command()
        .args(["-t", "windows"])
        .assert()
        .success()
        .stderr(predicate::str::contains("OS specific patch files not found"));

    assert_eq!(fixture.product(), "name = hexavalent\n");
    assert_eq!(fixture.subjects(), ["Rename product", "Initial"]);
}

#[test]
fn missing_common_patches_fail() {
    let fixture = Fixture::new();
    fs::create_dir_all(fixture.hexavalent.join("patches")).unwrap();

    fixture
        .command()
        .args(["-t", "linux"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("no patch files found"));

    assert_eq!(fixture.subjects(), ["Initial"]);
}

#[test]
fn conflicting_patch_fails() {
    let fixture = Fixture::new();
    fixture.export_patch("name = hexavalent\n", "Rename product", "patches");
    fs::write(fixture.chromium.join("product.txt"), "name = something else\n").unwrap();
    git(&fixture.chromium, &["commit", "-q", "-am", "Diverge"]);

    fixture
        .command()
        .args(["-t", "linux", "-g", "out/Default"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("git am"));

    assert!(!fixture.chromium.join("out").exists());
}

#[test]
fn gn_args_and_branding_from_custom_rules() {
    let fixture = Fixture::new();
    let hexavalent = &fixture.hexavalent;
    fs::write(hexavalent.join("linux_args.gn"), "is_official_build = true\n").unwrap();
    fs::create_dir_all(hexavalent.join("icons/chrome/app/theme")).unwrap();
    fs::write(hexavalent.join("icons/chrome/app/theme/product_logo.svg"), "<svg/>").unwrap();
    fs::write(
        hexavalent.join("rules.toml"),
        r#"
[targets.common]
patches = "patches"

[targets.linux]
patches = "patches/linux"
gn_args = "linux_args.gn"

[branding]
icons = "icons"

[[branding.groups]]
name = "Product"
rules = [{ file = "product.txt", pattern = '(?<== )chromium' }]

[branding.strings]
chromium = "hexavalent"
"#,
    )
    .unwrap();

    fixture
        .command()
        .arg("--no-patch")
        .arg("--branding")
        .args(["-t", "linux", "-g", "out/Default"])
        .arg("--config")
        .arg(hexavalent.join("rules.toml"))
        .assert()
        .success();

    assert_eq!(fixture.product(), "name = hexavalent\n");
    assert_eq!(
        fs::read_to_string(fixture.chromium.join("out/Default/args.gn")).unwrap(),
        "is_official_build = true\n"
    );
    assert!(fixture.chromium.join("chrome/app/theme/product_logo.svg").is_file());
    assert!(fixture.chromium.join(".git").is_dir());
}

#[test]
fn broken_rules_file_fails_before_touching_tree() {
    let fixture = Fixture::new();
    fs::write(fixture.hexavalent.join("rules.toml"), "[targets.linux]\npatches = 1\n").unwrap();

    fixture
        .command()
        .args(["--no-patch", "-b", "-t", "linux"])
        .arg("-c")
        .arg(fixture.hexavalent.join("rules.toml"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to load"));

    assert_eq!(fixture.product(), "name = chromium\n");
}
