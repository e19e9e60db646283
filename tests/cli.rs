use assert_cmd::prelude::*;
use predicates::prelude::*;
use std::fs;
use std::process::Command;
use tempfile::tempdir;

#[test]
fn test_archive_subcommand_cycle() -> Result<(), Box<dyn std::error::Error>> {
    let source_dir = tempdir()?;
    let root = source_dir.path().join("bundle");
    fs::create_dir_all(root.join("lib"))?;
    fs::write(root.join("lib").join("core.jar"), b"not really a jar")?;
    fs::write(root.join("run.txt"), b"instructions")?;

    let out_dir = tempdir()?;
    let archive_path = out_dir.path().join("bundle.tgz");

    let mut cmd = Command::cargo_bin("repack")?;
    cmd.arg("archive")
        .arg("--root")
        .arg(&root)
        .arg("--output")
        .arg(&archive_path);
    cmd.assert().success();

    assert!(archive_path.exists());

    // The archive must decode and reproduce the inputs.
    let file = fs::File::open(&archive_path)?;
    let mut archive = tar::Archive::new(flate2::read::GzDecoder::new(file));
    let extract_dir = tempdir()?;
    archive.unpack(extract_dir.path())?;
    assert_eq!(
        fs::read(extract_dir.path().join("bundle").join("run.txt"))?,
        b"instructions"
    );
    assert_eq!(
        fs::read(extract_dir.path().join("bundle").join("lib").join("core.jar"))?,
        b"not really a jar"
    );

    Ok(())
}

#[test]
fn test_archive_missing_root_fails() -> Result<(), Box<dyn std::error::Error>> {
    let out_dir = tempdir()?;

    let mut cmd = Command::cargo_bin("repack")?;
    cmd.arg("archive")
        .arg("--root")
        .arg(out_dir.path().join("no-such-tree"))
        .arg("--output")
        .arg(out_dir.path().join("out.tgz"));
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("Error"));

    Ok(())
}

#[test]
fn test_wix_subcommand_generates_source() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempdir()?;
    let distribution = dir.path().join("dist");
    fs::create_dir_all(distribution.join("myapp").join("bin"))?;
    fs::write(distribution.join("myapp").join("bin").join("myapp.exe"), b"mz")?;
    fs::write(distribution.join("myapp").join("readme.txt"), b"hi")?;

    let icon = dir.path().join("icon64.ico");
    fs::write(&icon, b"icon")?;
    let wxs = dir.path().join("myapp.wxs");

    let properties = dir.path().join("packaging.properties");
    fs::write(
        &properties,
        format!(
            "packaging.appName=myapp\n\
             packaging.appLongName=My Application\n\
             packaging.appVersion=2.0.0-SNAPSHOT\n\
             packaging.upgradeCode=8f5ad0c8-bd12-4b0a-b546-d8e748fc0f7e\n\
             packaging.vendor=Example Corp\n\
             packaging.icon64={}\n\
             packaging.distribution={}\n\
             packaging.outputWixFile={}\n",
            icon.display(),
            distribution.display(),
            wxs.display()
        ),
    )?;

    let mut cmd = Command::cargo_bin("repack")?;
    cmd.arg("wix").arg(&properties);
    cmd.assert().success();

    let document = fs::read_to_string(&wxs)?;
    assert!(document.contains("http://wixtoolset.org/schemas/v4/wxs"));
    assert!(document.contains("Name=\"My Application\""));
    // -SNAPSHOT must be stripped for the MSI version field
    assert!(document.contains("Version=\"2.0.0\""));
    assert!(document.contains("myapp.exe"));
    assert!(document.contains("Subdirectory=\"bin\""));
    assert!(document.contains("KeyPath=\"yes\""));

    Ok(())
}

#[test]
fn test_inno_subcommand_validates_properties() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempdir()?;
    let properties = dir.path().join("packaging.properties");
    fs::write(&properties, "packaging.appVersion=1.0.0\n")?;

    let mut cmd = Command::cargo_bin("repack")?;
    cmd.arg("inno").arg(&properties);
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("packaging.appName"));

    let complete = dir.path().join("complete.properties");
    fs::write(
        &complete,
        "packaging.appName=myapp\npackaging.appVersion=1.0.0\n",
    )?;
    let mut cmd = Command::cargo_bin("repack")?;
    cmd.arg("inno").arg(&complete);
    cmd.assert().success();

    Ok(())
}

#[test]
fn test_app_image_missing_property_fails() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempdir()?;
    let properties = dir.path().join("packaging.properties");
    fs::write(&properties, "packaging.appName=myapp\n")?;

    let mut cmd = Command::cargo_bin("repack")?;
    cmd.arg("app-image").arg(&properties);
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("Missing required property"));

    Ok(())
}
