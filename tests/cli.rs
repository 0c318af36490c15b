/*!
 * Integration tests for the pkm-manifest binary
 */

use std::fs;
use std::process::Command;

use tempfile::tempdir;

const BIN: &str = env!("CARGO_BIN_EXE_pkm-manifest");

#[test]
fn test_packs_directory() {
    let temp_dir = tempdir().unwrap();
    fs::create_dir(temp_dir.path().join("src")).unwrap();
    fs::write(temp_dir.path().join("src").join("main.js"), "run();\n").unwrap();
    fs::write(temp_dir.path().join("photo.jpg"), [0xffu8, 0xd8, 0xff]).unwrap();

    let status = Command::new(BIN)
        .arg(temp_dir.path())
        .arg("--quiet")
        .status()
        .unwrap();
    assert!(status.success());

    let xml = fs::read_to_string(temp_dir.path().join("pkm_summary.xml")).unwrap();
    assert_eq!(
        xml,
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n\
         <pkm_project>\n\
         \x20   <directory name=\"src\">\n\
         \x20       <file name=\"main.js\"><![CDATA[run();\n\
         ]]></file>\n\
         \x20   </directory>\n\
         </pkm_project>"
    );
}

#[test]
fn test_custom_output_and_rules() {
    let temp_dir = tempdir().unwrap();
    let out_dir = tempdir().unwrap();
    let output = out_dir.path().join("bundle.xml");
    let content: String = (1..=20).map(|i| format!("line {}\n", i)).collect();
    fs::write(temp_dir.path().join("big.js"), content).unwrap();
    fs::write(temp_dir.path().join("Cargo.lock"), "# lock\n").unwrap();

    let status = Command::new(BIN)
        .arg(temp_dir.path())
        .arg("--output")
        .arg(&output)
        .args(["--head", "big.js=3", "--extensions", "lock", "--quiet"])
        .status()
        .unwrap();
    assert!(status.success());

    let xml = fs::read_to_string(&output).unwrap();
    assert!(xml.contains("line 3\n[... truncated: only first 3 lines included ...]"));
    assert!(!xml.contains("line 4"));
    assert!(xml.contains("<file name=\"Cargo.lock\"><![CDATA[# lock"));
}

#[test]
fn test_missing_root_exits_with_error() {
    let temp_dir = tempdir().unwrap();
    let missing = temp_dir.path().join("nowhere");

    let output = Command::new(BIN)
        .arg(&missing)
        .arg("--output")
        .arg(temp_dir.path().join("out.xml"))
        .output()
        .unwrap();

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Error: Path not found"), "stderr: {}", stderr);
    assert!(!temp_dir.path().join("out.xml").exists());
}

#[test]
fn test_generate_completions() {
    let output = Command::new(BIN)
        .args(["--generate", "bash"])
        .output()
        .unwrap();

    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).contains("pkm-manifest"));
}
