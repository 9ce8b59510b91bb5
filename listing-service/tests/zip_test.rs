mod common;

use common::TestApp;
use serde_json::{json, Value};
use std::fs;
use std::path::Path;

fn entry_names(path: &Path) -> Vec<String> {
    let mut archive = zip::ZipArchive::new(fs::File::open(path).unwrap()).unwrap();
    let mut names: Vec<String> = (0..archive.len())
        .map(|i| archive.by_index(i).unwrap().name().to_string())
        .collect();
    names.sort();
    names
}

#[tokio::test]
async fn creates_archive_with_root_folder() {
    let app = TestApp::spawn().await;
    let folder = app.dir.path().join("listing-1");
    fs::create_dir_all(&folder).unwrap();
    fs::write(folder.join("text.txt"), "Описание").unwrap();
    let cover = app.dir.path().join("cover.jpg");
    fs::write(&cover, b"jpeg").unwrap();
    let output = app.dir.path().join("exports/listing-1.zip");

    let response = app
        .post_json(
            "/zip/create",
            &json!({
                "inputFolders": [folder],
                "outputZipPath": output,
                "rootFolderName": "pack",
                "files": [
                    {"path": cover, "name": "cover.jpg"},
                    {"name": "no-path.jpg"}
                ]
            }),
        )
        .await;

    assert_eq!(response.status(), 200);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["ok"], true);
    assert_eq!(body["output"], output.display().to_string());
    assert_eq!(
        body["bytes"].as_u64().unwrap(),
        fs::metadata(&output).unwrap().len()
    );
    assert_eq!(
        entry_names(&output),
        vec!["pack/cover.jpg", "pack/listing-1/text.txt"]
    );
}

#[tokio::test]
async fn missing_folder_is_a_bad_request() {
    let app = TestApp::spawn().await;
    let missing = app.dir.path().join("missing");

    let response = app
        .post_json(
            "/zip/create",
            &json!({
                "inputFolders": [missing],
                "outputZipPath": app.dir.path().join("out.zip")
            }),
        )
        .await;

    assert_eq!(response.status(), 400);
    let body: Value = response.json().await.unwrap();
    assert_eq!(
        body["error"],
        format!("Input folder not found: {}", missing.display())
    );
}

#[tokio::test]
async fn malformed_payload_is_rejected() {
    let app = TestApp::spawn().await;

    for body in [
        json!({"outputZipPath": "/tmp/x.zip"}),
        json!({"inputFolders": "not-a-list", "outputZipPath": "/tmp/x.zip"}),
        json!({"inputFolders": [], "outputZipPath": ""}),
    ] {
        let response = app.post_json("/zip/create", &body).await;
        assert_eq!(response.status(), 400);
        let error: Value = response.json().await.unwrap();
        assert_eq!(error["error"], "Invalid payload");
    }
}

#[tokio::test]
async fn unwritable_output_is_an_internal_error() {
    let app = TestApp::spawn().await;
    let folder = app.dir.path().join("listing-2");
    fs::create_dir_all(&folder).unwrap();
    let output = app.dir.path().join("already-a-dir");
    fs::create_dir_all(&output).unwrap();

    let response = app
        .post_json(
            "/zip/create",
            &json!({"inputFolders": [folder], "outputZipPath": output}),
        )
        .await;

    assert_eq!(response.status(), 500);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["error"], "Zip failed");
}
