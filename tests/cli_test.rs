use clap::Parser;
use std::fs;
use tempfile::TempDir;
use webdoc_routes::cli::{self, CliArgs};
use webdoc_routes::openapi_builder::OpenApiDocument;

fn project_with_config(config: &str) -> TempDir {
    let temp_dir = TempDir::new().unwrap();
    let src = temp_dir.path().join("src");
    fs::create_dir_all(src.join("legacy")).unwrap();
    fs::write(src.join("paths.rs"), include_str!("fixtures/paths.rs")).unwrap();
    fs::write(src.join("user_handler.rs"), include_str!("fixtures/user_handler.rs")).unwrap();
    fs::write(
        src.join("legacy/report_handler.rs"),
        include_str!("fixtures/broken_handler.rs"),
    )
    .unwrap();
    fs::write(temp_dir.path().join("webdoc.json"), config).unwrap();
    temp_dir
}

fn parse(args: &[&str]) -> CliArgs {
    let args = CliArgs::try_parse_from(std::iter::once("webdoc-routes").chain(args.iter().copied()))
        .unwrap();
    cli::parse_args_from_parsed(args).unwrap()
}

#[test]
fn test_run_writes_json_document() {
    let temp_dir = project_with_config(
        r#"{
            "title": "User Service",
            "version": "2.1.0",
            "servers": ["https://users.example.com"],
            "exclude": ["src/legacy/.*"]
        }"#,
    );
    let root = temp_dir.path();
    let output = root.join("out").join("openapi.json");

    let args = parse(&[
        root.to_str().unwrap(),
        "-c",
        root.join("webdoc.json").to_str().unwrap(),
        "-f",
        "json",
        "-o",
        output.to_str().unwrap(),
        "--api-version",
        "3.0.0-rc1",
    ]);
    cli::run(args).unwrap();

    let doc: OpenApiDocument = serde_json::from_str(&fs::read_to_string(&output).unwrap()).unwrap();
    assert_eq!(doc.info.title, "User Service");
    assert_eq!(doc.info.version, "3.0.0-rc1");
    assert_eq!(doc.servers[0].url, "https://users.example.com");
    assert_eq!(doc.paths.len(), 3);
    assert!(doc.paths["/api/users"].post.is_some());
}

#[test]
fn test_run_writes_yaml_document() {
    let temp_dir = project_with_config(r#"{"exclude": ["src/legacy/.*"]}"#);
    let root = temp_dir.path();
    let output = root.join("openapi.yaml");

    let args = parse(&[
        root.to_str().unwrap(),
        "-c",
        root.join("webdoc.json").to_str().unwrap(),
        "-o",
        output.to_str().unwrap(),
    ]);
    cli::run(args).unwrap();

    let doc: OpenApiDocument = serde_yaml::from_str(&fs::read_to_string(&output).unwrap()).unwrap();
    assert_eq!(doc.info.title, "Generated API");
    assert!(doc.paths["/api/users/{id}"].delete.is_some());
}

#[test]
fn test_run_fails_on_unresolvable_method() {
    let temp_dir = project_with_config("{}");
    let root = temp_dir.path();
    let output = root.join("openapi.yaml");

    let args = parse(&[
        root.to_str().unwrap(),
        "-c",
        root.join("webdoc.json").to_str().unwrap(),
        "-o",
        output.to_str().unwrap(),
    ]);
    let err = cli::run(args).unwrap_err();

    assert!(err.to_string().contains("FOO"), "unexpected error: {}", err);
    assert!(!output.exists());
}

#[test]
fn test_run_rejects_invalid_filter_pattern() {
    let temp_dir = project_with_config(r#"{"include": ["src/(unclosed"]}"#);
    let root = temp_dir.path();

    let args = parse(&[
        root.to_str().unwrap(),
        "-c",
        root.join("webdoc.json").to_str().unwrap(),
    ]);

    assert!(cli::generate_document(&args).is_err());
}
