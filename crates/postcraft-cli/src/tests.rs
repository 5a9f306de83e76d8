use super::*;

#[test]
fn parses_run_with_repeated_platforms() {
    let cli = Cli::try_parse_from([
        "postcraft",
        "run",
        "https://example.com/post",
        "--platform",
        "x",
        "-p",
        "linkedin",
        "--json",
    ])
    .expect("expected valid cli args");

    match cli.command {
        Commands::Run {
            url,
            platforms,
            json,
        } => {
            assert_eq!(url, "https://example.com/post");
            assert_eq!(platforms, vec![Platform::Twitter, Platform::Linkedin]);
            assert!(json);
        }
        other => panic!("unexpected command: {other:?}"),
    }
}

#[test]
fn run_without_platforms_uses_defaults() {
    let cli = Cli::try_parse_from(["postcraft", "run", "https://example.com"]).unwrap();
    assert!(matches!(
        cli.command,
        Commands::Run { ref platforms, json: false, .. } if platforms.is_empty()
    ));
}

#[test]
fn rejects_unknown_platform() {
    assert!(Cli::try_parse_from(["postcraft", "run", "https://example.com", "-p", "myspace"]).is_err());
}

#[test]
fn split_defaults() {
    let cli = Cli::try_parse_from(["postcraft", "split", "notes.txt"]).unwrap();
    assert!(matches!(
        cli.command,
        Commands::Split {
            chunk_size: 8000,
            overlap: 500,
            max_batches: 10,
            ..
        }
    ));
}

#[test]
fn split_overrides() {
    let cli = Cli::try_parse_from([
        "postcraft",
        "split",
        "notes.txt",
        "--chunk-size",
        "100",
        "--overlap",
        "10",
        "--max-batches",
        "3",
    ])
    .unwrap();
    assert!(matches!(
        cli.command,
        Commands::Split {
            chunk_size: 100,
            overlap: 10,
            max_batches: 3,
            ..
        }
    ));
}

#[test]
fn score_with_platform() {
    let cli = Cli::try_parse_from(["postcraft", "score", "Hello #rust", "--platform", "threads"])
        .unwrap();
    assert!(matches!(
        cli.command,
        Commands::Score {
            platform: Some(Platform::Threads),
            ..
        }
    ));
}

#[test]
fn subcommand_is_required() {
    assert!(Cli::try_parse_from(["postcraft"]).is_err());
}

#[test]
fn split_reports_invalid_options() {
    let dir = std::env::temp_dir().join(format!("postcraft-split-{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    let file = dir.join("input.txt");
    std::fs::write(&file, "some text").unwrap();

    assert!(offline::run_split(&file, 10, 2, 3).is_ok());
    assert!(offline::run_split(&file, 10, 10, 3).is_err());
    assert!(offline::run_split(&dir.join("missing.txt"), 10, 2, 3).is_err());

    std::fs::remove_dir_all(&dir).unwrap();
}
