use super::*;
use std::path::PathBuf;

#[test]
fn test_parse_merge_command() {
    let cli = Cli::try_parse_from([
        "manifest-merger",
        "merge",
        "--original",
        "old.json",
        "--target",
        "new.json",
        "--installed",
        "composer.json",
        "--force-overrides",
        "--write",
        "-vv",
    ])
    .expect("Arguments should parse");

    let Commands::Merge(args) = cli.command else {
        panic!("Expected merge command");
    };
    assert_eq!(args.original, PathBuf::from("old.json"));
    assert_eq!(args.installed, PathBuf::from("composer.json"));
    assert!(args.force_overrides);
    assert!(!args.interactive_conflicts);
    assert!(args.write);
    assert_eq!(args.verbose, 2);
    assert!(args.config.is_none());
}

#[test]
fn test_merge_requires_all_manifests() {
    let result = Cli::try_parse_from(["manifest-merger", "merge", "--original", "old.json"]);
    assert!(result.is_err());
}

#[test]
fn test_parse_version_command() {
    let cli = Cli::try_parse_from(["manifest-merger", "version"]).expect("Arguments should parse");
    assert!(matches!(cli.command, Commands::Version));
}
