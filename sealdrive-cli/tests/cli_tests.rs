use clap::Parser;
use pretty_assertions::assert_eq;
use sealdrive_cli::{Cli, CliConfig, Command, Session, guess_content_type};
use sealdrive_crypto::Passphrase;
use sealdrive_drive::{DriveConfig, FixedPassphrase};
use sealdrive_types::OwnerId;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

fn fixed(pw: &str) -> FixedPassphrase {
    FixedPassphrase::new(Passphrase::try_from(pw).unwrap())
}

async fn session(dir: &TempDir) -> Session {
    let config = CliConfig {
        data_dir: dir.path().join("data"),
        drive: DriveConfig::default(),
    };
    Session::open(&config, OwnerId::parse("alice").unwrap())
        .await
        .unwrap()
}

async fn run(session: &Session, command: Command, pw: &str) -> anyhow::Result<String> {
    let mut out = Vec::new();
    session.run(command, &fixed(pw), &mut out).await?;
    Ok(String::from_utf8(out).unwrap())
}

fn write_file(dir: &TempDir, name: &str, bytes: &[u8]) -> PathBuf {
    let path = dir.path().join(name);
    std::fs::write(&path, bytes).unwrap();
    path
}

fn list(trash: bool, starred: bool, recent: bool) -> Command {
    Command::List {
        trash,
        starred,
        recent,
    }
}

// ── Config ──────────────────────────────────────────────────────

#[test]
fn empty_config_yields_defaults() {
    let config = CliConfig::parse("").unwrap();
    assert_eq!(config, CliConfig::default());
    assert_eq!(config.drive.active_collection, "myfiles");
}

#[test]
fn config_file_overrides_drive_table() {
    let config = CliConfig::parse(
        r#"
        data_dir = "/srv/sealdrive"

        [drive]
        blob_prefix = "uploads"
        recent_limit = 3
        "#,
    )
    .unwrap();

    assert_eq!(config.data_dir, PathBuf::from("/srv/sealdrive"));
    assert_eq!(config.blob_dir(), Path::new("/srv/sealdrive/blobs"));
    assert_eq!(config.record_dir(), Path::new("/srv/sealdrive/records"));
    assert_eq!(config.drive.blob_prefix, "uploads");
    assert_eq!(config.drive.recent_limit, 3);
    assert_eq!(config.drive.trash_collection, "trash");
}

#[test]
fn malformed_config_is_rejected() {
    assert!(CliConfig::parse("data_dir = [").is_err());
}

#[test]
fn explicit_config_path_must_exist() {
    let dir = TempDir::new().unwrap();
    let missing = dir.path().join("nope.toml");
    assert!(CliConfig::load(Some(&missing)).is_err());
}

#[test]
fn explicit_config_path_is_read() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("sealdrive.toml");
    std::fs::write(&path, "data_dir = \"vault\"\n").unwrap();

    let config = CliConfig::load(Some(&path)).unwrap();
    assert_eq!(config.data_dir, PathBuf::from("vault"));
}

// ── Argument parsing ────────────────────────────────────────────

#[test]
fn parses_upload_with_flags() {
    let cli = Cli::try_parse_from([
        "sealdrive", "--owner", "alice", "-d", "/tmp/x", "upload", "a.pdf", "--plain",
    ])
    .unwrap();

    assert_eq!(cli.owner, "alice");
    assert_eq!(
        cli.command,
        Command::Upload {
            file: PathBuf::from("a.pdf"),
            plain: true,
        }
    );
    assert_eq!(cli.resolve_config().unwrap().data_dir, PathBuf::from("/tmp/x"));
}

#[test]
fn parses_list_filters() {
    let cli = Cli::try_parse_from([
        "sealdrive", "--owner", "bob", "list", "--trash", "--recent",
    ])
    .unwrap();
    assert_eq!(cli.command, list(true, false, true));
}

#[test]
fn missing_subcommand_is_an_error() {
    assert!(Cli::try_parse_from(["sealdrive", "--owner", "bob"]).is_err());
}

#[test]
fn content_type_follows_extension() {
    assert_eq!(guess_content_type(Path::new("report.PDF")), "application/pdf");
    assert_eq!(guess_content_type(Path::new("notes.txt")), "text/plain");
    assert_eq!(guess_content_type(Path::new("archive")), "application/octet-stream");
}

// ── Commands ────────────────────────────────────────────────────

#[tokio::test]
async fn upload_list_download_roundtrip() {
    let dir = TempDir::new().unwrap();
    let session = session(&dir).await;
    let source = write_file(&dir, "report.pdf", b"quarterly numbers");

    let id = run(&session, Command::Upload { file: source, plain: false }, "hunter2")
        .await
        .unwrap()
        .trim()
        .to_string();

    let listing = run(&session, list(false, false, false), "unused").await.unwrap();
    assert_eq!(listing.lines().count(), 1);
    assert!(listing.contains(&id));
    assert!(listing.contains("report.pdf"));
    assert!(listing.contains("E-"));

    let target = dir.path().join("out.pdf");
    let message = run(
        &session,
        Command::Download {
            id: id.clone(),
            out: Some(target.clone()),
        },
        "hunter2",
    )
    .await
    .unwrap();
    assert!(message.starts_with("saved "));
    assert_eq!(std::fs::read(&target).unwrap(), b"quarterly numbers");
}

#[tokio::test]
async fn wrong_passphrase_reports_decryption_failure() {
    let dir = TempDir::new().unwrap();
    let session = session(&dir).await;
    let source = write_file(&dir, "secret.txt", b"attack at dawn");
    let id = run(&session, Command::Upload { file: source, plain: false }, "right")
        .await
        .unwrap()
        .trim()
        .to_string();

    let target = dir.path().join("secret.out");
    let err = run(
        &session,
        Command::Download {
            id,
            out: Some(target.clone()),
        },
        "wrong",
    )
    .await
    .unwrap_err();

    assert!(format!("{err:#}").contains("decryption failed"));
    assert!(!target.exists());
}

#[tokio::test]
async fn trash_restore_and_purge() {
    let dir = TempDir::new().unwrap();
    let session = session(&dir).await;
    let keep = write_file(&dir, "keep.txt", b"keep");
    let drop = write_file(&dir, "drop.txt", b"drop");

    let keep_id = run(&session, Command::Upload { file: keep, plain: true }, "x")
        .await
        .unwrap()
        .trim()
        .to_string();
    let drop_id = run(&session, Command::Upload { file: drop, plain: true }, "x")
        .await
        .unwrap()
        .trim()
        .to_string();

    let trashed_keep = run(&session, Command::Trash { id: keep_id.clone() }, "x")
        .await
        .unwrap();
    let trashed_keep = trashed_keep.split_whitespace().last().unwrap().to_string();
    let trashed_drop = run(&session, Command::Trash { id: drop_id }, "x").await.unwrap();
    let trashed_drop = trashed_drop.split_whitespace().last().unwrap().to_string();

    let trash = run(&session, list(true, false, false), "x").await.unwrap();
    assert_eq!(trash.lines().count(), 2);
    assert!(run(&session, list(false, false, false), "x").await.unwrap().is_empty());

    let restored = run(&session, Command::Restore { id: trashed_keep }, "x")
        .await
        .unwrap();
    assert!(restored.ends_with(&format!("as {keep_id}\n")));

    run(&session, Command::Purge { id: trashed_drop }, "x").await.unwrap();

    assert!(run(&session, list(true, false, false), "x").await.unwrap().is_empty());
    let active = run(&session, list(false, false, false), "x").await.unwrap();
    assert!(active.contains("keep.txt"));
    assert!(!active.contains("drop.txt"));
}

#[tokio::test]
async fn star_filters_listing() {
    let dir = TempDir::new().unwrap();
    let session = session(&dir).await;
    let a = write_file(&dir, "a.txt", b"a");
    let b = write_file(&dir, "b.txt", b"b");

    let a_id = run(&session, Command::Upload { file: a, plain: true }, "x")
        .await
        .unwrap()
        .trim()
        .to_string();
    run(&session, Command::Upload { file: b, plain: true }, "x").await.unwrap();

    run(&session, Command::Star { id: a_id.clone() }, "x").await.unwrap();
    let starred = run(&session, list(false, true, false), "x").await.unwrap();
    assert_eq!(starred.lines().count(), 1);
    assert!(starred.contains("a.txt"));
    assert!(starred.contains("-*"));

    run(&session, Command::Unstar { id: a_id }, "x").await.unwrap();
    assert!(run(&session, list(false, true, false), "x").await.unwrap().is_empty());
}

#[tokio::test]
async fn data_survives_reopening_the_session() {
    let dir = TempDir::new().unwrap();
    let source = write_file(&dir, "notes.md", b"# notes");
    let id = {
        let session = session(&dir).await;
        run(&session, Command::Upload { file: source, plain: true }, "x")
            .await
            .unwrap()
            .trim()
            .to_string()
    };

    let session = session(&dir).await;
    let listing = run(&session, list(false, false, true), "x").await.unwrap();
    assert!(listing.contains(&id));
}

#[tokio::test]
async fn check_reports_clean_store() {
    let dir = TempDir::new().unwrap();
    let session = session(&dir).await;
    let source = write_file(&dir, "a.txt", b"a");
    run(&session, Command::Upload { file: source, plain: true }, "x").await.unwrap();

    let report = run(&session, Command::Check, "x").await.unwrap();
    assert_eq!(report, "1 active, 0 trashed, 0 warning(s)\n");
}

#[tokio::test]
async fn unknown_id_is_an_error() {
    let dir = TempDir::new().unwrap();
    let session = session(&dir).await;
    let err = run(&session, Command::Trash { id: "missing".into() }, "x")
        .await
        .unwrap_err();
    assert!(format!("{err:#}").contains("not found"));
}
