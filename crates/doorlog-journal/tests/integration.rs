use doorlog_core::{EventKind, IdentityHash, Location, LocationRegistry, User};
use doorlog_journal::{
    current_journal_path, read_journal, JournalWriter, ReadError, WriteError, WriterOptions,
};
use std::fs;
use tempfile::TempDir;

fn test_registry() -> LocationRegistry {
    [
        Location::new("MOS", "Mosbach"),
        Location::new("TST", "Teststadt"),
    ]
    .into_iter()
    .collect()
}

#[test]
fn write_then_read_round_trip() {
    let temp_dir = TempDir::new().unwrap();
    let registry = test_registry();
    let mosbach = registry.resolve("MOS").unwrap().clone();
    let teststadt = registry.resolve("TST").unwrap().clone();

    let user1 = User::new("Tester", "Teststadt");
    let user2 = User::new("Testerin", "Hauptstadt");

    {
        let writer = JournalWriter::new(temp_dir.path(), &registry).unwrap();
        writer
            .write_event_user(&user1, &mosbach, EventKind::Login)
            .unwrap();
        writer
            .write_event_user(&user2, &teststadt, EventKind::Login)
            .unwrap();
        writer
            .write_event_user(&user1, &mosbach, EventKind::Logout)
            .unwrap();
    }

    let journal = read_journal(current_journal_path(temp_dir.path()), &registry).unwrap();

    let mut names: Vec<&str> = journal.users().map(|u| u.name.as_str()).collect();
    names.sort_unstable();
    assert_eq!(names, ["Tester", "Testerin"]);

    let events = journal.events();
    assert_eq!(events.len(), 3);
    assert_eq!(events[0].kind, EventKind::Login);
    assert_eq!(events[0].user, IdentityHash::of_user(&user1));
    assert_eq!(events[0].location.code, "MOS");
    assert_eq!(events[1].user, IdentityHash::of_user(&user2));
    assert_eq!(events[1].location.code, "TST");
    assert_eq!(events[2].kind, EventKind::Logout);
    assert_eq!(events[2].user, IdentityHash::of_user(&user1));
}

#[test]
fn user_registration_is_idempotent() {
    let temp_dir = TempDir::new().unwrap();
    let registry = test_registry();
    let writer = JournalWriter::new(temp_dir.path(), &registry).unwrap();

    let user = User::new("Tester", "Teststadt");
    let first = writer.write_user_if_unknown(&user).unwrap();
    let second = writer.write_user_if_unknown(&user).unwrap();
    assert_eq!(first, second);

    let content = fs::read_to_string(current_journal_path(temp_dir.path())).unwrap();
    let star_lines = content.lines().filter(|l| l.starts_with('*')).count();
    assert_eq!(star_lines, 1);
    assert_eq!(content, "*Tester\tTeststadt\n");
}

#[test]
fn event_for_unregistered_hash_writes_nothing() {
    let temp_dir = TempDir::new().unwrap();
    let registry = test_registry();
    let writer = JournalWriter::new(temp_dir.path(), &registry).unwrap();
    let mosbach = registry.resolve("MOS").unwrap();

    let hash = IdentityHash::of_user(&User::new("Nobody", "Nowhere"));
    let result = writer.write_event_user_hash(&hash, mosbach, EventKind::Login);
    assert!(matches!(result, Err(WriteError::UnknownIdentity(_))));

    let content = fs::read_to_string(current_journal_path(temp_dir.path())).unwrap();
    assert!(content.is_empty());
}

#[test]
fn login_logout_updates_current_location() {
    let temp_dir = TempDir::new().unwrap();
    let registry = test_registry();
    let writer = JournalWriter::new(temp_dir.path(), &registry).unwrap();
    let mosbach = registry.resolve("MOS").unwrap();

    let user = User::new("Tester", "Teststadt");
    let hash = IdentityHash::of_user(&user);

    writer
        .write_event_user(&user, mosbach, EventKind::Login)
        .unwrap();
    assert_eq!(
        writer.current_location(&hash).unwrap().unwrap().code,
        "MOS"
    );

    writer
        .write_event_user(&user, mosbach, EventKind::Logout)
        .unwrap();
    assert_eq!(writer.current_location(&hash).unwrap(), None);

    let unknown = IdentityHash::of_user(&User::new("Nobody", "Nowhere"));
    assert!(writer.current_location(&unknown).is_err());
}

#[test]
fn missing_directories_are_created() {
    let temp_dir = TempDir::new().unwrap();
    let nested = temp_dir.path().join("a").join("b");
    let registry = test_registry();

    let writer = JournalWriter::new(&nested, &registry).unwrap();
    writer
        .write_user_if_unknown(&User::new("Tester", "Teststadt"))
        .unwrap();
    assert!(current_journal_path(&nested).is_file());
}

#[cfg(unix)]
#[test]
fn writer_options_control_file_mode() {
    use std::os::unix::fs::PermissionsExt;

    let temp_dir = TempDir::new().unwrap();
    let registry = test_registry();
    let options = WriterOptions { file_mode: 0o600 };
    let _writer = JournalWriter::with_options(temp_dir.path(), &registry, options).unwrap();

    let mode = fs::metadata(current_journal_path(temp_dir.path()))
        .unwrap()
        .permissions()
        .mode();
    assert_eq!(mode & 0o777, 0o600);
}

#[test]
fn writer_creation_fails_when_output_is_blocked() {
    let temp_dir = TempDir::new().unwrap();
    let registry = test_registry();
    // A directory squatting on today's file path makes the open fail.
    fs::create_dir(current_journal_path(temp_dir.path())).unwrap();
    assert!(JournalWriter::new(temp_dir.path(), &registry).is_err());
}

#[test]
fn update_output_resets_the_index_and_keeps_old_bytes() {
    let temp_dir = TempDir::new().unwrap();
    let registry = test_registry();
    let writer = JournalWriter::new(temp_dir.path(), &registry).unwrap();
    let mosbach = registry.resolve("MOS").unwrap();

    let user = User::new("Tester", "Teststadt");
    let hash = IdentityHash::of_user(&user);
    writer
        .write_event_user(&user, mosbach, EventKind::Login)
        .unwrap();
    let before = fs::read_to_string(current_journal_path(temp_dir.path())).unwrap();

    writer.update_output().unwrap();

    // The index starts fresh: the identity is no longer known.
    assert!(writer.current_location(&hash).is_err());

    // The next write registers the user again; nothing already appended is
    // rewritten.
    writer
        .write_event_user(&user, mosbach, EventKind::Login)
        .unwrap();
    let after = fs::read_to_string(current_journal_path(temp_dir.path())).unwrap();
    assert!(after.starts_with(&before));
    let star_lines = after.lines().filter(|l| l.starts_with('*')).count();
    assert_eq!(star_lines, 2);
}

#[test]
fn close_makes_writes_fail_until_reopened() {
    let temp_dir = TempDir::new().unwrap();
    let registry = test_registry();
    let writer = JournalWriter::new(temp_dir.path(), &registry).unwrap();

    writer.close();
    let result = writer.write_user_if_unknown(&User::new("Tester", "Teststadt"));
    assert!(matches!(result, Err(WriteError::NotOpen)));

    writer.update_output().unwrap();
    writer
        .write_user_if_unknown(&User::new("Tester", "Teststadt"))
        .unwrap();
}

#[test]
fn recovery_replays_existing_file() {
    let temp_dir = TempDir::new().unwrap();
    let registry = test_registry();

    let checked_in = User::new("Tester", "Teststadt");
    let checked_out = User::new("Testerin", "Hauptstadt");
    let registered = User::new("Dritte", "Drittstadt");
    let in_hash = IdentityHash::of_user(&checked_in);
    let out_hash = IdentityHash::of_user(&checked_out);
    let reg_hash = IdentityHash::of_user(&registered);

    let content = format!(
        "*{}\n*{}\n*{}\n+{}\tMOS\t1627776000\n+{}\tTST\t1627776001\n-{}\tTST\t1627776060\n",
        checked_in.to_journal_line(),
        checked_out.to_journal_line(),
        registered.to_journal_line(),
        in_hash.to_b64(),
        out_hash.to_b64(),
        out_hash.to_b64(),
    );
    fs::write(current_journal_path(temp_dir.path()), content).unwrap();

    let writer = JournalWriter::new(temp_dir.path(), &registry).unwrap();
    assert_eq!(
        writer.current_location(&in_hash).unwrap().unwrap().code,
        "MOS"
    );
    assert_eq!(writer.current_location(&out_hash).unwrap(), None);
    assert_eq!(writer.current_location(&reg_hash).unwrap(), None);
}

#[test]
fn recovery_survives_corrupt_lines() {
    let temp_dir = TempDir::new().unwrap();
    let registry = test_registry();

    let valid = User::new("Tester", "Teststadt");
    let valid_hash = IdentityHash::of_user(&valid);

    // A user line without a tab, a short event line, an unknown location
    // and an undecodable hash, between two valid records.
    let content = format!(
        "*invalid line\n*{}\n+not-base64\tMOS\t0\n+{}\tXXX\t0\n+{}\tMOS\n+{}\tMOS\t1627776000\n",
        valid.to_journal_line(),
        valid_hash.to_b64(),
        valid_hash.to_b64(),
        valid_hash.to_b64(),
    );
    fs::write(current_journal_path(temp_dir.path()), content).unwrap();

    let writer = JournalWriter::new(temp_dir.path(), &registry).unwrap();
    assert_eq!(
        writer.current_location(&valid_hash).unwrap().unwrap().code,
        "MOS"
    );
}

#[test]
fn recovery_registers_identities_seen_only_in_events() {
    let temp_dir = TempDir::new().unwrap();
    let registry = test_registry();

    // No `*` line for this hash; the login line alone makes it known.
    let hash = IdentityHash::of_user(&User::new("Tester", "Teststadt"));
    let content = format!("+{}\tMOS\t1627776000\n", hash.to_b64());
    fs::write(current_journal_path(temp_dir.path()), content).unwrap();

    let writer = JournalWriter::new(temp_dir.path(), &registry).unwrap();
    assert_eq!(
        writer.current_location(&hash).unwrap().unwrap().code,
        "MOS"
    );
}

#[test]
fn recovered_writer_appends_without_rewriting() {
    let temp_dir = TempDir::new().unwrap();
    let registry = test_registry();
    let user = User::new("Tester", "Teststadt");

    {
        let writer = JournalWriter::new(temp_dir.path(), &registry).unwrap();
        writer
            .write_event_user(&user, registry.resolve("MOS").unwrap(), EventKind::Login)
            .unwrap();
    }
    let before = fs::read_to_string(current_journal_path(temp_dir.path())).unwrap();

    let writer = JournalWriter::new(temp_dir.path(), &registry).unwrap();
    // The identity was recovered, so no second `*` line is written.
    writer
        .write_event_user(&user, registry.resolve("MOS").unwrap(), EventKind::Logout)
        .unwrap();

    let after = fs::read_to_string(current_journal_path(temp_dir.path())).unwrap();
    assert!(after.starts_with(&before));
    let star_lines = after.lines().filter(|l| l.starts_with('*')).count();
    assert_eq!(star_lines, 1);
    assert!(after.ends_with('\n'));
}

#[test]
fn read_journal_rejects_non_files() {
    let temp_dir = TempDir::new().unwrap();
    let registry = test_registry();
    assert!(matches!(
        read_journal(temp_dir.path(), &registry),
        Err(ReadError::NotAFile(_))
    ));
    assert!(read_journal(temp_dir.path().join("missing.txt"), &registry).is_err());
}

#[test]
fn read_journal_skips_malformed_event_lines() {
    let temp_dir = TempDir::new().unwrap();
    let registry = test_registry();
    let path = temp_dir.path().join("journal.txt");

    let user = User::new("Tester", "Teststadt");
    let hash = IdentityHash::of_user(&user);
    let content = format!(
        "*{}\n+{}\tXXX\t0\n+{}\tMOS\tnot-a-number\n+{}\tMOS\t1627776000\n",
        user.to_journal_line(),
        hash.to_b64(),
        hash.to_b64(),
        hash.to_b64(),
    );
    fs::write(&path, content).unwrap();

    let journal = read_journal(&path, &registry).unwrap();
    assert_eq!(journal.user_count(), 1);
    assert_eq!(journal.events().len(), 1);
    assert_eq!(journal.events()[0].timestamp, 1627776000);
}

#[test]
fn read_journal_fails_on_malformed_user_line() {
    let temp_dir = TempDir::new().unwrap();
    let registry = test_registry();
    let path = temp_dir.path().join("journal.txt");
    fs::write(&path, "*invalid line\n").unwrap();

    assert!(matches!(
        read_journal(&path, &registry),
        Err(ReadError::UserLine { line: 1, .. })
    ));
}

#[test]
fn read_journal_ignores_blank_and_foreign_lines() {
    let temp_dir = TempDir::new().unwrap();
    let registry = test_registry();
    let path = temp_dir.path().join("journal.txt");

    let user = User::new("Tester", "Teststadt");
    let content = format!("\n# comment-ish noise\n*{}\n", user.to_journal_line());
    fs::write(&path, content).unwrap();

    let journal = read_journal(&path, &registry).unwrap();
    assert_eq!(journal.user_count(), 1);
    assert!(journal.events().is_empty());
}
