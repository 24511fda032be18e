//! Journal recovery
//!
//! Reopening a data directory replays every committed transition: records,
//! indexes, scheduled tasks and the last transition time all come back.
//! Corruption halts the open.

mod common;

use std::fs::{self, OpenOptions};
use std::io::Write;

use common::*;
use quillstate::config::Config;
use quillstate::core::Ledger;
use quillstate::errors::LedgerErrorCode;
use quillstate::storage::journal_path;
use tempfile::TempDir;

fn config(dir: &TempDir) -> Config {
    quiet_logs();
    let mut config = Config::new(dir.path());
    config.journal_fsync = false;
    config
}

#[test]
fn test_state_survives_reopen() {
    let dir = TempDir::new().unwrap();
    let owner = addr("owner");
    let (blog, article, task) = {
        let mut ledger = Ledger::open(&config(&dir)).unwrap();
        let blog = create_blog(&mut ledger, NOW, owner);
        let res = create_article(&mut ledger, NOW + 1, owner, blog, NOW + HOUR).unwrap();
        (blog, res.id.unwrap(), res.scheduled.unwrap())
    };

    let ledger = Ledger::open(&config(&dir)).unwrap();
    assert_eq!(ledger.blog(blog).unwrap().unwrap().owner, owner);
    assert_eq!(ledger.articles_by_time(blog).unwrap(), vec![article]);
    assert_eq!(ledger.task(task).unwrap().unwrap().run_at, at(NOW + HOUR));
    assert_eq!(ledger.last_time().unwrap(), at(NOW + 1));
}

#[test]
fn test_fired_task_stays_fired_after_reopen() {
    let dir = TempDir::new().unwrap();
    let owner = addr("owner");
    let article = {
        let mut ledger = Ledger::open(&config(&dir)).unwrap();
        let blog = create_blog(&mut ledger, NOW, owner);
        let article = create_article(&mut ledger, NOW, owner, blog, NOW + HOUR).unwrap().id.unwrap();
        assert_eq!(ledger.tick(at(NOW + HOUR)).unwrap().fired.len(), 1);
        article
    };

    let mut ledger = Ledger::open(&config(&dir)).unwrap();
    assert!(ledger.article(article).unwrap().is_none());
    assert_eq!(ledger.pending_tasks(), 0);
    assert!(ledger.tick(at(NOW + 2 * HOUR)).unwrap().fired.is_empty());
}

#[test]
fn test_ids_continue_after_reopen() {
    let dir = TempDir::new().unwrap();
    {
        let mut ledger = Ledger::open(&config(&dir)).unwrap();
        create_user(&mut ledger, NOW, "Crpto0X");
    }
    let mut ledger = Ledger::open(&config(&dir)).unwrap();
    let second = create_user(&mut ledger, NOW, "vitalik");
    assert_eq!(second.value(), 2);
}

#[test]
fn test_time_stays_monotonic_after_reopen() {
    let dir = TempDir::new().unwrap();
    {
        let mut ledger = Ledger::open(&config(&dir)).unwrap();
        create_user(&mut ledger, NOW, "Crpto0X");
    }
    let mut ledger = Ledger::open(&config(&dir)).unwrap();
    let err = ledger.tick(at(NOW - 1)).unwrap_err();
    assert!(err.is_validation());
}

#[test]
fn test_rejected_transition_not_journaled() {
    let dir = TempDir::new().unwrap();
    let size_after_blog = {
        let mut ledger = Ledger::open(&config(&dir)).unwrap();
        let blog = create_blog(&mut ledger, NOW, addr("owner"));
        let size = fs::metadata(journal_path(dir.path())).unwrap().len();
        assert!(create_article(&mut ledger, NOW, addr("stranger"), blog, 0).is_err());
        size
    };
    assert_eq!(fs::metadata(journal_path(dir.path())).unwrap().len(), size_after_blog);
}

#[test]
fn test_corrupted_journal_refuses_open() {
    let dir = TempDir::new().unwrap();
    {
        let mut ledger = Ledger::open(&config(&dir)).unwrap();
        create_user(&mut ledger, NOW, "Crpto0X");
    }

    let path = journal_path(dir.path());
    let mut bytes = fs::read(&path).unwrap();
    let mid = bytes.len() / 2;
    bytes[mid] ^= 0xFF;
    fs::write(&path, &bytes).unwrap();

    let err = Ledger::open(&config(&dir)).err().unwrap();
    assert_eq!(err.code(), LedgerErrorCode::DataCorruption);
    assert!(err.is_fatal());
}

#[test]
fn test_truncated_tail_refuses_open() {
    let dir = TempDir::new().unwrap();
    {
        let mut ledger = Ledger::open(&config(&dir)).unwrap();
        create_user(&mut ledger, NOW, "Crpto0X");
    }

    let mut file = OpenOptions::new().append(true).open(journal_path(dir.path())).unwrap();
    file.write_all(&[0x40, 0x00]).unwrap();
    drop(file);

    let err = Ledger::open(&config(&dir)).err().unwrap();
    assert_eq!(err.code(), LedgerErrorCode::DataCorruption);
}
