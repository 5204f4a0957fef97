#![cfg(feature = "storage-rocksdb")]

use assert_cmd::cargo_bin;
use bonus_ledger::application::bonus::{BonusGranter, GrantOutcome};
use bonus_ledger::domain::account::{Account, BonusAmount, Credits};
use bonus_ledger::domain::ports::AccountStore;
use bonus_ledger::infrastructure::rocksdb::RocksDBStore;
use std::process::Command;
use std::sync::Arc;
use tempfile::tempdir;

mod common;

#[test]
fn test_grant_survives_process_restart() {
    let dir = tempdir().unwrap();
    let db_path = dir.path().join("test_db");
    let csv = common::accounts_csv(&["1,0,false"]);

    // 1. First run: seed the account and grant the bonus
    let output1 = Command::new(cargo_bin!("bonus-ledger"))
        .arg("--accounts")
        .arg(csv.path())
        .arg("--db-path")
        .arg(&db_path)
        .args(["grant", "1"])
        .output()
        .expect("Failed to execute command");
    assert!(output1.status.success());
    assert!(String::from_utf8_lossy(&output1.stdout).contains("1,10,true"));

    // 2. Second run: the job is delivered again against the same database
    let output2 = Command::new(cargo_bin!("bonus-ledger"))
        .arg("--db-path")
        .arg(&db_path)
        .args(["grant", "1", "--times", "3"])
        .output()
        .expect("Failed to execute command");
    assert!(output2.status.success());

    // Still a single bonus
    assert!(String::from_utf8_lossy(&output2.stdout).contains("1,10,true"));
}

#[test]
fn test_reseeding_keeps_granted_accounts() {
    let dir = tempdir().unwrap();
    let db_path = dir.path().join("test_db");
    let csv = common::accounts_csv(&["1,0,false", "3,25,false"]);

    let output1 = Command::new(cargo_bin!("bonus-ledger"))
        .arg("--accounts")
        .arg(csv.path())
        .arg("--db-path")
        .arg(&db_path)
        .args(["grant", "3"])
        .output()
        .expect("Failed to execute command");
    assert!(output1.status.success());
    assert!(String::from_utf8_lossy(&output1.stdout).contains("3,35,true"));

    // Same seed file again: account 3 must not be reset to 25,false
    let output2 = Command::new(cargo_bin!("bonus-ledger"))
        .arg("--accounts")
        .arg(csv.path())
        .arg("--db-path")
        .arg(&db_path)
        .args(["grant", "1"])
        .output()
        .expect("Failed to execute command");
    assert!(output2.status.success());

    let stdout = String::from_utf8_lossy(&output2.stdout);
    assert!(stdout.contains("1,10,true"));
    assert!(stdout.contains("3,35,true"));
    assert!(String::from_utf8_lossy(&output2.stderr).contains("keeping stored state"));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_rocksdb_concurrent_grants() {
    let dir = tempdir().unwrap();
    let store = Arc::new(RocksDBStore::open(dir.path()).unwrap());
    store.store(Account::new(1)).await.unwrap();
    let granter = BonusGranter::new(store.clone(), BonusAmount::DEFAULT);

    let mut set = tokio::task::JoinSet::new();
    for _ in 0..16 {
        let granter = granter.clone();
        set.spawn(async move { granter.grant_bonus(1).await.unwrap() });
    }

    let mut granted = 0;
    while let Some(outcome) = set.join_next().await {
        if let GrantOutcome::Granted { .. } = outcome.unwrap() {
            granted += 1;
        }
    }

    assert_eq!(granted, 1);
    assert_eq!(store.get(1).await.unwrap().unwrap().balance, Credits(10));
}
