//! On-disk behaviour of the SQLite backend.

use std::path::PathBuf;

use bid_core::{AppView, CompanyData, CompanyRepository, Session};
use bid_db_sqlite::SqliteRepository;
use pretty_assertions::assert_eq;
use rust_decimal_macros::dec;

fn db_path(dir: &tempfile::TempDir) -> PathBuf {
    dir.path().join("bidcap.db")
}

async fn open(dir: &tempfile::TempDir) -> SqliteRepository {
    SqliteRepository::open(&db_path(dir).display().to_string())
        .await
        .unwrap()
}

#[tokio::test]
async fn snapshot_survives_reopening_the_file() {
    let dir = tempfile::tempdir().unwrap();

    let mut company = CompanyData::new("Acme Constructions", "12 Park Street");
    company.n_value = dec!(3);
    company.c_value = dec!(2);
    {
        let repo = open(&dir).await;
        repo.save(&company).await.unwrap();
    }

    let repo = open(&dir).await;
    assert!(db_path(&dir).is_file());
    assert_eq!(repo.load().await.unwrap(), Some(company));
}

#[tokio::test]
async fn saved_session_reopens_on_dashboard() {
    let dir = tempfile::tempdir().unwrap();

    {
        let repo = open(&dir).await;
        let mut session = Session::open(&repo).await.unwrap();
        session.set_company_details("Acme Constructions", "12 Park Street");
        session.submit_company_details().unwrap();
        session.set_turnover_amount(0, dec!(10)).unwrap();
        session.set_n_value(dec!(2));
        session.save(&repo).await.unwrap();
    }

    let repo = open(&dir).await;
    let session = Session::open(&repo).await.unwrap();

    assert_eq!(session.view(), AppView::Dashboard);
    assert_eq!(session.draft().turnover_data[0].amount, dec!(10));
    assert_eq!(session.draft().n_value, dec!(2));
}

#[tokio::test]
async fn reopening_runs_migrations_idempotently() {
    let dir = tempfile::tempdir().unwrap();
    open(&dir).await;

    let repo = open(&dir).await;

    assert_eq!(repo.load().await.unwrap(), None);
}
