use std::path::Path;

use tempfile::tempdir;

use helpdesk_core::db::applied_migrations;
use helpdesk_core::repo::count_incidents;
use helpdesk_core::store::open_store_connection;

#[test]
fn missing_store_is_created_with_parent_directories() {
    let tmp = tempdir().unwrap();
    let path = tmp.path().join("a").join("b").join("incidents.sqlite");

    let conn = open_store_connection(&path).expect("create");
    assert!(path.is_file());
    assert_eq!(count_incidents(&conn).unwrap(), 0);
    assert_eq!(applied_migrations(&conn).unwrap(), vec!["0001_init.sql"]);
}

#[test]
fn reopening_an_existing_store_does_not_reapply_migrations() {
    let tmp = tempdir().unwrap();
    let path = tmp.path().join("incidents.sqlite");

    drop(open_store_connection(&path).expect("create"));
    let conn = open_store_connection(&path).expect("reopen");
    assert_eq!(applied_migrations(&conn).unwrap().len(), 1);
}

#[test]
fn directory_path_is_rejected() {
    let tmp = tempdir().unwrap();
    let err = open_store_connection(tmp.path()).unwrap_err();
    assert_eq!(err.code, "STORE_INVALID_PATH");
}

#[test]
fn empty_path_is_rejected() {
    let err = open_store_connection(Path::new("")).unwrap_err();
    assert_eq!(err.code, "STORE_INVALID_PATH");
}
