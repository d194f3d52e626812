use std::io;
use std::sync::{Arc, Mutex};

use tempfile::tempdir;
use time::macros::datetime;

use helpdesk_cli::app::open_session;
use helpdesk_cli::config::Config;
use helpdesk_core::store::open_store_connection;
use helpdesk_core::FixedClock;

#[derive(Clone, Default)]
struct CapturedLog(Arc<Mutex<Vec<u8>>>);

impl io::Write for CapturedLog {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[test]
fn each_load_warning_is_logged_once() {
    let tmp = tempdir().unwrap();
    let config = Config {
        db_path: tmp.path().join("incidents.sqlite"),
        ..Config::default()
    };
    let conn = open_store_connection(&config.db_path).unwrap();
    conn.execute(
        "INSERT INTO incidents(code, status, workstation, description, registered_at, resolved_at)
         VALUES ('05/03/2024-09:07-1', 'resolved', 4, 'fan noise', '2024-03-05T09:07:00Z', '2024-03-05T10:00:00Z')",
        [],
    )
    .unwrap();
    drop(conn);

    let log = CapturedLog::default();
    let writer = log.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_ansi(false)
        .with_writer(move || writer.clone())
        .finish();

    let session = tracing::subscriber::with_default(subscriber, || {
        open_session(&config, FixedClock::new(datetime!(2024-03-05 11:00 UTC))).unwrap()
    });
    assert_eq!(session.desk().len(), 1);

    let output = String::from_utf8(log.0.lock().unwrap().clone()).unwrap();
    assert_eq!(output.matches("VALIDATION_FIELD_MISSING").count(), 1);
}
