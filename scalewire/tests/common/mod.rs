//! Mock scale links shared by the integration tests

#![allow(dead_code)]

use bytes::BytesMut;
use scalewire::Transport;
use scalewire_transport::MockTransport;

/// Mock with every call succeeding and no reads configured
pub fn open_link() -> MockTransport {
    let mut mock = MockTransport::new();
    mock.expect_open().returning(|| Ok(()));
    mock.expect_close().returning(|| Ok(()));
    mock.expect_is_connected().return_const(false);
    mock.expect_clear_input().returning(|| Ok(()));
    mock.expect_remote_addr().return_const("mock:9100".to_string());
    mock
}

/// Scale that always answers with the same frame
pub fn replying(reply: &'static [u8]) -> Box<dyn Transport> {
    let mut mock = open_link();
    mock.expect_write().returning(|_| Ok(()));
    mock.expect_read()
        .returning(move || Ok(BytesMut::from(reply)));
    Box::new(mock)
}

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("scalewire=debug")
        .with_test_writer()
        .try_init();
}
